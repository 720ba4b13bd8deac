use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one and inject dependencies.
///
/// Every test gets its own Rocket instance and survey store. By default the
/// store is a fresh in-memory one. With `#[backend_test(mongo)]` it is a
/// MongoDB store over a randomly named database on the server at
/// `ROCKET_DB_URI`, which is dropped regardless of how the test terminates;
/// the test is skipped if `ROCKET_DB_URI` is not set.
///
/// Injectable dependencies are [`rocket::local::asynchronous::Client`], the
/// store handle `Db`, the `NotificationBus` the Rocket instance broadcasts
/// on, and (with `mongo` only) the [`mongodb::Database`].
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    let mongo = match parse_macro_input!(args as Option<Ident>) {
        None => false,
        Some(arg) if arg == "mongo" => true,
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected no argument or `mongo`")
                .into_compile_error()
                .into();
        }
    };

    // Extract the dependencies to inject and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone(), mongo) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    let (maybe_skip, open_store) = if mongo {
        (
            quote! {
                let db_uri = match std::env::var("ROCKET_DB_URI") {
                    Ok(db_uri) => db_uri,
                    Err(_) => {
                        eprintln!("skipping {}: ROCKET_DB_URI is not set", stringify!(#name));
                        return;
                    }
                };
            },
            quote! {
                let db_client = ::mongodb::Client::with_uri_str(&db_uri).await.unwrap();
                let db = db_client.database(&format!("test{}", ::rand::random::<u32>()));
                crate::model::mongodb::ensure_indexes_exist(&db).await.unwrap();
                let store: crate::model::store::Db =
                    std::sync::Arc::new(crate::model::store::MongoStore::new(&db));
                (store, Some(db))
            },
        )
    } else {
        (
            quote! {},
            quote! {
                let store: crate::model::store::Db =
                    std::sync::Arc::new(crate::model::store::MemoryStore::default());
                (store, None)
            },
        )
    };

    quote! {
        #[test]
        fn #name() {
            /// Test setup.
            async fn setup(
                #[allow(unused_variables)] db_uri: String,
            ) -> (
                rocket::local::asynchronous::Client,
                crate::model::store::Db,
                crate::notify::NotificationBus,
                Option<::mongodb::Database>,
            ) {
                let (store, db): (crate::model::store::Db, Option<::mongodb::Database>) = {
                    #open_store
                };
                let bus = crate::notify::NotificationBus::new(16);
                let rocket_client = rocket::local::asynchronous::Client::tracked(
                    crate::rocket_for_store(store.clone(), bus.clone()),
                )
                .await
                .unwrap();

                (rocket_client, store, bus, db)
            }

            /// The test itself.
            #item_fn

            /// Test cleanup.
            async fn cleanup(db: Option<::mongodb::Database>) {
                if let Some(db) = db {
                    db.drop(None).await.unwrap();
                }
            }

            #[allow(unused_variables)]
            let db_uri = String::new();
            #maybe_skip

            // Create an async runtime. We need a separate one for inside and
            // outside the `catch_unwind`.
            let outer_runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("test-setup-cleanup")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();
            let inner_runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            // Run the setup.
            let (rocket_client, store, bus, db) = outer_runtime.block_on(setup(db_uri));

            // Run the test, catching any panics.
            // Use mutexes to safely transfer `!UnwindSafe` data.
            let client_mutex = std::sync::Mutex::new(rocket_client);
            let store_mutex = std::sync::Mutex::new(store);
            let bus_mutex = std::sync::Mutex::new(bus);
            let db_mutex = std::sync::Mutex::new(db.clone());
            let runtime_mutex = std::sync::Mutex::new(inner_runtime);
            let result = std::panic::catch_unwind(|| {
                #[allow(unused_variables)]
                let rocket_client = client_mutex.into_inner().unwrap();
                #[allow(unused_variables)]
                let store = store_mutex.into_inner().unwrap();
                #[allow(unused_variables)]
                let bus = bus_mutex.into_inner().unwrap();
                #[allow(unused_variables)]
                let db = db_mutex.into_inner().unwrap();
                let runtime = runtime_mutex.into_inner().unwrap();

                runtime.block_on(#new_name(#(#test_args),*));
            });

            // Run the cleanup.
            outer_runtime.block_on(cleanup(db));

            // If the test panicked, re-raise the panic.
            if let Err(cause) = result {
                std::panic::resume_unwind(cause);
            }
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature, mongo: bool) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let Pat::Ident(_) = &*pat_type.pat {
                if let Type::Path(type_path) = &*pat_type.ty {
                    // Valid as the last path segment for any type is itself.
                    let type_ident = &type_path.path.segments.last().unwrap().ident;
                    if type_ident == "Client" {
                        if has_client {
                            return Err(syn::Error::new(
                                input.span(),
                                "Test cannot accept more than one `rocket::local::asynchronous::Client`",
                            ));
                        }
                        has_client = true;
                        args.push(quote! { rocket_client });
                        continue;
                    } else if type_ident == "Db" {
                        args.push(quote! { store.clone() });
                        continue;
                    } else if type_ident == "NotificationBus" {
                        args.push(quote! { bus.clone() });
                        continue;
                    } else if type_ident == "Database" {
                        if !mongo {
                            return Err(syn::Error::new(
                                input.span(),
                                "Only `#[backend_test(mongo)]` can inject a `mongodb::Database`",
                            ));
                        }
                        args.push(quote! { db.clone().unwrap() });
                        continue;
                    }
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `client_ident: Client`, `store_ident: Db`, `bus_ident: NotificationBus` or `db_ident: Database`",
        ));
    }

    Ok(args)
}
