use std::sync::Arc;

use log::{error, info};
use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{
    mongodb::ensure_indexes_exist,
    store::{Db, MongoStore},
};
use crate::notify::NotificationBus;

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Deserialize)]
pub struct Config {
    // non-secrets
    db_name: String,
    #[serde(default = "default_event_capacity")]
    event_capacity: usize,
}

fn default_event_capacity() -> usize {
    64
}

impl Config {
    /// Name of the database holding the survey collections.
    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    /// How many undelivered events each real-time listener may fall behind by.
    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// Must be attached before the other fairings in this module, which read it.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // secrets
    db_uri: String,
}

/// A fairing that loads the MongoDB config, connects to the database,
/// ensures the indexes exist, and places the store handle [`Db`] into
/// managed state.
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        let db_name = match rocket.state::<Config>() {
            Some(app_config) => app_config.db_name().to_string(),
            None => {
                error!("Application config must be loaded before the database");
                return Err(rocket);
            }
        };
        info!("Loaded database config, connecting...");
        // Construct the connection.
        let client = match MongoClient::with_uri_str(config.db_uri).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db = client.database(&db_name);

        // Ensure the required indexes exist.
        if let Err(e) = ensure_indexes_exist(&db).await {
            error!("Failed to connect to database: {e}");
            return Err(rocket);
        }
        info!("...database connection online!");

        // Manage the state.
        let store: Db = Arc::new(MongoStore::new(&db));
        rocket = rocket.manage(store);
        Ok(rocket)
    }
}

/// A fairing that opens the [`NotificationBus`] and places it into managed state.
pub struct NotificationFairing;

#[rocket::async_trait]
impl Fairing for NotificationFairing {
    fn info(&self) -> Info {
        Info {
            name: "Notification bus",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let capacity = match rocket.state::<Config>() {
            Some(config) => config.event_capacity(),
            None => {
                error!("Application config must be loaded before the notification bus");
                return Err(rocket);
            }
        };
        info!("Opened notification bus with capacity {capacity}");

        Ok(rocket.manage(NotificationBus::new(capacity)))
    }
}
