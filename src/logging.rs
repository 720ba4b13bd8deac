use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{info, log, warn, Level};
use rocket::{
    fairing::{Fairing, Info, Kind},
    http::{Status, StatusClass},
    request::{FromRequest, Outcome},
    Data, Orbit, Request, Response, Rocket,
};

/// Declare a process-unique, sequentially allocated log identifier.
macro_rules! sequential_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
        pub struct $name(pub usize);

        impl $name {
            /// Atomically allocate the next ID, wrapping back to zero after `usize::MAX`.
            pub fn next() -> Self {
                static COUNTER: AtomicUsize = AtomicUsize::new(0);
                Self(COUNTER.fetch_add(1, Ordering::Relaxed))
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

sequential_id!(
    /// Pairs up the request and response log lines of one HTTP request.
    RequestId
);

sequential_id!(
    /// Pairs up the connect and disconnect log lines of one real-time listener.
    ConnectionId
);

/// The ID [`LoggerFairing`] gave this request, for handlers that log.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for &'r RequestId {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(req.local_cache(RequestId::next))
    }
}

/// Logs launch, shutdown, and a line per request and per response.
#[derive(Debug, Copy, Clone)]
pub struct LoggerFairing;

#[rocket::async_trait]
impl Fairing for LoggerFairing {
    fn info(&self) -> Info {
        Info {
            name: "Logger",
            kind: Kind::Liftoff | Kind::Request | Kind::Response | Kind::Shutdown,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let config = rocket.config();
        info!(
            "Survey server listening on {}:{} (GraphQL at /graphql, events at /events)",
            config.address, config.port
        );
    }

    async fn on_request(&self, req: &mut Request<'_>, _data: &mut Data<'_>) {
        let id = req.local_cache(RequestId::next);
        info!("->req{id} {} {}", req.method(), req.uri());
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let id = req.local_cache(RequestId::next);
        let status = res.status();
        let route = req
            .route()
            .map(|route| route.uri.to_string())
            .unwrap_or_else(|| "no route".to_string());
        log!(response_level(status), "<-rsp{id} {status} {route}");
    }

    async fn on_shutdown(&self, _rocket: &Rocket<Orbit>) {
        warn!("Shutdown requested, disconnecting listeners");
    }
}

/// Server errors are errors, client errors are warnings, the rest is routine.
fn response_level(status: Status) -> Level {
    match status.class() {
        StatusClass::ServerError => Level::Error,
        StatusClass::ClientError => Level::Warn,
        _ => Level::Info,
    }
}
