#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, DatabaseFairing, NotificationFairing};
use crate::logging::LoggerFairing;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod notify;

pub use config::Config;

/// Build a rocket instance that will load its configuration, connect to the
/// database, and open the notification bus on ignition.
pub fn build() -> Rocket<Build> {
    base_rocket()
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .attach(NotificationFairing)
}

/// Build a rocket instance over the given store and notification bus,
/// skipping all configuration fairings.
pub fn rocket_for_store(store: model::store::Db, bus: notify::NotificationBus) -> Rocket<Build> {
    base_rocket().manage(store).manage(bus)
}

/// Routes, schema and logging shared by every rocket we build.
fn base_rocket() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .manage(api::schema())
        .attach(LoggerFairing)
}
