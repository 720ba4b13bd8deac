use rocket::Route;

mod events;
mod graphql;
mod mutation;
mod query;
mod types;

pub use graphql::{schema, SurveySchema};

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(graphql::routes());
    routes.extend(events::routes());
    routes
}
