use async_graphql::{http::GraphiQLSource, EmptySubscription, Schema};
use async_graphql_rocket::{GraphQLRequest, GraphQLResponse};
use log::debug;
use rocket::{response::content::RawHtml, Route, State};

use crate::logging::RequestId;
use crate::model::store::Db;
use crate::notify::NotificationBus;

use super::{mutation::MutationRoot, query::QueryRoot};

pub type SurveySchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the GraphQL schema. It holds no state: the store and notification
/// bus are attached to each request as it comes in.
pub fn schema() -> SurveySchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription).finish()
}

pub fn routes() -> Vec<Route> {
    routes![graphiql, graphql_request]
}

#[get("/graphql")]
fn graphiql() -> RawHtml<String> {
    RawHtml(GraphiQLSource::build().endpoint("/graphql").finish())
}

#[post("/graphql", data = "<request>")]
async fn graphql_request(
    id: &RequestId,
    request: GraphQLRequest,
    schema: &State<SurveySchema>,
    store: &State<Db>,
    bus: &State<NotificationBus>,
) -> GraphQLResponse {
    debug!("req{id} executing GraphQL request");
    request
        .data(store.inner().clone())
        .data(bus.inner().clone())
        .execute(schema.inner())
        .await
}

/// Run a GraphQL operation against the test server and return the JSON response body.
#[cfg(test)]
pub(super) async fn execute(
    client: &rocket::local::asynchronous::Client,
    query: &str,
    variables: rocket::serde::json::Value,
) -> rocket::serde::json::Value {
    use rocket::{http::ContentType, serde::json::serde_json::json};

    client
        .post("/graphql")
        .header(ContentType::JSON)
        .body(json!({ "query": query, "variables": variables }).to_string())
        .dispatch()
        .await
        .into_json()
        .await
        .unwrap()
}
