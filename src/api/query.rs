use async_graphql::{Context, Object, Result, ID};
use log::debug;

use crate::model::{
    db::{Answer, Survey},
    mongodb::Id,
    store::{Db, SurveyStore},
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn hello(&self) -> &'static str {
        "hello from graphql"
    }

    /// All surveys, most recently created first.
    async fn surveys(&self, ctx: &Context<'_>) -> Result<Vec<Survey>> {
        let store = ctx.data::<Db>()?;
        Ok(store.surveys().await?)
    }

    /// All answers to the given survey, most recently created first.
    async fn answers(&self, ctx: &Context<'_>, survey: ID) -> Result<Vec<Answer>> {
        let store = ctx.data::<Db>()?;
        Ok(store.answers_for_survey(&survey).await?)
    }

    /// The survey with the given ID, or the most recently created survey if
    /// no ID is given.
    async fn survey(
        &self,
        ctx: &Context<'_>,
        participant: String,
        id: Option<ID>,
    ) -> Result<Option<Survey>> {
        debug!("Survey requested for participant '{participant}'");
        let store = ctx.data::<Db>()?;
        let survey = match id {
            Some(id) => find_survey(store, &id).await?,
            None => store.latest_survey().await?,
        };
        Ok(survey)
    }
}

/// Look up a survey by the text form of its ID. IDs that cannot name any
/// survey are a miss, not an error.
pub(super) async fn find_survey(store: &Db, id: &str) -> crate::error::Result<Option<Survey>> {
    match id.parse::<Id>() {
        Ok(id) => store.survey_by_id(id).await,
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use rocket::{
        local::asynchronous::Client,
        serde::json::{serde_json::json, Value},
    };

    use super::*;
    use crate::api::graphql::execute;
    use crate::model::db::{AnswerCore, SurveyCore};

    async fn add_survey(client: &Client, name: &str) -> Value {
        let body = execute(
            client,
            "mutation Add($input: NewSurvey!) { addNewSurvey(input: $input) { id name } }",
            json!({ "input": { "name": name, "answers": ["Yes", "No"] } }),
        )
        .await;
        body["data"]["addNewSurvey"].clone()
    }

    fn names(surveys: &Value) -> Vec<&str> {
        surveys
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect()
    }

    #[backend_test]
    async fn surveys_newest_first(client: Client) {
        add_survey(&client, "First").await;
        add_survey(&client, "Second").await;

        let body = execute(&client, "{ surveys { name } }", json!({})).await;
        assert_eq!(names(&body["data"]["surveys"]), vec!["Second", "First"]);

        // A new survey moves to the front.
        add_survey(&client, "Third").await;
        let body = execute(&client, "{ surveys { name } }", json!({})).await;
        assert_eq!(
            names(&body["data"]["surveys"]),
            vec!["Third", "Second", "First"]
        );
    }

    #[backend_test]
    async fn surveys_empty(client: Client) {
        let body = execute(&client, "{ surveys { id } }", json!({})).await;
        assert_eq!(body["data"]["surveys"], json!([]));
    }

    #[backend_test]
    async fn surveys_count_their_own_answers(client: Client, store: Db) {
        let busy = store.insert_survey(SurveyCore::example()).await.unwrap();
        let quiet = store
            .insert_survey(SurveyCore::example_anonymous())
            .await
            .unwrap();
        for _ in 0..3 {
            store
                .insert_answer(AnswerCore::example(busy.id))
                .await
                .unwrap();
        }

        let body = execute(&client, "{ surveys { id nbAnswers } }", json!({})).await;
        for survey in body["data"]["surveys"].as_array().unwrap() {
            let expected = if survey["id"] == busy.id.to_string() {
                3
            } else {
                assert_eq!(survey["id"], quiet.id.to_string());
                0
            };
            assert_eq!(survey["nbAnswers"], expected);
        }
    }

    #[backend_test]
    async fn answers_for_unknown_survey(client: Client) {
        let body = execute(
            &client,
            "query Answers($survey: ID!) { answers(survey: $survey) { id } }",
            json!({ "survey": "no-such-survey" }),
        )
        .await;

        assert!(body.get("errors").is_none());
        assert_eq!(body["data"]["answers"], json!([]));
    }

    #[backend_test]
    async fn answers_newest_first(client: Client, store: Db) {
        let survey = store.insert_survey(SurveyCore::example()).await.unwrap();
        let mut first = AnswerCore::example(survey.id);
        first.created_at = first.created_at - chrono::Duration::seconds(5);
        let first = store.insert_answer(first).await.unwrap();
        let mut second = AnswerCore::example(survey.id);
        second.by = Some("Bo".to_string());
        let second = store.insert_answer(second).await.unwrap();

        let body = execute(
            &client,
            "query Answers($survey: ID!) { answers(survey: $survey) { id survey answers by } }",
            json!({ "survey": survey.id.to_string() }),
        )
        .await;

        let answers = body["data"]["answers"].as_array().unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0]["id"], second.id.to_string());
        assert_eq!(answers[0]["by"], "Bo");
        assert_eq!(answers[1]["id"], first.id.to_string());
        // Answers have no attribution default.
        assert_eq!(answers[1]["by"], Value::Null);
        assert_eq!(answers[1]["survey"], survey.id.to_string());
        assert_eq!(answers[1]["answers"], json!([0]));
    }

    #[backend_test]
    async fn survey_by_id(client: Client) {
        let wanted = add_survey(&client, "Wanted").await;
        add_survey(&client, "Other").await;
        let query = "query One($id: ID) { survey(participant: \"p1\", id: $id) { id name } }";

        let body = execute(&client, query, json!({ "id": wanted["id"] })).await;
        assert_eq!(body["data"]["survey"], wanted);

        let body = execute(&client, query, json!({ "id": Id::new().to_string() })).await;
        assert!(body.get("errors").is_none());
        assert_eq!(body["data"]["survey"], Value::Null);

        let body = execute(&client, query, json!({ "id": "garbage" })).await;
        assert!(body.get("errors").is_none());
        assert_eq!(body["data"]["survey"], Value::Null);
    }

    #[backend_test]
    async fn survey_without_id_is_latest(client: Client) {
        let query = "{ survey(participant: \"p1\") { name } }";

        let body = execute(&client, query, json!({})).await;
        assert_eq!(body["data"]["survey"], Value::Null);

        add_survey(&client, "Older").await;
        add_survey(&client, "Newer").await;
        let body = execute(&client, query, json!({})).await;
        assert_eq!(body["data"]["survey"]["name"], "Newer");
    }

    #[backend_test]
    async fn survey_requires_participant(client: Client) {
        let body = execute(&client, "{ survey { name } }", json!({})).await;
        assert!(!body["errors"].as_array().unwrap().is_empty());
    }
}
