use mongodb::{
    bson::{doc, Bson, Document},
    options::{FindOneOptions, FindOptions},
    Database,
};
use rocket::futures::TryStreamExt;

use crate::error::{Error, Result};
use crate::model::{
    db::{Answer, AnswerCore, NewAnswer, NewSurvey, Survey, SurveyCore},
    mongodb::{Coll, Id},
};

use super::SurveyStore;

/// A [`SurveyStore`] backed by MongoDB.
#[derive(Clone)]
pub struct MongoStore {
    new_surveys: Coll<SurveyCore>,
    surveys: Coll<Survey>,
    new_answers: Coll<AnswerCore>,
    answers: Coll<Answer>,
}

impl MongoStore {
    pub fn new(db: &Database) -> Self {
        Self {
            new_surveys: Coll::from_db(db),
            surveys: Coll::from_db(db),
            new_answers: Coll::from_db(db),
            answers: Coll::from_db(db),
        }
    }
}

/// Newest first; the ID breaks ties between records created in the same millisecond.
fn newest_first() -> Document {
    doc! { "createdAt": -1, "_id": -1 }
}

fn inserted_id(inserted: Bson) -> Result<Id> {
    inserted
        .as_object_id()
        .map(Id::from)
        .ok_or_else(|| Error::Internal(format!("Unexpected inserted ID {inserted}")))
}

#[rocket::async_trait]
impl SurveyStore for MongoStore {
    async fn insert_survey(&self, survey: NewSurvey) -> Result<Survey> {
        let result = self.new_surveys.insert_one(&survey, None).await?;
        let id = inserted_id(result.inserted_id)?;
        Ok(Survey { id, survey })
    }

    async fn surveys(&self) -> Result<Vec<Survey>> {
        let options = FindOptions::builder().sort(newest_first()).build();
        let surveys = self
            .surveys
            .find(None, options)
            .await?
            .try_collect::<Vec<_>>()
            .await?;
        Ok(surveys)
    }

    async fn survey_by_id(&self, id: Id) -> Result<Option<Survey>> {
        Ok(self.surveys.find_one(id.as_doc(), None).await?)
    }

    async fn latest_survey(&self) -> Result<Option<Survey>> {
        let options = FindOneOptions::builder().sort(newest_first()).build();
        Ok(self.surveys.find_one(None, options).await?)
    }

    async fn insert_answer(&self, answer: NewAnswer) -> Result<Answer> {
        let result = self.new_answers.insert_one(&answer, None).await?;
        let id = inserted_id(result.inserted_id)?;
        Ok(Answer { id, answer })
    }

    async fn answers_for_survey(&self, survey: &str) -> Result<Vec<Answer>> {
        let options = FindOptions::builder().sort(newest_first()).build();
        let answers = self
            .answers
            .find(doc! { "survey": survey }, options)
            .await?
            .try_collect::<Vec<_>>()
            .await?;
        Ok(answers)
    }

    async fn count_answers(&self, survey: &str) -> Result<u64> {
        Ok(self
            .answers
            .count_documents(doc! { "survey": survey }, None)
            .await?)
    }
}

/// A store whose server can never be reached, so every operation fails.
#[cfg(test)]
impl MongoStore {
    pub async fn unreachable() -> Self {
        let client = mongodb::Client::with_uri_str(
            "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200&connectTimeoutMS=200",
        )
        .await
        .unwrap();
        Self::new(&client.database("unreachable"))
    }
}
