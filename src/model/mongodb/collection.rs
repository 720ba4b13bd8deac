use std::ops::Deref;

use log::debug;
use mongodb::{bson::doc, error::Error as DbError, Collection, Database, IndexModel};

use crate::model::db::{Answer, AnswerCore, Survey, SurveyCore};

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// Survey collections
const SURVEYS: &str = "surveys";
impl MongoCollection for SurveyCore {
    const NAME: &'static str = SURVEYS;
}
impl MongoCollection for Survey {
    const NAME: &'static str = SURVEYS;
}

// Answer collections
const ANSWERS: &str = "answers";
impl MongoCollection for AnswerCore {
    const NAME: &'static str = ANSWERS;
}
impl MongoCollection for Answer {
    const NAME: &'static str = ANSWERS;
}

/// Ensure that all the required indexes exist on the given database.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    // Survey listing is always newest first.
    let survey_index = IndexModel::builder()
        .keys(doc! {"createdAt": -1})
        .build();
    Coll::<SurveyCore>::from_db(db)
        .create_index(survey_index, None)
        .await?;

    // Answers are listed and counted per survey.
    let answer_index = IndexModel::builder()
        .keys(doc! {"survey": 1, "createdAt": -1})
        .build();
    Coll::<AnswerCore>::from_db(db)
        .create_index(answer_index, None)
        .await?;

    Ok(())
}
