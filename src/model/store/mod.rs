//! The persistence gateway: a narrow create/read/count interface over the
//! `surveys` and `answers` collections.

use std::sync::Arc;

use crate::error::Result;
use crate::model::{
    db::{Answer, NewAnswer, NewSurvey, Survey},
    mongodb::Id,
};

#[cfg(test)]
mod memory;
mod mongo;

#[cfg(test)]
pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Shared handle on whichever store is backing the server.
pub type Db = Arc<dyn SurveyStore>;

/// Create/read/count operations on surveys and answers.
///
/// There are no transactions and no retries; errors from the underlying
/// store are passed straight back.
#[rocket::async_trait]
pub trait SurveyStore: Send + Sync {
    /// Insert a new survey, returning it with its assigned ID.
    async fn insert_survey(&self, survey: NewSurvey) -> Result<Survey>;

    /// All surveys, most recently created first.
    async fn surveys(&self) -> Result<Vec<Survey>>;

    /// The survey with the given ID, if there is one.
    async fn survey_by_id(&self, id: Id) -> Result<Option<Survey>>;

    /// The most recently created survey, if there is one.
    async fn latest_survey(&self) -> Result<Option<Survey>>;

    /// Insert a new answer, returning it with its assigned ID.
    async fn insert_answer(&self, answer: NewAnswer) -> Result<Answer>;

    /// All answers whose `survey` field equals `survey`, most recently created first.
    async fn answers_for_survey(&self, survey: &str) -> Result<Vec<Answer>>;

    /// The number of answers whose `survey` field equals `survey`.
    async fn count_answers(&self, survey: &str) -> Result<u64>;
}
