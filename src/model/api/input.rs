use async_graphql::{InputObject, ID};
use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::model::db::{NewAnswer, NewSurvey};

/// A survey submitted for creation.
#[derive(Debug, Clone, InputObject)]
#[graphql(name = "NewSurvey")]
pub struct NewSurveyInput {
    pub name: String,
    pub answers: Vec<String>,
    pub by: Option<String>,
}

impl NewSurveyInput {
    /// Check the input and stamp it with its creation time.
    pub fn into_new_survey(self, created_at: DateTime<Utc>) -> Result<NewSurvey> {
        if self.name.trim().is_empty() {
            return Err(Error::bad_request("survey name must not be empty"));
        }
        if self.answers.is_empty() {
            return Err(Error::bad_request("survey must offer at least one answer"));
        }
        Ok(NewSurvey {
            name: self.name,
            answers: self.answers,
            created_at,
            by: self.by,
        })
    }
}

/// An answer submitted against a survey.
#[derive(Debug, Clone, InputObject)]
#[graphql(name = "NewAnswer")]
pub struct NewAnswerInput {
    pub survey: ID,
    pub answers: Vec<i32>,
    pub by: Option<String>,
}

impl NewAnswerInput {
    /// Stamp the input with its creation time.
    pub fn into_new_answer(self, created_at: DateTime<Utc>) -> NewAnswer {
        NewAnswer {
            survey: self.survey.0,
            answers: self.answers,
            by: self.by,
            created_at,
        }
    }
}
