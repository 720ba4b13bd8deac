use serde::Serialize;

use crate::model::db::Survey;

use super::Date;

/// A fully resolved survey, as broadcast to real-time listeners.
///
/// Matches the shape of the GraphQL `Survey` type field for field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyView {
    pub id: String,
    pub name: String,
    pub answers: Vec<String>,
    pub nb_answers: u64,
    pub created_at: Date,
    pub by: String,
}

impl SurveyView {
    pub fn new(survey: &Survey, nb_answers: u64) -> Self {
        Self {
            id: survey.id.to_string(),
            name: survey.name.clone(),
            answers: survey.answers.clone(),
            nb_answers,
            created_at: survey.created_at.into(),
            by: survey.attribution().to_string(),
        }
    }
}
