use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// Attribution shown for surveys created without a `by`.
pub const ANONYMOUS: &str = "Anonymous";

/// Core survey data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyCore {
    /// Survey title.
    pub name: String,
    /// Option labels; answers refer to these by index.
    pub answers: Vec<String>,
    /// Creation time, stamped by the server.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    /// Free-text attribution, stored as given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
}

impl SurveyCore {
    /// The attribution to show for this survey, falling back to
    /// [`ANONYMOUS`] when none (or an empty one) was given.
    pub fn attribution(&self) -> &str {
        match self.by.as_deref() {
            Some(by) if !by.is_empty() => by,
            _ => ANONYMOUS,
        }
    }
}

/// A survey without an ID.
pub type NewSurvey = SurveyCore;

/// A survey from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub survey: SurveyCore,
}

impl Deref for Survey {
    type Target = SurveyCore;

    fn deref(&self) -> &Self::Target {
        &self.survey
    }
}

impl DerefMut for Survey {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.survey
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl SurveyCore {
        pub fn example() -> Self {
            Self {
                name: "Lunch".to_string(),
                answers: vec!["Pizza".to_string(), "Salad".to_string()],
                created_at: Utc::now(),
                by: Some("Al".to_string()),
            }
        }

        pub fn example_anonymous() -> Self {
            Self {
                name: "Vote".to_string(),
                answers: vec!["Yes".to_string(), "No".to_string()],
                created_at: Utc::now(),
                by: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribution_defaults() {
        assert_eq!(SurveyCore::example().attribution(), "Al");
        assert_eq!(SurveyCore::example_anonymous().attribution(), ANONYMOUS);

        let mut survey = SurveyCore::example();
        survey.by = Some(String::new());
        assert_eq!(survey.attribution(), ANONYMOUS);
    }

    #[test]
    fn stored_document_shape() {
        let survey = Survey {
            id: Id::new(),
            survey: SurveyCore::example_anonymous(),
        };
        let doc = mongodb::bson::to_document(&survey).unwrap();

        assert!(doc.get_object_id("_id").is_ok());
        assert_eq!(doc.get_str("name").unwrap(), "Vote");
        assert!(doc.get_datetime("createdAt").is_ok());
        assert!(!doc.contains_key("by"));
    }
}
