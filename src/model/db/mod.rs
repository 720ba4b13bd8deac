//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in a DB-friendly way, e.g.:
//!
//! - IDs and datetimes are serialised in MongoDB's own format.
//! - Field names are camelCase, matching the documents clients have always seen.

mod answer;
pub use answer::{Answer, AnswerCore, NewAnswer};

mod survey;
pub use survey::{NewSurvey, Survey, SurveyCore, ANONYMOUS};
