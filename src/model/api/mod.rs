//! API-compatible types.
//!
//! The types in this module are shaped for clients, e.g.:
//!
//! - IDs are serialised as hex strings.
//! - Datetimes are serialised as ISO-8601 strings.
//! - Derived fields (attribution defaults, answer counts) are resolved.

mod date;
pub use date::Date;

mod input;
pub use input::{NewAnswerInput, NewSurveyInput};

mod survey;
pub use survey::SurveyView;
