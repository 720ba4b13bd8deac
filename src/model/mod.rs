//! Survey service data model.
//!
//! - [`db`] holds the records exactly as they live in the document store.
//! - [`api`] holds the client-facing views, inputs and scalars.
//! - [`store`] is the persistence gateway over those records.

pub mod api;
pub mod db;
pub mod mongodb;
pub mod store;
