//! Core business logic
//!
//! Game rules shared by the data layer and logging setup for embedding
//! applications.

pub mod logging;
pub mod rules;
