//! MythWeaver Core - Tabletop Campaign Companion Backend
//!
//! Data layer for the MythWeaver companion app: identity provisioning,
//! per-user access isolation, and campaign/character progression state.

pub mod config;
pub mod core;
pub mod database;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
