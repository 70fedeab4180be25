//! Persistent offline queue and error log (SQLite via sqlx).
//!
//! Requests made while offline are stored as JSON and replayed later;
//! final request failures are appended to a bounded error log.

mod db;
mod errors;
mod pending;
pub mod types;

pub use db::OfflineDb;
pub use types::*;

#[cfg(test)]
mod tests;
