//! Request executor: one HTTP call bounded by a timeout.
//!
//! Uses the curl crate (libcurl). Retries are layered above in `retry`;
//! this module never re-issues a request on its own.

mod config;
mod error;
mod execute;
mod parse;
mod response;

pub use config::{
    Method, RequestConfig, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_DELAY_MS, DEFAULT_MAX_RETRIES,
    DEFAULT_TIMEOUT_MS,
};
pub use error::RequestError;
pub use execute::{execute, execute_blocking};
pub use response::Response;
