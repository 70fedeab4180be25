pub mod config;
pub mod logging;

pub mod classify;
pub mod client;
pub mod connectivity;
pub mod control;
pub mod offline_db;
pub mod request;
pub mod retry;

pub use classify::{classify, ClassifiedError, ErrorKind, Failure, Severity};
pub use client::{Client, FlushReport, SendOutcome};
pub use control::CancelToken;
pub use request::{Method, RequestConfig, RequestError, Response};
