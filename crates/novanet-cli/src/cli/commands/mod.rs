//! CLI command handlers. Each command is in its own file.

mod classify;
mod errors;
mod fetch;
mod probe;
mod queue;
mod watch;

pub use classify::run_classify;
pub use errors::run_errors;
pub use fetch::{run_fetch, FetchArgs};
pub use probe::run_probe;
pub use queue::{run_queue_add, run_queue_flush, run_queue_list};
pub use watch::run_watch;

use novanet_core::CancelToken;

/// Token cancelled on the first Ctrl-C.
pub(crate) fn ctrl_c_token() -> CancelToken {
    let cancel = CancelToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, cancelling");
            token.cancel();
        }
    });
    cancel
}
