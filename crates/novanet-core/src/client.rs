//! Client: request executor + retry controller, with optional error log,
//! offline queue and connectivity gating.

use anyhow::Result;

use crate::classify::{classify, ClassifiedError, Failure};
use crate::config::NovaConfig;
use crate::connectivity::ConnectivityMonitor;
use crate::control::CancelToken;
use crate::offline_db::{OfflineDb, PendingId};
use crate::request::{execute, RequestConfig, Response};
use crate::retry::{run_with_retry, OnRetry, RetryPolicy};

/// Result of `send_or_queue`.
#[derive(Debug)]
pub enum SendOutcome {
    Sent(Response),
    /// Stored for replay because the monitor reported offline.
    Queued(PendingId),
}

/// Summary of one `flush_queue` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub sent: usize,
    /// Dropped after a non-retryable failure (the error is in the log).
    pub dropped: usize,
    pub remaining: usize,
}

#[derive(Clone)]
pub struct Client {
    config: NovaConfig,
    policy: RetryPolicy,
    store: Option<OfflineDb>,
    connectivity: Option<ConnectivityMonitor>,
}

impl Client {
    pub fn new(config: NovaConfig) -> Self {
        let policy = config.retry.policy();
        Self {
            config,
            policy,
            store: None,
            connectivity: None,
        }
    }

    /// Log final failures to `store` and use it for the offline queue.
    pub fn with_store(mut self, store: OfflineDb) -> Self {
        self.store = Some(store);
        self
    }

    /// Consult `monitor` in `send_or_queue`.
    pub fn with_connectivity(mut self, monitor: ConnectivityMonitor) -> Self {
        self.connectivity = Some(monitor);
        self
    }

    pub fn config(&self) -> &NovaConfig {
        &self.config
    }

    pub fn store(&self) -> Option<&OfflineDb> {
        self.store.as_ref()
    }

    /// GET request for `url` using this client's configured defaults.
    pub fn request(&self, url: impl Into<String>) -> RequestConfig {
        self.config.request(url)
    }

    /// Send with retries. Only the final failure is returned (and logged).
    pub async fn send(
        &self,
        request: &RequestConfig,
        cancel: &CancelToken,
        on_retry: Option<OnRetry<'_>>,
    ) -> Result<Response, ClassifiedError> {
        self.send_with_context(request, None, cancel, on_retry).await
    }

    /// `send` with a context tag attached to any classified error.
    pub async fn send_with_context(
        &self,
        request: &RequestConfig,
        context: Option<&str>,
        cancel: &CancelToken,
        on_retry: Option<OnRetry<'_>>,
    ) -> Result<Response, ClassifiedError> {
        let policy = request.retry_policy(&self.policy);
        let result = run_with_retry(&policy, cancel, context, on_retry, move |_| {
            execute(request, cancel)
        })
        .await;
        if let Err(error) = &result {
            if !error.is_cancelled() {
                self.record(error).await;
            }
        }
        result
    }

    /// Queue `request` when the attached monitor reports offline, otherwise send it.
    pub async fn send_or_queue(
        &self,
        request: &RequestConfig,
        context: Option<&str>,
        cancel: &CancelToken,
        on_retry: Option<OnRetry<'_>>,
    ) -> Result<SendOutcome, ClassifiedError> {
        let offline = self
            .connectivity
            .as_ref()
            .map(|m| !m.is_online())
            .unwrap_or(false);
        let Some(store) = self.store.as_ref().filter(|_| offline) else {
            return self
                .send_with_context(request, context, cancel, on_retry)
                .await
                .map(SendOutcome::Sent);
        };

        if let Err(e) = request.validate() {
            let error = classify(e, context);
            self.record(&error).await;
            return Err(error);
        }
        match store.enqueue(request, context).await {
            Ok(id) => {
                tracing::info!(id, url = %request.url, "offline: request queued");
                Ok(SendOutcome::Queued(id))
            }
            Err(e) => {
                let error = classify(Failure::message(format!("offline queue: {:#}", e)), context);
                self.record(&error).await;
                Err(error)
            }
        }
    }

    /// Replay queued requests oldest first.
    ///
    /// Successes and non-retryable failures leave the queue; the first
    /// retryable failure (or cancellation) stops the pass.
    pub async fn flush_queue(&self, cancel: &CancelToken) -> Result<FlushReport> {
        let Some(store) = self.store.as_ref() else {
            return Ok(FlushReport::default());
        };
        let mut report = FlushReport::default();

        for pending in store.list_pending().await? {
            if cancel.is_cancelled() {
                break;
            }
            match self
                .send_with_context(&pending.config, pending.context.as_deref(), cancel, None)
                .await
            {
                Ok(_) => {
                    store.remove_pending(pending.id).await?;
                    report.sent += 1;
                }
                Err(e) if e.is_cancelled() => break,
                Err(e) if e.retryable => {
                    store.mark_attempt(pending.id).await?;
                    tracing::info!(id = pending.id, "replay stopped: {}", e);
                    break;
                }
                Err(e) => {
                    store.remove_pending(pending.id).await?;
                    tracing::warn!(id = pending.id, "dropping queued request: {}", e);
                    report.dropped += 1;
                }
            }
        }

        report.remaining = store.pending_count().await? as usize;
        Ok(report)
    }

    async fn record(&self, error: &ClassifiedError) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.log_error(error).await {
            tracing::warn!("error log write failed: {:#}", e);
            return;
        }
        if let Err(e) = store.prune_errors(self.config.max_logged_errors()).await {
            tracing::warn!("error log prune failed: {:#}", e);
        }
    }
}
