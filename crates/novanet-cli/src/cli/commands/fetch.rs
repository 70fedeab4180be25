//! `novanet fetch <url>` – send one request with retries.

use anyhow::{bail, Context, Result};
use clap::Args;
use novanet_core::config::NovaConfig;
use novanet_core::connectivity::{ConnectivityMonitor, HeadProbe, LivenessProbe};
use novanet_core::offline_db::OfflineDb;
use novanet_core::retry::OnRetry;
use novanet_core::{
    CancelToken, ClassifiedError, Client, Method, RequestConfig, RequestError, SendOutcome,
};

use super::ctrl_c_token;

/// Request options shared by `fetch` and `queue add`.
#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    /// HTTP/HTTPS URL.
    pub url: String,
    /// HTTP method (default GET, or POST when --data is given).
    #[arg(short = 'X', long = "request", value_name = "METHOD")]
    pub method: Option<String>,
    /// Extra header, repeatable.
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
    pub headers: Vec<String>,
    /// Request body.
    #[arg(short = 'd', long = "data")]
    pub data: Option<String>,
    /// Per-attempt timeout (default from config).
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,
    /// Maximum attempts including the first (default from config).
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,
}

impl FetchArgs {
    /// Build the request, starting from the config defaults.
    pub fn to_request(&self, cfg: &NovaConfig) -> Result<RequestConfig> {
        let method = match self.method.as_deref() {
            Some(m) => Method::parse(m).with_context(|| format!("unsupported method {:?}", m))?,
            None if self.data.is_some() => Method::Post,
            None => Method::Get,
        };
        let mut request = cfg.request(self.url.clone()).with_method(method);
        for h in &self.headers {
            let Some((name, value)) = h.split_once(':') else {
                bail!("header must look like \"Name: value\", got {:?}", h);
            };
            request = request.with_header(name.trim(), value.trim());
        }
        if let Some(data) = &self.data {
            request = request.with_body(data.as_bytes().to_vec());
        }
        if let Some(ms) = self.timeout_ms {
            request = request.with_timeout_ms(ms);
        }
        if let Some(n) = self.max_retries {
            request = request.with_max_retries(n);
        }
        request.validate()?;
        Ok(request)
    }
}

pub async fn run_fetch(cfg: &NovaConfig, args: &FetchArgs, queue_offline: bool) -> Result<()> {
    let request = args.to_request(cfg)?;
    let store = OfflineDb::open_default().await?;
    let mut client = Client::new(cfg.clone()).with_store(store);
    if queue_offline {
        let online = probe_once(cfg).await;
        client = client.with_connectivity(ConnectivityMonitor::new(cfg.connectivity.clone(), online));
    }

    let cancel = ctrl_c_token();
    let observer: OnRetry = &|e: &ClassifiedError, attempt: u32| {
        eprintln!("attempt {} failed ({}), retrying: {}", attempt, e.kind, e.message);
    };

    match client
        .send_or_queue(&request, Some("cli/fetch"), &cancel, Some(observer))
        .await
    {
        Ok(SendOutcome::Sent(resp)) => {
            eprintln!("{} {}", resp.status, resp.status_text);
            println!("{}", resp.text());
            Ok(())
        }
        Ok(SendOutcome::Queued(id)) => {
            println!("Offline: queued request {id} for {}", request.url);
            Ok(())
        }
        Err(e) => {
            if let Some(body) = e.cause.as_request().and_then(RequestError::body_text) {
                println!("{}", body);
            }
            eprintln!("{}", e.user_message);
            Err(e.into())
        }
    }
}

async fn probe_once(cfg: &NovaConfig) -> bool {
    let probe = HeadProbe::new(
        cfg.connectivity.probe_url.clone(),
        cfg.connectivity.probe_timeout_ms,
    );
    tokio::task::spawn_blocking(move || probe.probe(&CancelToken::new()))
        .await
        .map(|r| r.is_ok())
        .unwrap_or(false)
}
