//! `novanet probe [url]` – one liveness probe.

use anyhow::{Context, Result};
use novanet_core::config::NovaConfig;
use novanet_core::connectivity::{EffectiveType, HeadProbe, LivenessProbe};

use super::ctrl_c_token;

pub async fn run_probe(cfg: &NovaConfig, url: Option<&str>) -> Result<()> {
    let url = url.unwrap_or(&cfg.connectivity.probe_url).to_string();
    let probe = HeadProbe::new(url.clone(), cfg.connectivity.probe_timeout_ms);
    let cancel = ctrl_c_token();
    let result = tokio::task::spawn_blocking(move || probe.probe(&cancel))
        .await
        .context("probe task join")?;
    match result {
        Ok(rtt) => println!(
            "online  {}  rtt={}ms  effective_type={}",
            url,
            rtt.as_millis(),
            EffectiveType::from_rtt(rtt)
        ),
        Err(e) => println!("offline  {}  {}", url, e),
    }
    Ok(())
}
