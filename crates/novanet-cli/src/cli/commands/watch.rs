//! `novanet watch` – print connectivity changes until Ctrl-C.

use anyhow::Result;
use novanet_core::config::NovaConfig;
use novanet_core::connectivity::{ConnectivityMonitor, ConnectivityState, HeadProbe};

fn print_state(s: &ConnectivityState) {
    let rtt = s
        .rtt_ms
        .map(|ms| format!("{ms}ms"))
        .unwrap_or_else(|| "-".to_string());
    let downlink = s
        .downlink_mbps
        .map(|d| format!("{d:.1}Mbps"))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{}  {:<8} {:<8} rtt={:<8} downlink={}",
        s.last_checked.format("%H:%M:%S"),
        if s.online { "online" } else { "offline" },
        s.effective_type,
        rtt,
        downlink
    );
}

pub async fn run_watch(cfg: &NovaConfig) -> Result<()> {
    let monitor = ConnectivityMonitor::new(cfg.connectivity.clone(), true);
    let subscription = monitor.subscribe(print_state);
    let handle = monitor.start(HeadProbe::new(
        cfg.connectivity.probe_url.clone(),
        cfg.connectivity.probe_timeout_ms,
    ));

    tokio::signal::ctrl_c().await?;
    monitor.unsubscribe(subscription);
    handle.shutdown().await;
    Ok(())
}
