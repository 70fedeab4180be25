//! `novanet queue list|add|flush` – offline request queue.

use anyhow::Result;
use novanet_core::config::NovaConfig;
use novanet_core::offline_db::OfflineDb;
use novanet_core::Client;

use super::{ctrl_c_token, FetchArgs};

pub async fn run_queue_list() -> Result<()> {
    let db = OfflineDb::open_default().await?;
    let pending = db.list_pending().await?;
    if pending.is_empty() {
        println!("No queued requests.");
    } else {
        println!("{:<6} {:<7} {:<8} {}", "ID", "METHOD", "TRIES", "URL");
        for p in pending {
            println!(
                "{:<6} {:<7} {:<8} {}",
                p.id, p.config.method, p.attempts, p.config.url
            );
        }
    }
    Ok(())
}

pub async fn run_queue_add(cfg: &NovaConfig, args: &FetchArgs) -> Result<()> {
    let request = args.to_request(cfg)?;
    let db = OfflineDb::open_default().await?;
    let id = db.enqueue(&request, Some("cli/queue")).await?;
    println!("Queued request {id} for {}", request.url);
    Ok(())
}

pub async fn run_queue_flush(cfg: &NovaConfig) -> Result<()> {
    let db = OfflineDb::open_default().await?;
    let client = Client::new(cfg.clone()).with_store(db);
    let report = client.flush_queue(&ctrl_c_token()).await?;
    println!(
        "sent {}  dropped {}  remaining {}",
        report.sent, report.dropped, report.remaining
    );
    Ok(())
}
