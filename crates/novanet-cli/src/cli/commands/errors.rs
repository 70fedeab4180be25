//! `novanet errors` – show or clear the error log.

use anyhow::Result;
use novanet_core::offline_db::OfflineDb;

pub async fn run_errors(limit: u32, clear: bool) -> Result<()> {
    let db = OfflineDb::open_default().await?;
    if clear {
        let n = db.clear_errors().await?;
        println!("Cleared {n} error(s).");
        return Ok(());
    }
    let errors = db.recent_errors(limit).await?;
    if errors.is_empty() {
        println!("No errors logged.");
        return Ok(());
    }
    println!(
        "{:<20} {:<11} {:<9} {:<6} {}",
        "TIME", "KIND", "SEVERITY", "RETRY", "MESSAGE"
    );
    for e in errors {
        println!(
            "{:<20} {:<11} {:<9} {:<6} {}",
            e.timestamp.format("%Y-%m-%d %H:%M:%S"),
            e.kind,
            e.severity,
            if e.retryable { "yes" } else { "no" },
            e.message
        );
    }
    Ok(())
}
