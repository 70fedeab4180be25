//! Tests for offline_db (in-memory DB).

use super::OfflineDb;
use crate::classify::{classify, ErrorKind, Severity};
use crate::request::{Method, RequestConfig, RequestError};

#[tokio::test]
async fn enqueue_list_remove_pending() {
    let db = OfflineDb::open_memory().await.unwrap();
    assert_eq!(db.pending_count().await.unwrap(), 0);

    let first = RequestConfig::get("https://api.example.com/todos")
        .with_method(Method::Post)
        .with_body(br#"{"title":"milk"}"#.to_vec());
    let second = RequestConfig::get("https://api.example.com/todos/3").with_method(Method::Delete);
    let id1 = db.enqueue(&first, Some("todos/create")).await.unwrap();
    let id2 = db.enqueue(&second, None).await.unwrap();
    assert!(id2 > id1);

    let pending = db.list_pending().await.unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].id, id1);
    assert_eq!(pending[0].config, first);
    assert_eq!(pending[0].context.as_deref(), Some("todos/create"));
    assert_eq!(pending[1].config.method, Method::Delete);

    db.mark_attempt(id1).await.unwrap();
    assert_eq!(db.list_pending().await.unwrap()[0].attempts, 1);

    assert!(db.remove_pending(id1).await.unwrap());
    assert!(!db.remove_pending(id1).await.unwrap());
    assert_eq!(db.pending_count().await.unwrap(), 1);
}

#[tokio::test]
async fn log_and_list_errors_newest_first() {
    let db = OfflineDb::open_memory().await.unwrap();
    let quota = classify("QuotaExceededError", Some("storage"));
    let forbidden = classify(
        RequestError::Http {
            status: 403,
            status_text: "Forbidden".to_string(),
            body: Vec::new(),
        },
        None,
    );
    db.log_error(&quota).await.unwrap();
    db.log_error(&forbidden).await.unwrap();
    db.log_error(&forbidden).await.unwrap();

    let recent = db.recent_errors(10).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id, forbidden.id.to_string());
    assert_eq!(recent[0].kind, ErrorKind::Permission);
    assert_eq!(recent[0].status, Some(403));
    assert_eq!(recent[1].kind, ErrorKind::Quota);
    assert_eq!(recent[1].severity, Severity::High);
    assert_eq!(recent[1].context.as_deref(), Some("storage"));
    assert!(!recent[1].retryable);
}

#[tokio::test]
async fn prune_keeps_newest() {
    let db = OfflineDb::open_memory().await.unwrap();
    for i in 0..5 {
        db.log_error(&classify(format!("failure {i}"), None)).await.unwrap();
    }
    assert_eq!(db.prune_errors(2).await.unwrap(), 3);
    let recent = db.recent_errors(10).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].message, "failure 4");
    assert_eq!(db.clear_errors().await.unwrap(), 2);
    assert!(db.recent_errors(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn file_backed_db_persists_across_opens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state dir").join("novanet.db");
    {
        let db = OfflineDb::open_at(&path).await.unwrap();
        db.enqueue(&RequestConfig::get("https://example.com/a"), None)
            .await
            .unwrap();
    }
    let db = OfflineDb::open_at(&path).await.unwrap();
    let pending = db.list_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].config.url, "https://example.com/a");
}
