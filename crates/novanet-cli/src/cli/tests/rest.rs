//! Tests for probe, watch, classify, queue and errors.

use super::parse;
use clap::Parser;
use crate::cli::{CliCommand, QueueAction};

#[test]
fn cli_parse_probe() {
    match parse(&["novanet", "probe"]) {
        CliCommand::Probe { url } => assert!(url.is_none()),
        _ => panic!("expected Probe"),
    }
    match parse(&["novanet", "probe", "https://example.com/ping"]) {
        CliCommand::Probe { url } => assert_eq!(url.as_deref(), Some("https://example.com/ping")),
        _ => panic!("expected Probe"),
    }
}

#[test]
fn cli_parse_watch() {
    assert!(matches!(parse(&["novanet", "watch"]), CliCommand::Watch));
}

#[test]
fn cli_parse_classify() {
    match parse(&["novanet", "classify", "QuotaExceededError", "--context", "storage"]) {
        CliCommand::Classify { message, context } => {
            assert_eq!(message, "QuotaExceededError");
            assert_eq!(context.as_deref(), Some("storage"));
        }
        _ => panic!("expected Classify"),
    }
}

#[test]
fn cli_parse_queue() {
    assert!(matches!(
        parse(&["novanet", "queue", "list"]),
        CliCommand::Queue {
            action: QueueAction::List
        }
    ));
    assert!(matches!(
        parse(&["novanet", "queue", "flush"]),
        CliCommand::Queue {
            action: QueueAction::Flush
        }
    ));
    match parse(&["novanet", "queue", "add", "https://example.com/todos", "-X", "DELETE"]) {
        CliCommand::Queue {
            action: QueueAction::Add { args },
        } => {
            assert_eq!(args.url, "https://example.com/todos");
            assert_eq!(args.method.as_deref(), Some("DELETE"));
        }
        _ => panic!("expected Queue Add"),
    }
}

#[test]
fn cli_parse_errors() {
    match parse(&["novanet", "errors"]) {
        CliCommand::Errors { limit, clear } => {
            assert_eq!(limit, 20);
            assert!(!clear);
        }
        _ => panic!("expected Errors"),
    }
    match parse(&["novanet", "errors", "--limit", "5", "--clear"]) {
        CliCommand::Errors { limit, clear } => {
            assert_eq!(limit, 5);
            assert!(clear);
        }
        _ => panic!("expected Errors"),
    }
}

#[test]
fn cli_rejects_unknown_command() {
    assert!(super::Cli::try_parse_from(["novanet", "bench"]).is_err());
}
