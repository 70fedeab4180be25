//! One bounded HTTP request via libcurl.

use std::str;
use std::time::{Duration, Instant};

use super::parse::{canonical_reason, parse_headers};
use super::{Method, RequestConfig, RequestError, Response};
use crate::control::CancelToken;

/// Upper bound for the connect phase; the overall timeout still applies.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Runs `execute_blocking` on the blocking pool so async callers are not stalled.
pub async fn execute(config: &RequestConfig, cancel: &CancelToken) -> Result<Response, RequestError> {
    let config = config.clone();
    let cancel = cancel.clone();
    tokio::task::spawn_blocking(move || execute_blocking(&config, &cancel))
        .await
        .map_err(|e| RequestError::Executor(e.to_string()))?
}

/// Issues exactly one request described by `config`. No retries.
///
/// libcurl enforces `timeout_ms` and tears the transfer down when it fires.
/// The cancel token is polled from the progress callback; returning false
/// there aborts the in-flight transfer.
pub fn execute_blocking(config: &RequestConfig, cancel: &CancelToken) -> Result<Response, RequestError> {
    config.validate()?;
    if cancel.is_cancelled() {
        return Err(RequestError::Cancelled);
    }

    let mut header_lines: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();
    let started = Instant::now();

    let mut easy = curl::easy::Easy::new();
    easy.url(&config.url).map_err(RequestError::Transport)?;
    easy.follow_location(true).map_err(RequestError::Transport)?;
    easy.max_redirections(10).map_err(RequestError::Transport)?;
    easy.connect_timeout(CONNECT_TIMEOUT.min(config.timeout()))
        .map_err(RequestError::Transport)?;
    easy.timeout(config.timeout()).map_err(RequestError::Transport)?;
    easy.progress(true).map_err(RequestError::Transport)?;
    apply_method(&mut easy, config).map_err(RequestError::Transport)?;

    let mut list = curl::easy::List::new();
    for (k, v) in &config.headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))
            .map_err(RequestError::Transport)?;
    }
    if !config.headers.is_empty() {
        easy.http_headers(list).map_err(RequestError::Transport)?;
    }

    tracing::debug!(method = %config.method, url = %config.url, timeout_ms = config.timeout_ms, "request start");

    let perform_result = {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })
            .map_err(RequestError::Transport)?;
        transfer
            .write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(RequestError::Transport)?;
        transfer
            .progress_function(|_, _, _, _| !cancel.is_cancelled())
            .map_err(RequestError::Transport)?;
        transfer.perform()
    };

    if let Err(e) = perform_result {
        let elapsed_ms = started.elapsed().as_millis() as u64;
        if e.is_aborted_by_callback() && cancel.is_cancelled() {
            tracing::debug!(url = %config.url, elapsed_ms, "request cancelled");
            return Err(RequestError::Cancelled);
        }
        if e.is_operation_timedout() {
            tracing::debug!(url = %config.url, elapsed_ms, "request timed out");
            return Err(RequestError::Timeout {
                after_ms: config.timeout_ms,
            });
        }
        tracing::debug!(url = %config.url, "request transport error: {}", e);
        return Err(RequestError::Transport(e));
    }

    let status = easy.response_code().map_err(RequestError::Transport)? as u16;
    let (mut status_text, headers) = parse_headers(&header_lines);
    if status_text.is_empty() {
        status_text = canonical_reason(status).to_string();
    }

    tracing::debug!(
        url = %config.url,
        status,
        bytes = body.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request done"
    );

    if !(200..300).contains(&status) {
        return Err(RequestError::Http {
            status,
            status_text,
            body,
        });
    }

    Ok(Response {
        data: body,
        status,
        status_text,
        headers,
        ok: true,
    })
}

fn apply_method(easy: &mut curl::easy::Easy, config: &RequestConfig) -> Result<(), curl::Error> {
    match config.method {
        Method::Get => easy.get(true)?,
        Method::Head => easy.nobody(true)?,
        Method::Post => {
            easy.post(true)?;
            easy.post_fields_copy(config.body.as_deref().unwrap_or_default())?;
        }
        Method::Put | Method::Patch | Method::Delete => {
            easy.custom_request(config.method.as_str())?;
            if let Some(body) = &config.body {
                easy.post_fields_copy(body)?;
            }
        }
    }
    Ok(())
}
