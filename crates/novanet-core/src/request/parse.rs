//! Parse raw header lines collected by curl into status text and header pairs.

/// Status line reason phrase and header pairs of the last response in `lines`.
///
/// With redirects curl reports the headers of every hop; each `HTTP/` status
/// line starts a new block, so only the final block is kept.
pub(crate) fn parse_headers(lines: &[String]) -> (String, Vec<(String, String)>) {
    let mut status_text = String::new();
    let mut headers = Vec::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            status_text = reason_phrase(line);
            headers.clear();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    (status_text, headers)
}

/// "HTTP/1.1 404 Not Found" -> "Not Found". HTTP/2 status lines have no phrase.
fn reason_phrase(status_line: &str) -> String {
    let mut parts = status_line.splitn(3, ' ');
    let _version = parts.next();
    let _code = parts.next();
    parts.next().unwrap_or("").trim().to_string()
}

/// Fallback reason phrase when the server sent none.
pub(crate) fn canonical_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        408 => "Request Timeout",
        409 => "Conflict",
        413 => "Payload Too Large",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}
