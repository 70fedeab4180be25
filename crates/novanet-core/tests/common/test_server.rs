//! Minimal HTTP/1.1 server for integration tests.
//!
//! Answers each connection with the next scripted response (repeating the
//! last one once the script is exhausted) and records request lines.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Scripted {
    pub status: u16,
    pub reason: &'static str,
    pub body: Vec<u8>,
    /// Sleep before answering (simulates a slow server).
    pub delay: Duration,
}

impl Scripted {
    pub fn new(status: u16, reason: &'static str, body: &str) -> Self {
        Self {
            status,
            reason,
            body: body.as_bytes().to_vec(),
            delay: Duration::ZERO,
        }
    }

    pub fn ok(body: &str) -> Self {
        Self::new(200, "OK", body)
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

pub struct TestServer {
    pub url: String,
    hits: Arc<AtomicUsize>,
    request_lines: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn request_lines(&self) -> Vec<String> {
        self.request_lines.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread. Runs until the process exits.
pub fn start(script: Vec<Scripted>) -> TestServer {
    assert!(!script.is_empty(), "script needs at least one response");
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(AtomicUsize::new(0));
    let request_lines = Arc::new(Mutex::new(Vec::new()));
    let script = Arc::new(script);
    {
        let hits = Arc::clone(&hits);
        let request_lines = Arc::clone(&request_lines);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let n = hits.fetch_add(1, Ordering::SeqCst);
                let response = script[n.min(script.len() - 1)].clone();
                let request_lines = Arc::clone(&request_lines);
                thread::spawn(move || handle(stream, &response, &request_lines));
            }
        });
    }
    TestServer {
        url: format!("http://127.0.0.1:{}/", port),
        hits,
        request_lines,
    }
}

/// A URL on a port where nothing is listening.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

fn handle(mut stream: std::net::TcpStream, response: &Scripted, lines: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let method_line = request.lines().next().unwrap_or("").to_string();
    let is_head = method_line.starts_with("HEAD ");
    lines.lock().unwrap().push(method_line);

    if !response.delay.is_zero() {
        thread::sleep(response.delay);
    }

    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        response.reason,
        response.body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    if !is_head {
        let _ = stream.write_all(&response.body);
    }
}
