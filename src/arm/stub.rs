//! Scripted HTTP/1.1 responder on a loopback port, for exercising `ArmClient`.
//!
//! Each accepted connection carries exactly one request (responses are sent
//! with `Connection: close`). Queued responses are handed out in order; once
//! the queue runs dry every request gets a 500.

use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use url::Url;

#[derive(Debug, Clone)]
pub struct Canned {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Canned {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: vec![("content-type".into(), "application/json".into())],
            body: body.to_string(),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }
}

/// One request as the server saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    /// Path plus query, e.g. `/subscriptions/s/resourcegroups?api-version=...`.
    pub target: String,
    pub authorization: Option<String>,
    pub body: String,
}

pub struct StubServer {
    base: Url,
    queue: Arc<Mutex<VecDeque<Canned>>>,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl StubServer {
    /// Bind to an ephemeral port and serve on the current runtime.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let queue = Arc::new(Mutex::new(VecDeque::new()));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let pending = Arc::clone(&queue);
        let log = Arc::clone(&seen);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let (read, mut write) = stream.into_split();
                let mut reader = BufReader::new(read);
                let Some(request) = read_request(&mut reader).await else {
                    continue;
                };
                let next = pending.lock().unwrap().pop_front();
                let canned = next.unwrap_or_else(|| {
                    Canned::json(
                        500,
                        json!({"error": {"code": "Unscripted", "message": "no response left"}}),
                    )
                });
                let head_only = request.method == "HEAD";
                log.lock().unwrap().push(request);
                let _ = write.write_all(&render(&canned, head_only)).await;
                let _ = write.shutdown().await;
            }
        });

        Self {
            base: Url::parse(&format!("http://{addr}/")).unwrap(),
            queue,
            seen,
        }
    }

    /// Queue the response for the next unanswered request.
    pub fn respond(&self, canned: Canned) {
        self.queue.lock().unwrap().push_back(canned);
    }

    /// Endpoint to hand to `ClientOptions`.
    pub fn endpoint(&self) -> Url {
        self.base.clone()
    }

    /// Absolute URL on this server, for `nextLink` and operation headers.
    pub fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base.as_str().trim_end_matches('/'), path_and_query)
    }

    pub fn requests(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

async fn read_request<R: AsyncBufRead + Unpin>(reader: &mut R) -> Option<Seen> {
    let mut line = String::new();
    reader.read_line(&mut line).await.ok()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();

    let mut content_length = 0usize;
    let mut authorization = None;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).await.ok()? == 0 {
            break;
        }
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse().unwrap_or(0);
            } else if name.eq_ignore_ascii_case("authorization") {
                authorization = Some(value.to_string());
            }
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).await.ok()?;
    Some(Seen {
        method,
        target,
        authorization,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

fn render(canned: &Canned, head_only: bool) -> Vec<u8> {
    let reason = reqwest::StatusCode::from_u16(canned.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Status");
    let mut out = format!("HTTP/1.1 {} {reason}\r\n", canned.status);
    for (name, value) in &canned.headers {
        out.push_str(&format!("{name}: {value}\r\n"));
    }
    out.push_str(&format!("content-length: {}\r\nconnection: close\r\n\r\n", canned.body.len()));
    if !head_only {
        out.push_str(&canned.body);
    }
    out.into_bytes()
}
