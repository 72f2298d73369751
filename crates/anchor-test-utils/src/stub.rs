//! Minimal HTTP/1.1 server answering from a closure
//!
//! One request per connection; every response carries `Connection: close`.

use parking_lot::Mutex;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

type Responder = dyn Fn(&StubRequest) -> (u16, String) + Send + Sync;

/// Request as received by [`StubServer`]
#[derive(Debug, Clone)]
pub struct StubRequest {
    pub method: String,
    /// Path including any query string
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl StubRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON, `Null` if it is not JSON
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    /// `method` of a JSON-RPC request body
    pub fn rpc_method(&self) -> Option<String> {
        self.json()["method"].as_str().map(ToString::to_string)
    }

    /// First entry of a JSON-RPC request's `params`
    pub fn rpc_param(&self) -> Value {
        self.json()["params"][0].clone()
    }
}

/// HTTP server on an ephemeral local port, stopped on drop
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<StubRequest>>>,
    task: JoinHandle<()>,
}

impl StubServer {
    /// Serve every request with `respond`, which returns status and body
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(&StubRequest) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let respond: Arc<Responder> = Arc::new(respond);

        let log = Arc::clone(&requests);
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let log = Arc::clone(&log);
                let respond = Arc::clone(&respond);
                tokio::spawn(async move {
                    serve(stream, &log, respond.as_ref()).await;
                });
            }
        });

        Self { addr, requests, task }
    }

    /// JSON-RPC endpoint that answers `rpc(method, first_param)` with a
    /// `result`; `Err((code, message))` becomes a JSON-RPC error
    pub async fn json_rpc<F>(rpc: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<Value, (i64, String)> + Send + Sync + 'static,
    {
        Self::start(move |request| {
            let body = request.json();
            let method = body["method"].as_str().unwrap_or_default();
            let reply = match rpc(method, &body["params"][0]) {
                Ok(result) => serde_json::json!({ "jsonrpc": "2.0", "id": body["id"], "result": result }),
                Err((code, message)) => serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": body["id"],
                    "error": { "code": code, "message": message }
                }),
            };
            (200, reply.to_string())
        })
        .await
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `http://127.0.0.1:<port>`
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests.lock().clone()
    }

    /// `method` of every JSON-RPC request received so far
    pub fn rpc_methods(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .filter_map(StubRequest::rpc_method)
            .collect()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl std::fmt::Debug for StubServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubServer").field("addr", &self.addr).finish_non_exhaustive()
    }
}

async fn serve(mut stream: TcpStream, log: &Mutex<Vec<StubRequest>>, respond: &Responder) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };
    let (status, body) = respond(&request);
    log.lock().push(request);

    let response = format!(
        "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        reason(status),
        body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

async fn read_request(stream: &mut TcpStream) -> Option<StubRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(i) = find(&buf, b"\r\n\r\n") {
            break i;
        }
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();

    let header = |name: &str| {
        headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
    };
    let chunked = header("transfer-encoding").is_some_and(|v| v.eq_ignore_ascii_case("chunked"));
    let length: usize = header("content-length").and_then(|v| v.parse().ok()).unwrap_or(0);

    let mut body = buf.split_off(head_end + 4);
    loop {
        let complete = if chunked {
            body.ends_with(b"0\r\n\r\n")
        } else {
            body.len() >= length
        };
        if complete {
            break;
        }
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(StubRequest {
        method,
        path,
        headers,
        body,
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
