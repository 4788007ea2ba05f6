//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use resilient_catalog::config::CatalogConfig;

/// Request paths seen by a mock backend, in arrival order.
#[derive(Clone, Default)]
pub struct RequestLog {
    paths: Arc<Mutex<Vec<String>>>,
}

impl RequestLog {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.paths.lock().unwrap().len()
    }

    fn push(&self, path: String) {
        self.paths.lock().unwrap().push(path);
    }
}

/// Start a mock backend that always answers with `status` and `body`.
pub async fn start_mock_backend(status: u16, body: &'static str) -> (SocketAddr, RequestLog) {
    start_programmable_backend(move |_path| async move { (status, body.to_string()) }).await
}

/// Start a programmable mock backend on an ephemeral port.
///
/// The handler receives the request path (with query) and returns the
/// status code and body to send.
pub async fn start_programmable_backend<F, Fut>(f: F) -> (SocketAddr, RequestLog)
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log = RequestLog::default();
    let f = Arc::new(f);

    let requests = log.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let requests = requests.clone();
                    tokio::spawn(async move {
                        let path = read_request_path(&mut socket).await;
                        requests.push(path.clone());
                        let (status, body) = f(path).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, log)
}

/// Read the request head and return the request target.
async fn read_request_path(socket: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&head)
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string()
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Config pointing at `upstream`, with a bundled fallback dataset.
pub fn config_for(upstream: SocketAddr, degraded_mode: bool) -> CatalogConfig {
    let mut config = CatalogConfig::default();
    config.upstream.base_url = format!("http://{}/products", upstream);
    config.upstream.timeout_secs = 2;
    config.fallback.degraded_mode = degraded_mode;
    config.fallback.dataset_path =
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/mock-products.json");
    config
}
