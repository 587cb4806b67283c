//! Shared utilities for integration tests.

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use hotcfg::{Registry, Settings, Snapshot};

/// Status code and body the mock config server answers with.
#[allow(dead_code)]
pub type Reply = Arc<Mutex<(u16, String)>>;

/// Start an HTTP server that answers every request with the current `Reply`.
#[allow(dead_code)]
pub async fn start_config_server(status: u16, body: &str) -> (SocketAddr, Reply) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let reply: Reply = Arc::new(Mutex::new((status, body.to_string())));
    let shared = reply.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let reply = shared.clone();
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;

                        let (status, body) = reply.lock().clone();
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, reply)
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn payload_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

/// Log lines and snapshots observed by a registry.
#[derive(Clone, Default)]
pub struct Recorder {
    pub lines: Arc<Mutex<Vec<String>>>,
    pub snapshots: Arc<Mutex<Vec<Snapshot>>>,
}

impl Recorder {
    pub fn registry(&self, settings: Settings) -> Registry {
        let lines = self.lines.clone();
        let snapshots = self.snapshots.clone();
        Registry::builder(settings)
            .log_sink(move |line| lines.lock().push(line.to_string()))
            .on_reload(move |snapshot| snapshots.lock().push(snapshot.clone()))
            .build()
            .unwrap()
    }

    #[allow(dead_code)]
    pub fn logged(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|l| l.contains(needle))
    }
}
