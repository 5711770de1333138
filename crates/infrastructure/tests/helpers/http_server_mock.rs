#![allow(dead_code)]
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// HTTP/1.1 server on 127.0.0.1 returning the same body for every request
/// and closing the connection after each response.
pub struct MockHttpServer {
    addr: SocketAddr,
    host_headers: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockHttpServer {
    pub async fn start(body: Vec<u8>) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let host_headers = Arc::new(Mutex::new(Vec::new()));
        let seen = host_headers.clone();
        let body = Arc::new(body);

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    accepted = listener.accept() => {
                        let Ok((stream, _)) = accepted else { continue };
                        let seen = seen.clone();
                        let body = body.clone();
                        tokio::spawn(async move {
                            let _ = Self::serve(stream, &body, &seen).await;
                        });
                    }
                }
            }
        });

        Ok(Self {
            addr,
            host_headers,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    async fn serve(
        mut stream: tokio::net::TcpStream,
        body: &[u8],
        seen: &Mutex<Vec<String>>,
    ) -> Result<(), std::io::Error> {
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await?;
            if n == 0 {
                return Ok(());
            }
            request.extend_from_slice(&buf[..n]);
        }

        let head = String::from_utf8_lossy(&request);
        if let Some(host) = head.lines().find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("host").then(|| value.trim().to_string())
        }) {
            seen.lock().unwrap().push(host);
        }

        let header = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(header.as_bytes()).await?;
        stream.write_all(body).await?;
        stream.shutdown().await
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn request_count(&self) -> usize {
        self.host_headers.lock().unwrap().len()
    }

    /// `Host` header of every request served so far.
    pub fn host_headers(&self) -> Vec<String> {
        self.host_headers.lock().unwrap().clone()
    }
}

impl Drop for MockHttpServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
