use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;

use futures::FutureExt;
use log::{debug, info, trace};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use crate::config::GateConfig;
use crate::control::{ApiRequest, ApiResponse};
use crate::errors::Error;
use crate::errors::TransportError::{MalformedRequest, NotInitialized};
use crate::io::Transport;

/// Maximum size of a request: anything beyond is ignored.
const REQUEST_SIZE: usize = 1024;

/// Serves the control operations as a minimal HTTP/1.1 JSON API.
///
/// - `GET /api/status`
/// - `POST /api/toggle`
/// - `POST /api/reset`
/// - `POST /api/calibrate`
///
/// Every connection carries a single exchange and is closed right after the response.
#[derive(Debug)]
pub struct HttpTransport {
    /// The address to listen on.
    bind_address: String,
    /// The address reported to clients, if set.
    advertised_address: Option<String>,
    /// Maximum time given to a client to send its request.
    timeout: Duration,
    listener: Option<TcpListener>,
}

impl HttpTransport {
    /// Creates a closed transport for the configured addresses.
    pub fn new(config: &GateConfig) -> Self {
        Self {
            bind_address: config.bind_address.clone(),
            advertised_address: config.advertised_address.clone(),
            timeout: Duration::from_millis(config.request_timeout),
            listener: None,
        }
    }

    /// Returns the address actually listened on (useful when binding on port 0).
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener
            .as_ref()
            .and_then(|listener| listener.local_addr().ok())
    }

    /// Parses the request line of a raw request (`METHOD /path HTTP/1.1`).
    /// An unreadable request line is routed as unknown.
    fn parse_request(raw: &[u8]) -> Result<ApiRequest, Error> {
        if raw.is_empty() {
            return Err(MalformedRequest.into());
        }
        let raw = String::from_utf8_lossy(raw);
        let line = raw.lines().next().unwrap_or_default();
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some(method), Some(path)) => Ok(ApiRequest::route(method, path)),
            _ => Ok(ApiRequest::Unknown(line.to_string())),
        }
    }

    /// Renders the full HTTP response.
    fn render_response(response: &ApiResponse) -> Result<String, Error> {
        let status = match response {
            ApiResponse::NotFound => "404 Not Found",
            ApiResponse::Error { .. } => "500 Internal Server Error",
            _ => "200 OK",
        };
        let rendered = match response.to_json()? {
            Some(body) => format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            ),
            None => format!("HTTP/1.1 {}\r\nConnection: close\r\n\r\n", status),
        };
        Ok(rendered)
    }
}

impl Display for HttpTransport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.local_addr() {
            Some(address) => write!(f, "HttpTransport({})", address),
            None => write!(f, "HttpTransport({}) [closed]", self.bind_address),
        }
    }
}

impl Transport for HttpTransport {
    type Peer = TcpStream;

    async fn open(&mut self) -> Result<(), Error> {
        let listener = TcpListener::bind(&self.bind_address).await?;
        info!("Control server listening on {}", listener.local_addr()?);
        self.listener = Some(listener);
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        if self.listener.take().is_some() {
            info!("Control server closed");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.listener.is_some()
    }

    fn network_address(&self) -> String {
        match (&self.advertised_address, self.local_addr()) {
            (Some(address), _) => address.clone(),
            (None, Some(address)) => address.to_string(),
            (None, None) => String::from("Not connected"),
        }
    }

    async fn accept(&mut self) -> Result<Option<(TcpStream, ApiRequest)>, Error> {
        let listener = self.listener.as_ref().ok_or(NotInitialized)?;
        let (mut stream, peer) = match listener.accept().now_or_never() {
            None => return Ok(None),
            Some(accepted) => accepted?,
        };
        trace!("Client connected: {}", peer);

        let mut buffer = [0u8; REQUEST_SIZE];
        let size = timeout(self.timeout, stream.read(&mut buffer)).await??;
        let request = Self::parse_request(&buffer[..size])?;
        debug!("Request from {}: {}", peer, request);
        Ok(Some((stream, request)))
    }

    async fn respond(&mut self, mut peer: TcpStream, response: &ApiResponse) -> Result<(), Error> {
        let rendered = Self::render_response(response)?;
        peer.write_all(rendered.as_bytes()).await?;
        peer.flush().await?;
        peer.shutdown().await?;
        Ok(())
    }
}
