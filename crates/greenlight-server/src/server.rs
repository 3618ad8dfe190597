//! HTTP/1 server.
//!
//! Accepts connections on a Tokio listener and serves each one with hyper.
//! Per request the server:
//!
//! - opens a `request` span with a fresh request id,
//! - collects the body, capped at [`MAX_BODY_SIZE`] and bounded by the
//!   read timeout,
//! - runs [`Application::handle`] bounded by the write timeout, turning a
//!   panic into a 500 that closes the connection,
//! - logs completion with status and latency.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use greenlight_config::GreenlightConfig;
//! use greenlight_data::InMemoryMovieStore;
//! use greenlight_server::{Application, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), greenlight_server::ServerError> {
//!     let config = GreenlightConfig::default();
//!     let server_config = config.server.clone();
//!     let app = Application::new(config, Arc::new(InMemoryMovieStore::new()));
//!
//!     Server::new(app, server_config).run().await
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures_util::FutureExt;
use http::{header, HeaderValue, Request, Response};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn, Instrument};

use greenlight_config::ServerConfig;
use greenlight_extract::{DecodeError, MAX_BODY_SIZE};
use greenlight_telemetry::{log_request_complete, new_request_id, request_span};

use crate::shutdown::{ConnectionTracker, ShutdownSignal};
use crate::{ApiError, Application, ServerError};

/// Response type written to the wire.
pub type HttpResponse = Response<Full<Bytes>>;

/// Header carrying the request id back to the client.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Serves an [`Application`] over HTTP/1.
#[derive(Debug)]
pub struct Server {
    app: Arc<Application>,
    config: ServerConfig,
}

impl Server {
    /// Creates a server; nothing is bound until it runs.
    #[must_use]
    pub fn new(app: Application, config: ServerConfig) -> Self {
        Self {
            app: Arc::new(app),
            config,
        }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Binds the configured port and serves until SIGINT or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the port cannot be bound.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals()).await
    }

    /// Binds the configured port and serves until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the port cannot be bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        self.run_with_listener(listener, shutdown).await
    }

    /// Serves on an already bound listener until `shutdown` fires, then
    /// waits up to the shutdown timeout for open connections to finish.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Io`] if the listener address cannot be read.
    pub async fn run_with_listener(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        info!(addr = %addr, env = %self.app.config().server.env, "starting server");

        let tracker = ConnectionTracker::new();
        let server = Arc::new(self);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let server = Arc::clone(&server);
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();

                        tokio::spawn(async move {
                            server.serve_connection(stream, remote_addr, shutdown).await;
                            drop(token);
                        });
                    }
                    Err(err) => warn!(error = %err, "failed to accept connection"),
                },
                () = shutdown.recv() => break,
            }
        }

        let timeout = server.config.shutdown_timeout();
        info!(
            connections = tracker.active_connections(),
            "completing background tasks"
        );

        if tokio::time::timeout(timeout, tracker.wait_for_drain())
            .await
            .is_err()
        {
            warn!(
                connections = tracker.active_connections(),
                "shutdown timeout reached with connections still open"
            );
        }

        info!(addr = %addr, "stopped server");
        Ok(())
    }

    async fn serve_connection(
        self: Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) {
        let io = TokioIo::new(stream);
        let server = Arc::clone(&self);
        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.serve_request(req).await) }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => {
                if let Err(err) = result {
                    debug!(remote_addr = %remote_addr, error = %err, "connection error");
                }
            }
            () = shutdown.recv() => {
                // Let the in-flight request finish, then close.
                conn.as_mut().graceful_shutdown();
                if let Err(err) = conn.await {
                    debug!(remote_addr = %remote_addr, error = %err, "connection error");
                }
            }
        }
    }

    async fn serve_request(&self, req: Request<Incoming>) -> HttpResponse {
        let request_id = new_request_id();
        let span = request_span(&request_id, req.method(), req.uri().path());

        async move {
            let started = Instant::now();
            let mut res = self.respond(req).await;

            if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                res.headers_mut().insert(REQUEST_ID_HEADER, value);
            }

            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            log_request_complete!(res.status().as_u16(), elapsed_ms);

            res.map(Full::new)
        }
        .instrument(span)
        .await
    }

    async fn respond(&self, req: Request<Incoming>) -> Response<Bytes> {
        let (parts, body) = req.into_parts();

        let body = match tokio::time::timeout(
            self.config.read_timeout(),
            Limited::new(body, MAX_BODY_SIZE).collect(),
        )
        .await
        {
            Ok(Ok(collected)) => collected.to_bytes(),
            Ok(Err(err)) if err.downcast_ref::<LengthLimitError>().is_some() => {
                return ApiError::from(DecodeError::BodyTooLarge {
                    limit: MAX_BODY_SIZE,
                })
                .into_response();
            }
            Ok(Err(err)) => {
                return ApiError::internal(format!("failed to read request body: {err}"))
                    .into_response();
            }
            Err(_) => return ApiError::Timeout.into_response(),
        };

        let req = Request::from_parts(parts, body);
        let handled = tokio::time::timeout(
            self.config.write_timeout(),
            AssertUnwindSafe(self.app.handle(req)).catch_unwind(),
        )
        .await;

        match handled {
            Ok(Ok(res)) => res,
            Ok(Err(panic)) => {
                error!(panic = panic_message(panic.as_ref()), "handler panicked");
                let mut res = ApiError::internal("handler panicked").into_response();
                res.headers_mut()
                    .insert(header::CONNECTION, HeaderValue::from_static("close"));
                res
            }
            Err(_) => ApiError::internal("handler timed out").into_response(),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use greenlight_config::GreenlightConfig;
    use greenlight_data::InMemoryMovieStore;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn start() -> (SocketAddr, ShutdownSignal, tokio::task::JoinHandle<()>) {
        let config = GreenlightConfig::default();
        let server_config = config.server.clone();
        let app = Application::new(config, Arc::new(InMemoryMovieStore::new()));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = ShutdownSignal::new();

        let server = Server::new(app, server_config);
        let signal = shutdown.clone();
        let handle = tokio::spawn(async move {
            server.run_with_listener(listener, signal).await.unwrap();
        });

        (addr, shutdown, handle)
    }

    async fn roundtrip(addr: SocketAddr, raw: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(raw.as_bytes()).await.unwrap();

        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn test_serves_healthcheck_over_tcp() {
        let (addr, shutdown, handle) = start().await;

        let response = roundtrip(
            addr,
            "GET /v1/healthcheck HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;

        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("content-type: application/json"));
        assert!(response.contains("x-request-id: "));
        assert!(response.contains("\"status\": \"available\""));
        assert!(response.ends_with("}\n"));

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let (addr, shutdown, _handle) = start().await;

        let body = "x".repeat(MAX_BODY_SIZE + 1);
        let raw = format!(
            "POST /v1/movies HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let response = roundtrip(addr, &raw).await;

        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(response.contains("body must not be larger than 1048576 bytes"));

        shutdown.trigger();
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");

        let payload: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
