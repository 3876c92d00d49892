//! TCP server implementation.

use crate::config::Config;
use crate::error::ServerError;
use crate::handler::RequestHandler;
use crate::session::Session;
use kbroker_protocol::{Decoder, Encoder, Request};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Idle connection timeout.
    pub idle_timeout: Duration,
    /// Maximum concurrent connections.
    pub max_connections: usize,
    /// Largest accepted request frame.
    pub max_frame_bytes: usize,
    /// Hex-dump frames at trace level.
    pub dump_frames: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ServerConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }

    /// Builds the runtime settings from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            bind_addr: config.network.bind_addr,
            idle_timeout: config.network.idle_timeout(),
            max_connections: config.network.max_connections,
            max_frame_bytes: config.network.max_frame_bytes,
            dump_frames: config.debug.dump_frames,
        }
    }
}

/// Server statistics.
#[derive(Debug, Default)]
pub struct ServerStats {
    pub connections_total: AtomicU64,
    pub connections_active: AtomicU64,
    pub requests_total: AtomicU64,
    pub errors_total: AtomicU64,
}

/// TCP server for kbroker.
pub struct Server {
    config: ServerConfig,
    handler: Arc<RequestHandler>,
    stats: Arc<ServerStats>,
    shutdown: broadcast::Sender<()>,
    running: AtomicBool,
}

impl Server {
    /// Creates a new server.
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            handler: Arc::new(RequestHandler::new()),
            stats: Arc::new(ServerStats::default()),
            shutdown: shutdown_tx,
            running: AtomicBool::new(false),
        }
    }

    /// Binds the configured address and runs the server.
    pub async fn run(&self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Runs the accept loop on an already bound listener until shutdown.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        self.running.store(true, Ordering::SeqCst);
        tracing::info!("Server listening on {}", listener.local_addr()?);

        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((tcp_stream, addr)) => {
                            if self.stats.connections_active.load(Ordering::Relaxed)
                                >= self.config.max_connections as u64
                            {
                                tracing::warn!("Connection limit reached, rejecting {}", addr);
                                continue;
                            }

                            self.stats.connections_total.fetch_add(1, Ordering::Relaxed);
                            self.stats.connections_active.fetch_add(1, Ordering::Relaxed);

                            if let Err(e) = tcp_stream.set_nodelay(true) {
                                tracing::debug!("[{}] Failed to set TCP_NODELAY: {}", addr, e);
                            }

                            let handler = self.handler.clone();
                            let stats = self.stats.clone();
                            let config = self.config.clone();
                            let mut conn_shutdown = self.shutdown.subscribe();

                            tokio::spawn(async move {
                                let mut session = Session::new(addr);
                                tracing::info!(
                                    "Client connected: {} (session {})",
                                    addr,
                                    session.id
                                );

                                let result = Self::handle_connection(
                                    tcp_stream,
                                    &mut session,
                                    &handler,
                                    &config,
                                    &stats,
                                    &mut conn_shutdown,
                                )
                                .await;

                                Self::finish_connection(&session, result, &stats);
                                stats.connections_active.fetch_sub(1, Ordering::Relaxed);
                            });
                        }
                        Err(e) => {
                            tracing::error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Server shutting down");
                    break;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Logs how a connection ended and counts it as an error unless it
    /// closed normally or was stopped by shutdown.
    fn finish_connection(
        session: &Session,
        result: Result<(), ServerError>,
        stats: &ServerStats,
    ) {
        match result {
            Ok(()) | Err(ServerError::ShuttingDown) => {}
            Err(e) if e.is_decode_failure() => {
                tracing::warn!(
                    "[{}] Session {} dropped on bad request: {}",
                    session.remote_addr,
                    session.id,
                    e
                );
                stats.errors_total.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::debug!("Connection {} error: {}", session.remote_addr, e);
                stats.errors_total.fetch_add(1, Ordering::Relaxed);
            }
        }

        tracing::info!(
            "Client disconnected: {} (session {}, {} requests in {:.1?})",
            session.remote_addr,
            session.id,
            session.request_count(),
            session.age()
        );
    }

    /// Serves one connection: reads frames sequentially and writes one
    /// response per request.
    ///
    /// Any decode failure ends the connection without a reply.
    async fn handle_connection<S>(
        mut stream: S,
        session: &mut Session,
        handler: &RequestHandler,
        config: &ServerConfig,
        stats: &ServerStats,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<(), ServerError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let addr = session.remote_addr;
        let mut decoder = Decoder::with_max_frame_size(config.max_frame_bytes);
        let mut buf = [0u8; 8192];

        loop {
            tokio::select! {
                result = stream.read(&mut buf) => {
                    match result {
                        Ok(0) => {
                            tracing::debug!("[{}] Connection closed by client", addr);
                            return Ok(());
                        }
                        Ok(n) => {
                            tracing::debug!("[{}] Received {} bytes", addr, n);
                            session.touch();
                            decoder.extend(&buf[..n]);
                        }
                        Err(e) => {
                            tracing::debug!("[{}] Read error: {}", addr, e);
                            return Err(ServerError::Io(e));
                        }
                    }
                }

                _ = tokio::time::sleep(config.idle_timeout) => {
                    if session.idle_duration() >= config.idle_timeout {
                        tracing::debug!("[{}] Idle timeout", addr);
                        return Ok(());
                    }
                }

                _ = shutdown.recv() => {
                    tracing::debug!("[{}] Shutdown signal received", addr);
                    return Err(ServerError::ShuttingDown);
                }
            }

            while let Some(frame) = decoder.decode_frame()? {
                if config.dump_frames {
                    tracing::trace!(
                        "[{}] <- {} bytes: {}",
                        addr,
                        frame.payload.len(),
                        hex::encode(&frame.payload)
                    );
                }

                let request = Request::decode(frame.payload)?;
                stats.requests_total.fetch_add(1, Ordering::Relaxed);
                session.set_client_id(request.header.client_id.clone());

                tracing::debug!(
                    "[{}] Session {} request: {} v{} (correlation_id={}, client_id={:?})",
                    addr,
                    session.id,
                    request.api_key(),
                    request.header.api_version,
                    request.header.correlation_id,
                    session.client_id()
                );

                let response = handler.handle(session, &request);
                let response_bytes = Encoder::encode_response(&response)?;

                if config.dump_frames {
                    tracing::trace!("[{}] -> {}", addr, hex::encode(&response_bytes));
                }
                tracing::debug!("[{}] Writing {} bytes", addr, response_bytes.len());
                stream.write_all(&response_bytes).await?;
            }
        }
    }

    /// Initiates server shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(());
    }

    /// Returns whether the server is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Returns server statistics.
    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }
}
