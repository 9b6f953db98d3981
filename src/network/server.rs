use std::net::{TcpListener, TcpStream};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::thread;

use crate::core::engine::Engine;
use crate::error::Result;

use super::Connection;

/// TCP front end: accepts connections on the engine's configured address
/// and hands each one to its own thread.
pub struct Server {
    engine: Arc<Engine>,
}

impl Server {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    /// Bind the configured address and serve forever. Bind failure is
    /// returned so the caller can abort the process.
    pub fn run(&self) -> Result<()> {
        let addr = &self.engine.config().listen_addr;
        let listener = TcpListener::bind(addr)?;
        tracing::info!(%addr, "gcdb listening");
        self.serve(listener)
    }

    /// Accept loop over an already-bound listener.
    pub fn serve(&self, listener: TcpListener) -> Result<()> {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => self.spawn_connection(stream),
                Err(err) => tracing::error!(%err, "accept failed"),
            }
        }
        Ok(())
    }

    fn spawn_connection(&self, stream: TcpStream) {
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "<unknown>".to_string());
        tracing::debug!(%peer, "accepted connection");

        let engine = Arc::clone(&self.engine);
        thread::spawn(move || {
            let mut connection = Connection::new(stream, engine);
            let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| connection.run()));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(err)) => tracing::debug!(%peer, %err, "connection ended with error"),
                Err(_) => tracing::error!(%peer, "connection handler panicked"),
            }
        });
    }
}
