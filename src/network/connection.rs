use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::sync::Arc;

use bytes::Bytes;

use crate::constants::PROMPT;
use crate::core::engine::Engine;
use crate::error::Result;
use crate::protocol::{self, Command};

/// One client session: prompt, read a line, dispatch, respond, repeat.
///
/// Per-request errors are written back as their display text and the loop
/// continues; only EOF or a transport error ends the session. Any scan the
/// request started is torn down with the request, so a disconnect cannot
/// leave a producer thread running unbounded.
pub struct Connection {
    stream: TcpStream,
    engine: Arc<Engine>,
}

impl Connection {
    pub fn new(stream: TcpStream, engine: Arc<Engine>) -> Self {
        Self { stream, engine }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut reader = BufReader::new(self.stream.try_clone()?);
        let mut line = Vec::new();

        loop {
            self.stream.write_all(PROMPT)?;
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                tracing::debug!("connection closed");
                return Ok(());
            }

            let command = Command::parse(&line);
            let response = match protocol::handle(&self.engine, &command) {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::debug!(verb = %command.verb, %err, "request failed");
                    Bytes::from(err.to_string())
                }
            };
            self.stream.write_all(&response)?;
            self.stream.write_all(b"\n")?;
        }
    }
}
