use std::io::{self, BufRead, Write};

use anyhow::Result;
use tracing::debug;

use super::{Message, Transport};

/// Stdio transport for the server with newline-delimited json serialization.
/// Stdout carries protocol messages only; logging must go to stderr.
#[derive(Default, Clone)]
pub struct ServerStdioTransport;

impl Transport for ServerStdioTransport {
    fn receive(&self) -> Result<Message> {
        let stdin = io::stdin();
        let mut reader = stdin.lock();
        let mut line = String::new();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            anyhow::bail!("Transport closed");
        }
        debug!("Received: {line}");
        let message: Message = serde_json::from_str(&line)?;
        Ok(message)
    }

    fn send(&self, message: &Message) -> Result<()> {
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        let serialized = serde_json::to_string(message)?;
        debug!("Sending: {serialized}");
        writer.write_all(serialized.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
