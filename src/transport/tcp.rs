//! # TCP Transport
//!
//! Line-oriented JSON client for the device gateway.
//!
//! Reconnection lives here, not in the core: after a failed connect or a
//! dropped link the client waits `reconnect_interval` and tries again until
//! the core's command channel closes.

use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{decode_frame, TransportMessage};
use crate::config::TransportConfig;
use crate::dashboard::CoreCommand;

/// Longest accepted frame in bytes, newline included
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// TCP client feeding decoded frames into the core
#[derive(Debug, Clone)]
pub struct TcpTransport {
    address: String,
    reconnect_interval: Duration,
}

impl TcpTransport {
    /// Create a transport for `address` (e.g., "127.0.0.1:3000")
    pub fn new(address: impl Into<String>, reconnect_interval: Duration) -> Self {
        Self {
            address: address.into(),
            reconnect_interval,
        }
    }

    pub fn from_config(config: &TransportConfig) -> Self {
        Self::new(
            config.address.clone(),
            Duration::from_millis(config.reconnect_interval_ms),
        )
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Connect, forward frames and reconnect until `commands` closes
    pub async fn run(self, commands: mpsc::Sender<CoreCommand>) {
        info!("Telemetry transport targeting {}", self.address);

        loop {
            let connect = tokio::select! {
                result = TcpStream::connect(&self.address) => result,
                _ = commands.closed() => break,
            };

            match connect {
                Ok(stream) => {
                    info!("Connected to {}", self.address);
                    if !notify(&commands, TransportMessage::Connected).await {
                        break;
                    }

                    let open = forward(stream, &commands).await;

                    if !open || !notify(&commands, TransportMessage::Disconnected).await {
                        break;
                    }
                    info!("Disconnected from {}", self.address);
                }
                Err(e) => {
                    warn!("Failed to connect to {}: {}", self.address, e);
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.reconnect_interval) => {}
                _ = commands.closed() => break,
            }
        }

        debug!("Telemetry transport stopped");
    }
}

async fn notify(commands: &mpsc::Sender<CoreCommand>, message: TransportMessage) -> bool {
    commands.send(CoreCommand::Transport(message)).await.is_ok()
}

/// Outcome of reading one line from the link
#[derive(Debug, PartialEq)]
enum LineRead {
    Line,
    TooLong,
    Eof,
}

/// Read one `\n`-terminated line into `buf`
///
/// A line over [`MAX_FRAME_LEN`] is consumed up to its newline without being
/// buffered and reported as [`LineRead::TooLong`].
async fn read_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> io::Result<LineRead> {
    buf.clear();
    let mut oversize = false;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(match (oversize, buf.is_empty()) {
                (true, _) => LineRead::TooLong,
                (false, true) => LineRead::Eof,
                (false, false) => LineRead::Line,
            });
        }

        let (used, done) = match available.iter().position(|&b| b == b'\n') {
            Some(i) => (i + 1, true),
            None => (available.len(), false),
        };

        if !oversize {
            if buf.len() + used > MAX_FRAME_LEN {
                oversize = true;
                buf.clear();
            } else {
                buf.extend_from_slice(&available[..used]);
            }
        }
        reader.consume(used);

        if done {
            return Ok(if oversize { LineRead::TooLong } else { LineRead::Line });
        }
    }
}

/// Forward decoded frames until the stream ends
///
/// Undecodable lines (bad UTF-8, oversize, unknown frames) are dropped and
/// reading continues. Only end of stream or an I/O error ends the session.
///
/// Returns `false` if the core stopped listening.
async fn forward<R: AsyncRead + Unpin>(reader: R, commands: &mpsc::Sender<CoreCommand>) -> bool {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        let read = tokio::select! {
            read = read_line(&mut reader, &mut buf) => read,
            _ = commands.closed() => return false,
        };

        match read {
            Ok(LineRead::Line) => {
                let line = match std::str::from_utf8(&buf) {
                    Ok(line) => line.trim_end_matches(&['\r', '\n'][..]),
                    Err(e) => {
                        debug!("Dropping non-UTF-8 line: {}", e);
                        continue;
                    }
                };
                if let Some(message) = decode_frame(line) {
                    if !notify(commands, message).await {
                        return false;
                    }
                }
            }
            Ok(LineRead::TooLong) => {
                debug!("Dropping line longer than {} bytes", MAX_FRAME_LEN);
            }
            Ok(LineRead::Eof) => return true,
            Err(e) => {
                warn!("Telemetry link read failed: {}", e);
                return true;
            }
        }
    }
}
