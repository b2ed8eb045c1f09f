//! Inter-process communication between focusflow and focusctl
//!
//! Unix domain socket, one newline-terminated JSON command per connection,
//! answered by one newline-terminated JSON response.

use focusflow_core::{SessionMode, TimerState};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Commands that focusctl can send to focusflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Start,
    Pause,
    Toggle,
    Reset,
    SwitchMode { mode: SessionMode },
    Status,
    NextStation,
    TogglePlayback,
    SetVolume { volume: u8 },
    NewQuote,
}

/// Responses from focusflow back to focusctl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    Ok,
    Status(StatusReport),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub timer: TimerState,
    pub total_seconds: u32,
    pub station: Option<String>,
    pub playing: bool,
    pub volume: u8,
    pub quote: Option<String>,
}

#[derive(Error, Debug)]
pub enum IpcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Connection refused - is focusflow running?")]
    ConnectionRefused,

    #[error("Peer closed the connection before sending a message")]
    Closed,
}

pub const SOCKET_PATH: &str = "/tmp/focusflow.sock";

/// Writes `message` as a single JSON line.
pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<(), IpcError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut bytes = serde_json::to_vec(message)?;
    bytes.push(b'\n');
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one JSON line into `T`.
pub async fn read_message<R, T>(reader: &mut R) -> Result<T, IpcError>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Err(IpcError::Closed);
    }
    Ok(serde_json::from_str(line.trim_end())?)
}
