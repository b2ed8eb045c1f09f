//! Background audio playback.
//!
//! `MpvPlayer` runs one `mpv` child per station and steers it through mpv's
//! JSON IPC socket. `SilentPlayer` stands in when audio is disabled or mpv
//! cannot be started.

use serde_json::json;
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("player control socket error: {0}")]
    Control(#[from] std::io::Error),

    #[error("player command encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("player exited abnormally: {0}")]
    Exited(String),

    #[error("no station loaded")]
    NotLoaded,
}

/// Streams one station at a time.
pub trait MediaPlayer: Send {
    /// Replaces whatever is loaded with `url`, paused unless `autoplay`.
    fn load(&mut self, url: &str, autoplay: bool) -> Result<(), PlayerError>;
    fn play(&mut self) -> Result<(), PlayerError>;
    fn pause(&mut self) -> Result<(), PlayerError>;
    /// `volume` is 0..=100.
    fn set_volume(&mut self, volume: u8) -> Result<(), PlayerError>;
    fn stop(&mut self) -> Result<(), PlayerError>;
    /// `Ok(true)` once, when the loaded stream finished on its own.
    fn poll_ended(&mut self) -> Result<bool, PlayerError>;
}

pub struct MpvPlayer {
    command: String,
    socket_path: PathBuf,
    volume: u8,
    child: Option<Child>,
}

impl MpvPlayer {
    pub fn new(command: impl Into<String>, volume: u8) -> Self {
        let socket_path = std::env::temp_dir().join(format!("focusflow-mpv-{}.sock", std::process::id()));
        Self {
            command: command.into(),
            socket_path,
            volume: volume.min(100),
            child: None,
        }
    }

    fn send(&mut self, args: serde_json::Value) -> Result<(), PlayerError> {
        if self.child.is_none() {
            return Err(PlayerError::NotLoaded);
        }
        let mut stream = UnixStream::connect(&self.socket_path)?;
        stream.set_write_timeout(Some(Duration::from_millis(500)))?;
        debug!(command = %args, "sending player command");
        let mut line = serde_json::to_vec(&json!({ "command": args }))?;
        line.push(b'\n');
        stream.write_all(&line)?;
        Ok(())
    }

    fn kill_child(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

impl MediaPlayer for MpvPlayer {
    fn load(&mut self, url: &str, autoplay: bool) -> Result<(), PlayerError> {
        self.kill_child();
        let mut cmd = Command::new(&self.command);
        cmd.arg("--no-video")
            .arg("--no-terminal")
            .arg(format!("--volume={}", self.volume))
            .arg(format!("--input-ipc-server={}", self.socket_path.display()));
        if !autoplay {
            cmd.arg("--pause");
        }
        let child = cmd
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| PlayerError::Spawn {
                command: self.command.clone(),
                source,
            })?;
        info!(url, pid = child.id(), "player loaded station");
        self.child = Some(child);
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        self.send(json!(["set_property", "pause", false]))
    }

    fn pause(&mut self) -> Result<(), PlayerError> {
        self.send(json!(["set_property", "pause", true]))
    }

    fn set_volume(&mut self, volume: u8) -> Result<(), PlayerError> {
        self.volume = volume.min(100);
        if self.child.is_none() {
            return Ok(());
        }
        self.send(json!(["set_property", "volume", self.volume]))
    }

    fn stop(&mut self) -> Result<(), PlayerError> {
        self.kill_child();
        Ok(())
    }

    fn poll_ended(&mut self) -> Result<bool, PlayerError> {
        let Some(child) = self.child.as_mut() else {
            return Ok(false);
        };
        match child.try_wait()? {
            None => Ok(false),
            Some(status) => {
                self.child = None;
                let _ = std::fs::remove_file(&self.socket_path);
                if status.success() {
                    Ok(true)
                } else {
                    Err(PlayerError::Exited(status.to_string()))
                }
            }
        }
    }
}

impl Drop for MpvPlayer {
    fn drop(&mut self) {
        self.kill_child();
    }
}

/// Accepts every command and never plays a sound.
#[derive(Debug, Default)]
pub struct SilentPlayer;

impl MediaPlayer for SilentPlayer {
    fn load(&mut self, _url: &str, _autoplay: bool) -> Result<(), PlayerError> {
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlayerError> {
        Ok(())
    }

    fn set_volume(&mut self, _volume: u8) -> Result<(), PlayerError> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlayerError> {
        Ok(())
    }

    fn poll_ended(&mut self) -> Result<bool, PlayerError> {
        Ok(false)
    }
}
