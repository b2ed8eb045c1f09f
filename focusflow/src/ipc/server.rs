//! Unix domain socket server for IPC

use crate::app::SharedApp;
use anyhow::{bail, Context, Result};
use focusflow_ipc::{read_message, write_message, Command, IpcError, Response};
use std::path::Path;
use tokio::io::BufReader;
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info};

/// Claims the control socket. Fails without touching the file when another
/// instance is still answering on it.
pub async fn bind(path: &Path) -> Result<UnixListener> {
    if UnixStream::connect(path).await.is_ok() {
        bail!("another focusflow instance owns {}", path.display());
    }
    // Stale socket left by a crashed instance
    let _ = std::fs::remove_file(path);

    let listener = UnixListener::bind(path)
        .with_context(|| format!("Failed to bind control socket at {:?}", path))?;
    info!("IPC server listening on {}", path.display());
    Ok(listener)
}

pub async fn serve(app: SharedApp, listener: UnixListener) {
    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let app = app.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, app).await {
                        error!("Error handling client: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
            }
        }
    }
}

async fn handle_client(stream: UnixStream, app: SharedApp) -> Result<(), IpcError> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let response = match read_message::<_, Command>(&mut reader).await {
        Ok(command) => {
            debug!(?command, "control command");
            app.lock().await.execute(command)
        }
        Err(IpcError::Serialization(e)) => Response::Error(format!("invalid command: {}", e)),
        Err(e) => return Err(e),
    };

    write_message(&mut writer, &response).await
}
