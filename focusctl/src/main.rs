use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use focusflow_core::{format_mmss, SessionMode};
use focusflow_ipc::{read_message, write_message, Command, IpcError, Response, SOCKET_PATH};
use std::io::ErrorKind;
use tokio::io::BufReader;
use tokio::net::UnixStream;

#[derive(Parser)]
#[command(name = "focusctl")]
#[command(about = "Control the FocusFlow timer and radio", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the timer
    Start,
    /// Pause the timer
    Pause,
    /// Start or pause the timer
    Toggle,
    /// Reset the current session
    Reset,
    /// Switch to another session mode
    Mode {
        #[arg(value_enum)]
        mode: ModeArg,
    },
    /// Get timer and radio status
    Status,
    /// Tune to the next station
    Next,
    /// Play or pause the radio
    Play,
    /// Set the radio volume (0-100)
    Volume {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        volume: u8,
    },
    /// Fetch a new focus quote
    Quote,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Work,
    ShortBreak,
    LongBreak,
}

impl From<ModeArg> for SessionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Work => SessionMode::Work,
            ModeArg::ShortBreak => SessionMode::ShortBreak,
            ModeArg::LongBreak => SessionMode::LongBreak,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Start => Command::Start,
        Commands::Pause => Command::Pause,
        Commands::Toggle => Command::Toggle,
        Commands::Reset => Command::Reset,
        Commands::Mode { mode } => Command::SwitchMode { mode: mode.into() },
        Commands::Status => Command::Status,
        Commands::Next => Command::NextStation,
        Commands::Play => Command::TogglePlayback,
        Commands::Volume { volume } => Command::SetVolume { volume },
        Commands::Quote => Command::NewQuote,
    };

    let response = send_command(command)
        .await
        .context("Failed to talk to focusflow")?;

    match response {
        Response::Ok => println!("OK"),
        Response::Status(status) => {
            let timer = status.timer;
            let state = if timer.is_running { "running" } else { "paused" };
            println!("Mode: {} ({})", timer.mode, state);
            println!(
                "Remaining: {} / {}",
                format_mmss(timer.remaining_seconds),
                format_mmss(status.total_seconds)
            );
            println!("Completed sessions: {}", timer.completed_work_sessions);
            println!(
                "Station: {} [{}] vol {}",
                status.station.as_deref().unwrap_or("none"),
                if status.playing { "playing" } else { "stopped" },
                status.volume
            );
            if let Some(quote) = status.quote {
                println!("Quote: \u{201c}{}\u{201d}", quote);
            }
        }
        Response::Error(e) => eprintln!("Error: {}", e),
    }

    Ok(())
}

async fn send_command(cmd: Command) -> Result<Response, IpcError> {
    let stream = UnixStream::connect(SOCKET_PATH).await.map_err(|e| {
        if matches!(e.kind(), ErrorKind::ConnectionRefused | ErrorKind::NotFound) {
            IpcError::ConnectionRefused
        } else {
            IpcError::Io(e)
        }
    })?;
    let (reader, mut writer) = stream.into_split();

    write_message(&mut writer, &cmd).await?;
    read_message(&mut BufReader::new(reader)).await
}
