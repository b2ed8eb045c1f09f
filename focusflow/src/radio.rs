//! Station rotation, playback state and volume.

use crate::config::StationConfig;
use crate::player::MediaPlayer;
use rand::seq::SliceRandom;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const LOADING_MESSAGES: [&str; 4] = [
    "Finding vibes...",
    "Tuning frequencies...",
    "Syncing to the chillwave...",
    "Booting up the soundscape...",
];

/// How long the loading message replaces the station name after a switch.
const LOADING_DISPLAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    pub name: String,
    pub url: String,
}

impl From<StationConfig> for Station {
    fn from(config: StationConfig) -> Self {
        Self {
            name: config.name,
            url: config.url,
        }
    }
}

pub struct Radio {
    stations: Vec<Station>,
    current: usize,
    playing: bool,
    volume: u8,
    loading: Option<(&'static str, Instant)>,
    player: Box<dyn MediaPlayer>,
}

impl Radio {
    /// Loads the first station, paused.
    pub fn new(stations: Vec<Station>, volume: u8, mut player: Box<dyn MediaPlayer>) -> Self {
        let volume = volume.min(100);
        if let Err(e) = player.set_volume(volume) {
            warn!("Failed to set initial volume: {}", e);
        }
        if let Some(first) = stations.first() {
            if let Err(e) = player.load(&first.url, false) {
                warn!("Failed to load station {}: {}", first.name, e);
            }
        }
        Self {
            stations,
            current: 0,
            playing: false,
            volume,
            loading: None,
            player,
        }
    }

    pub fn current_station(&self) -> Option<&Station> {
        self.stations.get(self.current)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn loading_message(&self) -> Option<&'static str> {
        self.loading
            .filter(|(_, since)| since.elapsed() < LOADING_DISPLAY)
            .map(|(message, _)| message)
    }

    pub fn toggle_playback(&mut self) {
        if self.stations.is_empty() {
            return;
        }
        let playing = !self.playing;
        let result = if playing {
            self.player.play()
        } else {
            self.player.pause()
        };
        match result {
            Ok(()) => self.playing = playing,
            Err(e) => warn!("Player did not accept playback change: {}", e),
        }
    }

    /// Tunes to the following station, wrapping around. Returns false when
    /// there is nothing to switch to.
    pub fn next_station(&mut self) -> bool {
        if self.stations.len() <= 1 {
            return false;
        }
        if let Err(e) = self.player.stop() {
            warn!("Failed to stop player: {}", e);
        }
        self.current = (self.current + 1) % self.stations.len();
        let message = LOADING_MESSAGES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(LOADING_MESSAGES[0]);
        self.loading = Some((message, Instant::now()));

        let station = &self.stations[self.current];
        info!(station = %station.name, "Switching station");
        if let Err(e) = self.player.load(&station.url, self.playing) {
            warn!("Failed to load station {}: {}", station.name, e);
        }
        true
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
        if let Err(e) = self.player.set_volume(self.volume) {
            warn!("Failed to set volume: {}", e);
        }
    }

    pub fn adjust_volume(&mut self, delta: i16) {
        let volume = (i16::from(self.volume) + delta).clamp(0, 100);
        self.set_volume(volume as u8);
    }

    /// Checks the player for a finished stream and moves on if so.
    pub fn poll(&mut self) -> bool {
        match self.player.poll_ended() {
            Ok(true) => {
                info!("Stream ended, moving to next station");
                self.next_station()
            }
            Ok(false) => false,
            Err(e) => {
                warn!("Player stopped: {}", e);
                self.playing = false;
                false
            }
        }
    }
}
