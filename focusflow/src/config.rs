use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use focusflow_core::Durations;
use ratatui::style::Color;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub durations: Durations,
    pub theme: Theme,
    pub icons: Icons,
    pub player: PlayerConfig,
    pub stations: Vec<StationConfig>,
    pub quote: QuoteConfig,
    /// Desktop notification when a session ends.
    pub notifications: bool,
    /// Terminal bell when a session ends.
    pub bell: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Theme {
    #[serde(deserialize_with = "hex_to_color")]
    pub background: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub foreground: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub primary: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub accent: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub muted: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub black: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub red: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub green: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub yellow: Color,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Icons {
    pub timer: String,
    pub radio: String,
    pub play: String,
    pub pause: String,
    pub next: String,
    pub volume: String,
    pub bell: String,
    pub prompt: String,
    pub progress_filled: String,
    pub progress_empty: String,
    pub header_left: String,
    pub header_right: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PlayerConfig {
    pub enabled: bool,
    /// Media player executable; must speak mpv's JSON IPC.
    pub command: String,
    pub volume: u8,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StationConfig {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct QuoteConfig {
    pub enabled: bool,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            durations: Durations::default(),
            theme: Theme::default(),
            icons: Icons::default(),
            player: PlayerConfig::default(),
            stations: default_stations(),
            quote: QuoteConfig::default(),
            notifications: true,
            bell: true,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Rgb(8, 6, 18),
            foreground: Color::Rgb(226, 220, 255),
            primary: Color::Rgb(0, 255, 204),
            accent: Color::Rgb(255, 64, 160),
            muted: Color::Rgb(110, 104, 140),
            black: Color::Rgb(18, 14, 32),
            red: Color::Rgb(255, 85, 110),
            green: Color::Rgb(120, 230, 140),
            yellow: Color::Rgb(250, 210, 90),
        }
    }
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            timer: "⏲".to_string(),
            radio: "♫".to_string(),
            play: "▶".to_string(),
            pause: "⏸".to_string(),
            next: "⏭".to_string(),
            volume: "🔊".to_string(),
            bell: "🔔".to_string(),
            prompt: ">".to_string(),
            progress_filled: "█".to_string(),
            progress_empty: "░".to_string(),
            header_left: "⟪ ".to_string(),
            header_right: " ⟫".to_string(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "mpv".to_string(),
            volume: 50,
        }
    }
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 10,
        }
    }
}

fn default_stations() -> Vec<StationConfig> {
    [
        ("Morning Lofi", "jfKfPfyJRdk"),
        ("Cafe Lofi", "UI5NKkW8acM"),
        ("waterfall stream flow", "qHXFLsnKDq0"),
        ("baroque classical music", "2gO1v2GPMFk"),
    ]
    .into_iter()
    .map(|(name, id)| StationConfig {
        name: name.to_string(),
        url: format!("https://www.youtube.com/watch?v={}", id),
    })
    .collect()
}

fn hex_to_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = serde::Deserialize::deserialize(deserializer)?;
    let digits = s
        .strip_prefix('#')
        .filter(|d| d.len() == 6 && d.chars().all(|c| c.is_ascii_hexdigit()))
        .ok_or_else(|| {
            <D::Error as serde::de::Error>::custom(format!("invalid hex color {:?}", s))
        })?;
    let channel = |i: usize| -> Result<u8, D::Error> {
        u8::from_str_radix(&digits[i..i + 2], 16).map_err(serde::de::Error::custom)
    };
    Ok(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

impl Config {
    fn validate(self) -> Result<Self> {
        if let Some(mode) = self.durations.first_empty() {
            bail!("duration for {} must be greater than zero", mode);
        }
        if self.player.volume > 100 {
            bail!("player volume must be between 0 and 100");
        }
        Ok(self)
    }
}

pub fn parse_config(source: &str) -> Result<Config> {
    let config: Config = toml::from_str(source)?;
    config.validate()
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "pabloagn", "FocusFlow")
        .map(|proj_dirs| proj_dirs.config_dir().join("focusflow.toml"))
}

/// Loads `path`, or the default location when none is given.
///
/// A missing default file yields the built-in configuration; a missing
/// explicit file is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match default_config_path() {
            Some(p) => (p, false),
            None => return Ok(Config::default()),
        },
    };
    if !explicit && !path.exists() {
        return Ok(Config::default());
    }
    let config_str = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file at {:?}", path))?;
    parse_config(&config_str).with_context(|| format!("Failed to parse config file at {:?}", path))
}
