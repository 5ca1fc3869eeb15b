//! # Configuration System
//!
//! Explicit configuration for the signal streamer: sample-rate and frame
//! geometry, network endpoint and transport kind, and the waveform
//! selection. Everything the emission loop needs is threaded through one
//! [`StreamConfig`] value, so alternate geometries are testable without
//! rebuild-time constants.
//!
//! ## Configuration Search Path
//!
//! Configuration is loaded from the first file found:
//! 1. Path specified via `SIGSTREAM_CONFIG` environment variable
//! 2. `./sigstream.yaml` (current directory)
//! 3. `~/.config/sigstream/config.yaml` (user config)
//! 4. `/etc/sigstream/config.yaml` (system config)
//!
//! ## Example Configuration
//!
//! ```yaml
//! sample_rate: 8000.0
//! frame_size: 512
//! update_interval: 0.1
//!
//! network:
//!   host: "0.0.0.0"
//!   port: 5000
//!   transport: tcp
//!
//! signal:
//!   kind: chirp
//! ```

use crate::signal_source::Waveform;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Error type for configuration operations.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found
    NotFound(String),
    /// Failed to read configuration file
    ReadError(String),
    /// Failed to parse configuration
    ParseError(String),
    /// Invalid configuration value
    ValidationError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotFound(msg) => write!(f, "config not found: {msg}"),
            ConfigError::ReadError(msg) => write!(f, "failed to read config: {msg}"),
            ConfigError::ParseError(msg) => write!(f, "failed to parse config: {msg}"),
            ConfigError::ValidationError(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Network transport kind.
///
/// Typed so an unknown kind fails at parse time, before any socket is
/// opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// TCP server: wait for the analyzer to connect, then stream.
    Tcp,
    /// UDP: fire-and-forget datagrams to loopback.
    Udp,
}

impl Default for TransportKind {
    fn default() -> Self {
        TransportKind::Tcp
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Tcp => write!(f, "tcp"),
            TransportKind::Udp => write!(f, "udp"),
        }
    }
}

impl FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(TransportKind::Tcp),
            "udp" => Ok(TransportKind::Udp),
            other => Err(ConfigError::ValidationError(format!(
                "unknown transport kind '{other}' (expected tcp or udp)"
            ))),
        }
    }
}

/// Waveform kind selector.
///
/// Spellings match the sender CLI: `sine`, `multi`, `chirp`, `noise`,
/// `impulse`, `square`, `sawtooth`, `am`, `fm`, `signal_noise`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    #[serde(rename = "sine")]
    Sine,
    #[serde(rename = "multi")]
    MultiTone,
    #[serde(rename = "chirp")]
    Chirp,
    #[serde(rename = "noise")]
    Noise,
    #[serde(rename = "impulse")]
    ImpulseTrain,
    #[serde(rename = "square")]
    Square,
    #[serde(rename = "sawtooth")]
    Sawtooth,
    #[serde(rename = "am")]
    Am,
    #[serde(rename = "fm")]
    Fm,
    #[serde(rename = "signal_noise")]
    SignalPlusNoise,
}

impl Default for SignalKind {
    fn default() -> Self {
        SignalKind::Sine
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalKind::Sine => "sine",
            SignalKind::MultiTone => "multi",
            SignalKind::Chirp => "chirp",
            SignalKind::Noise => "noise",
            SignalKind::ImpulseTrain => "impulse",
            SignalKind::Square => "square",
            SignalKind::Sawtooth => "sawtooth",
            SignalKind::Am => "am",
            SignalKind::Fm => "fm",
            SignalKind::SignalPlusNoise => "signal_noise",
        };
        write!(f, "{name}")
    }
}

impl FromStr for SignalKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sine" => Ok(SignalKind::Sine),
            "multi" => Ok(SignalKind::MultiTone),
            "chirp" => Ok(SignalKind::Chirp),
            "noise" => Ok(SignalKind::Noise),
            "impulse" => Ok(SignalKind::ImpulseTrain),
            "square" => Ok(SignalKind::Square),
            "sawtooth" => Ok(SignalKind::Sawtooth),
            "am" => Ok(SignalKind::Am),
            "fm" => Ok(SignalKind::Fm),
            "signal_noise" => Ok(SignalKind::SignalPlusNoise),
            other => Err(ConfigError::ValidationError(format!(
                "unknown signal kind '{other}'"
            ))),
        }
    }
}

/// Network endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Bind host for TCP server mode. Ignored for UDP, which always
    /// sends to loopback.
    pub host: String,
    /// Port number.
    pub port: u16,
    /// Transport kind.
    pub transport: TransportKind,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            transport: TransportKind::Tcp,
        }
    }
}

/// Waveform selection and its tunable parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Waveform kind.
    pub kind: SignalKind,
    /// Base frequency in Hz (sine, square, sawtooth, signal_noise).
    pub frequency: f64,
    /// Signal-to-noise ratio in dB (signal_noise).
    pub snr_db: f64,
    /// Impulse repetition rate in Hz (impulse).
    pub impulse_rate: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            kind: SignalKind::Sine,
            frequency: 1000.0,
            snr_db: 6.0,
            impulse_rate: 100.0,
        }
    }
}

impl SignalConfig {
    /// Build the waveform value for this selection.
    pub fn waveform(&self) -> Waveform {
        match self.kind {
            SignalKind::Sine => Waveform::Sine {
                frequency: self.frequency,
                amplitude: 0.5,
            },
            SignalKind::MultiTone => Waveform::MultiTone,
            SignalKind::Chirp => Waveform::chirp(),
            SignalKind::Noise => Waveform::noise(),
            SignalKind::ImpulseTrain => Waveform::ImpulseTrain {
                rate: self.impulse_rate,
            },
            SignalKind::Square => Waveform::Square {
                frequency: self.frequency,
            },
            SignalKind::Sawtooth => Waveform::Sawtooth {
                frequency: self.frequency,
            },
            SignalKind::Am => Waveform::am(),
            SignalKind::Fm => Waveform::fm(),
            SignalKind::SignalPlusNoise => Waveform::SignalPlusNoise {
                frequency: self.frequency,
                snr_db: self.snr_db,
            },
        }
    }
}

/// Complete streamer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Frame size in samples.
    pub frame_size: usize,
    /// Pause between frames in seconds.
    pub update_interval: f64,
    /// Network configuration.
    pub network: NetworkConfig,
    /// Signal configuration.
    pub signal: SignalConfig,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 8000.0,
            frame_size: 512,
            update_interval: 0.1,
            network: NetworkConfig::default(),
            signal: SignalConfig::default(),
        }
    }
}

impl StreamConfig {
    /// Load configuration from the default search path.
    ///
    /// Search order:
    /// 1. `SIGSTREAM_CONFIG` environment variable
    /// 2. `./sigstream.yaml`
    /// 3. `~/.config/sigstream/config.yaml`
    /// 4. `/etc/sigstream/config.yaml`
    ///
    /// Returns default config if no file is found.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var("SIGSTREAM_CONFIG") {
            if Path::new(&path).exists() {
                return Self::load_from(Path::new(&path));
            }
        }

        for path in Self::config_search_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            serde_yaml::to_string(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))
    }

    /// Get configuration search paths.
    pub fn config_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./sigstream.yaml")];

        if let Some(dirs) = directories::ProjectDirs::from("", "", "sigstream") {
            paths.push(dirs.config_dir().join("config.yaml"));
        }

        paths.push(PathBuf::from("/etc/sigstream/config.yaml"));
        paths
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate <= 0.0 || !self.sample_rate.is_finite() {
            return Err(ConfigError::ValidationError(
                "sample_rate must be positive".to_string(),
            ));
        }
        if self.frame_size == 0 {
            return Err(ConfigError::ValidationError(
                "frame_size must be > 0".to_string(),
            ));
        }
        if self.update_interval < 0.0 || !self.update_interval.is_finite() {
            return Err(ConfigError::ValidationError(
                "update_interval must be a non-negative number".to_string(),
            ));
        }
        if !self.signal.frequency.is_finite() {
            return Err(ConfigError::ValidationError(
                "signal frequency must be finite".to_string(),
            ));
        }
        if self.signal.impulse_rate <= 0.0 || !self.signal.impulse_rate.is_finite() {
            return Err(ConfigError::ValidationError(
                "impulse_rate must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
