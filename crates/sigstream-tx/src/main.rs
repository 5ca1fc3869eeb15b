//! sigstream-tx — stream synthetic test signals to a spectrum analyzer.
//!
//! Runs as a TCP server (waits for the analyzer to connect, then streams)
//! or a UDP sender (fire-and-forget to loopback). Frames are raw
//! little-endian f32 samples, 512 per frame by default, one frame every
//! 100 ms, until Ctrl-C.
//!
//! ```bash
//! sigstream-tx --port 5000 --transport tcp --signal sine --freq 1000
//! sigstream-tx --transport udp --signal chirp --interval 0.05
//! ```

use anyhow::Context;
use clap::Parser;
use sigstream_core::transport::create_sink;
use sigstream_core::{CancelToken, Emitter, EmitterError, StreamConfig, TransportError};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Send synthetic test signals to a spectrum analyzer over TCP or UDP")]
struct Args {
    /// Host to bind in TCP server mode. UDP always sends to 127.0.0.1.
    #[arg(long)]
    host: Option<String>,

    /// Port number (default: 5000).
    #[arg(long)]
    port: Option<u16>,

    /// Network transport: tcp or udp.
    #[arg(long)]
    transport: Option<String>,

    /// Signal kind: sine, multi, chirp, noise, impulse, square,
    /// sawtooth, am, fm, signal_noise.
    #[arg(long)]
    signal: Option<String>,

    /// Base frequency in Hz (default: 1000).
    #[arg(long)]
    freq: Option<f64>,

    /// Seconds between frames (default: 0.1).
    #[arg(long)]
    interval: Option<f64>,

    /// Signal-to-noise ratio in dB for signal_noise (default: 6).
    #[arg(long)]
    snr_db: Option<f64>,

    /// Impulse repetition rate in Hz for impulse (default: 100).
    #[arg(long)]
    impulse_rate: Option<f64>,

    /// Path to a YAML config file (otherwise the default search path).
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    /// Load the configuration and apply CLI overrides.
    fn into_config(self) -> anyhow::Result<StreamConfig> {
        let mut config = match &self.config {
            Some(path) => StreamConfig::load_from(path)
                .with_context(|| format!("load config {}", path.display()))?,
            None => StreamConfig::load().context("load config")?,
        };

        if let Some(host) = self.host {
            config.network.host = host;
        }
        if let Some(port) = self.port {
            config.network.port = port;
        }
        if let Some(transport) = self.transport {
            config.network.transport = transport.parse()?;
        }
        if let Some(signal) = self.signal {
            config.signal.kind = signal.parse()?;
        }
        if let Some(freq) = self.freq {
            config.signal.frequency = freq;
        }
        if let Some(interval) = self.interval {
            config.update_interval = interval;
        }
        if let Some(snr_db) = self.snr_db {
            config.signal.snr_db = snr_db;
        }
        if let Some(rate) = self.impulse_rate {
            config.signal.impulse_rate = rate;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // All configuration errors surface here, before any socket opens.
    let config = Args::parse().into_config()?;

    tracing::info!(
        signal = %config.signal.kind,
        transport = %config.network.transport,
        port = config.network.port,
        sample_rate = config.sample_rate,
        frame_size = config.frame_size,
        "starting signal stream"
    );

    let sink = create_sink(&config.network);
    let mut emitter = Emitter::new(&config, sink);

    let cancel = CancelToken::new();
    let handler = cancel.clone();
    ctrlc::set_handler(move || {
        tracing::info!("interrupt received, stopping");
        handler.cancel();
    })
    .context("install interrupt handler")?;

    match emitter.run(&cancel) {
        Ok(()) => {
            tracing::info!(frames = emitter.frames_sent(), "shutdown complete");
            Ok(())
        }
        Err(EmitterError::Transport(TransportError::ConnectionLost(err))) => {
            tracing::error!(
                frames = emitter.frames_sent(),
                error = %err,
                "connection lost: analyzer disconnected"
            );
            Err(anyhow::anyhow!("connection lost: {err}"))
        }
        Err(err) => {
            tracing::error!(frames = emitter.frames_sent(), error = %err, "stream failed");
            Err(err.into())
        }
    }
}
