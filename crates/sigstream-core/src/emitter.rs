//! Emitter — the timed frame-emission loop
//!
//! Ties the signal source, the frame codec and a frame sink together:
//! generate one block, encode it, send it, log throughput every 50
//! frames, pause, repeat until cancelled or the transport fails. The
//! sink is closed on every exit path, exactly once, and nothing is sent
//! after that.
//!
//! The pause is a plain sleep of the configured interval with no drift
//! compensation: actual frame spacing is interval plus processing time,
//! so the achieved rate runs slightly below nominal.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sigstream_core::cancel::CancelToken;
//! use sigstream_core::config::StreamConfig;
//! use sigstream_core::emitter::Emitter;
//! use sigstream_core::transport::create_sink;
//!
//! let config = StreamConfig::default();
//! let sink = create_sink(&config.network);
//! let mut emitter = Emitter::new(&config, sink);
//!
//! let cancel = CancelToken::new();
//! emitter.run(&cancel).unwrap();
//! ```

use crate::cancel::CancelToken;
use crate::config::StreamConfig;
use crate::frame_codec::{CodecError, FrameCodec};
use crate::signal_source::SignalSource;
use crate::throttle::ThroughputMonitor;
use crate::transport::{FrameSink, TransportError};
use std::fmt;
use std::time::Duration;

/// Frames between throughput reports.
const REPORT_INTERVAL_FRAMES: u64 = 50;

/// Error type for a failed emission run.
///
/// Cancellation is not an error; a cancelled run returns `Ok`.
#[derive(Debug)]
pub enum EmitterError {
    /// Frame encoding failed (mismatched geometry).
    Codec(CodecError),
    /// The transport failed.
    Transport(TransportError),
}

impl fmt::Display for EmitterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitterError::Codec(e) => write!(f, "codec error: {e}"),
            EmitterError::Transport(e) => write!(f, "transport error: {e}"),
        }
    }
}

impl std::error::Error for EmitterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EmitterError::Codec(e) => Some(e),
            EmitterError::Transport(e) => Some(e),
        }
    }
}

impl From<CodecError> for EmitterError {
    fn from(e: CodecError) -> Self {
        EmitterError::Codec(e)
    }
}

impl From<TransportError> for EmitterError {
    fn from(e: TransportError) -> Self {
        EmitterError::Transport(e)
    }
}

/// Timed frame-emission driver.
///
/// Owns the whole pipeline; the sink socket is touched by no one else.
pub struct Emitter {
    source: SignalSource,
    codec: FrameCodec,
    sink: Box<dyn FrameSink>,
    monitor: ThroughputMonitor,
    update_interval: Duration,
    frames_sent: u64,
}

impl Emitter {
    /// Build an emitter from a configuration and a sink.
    pub fn new(config: &StreamConfig, sink: Box<dyn FrameSink>) -> Self {
        Self::from_parts(
            SignalSource::new(config.signal.waveform(), config.sample_rate),
            FrameCodec::new(config.frame_size),
            sink,
            Duration::from_secs_f64(config.update_interval),
        )
    }

    /// Build an emitter from explicit parts.
    pub fn from_parts(
        source: SignalSource,
        codec: FrameCodec,
        sink: Box<dyn FrameSink>,
        update_interval: Duration,
    ) -> Self {
        Self {
            source,
            codec,
            sink,
            monitor: ThroughputMonitor::new(REPORT_INTERVAL_FRAMES),
            update_interval,
            frames_sent: 0,
        }
    }

    /// Frames successfully sent so far.
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Run the emission loop until cancellation or failure.
    ///
    /// The sink is started first (in TCP mode this waits for the
    /// analyzer to connect; cancelling during the wait is a normal
    /// shutdown). The sink is closed exactly once on the way out,
    /// whatever the outcome.
    pub fn run(&mut self, cancel: &CancelToken) -> Result<(), EmitterError> {
        let result = self.run_loop(cancel);
        self.sink.close();
        match &result {
            Ok(()) => tracing::info!(frames = self.frames_sent, "emitter stopped"),
            Err(e) => tracing::warn!(frames = self.frames_sent, error = %e, "emitter failed"),
        }
        result
    }

    fn run_loop(&mut self, cancel: &CancelToken) -> Result<(), EmitterError> {
        match self.sink.start(cancel) {
            Ok(()) => {}
            Err(TransportError::Cancelled) => return Ok(()),
            Err(e) => return Err(EmitterError::Transport(e)),
        }

        let frame_size = self.codec.frame_size();
        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }

            let block = self.source.generate(frame_size);
            let frame = self.codec.encode(&block)?;
            self.sink.send(&frame)?;
            self.frames_sent += 1;

            if let Some(fps) = self.monitor.record() {
                tracing::info!(
                    frames = self.frames_sent,
                    fps = %format_args!("{fps:.1}"),
                    "streaming"
                );
            }

            if !cancel.sleep(self.update_interval) {
                return Ok(());
            }
        }
    }
}
