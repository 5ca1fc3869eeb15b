//! # Sigstream Core
//!
//! This crate generates synthetic time-domain test signals and streams
//! them continuously, as raw binary sample frames, to a spectrum
//! analyzer over TCP or UDP.
//!
//! ## Overview
//!
//! A spectrum analyzer under test needs a predictable, continuous feed of
//! known signals. This library provides:
//!
//! - **Signal Generation**: ten deterministic waveform synthesizers
//!   (tones, multi-tone mixes, chirps, noise, impulse trains, AM/FM)
//!   sharing one sample-rate and frame-size contract
//! - **Frame Encoding**: fixed-size little-endian f32 frames with no
//!   headers or delimiters
//! - **Transport**: one send operation over either a server-role TCP
//!   stream or fire-and-forget UDP datagrams
//! - **Emission Loop**: a timed, cancellable driver with throughput
//!   reporting
//!
//! ## Signal Flow
//!
//! ```text
//! SignalSource → SampleBlock → FrameCodec → Frame → FrameSink → socket
//!        └──────────────── Emitter (timed loop) ────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use sigstream_core::{CancelToken, Emitter, StreamConfig};
//! use sigstream_core::transport::create_sink;
//!
//! let config = StreamConfig::default();
//! config.validate().unwrap();
//!
//! let sink = create_sink(&config.network);
//! let mut emitter = Emitter::new(&config, sink);
//!
//! let cancel = CancelToken::new();
//! // In TCP mode this blocks until the analyzer connects, then streams
//! // one 512-sample frame every 100 ms until `cancel.cancel()` is called.
//! emitter.run(&cancel).unwrap();
//! ```

pub mod cancel;
pub mod config;
pub mod emitter;
pub mod frame_codec;
pub mod signal_source;
pub mod throttle;
pub mod transport;

pub use cancel::CancelToken;
pub use config::{ConfigError, NetworkConfig, SignalConfig, SignalKind, StreamConfig, TransportKind};
pub use emitter::{Emitter, EmitterError};
pub use frame_codec::{CodecError, FrameCodec};
pub use signal_source::{SignalSource, Waveform};
pub use throttle::ThroughputMonitor;
pub use transport::{
    create_sink, FrameSink, TcpFrameSink, TcpSinkState, TransportError, UdpFrameSink, UdpSinkState,
};
