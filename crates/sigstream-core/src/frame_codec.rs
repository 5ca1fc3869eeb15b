//! Frame Codec — SampleBlock to raw f32 bytes
//!
//! Encodes a block of samples into the analyzer wire format: `N` samples
//! become `N * 4` bytes of little-endian IEEE-754 single precision,
//! concatenated in sample order. No header, no length prefix, no
//! checksum; the wire format *is* the encoded block, and receivers must
//! know the frame size out of band.
//!
//! ## Example
//!
//! ```rust
//! use sigstream_core::frame_codec::FrameCodec;
//!
//! let codec = FrameCodec::new(4);
//! let frame = codec.encode(&[0.0, 0.5, -0.5, 1.0]).unwrap();
//! assert_eq!(frame.len(), 16);
//!
//! let block = codec.decode(&frame).unwrap();
//! assert_eq!(block, vec![0.0, 0.5, -0.5, 1.0]);
//! ```

use std::fmt;

/// Error type for frame encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Sample count does not match the configured frame size.
    LengthMismatch { expected: usize, actual: usize },
    /// Byte count does not match the configured frame byte length.
    FrameSizeMismatch { expected: usize, actual: usize },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::LengthMismatch { expected, actual } => {
                write!(f, "block has {actual} samples, frame size is {expected}")
            }
            CodecError::FrameSizeMismatch { expected, actual } => {
                write!(f, "frame has {actual} bytes, expected {expected}")
            }
        }
    }
}

impl std::error::Error for CodecError {}

/// Fixed-geometry sample frame codec.
///
/// The frame size is fixed at construction; a block of any other length
/// is a configuration error, not a runtime data error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCodec {
    frame_size: usize,
}

impl FrameCodec {
    /// Create a codec for frames of `frame_size` samples.
    pub fn new(frame_size: usize) -> Self {
        Self { frame_size }
    }

    /// Frame size in samples.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Frame size in bytes (4 bytes per sample).
    pub fn frame_bytes(&self) -> usize {
        self.frame_size * 4
    }

    /// Encode a sample block into f32 LE bytes.
    pub fn encode(&self, block: &[f64]) -> Result<Vec<u8>, CodecError> {
        if block.len() != self.frame_size {
            return Err(CodecError::LengthMismatch {
                expected: self.frame_size,
                actual: block.len(),
            });
        }
        let mut buf = Vec::with_capacity(self.frame_bytes());
        for &s in block {
            buf.extend_from_slice(&(s as f32).to_le_bytes());
        }
        Ok(buf)
    }

    /// Decode f32 LE bytes back into a sample block.
    ///
    /// Used by the consumer side and by round-trip tests; the sender
    /// never decodes.
    pub fn decode(&self, data: &[u8]) -> Result<Vec<f64>, CodecError> {
        if data.len() != self.frame_bytes() {
            return Err(CodecError::FrameSizeMismatch {
                expected: self.frame_bytes(),
                actual: data.len(),
            });
        }
        let samples = data
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as f64)
            .collect();
        Ok(samples)
    }
}
