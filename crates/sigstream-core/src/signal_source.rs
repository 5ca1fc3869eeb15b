//! Signal Source / Waveform Generator
//!
//! Generates the standard test signals used to exercise a spectrum
//! analyzer: tones, multi-tone mixes, chirps, noise, impulse trains and
//! modulated carriers. All generators share one contract: a block of `N`
//! real samples on a time axis `t = [0, 1, .., N-1] / Fs`.
//!
//! Every call to [`SignalSource::generate`] recomputes the time axis from
//! zero. There is no phase continuity across successive blocks; the chirp
//! integrates its frequency within a single block and restarts on the
//! next one. Downstream analyzers window per-block, so the discontinuity
//! is intentional.
//!
//! ## Example
//!
//! ```rust
//! use sigstream_core::signal_source::{SignalSource, Waveform};
//!
//! // 1 kHz tone at 8 kHz sample rate
//! let mut src = SignalSource::new(Waveform::sine(1000.0), 8000.0);
//!
//! let block = src.generate(512);
//! assert_eq!(block.len(), 512);
//! assert_eq!(block[0], 0.0); // sin(0)
//! ```

use std::f64::consts::PI;

/// Default PRNG seed for the noise-bearing waveforms.
const DEFAULT_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// The three fixed components of the multi-tone signal: (frequency Hz, weight).
const MULTI_TONE_COMPONENTS: [(f64, f64); 3] = [(440.0, 0.3), (880.0, 0.2), (1320.0, 0.15)];

/// Waveform kind with its generation parameters.
///
/// Amplitudes follow the conventions of the analyzer test suite: tones
/// default to 0.5, the chirp to 0.8, noise to 0.3.
#[derive(Debug, Clone, PartialEq)]
pub enum Waveform {
    /// Single tone: `A * sin(2*pi*f*t)`.
    Sine { frequency: f64, amplitude: f64 },
    /// Weighted sum of three fixed tones (440/880/1320 Hz).
    MultiTone,
    /// Linear frequency sweep across the block duration.
    Chirp {
        start_freq: f64,
        end_freq: f64,
        amplitude: f64,
    },
    /// White Gaussian noise, scaled.
    Noise { amplitude: f64 },
    /// Tone plus Gaussian noise at the given SNR relative to tone power.
    SignalPlusNoise { frequency: f64, snr_db: f64 },
    /// Unit impulses every `floor(Fs / rate)` samples, zero elsewhere.
    ImpulseTrain { rate: f64 },
    /// Sign of a sine, scaled to +/-0.5.
    Square { frequency: f64 },
    /// Triangular ramp in [-0.5, 0.5].
    Sawtooth { frequency: f64 },
    /// Carrier multiplied by a non-negative sinusoidal envelope.
    Am { carrier_freq: f64, mod_freq: f64 },
    /// Sinusoidal phase modulation of a carrier.
    Fm {
        carrier_freq: f64,
        mod_freq: f64,
        mod_index: f64,
    },
}

impl Waveform {
    /// Tone at `frequency` with the default 0.5 amplitude.
    pub fn sine(frequency: f64) -> Self {
        Waveform::Sine {
            frequency,
            amplitude: 0.5,
        }
    }

    /// Linear chirp sweeping 500 Hz to 2500 Hz at 0.8 amplitude.
    pub fn chirp() -> Self {
        Waveform::Chirp {
            start_freq: 500.0,
            end_freq: 2500.0,
            amplitude: 0.8,
        }
    }

    /// White Gaussian noise at the default 0.3 scale.
    pub fn noise() -> Self {
        Waveform::Noise { amplitude: 0.3 }
    }

    /// AM: 2 kHz carrier, 100 Hz modulator.
    pub fn am() -> Self {
        Waveform::Am {
            carrier_freq: 2000.0,
            mod_freq: 100.0,
        }
    }

    /// FM: 2 kHz carrier, 100 Hz modulator, modulation index 5.
    pub fn fm() -> Self {
        Waveform::Fm {
            carrier_freq: 2000.0,
            mod_freq: 100.0,
            mod_index: 5.0,
        }
    }
}

/// Block-oriented waveform generator.
///
/// Owns the waveform parameters and a deterministic xorshift64 PRNG used
/// by the noise-bearing kinds. Deterministic kinds produce identical
/// output on every call (time restarts at zero); noise-bearing kinds
/// advance the PRNG state per call but are reproducible from a given
/// seed via [`SignalSource::reset`].
#[derive(Debug, Clone)]
pub struct SignalSource {
    waveform: Waveform,
    sample_rate: f64,
    rng_state: u64,
    seed: u64,
}

impl SignalSource {
    /// Create a source with the default noise seed.
    pub fn new(waveform: Waveform, sample_rate: f64) -> Self {
        Self::with_seed(waveform, sample_rate, DEFAULT_SEED)
    }

    /// Create a source with an explicit noise seed.
    pub fn with_seed(waveform: Waveform, sample_rate: f64, seed: u64) -> Self {
        let seed = seed.max(1); // xorshift state must be nonzero
        Self {
            waveform,
            sample_rate,
            rng_state: seed,
            seed,
        }
    }

    /// Generate one block of `num_samples` samples, time axis from zero.
    pub fn generate(&mut self, num_samples: usize) -> Vec<f64> {
        let fs = self.sample_rate;
        let mut out = Vec::with_capacity(num_samples);

        match self.waveform.clone() {
            Waveform::Sine {
                frequency,
                amplitude,
            } => {
                for i in 0..num_samples {
                    let t = i as f64 / fs;
                    out.push(amplitude * (2.0 * PI * frequency * t).sin());
                }
            }
            Waveform::MultiTone => {
                for i in 0..num_samples {
                    let t = i as f64 / fs;
                    let mut s = 0.0;
                    for (freq, weight) in MULTI_TONE_COMPONENTS {
                        s += weight * (2.0 * PI * freq * t).sin();
                    }
                    out.push(s);
                }
            }
            Waveform::Chirp {
                start_freq,
                end_freq,
                amplitude,
            } => {
                // Instantaneous frequency is linear in t; phase is its
                // discrete integral. The sweep spans exactly this block
                // and restarts from start_freq on the next call.
                let duration = num_samples as f64 / fs;
                let mut phase = 0.0;
                for i in 0..num_samples {
                    let t = i as f64 / fs;
                    let freq = start_freq + (end_freq - start_freq) * t / duration;
                    phase += 2.0 * PI * freq / fs;
                    out.push(amplitude * phase.sin());
                }
            }
            Waveform::Noise { amplitude } => {
                for _ in 0..num_samples {
                    let g = self.gaussian();
                    out.push(amplitude * g);
                }
            }
            Waveform::SignalPlusNoise { frequency, snr_db } => {
                // Noise variance derived from the 0.5-amplitude tone power.
                let noise_scale = (0.25 / 10f64.powf(snr_db / 10.0)).sqrt();
                for i in 0..num_samples {
                    let t = i as f64 / fs;
                    let tone = 0.5 * (2.0 * PI * frequency * t).sin();
                    let g = self.gaussian();
                    out.push(tone + noise_scale * g);
                }
            }
            Waveform::ImpulseTrain { rate } => {
                let spacing = ((fs / rate).floor() as usize).max(1);
                for i in 0..num_samples {
                    out.push(if i % spacing == 0 { 1.0 } else { 0.0 });
                }
            }
            Waveform::Square { frequency } => {
                for i in 0..num_samples {
                    let t = i as f64 / fs;
                    let s = (2.0 * PI * frequency * t).sin();
                    out.push(if s >= 0.0 { 0.5 } else { -0.5 });
                }
            }
            Waveform::Sawtooth { frequency } => {
                for i in 0..num_samples {
                    let t = i as f64 / fs;
                    let x = t * frequency;
                    out.push(0.5 * (2.0 * (x - (x + 0.5).floor())));
                }
            }
            Waveform::Am {
                carrier_freq,
                mod_freq,
            } => {
                for i in 0..num_samples {
                    let t = i as f64 / fs;
                    let carrier = (2.0 * PI * carrier_freq * t).sin();
                    let modulator = 0.5 * (1.0 + (2.0 * PI * mod_freq * t).sin());
                    out.push(0.5 * carrier * modulator);
                }
            }
            Waveform::Fm {
                carrier_freq,
                mod_freq,
                mod_index,
            } => {
                for i in 0..num_samples {
                    let t = i as f64 / fs;
                    let phase =
                        2.0 * PI * carrier_freq * t + mod_index * (2.0 * PI * mod_freq * t).sin();
                    out.push(0.5 * phase.sin());
                }
            }
        }

        out
    }

    /// Uniform random in [0, 1) from a xorshift64 step.
    fn uniform(&mut self) -> f64 {
        self.rng_state ^= self.rng_state << 13;
        self.rng_state ^= self.rng_state >> 7;
        self.rng_state ^= self.rng_state << 17;
        (self.rng_state >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Standard Gaussian sample via the Box-Muller transform.
    fn gaussian(&mut self) -> f64 {
        let u1 = self.uniform().max(1e-30); // avoid log(0)
        let u2 = self.uniform();
        let r = (-2.0 * u1.ln()).sqrt();
        r * (2.0 * PI * u2).cos()
    }

    /// Restore the PRNG to its seed state.
    pub fn reset(&mut self) {
        self.rng_state = self.seed;
    }

    /// Get the sample rate.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Get the configured waveform.
    pub fn waveform(&self) -> &Waveform {
        &self.waveform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_kinds() -> Vec<Waveform> {
        vec![
            Waveform::sine(1000.0),
            Waveform::MultiTone,
            Waveform::chirp(),
            Waveform::noise(),
            Waveform::SignalPlusNoise {
                frequency: 1000.0,
                snr_db: 6.0,
            },
            Waveform::ImpulseTrain { rate: 100.0 },
            Waveform::Square { frequency: 440.0 },
            Waveform::Sawtooth { frequency: 440.0 },
            Waveform::am(),
            Waveform::fm(),
        ]
    }

    #[test]
    fn test_block_length_all_kinds() {
        for waveform in all_kinds() {
            let mut src = SignalSource::new(waveform.clone(), 8000.0);
            for n in [1, 7, 512, 1000] {
                assert_eq!(
                    src.generate(n).len(),
                    n,
                    "wrong block length for {waveform:?}"
                );
            }
        }
    }

    #[test]
    fn test_sine_known_samples() {
        // f=1000 at Fs=8000: one cycle every 8 samples
        let mut src = SignalSource::new(Waveform::sine(1000.0), 8000.0);
        let block = src.generate(512);
        assert_eq!(block[0], 0.0);
        let expected = 0.5 * (2.0 * PI * 1000.0 * (2.0 / 8000.0)).sin();
        assert!((block[2] - expected).abs() < 1e-12);
        assert!((block[2] - 0.5).abs() < 1e-9); // sin(pi/2)
    }

    #[test]
    fn test_sine_bounds() {
        let mut src = SignalSource::new(
            Waveform::Sine {
                frequency: 123.0,
                amplitude: 0.7,
            },
            8000.0,
        );
        for s in src.generate(4096) {
            assert!(s.abs() <= 0.7 + 1e-12);
        }
    }

    #[test]
    fn test_square_exact_levels() {
        let mut src = SignalSource::new(Waveform::Square { frequency: 440.0 }, 8000.0);
        for s in src.generate(4096) {
            assert!(s == 0.5 || s == -0.5, "square sample {s} not +/-0.5");
        }
    }

    #[test]
    fn test_sawtooth_bounds() {
        let mut src = SignalSource::new(Waveform::Sawtooth { frequency: 440.0 }, 8000.0);
        for s in src.generate(4096) {
            assert!(s.abs() <= 0.5 + 1e-12);
        }
    }

    #[test]
    fn test_am_magnitude_bounded_by_carrier() {
        let mut src = SignalSource::new(Waveform::am(), 8000.0);
        for s in src.generate(8000) {
            assert!(s.abs() <= 0.5 + 1e-12, "AM sample {s} exceeds carrier bound");
        }
    }

    #[test]
    fn test_fm_bounds() {
        let mut src = SignalSource::new(Waveform::fm(), 8000.0);
        for s in src.generate(8000) {
            assert!(s.abs() <= 0.5 + 1e-12);
        }
    }

    #[test]
    fn test_multi_tone_bounds() {
        // Worst case is the sum of the weights
        let mut src = SignalSource::new(Waveform::MultiTone, 8000.0);
        for s in src.generate(8000) {
            assert!(s.abs() <= 0.65 + 1e-12);
        }
    }

    #[test]
    fn test_impulse_train_spacing() {
        // rate=100 at Fs=8000: impulse every 80 samples, 100 per second
        let mut src = SignalSource::new(Waveform::ImpulseTrain { rate: 100.0 }, 8000.0);
        let block = src.generate(8000);
        let mut impulses = 0;
        for (i, &s) in block.iter().enumerate() {
            if i % 80 == 0 {
                assert_eq!(s, 1.0, "expected impulse at index {i}");
                impulses += 1;
            } else {
                assert_eq!(s, 0.0, "expected zero at index {i}");
            }
        }
        assert_eq!(impulses, 100);
    }

    #[test]
    fn test_chirp_amplitude() {
        let mut src = SignalSource::new(Waveform::chirp(), 8000.0);
        for s in src.generate(512) {
            assert!(s.abs() <= 0.8 + 1e-12);
        }
    }

    #[test]
    fn test_time_zero_regeneration() {
        // Deterministic kinds restart from t=0 on every call: successive
        // blocks are identical (the chirp sweep restarts, it does not
        // continue).
        for waveform in [Waveform::sine(1000.0), Waveform::chirp(), Waveform::MultiTone] {
            let mut src = SignalSource::new(waveform, 8000.0);
            let first = src.generate(512);
            let second = src.generate(512);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_noise_statistics() {
        let mut src = SignalSource::new(Waveform::noise(), 8000.0);
        let block = src.generate(20000);
        let mean: f64 = block.iter().sum::<f64>() / block.len() as f64;
        let var: f64 =
            block.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / block.len() as f64;
        assert!(mean.abs() < 0.02, "noise mean {mean} too far from 0");
        let std = var.sqrt();
        assert!(
            (std - 0.3).abs() < 0.05,
            "noise std {std} too far from 0.3"
        );
    }

    #[test]
    fn test_noise_reset_reproducible() {
        let mut src = SignalSource::with_seed(Waveform::noise(), 8000.0, 42);
        let first = src.generate(256);
        let second = src.generate(256);
        assert_ne!(first, second, "rng should advance between calls");
        src.reset();
        let replay = src.generate(256);
        assert_eq!(first, replay);
    }

    #[test]
    fn test_signal_plus_noise_variance() {
        let snr_db = 6.0;
        let mut src = SignalSource::new(
            Waveform::SignalPlusNoise {
                frequency: 1000.0,
                snr_db,
            },
            8000.0,
        );
        let block = src.generate(16384);

        // Subtract the known tone; the residual is the injected noise
        let expected_var = 0.25 / 10f64.powf(snr_db / 10.0);
        let mut residual_var = 0.0;
        for (i, &s) in block.iter().enumerate() {
            let t = i as f64 / 8000.0;
            let tone = 0.5 * (2.0 * PI * 1000.0 * t).sin();
            residual_var += (s - tone) * (s - tone);
        }
        residual_var /= block.len() as f64;
        assert!(
            (residual_var - expected_var).abs() < 0.01,
            "residual variance {residual_var} vs expected {expected_var}"
        );
    }
}
