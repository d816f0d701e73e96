//! Low-level DSP primitives used to synthesize clicks.
//!
//! These components are allocation-free and realtime-safe, so they can live
//! inside the audio callback's voice pool.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Phase-accumulating sine oscillator.
pub mod oscillator;

pub use envelope::{Envelope, EnvelopeState};
pub use oscillator::SineOscillator;
