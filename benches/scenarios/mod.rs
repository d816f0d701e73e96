//! Real-world scenario benchmarks.
//!
//! Full tone-renderer blocks with clicks in flight, and scheduling passes at
//! the densest settings the metronome allows.

mod renderer;
mod scheduling;

pub use renderer::bench_renderer;
pub use scheduling::bench_scheduling;
