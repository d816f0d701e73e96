use std::f32::consts::TAU;

/*
Sine Oscillator
===============

A click only needs the purest tone there is: a single sine at a fixed
frequency. The oscillator keeps a phase in [0, 1) and advances it by
`frequency / sample_rate` every sample:

    out[n] = sin(2π · phase)
    phase  = fract(phase + f / sr)

Keeping the phase normalised (instead of accumulating radians) stops the
accumulator from losing precision on long-running voices.

Frequencies above Nyquist (sr / 2) would alias, so they are clamped.
*/

#[derive(Debug, Clone, Copy)]
pub struct SineOscillator {
    sample_rate: f32,
    frequency: f32,
    phase: f32,
}

impl SineOscillator {
    pub fn new(sample_rate: f32, frequency: f32) -> Self {
        let mut osc = Self {
            sample_rate,
            frequency: 0.0,
            phase: 0.0,
        };
        osc.set_frequency(frequency);
        osc
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency.clamp(0.0, self.sample_rate * 0.5);
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Restart the waveform at phase 0 (a zero crossing).
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let out = (TAU * self.phase).sin();
        self.phase += self.frequency / self.sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        out
    }

    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample();
        }
    }
}
