// Oscillators - sine generators for the ambient voices

use std::f32::consts::PI;

pub trait Oscillator {
    fn next_sample(&mut self) -> f32;
    fn set_frequency(&mut self, freq: f32);
    fn reset(&mut self);
}

/// Plain sine with a phase accumulator in [0, 1)
pub struct SineOscillator {
    phase: f32,
    phase_increment: f32,
    sample_rate: f32,
}

impl SineOscillator {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            phase_increment: 0.0,
            sample_rate,
        }
    }
}

impl Oscillator for SineOscillator {
    fn next_sample(&mut self) -> f32 {
        let sample = (self.phase * 2.0 * PI).sin();

        self.phase += self.phase_increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        sample
    }

    fn set_frequency(&mut self, freq: f32) {
        self.phase_increment = freq / self.sample_rate;
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Three sines spread symmetrically around the center pitch, in cents
///
/// The detuned copies beat slowly against each other, which turns a static
/// sine into a moving pad. Output is averaged so the stack peaks at the
/// same level as a single sine.
pub struct DetunedSineStack {
    oscillators: [SineOscillator; 3],
    detune_ratios: [f32; 3],
}

impl DetunedSineStack {
    pub fn new(spread_cents: f32, sample_rate: f32) -> Self {
        // Frequency ratio for a detune of c cents: 2^(c/1200)
        let detune_ratios =
            [-spread_cents, 0.0, spread_cents].map(|cents| 2.0_f32.powf(cents / 1200.0));

        Self {
            oscillators: std::array::from_fn(|_| SineOscillator::new(sample_rate)),
            detune_ratios,
        }
    }
}

impl Oscillator for DetunedSineStack {
    fn next_sample(&mut self) -> f32 {
        let sum: f32 = self.oscillators.iter_mut().map(|o| o.next_sample()).sum();
        sum / self.oscillators.len() as f32
    }

    fn set_frequency(&mut self, freq: f32) {
        for (osc, ratio) in self.oscillators.iter_mut().zip(self.detune_ratios) {
            osc.set_frequency(freq * ratio);
        }
    }

    fn reset(&mut self) {
        for osc in &mut self.oscillators {
            osc.reset();
        }
    }
}
