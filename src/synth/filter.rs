// Lowpass filter - State Variable Filter (Chamberlin), lowpass tap
//
// 2-pole digital state variable filter, 12dB/octave. Only the low-pass
// output is exposed; the drone path runs through it at a fixed cutoff.
//
// Coefficients:
// - f = 2 * sin(π * fc / Fs)
// - q = 1 / Q
//
// The recurrence is stable up to about Fs/6, so the cutoff is clamped
// there.

use std::f32::consts::PI;

pub struct LowpassFilter {
    // State variables
    low: f32,
    band: f32,

    // Coefficients, fixed at construction
    f: f32,
    q: f32,
}

impl LowpassFilter {
    /// Create a lowpass with a fixed cutoff (Hz) and resonance (Q factor)
    pub fn new(cutoff: f32, resonance: f32, sample_rate: f32) -> Self {
        let max_cutoff = sample_rate / 6.0;
        let safe_cutoff = cutoff.clamp(20.0, max_cutoff);

        let f = 2.0 * (PI * safe_cutoff / sample_rate).sin();

        let q_factor = resonance.clamp(0.5, 20.0);
        let q = (1.0 / q_factor).clamp(0.01, 2.0);

        Self {
            low: 0.0,
            band: 0.0,
            f,
            q,
        }
    }

    /// Clear the filter state
    pub fn reset(&mut self) {
        self.low = 0.0;
        self.band = 0.0;
    }

    /// Process a single sample, returning the low-pass output
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let high = input - self.low - self.q * self.band;
        self.band += self.f * high;
        self.low += self.f * self.band;
        self.low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48000.0;

    fn generate_sine(frequency: f32, sample_rate: f32, num_samples: usize) -> Vec<f32> {
        (0..num_samples)
            .map(|i| {
                let t = i as f32 / sample_rate;
                (2.0 * PI * frequency * t).sin()
            })
            .collect()
    }

    fn compute_rms(signal: &[f32]) -> f32 {
        let sum_squares: f32 = signal.iter().map(|x| x * x).sum();
        (sum_squares / signal.len() as f32).sqrt()
    }

    #[test]
    fn test_dc_passes() {
        let mut filter = LowpassFilter::new(100.0, 0.707, SAMPLE_RATE);

        let mut last_output = 0.0;
        for _ in 0..5000 {
            last_output = filter.process(1.0);
        }

        // A lowpass passes DC, so the output converges to the input
        assert!((last_output - 1.0).abs() < 0.1);
    }

    #[test]
    fn test_frequency_response() {
        let mut filter = LowpassFilter::new(800.0, 0.707, SAMPLE_RATE);

        // Two octaves below the cutoff: passes nearly untouched
        let low_input = generate_sine(200.0, SAMPLE_RATE, 4800);
        let low_output: Vec<f32> = low_input.iter().map(|&s| filter.process(s)).collect();
        let low_gain = compute_rms(&low_output[1000..]) / compute_rms(&low_input[1000..]);
        assert!(low_gain > 0.8, "Low frequency attenuated too much: {}", low_gain);

        filter.reset();

        // Well above the cutoff: strongly attenuated
        let high_input = generate_sine(5000.0, SAMPLE_RATE, 4800);
        let high_output: Vec<f32> = high_input.iter().map(|&s| filter.process(s)).collect();
        let high_gain = compute_rms(&high_output[1000..]) / compute_rms(&high_input[1000..]);
        assert!(high_gain < 0.2, "High frequency passed: {}", high_gain);
    }

    #[test]
    fn test_stability_high_resonance() {
        let mut filter = LowpassFilter::new(5000.0, 10.0, SAMPLE_RATE);

        for _ in 0..10000 {
            let output = filter.process(0.5);
            assert!(output.is_finite());
        }
    }

    #[test]
    fn test_cutoff_clamped_to_stable_range() {
        // Requests far beyond Fs/6 must still produce a stable filter
        let mut filter = LowpassFilter::new(20000.0, 0.707, SAMPLE_RATE);

        for _ in 0..5000 {
            let output = filter.process(0.5);
            assert!(output.is_finite());
            assert!(output.abs() < 10.0);
        }
    }

    #[test]
    fn test_reset_clears_state() {
        let mut filter = LowpassFilter::new(800.0, 0.707, SAMPLE_RATE);

        for _ in 0..100 {
            filter.process(1.0);
        }
        assert!(filter.low.abs() > 0.01 || filter.band.abs() > 0.01);

        filter.reset();
        assert_eq!(filter.low, 0.0);
        assert_eq!(filter.band, 0.0);
    }
}
