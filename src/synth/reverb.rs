// Reverb - Freeverb-style reverb
//
// Based on the Freeverb algorithm by Jezar at Dreampoint (public domain):
// parallel comb filters with damped feedback, into series allpass filters.
// Mono version, 4 combs + 2 allpasses. All buffers are pre-allocated at
// creation; processing is allocation-free.

/// Reverb settings, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParams {
    /// Room size (0.0 to 1.0, larger = longer decay)
    pub room_size: f32,
    /// Damping of high frequencies in the feedback loop (0.0 to 1.0)
    pub damping: f32,
    /// Dry/Wet mix (0.0 = fully dry, 1.0 = fully wet)
    pub mix: f32,
}

impl ReverbParams {
    /// Create reverb parameters with clamping
    pub fn new(room_size: f32, damping: f32, mix: f32) -> Self {
        Self {
            room_size: room_size.clamp(0.0, 1.0),
            damping: damping.clamp(0.0, 1.0),
            mix: mix.clamp(0.0, 1.0),
        }
    }
}

/// Comb filter with damped feedback
struct CombFilter {
    buffer: Vec<f32>,
    buffer_index: usize,
    feedback: f32,
    damping: f32,
    /// One-pole lowpass state in the feedback path
    filter_state: f32,
}

impl CombFilter {
    fn new(buffer_size: usize, feedback: f32, damping: f32) -> Self {
        Self {
            buffer: vec![0.0; buffer_size],
            buffer_index: 0,
            feedback,
            damping,
            filter_state: 0.0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.buffer_index];

        // Damp the feedback so highs die faster than lows
        self.filter_state = output * (1.0 - self.damping) + self.filter_state * self.damping;

        self.buffer[self.buffer_index] = input + self.filter_state * self.feedback;
        self.buffer_index = (self.buffer_index + 1) % self.buffer.len();

        output
    }

    fn mute(&mut self) {
        self.buffer.fill(0.0);
        self.buffer_index = 0;
        self.filter_state = 0.0;
    }
}

/// Allpass filter (diffuses the comb output)
struct AllpassFilter {
    buffer: Vec<f32>,
    buffer_index: usize,
}

impl AllpassFilter {
    fn new(buffer_size: usize) -> Self {
        Self {
            buffer: vec![0.0; buffer_size],
            buffer_index: 0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let bufout = self.buffer[self.buffer_index];
        let output = -input + bufout;

        self.buffer[self.buffer_index] = input + bufout * 0.5;
        self.buffer_index = (self.buffer_index + 1) % self.buffer.len();

        output
    }

    fn mute(&mut self) {
        self.buffer.fill(0.0);
        self.buffer_index = 0;
    }
}

/// Freeverb-style reverb effect
///
/// # Example
/// ```
/// use dream_flows::synth::reverb::{Reverb, ReverbParams};
///
/// let params = ReverbParams::new(0.85, 0.3, 0.5);
/// let mut reverb = Reverb::new(params, 48000.0);
/// let output = reverb.process(0.5);
/// ```
pub struct Reverb {
    mix: f32,
    comb_filters: Vec<CombFilter>,
    allpass_filters: Vec<AllpassFilter>,
    /// Output scaling for the summed combs
    gain: f32,
}

impl Reverb {
    // Freeverb tuning constants (delay lengths at 44.1kHz), chosen to
    // avoid shared resonances
    const COMB_TUNINGS: [usize; 4] = [1116, 1188, 1277, 1356];
    const ALLPASS_TUNINGS: [usize; 2] = [556, 441];

    // Freeverb scaling factors
    const SCALE_WET: f32 = 3.0;
    const SCALE_DAMPING: f32 = 0.4;
    const SCALE_ROOM: f32 = 0.28;
    const OFFSET_ROOM: f32 = 0.7;

    pub fn new(params: ReverbParams, sample_rate: f32) -> Self {
        // Tunings are for 44.1kHz; scale for the actual rate
        let scale = sample_rate / 44100.0;

        let feedback = params.room_size * Self::SCALE_ROOM + Self::OFFSET_ROOM;
        let damping = params.damping * Self::SCALE_DAMPING;

        let comb_filters = Self::COMB_TUNINGS
            .iter()
            .map(|&tuning| {
                let size = (tuning as f32 * scale) as usize;
                CombFilter::new(size, feedback, damping)
            })
            .collect();

        let allpass_filters = Self::ALLPASS_TUNINGS
            .iter()
            .map(|&tuning| {
                let size = (tuning as f32 * scale) as usize;
                AllpassFilter::new(size)
            })
            .collect();

        Self {
            mix: params.mix,
            comb_filters,
            allpass_filters,
            gain: Self::SCALE_WET * 0.25, // 4 parallel combs
        }
    }

    /// Clear all delayed samples
    pub fn reset(&mut self) {
        for comb in &mut self.comb_filters {
            comb.mute();
        }
        for allpass in &mut self.allpass_filters {
            allpass.mute();
        }
    }

    /// Process a single sample (dry + wet mix)
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let mut comb_out = 0.0;
        for comb in &mut self.comb_filters {
            comb_out += comb.process(input);
        }

        let mut output = comb_out * self.gain;
        for allpass in &mut self.allpass_filters {
            output = allpass.process(output);
        }

        input * (1.0 - self.mix) + output * self.mix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48000.0;

    #[test]
    fn test_reverb_params_clamping() {
        let params = ReverbParams::new(1.5, -0.5, 2.0);

        assert_eq!(params.room_size, 1.0);
        assert_eq!(params.damping, 0.0);
        assert_eq!(params.mix, 1.0);
    }

    #[test]
    fn test_dry_signal_passes() {
        let params = ReverbParams::new(0.5, 0.5, 0.0);
        let mut reverb = Reverb::new(params, SAMPLE_RATE);

        let output = reverb.process(1.0);
        assert_eq!(output, 1.0);
    }

    #[test]
    fn test_reverb_produces_tail() {
        let params = ReverbParams::new(0.6, 0.5, 1.0);
        let mut reverb = Reverb::new(params, SAMPLE_RATE);

        reverb.process(1.0);

        // Feed silence and look for the tail
        let mut max_output = 0.0_f32;
        for _ in 0..5000 {
            let output = reverb.process(0.0).abs();
            max_output = max_output.max(output);
        }

        assert!(
            max_output > 0.01,
            "Reverb should produce an audible tail (max: {})",
            max_output
        );
    }

    #[test]
    fn test_larger_room_decays_longer() {
        let mut reverb_small = Reverb::new(ReverbParams::new(0.2, 0.5, 1.0), SAMPLE_RATE);
        let mut reverb_large = Reverb::new(ReverbParams::new(0.9, 0.5, 1.0), SAMPLE_RATE);

        reverb_small.process(1.0);
        reverb_large.process(1.0);

        let mut small_energy = 0.0_f32;
        let mut large_energy = 0.0_f32;
        for _ in 0..5000 {
            small_energy += reverb_small.process(0.0).abs();
            large_energy += reverb_large.process(0.0).abs();
        }

        assert!(
            large_energy > small_energy,
            "Larger room should carry more tail energy"
        );
    }

    #[test]
    fn test_reverb_reset() {
        let params = ReverbParams::new(0.85, 0.3, 0.5);
        let mut reverb = Reverb::new(params, SAMPLE_RATE);

        for _ in 0..1000 {
            reverb.process(0.5);
        }

        reverb.reset();

        let output = reverb.process(0.0);
        assert!(
            output.abs() < 0.01,
            "After reset, silence in should be silence out"
        );
    }

    #[test]
    fn test_reverb_stability() {
        // Large room, low damping: the most resonant configuration
        let params = ReverbParams::new(0.9, 0.1, 0.5);
        let mut reverb = Reverb::new(params, SAMPLE_RATE);

        for i in 0..20000 {
            let input = if i == 0 { 1.0 } else { 0.0 };
            let output = reverb.process(input);

            assert!(output.is_finite(), "Sample {} is not finite: {}", i, output);
        }
    }
}
