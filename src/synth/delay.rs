// Delay - digital delay line with feedback
//
// Circular-buffer delay. The buffer is pre-allocated for the configured
// time at creation; processing is allocation-free.

/// Delay settings, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayParams {
    /// Delay time in milliseconds
    pub time_ms: f32,
    /// Feedback amount (0.0 to 0.99)
    pub feedback: f32,
    /// Dry/Wet mix (0.0 = fully dry, 1.0 = fully wet)
    pub mix: f32,
}

impl DelayParams {
    /// Create delay parameters with clamping
    pub fn new(time_ms: f32, feedback: f32, mix: f32) -> Self {
        Self {
            time_ms: time_ms.max(0.0),
            // Max 0.99 to avoid runaway feedback
            feedback: feedback.clamp(0.0, 0.99),
            mix: mix.clamp(0.0, 1.0),
        }
    }
}

/// Delay effect over a circular buffer
///
/// # Example
/// ```
/// use dream_flows::synth::delay::{Delay, DelayParams};
///
/// let params = DelayParams::new(250.0, 0.3, 0.2);
/// let mut delay = Delay::new(params, 48000.0);
/// let output = delay.process(0.5);
/// ```
pub struct Delay {
    buffer: Vec<f32>,
    /// Write position (where new samples land)
    write_pos: usize,
    /// Delay length in samples
    delay_samples: usize,
    feedback: f32,
    mix: f32,
}

impl Delay {
    pub fn new(params: DelayParams, sample_rate: f32) -> Self {
        let delay_samples = ((params.time_ms / 1000.0) * sample_rate) as usize;

        // One extra slot so the read position never collides with the write
        let buffer = vec![0.0; delay_samples + 1];

        Self {
            buffer,
            write_pos: 0,
            delay_samples,
            feedback: params.feedback,
            mix: params.mix,
        }
    }

    /// Clear all delayed samples
    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Process a single sample (dry + wet mix)
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        // Read position trails the write position by the delay length
        let read_pos = if self.write_pos >= self.delay_samples {
            self.write_pos - self.delay_samples
        } else {
            self.buffer.len() + self.write_pos - self.delay_samples
        };

        let delayed = self.buffer[read_pos];

        // Write input plus feedback into the line, clamped so feedback
        // can never run away
        let buffer_input = (input + self.feedback * delayed).clamp(-2.0, 2.0);
        self.buffer[self.write_pos] = buffer_input;

        self.write_pos = (self.write_pos + 1) % self.buffer.len();

        input * (1.0 - self.mix) + delayed * self.mix
    }
}
