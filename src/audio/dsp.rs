// DSP hygiene - smoothing, gain conversion, output safety
//
// Shared by the synth modules and the realtime callback.

/// Flush denormals to zero
///
/// Values this close to zero can put some CPUs on a slow FPU path. The
/// feedback structures (delay, reverb, smoothers) decay into that range,
/// so their state is flushed every sample.
///
/// Threshold: 1e-15, well below audible noise at 32-bit float.
#[inline]
pub fn flush_denormals_to_zero(x: f32) -> f32 {
    if x.abs() < 1e-15 { 0.0 } else { x }
}

/// Soft clipping with tanh
///
/// Keeps the final output inside [-1, 1] with a gradual saturation curve
/// instead of a hard edge. Near zero it is almost linear, so quiet
/// material passes uncolored.
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    x.tanh()
}

/// Decibels to linear amplitude (0 dB = 1.0)
#[inline]
pub fn db_to_amplitude(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// 1-pole smoother (first-order lowpass on a control value)
///
/// Ramps parameter changes over a time constant so a step in the target
/// never reaches the audio as a click.
///
/// Formula: y[n] = y[n-1] + α * (x[n] - y[n-1])
pub struct OnePoleSmoother {
    current: f32,
    coefficient: f32,
}

impl OnePoleSmoother {
    /// Create a new smoother
    ///
    /// # Arguments
    /// * `initial_value` - Starting value
    /// * `time_constant_ms` - Time to cover ~63% of a step (milliseconds)
    /// * `sample_rate` - Sample rate in Hz
    pub fn new(initial_value: f32, time_constant_ms: f32, sample_rate: f32) -> Self {
        // α ≈ 1 / (τ * sr) for the time constants used here
        let time_constant_samples = time_constant_ms * 0.001 * sample_rate;
        let coefficient = 1.0 / time_constant_samples;

        Self {
            current: initial_value,
            coefficient: coefficient.min(1.0),
        }
    }

    /// Advance one sample toward `target` and return the smoothed value
    #[inline]
    pub fn process(&mut self, target: f32) -> f32 {
        self.current += self.coefficient * (target - self.current);
        self.current = flush_denormals_to_zero(self.current);
        self.current
    }

    /// Jump to a value with no ramp
    #[inline]
    pub fn reset(&mut self, value: f32) {
        self.current = value;
    }

    /// Current value without advancing
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_denormals() {
        assert_eq!(flush_denormals_to_zero(1e-20), 0.0);
        assert_eq!(flush_denormals_to_zero(0.1), 0.1);
        assert_eq!(flush_denormals_to_zero(-0.1), -0.1);
    }

    #[test]
    fn test_soft_clip() {
        assert!((soft_clip(0.0) - 0.0).abs() < 0.001);
        assert!((soft_clip(0.5) - 0.462).abs() < 0.01);

        // tanh converges toward ±1.0 asymptotically
        assert!(soft_clip(10.0) <= 1.0);
        assert!(soft_clip(10.0) > 0.99);
        assert!(soft_clip(-10.0) >= -1.0);
        assert!(soft_clip(-10.0) < -0.99);
    }

    #[test]
    fn test_db_to_amplitude() {
        assert!((db_to_amplitude(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_amplitude(-6.0) - 0.501).abs() < 0.001);
        assert!((db_to_amplitude(-12.0) - 0.251).abs() < 0.001);
        assert!((db_to_amplitude(-40.0) - 0.01).abs() < 0.0005);
    }

    #[test]
    fn test_smoother_time_constant() {
        // 100ms time constant at 48kHz = 4800 samples to ~63% of a step
        let mut smoother = OnePoleSmoother::new(0.0, 100.0, 48000.0);

        let mut value = 0.0;
        for _ in 0..4800 {
            value = smoother.process(1.0);
        }

        assert!((value - 0.632).abs() < 0.02, "Value after 1τ: {}", value);
    }

    #[test]
    fn test_smoother_convergence() {
        let mut smoother = OnePoleSmoother::new(0.0, 10.0, 44100.0);

        // 100ms is 10 time constants, enough for full convergence
        let mut final_value = 0.0;
        for _ in 0..4410 {
            final_value = smoother.process(1.0);
        }

        assert!((final_value - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_smoother_no_overshoot() {
        let mut smoother = OnePoleSmoother::new(0.0, 5.0, 44100.0);

        for _ in 0..100 {
            let value = smoother.process(1.0);
            assert!(value <= 1.0);
            assert!(value >= 0.0);
        }
    }

    #[test]
    fn test_smoother_reset_jumps() {
        let mut smoother = OnePoleSmoother::new(0.0, 10.0, 44100.0);
        smoother.process(1.0);

        smoother.reset(0.25);
        assert_eq!(smoother.get(), 0.25);
    }
}
