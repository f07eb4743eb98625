// Random source - Injectable randomness for the melody loops and glitch frames
// Production seeds from the clock; tests pin a seed and replay exact sequences

use std::time::{SystemTime, UNIX_EPOCH};

/// Fallback seed when the system clock is unusable or yields zero
const FALLBACK_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Source of uniform randomness
/// Everything that rolls dice takes one of these, so a seeded generator makes
/// loop output and glitch frames fully reproducible in tests.
pub trait RandomSource: Send {
    /// Uniform value in [0, 1]
    fn next_unit(&mut self) -> f32;

    /// Uniform index in [0, len); `len` must be non-zero
    fn pick(&mut self, len: usize) -> usize {
        ((self.next_unit() * len as f32) as usize).min(len.saturating_sub(1))
    }

    /// Bernoulli draw with the given probability of `true`
    fn chance(&mut self, probability: f32) -> bool {
        self.next_unit() < probability
    }
}

/// xorshift64 generator
/// Small, allocation-free and fast enough to call from the audio callback.
#[derive(Debug, Clone)]
pub struct XorShiftRng {
    state: u64,
}

impl XorShiftRng {
    /// Create a generator from an explicit seed (zero is remapped, the
    /// xorshift state must never be zero)
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { FALLBACK_SEED } else { seed },
        }
    }

    /// Create a generator seeded from the wall clock
    pub fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(FALLBACK_SEED);
        Self::new(seed)
    }
}

impl RandomSource for XorShiftRng {
    fn next_unit(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x as f32) / (u64::MAX as f32)
    }
}
