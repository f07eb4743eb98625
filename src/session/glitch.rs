// Glitch - Corrupted display frame shown as drag confirmation
// Each minute digit may be swapped for a random hex character for ~200ms

use crate::composer::rng::RandomSource;

/// Character pool for corrupted digits
const GLITCH_CHARS: &[u8] = b"0123456789ABCDEF";

/// Probability that a given digit is corrupted
const CORRUPTION_CHANCE: f32 = 0.5;

/// One corrupted rendering of the minute digits
/// Generated once on drag release and displayed until the settle deadline;
/// seconds are pinned to "00" (a drag always resets them).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlitchFrame {
    chars: [char; 2],
}

impl GlitchFrame {
    /// Corrupt the leading two digits of the zero-padded minute value
    pub fn generate(minutes: u32, rng: &mut dyn RandomSource) -> Self {
        let padded = format!("{:02}", minutes);
        let mut digits = padded.chars();
        let mut chars = ['0'; 2];

        for slot in chars.iter_mut() {
            let digit = digits.next().unwrap_or('0');
            *slot = if rng.chance(CORRUPTION_CHANCE) {
                GLITCH_CHARS[rng.pick(GLITCH_CHARS.len())] as char
            } else {
                digit
            };
        }

        Self { chars }
    }

    /// The two display characters
    pub fn chars(&self) -> [char; 2] {
        self.chars
    }

    /// Full display text, e.g. "2F:00"
    pub fn text(&self) -> String {
        format!("{}{}:00", self.chars[0], self.chars[1])
    }
}
