// Chords - Pitch names, harmonic material and the drone chord cycle
// "C3"-style names become MIDI numbers; the cycle advances one chord per firing

/// The four pad chords, voiced bass-up, cycled by the drone loop
/// Cmaj7, Am7, Fmaj7, G7 — a plain I-vi-IV-V7 with sevenths.
pub const DRONE_CHORDS: [[&str; 4]; 4] = [
    ["C3", "E3", "G3", "B3"],
    ["A2", "C3", "E3", "G3"],
    ["F2", "A2", "C3", "E3"],
    ["G2", "B2", "D3", "F3"],
];

/// Six-note scale the melody loops draw from
pub const MELODY_SCALE: [&str; 6] = ["C4", "Eb4", "F4", "G4", "Bb4", "C5"];

/// Parse a pitch name ("C3", "Eb4", "F#2") into a MIDI note number
/// Scientific pitch notation: C4 = 60, A4 = 69. Returns None for names that
/// are malformed or fall outside the MIDI range.
pub fn parse_pitch(name: &str) -> Option<u8> {
    let mut chars = name.chars();

    let letter = chars.next()?;
    let class = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let rest = chars.as_str();
    let (accidental, octave_text) = match rest.chars().next() {
        Some('#') => (1, &rest[1..]),
        Some('b') => (-1, &rest[1..]),
        _ => (0, rest),
    };

    let octave: i32 = octave_text.parse().ok()?;

    // MIDI note 0 is C-1
    let midi = (octave + 1) * 12 + class + accidental;
    u8::try_from(midi).ok().filter(|&n| n <= 127)
}

/// Convert a MIDI note number to frequency in Hz: 440 * 2^((note - 69) / 12)
pub fn midi_to_frequency(note: u8) -> f32 {
    440.0 * 2_f32.powf((note as f32 - 69.0) / 12.0)
}

/// Ordered chord sequence with a wrapping cursor
/// The sequence is fixed at construction; `next_chord` hands out one chord per
/// drone firing and advances by exactly one position.
#[derive(Debug, Clone)]
pub struct ChordCycle {
    chords: Vec<Vec<u8>>,
    cursor: usize,
}

impl ChordCycle {
    /// Build a cycle from pitch-name chords, dropping malformed names
    /// (the built-in tables are locked by tests, so nothing is dropped in
    /// practice)
    pub fn new(chords: &[[&str; 4]]) -> Self {
        let chords = chords
            .iter()
            .map(|chord| chord.iter().filter_map(|name| parse_pitch(name)).collect())
            .collect();

        Self { chords, cursor: 0 }
    }

    /// The drone loop's pad cycle
    pub fn pads() -> Self {
        Self::new(&DRONE_CHORDS)
    }

    /// Current chord, advancing the cursor (wraps past the end)
    pub fn next_chord(&mut self) -> &[u8] {
        if self.chords.is_empty() {
            return &[];
        }
        let index = self.cursor;
        self.cursor = (self.cursor + 1) % self.chords.len();
        &self.chords[index]
    }

    /// Number of chords in the cycle
    pub fn len(&self) -> usize {
        self.chords.len()
    }

    /// Check if the cycle holds no chords
    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    /// Rewind the cursor to the first chord
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

/// The melody scale parsed to MIDI numbers
pub fn melody_scale_notes() -> Vec<u8> {
    MELODY_SCALE
        .iter()
        .filter_map(|name| parse_pitch(name))
        .collect()
}
