// Clock - Musical time over the output stream's sample counter
// Converts beats and measures to sample counts at a fixed tempo

use std::fmt;

/// Time signature (numerator/denominator)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
}

impl TimeSignature {
    /// Creates a new time signature
    pub fn new(numerator: u8, denominator: u8) -> Self {
        assert!(numerator > 0, "Time signature numerator must be > 0");
        assert!(
            denominator.is_power_of_two(),
            "Time signature denominator must be power of 2"
        );
        Self {
            numerator,
            denominator,
        }
    }

    /// Common 4/4 time signature
    pub fn four_four() -> Self {
        Self::new(4, 4)
    }

    /// Number of beats per measure
    pub fn beats_per_measure(&self) -> f64 {
        self.numerator as f64
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::four_four()
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Tempo in BPM (Beats Per Minute)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tempo {
    bpm: f64,
}

impl Tempo {
    /// Creates a new tempo
    /// BPM must be in range [20.0, 999.0]
    pub fn new(bpm: f64) -> Self {
        assert!(
            (20.0..=999.0).contains(&bpm),
            "BPM must be between 20 and 999"
        );
        Self { bpm }
    }

    /// Get BPM value
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Duration of one beat in seconds
    pub fn beat_duration_seconds(&self) -> f64 {
        60.0 / self.bpm
    }

    /// Duration of one beat in samples at given sample rate
    pub fn beat_duration_samples(&self, sample_rate: f64) -> f64 {
        self.beat_duration_seconds() * sample_rate
    }

    /// Duration of one measure in samples at given sample rate and signature
    pub fn measure_duration_samples(
        &self,
        sample_rate: f64,
        time_signature: &TimeSignature,
    ) -> f64 {
        self.beat_duration_samples(sample_rate) * time_signature.beats_per_measure()
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::new(120.0)
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} BPM", self.bpm)
    }
}

/// Transport - playback state and playhead position
/// Owned by the audio side; the position is the running sample count since the
/// clock was armed. Stopping resets the position so every session starts the
/// loop pattern from clock-time zero.
#[derive(Debug, Clone)]
pub struct Transport {
    playing: bool,
    position_samples: u64,
    tempo: Tempo,
    time_signature: TimeSignature,
    sample_rate: f64,
}

impl Transport {
    /// Create a stopped transport at position zero
    pub fn new(sample_rate: f64) -> Self {
        Self {
            playing: false,
            position_samples: 0,
            tempo: Tempo::default(),
            time_signature: TimeSignature::default(),
            sample_rate,
        }
    }

    /// Start the clock from position zero. Idempotent while playing.
    pub fn play(&mut self) {
        if !self.playing {
            self.position_samples = 0;
            self.playing = true;
        }
    }

    /// Stop the clock and reset the position. Idempotent while stopped.
    pub fn stop(&mut self) {
        self.playing = false;
        self.position_samples = 0;
    }

    /// Check if the clock is running
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Current position in samples
    pub fn position_samples(&self) -> u64 {
        self.position_samples
    }

    /// Advance the playhead; returns the new position
    pub fn advance(&mut self, delta_samples: u64) -> u64 {
        self.position_samples += delta_samples;
        self.position_samples
    }

    /// Get tempo
    pub fn tempo(&self) -> &Tempo {
        &self.tempo
    }

    /// Get time signature
    pub fn time_signature(&self) -> &TimeSignature {
        &self.time_signature
    }

    /// Get sample rate
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Convert a span of beats to whole samples at the current tempo
    pub fn beats_to_samples(&self, beats: f64) -> u64 {
        (beats * self.tempo.beat_duration_samples(self.sample_rate)).round() as u64
    }

    /// Convert a span of measures to whole samples
    pub fn measures_to_samples(&self, measures: f64) -> u64 {
        (measures
            * self
                .tempo
                .measure_duration_samples(self.sample_rate, &self.time_signature))
        .round() as u64
    }
}
