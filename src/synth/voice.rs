// Voice - one sounding note (oscillator + envelope)

use super::envelope::{AdsrEnvelope, AdsrParams};
use super::oscillator::{DetunedSineStack, Oscillator, SineOscillator};

/// Oscillator flavor for a bank
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OscillatorKind {
    Sine,
    DetunedSine { spread_cents: f32 },
}

/// Everything that gives a bank its sound
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceTimbre {
    pub oscillator: OscillatorKind,
    pub envelope: AdsrParams,
    /// Bank output gain in dB, applied to the mixed voices
    pub gain_db: f32,
}

impl VoiceTimbre {
    /// Slow detuned pad for the chord drone
    pub fn drone_pad() -> Self {
        Self {
            oscillator: OscillatorKind::DetunedSine { spread_cents: 30.0 },
            envelope: AdsrParams::new(2.0, 1.0, 1.0, 2.0),
            gain_db: -12.0,
        }
    }

    /// Short plucked sine for the melody loops
    pub fn melody_pluck() -> Self {
        Self {
            oscillator: OscillatorKind::Sine,
            envelope: AdsrParams::new(0.05, 0.1, 0.1, 1.0),
            gain_db: -12.0,
        }
    }
}

enum VoiceOscillator {
    Sine(SineOscillator),
    DetunedSine(DetunedSineStack),
}

impl VoiceOscillator {
    fn new(kind: OscillatorKind, sample_rate: f32) -> Self {
        match kind {
            OscillatorKind::Sine => Self::Sine(SineOscillator::new(sample_rate)),
            OscillatorKind::DetunedSine { spread_cents } => {
                Self::DetunedSine(DetunedSineStack::new(spread_cents, sample_rate))
            }
        }
    }

    fn next_sample(&mut self) -> f32 {
        match self {
            Self::Sine(osc) => osc.next_sample(),
            Self::DetunedSine(osc) => osc.next_sample(),
        }
    }

    fn set_frequency(&mut self, freq: f32) {
        match self {
            Self::Sine(osc) => osc.set_frequency(freq),
            Self::DetunedSine(osc) => osc.set_frequency(freq),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Sine(osc) => osc.reset(),
            Self::DetunedSine(osc) => osc.reset(),
        }
    }
}

pub struct Voice {
    oscillator: VoiceOscillator,
    envelope: AdsrEnvelope,
    note: u8,
    velocity: f32,
    active: bool,
    /// Age counter for voice stealing priority (higher = newer)
    age: u64,
}

impl Voice {
    pub fn new(timbre: VoiceTimbre, sample_rate: f32) -> Self {
        Self {
            oscillator: VoiceOscillator::new(timbre.oscillator, sample_rate),
            envelope: AdsrEnvelope::new(timbre.envelope, sample_rate),
            note: 0,
            velocity: 0.0,
            active: false,
            age: 0,
        }
    }

    pub fn note_on(&mut self, note: u8, velocity: u8, age: u64) {
        self.note = note;
        self.velocity = velocity as f32 / 127.0;
        self.active = true;
        self.age = age;

        // MIDI note to frequency: 440 * 2^((note - 69) / 12)
        let frequency = 440.0 * 2_f32.powf((note as f32 - 69.0) / 12.0);
        self.oscillator.set_frequency(frequency);
        self.oscillator.reset();

        self.envelope.note_on();
    }

    pub fn note_off(&mut self) {
        self.active = false;
        self.envelope.note_off();
    }

    pub fn is_active(&self) -> bool {
        // Active while the envelope runs, release tail included
        self.envelope.is_active()
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    /// Note off but still sounding out its release
    pub fn is_releasing(&self) -> bool {
        !self.active && self.envelope.is_active()
    }

    pub fn next_sample(&mut self) -> f32 {
        let envelope_value = self.envelope.process();
        self.oscillator.next_sample() * self.velocity * envelope_value
    }
}
