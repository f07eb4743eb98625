// ADSR envelope - linear attack, decay, sustain, release
//
// Shapes each voice's amplitude over time. Retriggering a sounding voice
// restarts the attack from its current level so stolen voices do not click.

/// ADSR parameters (times in seconds, sustain is a level)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrParams {
    /// Attack time in seconds (0.001 to 5.0)
    pub attack: f32,
    /// Decay time in seconds (0.001 to 5.0)
    pub decay: f32,
    /// Sustain level (0.0 to 1.0)
    pub sustain: f32,
    /// Release time in seconds (0.001 to 5.0)
    pub release: f32,
}

impl AdsrParams {
    /// Create ADSR parameters with clamping
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack: attack.clamp(0.001, 5.0),
            decay: decay.clamp(0.001, 5.0),
            sustain: sustain.clamp(0.0, 1.0),
            release: release.clamp(0.001, 5.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnvelopeState {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// ADSR envelope generator
///
/// Returns a value in [0, 1] per sample, multiplied into the voice output.
/// The parameter clamps keep every timed segment at least one sample long,
/// so the per-segment divisions are always defined.
pub struct AdsrEnvelope {
    params: AdsrParams,
    state: EnvelopeState,
    current_value: f32,

    // Segment lengths in samples
    attack_samples: f32,
    decay_samples: f32,
    release_samples: f32,
    current_sample: f32,
    /// Level at the moment the current attack or release began
    segment_start: f32,
}

impl AdsrEnvelope {
    pub fn new(params: AdsrParams, sample_rate: f32) -> Self {
        Self {
            params,
            state: EnvelopeState::Idle,
            current_value: 0.0,
            attack_samples: params.attack * sample_rate,
            decay_samples: params.decay * sample_rate,
            release_samples: params.release * sample_rate,
            current_sample: 0.0,
            segment_start: 0.0,
        }
    }

    /// Start the attack phase, ramping up from the current level
    pub fn note_on(&mut self) {
        self.segment_start = self.current_value;
        self.state = EnvelopeState::Attack;
        self.current_sample = 0.0;
    }

    /// Start the release phase, ramping down from the current level
    pub fn note_off(&mut self) {
        if !matches!(self.state, EnvelopeState::Idle) {
            self.segment_start = self.current_value;
            self.state = EnvelopeState::Release;
            self.current_sample = 0.0;
        }
    }

    /// Process one sample and return the envelope value
    pub fn process(&mut self) -> f32 {
        match self.state {
            EnvelopeState::Idle => {
                self.current_value = 0.0;
            }

            EnvelopeState::Attack => {
                let progress = (self.current_sample / self.attack_samples).min(1.0);
                self.current_value = self.segment_start + progress * (1.0 - self.segment_start);

                self.current_sample += 1.0;

                if self.current_sample >= self.attack_samples {
                    self.state = EnvelopeState::Decay;
                    self.current_sample = 0.0;
                    self.current_value = 1.0;
                }
            }

            EnvelopeState::Decay => {
                let progress = self.current_sample / self.decay_samples;
                self.current_value =
                    (1.0 - progress * (1.0 - self.params.sustain)).max(self.params.sustain);

                self.current_sample += 1.0;

                if self.current_sample >= self.decay_samples {
                    self.state = EnvelopeState::Sustain;
                    self.current_value = self.params.sustain;
                }
            }

            EnvelopeState::Sustain => {
                self.current_value = self.params.sustain;
            }

            EnvelopeState::Release => {
                let progress = self.current_sample / self.release_samples;
                self.current_value = (self.segment_start * (1.0 - progress)).max(0.0);

                self.current_sample += 1.0;

                if self.current_sample >= self.release_samples {
                    self.state = EnvelopeState::Idle;
                    self.current_value = 0.0;
                }
            }
        }

        self.current_value
    }

    /// Whether the envelope is producing output (any phase except idle)
    pub fn is_active(&self) -> bool {
        !matches!(self.state, EnvelopeState::Idle)
    }

    /// Current envelope value without advancing
    pub fn current_value(&self) -> f32 {
        self.current_value
    }
}
