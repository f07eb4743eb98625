// Voice manager - fixed polyphony with stealing

use crate::audio::dsp::db_to_amplitude;

use super::voice::{Voice, VoiceTimbre};

const VOICES_PER_BANK: usize = 8;

pub struct VoiceManager {
    voices: [Voice; VOICES_PER_BANK],
    /// Age counter incremented on each note_on for stealing priority
    age_counter: u64,
    /// Linear bank gain, from the timbre's gain_db
    gain: f32,
}

impl VoiceManager {
    pub fn new(timbre: VoiceTimbre, sample_rate: f32) -> Self {
        // Pre-allocate all voices
        let voices = std::array::from_fn(|_| Voice::new(timbre, sample_rate));

        Self {
            voices,
            age_counter: 0,
            gain: db_to_amplitude(timbre.gain_db),
        }
    }

    pub fn note_on(&mut self, note: u8, velocity: u8) {
        self.age_counter = self.age_counter.wrapping_add(1);

        if let Some(voice) = self.voices.iter_mut().find(|v| !v.is_active()) {
            voice.note_on(note, velocity, self.age_counter);
            return;
        }

        let victim = self.find_voice_to_steal();
        self.voices[victim].note_on(note, velocity, self.age_counter);
    }

    /// Pick the voice to steal: a releasing voice first (already fading,
    /// least perceptible), the oldest voice otherwise.
    fn find_voice_to_steal(&self) -> usize {
        let mut best_index = 0;
        let mut best_key = (false, u64::MAX);

        for (i, voice) in self.voices.iter().enumerate() {
            let key = (voice.is_releasing(), voice.age());
            let better = if key.0 != best_key.0 {
                key.0
            } else {
                key.1 < best_key.1
            };

            if better {
                best_key = key;
                best_index = i;
            }
        }

        best_index
    }

    /// Release every voice currently playing `note`
    pub fn note_off(&mut self, note: u8) {
        for voice in &mut self.voices {
            if voice.is_active() && voice.note() == note {
                voice.note_off();
            }
        }
    }

    /// Release everything at once
    pub fn release_all(&mut self) {
        for voice in &mut self.voices {
            if voice.is_active() {
                voice.note_off();
            }
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        // Mix all voices, then apply the bank gain
        self.voices.iter_mut().map(|v| v.next_sample()).sum::<f32>() * self.gain
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }
}
