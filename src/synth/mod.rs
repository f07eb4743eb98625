// Module synth - oscillators, envelopes, voices and effects

pub mod delay;
pub mod envelope;
pub mod filter;
pub mod oscillator;
pub mod reverb;
pub mod voice;
pub mod voice_manager;
