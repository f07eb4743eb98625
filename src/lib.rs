// DREAM.FLOWS - Library exports for tests and benchmarks

pub mod audio;
pub mod composer;
pub mod messaging;
pub mod session;
pub mod synth;
pub mod ui;

// Re-export commonly used types for convenience
pub use audio::engine::AudioEngine;
pub use audio::parameters::AtomicF32;
pub use composer::AmbientComposer;
pub use composer::clock::{Tempo, TimeSignature, Transport};
pub use messaging::channels::{create_command_channel, create_notification_channel};
pub use messaging::command::Command;
pub use session::countdown::{CountdownTimer, SecondTicker, TickOutcome};
pub use session::gesture::{GestureInterpreter, GestureOutcome};
pub use session::glitch::GlitchFrame;
pub use synth::voice_manager::VoiceManager;
