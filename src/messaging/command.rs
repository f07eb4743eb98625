// Command types - UI to audio thread traffic

/// Everything the UI may ask of the audio callback
/// Master volume travels separately through the shared atomic parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Arm the loops and start the clock from zero
    Start,
    /// Stop the clock and release every sounding voice
    Stop,
}
