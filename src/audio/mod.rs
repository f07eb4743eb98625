// Module audio - CPAL device engine, realtime callback and DSP helpers

pub mod dsp;
pub mod engine;
pub mod parameters;
