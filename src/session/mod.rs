// Module session - Countdown timer, gesture classification, display effects

pub mod countdown;
pub mod gesture;
pub mod glitch;
