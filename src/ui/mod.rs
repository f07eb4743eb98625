// Module ui - Terminal-styled shell over the session state machines

pub mod app;
pub mod display;
pub mod visualizer;
