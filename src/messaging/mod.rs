// Module messaging - Lock-free communication between UI and audio threads

pub mod channels;
pub mod command;
pub mod notification;
