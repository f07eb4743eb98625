use dream_flows::ui::app::DreamFlowsApp;
use dream_flows::{AudioEngine, create_command_channel, create_notification_channel};
use std::sync::{Arc, Mutex};

// Ringbuffer capacity constants
// The UI only ever sends Start/Stop, one per user action, and the audio
// callback drains the whole ring on every buffer. 64 slots absorb any
// click storm without dropping a toggle.
const COMMAND_RINGBUFFER_CAPACITY: usize = 64;
const NOTIFICATION_RINGBUFFER_CAPACITY: usize = 32;

fn main() {
    println!("=== DREAM.FLOWS ===");
    println!("Focus session terminal\n");

    let (command_tx, command_rx) = create_command_channel(COMMAND_RINGBUFFER_CAPACITY);

    // Create notification channel (for error handling)
    let (notification_tx, notification_rx) =
        create_notification_channel(NOTIFICATION_RINGBUFFER_CAPACITY);
    let notification_tx = Arc::new(Mutex::new(notification_tx));

    // The engine opens its output stream lazily, on the first session start
    let engine = AudioEngine::new(command_tx, command_rx, notification_tx);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 640.0])
            .with_title("DREAM.FLOWS"),
        ..Default::default()
    };

    let _ = eframe::run_native(
        "DREAM.FLOWS",
        native_options,
        Box::new(|_cc| Ok(Box::new(DreamFlowsApp::new(engine, notification_rx)))),
    );
}
