// Display - Session readout formatting and the window title

use eframe::egui;

/// Font size of the session readout
const TIME_FONT_SIZE: f32 = 72.0;

/// Format remaining time as zero-padded MM:SS
pub fn format_time(minutes: u32, seconds: u32) -> String {
    format!("{:02}:{:02}", minutes, seconds)
}

/// Window title carrying the remaining time
pub fn title_text(time: &str) -> String {
    format!("[{}] DREAM.FLOWS", time)
}

/// Draw the large monospace readout and return its response
/// The response rect is the press target for duration gestures.
pub fn time_display(ui: &mut egui::Ui, text: &str, color: egui::Color32) -> egui::Response {
    let rich = egui::RichText::new(text)
        .font(egui::FontId::monospace(TIME_FONT_SIZE))
        .color(color);
    ui.add(egui::Label::new(rich).sense(egui::Sense::click_and_drag()))
        .on_hover_cursor(egui::CursorIcon::ResizeVertical)
}
