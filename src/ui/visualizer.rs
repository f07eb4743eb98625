// Visualizer - Scanline flicker behind a running session

use eframe::egui;

use crate::composer::rng::RandomSource;

/// Draw chances rolled per frame
const LINE_CHANCES: usize = 3;
/// Probability that a single chance produces a line
const LINE_PROBABILITY: f32 = 0.1;
/// Longest segment in pixels
const MAX_LINE_WIDTH: f32 = 100.0;
/// Alpha of the drawn segments
const LINE_ALPHA: u8 = 40;

/// One horizontal segment in window coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scanline {
    pub x: f32,
    pub y: f32,
    pub width: f32,
}

/// Roll this frame's scanlines inside `rect`
/// Callers only roll while a session is running; idle frames stay clean.
pub fn generate_scanlines(rect: egui::Rect, rng: &mut dyn RandomSource) -> Vec<Scanline> {
    let mut lines = Vec::new();
    for _ in 0..LINE_CHANCES {
        if !rng.chance(LINE_PROBABILITY) {
            continue;
        }
        let width = rng.next_unit() * MAX_LINE_WIDTH;
        let x = rect.left() + rng.next_unit() * (rect.width() - width).max(0.0);
        let y = rect.top() + rng.next_unit() * rect.height();
        lines.push(Scanline { x, y, width });
    }
    lines
}

/// Paint the rolled segments as faded 1 px accent lines
pub fn draw_scanlines(painter: &egui::Painter, lines: &[Scanline], accent: egui::Color32) {
    let color =
        egui::Color32::from_rgba_unmultiplied(accent.r(), accent.g(), accent.b(), LINE_ALPHA);
    for line in lines {
        painter.line_segment(
            [
                egui::pos2(line.x, line.y),
                egui::pos2(line.x + line.width, line.y),
            ],
            egui::Stroke::new(1.0, color),
        );
    }
}
