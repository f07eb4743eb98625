// Application shell - Terminal-styled countdown over the ambient engine

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use eframe::egui;

use crate::audio::engine::AudioEngine;
use crate::composer::rng::XorShiftRng;
use crate::messaging::channels::NotificationConsumer;
use crate::messaging::notification::{Notification, NotificationCategory, NotificationLevel};
use crate::session::countdown::{CountdownTimer, SecondTicker, TickOutcome};
use crate::session::gesture::{GestureInterpreter, GestureOutcome};
use crate::session::glitch::GlitchFrame;
use crate::ui::{display, visualizer};

/// Accent for the readout and scanlines
const ACCENT: egui::Color32 = egui::Color32::from_rgb(0xCC, 0xFF, 0x00);
/// Near-black backdrop
const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(10, 10, 10);
/// Dimmed chrome for idle labels
const DIM: egui::Color32 = egui::Color32::from_rgb(0x6A, 0x75, 0x2A);

/// How long corrupted digits linger after a drag release
const GLITCH_SETTLE: Duration = Duration::from_millis(200);

/// Status-bar notifications fade out after this long
const NOTIFICATION_VISIBLE_MS: u64 = 5000;
/// Notifications kept in the queue
const NOTIFICATION_QUEUE_MAX: usize = 10;
/// Notifications shown at once in the status bar
const NOTIFICATION_SHOW_MAX: usize = 3;

pub struct DreamFlowsApp {
    engine: AudioEngine,
    notification_rx: NotificationConsumer,
    notification_queue: VecDeque<Notification>,
    timer: CountdownTimer,
    ticker: SecondTicker,
    gesture: GestureInterpreter,
    /// Corrupted digits shown until the deadline passes
    glitch: Option<(GlitchFrame, Instant)>,
    completed: bool,
    settings_open: bool,
    /// UI mirror of the master volume atomic
    volume_db_ui: f32,
    /// Readout rect from the previous frame, the press target
    display_rect: Option<egui::Rect>,
    window_title: String,
    rng: XorShiftRng,
}

impl DreamFlowsApp {
    pub fn new(engine: AudioEngine, notification_rx: NotificationConsumer) -> Self {
        let volume_db_ui = engine.volume_db();
        Self {
            engine,
            notification_rx,
            notification_queue: VecDeque::new(),
            timer: CountdownTimer::new(),
            ticker: SecondTicker::new(),
            gesture: GestureInterpreter::new(),
            glitch: None,
            completed: false,
            settings_open: false,
            volume_db_ui,
            display_rect: None,
            window_title: String::new(),
            rng: XorShiftRng::from_clock(),
        }
    }

    /// Drain engine notifications into the UI queue
    fn update_notifications(&mut self) {
        while let Some(notification) =
            ringbuf::traits::Consumer::try_pop(&mut self.notification_rx)
        {
            self.notification_queue.push_back(notification);
            while self.notification_queue.len() > NOTIFICATION_QUEUE_MAX {
                self.notification_queue.pop_front();
            }
        }
    }

    /// Advance the countdown by however many seconds have elapsed
    fn process_ticks(&mut self, now: Instant) {
        let ticks = self.ticker.poll(now);
        for _ in 0..ticks {
            match self.timer.tick() {
                TickOutcome::Completed => {
                    self.completed = true;
                    self.engine.stop();
                    self.ticker.cancel();
                    break;
                }
                TickOutcome::Ticked | TickOutcome::Idle => {}
            }
        }
    }

    fn start_session(&mut self, now: Instant) {
        // The countdown only runs once the audio engine is actually up.
        match self.engine.start() {
            Ok(()) => {
                self.timer.start();
                self.ticker.start(now);
            }
            Err(err) => {
                eprintln!("Audio start failed: {}", err);
                self.notification_queue.push_back(Notification::error(
                    NotificationCategory::Audio,
                    format!("Audio start failed: {}", err),
                ));
            }
        }
    }

    fn stop_session(&mut self) {
        self.engine.stop();
        self.timer.stop();
        self.ticker.cancel();
    }

    fn toggle_session(&mut self, now: Instant) {
        self.completed = false;
        if self.timer.is_running() {
            self.stop_session();
        } else {
            self.start_session(now);
        }
    }

    /// Route raw pointer traffic into the gesture interpreter
    /// Presses must land on the readout; moves and releases are tracked
    /// window-wide so a drag can wander anywhere.
    fn handle_pointer(&mut self, ctx: &egui::Context, now: Instant) {
        let (pressed, released, latest_pos, press_origin) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.latest_pos(),
                i.pointer.press_origin(),
            )
        });

        if pressed {
            if let (Some(origin), Some(rect)) = (press_origin, self.display_rect) {
                if rect.contains(origin) {
                    self.completed = false;
                    self.gesture.pointer_down(
                        origin.y,
                        self.timer.minutes(),
                        self.timer.is_running(),
                    );
                }
            }
        }

        if self.gesture.is_active() {
            if let Some(pos) = latest_pos {
                if let Some(minutes) = self.gesture.pointer_move(pos.y) {
                    self.timer.set_duration(minutes);
                }
            }
        }

        if released {
            match self.gesture.pointer_up() {
                GestureOutcome::Tap => self.toggle_session(now),
                GestureOutcome::Drag => {
                    let frame = GlitchFrame::generate(self.timer.minutes(), &mut self.rng);
                    self.glitch = Some((frame, now + GLITCH_SETTLE));
                }
                GestureOutcome::None => {}
            }
        }
    }

    /// Text shown on the big readout, corrupted while a glitch settles
    fn readout_text(&self) -> String {
        if let Some((frame, _)) = &self.glitch {
            return frame.text();
        }
        display::format_time(self.timer.minutes(), self.timer.seconds())
    }

    fn status_text(&self) -> &'static str {
        if self.completed {
            "SESSION_COMPLETE"
        } else if self.timer.is_running() {
            "SYSTEM_ACTIVE"
        } else {
            "SYSTEM_IDLE"
        }
    }

    fn action_label(&self) -> &'static str {
        if self.completed {
            "RESET_SEQUENCE"
        } else if self.timer.is_running() {
            "ABORT_SEQUENCE"
        } else {
            "INIT_SEQUENCE"
        }
    }

    fn terminal_button(&self, label: &str) -> egui::Button<'static> {
        egui::Button::new(
            egui::RichText::new(label.to_string())
                .monospace()
                .size(14.0)
                .color(ACCENT),
        )
        .fill(BACKGROUND)
        .stroke(egui::Stroke::new(1.0, DIM))
    }

    fn draw_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let recent: Vec<&Notification> = self
                .notification_queue
                .iter()
                .rev()
                .filter(|n| n.is_recent(NOTIFICATION_VISIBLE_MS))
                .take(NOTIFICATION_SHOW_MAX)
                .collect();

            if recent.is_empty() {
                ui.colored_label(DIM, egui::RichText::new("READY").monospace().size(11.0));
                return;
            }

            for notification in recent {
                let (tag, color) = match notification.level {
                    NotificationLevel::Info => ("INFO", egui::Color32::from_rgb(100, 150, 255)),
                    NotificationLevel::Warning => ("WARN", egui::Color32::from_rgb(255, 165, 0)),
                    NotificationLevel::Error => ("FAIL", egui::Color32::from_rgb(255, 80, 80)),
                };
                ui.colored_label(
                    color,
                    egui::RichText::new(format!("{} {}", tag, notification.message))
                        .monospace()
                        .size(11.0),
                );
                ui.add_space(10.0);
            }
        });
    }

    fn draw_settings_window(&mut self, ctx: &egui::Context) {
        let mut open = self.settings_open;
        egui::Window::new("CONFIG")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new("MASTER_VOLUME")
                        .monospace()
                        .size(12.0)
                        .color(DIM),
                );
                let slider = egui::Slider::new(&mut self.volume_db_ui, -40.0..=0.0).suffix(" dB");
                if ui.add(slider).changed() {
                    self.engine.set_volume_db(self.volume_db_ui);
                }
            });
        self.settings_open = open;
    }

    /// Push the title to the OS only when the readout changed
    fn update_window_title(&mut self, ctx: &egui::Context) {
        let time = display::format_time(self.timer.minutes(), self.timer.seconds());
        let title = display::title_text(&time);
        if title != self.window_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.window_title = title;
        }
    }
}

impl eframe::App for DreamFlowsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.update_notifications();
        self.process_ticks(now);

        if let Some((_, deadline)) = self.glitch {
            if now >= deadline {
                self.glitch = None;
            }
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            self.toggle_session(now);
        }
        self.handle_pointer(ctx, now);

        self.update_window_title(ctx);

        egui::TopBottomPanel::bottom("status_bar")
            .frame(egui::Frame::none().fill(BACKGROUND).inner_margin(6.0))
            .show(ctx, |ui| {
                self.draw_status_bar(ui);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(BACKGROUND))
            .show(ctx, |ui| {
                if self.timer.is_running() {
                    let lines = visualizer::generate_scanlines(ui.max_rect(), &mut self.rng);
                    visualizer::draw_scanlines(ui.painter(), &lines, ACCENT);
                }

                ui.vertical_centered(|ui| {
                    ui.add_space(80.0);
                    ui.label(
                        egui::RichText::new(self.status_text())
                            .monospace()
                            .size(13.0)
                            .color(DIM),
                    );

                    ui.add_space(30.0);
                    let text = self.readout_text();
                    let color = if self.timer.is_running() || self.completed {
                        ACCENT
                    } else {
                        DIM
                    };
                    let response = display::time_display(ui, &text, color);
                    self.display_rect = Some(response.rect);

                    ui.add_space(40.0);
                    if ui.add(self.terminal_button(self.action_label())).clicked() {
                        self.toggle_session(now);
                    }

                    ui.add_space(12.0);
                    if ui.add(self.terminal_button("CONFIG")).clicked() {
                        self.settings_open = !self.settings_open;
                    }

                    ui.add_space(30.0);
                    let audible =
                        self.engine.is_online() && (self.timer.is_running() || self.completed);
                    let (audio_text, audio_color) = if audible {
                        ("AUDIO_ONLINE", ACCENT)
                    } else {
                        ("AUDIO_OFFLINE", DIM)
                    };
                    ui.label(
                        egui::RichText::new(audio_text)
                            .monospace()
                            .size(11.0)
                            .color(audio_color),
                    );
                });
            });

        self.draw_settings_window(ctx);

        // A running session repaints every frame for the scanlines; idle
        // frames only wake up for a settling glitch or a fading status line.
        if self.timer.is_running() {
            ctx.request_repaint();
        } else {
            if let Some((_, deadline)) = self.glitch {
                ctx.request_repaint_after(deadline.saturating_duration_since(now));
            }
            if !self.notification_queue.is_empty() {
                ctx.request_repaint_after(Duration::from_millis(500));
            }
        }
    }
}
