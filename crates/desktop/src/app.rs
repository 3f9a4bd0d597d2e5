//! SakhiChat Desktop — egui app state and UI.

use eframe::egui;
use sakhi::widget::{ChatController, Message, ResolvedReply, Role, Submission, TranscriptBuffer};
use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::{Mutex, OnceLock};

const CHAT_MESSAGES_MIN_HEIGHT: f32 = 80.0;
const SEND_BUTTON_WIDTH: f32 = 72.0;
const LOG_BUFFER_MAX_LINES: usize = 2000;

/// Ring buffer of log lines for the Logs screen. Written by DesktopLogger.
static LOG_LINES: OnceLock<Mutex<VecDeque<String>>> = OnceLock::new();

fn log_buffer() -> &'static Mutex<VecDeque<String>> {
    LOG_LINES.get_or_init(|| Mutex::new(VecDeque::new()))
}

fn push_log_line(line: String) {
    if let Ok(mut buf) = log_buffer().lock() {
        buf.push_back(line);
        while buf.len() > LOG_BUFFER_MAX_LINES {
            buf.pop_front();
        }
    }
}

/// Logger that appends to LOG_LINES for display in the Logs screen.
struct DesktopLogger;

impl log::Log for DesktopLogger {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let line = format!(
            "{} [{}] {}: {}",
            clock_utc(),
            record.level(),
            record.target(),
            record.args()
        );
        push_log_line(line);
    }

    fn flush(&self) {}
}

/// UTC wall-clock time of day, HH:MM:SS.mmm.
fn clock_utc() -> String {
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = t.as_secs();
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        (secs / 3600) % 24,
        (secs / 60) % 60,
        secs % 60,
        t.subsec_millis()
    )
}

static LOGGER: DesktopLogger = DesktopLogger;

/// Route `log` records to the in-app Logs screen. Call once before anything logs.
pub fn install_logger() {
    let _ = log_buffer();
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(log::LevelFilter::Debug);
}

#[derive(Clone, Copy, PartialEq, Eq, Default)]
enum Screen {
    #[default]
    Chat,
    Logs,
}

pub struct SakhiApp {
    /// Owns the input buffer and transcript shown on the Chat screen.
    controller: ChatController<String, TranscriptBuffer>,
    /// Runtime that drives chat requests off the UI thread.
    runtime: tokio::runtime::Handle,
    /// When Some, a chat request is in flight; we read the result here.
    reply_receiver: Option<mpsc::Receiver<ResolvedReply>>,
    /// Chat endpoint, shown in the header.
    endpoint: String,
    current_screen: Screen,
}

impl SakhiApp {
    /// Space between the bottom of the content and the window edge.
    const SCREEN_FOOTER_SPACING: f32 = 24.0;

    pub fn new(
        controller: ChatController<String, TranscriptBuffer>,
        runtime: tokio::runtime::Handle,
        endpoint: String,
    ) -> Self {
        log::info!("desktop started, chat endpoint {}", endpoint);
        Self {
            controller,
            runtime,
            reply_receiver: None,
            endpoint,
            current_screen: Screen::default(),
        }
    }

    /// Accept the input and start the request on the runtime. Ignored or busy submits change nothing.
    fn send(&mut self, ctx: &egui::Context) {
        match self.controller.begin() {
            Submission::Ignored => {}
            Submission::Busy => log::debug!("send ignored: reply pending"),
            Submission::Sent(pending) => {
                let (tx, rx) = mpsc::channel();
                let ctx = ctx.clone();
                self.runtime.spawn(async move {
                    let resolved = pending.resolve().await;
                    let _ = tx.send(resolved);
                    ctx.request_repaint();
                });
                self.reply_receiver = Some(rx);
            }
        }
    }

    /// Poll for the in-flight reply and hand it to the controller. Call each frame.
    fn poll_reply(&mut self) {
        let Some(rx) = &self.reply_receiver else {
            return;
        };
        match rx.try_recv() {
            Ok(resolved) => {
                self.reply_receiver = None;
                let seq = resolved.seq();
                let outcome = self.controller.finish(resolved);
                log::info!("chat request {} finished: {:?}", seq, outcome);
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                self.reply_receiver = None;
                self.controller.abandon();
            }
        }
    }

    /// Renders one transcript block: frame filled by role, bold label, then the text as plain text.
    fn render_chat_message(ui: &mut egui::Ui, m: &Message) {
        let visuals = ui.style().visuals.clone();
        let (fill, stroke_color) = match m.role() {
            Role::User => (
                visuals.extreme_bg_color,
                visuals.widgets.noninteractive.bg_stroke.color,
            ),
            Role::Bot => (
                visuals.panel_fill,
                visuals.widgets.noninteractive.bg_stroke.color,
            ),
            Role::Error => (visuals.panel_fill, visuals.error_fg_color),
        };
        let frame = egui::Frame::none()
            .fill(fill)
            .stroke(egui::Stroke::new(1.0, stroke_color))
            .rounding(egui::Rounding::same(8.0))
            .inner_margin(egui::Margin::same(8.0));

        frame.show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal_wrapped(|ui| {
                ui.label(egui::RichText::new(format!("{}:", m.sender())).strong());
                let text = egui::RichText::new(m.text());
                let text = if m.role() == Role::Error {
                    text.color(visuals.error_fg_color)
                } else {
                    text
                };
                ui.label(text);
            });
        });
    }

    /// Chat screen: transcript fills the space and follows the newest block; input row at the bottom.
    fn ui_chat(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let pending = self.controller.is_pending();
        let row_height = ui.spacing().interact_size.y + 8.0;
        let messages_height = (ui.available_height() - row_height - Self::SCREEN_FOOTER_SPACING)
            .max(CHAT_MESSAGES_MIN_HEIGHT);
        let scroll_to_newest = self.controller.transcript_mut().take_scroll_request();
        let bot_label = self.controller.labels().bot().to_string();

        egui::ScrollArea::vertical()
            .max_height(messages_height)
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for m in self.controller.transcript().messages() {
                    Self::render_chat_message(ui, m);
                    ui.add_space(8.0);
                }
                if pending {
                    ui.label(egui::RichText::new(format!("{} is typing…", bot_label)).weak());
                }
                if scroll_to_newest {
                    ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                }
            });

        ui.add_space(8.0);

        let mut send_now = false;
        ui.horizontal(|ui| {
            let input_width =
                (ui.available_width() - SEND_BUTTON_WIDTH - ui.spacing().item_spacing.x).max(0.0);
            let response = ui.add_sized(
                [input_width, ui.spacing().interact_size.y],
                egui::TextEdit::singleline(self.controller.input_mut()).hint_text("Say something"),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                send_now = true;
                response.request_focus();
            }
            let can_send = !pending && !self.controller.input().trim().is_empty();
            let send_button = ui.add_enabled(
                can_send,
                egui::Button::new("Send").min_size(egui::vec2(SEND_BUTTON_WIDTH, 0.0)),
            );
            if send_button.clicked() {
                send_now = true;
            }
        });
        if send_now {
            self.send(ctx);
        }
    }

    fn ui_logs_screen(&self, ui: &mut egui::Ui) {
        let lines: Vec<String> = log_buffer()
            .lock()
            .map(|buf| buf.iter().cloned().collect())
            .unwrap_or_default();
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &lines {
                    ui.label(egui::RichText::new(line).monospace());
                }
            });
    }
}

impl eframe::App for SakhiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_reply();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.heading("SakhiChat");
                ui.add_space(16.0);
                ui.selectable_value(&mut self.current_screen, Screen::Chat, "Chat");
                ui.selectable_value(&mut self.current_screen, Screen::Logs, "Logs");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(egui::RichText::new(&self.endpoint).weak());
                });
            });
            ui.add_space(8.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.current_screen {
            Screen::Chat => self.ui_chat(ui, ctx),
            Screen::Logs => self.ui_logs_screen(ui),
        });
    }
}
