use std::time::Duration;

use eframe::egui;
use egui::Layout;
use log::{debug, error};

use crate::engine::engine::EngineHandle;
use crate::engine::llm_client::ChatSession;
use crate::engine::prompt_builder::SYSTEM_INSTRUCTION;
use crate::engine::protocol::{EngineCommand, EngineResponse, SessionSnapshot};
use crate::model::game_state::GameStatus;
use crate::model::message::{Role, TranscriptEntry};
use crate::ui::portraits::PortraitCache;
use crate::ui::settings::AppSettings;
use crate::ui::settings_io::save_settings;
use crate::ui::{center_panel, left_panel, right_panel};

/* =========================
   UI State
   ========================= */

#[derive(Default)]
pub struct UiState {
    pub input_text: String,
    pub snapshot: SessionSnapshot,
    pub should_auto_scroll: bool,
    pub show_settings: bool,
}

/* =========================
   App
   ========================= */

pub struct NoirApp {
    pub ui: UiState,
    pub settings: AppSettings,
    pub portraits: PortraitCache,
    engine: EngineHandle<ChatSession>,
}

impl NoirApp {
    pub fn new(settings: AppSettings) -> Self {
        let engine = EngineHandle::spawn(
            Box::new(|llm| ChatSession::new(llm, SYSTEM_INSTRUCTION)),
            settings.llm.clone(),
        );

        Self {
            ui: UiState::default(),
            settings,
            portraits: PortraitCache::new(),
            engine,
        }
    }

    pub fn send_command(&self, cmd: EngineCommand) {
        self.engine.send(cmd);
    }

    /// Discard everything and bootstrap a fresh case.
    pub fn start_new_case(&mut self) {
        self.portraits.clear();
        self.ui.input_text.clear();
        self.ui.snapshot = SessionSnapshot::default();
        self.send_command(EngineCommand::NewCase {
            llm: self.settings.llm.clone(),
        });
    }

    /// Controls are live only while investigating with nothing in flight.
    pub fn can_act(&self) -> bool {
        let snap = &self.ui.snapshot;
        snap.state.status == GameStatus::Investigating
            && !snap.busy
            && !snap.state.is_game_over
            && snap.pending_accusation.is_none()
    }

    pub fn draw_message(&self, ui: &mut egui::Ui, msg: &TranscriptEntry) {
        let (bg, right, text) = match msg.role {
            Role::User => (
                self.settings.color("User"),
                true,
                egui::RichText::new(&msg.content).color(egui::Color32::WHITE),
            ),
            Role::Assistant => (
                self.settings.color("Assistant"),
                false,
                egui::RichText::new(&msg.content).color(egui::Color32::WHITE),
            ),
            Role::System => (
                self.settings.color("System"),
                false,
                egui::RichText::new(&msg.content)
                    .italics()
                    .color(egui::Color32::from_rgb(250, 190, 60)),
            ),
        };

        ui.add_space(6.0);

        if right {
            ui.with_layout(Layout::right_to_left(egui::Align::TOP), |ui| {
                bubble(ui, bg, text);
            });
        } else {
            bubble(ui, bg, text);
        }
    }

    fn drain_engine(&mut self) {
        while let Some(resp) = self.engine.try_recv() {
            match resp {
                EngineResponse::Snapshot(snapshot) => {
                    if snapshot.state.messages.len() != self.ui.snapshot.state.messages.len()
                        || snapshot.busy != self.ui.snapshot.busy
                    {
                        self.ui.should_auto_scroll = true;
                    }
                    self.ui.snapshot = snapshot;
                }
                EngineResponse::Outcome { kind, outcome } => {
                    debug!("{:?} finished: {:?}", kind, outcome);
                }
                EngineResponse::Rejected(reason) => {
                    debug!("engine refused action: {}", reason);
                }
            }
        }
    }
}

/* =========================
   egui App
   ========================= */

impl eframe::App for NoirApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.settings.ui_scale);

        self.drain_engine();
        self.portraits.poll(ctx);

        if self.ui.snapshot.busy || self.ui.snapshot.state.status == GameStatus::Loading {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        draw_header(ctx, self);

        if self.ui.show_settings {
            draw_settings_window(ctx, self);
        }

        if self.ui.snapshot.state.status == GameStatus::Loading {
            draw_loading_screen(ctx, self);
            return;
        }

        left_panel::draw_left_panel(ctx, self);
        right_panel::draw_right_panel(ctx, self);
        center_panel::draw_center_panel(ctx, self);

        draw_confirmation(ctx, self);

        self.ui.should_auto_scroll = false;
    }
}

/* =========================
   Header / loading / modal
   ========================= */

fn draw_header(ctx: &egui::Context, app: &mut NoirApp) {
    egui::TopBottomPanel::top("header").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.heading("DETECTIVE AI");
            ui.label(
                egui::RichText::new("THE NOIR FILES")
                    .small()
                    .color(egui::Color32::from_rgb(200, 40, 40)),
            );

            ui.with_layout(Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("⚙ Settings").clicked() {
                    app.ui.show_settings = !app.ui.show_settings;
                }
                if ui.button("⟲ New Case").clicked() {
                    app.start_new_case();
                }

                let state = &app.ui.snapshot.state;
                if state.status != GameStatus::Loading {
                    let (label, color) = if state.is_game_over {
                        ("CASE CLOSED", egui::Color32::from_rgb(200, 40, 40))
                    } else {
                        ("ACTIVE INVESTIGATION", egui::Color32::from_rgb(60, 180, 80))
                    };
                    ui.label(egui::RichText::new(label).monospace().color(color));
                }
            });
        });
    });
}

fn draw_loading_screen(ctx: &egui::Context, app: &mut NoirApp) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() / 3.0);
            ui.heading("Analyzing Crime Scene...");
            ui.label(
                egui::RichText::new("OPENING COLD CASE FILES")
                    .small()
                    .italics()
                    .color(egui::Color32::GRAY),
            );
            ui.add_space(12.0);

            if app.ui.snapshot.busy {
                ui.add(egui::Spinner::new().size(32.0));
            } else if ui.button("⟲ New Case").clicked() {
                app.start_new_case();
            }
        });
    });
}

fn draw_confirmation(ctx: &egui::Context, app: &mut NoirApp) {
    let Some(pending) = app.ui.snapshot.pending_accusation.clone() else {
        return;
    };

    egui::Window::new("Accusation")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(pending.question.as_str());
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                if ui.button(format!("Accuse {}", pending.suspect.name)).clicked() {
                    app.send_command(EngineCommand::ConfirmAccusation);
                    app.ui.snapshot.pending_accusation = None;
                }
                if ui.button("Cancel").clicked() {
                    app.send_command(EngineCommand::CancelAccusation);
                    app.ui.snapshot.pending_accusation = None;
                }
            });
        });
}

fn draw_settings_window(ctx: &egui::Context, app: &mut NoirApp) {
    let mut open = app.ui.show_settings;

    egui::Window::new("Settings")
        .open(&mut open)
        .resizable(false)
        .show(ctx, |ui| {
            let s = &mut app.settings;

            ui.label("UI Scale");
            ui.add(egui::Slider::new(&mut s.ui_scale, 0.75..=2.0));

            ui.separator();
            ui.label("Model endpoint (OpenAI-compatible)");
            ui.text_edit_singleline(&mut s.llm.base_url);
            ui.label("Model");
            ui.text_edit_singleline(&mut s.llm.model);
            ui.label("Temperature");
            ui.add(egui::Slider::new(&mut s.llm.temperature, 0.0..=2.0));
            ui.label("API key environment variable");
            ui.text_edit_singleline(&mut s.llm.api_key_env);
            ui.label(
                egui::RichText::new("Endpoint changes apply to the next case.")
                    .small()
                    .italics(),
            );

            ui.separator();
            ui.collapsing("Colors", |ui| {
                for key in ["User", "Assistant", "System"] {
                    let mut color = s.color(key);
                    ui.horizontal(|ui| {
                        ui.label(key);
                        if ui.color_edit_button_srgba(&mut color).changed() {
                            s.set_color(key, color);
                        }
                    });
                }
            });

            ui.separator();
            if ui.button("Save").clicked() {
                if let Err(e) = save_settings(s) {
                    error!("saving settings failed: {:#}", e);
                }
            }
        });

    app.ui.show_settings = open;
}

/* =========================
   UI Helpers
   ========================= */

pub fn bubble(ui: &mut egui::Ui, color: egui::Color32, text: egui::RichText) {
    egui::Frame::new()
        .fill(color)
        .corner_radius(egui::CornerRadius::same(8))
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.set_max_width(ui.available_width() * 0.85);
            ui.label(text);
        });
}
