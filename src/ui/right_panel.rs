use eframe::egui;

use crate::engine::protocol::EngineCommand;
use crate::ui::app::NoirApp;

pub fn draw_right_panel(ctx: &egui::Context, app: &mut NoirApp) {
    egui::SidePanel::right("evidence_board")
        .resizable(true)
        .default_width(300.0)
        .min_width(240.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("EVIDENCE BOARD").small().strong());

                if !app.ui.snapshot.state.is_game_over {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let search = ui.add_enabled(app.can_act(), egui::Button::new("🔍 Search for Clues"));
                        if search.clicked() {
                            app.send_command(EngineCommand::RequestClue);
                        }
                    });
                }
            });

            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                let clues = &app.ui.snapshot.state.clues;

                if clues.is_empty() {
                    ui.label(
                        egui::RichText::new("No physical evidence cataloged.")
                            .italics()
                            .color(egui::Color32::GRAY),
                    );
                    return;
                }

                for (idx, clue) in clues.iter().enumerate() {
                    let stroke = if idx == 0 {
                        egui::Stroke::new(1.0, egui::Color32::from_rgb(140, 30, 30))
                    } else {
                        egui::Stroke::new(1.0, egui::Color32::from_gray(50))
                    };

                    egui::Frame::group(ui.style()).stroke(stroke).show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.horizontal(|ui| {
                            ui.label(
                                egui::RichText::new(format!("ITEM #{}", clues.len() - idx))
                                    .monospace()
                                    .small(),
                            );
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                ui.label(egui::RichText::new(&clue.timestamp).monospace().small());
                            });
                        });
                        ui.label(clue.text.as_str());
                    });
                    ui.add_space(4.0);
                }
            });
        });
}
