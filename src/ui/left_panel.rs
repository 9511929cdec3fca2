use eframe::egui;

use crate::engine::protocol::EngineCommand;
use crate::model::case::SuspectRecord;
use crate::ui::app::NoirApp;
use crate::ui::portraits::initials;

const PORTRAIT_SIZE: f32 = 96.0;

pub fn draw_left_panel(ctx: &egui::Context, app: &mut NoirApp) {
    egui::SidePanel::left("case_file")
        .resizable(true)
        .default_width(380.0)
        .min_width(300.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                draw_case(ui, app);
                ui.add_space(12.0);
                draw_suspects(ctx, ui, app);
            });
        });
}

/* =========================
   Case file
   ========================= */

fn draw_case(ui: &mut egui::Ui, app: &NoirApp) {
    let Some(case) = &app.ui.snapshot.state.case else {
        return;
    };

    ui.heading(case.title.as_str());
    ui.separator();
    ui.label(egui::RichText::new(&case.scene).italics());
}

/* =========================
   Suspects
   ========================= */

fn draw_suspects(ctx: &egui::Context, ui: &mut egui::Ui, app: &mut NoirApp) {
    ui.label(egui::RichText::new("PERSONNEL OF INTEREST").small().strong());
    ui.separator();

    let suspects = app.ui.snapshot.state.suspects.clone();
    let enabled = app.can_act();

    for suspect in &suspects {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                draw_portrait(ctx, ui, app, suspect);

                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(&suspect.name).strong().size(16.0));
                    ui.label(
                        egui::RichText::new(suspect.role.to_uppercase())
                            .small()
                            .color(egui::Color32::from_rgb(220, 90, 90)),
                    );
                    ui.label(egui::RichText::new(format!("\"{}\"", suspect.description)).italics());
                });
            });

            let accuse = ui.add_enabled(
                enabled,
                egui::Button::new("ACCUSE SUSPECT").min_size(egui::vec2(ui.available_width(), 24.0)),
            );
            if accuse.clicked() {
                app.send_command(EngineCommand::RequestAccusation {
                    suspect_id: suspect.id.clone(),
                });
            }
        });
        ui.add_space(6.0);
    }
}

fn draw_portrait(ctx: &egui::Context, ui: &mut egui::Ui, app: &mut NoirApp, suspect: &SuspectRecord) {
    let size = egui::vec2(PORTRAIT_SIZE, PORTRAIT_SIZE);

    if let Some(texture) = app.portraits.get(ctx, &suspect.image) {
        ui.add(egui::Image::new(texture).fit_to_exact_size(size));
        return;
    }

    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    ui.painter().rect_filled(rect, egui::CornerRadius::same(4), egui::Color32::from_gray(40));

    if app.portraits.is_loading(&suspect.image) {
        ui.put(rect, egui::Spinner::new());
    } else {
        ui.painter().text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            initials(&suspect.name),
            egui::FontId::proportional(28.0),
            egui::Color32::GRAY,
        );
    }
}
