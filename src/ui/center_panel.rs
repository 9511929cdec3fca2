use eframe::egui;

use crate::engine::protocol::EngineCommand;
use super::app::NoirApp;

pub fn draw_center_panel(ctx: &egui::Context, app: &mut NoirApp) {
    let input_id = egui::Id::new("chat_input_box");
    let enabled = app.can_act();

    // ---------- Input bar ----------
    egui::TopBottomPanel::bottom("chat_input").show(ctx, |ui| {
        let mut send_now = false;
        let mut via_enter = false;

        ui.add_enabled_ui(enabled, |ui| {
            ui.horizontal(|ui| {
                let hint = if app.ui.snapshot.state.is_game_over {
                    "Case closed."
                } else {
                    "Interrogate suspects or investigate…"
                };

                let response = ui.add_sized(
                    [ui.available_width() - 60.0, 60.0],
                    egui::TextEdit::multiline(&mut app.ui.input_text)
                        .id(input_id)
                        .hint_text(hint)
                        .lock_focus(true),
                );

                // Enter sends, Shift+Enter is a newline
                if response.has_focus()
                    && ui.input(|i| i.key_pressed(egui::Key::Enter) && !i.modifiers.shift)
                {
                    send_now = true;
                    via_enter = true;
                }

                if ui.button("Send").clicked() {
                    send_now = true;
                }
            });
        });

        if send_now && enabled {
            if let Some(text) = outgoing_text(&app.ui.input_text, via_enter) {
                app.send_command(EngineCommand::Ask(text));
                app.ui.input_text.clear();
            }

            ui.memory_mut(|m| m.request_focus(input_id));
        }
    });

    // ---------- Investigation log ----------
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.label(egui::RichText::new("INVESTIGATION LOG").small().strong());
        ui.separator();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(app.ui.should_auto_scroll)
            .show(ui, |ui| {
                for msg in &app.ui.snapshot.state.messages {
                    app.draw_message(ui, msg);
                }

                if app.ui.snapshot.busy {
                    ui.add_space(6.0);
                    ui.add(egui::Spinner::new());
                }
            });
    });
}

/// What gets sent for the current buffer: the text as typed, minus the newline
/// the Enter key itself inserted. Blank input sends nothing.
fn outgoing_text(buffer: &str, via_enter: bool) -> Option<String> {
    let text = if via_enter {
        buffer.strip_suffix('\n').unwrap_or(buffer)
    } else {
        buffer
    };

    (!text.trim().is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::outgoing_text;

    #[test]
    fn keeps_text_as_typed() {
        assert_eq!(outgoing_text("  Where were you?  ", false).as_deref(), Some("  Where were you?  "));
    }

    #[test]
    fn drops_only_the_enter_newline() {
        assert_eq!(outgoing_text("line one\nline two\n", true).as_deref(), Some("line one\nline two"));
        assert_eq!(outgoing_text("line one\n\n", true).as_deref(), Some("line one\n"));
    }

    #[test]
    fn blank_input_sends_nothing() {
        assert_eq!(outgoing_text("   \n", true), None);
        assert_eq!(outgoing_text("", false), None);
    }
}
