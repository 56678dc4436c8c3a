use crate::ui::{UiAction, UiState};
use crate::viewer::{self, Phase, Viewer};

/// The controls row: navigation buttons, page and zoom entry, view toggles.
/// Invalid text entry is rejected locally and the field snaps back to the
/// current value; no error is surfaced beyond the visual reset.
pub fn show_toolbar(
    ctx: &egui::Context,
    ui_state: &mut UiState,
    viewer: &Viewer,
) -> Vec<UiAction> {
    let mut actions = Vec::new();
    let has_doc = viewer.phase != Phase::Empty;

    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if ui
                .add_enabled(viewer.current_page > 0, egui::Button::new("Previous"))
                .clicked()
            {
                actions.push(UiAction::Navigate(-1));
            }
            if ui
                .add_enabled(
                    viewer.current_page < viewer.page_count - 1,
                    egui::Button::new("Next"),
                )
                .clicked()
            {
                actions.push(UiAction::Navigate(1));
            }

            ui.separator();

            ui.label("Page:");
            let page_field = ui.add_enabled(
                has_doc,
                egui::TextEdit::singleline(&mut ui_state.page_text).desired_width(48.0),
            );
            if page_field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                match viewer::parse_page_entry(&ui_state.page_text, viewer.page_count) {
                    Some(page) => actions.push(UiAction::GoToPage(page)),
                    None => ui_state.page_text = format!("{}", viewer.current_page + 1),
                }
            }
            if !page_field.has_focus() {
                ui_state.page_text = format!("{}", viewer.current_page + 1);
            }
            if has_doc {
                ui.label(format!("of {}", viewer.page_count));
            }

            ui.separator();

            ui.label("Zoom:");
            let zoom_field = ui.add_enabled(
                has_doc,
                egui::TextEdit::singleline(&mut ui_state.zoom_text).desired_width(48.0),
            );
            if zoom_field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                match viewer::parse_zoom_entry(&ui_state.zoom_text) {
                    Some(zoom) => actions.push(UiAction::SetZoom(zoom)),
                    None => {
                        ui_state.zoom_text = format!("{}%", (viewer.zoom * 100.0).round() as i32)
                    }
                }
            }
            if !zoom_field.has_focus() {
                ui_state.zoom_text = format!("{}%", (viewer.zoom * 100.0).round() as i32);
            }

            ui.separator();

            let mut inverted = viewer.inverted;
            if ui.checkbox(&mut inverted, "Invert").clicked() {
                actions.push(UiAction::ToggleInvert);
            }
            let mut spread = viewer.two_page_spread;
            if ui.checkbox(&mut spread, "Two-Page").clicked() {
                actions.push(UiAction::ToggleSpread);
            }
            let mut centered = viewer.centered;
            if ui.checkbox(&mut centered, "Centre").clicked() {
                actions.push(UiAction::ToggleCenter);
            }
        });
    });

    actions
}
