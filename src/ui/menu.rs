use crate::session::RecentEntry;
use crate::ui::{UiAction, UiState};
use crate::viewer::{Phase, Viewer};

pub fn show_menu_bar(
    ctx: &egui::Context,
    ui_state: &mut UiState,
    viewer: &Viewer,
    recents: &[RecentEntry],
) -> Vec<UiAction> {
    let mut actions = Vec::new();

    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            // File menu
            ui.menu_button("File", |ui| {
                if ui
                    .add(egui::Button::new("Open...").shortcut_text("Ctrl+O"))
                    .clicked()
                {
                    actions.push(UiAction::OpenFile);
                    ui.close_menu();
                }
                ui.menu_button("Open Recent", |ui| {
                    if recents.is_empty() {
                        ui.weak("No recent documents");
                    }
                    for entry in recents {
                        let name = std::path::Path::new(&entry.path)
                            .file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_else(|| entry.path.clone());
                        let label = format!("{} (page {})", name, entry.page + 1);
                        if ui.button(label).on_hover_text(&entry.path).clicked() {
                            actions.push(UiAction::OpenPath(entry.path.clone()));
                            ui.close_menu();
                        }
                    }
                });
                ui.separator();
                if ui
                    .add(egui::Button::new("Quit").shortcut_text("Ctrl+Q"))
                    .clicked()
                {
                    actions.push(UiAction::Quit);
                    ui.close_menu();
                }
            });

            // View menu
            ui.menu_button("View", |ui| {
                let has_doc = viewer.phase != Phase::Empty;
                if ui
                    .add_enabled(
                        has_doc,
                        egui::Button::new("Zoom In").shortcut_text("+"),
                    )
                    .clicked()
                {
                    actions.push(UiAction::SetZoom(viewer.zoom * 1.25));
                    ui.close_menu();
                }
                if ui
                    .add_enabled(
                        has_doc,
                        egui::Button::new("Zoom Out").shortcut_text("-"),
                    )
                    .clicked()
                {
                    actions.push(UiAction::SetZoom(viewer.zoom / 1.25));
                    ui.close_menu();
                }
                if ui
                    .add_enabled(has_doc, egui::Button::new("Reset Zoom").shortcut_text("0"))
                    .clicked()
                {
                    actions.push(UiAction::SetZoom(1.0));
                    ui.close_menu();
                }
                ui.separator();
                let mut inverted = viewer.inverted;
                if ui.checkbox(&mut inverted, "Invert Colours").clicked() {
                    actions.push(UiAction::ToggleInvert);
                    ui.close_menu();
                }
                let mut spread = viewer.two_page_spread;
                if ui.checkbox(&mut spread, "Two-Page Spread").clicked() {
                    actions.push(UiAction::ToggleSpread);
                    ui.close_menu();
                }
                let mut centered = viewer.centered;
                if ui.checkbox(&mut centered, "Centre Page").clicked() {
                    actions.push(UiAction::ToggleCenter);
                    ui.close_menu();
                }
            });

            // Navigation menu
            ui.menu_button("Navigation", |ui| {
                if ui
                    .add_enabled(
                        viewer.current_page > 0,
                        egui::Button::new("Previous Page").shortcut_text("PgUp"),
                    )
                    .clicked()
                {
                    actions.push(UiAction::Navigate(-1));
                    ui.close_menu();
                }
                if ui
                    .add_enabled(
                        viewer.current_page < viewer.page_count - 1,
                        egui::Button::new("Next Page").shortcut_text("PgDn"),
                    )
                    .clicked()
                {
                    actions.push(UiAction::Navigate(1));
                    ui.close_menu();
                }
                ui.separator();
                let has_doc = viewer.phase != Phase::Empty;
                if ui
                    .add_enabled(has_doc, egui::Button::new("First Page").shortcut_text("Home"))
                    .clicked()
                {
                    actions.push(UiAction::GoToPage(0));
                    ui.close_menu();
                }
                if ui
                    .add_enabled(has_doc, egui::Button::new("Last Page").shortcut_text("End"))
                    .clicked()
                {
                    actions.push(UiAction::GoToPage(viewer.page_count - 1));
                    ui.close_menu();
                }
            });

            // Help menu
            ui.menu_button("Help", |ui| {
                if ui
                    .add(egui::Button::new("Keyboard Shortcuts").shortcut_text("F1"))
                    .clicked()
                {
                    ui_state.show_shortcuts = true;
                    ui.close_menu();
                }
                if ui.button("About").clicked() {
                    ui_state.show_about = true;
                    ui.close_menu();
                }
            });
        });
    });

    actions
}
