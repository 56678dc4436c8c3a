use crate::viewer::{Phase, Viewer};

pub fn show_status_bar(ctx: &egui::Context, viewer: &Viewer) {
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if viewer.phase != Phase::Empty {
                let zoom_pct = (viewer.zoom * 100.0).round() as i32;
                ui.label(format!(
                    "Page {}/{}",
                    viewer.current_page + 1,
                    viewer.page_count
                ));
                ui.separator();
                ui.label(format!("Zoom: {}%", zoom_pct));
                if viewer.inverted {
                    ui.separator();
                    ui.label("Inverted");
                }
                if viewer.two_page_spread {
                    ui.separator();
                    ui.label("Two-Page");
                }
            } else if let Some(error) = &viewer.last_error {
                ui.colored_label(
                    egui::Color32::from_rgb(230, 80, 80),
                    format!("Failed to open document: {}", error),
                );
            } else {
                ui.label("No document open");
            }
        });
    });
}
