pub fn show_loading_overlay(ctx: &egui::Context) {
    // Dim the page area; panels above stay readable.
    let dim = egui::LayerId::new(egui::Order::Background, egui::Id::from("loading_dim"));
    ctx.layer_painter(dim).rect_filled(
        ctx.screen_rect(),
        0.0,
        egui::Color32::from_rgba_unmultiplied(0, 0, 0, 120),
    );

    egui::Area::new(egui::Id::from("loading_overlay"))
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .interactable(false)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.spinner();
                ui.label("Rendering page...");
            });
        });
}
