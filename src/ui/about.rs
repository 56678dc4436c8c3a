pub fn show_about_window(ctx: &egui::Context, show: &mut bool) {
    egui::Window::new("About folio")
        .open(show)
        .resizable(false)
        .collapsible(false)
        .default_width(280.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("folio");
                ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                ui.add_space(8.0);
                ui.label("A PDF and EPUB viewer that remembers where you were");
                ui.add_space(8.0);
                ui.separator();
                ui.add_space(4.0);
                ui.label("Built with MuPDF, Skia, and egui");
            });
        });
}
