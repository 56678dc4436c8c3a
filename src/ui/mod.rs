pub mod about;
pub mod loading;
pub mod menu;
pub mod shortcuts;
pub mod status_bar;
pub mod toolbar;

use crate::session::RecentEntry;
use crate::viewer::{Phase, Viewer};

#[derive(Debug, Clone)]
pub enum UiAction {
    OpenFile,
    OpenPath(String),
    Navigate(i32),
    GoToPage(i32),
    SetZoom(f64),
    ToggleInvert,
    ToggleSpread,
    ToggleCenter,
    Quit,
}

pub struct UiState {
    pub show_shortcuts: bool,
    pub show_about: bool,
    pub page_text: String,
    pub zoom_text: String,
    pub content_rect: egui::Rect,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            show_shortcuts: false,
            show_about: false,
            page_text: String::new(),
            zoom_text: String::new(),
            content_rect: egui::Rect::EVERYTHING,
        }
    }
}

/// Build the entire egui UI. Returns a list of actions to process.
pub fn build_ui(
    ctx: &egui::Context,
    ui_state: &mut UiState,
    viewer: &Viewer,
    recents: &[RecentEntry],
) -> Vec<UiAction> {
    let mut actions = Vec::new();

    actions.extend(menu::show_menu_bar(ctx, ui_state, viewer, recents));
    actions.extend(toolbar::show_toolbar(ctx, ui_state, viewer));
    status_bar::show_status_bar(ctx, viewer);

    shortcuts::show_shortcuts_window(ctx, &mut ui_state.show_shortcuts);
    about::show_about_window(ctx, &mut ui_state.show_about);

    if viewer.phase == Phase::Loading {
        loading::show_loading_overlay(ctx);
    }

    // Capture the remaining content rect after all panels
    ui_state.content_rect = ctx.available_rect();

    actions
}
