use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// User-configurable parameters.
/// Stored in the platform config directory (`$XDG_CONFIG_HOME/folio/` or `%APPDATA%\folio\`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extra rasterization scale on top of the view zoom, for crisp glyphs.
    pub render_oversample: f32,
    /// Maximum number of entries in the Open Recent menu.
    pub recent_limit: usize,
    /// UI font scale multiplier (0.75–2.0). Scales all egui text sizes.
    pub ui_font_scale: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render_oversample: 2.0,
            recent_limit: 10,
            ui_font_scale: 1.0,
        }
    }
}

impl Config {
    /// Load config from `config.json`, or return defaults.
    pub fn load() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!(
                    "No config file at {}, using defaults. Creating default config.",
                    path.display()
                );
                let config = Self::default();
                config.save();
                config
            }
        }
    }

    /// Save current config to `config.json`.
    pub fn save(&self) {
        let path = config_path();
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    log::warn!("Failed to write config to {}: {}", path.display(), e);
                }
            }
            Err(e) => {
                log::warn!("Failed to serialize config: {}", e);
            }
        }
    }
}

fn config_path() -> PathBuf {
    let dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("folio");
    if !dir.exists() {
        std::fs::create_dir_all(&dir).ok();
    }
    dir.join("config.json")
}
