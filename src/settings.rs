//! Window and presentation settings
//!
//! Persisted as JSON: LocalStorage on the web, `pong_settings.json` in the
//! working directory on native. The first load writes the defaults back so
//! there is an entry to edit. The court itself is not configurable.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_DRAW_COMMANDS;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window_width: u32,
    pub window_height: u32,
    /// Background clear color (RGBA)
    pub clear_color: [f32; 4],
    /// Present with vsync (`AutoVsync`) or as fast as possible (`AutoNoVsync`)
    pub vsync: bool,
    /// Draw command slots per frame
    pub max_draw_commands: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_width: 640,
            window_height: 480,
            clear_color: [1.0, 0.0, 0.0, 1.0],
            vsync: true,
            max_draw_commands: MAX_DRAW_COMMANDS,
        }
    }
}

impl Settings {
    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }

    pub fn clear_wgpu_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        }
    }

    fn parse_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(settings) => {
                log::info!("Loaded settings");
                settings
            }
            Err(e) => {
                log::warn!("Ignoring malformed settings ({e}), using defaults");
                Self::default()
            }
        }
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "pong_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                return Self::parse_or_default(&json);
            }
        }

        log::info!("Using default settings");
        let settings = Self::default();
        settings.save();
        settings
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Settings file read on native
    #[cfg(not(target_arch = "wasm32"))]
    pub const FILE_NAME: &'static str = "pong_settings.json";

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::load_from(std::path::Path::new(Self::FILE_NAME))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        self.save_to(std::path::Path::new(Self::FILE_NAME));
    }

    /// Read settings from `path`, writing the defaults there if it doesn't exist
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::parse_or_default(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Using default settings");
                let settings = Self::default();
                settings.save_to(path);
                settings
            }
            Err(e) => {
                log::warn!("Could not read {} ({e}), using defaults", path.display());
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) {
        match self.to_json() {
            Ok(json) => match std::fs::write(path, json) {
                Ok(()) => log::info!("Settings saved to {}", path.display()),
                Err(e) => log::warn!("Could not save settings: {e}"),
            },
            Err(e) => log::warn!("Could not encode settings: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_window() {
        let settings = Settings::default();
        assert_eq!((settings.window_width, settings.window_height), (640, 480));
        assert_eq!(settings.clear_color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(settings.present_mode(), wgpu::PresentMode::AutoVsync);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{ "window_width": 1280, "vsync": false }"#).unwrap();
        assert_eq!(settings.window_width, 1280);
        assert_eq!(settings.window_height, 480);
        assert_eq!(settings.present_mode(), wgpu::PresentMode::AutoNoVsync);
        assert_eq!(settings.max_draw_commands, MAX_DRAW_COMMANDS);
    }

    #[test]
    fn test_malformed_json_falls_back() {
        assert!(Settings::from_json("{ not json").is_err());
        assert_eq!(Settings::parse_or_default("{ not json"), Settings::default());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_first_load_writes_defaults_then_reads_back() {
        let path = std::env::temp_dir().join(format!(
            "sprite_pong_settings_{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        assert_eq!(Settings::load_from(&path), Settings::default());
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(Settings::from_json(&written).unwrap(), Settings::default());

        let custom = Settings {
            window_width: 800,
            vsync: false,
            ..Settings::default()
        };
        custom.save_to(&path);
        assert_eq!(Settings::load_from(&path), custom);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_clear_color_conversion() {
        let color = Settings::default().clear_wgpu_color();
        assert_eq!(color.r, 1.0);
        assert_eq!(color.g, 0.0);
        assert_eq!(color.a, 1.0);
    }
}
