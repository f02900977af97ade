//! Game settings and preferences
//!
//! Persisted separately from draw history in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::sim::Timings;

/// Animation speed presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpeedPreset {
    Relaxed,
    #[default]
    Normal,
    Turbo,
}

impl SpeedPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedPreset::Relaxed => "Relaxed",
            SpeedPreset::Normal => "Normal",
            SpeedPreset::Turbo => "Turbo",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" | "slow" => Some(SpeedPreset::Relaxed),
            "normal" | "med" => Some(SpeedPreset::Normal),
            "turbo" | "fast" => Some(SpeedPreset::Turbo),
            _ => None,
        }
    }

    /// Multiplier applied to every phase delay
    pub fn delay_factor(&self) -> f32 {
        match self {
            SpeedPreset::Relaxed => 1.5,
            SpeedPreset::Normal => 1.0,
            SpeedPreset::Turbo => 0.5,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Animation speed preset
    pub speed: SpeedPreset,

    // === Audio ===
    /// Sound effects enabled
    pub sound: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,

    // === Accessibility ===
    /// Reduced motion (collapse the shuffle dance to a single swap)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed: SpeedPreset::Normal,
            sound: true,
            master_volume: 0.8,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Phase timings for the current preferences
    pub fn timings(&self) -> Timings {
        let base = Timings::default().scaled(self.speed.delay_factor());
        if self.reduced_motion {
            Timings {
                shuffle_steps: 1,
                ..base
            }
        } else {
            base
        }
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "lixi_draw_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_from_str() {
        assert_eq!(SpeedPreset::from_str("turbo"), Some(SpeedPreset::Turbo));
        assert_eq!(SpeedPreset::from_str("SLOW"), Some(SpeedPreset::Relaxed));
        assert_eq!(SpeedPreset::from_str("warp"), None);
    }

    #[test]
    fn test_turbo_shortens_delays() {
        let normal = Settings::default().timings();
        let turbo = Settings {
            speed: SpeedPreset::Turbo,
            ..Default::default()
        }
        .timings();

        assert!(turbo.show_ticks < normal.show_ticks);
        assert!(turbo.shuffle_step_ticks < normal.shuffle_step_ticks);
        assert_eq!(turbo.shuffle_steps, normal.shuffle_steps);
    }

    #[test]
    fn test_reduced_motion_collapses_shuffle() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert_eq!(settings.timings().shuffle_steps, 1);
    }
}
