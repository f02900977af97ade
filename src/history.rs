//! Draw history log
//!
//! Persisted to LocalStorage, tracks the last 10 draws.

use serde::{Deserialize, Serialize};

/// Maximum number of draws to keep
pub const MAX_HISTORY: usize = 10;

/// A single recorded draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    /// Prize label that was revealed
    pub prize: String,
    /// Board slot of the picked envelope
    pub slot: u32,
    /// Unix timestamp (ms) when revealed
    pub timestamp: f64,
}

/// Rolling log of past draws, newest first
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DrawHistory {
    pub entries: Vec<DrawRecord>,
}

impl DrawHistory {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "lixi_draw_history";

    /// Create an empty log
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record a draw, trimming the oldest entries past the cap
    pub fn record(&mut self, prize: String, slot: u32, timestamp: f64) {
        self.entries.insert(
            0,
            DrawRecord {
                prize,
                slot,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HISTORY);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent draw (if any)
    pub fn latest(&self) -> Option<&DrawRecord> {
        self.entries.first()
    }

    /// Load the log from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(history) = serde_json::from_str::<DrawHistory>(&json) {
                    log::info!("Loaded {} past draws", history.entries.len());
                    return history;
                }
            }
        }

        log::info!("No draw history found, starting fresh");
        Self::new()
    }

    /// Save the log to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Draw history saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Format a past timestamp relative to `now` (both Unix ms)
pub fn format_relative(now_ms: f64, then_ms: f64) -> String {
    let secs = ((now_ms - then_ms) / 1000.0).max(0.0);
    let mins = secs / 60.0;
    let hours = mins / 60.0;
    let days = hours / 24.0;

    if days >= 2.0 {
        format!("{} days ago", days.floor() as i64)
    } else if days >= 1.0 {
        "Yesterday".to_string()
    } else if hours >= 1.0 {
        let h = hours.floor() as i64;
        if h == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", h)
        }
    } else if mins >= 1.0 {
        let m = mins.floor() as i64;
        if m == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", m)
        }
    } else {
        "Just now".to_string()
    }
}
