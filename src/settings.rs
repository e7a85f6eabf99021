//! Level settings
//!
//! Read from a JSON file on native (first CLI argument) and from LocalStorage
//! on the web. Missing fields fall back to defaults.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::sim::LevelParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Course generation parameters
    pub level: LevelParams,
    /// Fixed seed for a reproducible course (random if unset)
    pub seed: Option<u64>,

    // === Headless runner ===
    /// Simulated seconds to run
    pub run_seconds: f32,
    /// Host frame rate the runner pretends to render at
    pub frame_rate: f32,
    /// Log obstacle poses once per simulated second
    pub log_poses: bool,
    /// Print the scene as JSON when done
    pub print_scene: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            level: LevelParams::default(),
            seed: None,
            run_seconds: 5.0,
            frame_rate: 60.0,
            log_poses: true,
            print_scene: false,
        }
    }
}

impl Settings {
    /// Check the obstacle pool can be drawn from
    pub fn validate(&self) -> Result<()> {
        if self.level.count > 0 && self.level.types.is_empty() {
            return Err(ConfigError::EmptyTypes);
        }
        if let Some(kind) = self.level.types.iter().find(|k| !k.is_selectable()) {
            return Err(ConfigError::NotSelectable(*kind));
        }
        Ok(())
    }

    /// Copy with a new obstacle count, if the pool can still supply it
    pub fn with_count(&self, count: usize) -> Result<Self> {
        let mut updated = self.clone();
        updated.level.count = count;
        updated.validate()?;
        Ok(updated)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate a settings file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "obstacle_course_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
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
