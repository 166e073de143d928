//! Tray settings
//!
//! Physics material, settling thresholds and display toggles. Persisted as
//! JSON in LocalStorage on the web, or in a file for the native CLI.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::Result;

/// Rigid-body parameters shared by every die
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Vertical gravity (m/s², negative is down)
    pub gravity: f32,
    pub friction: f32,
    pub restitution: f32,
    pub die_mass: f32,
    /// Applied to both linear and angular velocity
    pub damping: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            friction: CONTACT_FRICTION,
            restitution: CONTACT_RESTITUTION,
            die_mass: DIE_MASS,
            damping: DIE_DAMPING,
        }
    }
}

/// When a die counts as at rest, and how often large rolls are checked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    pub linear_epsilon: f32,
    pub angular_epsilon: f32,
    /// Dice below this height are relaunched
    pub floor_y: f32,
    /// Rolls with more dice than this are only checked every `throttle_interval`
    pub throttle_die_count: usize,
    /// Seconds of simulated time
    pub throttle_interval: f32,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            linear_epsilon: LINEAR_REST_EPSILON,
            angular_epsilon: ANGULAR_REST_EPSILON,
            floor_y: FLOOR_THRESHOLD,
            throttle_die_count: THROTTLE_DIE_COUNT,
            throttle_interval: THROTTLE_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraySettings {
    pub physics: PhysicsSettings,
    pub detection: DetectionSettings,
    /// Draw collision hull wireframes over the dice
    pub show_debug_hulls: bool,
}

impl Default for TraySettings {
    fn default() -> Self {
        Self {
            physics: PhysicsSettings::default(),
            detection: DetectionSettings::default(),
            show_debug_hulls: false,
        }
    }
}

impl TraySettings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "polydice_settings";

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
        // No-op for native; see `save_to`
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}
