//! Sandbox settings
//!
//! Persisted separately from high scores. The only user setting is the
//! gravity level, read by the physics stepper every frame.

use serde::{Deserialize, Serialize};

use crate::consts::{GRAVITY_HIGH, GRAVITY_LOW, GRAVITY_NORMAL};
use crate::persistence::Storage;

/// Gravity strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GravityLevel {
    Low,
    #[default]
    Normal,
    High,
}

impl GravityLevel {
    pub const ALL: [GravityLevel; 3] = [GravityLevel::Low, GravityLevel::Normal, GravityLevel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            GravityLevel::Low => "low",
            GravityLevel::Normal => "normal",
            GravityLevel::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(GravityLevel::Low),
            "normal" | "med" | "medium" => Some(GravityLevel::Normal),
            "high" => Some(GravityLevel::High),
            _ => None,
        }
    }

    /// Downward acceleration (pixels/frame²)
    pub fn acceleration(&self) -> f32 {
        match self {
            GravityLevel::Low => GRAVITY_LOW,
            GravityLevel::Normal => GRAVITY_NORMAL,
            GravityLevel::High => GRAVITY_HIGH,
        }
    }
}

/// Sandbox settings/preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub gravity: GravityLevel,
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "bounce_sandbox_settings";

    /// Load settings, falling back to defaults on any missing or corrupt data
    pub fn load(storage: &dyn Storage) -> Self {
        match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring corrupt settings ({}), using defaults", e);
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Could not read settings ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings. Failures are logged, never fatal.
    pub fn save(&self, storage: &mut dyn Storage) {
        let result = serde_json::to_string(self)
            .map_err(Into::into)
            .and_then(|json| storage.set_item(Self::STORAGE_KEY, &json));

        match result {
            Ok(()) => log::info!("Settings saved (gravity: {})", self.gravity.as_str()),
            Err(e) => log::warn!("Failed to save settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_gravity_names() {
        for level in GravityLevel::ALL {
            assert_eq!(GravityLevel::from_str(level.as_str()), Some(level));
        }
        assert_eq!(GravityLevel::from_str(" HIGH "), Some(GravityLevel::High));
        assert_eq!(GravityLevel::from_str("sideways"), None);
    }

    #[test]
    fn test_gravity_ordering() {
        assert!(GravityLevel::Low.acceleration() < GravityLevel::Normal.acceleration());
        assert!(GravityLevel::Normal.acceleration() < GravityLevel::High.acceleration());
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&Settings {
            gravity: GravityLevel::High,
        })
        .unwrap();
        assert_eq!(json, r#"{"gravity":"high"}"#);
    }

    #[test]
    fn test_round_trip_through_storage() {
        let mut storage = MemoryStorage::new();
        Settings {
            gravity: GravityLevel::High,
        }
        .save(&mut storage);

        let loaded = Settings::load(&storage);
        assert_eq!(loaded.gravity, GravityLevel::High);
        assert_eq!(loaded.gravity.acceleration(), GRAVITY_HIGH);
    }

    #[test]
    fn test_corrupt_or_missing_falls_back_to_normal() {
        let storage = MemoryStorage::new();
        assert_eq!(Settings::load(&storage), Settings::default());

        let mut storage = MemoryStorage::new();
        storage.set_item(Settings::STORAGE_KEY, "{not json").unwrap();
        assert_eq!(Settings::load(&storage).gravity, GravityLevel::Normal);

        storage
            .set_item(Settings::STORAGE_KEY, r#"{"gravity":"extreme"}"#)
            .unwrap();
        assert_eq!(Settings::load(&storage).gravity, GravityLevel::Normal);

        // Unknown fields and a missing gravity are tolerated
        storage.set_item(Settings::STORAGE_KEY, r#"{"volume":3}"#).unwrap();
        assert_eq!(Settings::load(&storage).gravity, GravityLevel::Normal);
    }
}
