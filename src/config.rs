//! Plugin Configuration
//!
//! The configuration document is loaded once at startup, validated, and
//! written straight back so the file on disk always carries every field in
//! normalized form. Handlers only ever see an immutable [`Configuration`];
//! a reload swaps the whole value.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::time::{Tick, secs_to_ticks};
use crate::game::detonation::Blast;

/// Seconds a hazard stays registered past its fuse.
///
/// Covers the delay between the fuse expiring and the host delivering the
/// resulting damage events.
pub const HAZARD_EXPIRY_MARGIN_SECS: f32 = 5.0;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "carrier-charge.json";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the document failed.
    #[error("config I/O error at {path}: {source}")]
    Io {
        /// Document path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The document is not valid JSON for this schema.
    #[error("malformed config at {path}: {source}")]
    Parse {
        /// Document path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Serializing the normalized document failed.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A field is zero, negative, or not finite.
    #[error("config field `{field}` must be a positive finite number, got {value}")]
    InvalidValue {
        /// Field name as written in the document.
        field: &'static str,
        /// Offending value.
        value: f32,
    },
}

/// Tunable values for charges and carrier detonations.
///
/// All fields are positive finite numbers. No cross-field invariants are
/// enforced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Explosion damage a charge deals to players.
    #[serde(rename = "Player damage (charge)")]
    pub player_damage: f32,

    /// Explosion damage a charge deals to everything else.
    #[serde(rename = "Structure damage (charge)")]
    pub structure_damage: f32,

    /// Charge blast radius (meters).
    #[serde(rename = "Explosion radius (charge)")]
    pub explosion_radius: f32,

    /// Charge fuse (seconds). Min and max fuse are both set to this.
    #[serde(rename = "Fuse time (seconds)")]
    pub fuse_time: f32,

    /// How far below the carrier the charge appears (meters).
    #[serde(rename = "Drop height (meters)")]
    pub drop_height: f32,

    /// Minimum time between drops per actor (seconds).
    #[serde(rename = "Cooldown between drops (seconds)")]
    pub cooldown_seconds: f32,

    /// Damage a destroyed carrier deals to players.
    #[serde(rename = "Player damage (carrier)")]
    pub carrier_player_damage: f32,

    /// Damage a destroyed carrier deals to everything else.
    #[serde(rename = "Structure damage (carrier)")]
    pub carrier_structure_damage: f32,

    /// Maximum carrier operating distance (meters). Persisted, not enforced.
    #[serde(rename = "Max carrier distance (meters)")]
    pub max_carrier_distance: f32,

    /// Carrier blast radius (meters).
    #[serde(rename = "Explosion radius (carrier)")]
    pub carrier_explosion_radius: f32,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            player_damage: 300.0,
            structure_damage: 1500.0,
            explosion_radius: 15.0,
            fuse_time: 3.0,
            drop_height: 0.5,
            cooldown_seconds: 1.0,
            carrier_player_damage: 500.0,
            carrier_structure_damage: 2500.0,
            max_carrier_distance: 1000.0,
            carrier_explosion_radius: 10.0,
        }
    }
}

impl Configuration {
    /// Every field paired with its document name.
    pub fn fields(&self) -> [(&'static str, f32); 10] {
        [
            ("Player damage (charge)", self.player_damage),
            ("Structure damage (charge)", self.structure_damage),
            ("Explosion radius (charge)", self.explosion_radius),
            ("Fuse time (seconds)", self.fuse_time),
            ("Drop height (meters)", self.drop_height),
            ("Cooldown between drops (seconds)", self.cooldown_seconds),
            ("Player damage (carrier)", self.carrier_player_damage),
            ("Structure damage (carrier)", self.carrier_structure_damage),
            ("Max carrier distance (meters)", self.max_carrier_distance),
            ("Explosion radius (carrier)", self.carrier_explosion_radius),
        ]
    }

    /// Check that every field is a positive finite number.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in self.fields() {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        Ok(())
    }

    /// Offset from carrier to charge spawn point.
    #[inline]
    pub fn drop_offset(&self) -> Vec3 {
        Vec3::new(0.0, self.drop_height, 0.0)
    }

    /// Per-actor cooldown window in ticks.
    #[inline]
    pub fn cooldown_ticks(&self) -> Tick {
        secs_to_ticks(self.cooldown_seconds)
    }

    /// How long a spawned charge stays registered, in ticks.
    #[inline]
    pub fn hazard_lifetime_ticks(&self) -> Tick {
        secs_to_ticks(self.fuse_time + HAZARD_EXPIRY_MARGIN_SECS)
    }

    /// Blast parameters for a carrier destroyed at `position`.
    pub fn carrier_blast(&self, position: Vec3) -> Blast {
        Blast {
            position,
            radius: self.carrier_explosion_radius,
            player_damage: self.carrier_player_damage,
            structure_damage: self.carrier_structure_damage,
        }
    }
}

/// Persisted configuration document.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store backed by the document at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load, validate, and write back the normalized document.
    ///
    /// A missing document yields the defaults, which are then written out.
    /// Fields absent from an existing document take their defaults.
    pub fn load(&self) -> Result<Configuration, ConfigError> {
        let config = match fs::read_to_string(&self.path) {
            Ok(text) => serde_json::from_str::<Configuration>(&text).map_err(|source| {
                ConfigError::Parse { path: self.path.clone(), source }
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("No config at {}, writing defaults", self.path.display());
                Configuration::default()
            }
            Err(source) => {
                return Err(ConfigError::Io { path: self.path.clone(), source });
            }
        };

        config.validate()?;
        self.save(&config)?;
        debug!("Loaded config from {}: {:?}", self.path.display(), config);
        Ok(config)
    }

    /// Write `config` as pretty-printed JSON.
    pub fn save(&self, config: &Configuration) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, text).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir().join(format!("carrier-charge-{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(Configuration::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive() {
        let config = Configuration { fuse_time: 0.0, ..Configuration::default() };
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "Fuse time (seconds)");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_nan() {
        let config = Configuration { explosion_radius: f32::NAN, ..Configuration::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let path = scratch_path();
        let store = ConfigStore::new(&path);

        let config = store.load().unwrap();
        assert_eq!(config, Configuration::default());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_partial_document_is_normalized() {
        let path = scratch_path();
        fs::write(&path, r#"{ "Fuse time (seconds)": 6.0 }"#).unwrap();
        let store = ConfigStore::new(&path);

        let config = store.load().unwrap();
        assert_eq!(config.fuse_time, 6.0);
        assert_eq!(config.player_damage, 300.0);

        // Rewritten with every field present
        let text = fs::read_to_string(&path).unwrap();
        for (field, _) in config.fields() {
            assert!(text.contains(field), "normalized document missing {}", field);
        }
        assert_eq!(store.load().unwrap(), config);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_malformed_document() {
        let path = scratch_path();
        fs::write(&path, "{ not json").unwrap();

        let result = ConfigStore::new(&path).load();
        assert!(matches!(result, Err(ConfigError::Parse { .. })));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_lifetime_covers_fuse_and_margin() {
        let config = Configuration::default();
        assert_eq!(config.hazard_lifetime_ticks(), 480);
        assert_eq!(config.cooldown_ticks(), 60);
    }

    #[test]
    fn test_carrier_blast_uses_carrier_values() {
        let config = Configuration::default();
        let blast = config.carrier_blast(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(blast.radius, 10.0);
        assert_eq!(blast.player_damage, 500.0);
        assert_eq!(blast.structure_damage, 2500.0);
    }
}
