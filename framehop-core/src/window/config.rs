//! Window geometry and memory policy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FramehopError, Result};

/// Slice length and hop size, both in frames.
///
/// A plain value: equality and hashing see only these two numbers, so a
/// config (or a `SlidingWindow` built from it) can be used as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "RawWindowConfig")]
pub struct WindowConfig {
    slice_length: usize,
    hop_size: usize,
}

/// Unvalidated wire shape of [`WindowConfig`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWindowConfig {
    slice_length: usize,
    hop_size: usize,
}

impl TryFrom<RawWindowConfig> for WindowConfig {
    type Error = FramehopError;

    fn try_from(raw: RawWindowConfig) -> Result<Self> {
        Self::new(raw.slice_length, raw.hop_size)
    }
}

impl WindowConfig {
    /// # Errors
    /// Returns `FramehopError::InvalidConfig` if either value is zero.
    pub fn new(slice_length: usize, hop_size: usize) -> Result<Self> {
        if slice_length == 0 || hop_size == 0 {
            return Err(FramehopError::InvalidConfig {
                slice_length,
                hop_size,
            });
        }
        Ok(Self {
            slice_length,
            hop_size,
        })
    }

    pub fn slice_length(&self) -> usize {
        self.slice_length
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// `true` when consecutive windows share samples.
    pub fn overlaps(&self) -> bool {
        self.slice_length > self.hop_size
    }

    /// Parse `{"sliceLength": .., "hopSize": ..}` and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawWindowConfig = serde_json::from_str(json)?;
        raw.try_into()
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            slice_length: 1024,
            hop_size: 512,
        }
    }
}

impl fmt::Display for WindowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slice={} hop={}", self.slice_length, self.hop_size)
    }
}

/// What happens to samples the cursor has moved past.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// With an upstream connected, keep everything: `reset()` after pulling
    /// replays the whole stream even if the upstream source was single-use.
    /// Memory grows with input. Push mode evicts as under `Bounded`.
    #[default]
    Replay,
    /// Drop samples no future window can start on. Memory stays around two
    /// slices plus one input buffer; `reset()` starts over from the upstream.
    Bounded,
}

/// On-disk settings for a windowing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct WindowSettings {
    pub slice_length: usize,
    pub hop_size: usize,
    pub eviction: EvictionPolicy,
}

impl Default for WindowSettings {
    fn default() -> Self {
        let config = WindowConfig::default();
        Self {
            slice_length: config.slice_length,
            hop_size: config.hop_size,
            eviction: EvictionPolicy::default(),
        }
    }
}

impl WindowSettings {
    /// Parse settings JSON. Missing fields fall back to the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validated window geometry.
    pub fn window_config(&self) -> Result<WindowConfig> {
        WindowConfig::new(self.slice_length, self.hop_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_lengths() {
        assert!(matches!(
            WindowConfig::new(0, 4),
            Err(FramehopError::InvalidConfig {
                slice_length: 0,
                hop_size: 4
            })
        ));
        assert!(WindowConfig::new(4, 0).is_err());
        assert!(WindowConfig::new(1, 1).is_ok());
    }

    #[test]
    fn overlap_follows_geometry() {
        assert!(WindowConfig::new(6, 2).unwrap().overlaps());
        assert!(!WindowConfig::new(4, 4).unwrap().overlaps());
        assert!(!WindowConfig::new(2, 5).unwrap().overlaps());
    }

    #[test]
    fn parses_camel_case_json() {
        let config = WindowConfig::from_json(r#"{"sliceLength": 7, "hopSize": 3}"#).unwrap();
        assert_eq!(config.slice_length(), 7);
        assert_eq!(config.hop_size(), 3);
    }

    #[test]
    fn json_with_zero_hop_is_rejected() {
        let err = WindowConfig::from_json(r#"{"sliceLength": 7, "hopSize": 0}"#).unwrap_err();
        assert!(matches!(err, FramehopError::InvalidConfig { .. }));
    }

    #[test]
    fn malformed_json_is_config_error() {
        let err = WindowConfig::from_json("{sliceLength: 7").unwrap_err();
        assert!(matches!(err, FramehopError::Config(_)));
    }

    #[test]
    fn settings_fill_missing_fields() {
        let settings = WindowSettings::from_json(r#"{"hopSize": 256, "eviction": "bounded"}"#).unwrap();
        assert_eq!(settings.slice_length, 1024);
        assert_eq!(settings.hop_size, 256);
        assert_eq!(settings.eviction, EvictionPolicy::Bounded);
        assert_eq!(settings.window_config().unwrap().hop_size(), 256);
    }

    #[test]
    fn direct_deserialize_validates() {
        let parsed: std::result::Result<WindowConfig, _> =
            serde_json::from_str(r#"{"sliceLength": 0, "hopSize": 3}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(WindowConfig::new(12, 34).unwrap().to_string(), "slice=12 hop=34");
    }
}
