#![forbid(unsafe_code)]

//! Configuration for a Wayfinder host.
//!
//! Every tunable lives in one [`WayfinderConfig`] that can be loaded from
//! TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # wayfinder.toml
//! [placement]
//! popup_width = 360
//! gap = 12
//!
//! [storage]
//! path = "state/tours.json"
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```
//!
//! ```rust,ignore
//! let config = WayfinderConfig::load("wayfinder.toml")?;
//! let config = WayfinderConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! `WayfinderConfig::default()` reproduces the built-in behavior: a 320×200
//! popup with 10px gap and margin, the standard highlight treatment, the
//! bundled tours and no persistence.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wayfinder_core::Size;
use wayfinder_overlay::{HighlightTreatment, Highlighter, PlacementConfig, Pulse, ScrollOptions};

/// Upper bound for popup dimensions, gap and margin, in pixels.
pub const MAX_EXTENT: i32 = 100_000;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WayfinderConfig {
    pub placement: PlacementSection,
    pub highlight: HighlightSection,
    pub storage: StorageSection,
    pub catalog: CatalogSection,
    pub logging: LoggingSection,
}

/// Popup geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementSection {
    pub popup_width: i32,
    pub popup_height: i32,
    pub gap: i32,
    pub margin: i32,
}

impl Default for PlacementSection {
    fn default() -> Self {
        let d = PlacementConfig::default();
        Self {
            popup_width: d.popup.width,
            popup_height: d.popup.height,
            gap: d.gap,
            margin: d.margin,
        }
    }
}

/// Highlight treatment overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightSection {
    pub z_index: i32,
    /// Animate the border.
    pub pulse: bool,
    pub pulse_period_ms: u64,
    pub pulse_min_opacity: f32,
    pub transition_ms: u64,
    /// Scroll the anchor into view on activation.
    pub scroll_into_view: bool,
}

impl Default for HighlightSection {
    fn default() -> Self {
        let t = HighlightTreatment::default();
        let pulse = t.pulse.unwrap_or_default();
        Self {
            z_index: t.z_index,
            pulse: t.pulse.is_some(),
            pulse_period_ms: pulse.period.as_millis() as u64,
            pulse_min_opacity: pulse.min_opacity,
            transition_ms: t.transition.as_millis() as u64,
            scroll_into_view: true,
        }
    }
}

/// Completion persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Completion file. `None` keeps completion in memory only.
    pub path: Option<PathBuf>,
}

/// Tour source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    /// TOML or JSON catalog replacing the bundled tours.
    pub path: Option<PathBuf>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
        }
    }
}

impl WayfinderConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Load a `.json` or TOML file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_file(path)?,
            _ => Self::from_toml_file(path)?,
        };
        config.check()?;
        Ok(config)
    }

    /// [`validate`](Self::validate) as a `Result`.
    pub fn check(&self) -> Result<(), ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let p = &self.placement;
        for (name, value, min) in [
            ("popup_width", p.popup_width, 1),
            ("popup_height", p.popup_height, 1),
            ("gap", p.gap, 0),
            ("margin", p.margin, 0),
        ] {
            if !(min..=MAX_EXTENT).contains(&value) {
                errors.push(format!(
                    "placement.{name} must be in [{min}, {MAX_EXTENT}], got {value}"
                ));
            }
        }

        if self.highlight.pulse && self.highlight.pulse_period_ms == 0 {
            errors.push("highlight.pulse_period_ms must be > 0 when pulse is enabled".into());
        }
        if !(0.0..=1.0).contains(&self.highlight.pulse_min_opacity) {
            errors.push(format!(
                "highlight.pulse_min_opacity must be in [0, 1], got {}",
                self.highlight.pulse_min_opacity
            ));
        }

        if self.logging.level.trim().is_empty() {
            errors.push("logging.level must not be empty".into());
        }

        errors
    }

    /// Placement parameters for the overlay.
    #[must_use]
    pub fn to_placement_config(&self) -> PlacementConfig {
        PlacementConfig::default()
            .popup(Size::new(
                self.placement.popup_width,
                self.placement.popup_height,
            ))
            .gap(self.placement.gap)
            .margin(self.placement.margin)
    }

    #[must_use]
    pub fn to_highlight_treatment(&self) -> HighlightTreatment {
        let h = &self.highlight;
        HighlightTreatment {
            z_index: h.z_index,
            pulse: h.pulse.then(|| Pulse {
                period: Duration::from_millis(h.pulse_period_ms),
                min_opacity: h.pulse_min_opacity,
            }),
            transition: Duration::from_millis(h.transition_ms),
            ..HighlightTreatment::default()
        }
    }

    #[must_use]
    pub fn to_highlighter(&self) -> Highlighter {
        Highlighter::new(self.to_highlight_treatment()).scroll(
            self.highlight
                .scroll_into_view
                .then(ScrollOptions::default),
        )
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
