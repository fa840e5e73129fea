//! Marker configuration system
//!
//! This crate provides centralized configuration for the highlight marker
//! reveal, loading settings from `marker.toml` with environment variable
//! overrides. Every value here is a default: per-element directives on the
//! page take precedence at build time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "marker.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MarkerConfig {
    /// Fallback values for the per-element directives
    pub defaults: DirectiveDefaults,
    /// Named theme colors (`pink`, `white`, ...)
    pub themes: ThemePalette,
    /// Bar animation constants
    pub bar: BarConfig,
    /// Startup readiness settings
    pub bootstrap: BootstrapConfig,
    /// Attribute and class names used on the page
    pub markup: MarkupConfig,
}

/// Defaults applied when a directive attribute is missing or invalid
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectiveDefaults {
    /// Wipe direction: right, left, up or down
    pub direction: String,
    /// Theme key, custom property reference or literal color
    pub theme: String,
    /// Scroll position spec, `<element-edge> <viewport-edge>`
    pub scroll_start: String,
    /// Which end of the block starts the stagger: start or end
    pub stagger_start: String,
    /// Delay between consecutive lines in milliseconds
    pub stagger_ms: f64,
}

/// Theme key to color mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemePalette(pub BTreeMap<String, String>);

/// Bar tween settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BarConfig {
    /// Tween duration in seconds
    pub duration_seconds: f64,
    /// Easing name, e.g. `power3.inOut` or `ease-out`
    pub ease: String,
}

/// Bootstrap gate settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Interval between collaborator availability checks
    pub poll_interval_ms: u64,
    /// Give up waiting for readiness after this long
    pub timeout_ms: u64,
    /// Force the reduced-motion preference instead of asking the host
    pub reduced_motion: Option<bool>,
}

/// Markup contract
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    pub presence_attribute: String,
    pub direction_attribute: String,
    pub theme_attribute: String,
    pub scroll_start_attribute: String,
    pub stagger_start_attribute: String,
    pub stagger_attribute: String,
    /// Class given to each line wrapper produced by the splitter
    pub line_class: String,
    /// Class given to each covering bar
    pub bar_class: String,
}

impl Default for DirectiveDefaults {
    fn default() -> Self {
        Self {
            direction: "right".to_string(),
            theme: "pink".to_string(),
            scroll_start: "top 90%".to_string(),
            stagger_start: "start".to_string(),
            stagger_ms: 100.0,
        }
    }
}

/// Themes every palette knows, even when a config file replaces the table.
const BUILTIN_THEMES: &[(&str, &str)] = &[("pink", "#C700EF"), ("white", "#FFFFFF")];

impl Default for ThemePalette {
    fn default() -> Self {
        Self(
            BUILTIN_THEMES
                .iter()
                .map(|(key, color)| (key.to_string(), color.to_string()))
                .collect(),
        )
    }
}

impl ThemePalette {
    /// Look up the color for a theme key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str).or_else(|| {
            BUILTIN_THEMES
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, color)| *color)
        })
    }

    /// Add or replace a theme color.
    pub fn insert(&mut self, key: impl Into<String>, color: impl Into<String>) {
        self.0.insert(key.into(), color.into());
    }
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 0.6,
            ease: "power3.inOut".to_string(),
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 50,
            timeout_ms: 10_000,
            reduced_motion: None,
        }
    }
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            presence_attribute: "data-highlight-marker-reveal".to_string(),
            direction_attribute: "data-marker-direction".to_string(),
            theme_attribute: "data-marker-theme".to_string(),
            scroll_start_attribute: "data-marker-scroll-start".to_string(),
            stagger_start_attribute: "data-marker-stagger-start".to_string(),
            stagger_attribute: "data-marker-stagger".to_string(),
            line_class: "highlight-marker-line".to_string(),
            bar_class: "highlight-marker-bar".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl MarkerConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `marker.toml` from the current directory, or return the default
    /// configuration if it is missing or malformed.
    pub fn load_or_default() -> Self {
        match Self::load_from_file(CONFIG_FILE) {
            Ok(config) => config,
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Self::default()
            }
            Err(error) => {
                warn!(%error, "ignoring unusable config file");
                Self::default()
            }
        }
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        if let Ok(direction) = std::env::var("MARKER_DIRECTION") {
            self.defaults.direction = direction;
        }
        if let Ok(theme) = std::env::var("MARKER_THEME") {
            self.defaults.theme = theme;
        }
        if let Ok(start) = std::env::var("MARKER_SCROLL_START") {
            self.defaults.scroll_start = start;
        }
        if let Ok(policy) = std::env::var("MARKER_STAGGER_START") {
            self.defaults.stagger_start = policy;
        }
        if let Ok(val) = std::env::var("MARKER_STAGGER_MS") {
            match val.trim().parse::<f64>() {
                Ok(ms) if ms.is_finite() && ms >= 0.0 => self.defaults.stagger_ms = ms,
                _ => warn!(value = %val, "ignoring invalid MARKER_STAGGER_MS"),
            }
        }
        if let Ok(val) = std::env::var("MARKER_POLL_INTERVAL_MS") {
            if let Ok(ms) = val.trim().parse::<u64>() {
                self.bootstrap.poll_interval_ms = ms;
            }
        }
        if let Ok(val) = std::env::var("MARKER_BOOTSTRAP_TIMEOUT_MS") {
            if let Ok(ms) = val.trim().parse::<u64>() {
                self.bootstrap.timeout_ms = ms;
            }
        }
        if let Ok(val) = std::env::var("MARKER_REDUCED_MOTION") {
            self.bootstrap.reduced_motion = Some(val == "1" || val.eq_ignore_ascii_case("true"));
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from marker.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = MarkerConfig::default();
        assert_eq!(config.defaults.direction, "right");
        assert_eq!(config.defaults.theme, "pink");
        assert_eq!(config.defaults.scroll_start, "top 90%");
        assert_eq!(config.defaults.stagger_start, "start");
        assert_eq!(config.defaults.stagger_ms, 100.0);
        assert_eq!(config.themes.get("pink"), Some("#C700EF"));
        assert_eq!(config.themes.get("white"), Some("#FFFFFF"));
        assert_eq!(config.bar.duration_seconds, 0.6);
        assert_eq!(config.bar.ease, "power3.inOut");
        assert_eq!(config.bootstrap.poll_interval_ms, 50);
        assert_eq!(config.markup.bar_class, "highlight-marker-bar");
        assert_eq!(config.markup.line_class, "highlight-marker-line");
    }

    #[test]
    fn test_toml_serialization() {
        let config = MarkerConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: MarkerConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.themes.get("pink"), Some("#C700EF"));
        assert_eq!(parsed.bootstrap.timeout_ms, 10_000);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[defaults]\nstagger_ms = 250\n\n[themes]\nteal = \"#00A3A3\"\n"
        )
        .unwrap();

        let config = MarkerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.defaults.stagger_ms, 250.0);
        assert_eq!(config.defaults.direction, "right");
        assert_eq!(config.themes.get("teal"), Some("#00A3A3"));
        assert_eq!(config.themes.get("pink"), Some("#C700EF"));
        assert_eq!(config.bar.ease, "power3.inOut");
    }

    #[test]
    fn test_malformed_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[defaults\nstagger_ms = ").unwrap();
        let err = MarkerConfig::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_reports_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = MarkerConfig::load_from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_merge_with_env() {
        unsafe {
            std::env::set_var("MARKER_DIRECTION", "up");
            std::env::set_var("MARKER_STAGGER_MS", "-5");
            std::env::set_var("MARKER_REDUCED_MOTION", "true");
        }

        let mut config = MarkerConfig::default();
        config.merge_with_env();

        assert_eq!(config.defaults.direction, "up");
        // negative stagger is rejected, default kept
        assert_eq!(config.defaults.stagger_ms, 100.0);
        assert_eq!(config.bootstrap.reduced_motion, Some(true));

        unsafe {
            std::env::remove_var("MARKER_DIRECTION");
            std::env::remove_var("MARKER_STAGGER_MS");
            std::env::remove_var("MARKER_REDUCED_MOTION");
        }
    }
}
