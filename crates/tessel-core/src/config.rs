#![forbid(unsafe_code)]

//! Grid configuration.
//!
//! [`GridConfig`] gathers every tunable of the engine: grid dimensions,
//! scheduler and animation timing, item size bounds, and the responsive
//! breakpoint table. `GridConfig::default()` reproduces the stock 12-column
//! dashboard.
//!
//! # Sources
//!
//! - Builder setters on a default config.
//! - Environment variables via [`GridConfig::from_env`]:
//!
//! | Variable | Field |
//! |---|---|
//! | `TESSEL_COLUMNS` | `columns` |
//! | `TESSEL_MAX_ROWS` | `max_rows` |
//! | `TESSEL_DEBOUNCE_MS` | `debounce_ms` |
//! | `TESSEL_ANIMATION_MS` | `animation_duration_ms` |
//! | `TESSEL_DISABLE_ANIMATIONS` | `enable_animations = false` |
//! | `TESSEL_DISABLE_KEYBOARD_NAV` | `enable_keyboard_nav = false` |
//!
//! - JSON strings (always), TOML strings and files (feature `config-files`).
//!
//! ```toml
//! columns = 12
//! debounce_ms = 150
//! easing = "ease-out"
//!
//! [[breakpoints]]
//! name = "md"
//! min_width = 768
//! columns = 8
//! gap_rem = 1.0
//! ```
//!
//! # Failure Modes
//!
//! Parse errors and validation failures surface as [`ConfigError`].
//! Unparseable environment values are ignored and the default is kept.

#[cfg(feature = "config-files")]
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::geometry::{DEFAULT_COLUMNS, DEFAULT_MAX_ROWS, GridSize};

/// Default debounce wait for layout notifications, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Default FLIP transition duration, in milliseconds.
pub const DEFAULT_ANIMATION_MS: u64 = 200;

/// Upper bound accepted for `debounce_ms` by [`GridConfig::validated`].
const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Upper bound accepted for `animation_duration_ms` by [`GridConfig::validated`].
const MAX_ANIMATION_MS: u64 = 5_000;

// ---------------------------------------------------------------------------
// Breakpoints
// ---------------------------------------------------------------------------

/// A responsive breakpoint: from `min_width` pixels upward the grid uses
/// `columns` columns separated by `gap_rem`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridBreakpoint {
    /// Short name (`sm`, `md`, ...).
    pub name: String,
    /// Minimum container width in pixels at which this breakpoint applies.
    pub min_width: u32,
    /// Column count at this breakpoint.
    pub columns: u16,
    /// Gap between cells in rem.
    pub gap_rem: f64,
}

impl GridBreakpoint {
    /// Create a breakpoint.
    pub fn new(name: impl Into<String>, min_width: u32, columns: u16, gap_rem: f64) -> Self {
        Self {
            name: name.into(),
            min_width,
            columns,
            gap_rem,
        }
    }

    /// Gap in pixels for a given root font size.
    pub fn gap_px(&self, root_font_px: f64) -> f64 {
        self.gap_rem * root_font_px
    }
}

fn default_breakpoints() -> Vec<GridBreakpoint> {
    vec![
        GridBreakpoint::new("sm", 640, DEFAULT_COLUMNS, 0.75),
        GridBreakpoint::new("md", 768, DEFAULT_COLUMNS, 1.0),
        GridBreakpoint::new("lg", 1024, DEFAULT_COLUMNS, 1.25),
        GridBreakpoint::new("xl", 1280, DEFAULT_COLUMNS, 1.5),
    ]
}

// ---------------------------------------------------------------------------
// GridConfig
// ---------------------------------------------------------------------------

/// Engine-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of grid columns.
    pub columns: u16,
    /// Rows searched by placement scans before giving up.
    pub max_rows: u16,
    /// Debounce wait for layout change notifications.
    pub debounce_ms: u64,
    /// FLIP transition duration.
    pub animation_duration_ms: u64,
    /// FLIP transition curve.
    pub easing: Easing,
    /// Whether position changes are animated.
    pub enable_animations: bool,
    /// Whether the keyboard controller reacts to keys.
    pub enable_keyboard_nav: bool,
    /// Size given to newly inserted items.
    pub default_item_size: GridSize,
    /// Smallest size any item may be resized to.
    pub min_item_size: GridSize,
    /// Largest size any item may be resized to.
    pub max_item_size: GridSize,
    /// Responsive breakpoints, any order.
    pub breakpoints: Vec<GridBreakpoint>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            max_rows: DEFAULT_MAX_ROWS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            animation_duration_ms: DEFAULT_ANIMATION_MS,
            easing: Easing::STANDARD,
            enable_animations: true,
            enable_keyboard_nav: true,
            default_item_size: GridSize::new(4, 3),
            min_item_size: GridSize::new(1, 1),
            max_item_size: GridSize::new(DEFAULT_COLUMNS, DEFAULT_COLUMNS),
            breakpoints: default_breakpoints(),
        }
    }
}

impl GridConfig {
    /// Set the column count (builder pattern).
    #[must_use]
    pub fn with_columns(mut self, columns: u16) -> Self {
        self.columns = columns;
        self
    }

    /// Set the placement scan row bound (builder pattern).
    #[must_use]
    pub fn with_max_rows(mut self, max_rows: u16) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Set the debounce wait (builder pattern).
    #[must_use]
    pub fn with_debounce(mut self, wait: Duration) -> Self {
        self.debounce_ms = duration_ms(wait);
        self
    }

    /// Set the animation duration (builder pattern).
    #[must_use]
    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration_ms = duration_ms(duration);
        self
    }

    /// Set the easing curve (builder pattern).
    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Enable or disable animations (builder pattern).
    #[must_use]
    pub fn with_animations(mut self, enabled: bool) -> Self {
        self.enable_animations = enabled;
        self
    }

    /// Enable or disable keyboard navigation (builder pattern).
    #[must_use]
    pub fn with_keyboard_nav(mut self, enabled: bool) -> Self {
        self.enable_keyboard_nav = enabled;
        self
    }

    /// Set the item size bounds (builder pattern).
    #[must_use]
    pub fn with_item_bounds(mut self, min: GridSize, max: GridSize) -> Self {
        self.min_item_size = min;
        self.max_item_size = max;
        self
    }

    /// Set the default size for new items (builder pattern).
    #[must_use]
    pub fn with_default_item_size(mut self, size: GridSize) -> Self {
        self.default_item_size = size;
        self
    }

    /// Replace the breakpoint table (builder pattern).
    #[must_use]
    pub fn with_breakpoints(mut self, breakpoints: Vec<GridBreakpoint>) -> Self {
        self.breakpoints = breakpoints;
        self
    }

    /// Debounce wait as a [`Duration`].
    #[inline]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Animation duration as a [`Duration`].
    #[inline]
    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    /// The widest breakpoint whose `min_width` does not exceed `width`.
    pub fn breakpoint_for(&self, width: u32) -> Option<&GridBreakpoint> {
        self.breakpoints
            .iter()
            .filter(|bp| bp.min_width <= width)
            .max_by_key(|bp| bp.min_width)
    }

    /// Column count in effect at a container width.
    ///
    /// Falls back to [`GridConfig::columns`] below the smallest breakpoint.
    pub fn columns_for(&self, width: u32) -> u16 {
        self.breakpoint_for(width)
            .map_or(self.columns, |bp| bp.columns.max(1))
    }

    /// Clamp a size into the configured item bounds.
    pub fn clamp_item_size(&self, size: GridSize) -> GridSize {
        size.clamp(self.min_item_size, self.max_item_size)
    }

    /// Create a config from environment variables on top of the defaults.
    ///
    /// The result is passed through [`GridConfig::validated`].
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`GridConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup("TESSEL_COLUMNS")
            && let Ok(columns) = val.trim().parse::<u16>()
        {
            config.columns = columns;
        }

        if let Some(val) = lookup("TESSEL_MAX_ROWS")
            && let Ok(rows) = val.trim().parse::<u16>()
        {
            config.max_rows = rows;
        }

        if let Some(val) = lookup("TESSEL_DEBOUNCE_MS")
            && let Ok(ms) = val.trim().parse::<u64>()
        {
            config.debounce_ms = ms;
        }

        if let Some(val) = lookup("TESSEL_ANIMATION_MS")
            && let Ok(ms) = val.trim().parse::<u64>()
        {
            config.animation_duration_ms = ms;
        }

        if let Some(val) = lookup("TESSEL_DISABLE_ANIMATIONS") {
            config.enable_animations = !is_truthy(&val);
        }

        if let Some(val) = lookup("TESSEL_DISABLE_KEYBOARD_NAV") {
            config.enable_keyboard_nav = !is_truthy(&val);
        }

        config.validated()
    }

    /// Validate and clamp values to safe ranges.
    ///
    /// Returns a new config with:
    /// - `columns` and `max_rows` at least 1
    /// - `debounce_ms` at most 10s, `animation_duration_ms` at most 5s
    /// - `min_item_size` at least 1×1, `max_item_size` no smaller than it
    ///   and no wider than `columns`
    /// - `default_item_size` inside the item bounds
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.columns = self.columns.max(1);
        self.max_rows = self.max_rows.max(1);
        self.debounce_ms = self.debounce_ms.min(MAX_DEBOUNCE_MS);
        self.animation_duration_ms = self.animation_duration_ms.min(MAX_ANIMATION_MS);

        self.min_item_size = GridSize::new(
            self.min_item_size.width.clamp(1, self.columns),
            self.min_item_size.height.max(1),
        );
        self.max_item_size = GridSize::new(
            self.max_item_size
                .width
                .clamp(self.min_item_size.width, self.columns),
            self.max_item_size.height.max(self.min_item_size.height),
        );
        self.default_item_size = self.clamp_item_size(self.default_item_size);

        for bp in &mut self.breakpoints {
            bp.columns = bp.columns.max(1);
            if !bp.gap_rem.is_finite() || bp.gap_rem < 0.0 {
                bp.gap_rem = 0.0;
            }
        }
        self
    }

    /// Check every parameter.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.columns == 0 {
            errors.push("columns must be > 0".into());
        }
        if self.max_rows == 0 {
            errors.push("max_rows must be > 0".into());
        }
        if self.debounce_ms > MAX_DEBOUNCE_MS {
            errors.push(format!(
                "debounce_ms must be <= {MAX_DEBOUNCE_MS}, got {}",
                self.debounce_ms
            ));
        }
        if self.animation_duration_ms > MAX_ANIMATION_MS {
            errors.push(format!(
                "animation_duration_ms must be <= {MAX_ANIMATION_MS}, got {}",
                self.animation_duration_ms
            ));
        }
        if self.min_item_size.width == 0 || self.min_item_size.height == 0 {
            errors.push("min_item_size must be at least 1x1".into());
        }
        if self.max_item_size.width < self.min_item_size.width
            || self.max_item_size.height < self.min_item_size.height
        {
            errors.push(format!(
                "max_item_size {}x{} is smaller than min_item_size {}x{}",
                self.max_item_size.width,
                self.max_item_size.height,
                self.min_item_size.width,
                self.min_item_size.height
            ));
        }
        if self.clamp_item_size(self.default_item_size) != self.default_item_size {
            errors.push("default_item_size is outside the item size bounds".into());
        }
        for bp in &self.breakpoints {
            if bp.columns == 0 {
                errors.push(format!("breakpoint {:?} must have columns > 0", bp.name));
            }
            if !bp.gap_rem.is_finite() || bp.gap_rem < 0.0 {
                errors.push(format!(
                    "breakpoint {:?} gap_rem must be finite and >= 0, got {}",
                    bp.name, bp.gap_rem
                ));
            }
        }

        errors
    }

    /// Load from a JSON string and validate.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.checked()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config-files")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Load from a TOML string and validate.
    #[cfg(feature = "config-files")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.checked()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-files")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    fn checked(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

fn is_truthy(val: &str) -> bool {
    let val = val.trim();
    val == "1" || val.eq_ignore_ascii_case("true") || val.eq_ignore_ascii_case("yes")
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from loading a [`GridConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config-files")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON parse error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// Validation errors.
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_stock_dashboard() {
        let c = GridConfig::default();
        assert_eq!(c.columns, 12);
        assert_eq!(c.max_rows, 100);
        assert_eq!(c.debounce(), Duration::from_millis(200));
        assert_eq!(c.animation_duration(), Duration::from_millis(200));
        assert_eq!(c.easing, Easing::STANDARD);
        assert_eq!(c.default_item_size, GridSize::new(4, 3));
        assert_eq!(c.max_item_size, GridSize::new(12, 12));
        assert!(c.validate().is_empty());
    }

    #[test]
    fn breakpoint_lookup_picks_widest_match() {
        let c = GridConfig::default();
        assert!(c.breakpoint_for(320).is_none());
        assert_eq!(c.breakpoint_for(640).map(|b| b.name.as_str()), Some("sm"));
        assert_eq!(c.breakpoint_for(1100).map(|b| b.name.as_str()), Some("lg"));
        assert_eq!(c.breakpoint_for(4000).map(|b| b.name.as_str()), Some("xl"));
        assert_eq!(c.breakpoint_for(800).map(|b| b.gap_px(16.0)), Some(16.0));
    }

    #[test]
    fn columns_for_falls_back_to_config_columns() {
        let c = GridConfig::default()
            .with_columns(6)
            .with_breakpoints(vec![GridBreakpoint::new("wide", 1000, 12, 1.0)]);
        assert_eq!(c.columns_for(500), 6);
        assert_eq!(c.columns_for(1000), 12);
    }

    #[test]
    fn from_lookup_reads_variables() {
        let c = GridConfig::from_lookup(env(&[
            ("TESSEL_COLUMNS", "8"),
            ("TESSEL_DEBOUNCE_MS", " 50 "),
            ("TESSEL_DISABLE_ANIMATIONS", "true"),
            ("TESSEL_DISABLE_KEYBOARD_NAV", "0"),
        ]));
        assert_eq!(c.columns, 8);
        assert_eq!(c.debounce_ms, 50);
        assert!(!c.enable_animations);
        assert!(c.enable_keyboard_nav);
        // Clamped to the narrower grid.
        assert_eq!(c.max_item_size.width, 8);
    }

    #[test]
    fn from_lookup_ignores_garbage() {
        let c = GridConfig::from_lookup(env(&[
            ("TESSEL_COLUMNS", "twelve"),
            ("TESSEL_ANIMATION_MS", "-3"),
        ]));
        assert_eq!(c.columns, 12);
        assert_eq!(c.animation_duration_ms, DEFAULT_ANIMATION_MS);
    }

    #[test]
    fn validated_clamps_ranges() {
        let c = GridConfig::default()
            .with_columns(0)
            .with_max_rows(0)
            .with_debounce(Duration::from_secs(60))
            .with_item_bounds(GridSize::new(0, 0), GridSize::new(20, 0))
            .with_default_item_size(GridSize::new(9, 9))
            .validated();
        assert_eq!(c.columns, 1);
        assert_eq!(c.max_rows, 1);
        assert_eq!(c.debounce_ms, 10_000);
        assert_eq!(c.min_item_size, GridSize::new(1, 1));
        assert_eq!(c.max_item_size, GridSize::new(1, 1));
        assert_eq!(c.default_item_size, GridSize::new(1, 1));
        assert!(c.validate().is_empty());
    }

    #[test]
    fn validate_reports_problems() {
        let c = GridConfig::default()
            .with_columns(0)
            .with_item_bounds(GridSize::new(3, 3), GridSize::new(2, 2));
        let errors = c.validate();
        assert!(errors.iter().any(|e| e.contains("columns must be > 0")));
        assert!(errors.iter().any(|e| e.contains("smaller than min_item_size")));
    }

    #[test]
    fn json_partial_document_uses_defaults() {
        let c = GridConfig::from_json_str(r#"{"columns": 10, "easing": "ease-out"}"#).unwrap();
        assert_eq!(c.columns, 10);
        assert_eq!(c.easing, Easing::EaseOut);
        assert_eq!(c.debounce_ms, DEFAULT_DEBOUNCE_MS);
        // Loaders check without clamping; `validated()` narrows the bound.
        assert_eq!(c.max_item_size, GridSize::new(12, 12));
        assert_eq!(c.validated().max_item_size, GridSize::new(10, 12));
    }

    #[test]
    fn json_errors_are_typed() {
        assert!(matches!(
            GridConfig::from_json_str("{columns:"),
            Err(ConfigError::Json(_))
        ));
        let err = GridConfig::from_json_str(r#"{"max_rows": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref v) if v.len() == 1));
        assert!(err.to_string().contains("max_rows must be > 0"));
    }

    #[cfg(feature = "config-files")]
    #[test]
    fn toml_file_round_trip() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
columns = 12
debounce_ms = 150
easing = {{ cubic-bezier = [0.25, 0.1, 0.25, 1.0] }}

[[breakpoints]]
name = "md"
min_width = 768
columns = 8
gap_rem = 1.0
"#
        )
        .unwrap();

        let c = GridConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(c.debounce_ms, 150);
        assert_eq!(c.easing, Easing::CubicBezier(0.25, 0.1, 0.25, 1.0));
        assert_eq!(c.breakpoints.len(), 1);
        assert_eq!(c.columns_for(900), 8);
    }

    #[cfg(feature = "config-files")]
    #[test]
    fn missing_file_is_io_error() {
        let err = GridConfig::from_toml_file("/nonexistent/tessel.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
