//! Behavior configuration.
//!
//! Handles loading, validating, and merging `pagewire.toml`. Stock defaults
//! are the base layer; a user file overrides only the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [carousel]
//! interval_ms = 4000          # Period between rotations
//! card_class = "stack-card"   # Class identifying hero cards
//!
//! [carousel.roles]
//! front = "front"
//! middle = "middle"
//! back = "back"
//!
//! [modals]
//! modal_class = "modal"       # Class identifying modal overlays
//! active_class = "active"     # Marker for a displayed modal
//! cancel_key = "Escape"       # Key that closes the active modal
//! scroll_lock = "unconditional"  # or "ref-counted"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE: &str = "pagewire.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BehaviorConfig {
    /// Stacked hero carousel settings.
    pub carousel: CarouselConfig,
    /// Modal overlay settings.
    pub modals: ModalConfig,
}

impl BehaviorConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.carousel.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "carousel.interval_ms must be greater than 0".into(),
            ));
        }
        check_class("carousel.card_class", &self.carousel.card_class)?;
        let roles = &self.carousel.roles;
        check_class("carousel.roles.front", &roles.front)?;
        check_class("carousel.roles.middle", &roles.middle)?;
        check_class("carousel.roles.back", &roles.back)?;
        if roles.front == roles.middle || roles.front == roles.back || roles.middle == roles.back
        {
            return Err(ConfigError::Validation(
                "carousel.roles front, middle and back must be distinct".into(),
            ));
        }
        let card = &self.carousel.card_class;
        for (key, value) in [
            ("carousel.roles.front", &roles.front),
            ("carousel.roles.middle", &roles.middle),
            ("carousel.roles.back", &roles.back),
        ] {
            if value == card {
                return Err(ConfigError::Validation(format!(
                    "{key} must differ from carousel.card_class '{card}'"
                )));
            }
        }
        check_class("modals.modal_class", &self.modals.modal_class)?;
        check_class("modals.active_class", &self.modals.active_class)?;
        if self.modals.modal_class == self.modals.active_class {
            return Err(ConfigError::Validation(
                "modals.modal_class and modals.active_class must differ".into(),
            ));
        }
        for (key, value) in [
            ("modals.modal_class", &self.modals.modal_class),
            ("modals.active_class", &self.modals.active_class),
        ] {
            if value == card {
                return Err(ConfigError::Validation(format!(
                    "{key} must differ from carousel.card_class '{card}'"
                )));
            }
        }
        if self.modals.cancel_key.is_empty() {
            return Err(ConfigError::Validation(
                "modals.cancel_key must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn check_class(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{key} must not be empty")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "{key} must be a single class name, got '{value}'"
        )));
    }
    Ok(())
}

/// Carousel rotation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarouselConfig {
    /// Milliseconds between ticks.
    pub interval_ms: u64,
    /// Class that marks an element as a carousel card.
    pub card_class: String,
    /// Class names for the three visual roles.
    pub roles: RoleClasses,
}

impl CarouselConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            interval_ms: 4000,
            card_class: "stack-card".to_string(),
            roles: RoleClasses::default(),
        }
    }
}

/// Role marker class names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoleClasses {
    pub front: String,
    pub middle: String,
    pub back: String,
}

impl Default for RoleClasses {
    fn default() -> Self {
        Self {
            front: "front".to_string(),
            middle: "middle".to_string(),
            back: "back".to_string(),
        }
    }
}

/// How closing a modal treats the page scroll lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScrollLockPolicy {
    /// Every close unlocks scrolling, even if other modals are still open.
    #[default]
    Unconditional,
    /// Scrolling unlocks only once no modal remains open.
    RefCounted,
}

/// Modal overlay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModalConfig {
    /// Class that marks an element as a modal overlay.
    pub modal_class: String,
    /// Class that marks a modal as displayed.
    pub active_class: String,
    /// `KeyboardEvent.key` value that closes the active modal.
    pub cancel_key: String,
    pub scroll_lock: ScrollLockPolicy,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            modal_class: "modal".to_string(),
            active_class: "active".to_string(),
            cancel_key: "Escape".to_string(),
            scroll_lock: ScrollLockPolicy::Unconditional,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BehaviorConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BehaviorConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BehaviorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `pagewire.toml` from `dir`, falling back to stock defaults.
pub fn load_config(dir: &Path) -> Result<BehaviorConfig, ConfigError> {
    load_config_file(&dir.join(CONFIG_FILE))
}

/// Load a specific config file, falling back to stock defaults if absent.
pub fn load_config_file(path: &Path) -> Result<BehaviorConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `pagewire.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# pagewire configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Stacked hero carousel
# ---------------------------------------------------------------------------
[carousel]
# Milliseconds between rotations. Must be greater than 0.
interval_ms = 4000

# Class identifying the cards of the stack, in document order.
card_class = "stack-card"

# Class names assigned to the three visible cards on every rotation.
# They must be distinct.
[carousel.roles]
front = "front"
middle = "middle"
back = "back"

# ---------------------------------------------------------------------------
# Modal overlays
# ---------------------------------------------------------------------------
[modals]
# Class identifying modal overlay elements.
modal_class = "modal"

# Class marking a modal as displayed.
active_class = "active"

# KeyboardEvent.key value that closes the displayed modal.
cancel_key = "Escape"

# What closing a modal does to the page scroll lock:
#   "unconditional" - any close unlocks scrolling (even with other modals open)
#   "ref-counted"   - scrolling unlocks when the last open modal closes
scroll_lock = "unconditional"
"##
}
