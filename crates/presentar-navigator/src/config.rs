//! Navigator configuration, loadable from TOML.
//!
//! ```toml
//! initial_route = "/inbox/42"
//! max_frame_delta_ms = 100
//!
//! [page_transition]
//! duration_ms = 300
//! curve = "fast_out_slow_in"
//!
//! [popup_transition]
//! duration_ms = 150
//! reverse_duration_ms = 75
//! ```

use crate::error::ConfigError;
use crate::route::RouteKind;
use crate::transition::TransitionSpec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Upper bound accepted for any transition duration.
const MAX_TRANSITION_MS: u64 = 60_000;

/// Settings of a [`Navigator`](crate::Navigator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Route name the initial stack is generated from.
    pub initial_route: String,
    /// Transition for pages without their own.
    pub page_transition: TransitionSpec,
    /// Transition for popups without their own.
    pub popup_transition: TransitionSpec,
    /// Longest time step a single tick advances animations by.
    pub max_frame_delta_ms: u64,
    /// Frames [`Navigator::settle`](crate::Navigator::settle) runs before giving up.
    pub settle_frame_limit: u32,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            initial_route: "/".to_string(),
            page_transition: TransitionSpec::page(),
            popup_transition: TransitionSpec::popup(),
            max_frame_delta_ms: 100,
            settle_frame_limit: 600,
        }
    }
}

impl NavigatorConfig {
    /// Default config file name.
    pub const CONFIG_FILE: &'static str = "navigator.toml";

    #[must_use]
    pub fn with_initial_route(mut self, initial_route: impl Into<String>) -> Self {
        self.initial_route = initial_route.into();
        self
    }

    #[must_use]
    pub const fn with_page_transition(mut self, spec: TransitionSpec) -> Self {
        self.page_transition = spec;
        self
    }

    #[must_use]
    pub const fn with_popup_transition(mut self, spec: TransitionSpec) -> Self {
        self.popup_transition = spec;
        self
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is malformed or a value is out of range.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string.
    #[must_use]
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Load from a file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_route.is_empty() {
            return Err(ConfigError::Invalid("initial_route must not be empty".into()));
        }
        if self.max_frame_delta_ms == 0 {
            return Err(ConfigError::Invalid("max_frame_delta_ms must be positive".into()));
        }
        if self.settle_frame_limit == 0 {
            return Err(ConfigError::Invalid("settle_frame_limit must be positive".into()));
        }
        for (field, spec) in [
            ("page_transition", &self.page_transition),
            ("popup_transition", &self.popup_transition),
        ] {
            let longest = spec.duration_ms.max(spec.reverse_duration_ms.unwrap_or(0));
            if longest > MAX_TRANSITION_MS {
                return Err(ConfigError::Invalid(format!(
                    "{field} duration {longest}ms exceeds {MAX_TRANSITION_MS}ms"
                )));
            }
        }
        Ok(())
    }

    /// Transition used for routes of `kind` that bring none of their own.
    #[must_use]
    pub fn transition_for(&self, kind: RouteKind) -> TransitionSpec {
        match kind {
            RouteKind::Popup { .. } => self.popup_transition,
            RouteKind::Page { .. } | RouteKind::Plain => self.page_transition,
        }
    }

    #[must_use]
    pub const fn max_frame_delta(&self) -> Duration {
        Duration::from_millis(self.max_frame_delta_ms)
    }
}
