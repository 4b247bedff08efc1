//! Immutable route identity: a name plus opaque arguments.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Name and arguments a route was created with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    arguments: Option<Value>,
}

impl RouteSettings {
    /// Settings with neither name nor arguments.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            name: None,
            arguments: None,
        }
    }

    /// Settings for a named route.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            arguments: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_arguments(mut self, arguments: Option<Value>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Copy, replacing only the fields that are given.
    #[must_use]
    pub fn copy_with(&self, name: Option<&str>, arguments: Option<Value>) -> Self {
        Self {
            name: name.map(str::to_owned).or_else(|| self.name.clone()),
            arguments: arguments.or_else(|| self.arguments.clone()),
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn arguments(&self) -> Option<&Value> {
        self.arguments.as_ref()
    }
}

impl fmt::Display for RouteSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, &self.arguments) {
            (Some(name), Some(arguments)) => write!(f, "RouteSettings({name:?}, {arguments})"),
            (Some(name), None) => write!(f, "RouteSettings({name:?})"),
            (None, Some(arguments)) => write!(f, "RouteSettings(<unnamed>, {arguments})"),
            (None, None) => f.write_str("RouteSettings(<unnamed>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_settings_default_is_empty() {
        let settings = RouteSettings::new();
        assert_eq!(settings.name(), None);
        assert_eq!(settings.arguments(), None);
        assert_eq!(settings, RouteSettings::default());
    }

    #[test]
    fn test_settings_copy_with_keeps_unspecified() {
        let settings = RouteSettings::named("/a").with_arguments(Some(json!({ "id": 1 })));

        let renamed = settings.copy_with(Some("/b"), None);
        assert_eq!(renamed.name(), Some("/b"));
        assert_eq!(renamed.arguments(), Some(&json!({ "id": 1 })));

        let rebound = settings.copy_with(None, Some(json!(2)));
        assert_eq!(rebound.name(), Some("/a"));
        assert_eq!(rebound.arguments(), Some(&json!(2)));

        // The source settings are untouched.
        assert_eq!(settings.name(), Some("/a"));
    }

    #[test]
    fn test_settings_value_equality() {
        assert_eq!(RouteSettings::named("/a"), RouteSettings::new().with_name("/a"));
        assert_ne!(RouteSettings::named("/a"), RouteSettings::named("/b"));
    }

    #[test]
    fn test_settings_display() {
        assert_eq!(RouteSettings::named("/a").to_string(), "RouteSettings(\"/a\")");
        assert_eq!(
            RouteSettings::named("/a").with_arguments(Some(json!(1))).to_string(),
            "RouteSettings(\"/a\", 1)"
        );
        assert_eq!(RouteSettings::new().to_string(), "RouteSettings(<unnamed>)");
    }

    #[test]
    fn test_settings_serde() {
        let settings = RouteSettings::named("/detail").with_arguments(Some(json!({ "id": 7 })));
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(json, r#"{"name":"/detail","arguments":{"id":7}}"#);
        let parsed: RouteSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);

        let empty: RouteSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, RouteSettings::new());
    }
}
