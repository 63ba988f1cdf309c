//! Loading [`Settings`] from configuration files and the environment.
//!
//! ## Loading order
//!
//! 1. Start with default settings.
//! 2. Merge a TOML or JSON document over them (keys absent from the
//!    document keep their defaults).
//! 3. Apply environment variable overrides.
//!
//! ## Environment variables
//!
//! | Env Var | Setting |
//! |---|---|
//! | `POLYFIELD_DEBUG` | `debug` ("true"/"1"/"yes" => true) |
//! | `POLYFIELD_LOG_LEVEL` | `log_level` |
//! | `POLYFIELD_INSTALLED_APPS` | `installed_apps` (comma-separated) |

use std::path::Path;

use crate::error::PolyError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, PolyError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| PolyError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;
    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, PolyError> {
    from_toml_str(&read_config(path.as_ref(), "TOML")?)
}

/// Loads settings from a TOML file, then applies environment overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, PolyError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
pub fn from_json_str(json_str: &str) -> Result<Settings, PolyError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| PolyError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;
    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, PolyError> {
    from_json_str(&read_config(path.as_ref(), "JSON")?)
}

/// Loads settings from the environment only, starting from defaults.
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `POLYFIELD_*` environment variable overrides.
pub fn apply_env_overrides(settings: &mut Settings) {
    apply_overrides(settings, |key| std::env::var(key).ok());
}

fn apply_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("POLYFIELD_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Some(val) = lookup("POLYFIELD_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Some(val) = lookup("POLYFIELD_INSTALLED_APPS") {
        settings.installed_apps = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

fn read_config(path: &Path, format: &str) -> Result<String, PolyError> {
    std::fs::read_to_string(path).map_err(|e| {
        PolyError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_over_defaults(value: serde_json::Value, format: &str) -> Result<Settings, PolyError> {
    let defaults = serde_json::to_value(Settings::default()).map_err(|e| {
        PolyError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;
    serde_json::from_value(merge_json(defaults, value)).map_err(|e| {
        PolyError::ConfigurationError(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Deep-merges two JSON values; `overlay` wins.
fn merge_json(base: serde_json::Value, overlay: serde_json::Value) -> serde_json::Value {
    match (base, overlay) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(overlay_map)) => {
            for (key, overlay_v) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_v) => merge_json(base_v, overlay_v),
                    None => overlay_v,
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            debug = false
            log_level = "polyfield=debug"
            installed_apps = ["project.dispatch"]
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "polyfield=debug");
        assert_eq!(settings.installed_apps, vec!["project.dispatch"]);
    }

    #[test]
    fn test_from_toml_str_empty_keeps_defaults() {
        let settings = from_toml_str("").unwrap();
        assert!(settings.debug);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let err = from_toml_str("[[invalid toml content").unwrap_err();
        assert!(matches!(err, PolyError::ConfigurationError(_)));
    }

    #[test]
    fn test_from_json_str_basic() {
        let json = r#"{ "debug": false, "installed_apps": ["dispatch", "billing"] }"#;
        let settings = from_json_str(json).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.installed_apps.len(), 2);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_from_json_str_wrong_type() {
        let err = from_json_str(r#"{ "debug": "maybe" }"#).unwrap_err();
        assert!(err.to_string().contains("deserialize settings from JSON"));
    }

    #[test]
    fn test_from_toml_file() {
        let dir = std::env::temp_dir().join("polyfield_test_toml");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(&path, "log_level = \"warn\"\n").unwrap();

        let settings = from_toml_file(&path).unwrap();
        assert_eq!(settings.log_level, "warn");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = from_json_file("/nonexistent/polyfield/settings.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read JSON file"));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("POLYFIELD_DEBUG", "0"),
            ("POLYFIELD_LOG_LEVEL", "trace"),
            ("POLYFIELD_INSTALLED_APPS", "dispatch, billing,"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        apply_overrides(&mut settings, |key| env.get(key).map(ToString::to_string));
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "trace");
        assert_eq!(settings.installed_apps, vec!["dispatch", "billing"]);
    }

    #[test]
    fn test_overrides_absent_keep_values() {
        let mut settings = Settings::default();
        apply_overrides(&mut settings, |_| None);
        assert!(settings.debug);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_merge_json_nested() {
        let base = serde_json::json!({"a": {"x": 1, "y": 2}, "b": 3});
        let overlay = serde_json::json!({"a": {"y": 20}});
        assert_eq!(
            merge_json(base, overlay),
            serde_json::json!({"a": {"x": 1, "y": 20}, "b": 3})
        );
    }
}
