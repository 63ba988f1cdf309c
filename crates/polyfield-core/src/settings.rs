//! Settings for polyfield.
//!
//! [`Settings`] holds the configuration read at start-up: debug mode and the
//! log level, used by [`setup_logging`](crate::logging::setup_logging), and
//! the installed applications that
//! [`AppRegistry::populate_installed`](crate::apps::AppRegistry::populate_installed)
//! checks the registry against.

use serde::{Deserialize, Serialize};

/// The complete set of settings.
///
/// # Examples
///
/// ```
/// use polyfield_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.log_level, "info");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Whether debug mode is enabled. Selects pretty rather than JSON logs.
    pub debug: bool,
    /// The log filter directive (e.g. "info", "polyfield=debug").
    pub log_level: String,
    /// Dotted names of the installed applications.
    pub installed_apps: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            installed_apps: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.log_level, "info");
        assert!(s.installed_apps.is_empty());
    }
}
