//! Logging integration.
//!
//! Configures [`tracing`]-based logging from [`Settings`] and builds the spans
//! that field operations run inside.

use crate::settings::Settings;

/// Installs the global tracing subscriber described by `settings`.
///
/// The filter comes from `settings.log_level` (falling back to "info" if it
/// does not parse). Debug mode logs in a pretty, human-readable format;
/// otherwise logs are structured JSON. Installing twice is a no-op.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a span for work done by one field of one model.
///
/// # Examples
///
/// ```
/// use polyfield_core::logging::field_span;
///
/// let span = field_span("dispatch.ticket", "assignee_kind");
/// let _guard = span.enter();
/// tracing::debug!("resolving stored class name");
/// ```
pub fn field_span(model: &str, field: &str) -> tracing::Span {
    tracing::debug_span!("field", model = model, field = field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_logging_twice_is_harmless() {
        let settings = Settings {
            log_level: "not a [valid filter".into(),
            ..Settings::default()
        };
        setup_logging(&settings);
        setup_logging(&Settings::default());
    }

    #[test]
    fn test_field_span_can_be_entered() {
        let span = field_span("dispatch.ticket", "kind");
        let _guard = span.enter();
        tracing::debug!("inside field span");
    }
}
