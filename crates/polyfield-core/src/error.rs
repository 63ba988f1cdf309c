//! Core error types for polyfield.
//!
//! [`PolyError`] covers the failures a model field can surface to its host:
//! validation failures, class-resolution failures against the app registry,
//! type mismatches during value preparation, and configuration problems.
//! [`ValidationError`] mirrors Django's `ValidationError` with a message
//! template, a code, and named parameters.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use thiserror::Error;

/// A validation error carrying a message template, a code, and parameters.
///
/// The message may contain `{name}` placeholders that are filled from
/// [`params`](ValidationError::params) when the error is displayed. An error
/// can also aggregate other errors, either as a flat list (several validators
/// failing on one value) or keyed by field name.
///
/// # Examples
///
/// ```
/// use polyfield_core::error::ValidationError;
///
/// let err = ValidationError::new("Ensure this value is a subclass of {superclass}.", "subclass")
///     .with_param("superclass", "User");
/// assert_eq!(err.to_string(), "Ensure this value is a subclass of User.");
/// assert_eq!(err.code, "subclass");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValidationError {
    /// The message template.
    pub message: String,
    /// A short code identifying the failure (e.g. "required", "subclass").
    pub code: String,
    /// Values substituted into the message template.
    pub params: BTreeMap<String, String>,
    /// Errors aggregated from several checks on the same value.
    pub error_list: Vec<Self>,
    /// Per-field validation errors, keyed by field name.
    pub field_errors: HashMap<String, Vec<Self>>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message template and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            ..Self::default()
        }
    }

    /// Creates a `ValidationError` aggregating several errors.
    ///
    /// A single-element list collapses to that element.
    pub fn from_list(mut errors: Vec<Self>) -> Self {
        if errors.len() == 1 {
            return errors.remove(0);
        }
        Self {
            error_list: errors,
            ..Self::default()
        }
    }

    /// Creates a `ValidationError` containing per-field errors.
    pub fn with_field_errors(field_errors: HashMap<String, Vec<Self>>) -> Self {
        Self {
            field_errors,
            ..Self::default()
        }
    }

    /// Adds a parameter used when formatting the message.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Returns the message with every `{param}` placeholder substituted.
    ///
    /// The template is scanned once, so braces inside a substituted value are
    /// copied through as-is. Placeholders without a parameter are kept.
    pub fn formatted_message(&self) -> String {
        let mut out = String::with_capacity(self.message.len());
        let mut rest = self.message.as_str();
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            let param = tail
                .find('}')
                .and_then(|close| self.params.get(&tail[1..close]).map(|v| (close, v)));
            match param {
                Some((close, value)) => {
                    out.push_str(value);
                    rest = &tail[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Returns the codes of this error and every aggregated error.
    pub fn codes(&self) -> Vec<&str> {
        if self.error_list.is_empty() {
            vec![self.code.as_str()]
        } else {
            self.error_list.iter().flat_map(Self::codes).collect()
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.message.is_empty() {
            return write!(f, "{}", self.formatted_message());
        }
        let mut first = true;
        for error in &self.error_list {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
            first = false;
        }
        for (field, errors) in &self.field_errors {
            for error in errors {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {error}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for polyfield.
#[derive(Error, Debug)]
pub enum PolyError {
    // ── Validation ───────────────────────────────────────────────────

    /// One or more checks failed on a value.
    #[error("Validation error: {0}")]
    ValidationError(ValidationError),

    // ── Class resolution ─────────────────────────────────────────────

    /// No application with the given label is installed.
    #[error("No installed app with label '{0}'.")]
    AppNotRegistered(String),

    /// The application exists but has no model under the given name.
    #[error("App '{app_label}' doesn't have a '{model_name}' model.")]
    ModelNotRegistered {
        /// The label of the application that was searched.
        app_label: String,
        /// The lowercased model name that was looked up.
        model_name: String,
    },

    /// A value had a shape the operation cannot handle.
    #[error("Type error: {0}")]
    TypeError(String),

    // ── Storage ──────────────────────────────────────────────────────

    /// A generic database error (missing column, bad row shape, ...).
    #[error("Database error: {0}")]
    DatabaseError(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl From<ValidationError> for PolyError {
    fn from(err: ValidationError) -> Self {
        Self::ValidationError(err)
    }
}

impl PolyError {
    /// Returns `true` if this error came from resolving a class name.
    pub const fn is_lookup_error(&self) -> bool {
        matches!(
            self,
            Self::AppNotRegistered(_) | Self::ModelNotRegistered { .. }
        )
    }

    /// Returns the wrapped validation error, if this is one.
    pub const fn as_validation_error(&self) -> Option<&ValidationError> {
        match self {
            Self::ValidationError(err) => Some(err),
            _ => None,
        }
    }
}

/// A convenience type alias for `Result<T, PolyError>`.
pub type PolyResult<T> = Result<T, PolyError>;
