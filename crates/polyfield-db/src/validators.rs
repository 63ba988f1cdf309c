//! Field validators.
//!
//! A [`Validator`] checks one constraint on a cleaned value. Fields keep a list
//! of them and run every one from [`Field::run_validators`], gathering all
//! failures into a single [`ValidationError`].
//!
//! [`Field::run_validators`]: crate::fields::Field::run_validators

use std::fmt;

use polyfield_core::ValidationError;

use crate::value::Value;

/// A trait for validating field values.
///
/// # Examples
///
/// ```
/// use polyfield_core::ValidationError;
/// use polyfield_db::validators::Validator;
/// use polyfield_db::value::Value;
///
/// #[derive(Debug)]
/// struct NotNull;
///
/// impl Validator for NotNull {
///     fn validate(&self, value: &Value) -> Result<(), ValidationError> {
///         if value.is_null() {
///             return Err(ValidationError::new("This field cannot be null.", "null"));
///         }
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "NotNull"
///     }
/// }
///
/// assert!(NotNull.validate(&Value::Int(1)).is_ok());
/// assert!(NotNull.validate(&Value::Null).is_err());
/// ```
pub trait Validator: Send + Sync + fmt::Debug {
    /// Validates the given value, returning an error if invalid.
    fn validate(&self, value: &Value) -> Result<(), ValidationError>;

    /// Returns a human-readable name for this validator.
    fn name(&self) -> &str;
}
