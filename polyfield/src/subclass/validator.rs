use std::collections::HashSet;
use std::sync::Arc;

use polyfield_core::apps::ModelClassRef;
use polyfield_core::ValidationError;
use polyfield_db::validators::Validator;
use polyfield_db::value::Value;

/// Accepts only the direct subclasses of a fixed superclass.
///
/// The check is by class identity: a grandchild fails, and so does a string
/// that merely spells a valid subclass's name.
///
/// # Examples
///
/// ```
/// use polyfield::core::apps::ModelClass;
/// use polyfield::db::{Validator, Value};
/// use polyfield::SubclassValidator;
///
/// let user = ModelClass::root("User", "dispatch");
/// let guest = ModelClass::subclass(&user, "Guest", "dispatch");
///
/// let validator = SubclassValidator::new(&user);
/// assert!(validator.validate(&Value::from(&guest)).is_ok());
///
/// let err = validator.validate(&Value::from("Guest")).unwrap_err();
/// assert_eq!(err.code, "subclass");
/// assert_eq!(
///     err.to_string(),
///     "Ensure this value is a subclass of User (it is Guest)."
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SubclassValidator {
    superclass: ModelClassRef,
}

impl SubclassValidator {
    /// The message template reported on failure.
    pub const MESSAGE: &'static str = "Ensure this value is a subclass of {superclass} (it is {subclass}).";
    /// The error code reported on failure.
    pub const CODE: &'static str = "subclass";

    /// Creates a validator for the direct subclasses of `superclass`.
    pub fn new(superclass: &ModelClassRef) -> Self {
        Self {
            superclass: Arc::clone(superclass),
        }
    }

    /// Returns the superclass this validator checks against.
    pub fn superclass(&self) -> &ModelClassRef {
        &self.superclass
    }
}

impl Validator for SubclassValidator {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let subclasses: HashSet<ModelClassRef> = self.superclass.subclasses().into_iter().collect();
        match value {
            Value::Class(class) if subclasses.contains(class) => Ok(()),
            other => Err(ValidationError::new(Self::MESSAGE, Self::CODE)
                .with_param("superclass", self.superclass.name())
                .with_param("subclass", other.to_string())),
        }
    }

    fn name(&self) -> &str {
        "SubclassValidator"
    }
}

impl PartialEq for SubclassValidator {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.superclass, &other.superclass)
    }
}

impl Eq for SubclassValidator {}
