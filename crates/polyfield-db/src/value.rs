//! ORM value types.
//!
//! [`Value`] is what flows between model instances, field hooks, and the
//! storage layer. Besides the usual scalar types it can hold a resolved
//! [`ModelClassRef`], which is how a field that stores class names represents
//! its in-memory value.

use std::fmt;
use std::sync::Arc;

use polyfield_core::apps::ModelClassRef;

/// A backend-agnostic representation of a field value.
///
/// # Examples
///
/// ```
/// use polyfield_db::value::Value;
///
/// let v = Value::from("Admin");
/// assert_eq!(v, Value::String("Admin".to_string()));
/// assert!(v.is_truthy());
/// assert!(!Value::from("").is_truthy());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// SQL NULL.
    #[default]
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// A resolved model class.
    Class(ModelClassRef),
    /// A list of values (for IN lookups and multi-valued widgets).
    List(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Class(class) => write!(f, "{}", class.name()),
            Self::List(vals) => {
                write!(f, "[")?;
                for (i, v) in vals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// ── From implementations ───────────────────────────────────────────────

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<ModelClassRef> for Value {
    fn from(v: ModelClassRef) -> Self {
        Self::Class(v)
    }
}

impl From<&ModelClassRef> for Value {
    fn from(v: &ModelClassRef) -> Self {
        Self::Class(Arc::clone(v))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl Value {
    /// Returns `true` if this value is `Null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `false` for null, `false`, zero, the empty string, and the
    /// empty list; `true` for everything else (classes are always truthy).
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::Class(_) => true,
            Self::List(vals) => !vals.is_empty(),
        }
    }

    /// Returns `true` for the values a form or model treats as "no input":
    /// null, the empty string, and the empty list.
    pub fn is_empty_value(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(s) => s.is_empty(),
            Self::List(vals) => vals.is_empty(),
            _ => false,
        }
    }

    /// Returns the name of this value's runtime type.
    ///
    /// A resolved class reports its own class name; every other variant
    /// reports the variant name (`"String"`, `"Int"`, ...). A string that
    /// happens to spell a class name therefore does not report that name.
    pub fn runtime_class_name(&self) -> String {
        match self {
            Self::Null => "Null".to_string(),
            Self::Bool(_) => "Bool".to_string(),
            Self::Int(_) => "Int".to_string(),
            Self::Float(_) => "Float".to_string(),
            Self::String(_) => "String".to_string(),
            Self::Class(class) => class.name().to_string(),
            Self::List(_) => "List".to_string(),
        }
    }

    /// Attempts to extract a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a resolved class.
    pub const fn as_class(&self) -> Option<&ModelClassRef> {
        match self {
            Self::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Attempts to extract an integer value.
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }
}
