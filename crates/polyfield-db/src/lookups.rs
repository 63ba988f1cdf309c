//! Lookups and compiled filters.
//!
//! A [`LookupType`] names a comparison (`exact`, `in`, ...). A [`Filter`]
//! binds a field, a lookup type, and a right-hand side that has already been
//! passed through the field's [`get_prep_lookup`](crate::fields::Field::get_prep_lookup)
//! hook, and compiles to a parameterized SQL fragment.
//!
//! # Examples
//!
//! ```
//! use polyfield_db::fields::{FieldDef, FieldType};
//! use polyfield_db::lookups::{Filter, LookupType};
//! use polyfield_db::value::Value;
//!
//! let title = FieldDef::new("title", FieldType::CharField);
//! let filter = Filter::new(&title, LookupType::Exact, Value::from("Hello")).unwrap();
//!
//! let mut params = Vec::new();
//! assert_eq!(filter.to_sql(&mut params), "\"title\" = $1");
//! assert_eq!(params, vec![Value::from("Hello")]);
//! ```

use std::fmt;
use std::str::FromStr;

use polyfield_core::{PolyError, PolyResult};

use crate::fields::Field;
use crate::value::Value;

/// A field-level comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupType {
    /// `field = value`.
    Exact,
    /// `LOWER(field) = LOWER(value)`.
    IExact,
    /// `field LIKE '%value%'`.
    Contains,
    /// `field IN (values...)`.
    In,
    /// `field IS [NOT] NULL`.
    IsNull,
}

impl LookupType {
    /// Returns the lookup name as written in filter expressions.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::IExact => "iexact",
            Self::Contains => "contains",
            Self::In => "in",
            Self::IsNull => "isnull",
        }
    }

    /// Returns `true` if the right-hand side is a list of values.
    pub const fn takes_list(self) -> bool {
        matches!(self, Self::In)
    }

    /// Returns `true` if the right-hand side is passed through the field's
    /// prep hooks. `isnull` takes a plain boolean.
    pub const fn prepares_rhs(self) -> bool {
        !matches!(self, Self::IsNull)
    }
}

impl fmt::Display for LookupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LookupType {
    type Err = PolyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(Self::Exact),
            "iexact" => Ok(Self::IExact),
            "contains" => Ok(Self::Contains),
            "in" => Ok(Self::In),
            "isnull" => Ok(Self::IsNull),
            other => Err(PolyError::TypeError(format!(
                "Unsupported lookup '{other}'"
            ))),
        }
    }
}

/// A filter against one column with a prepared right-hand side.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// The column being filtered.
    pub column: String,
    /// The comparison.
    pub lookup: LookupType,
    /// The prepared right-hand side.
    pub value: Value,
}

impl Filter {
    /// Builds a filter, preparing `value` through the field's lookup hook.
    pub fn new(field: &dyn Field, lookup: LookupType, value: Value) -> PolyResult<Self> {
        let value = if lookup.prepares_rhs() {
            field.get_prep_lookup(lookup, value)?
        } else {
            value
        };
        tracing::trace!(field = field.name(), lookup = %lookup, value = %value, "prepared lookup");
        Ok(Self {
            column: field.column().to_string(),
            lookup,
            value,
        })
    }

    /// Builds a filter from a lookup name such as `"exact"`.
    pub fn parse(field: &dyn Field, lookup: &str, value: Value) -> PolyResult<Self> {
        Self::new(field, lookup.parse()?, value)
    }

    /// Compiles the filter to SQL, pushing bound parameters onto `params`.
    pub fn to_sql(&self, params: &mut Vec<Value>) -> String {
        let column = &self.column;
        match (self.lookup, &self.value) {
            (LookupType::Exact, Value::Null) => format!("\"{column}\" IS NULL"),
            (LookupType::Exact, value) => {
                params.push(value.clone());
                format!("\"{column}\" = {}", placeholder(params.len()))
            }
            (LookupType::IExact, value) => {
                params.push(value.clone());
                format!("LOWER(\"{column}\") = LOWER({})", placeholder(params.len()))
            }
            (LookupType::Contains, value) => {
                params.push(Value::String(format!("%{value}%")));
                format!("\"{column}\" LIKE {}", placeholder(params.len()))
            }
            (LookupType::In, Value::List(values)) => {
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|v| {
                        params.push(v.clone());
                        placeholder(params.len())
                    })
                    .collect();
                format!("\"{column}\" IN ({})", placeholders.join(", "))
            }
            (LookupType::In, value) => {
                params.push(value.clone());
                format!("\"{column}\" IN ({})", placeholder(params.len()))
            }
            (LookupType::IsNull, value) => {
                if value.is_truthy() {
                    format!("\"{column}\" IS NULL")
                } else {
                    format!("\"{column}\" IS NOT NULL")
                }
            }
        }
    }
}

fn placeholder(n: usize) -> String {
    format!("${n}")
}
