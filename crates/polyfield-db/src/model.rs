//! Model trait, metadata, and database rows.
//!
//! The [`Model`] trait is the attribute-access seam fields use: read a value by
//! attribute name and write one back. [`ModelMeta`] lists a model's fields in
//! declaration order, and [`Row`] is a read result keyed by column name.

use polyfield_core::{PolyError, PolyResult};

use crate::fields::Field;
use crate::value::Value;

/// Attribute access on a model instance.
///
/// # Examples
///
/// ```
/// use polyfield_core::{PolyError, PolyResult};
/// use polyfield_db::model::Model;
/// use polyfield_db::value::Value;
///
/// struct Ticket {
///     title: String,
///     kind: Value,
/// }
///
/// impl Model for Ticket {
///     fn field_values(&self) -> Vec<(&'static str, Value)> {
///         vec![("title", Value::from(self.title.as_str())), ("kind", self.kind.clone())]
///     }
///
///     fn set_value(&mut self, attname: &str, value: Value) -> PolyResult<()> {
///         match attname {
///             "kind" => self.kind = value,
///             "title" => self.title = value.to_string(),
///             other => return Err(PolyError::TypeError(format!("no attribute '{other}'"))),
///         }
///         Ok(())
///     }
/// }
///
/// let mut t = Ticket { title: "Printer on fire".into(), kind: Value::Null };
/// t.set_value("kind", Value::from("Admin")).unwrap();
/// assert_eq!(t.get_value("kind"), Some(Value::from("Admin")));
/// ```
pub trait Model: Send + Sync {
    /// Returns all attribute name-value pairs for this instance.
    fn field_values(&self) -> Vec<(&'static str, Value)>;

    /// Writes one attribute.
    fn set_value(&mut self, attname: &str, value: Value) -> PolyResult<()>;

    /// Reads one attribute, or `None` if the model has no such attribute.
    fn get_value(&self, attname: &str) -> Option<Value> {
        self.field_values()
            .into_iter()
            .find(|(name, _)| *name == attname)
            .map(|(_, value)| value)
    }
}

/// Metadata about a model.
#[derive(Debug)]
pub struct ModelMeta {
    /// The application label (e.g. "dispatch").
    pub app_label: &'static str,
    /// The model name in lowercase (e.g. "ticket").
    pub model_name: &'static str,
    /// The database table name.
    pub db_table: String,
    /// Field definitions in declaration order.
    pub fields: Vec<Box<dyn Field>>,
}

impl ModelMeta {
    /// Creates metadata with the conventional `<app>_<model>` table name.
    pub fn new(app_label: &'static str, model_name: &'static str) -> Self {
        Self {
            app_label,
            model_name,
            db_table: format!("{app_label}_{model_name}"),
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: impl Field + 'static) -> Self {
        self.fields.push(Box::new(field));
        self
    }

    /// Returns the field with the given name.
    pub fn get_field(&self, name: &str) -> PolyResult<&dyn Field> {
        self.fields
            .iter()
            .find(|f| f.name() == name)
            .map(|f| &**f)
            .ok_or_else(|| {
                PolyError::TypeError(format!(
                    "{}.{} has no field named '{name}'",
                    self.app_label, self.model_name
                ))
            })
    }

    /// Returns the dotted `app.model` label.
    pub fn label(&self) -> String {
        format!("{}.{}", self.app_label, self.model_name)
    }
}

/// A database row: column names paired with raw values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a new row from column names and values.
    ///
    /// # Panics
    ///
    /// Panics if the number of columns does not match the number of values.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        assert_eq!(
            columns.len(),
            values.len(),
            "Row column count must match value count"
        );
        Self { columns, values }
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the raw value of a column.
    pub fn get(&self, column: &str) -> PolyResult<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
            .ok_or_else(|| PolyError::DatabaseError(format!("Column '{column}' not found in row")))
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let (columns, values) = iter.into_iter().unzip();
        Self { columns, values }
    }
}
