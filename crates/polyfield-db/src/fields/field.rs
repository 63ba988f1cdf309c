use std::fmt;

use polyfield_core::{PolyResult, ValidationError};

use crate::fields::types::{FieldDef, FieldType};
use crate::lookups::LookupType;
use crate::model::Model;
use crate::value::Value;

/// The lifecycle hooks of a model field.
///
/// The persistence layer calls these at fixed points; every hook except
/// [`def`](Field::def) has a pass-through default, so a custom field only
/// overrides what it changes.
///
/// | Hook | Called when |
/// |---|---|
/// | [`to_python`](Field::to_python) | cleaning a value supplied by code or a form |
/// | [`from_db_value`](Field::from_db_value) | a value has been read from storage |
/// | [`get_prep_value`](Field::get_prep_value) | a value is about to be written or compared |
/// | [`get_prep_lookup`](Field::get_prep_lookup) | a filter is being built against this field |
/// | [`pre_save`](Field::pre_save) | an instance is about to be saved |
pub trait Field: Send + Sync + fmt::Debug {
    /// Returns the shared field options.
    fn def(&self) -> &FieldDef;

    /// Returns the field name.
    fn name(&self) -> &'static str {
        self.def().name
    }

    /// Returns the attribute name used to read and write the value on an instance.
    fn attname(&self) -> &'static str {
        self.def().name
    }

    /// Returns the database column name.
    fn column(&self) -> &str {
        &self.def().column
    }

    /// Returns the storage type the column is created with.
    fn internal_type(&self) -> FieldType {
        self.def().field_type
    }

    /// Returns the SQL column type.
    fn db_type(&self) -> &'static str {
        self.internal_type().column_type()
    }

    /// Returns a short human-readable description of the field kind.
    fn description(&self) -> String {
        format!("Field of type: {}", self.internal_type())
    }

    /// Converts an input value into the field's in-memory form.
    fn to_python(&self, value: Value) -> PolyResult<Value> {
        Ok(value)
    }

    /// Converts a value read from storage into the field's in-memory form.
    fn from_db_value(&self, value: Value) -> PolyResult<Value> {
        Ok(value)
    }

    /// Converts an in-memory value into its storage-ready form.
    fn get_prep_value(&self, value: Value) -> PolyResult<Value> {
        Ok(value)
    }

    /// Prepares the right-hand side of a lookup against this field.
    ///
    /// List lookups prepare each element; everything else goes through
    /// [`get_prep_value`](Field::get_prep_value).
    fn get_prep_lookup(&self, lookup: LookupType, value: Value) -> PolyResult<Value> {
        match value {
            Value::List(values) if lookup.takes_list() => values
                .into_iter()
                .map(|v| self.get_prep_value(v))
                .collect::<PolyResult<Vec<_>>>()
                .map(Value::List),
            other => self.get_prep_value(other),
        }
    }

    /// Returns the value to persist for this field on `instance`.
    ///
    /// `add` is `true` when the instance is being inserted for the first time.
    fn pre_save(&self, instance: &mut dyn Model, add: bool) -> PolyResult<Value> {
        let _ = add;
        Ok(self.value_from_object(instance))
    }

    /// Reads this field's current value off an instance.
    fn value_from_object(&self, instance: &dyn Model) -> Value {
        instance.get_value(self.attname()).unwrap_or(Value::Null)
    }

    /// Renders this field's current value on an instance as a string.
    fn value_to_string(&self, instance: &dyn Model) -> String {
        match self.value_from_object(instance) {
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Checks the null and blank options.
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let def = self.def();
        if value.is_null() && !def.null {
            return Err(ValidationError::new("This field cannot be null.", "null"));
        }
        if value.is_empty_value() && !def.blank {
            return Err(ValidationError::new("This field cannot be blank.", "blank"));
        }
        Ok(())
    }

    /// Runs every attached validator and gathers all failures.
    ///
    /// Empty values are not validated.
    fn run_validators(&self, value: &Value) -> Result<(), ValidationError> {
        if value.is_empty_value() {
            return Ok(());
        }
        let errors: Vec<ValidationError> = self
            .def()
            .validators
            .iter()
            .filter_map(|validator| validator.validate(value).err())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::from_list(errors))
        }
    }

    /// Converts, validates, and returns the cleaned value.
    fn clean(&self, value: Value) -> PolyResult<Value> {
        let value = self.to_python(value)?;
        self.validate(&value)?;
        self.run_validators(&value)?;
        Ok(value)
    }

    /// Describes how to reconstruct this field.
    fn deconstruct(&self) -> Deconstruction {
        Deconstruction::from_def(self.def(), "polyfield_db.fields.FieldDef")
            .with_kwarg("field_type", self.internal_type().to_string())
    }
}

impl Field for FieldDef {
    fn def(&self) -> &FieldDef {
        self
    }
}

/// The name, type path, and non-default options of a field.
///
/// Two fields configured alike deconstruct to equal values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deconstruction {
    /// The field name.
    pub name: String,
    /// The dotted path of the field type.
    pub path: String,
    /// Options that differ from their defaults.
    pub kwargs: serde_json::Map<String, serde_json::Value>,
}

impl Deconstruction {
    /// Collects the non-default options of `def`.
    pub fn from_def(def: &FieldDef, path: impl Into<String>) -> Self {
        let mut kwargs = serde_json::Map::new();
        let flags = [
            ("primary_key", def.primary_key),
            ("null", def.null),
            ("blank", def.blank),
            ("unique", def.unique),
            ("db_index", def.db_index),
        ];
        for (key, set) in flags {
            if set {
                kwargs.insert(key.to_string(), serde_json::Value::Bool(true));
            }
        }
        if !def.editable {
            kwargs.insert("editable".to_string(), serde_json::Value::Bool(false));
        }
        if let Some(max_length) = def.max_length {
            kwargs.insert("max_length".to_string(), serde_json::json!(max_length));
        }
        if def.column != def.name {
            kwargs.insert("db_column".to_string(), def.column.clone().into());
        }
        if !def.help_text.is_empty() {
            kwargs.insert("help_text".to_string(), def.help_text.clone().into());
        }
        if def.verbose_name != def.name.replace('_', " ") {
            kwargs.insert("verbose_name".to_string(), def.verbose_name.clone().into());
        }
        Self {
            name: def.name.to_string(),
            path: path.into(),
            kwargs,
        }
    }

    /// Adds or replaces one option.
    #[must_use]
    pub fn with_kwarg(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.kwargs.insert(key.to_string(), value.into());
        self
    }
}
