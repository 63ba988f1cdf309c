//! Form field definitions and type-level validation.
//!
//! Each [`FormFieldDef`] describes a single form field: its type, widget,
//! validators, and metadata. The [`FormFieldType`] enum carries the
//! type-specific parsing and coercion logic applied by
//! [`clean_field_value`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use polyfield_core::PolyResult;
use polyfield_db::validators::Validator;
use polyfield_db::value::Value;

use crate::data::FormData;
use crate::widgets::{Select, Widget};

/// A function that turns a submitted string into a typed [`Value`].
///
/// Coercion functions usually capture state (a registry to resolve names
/// against, for instance), so this wraps a shared closure rather than a bare
/// function pointer.
#[derive(Clone)]
pub struct Coerce(Arc<dyn Fn(&str) -> PolyResult<Value> + Send + Sync>);

impl Coerce {
    /// Wraps a coercion closure.
    pub fn new(f: impl Fn(&str) -> PolyResult<Value> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Applies the coercion to a raw string.
    pub fn call(&self, raw: &str) -> PolyResult<Value> {
        (self.0)(raw)
    }
}

impl fmt::Debug for Coerce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Coerce(..)")
    }
}

/// Defines the type of a form field, including type-specific parameters.
#[derive(Debug, Clone)]
pub enum FormFieldType {
    /// A single-choice field whose cleaned value is the chosen string.
    Choice {
        /// Available choices as `(value, display_label)` pairs.
        choices: Vec<(String, String)>,
    },
    /// A choice field with a coercion function.
    TypedChoice {
        /// Available choices as `(value, display_label)` pairs.
        choices: Vec<(String, String)>,
        /// Converts the chosen string into a `Value`.
        coerce: Coerce,
    },
}

impl FormFieldType {
    /// Returns the available choices.
    pub fn choices(&self) -> &[(String, String)] {
        match self {
            Self::Choice { choices } | Self::TypedChoice { choices, .. } => choices,
        }
    }
}

/// Complete definition of a form field.
///
/// A `FormFieldDef` captures everything needed to render, parse, and validate
/// a single form field. It is the form-layer analog of
/// [`FieldDef`](polyfield_db::fields::FieldDef).
#[derive(Debug)]
pub struct FormFieldDef {
    /// The field name (HTML name attribute).
    pub name: String,
    /// The field type, controlling parsing and coercion.
    pub field_type: FormFieldType,
    /// Whether this field is required.
    pub required: bool,
    /// Default/initial value.
    pub initial: Option<Value>,
    /// Help text displayed alongside the field.
    pub help_text: String,
    /// Human-readable label.
    pub label: String,
    /// The widget used for rendering and reading submitted data.
    pub widget: Box<dyn Widget>,
    /// Additional validators applied after type coercion.
    pub validators: Vec<Box<dyn Validator>>,
    /// Custom error messages keyed by error code.
    pub error_messages: HashMap<String, String>,
    /// Whether the field is disabled (rendered but not editable).
    pub disabled: bool,
}

impl FormFieldDef {
    /// Creates a new `FormFieldDef` with sensible defaults.
    ///
    /// The field is required by default and renders with a [`Select`] over
    /// its choices.
    pub fn new(name: impl Into<String>, field_type: FormFieldType) -> Self {
        let name = name.into();
        let widget = default_widget_for_field_type(&field_type);
        let label = name.replace('_', " ");
        Self {
            name,
            field_type,
            required: true,
            initial: None,
            help_text: String::new(),
            label,
            widget,
            validators: Vec::new(),
            error_messages: HashMap::new(),
            disabled: false,
        }
    }

    /// Sets whether this field is required.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the initial value.
    pub fn initial(mut self, value: Value) -> Self {
        self.initial = Some(value);
        self
    }

    /// Sets the help text.
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = text.into();
        self
    }

    /// Sets the label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Replaces the widget.
    pub fn widget(mut self, widget: impl Widget + 'static) -> Self {
        self.widget = Box::new(widget);
        self
    }

    /// Adds a validator.
    pub fn validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.validators.push(validator);
        self
    }

    /// Sets a custom error message for a given code.
    pub fn error_message(mut self, code: impl Into<String>, msg: impl Into<String>) -> Self {
        self.error_messages.insert(code.into(), msg.into());
        self
    }

    /// Sets whether this field is disabled.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Renders the field's widget with an `id_<name>` id attribute.
    pub fn render(&self, value: &Value) -> String {
        let mut attrs = HashMap::new();
        attrs.insert(
            "id".to_string(),
            self.widget.id_for_label(&format!("id_{}", self.name)),
        );
        if self.disabled {
            attrs.insert("disabled".to_string(), "disabled".to_string());
        }
        self.widget.render(&self.name, value, &attrs)
    }

    /// Reads this field out of submitted data and cleans it.
    ///
    /// A disabled field ignores the submission and returns its initial value.
    pub fn clean(&self, data: &FormData) -> Result<Value, Vec<String>> {
        if self.disabled {
            return Ok(self.initial.clone().unwrap_or(Value::Null));
        }
        let raw = self.widget.value_from_data(data, &self.name);
        clean_field_value(self, raw.as_deref())
    }

    fn invalid_choice(&self, raw: &str) -> String {
        self.error_messages.get("invalid_choice").map_or_else(
            || format!("Select a valid choice. {raw} is not one of the available choices."),
            |msg| msg.replace("{value}", raw),
        )
    }
}

/// Returns the default widget for a given form field type.
pub fn default_widget_for_field_type(field_type: &FormFieldType) -> Box<dyn Widget> {
    Box::new(Select::new(field_type.choices().to_vec()))
}

/// Cleans a raw submitted string for `field`.
///
/// Checks the required flag, validates the string against the field's
/// choices, applies the type's coercion, and then runs the field's
/// validators. Returns every error message on failure.
pub fn clean_field_value(field: &FormFieldDef, raw: Option<&str>) -> Result<Value, Vec<String>> {
    let raw_str = raw.unwrap_or("");
    let is_empty = raw_str.is_empty();

    // Required check
    if field.required && is_empty {
        let msg = field
            .error_messages
            .get("required")
            .cloned()
            .unwrap_or_else(|| "This field is required.".to_string());
        return Err(vec![msg]);
    }

    // If not required and empty, return the initial value or Null
    if is_empty {
        return Ok(field.initial.clone().unwrap_or(Value::Null));
    }

    let mut errors = Vec::new();

    let valid = field.field_type.choices().iter().any(|(v, _)| v == raw_str);
    let value = if valid {
        match &field.field_type {
            FormFieldType::Choice { .. } => Value::String(raw_str.to_string()),
            FormFieldType::TypedChoice { coerce, .. } => match coerce.call(raw_str) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(field = %field.name, value = raw_str, error = %e, "coercion failed");
                    errors.push(e.to_string());
                    Value::Null
                }
            },
        }
    } else {
        errors.push(field.invalid_choice(raw_str));
        Value::Null
    };

    // Run custom validators on the cleaned value (only if no type errors so far)
    if errors.is_empty() {
        for validator in &field.validators {
            if let Err(e) = validator.validate(&value) {
                errors.push(e.to_string());
            }
        }
    }

    if errors.is_empty() {
        Ok(value)
    } else {
        Err(errors)
    }
}
