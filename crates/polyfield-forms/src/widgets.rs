//! Widget system for rendering select elements.
//!
//! A widget renders a form field as HTML and reads the field's raw value back
//! out of submitted [`FormData`]. Choice widgets additionally share the
//! option-rendering logic in [`ChoiceWidget`], whose
//! [`render_options`](ChoiceWidget::render_options) hook decides which options
//! are marked selected.

use std::collections::{HashMap, HashSet};
use std::fmt;

use polyfield_db::value::Value;

use crate::data::FormData;

/// Enumerates the built-in widget types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetType {
    /// `<select>`.
    Select,
    /// `<select multiple>`.
    SelectMultiple,
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Select => "Select",
            Self::SelectMultiple => "SelectMultiple",
        };
        write!(f, "{name}")
    }
}

/// A trait for HTML form widgets.
///
/// Widgets are responsible for:
/// - Rendering an HTML element for a given field name and value
/// - Extracting the raw value from submitted [`FormData`]
/// - Generating the `id` attribute for an associated `<label>` element
pub trait Widget: Send + Sync + fmt::Debug {
    /// Returns the widget type enum variant.
    fn widget_type(&self) -> WidgetType;

    /// Renders the widget as an HTML string.
    ///
    /// # Arguments
    /// - `name` - The HTML `name` attribute
    /// - `value` - The current value to display (`Value::Null` for none)
    /// - `attrs` - Additional HTML attributes
    fn render(&self, name: &str, value: &Value, attrs: &HashMap<String, String>) -> String;

    /// Extracts a raw string value from the submitted form data.
    ///
    /// Returns `None` if no value was submitted for this field name.
    fn value_from_data(&self, data: &FormData, name: &str) -> Option<String>;

    /// Returns the HTML `id` attribute value for a label targeting this widget.
    fn id_for_label(&self, id: &str) -> String {
        id.to_string()
    }
}

/// A widget that renders a list of `(value, label)` options.
pub trait ChoiceWidget: Widget {
    /// Returns the widget's own choices.
    fn choices(&self) -> &[(String, String)];

    /// Renders a single `<option>`.
    fn render_option(&self, selected: bool, value: &str, label: &str) -> String {
        let selected = if selected { " selected" } else { "" };
        format!(
            r#"<option value="{}"{selected}>{}</option>"#,
            escape_html(value),
            escape_html(label)
        )
    }

    /// Renders the widget's choices followed by `extra`, one option per line.
    ///
    /// An option is selected when its value equals the display form of one of
    /// `selected`. Null values select nothing.
    fn render_options(&self, extra: &[(String, String)], selected: &[Value]) -> String {
        let selected: HashSet<String> = selected
            .iter()
            .filter(|v| !v.is_null())
            .map(Value::to_string)
            .collect();
        self.choices()
            .iter()
            .chain(extra)
            .map(|(value, label)| self.render_option(selected.contains(value), value, label))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Wraps rendered options in a `<select>` element.
pub fn render_select(
    name: &str,
    options: &str,
    multiple: bool,
    attrs: &HashMap<String, String>,
) -> String {
    let multiple = if multiple { " multiple" } else { "" };
    format!(
        "<select name=\"{name}\"{}{multiple}>\n{options}\n</select>",
        render_attrs(attrs)
    )
}

/// Escapes HTML special characters in a string.
///
/// Replaces `&`, `<`, `>`, `"`, and `'` with their HTML entity equivalents.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Formats an HTML attributes map into a string like ` key="value" key2="value2"`.
fn render_attrs(attrs: &HashMap<String, String>) -> String {
    if attrs.is_empty() {
        return String::new();
    }
    let mut parts: Vec<String> = attrs
        .iter()
        .map(|(k, v)| format!(r#" {k}="{}""#, escape_html(v)))
        .collect();
    parts.sort(); // deterministic output for testing
    parts.join("")
}

/// A single-choice `<select>` widget.
#[derive(Debug, Clone, Default)]
pub struct Select {
    /// The available choices as `(value, display_label)` pairs.
    pub choices: Vec<(String, String)>,
}

impl Select {
    /// Creates a new `Select` widget with the given choices.
    pub fn new(choices: Vec<(String, String)>) -> Self {
        Self { choices }
    }
}

impl Widget for Select {
    fn widget_type(&self) -> WidgetType {
        WidgetType::Select
    }

    fn render(&self, name: &str, value: &Value, attrs: &HashMap<String, String>) -> String {
        let options = self.render_options(&[], std::slice::from_ref(value));
        render_select(name, &options, false, attrs)
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<String> {
        data.get(name).map(String::from)
    }
}

impl ChoiceWidget for Select {
    fn choices(&self) -> &[(String, String)] {
        &self.choices
    }
}

/// A `<select multiple>` widget.
///
/// The current value is a [`Value::List`]; submitted values are joined with
/// commas.
#[derive(Debug, Clone, Default)]
pub struct SelectMultiple {
    /// The available choices as `(value, display_label)` pairs.
    pub choices: Vec<(String, String)>,
}

impl SelectMultiple {
    /// Creates a new `SelectMultiple` widget with the given choices.
    pub fn new(choices: Vec<(String, String)>) -> Self {
        Self { choices }
    }
}

impl Widget for SelectMultiple {
    fn widget_type(&self) -> WidgetType {
        WidgetType::SelectMultiple
    }

    fn render(&self, name: &str, value: &Value, attrs: &HashMap<String, String>) -> String {
        let options = match value {
            Value::List(values) => self.render_options(&[], values),
            other => self.render_options(&[], std::slice::from_ref(other)),
        };
        render_select(name, &options, true, attrs)
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<String> {
        data.get_list(name).map(|values| values.join(","))
    }
}

impl ChoiceWidget for SelectMultiple {
    fn choices(&self) -> &[(String, String)] {
        &self.choices
    }
}
