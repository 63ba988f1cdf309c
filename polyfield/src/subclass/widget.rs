use std::collections::{HashMap, HashSet};

use polyfield_db::value::Value;
use polyfield_forms::data::FormData;
use polyfield_forms::widgets::{render_select, ChoiceWidget, Widget, WidgetType};

/// A `<select>` that marks options by the runtime class name of the value.
///
/// An option is selected when its *label* equals
/// [`runtime_class_name`](Value::runtime_class_name) of one of the selected
/// values. A resolved class therefore selects the option carrying its name,
/// while a plain string (which reports `"String"`) selects nothing. Two
/// distinct classes that share a name select the same option.
#[derive(Debug, Clone, Default)]
pub struct SubclassSelect {
    /// The available choices as `(value, display_label)` pairs.
    pub choices: Vec<(String, String)>,
}

impl SubclassSelect {
    /// Creates a widget offering `choices`.
    pub fn new(choices: Vec<(String, String)>) -> Self {
        Self { choices }
    }
}

impl Widget for SubclassSelect {
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

impl ChoiceWidget for SubclassSelect {
    fn choices(&self) -> &[(String, String)] {
        &self.choices
    }

    fn render_options(&self, extra: &[(String, String)], selected: &[Value]) -> String {
        let selected_labels: HashSet<String> =
            selected.iter().map(Value::runtime_class_name).collect();
        self.choices
            .iter()
            .chain(extra)
            .map(|(value, label)| {
                self.render_option(selected_labels.contains(label), value, label)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
