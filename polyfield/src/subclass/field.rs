use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use polyfield_core::apps::{AppRegistry, ModelClassRef};
use polyfield_core::{PolyError, PolyResult};
use polyfield_db::fields::{Deconstruction, Field, FieldDef, FieldType};
use polyfield_db::lookups::LookupType;
use polyfield_db::model::Model;
use polyfield_db::value::Value;
use polyfield_forms::fields::{Coerce, FormFieldDef, FormFieldType};
use polyfield_forms::widgets::Widget;

use super::validator::SubclassValidator;
use super::widget::SubclassSelect;

/// A model field holding one of the direct subclasses of `superclass`.
///
/// In memory the value is a [`Value::Class`]; in storage it is the class name
/// as text. Names read back from storage are resolved through the registered
/// models of `app`, lowercased, so the field never needs a static list of
/// subclasses. A [`SubclassValidator`] for the superclass is appended to the
/// field's validators at construction.
pub struct SubclassField {
    def: FieldDef,
    superclass: ModelClassRef,
    app: String,
    registry: Arc<AppRegistry>,
}

impl SubclassField {
    /// Creates a text-backed field with default options.
    pub fn new(
        name: &'static str,
        superclass: &ModelClassRef,
        app: impl Into<String>,
        registry: Arc<AppRegistry>,
    ) -> Self {
        Self::with_def(
            FieldDef::new(name, FieldType::TextField),
            superclass,
            app,
            registry,
        )
    }

    /// Creates a field from explicitly configured options.
    pub fn with_def(
        def: FieldDef,
        superclass: &ModelClassRef,
        app: impl Into<String>,
        registry: Arc<AppRegistry>,
    ) -> Self {
        Self {
            def: def.validator(Box::new(SubclassValidator::new(superclass))),
            superclass: Arc::clone(superclass),
            app: app.into(),
            registry,
        }
    }

    /// Allows NULL in the column.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.def.null = true;
        self
    }

    /// Allows the field to be left blank; the form field becomes optional.
    #[must_use]
    pub fn blank(mut self) -> Self {
        self.def.blank = true;
        self
    }

    /// Sets the database column name.
    #[must_use]
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.def.column = column.into();
        self
    }

    /// Sets the default value, usually one of the subclasses.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.def.default = Some(value.into());
        self
    }

    /// Sets the verbose (human-readable) name.
    #[must_use]
    pub fn verbose_name(mut self, name: impl Into<String>) -> Self {
        self.def.verbose_name = name.into();
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.def.help_text = text.into();
        self
    }

    /// Returns the superclass whose direct subclasses are valid values.
    pub fn superclass(&self) -> &ModelClassRef {
        &self.superclass
    }

    /// Returns the label of the app that stored names resolve against.
    pub fn app(&self) -> &str {
        &self.app
    }

    /// Resolves a stored class name to its class.
    ///
    /// The lookup is case-insensitive. Fails with
    /// [`PolyError::AppNotRegistered`] if the app is unknown, or
    /// [`PolyError::ModelNotRegistered`] if the app has no such model.
    pub fn string_to_class(&self, name: &str) -> PolyResult<ModelClassRef> {
        resolve(&self.registry, &self.app, name)
    }

    /// Builds the form field for this model field.
    ///
    /// The choices are the superclass's direct subclasses at call time, each
    /// offered as `(name, name)` in enumeration order; the widget is a
    /// [`SubclassSelect`] and the chosen name is coerced back to its class
    /// with [`string_to_class`](SubclassField::string_to_class). Anything set
    /// in `overrides` replaces the corresponding default.
    pub fn formfield(&self, overrides: FormFieldOverrides) -> FormFieldDef {
        let choices = overrides.choices.unwrap_or_else(|| {
            self.superclass
                .subclasses()
                .iter()
                .map(|class| (class.name().to_string(), class.name().to_string()))
                .collect()
        });
        let coerce = overrides.coerce.unwrap_or_else(|| {
            let registry = Arc::clone(&self.registry);
            let app = self.app.clone();
            Coerce::new(move |raw| resolve(&registry, &app, raw).map(Value::Class))
        });
        let widget: Box<dyn Widget> = match overrides.widget {
            Some(widget) => widget,
            None => Box::new(SubclassSelect::new(choices.clone())),
        };

        let mut field = FormFieldDef::new(
            self.def.name,
            FormFieldType::TypedChoice { choices, coerce },
        )
        .required(overrides.required.unwrap_or(!self.def.blank))
        .label(
            overrides
                .label
                .unwrap_or_else(|| capfirst(&self.def.verbose_name)),
        )
        .help_text(
            overrides
                .help_text
                .unwrap_or_else(|| self.def.help_text.clone()),
        )
        .disabled(overrides.disabled.unwrap_or(false));
        field.widget = widget;
        field.error_messages = overrides.error_messages;
        if let Some(initial) = overrides.initial.or_else(|| self.def.default.clone()) {
            field = field.initial(initial);
        }
        field
    }
}

impl Field for SubclassField {
    fn def(&self) -> &FieldDef {
        &self.def
    }

    fn internal_type(&self) -> FieldType {
        FieldType::TextField
    }

    fn description(&self) -> String {
        "SubclassField".to_string()
    }

    fn to_python(&self, value: Value) -> PolyResult<Value> {
        match value {
            Value::String(name) => self.string_to_class(&name).map(Value::Class),
            other => Ok(other),
        }
    }

    fn from_db_value(&self, value: Value) -> PolyResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::String(name) => self.string_to_class(&name).map(Value::Class),
            Value::Class(class) => Ok(Value::Class(class)),
            other => Err(PolyError::TypeError(format!(
                "Expected a stored class name for '{}', got {}",
                self.def.name,
                other.runtime_class_name()
            ))),
        }
    }

    fn get_prep_value(&self, value: Value) -> PolyResult<Value> {
        if !value.is_truthy() {
            return Ok(Value::Null);
        }
        match value {
            Value::String(name) => Ok(Value::String(name)),
            Value::Class(class) => Ok(Value::String(class.name().to_string())),
            other => Err(PolyError::TypeError(format!(
                "{} value '{other}' for '{}' is not a class",
                other.runtime_class_name(),
                self.def.name
            ))),
        }
    }

    fn get_prep_lookup(&self, _lookup: LookupType, value: Value) -> PolyResult<Value> {
        Ok(Value::String(value.runtime_class_name()))
    }

    fn pre_save(&self, instance: &mut dyn Model, _add: bool) -> PolyResult<Value> {
        let value = self.get_prep_value(self.value_from_object(instance))?;
        instance.set_value(self.attname(), value.clone())?;
        Ok(value)
    }

    fn deconstruct(&self) -> Deconstruction {
        Deconstruction::from_def(&self.def, "polyfield.SubclassField")
            .with_kwarg("superclass", self.superclass.name())
            .with_kwarg("app", self.app.as_str())
    }
}

impl fmt::Debug for SubclassField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubclassField")
            .field("name", &self.def.name)
            .field("superclass", &self.superclass.name())
            .field("app", &self.app)
            .finish_non_exhaustive()
    }
}

/// Replacements for the defaults [`SubclassField::formfield`] would choose.
#[derive(Debug, Default)]
pub struct FormFieldOverrides {
    /// Whether the form field is required.
    pub required: Option<bool>,
    /// The form label.
    pub label: Option<String>,
    /// The help text.
    pub help_text: Option<String>,
    /// The initial value.
    pub initial: Option<Value>,
    /// The offered choices.
    pub choices: Option<Vec<(String, String)>>,
    /// The coercion applied to the chosen string.
    pub coerce: Option<Coerce>,
    /// The widget.
    pub widget: Option<Box<dyn Widget>>,
    /// Custom error messages keyed by error code.
    pub error_messages: HashMap<String, String>,
    /// Whether the form field is disabled.
    pub disabled: Option<bool>,
}

fn resolve(registry: &AppRegistry, app: &str, name: &str) -> PolyResult<ModelClassRef> {
    match registry.get_model(app, name) {
        Ok(class) => {
            tracing::debug!(app, name, class = %class, "resolved class name");
            Ok(class)
        }
        Err(err) => {
            tracing::warn!(app, name, error = %err, "could not resolve class name");
            Err(err)
        }
    }
}

fn capfirst(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyfield_core::apps::{AppConfig, ModelClass};
    use polyfield_db::validators::Validator;
    use polyfield_forms::fields::clean_field_value;
    use polyfield_forms::widgets::{Select, WidgetType};

    struct Dispatch;

    impl AppConfig for Dispatch {
        fn name(&self) -> &str {
            "project.dispatch"
        }
    }

    struct Fixture {
        user: ModelClassRef,
        admin: ModelClassRef,
        guest: ModelClassRef,
        registry: Arc<AppRegistry>,
    }

    fn fixture() -> Fixture {
        let user = ModelClass::root("User", "dispatch");
        let admin = ModelClass::subclass(&user, "Admin", "dispatch");
        let guest = ModelClass::subclass(&user, "Guest", "dispatch");
        let mut registry = AppRegistry::new();
        registry.register(Box::new(Dispatch));
        registry.register_model(Arc::clone(&user));
        registry.register_model(Arc::clone(&admin));
        registry.register_model(Arc::clone(&guest));
        registry.populate();
        Fixture {
            user,
            admin,
            guest,
            registry: Arc::new(registry),
        }
    }

    fn role_field(fx: &Fixture) -> SubclassField {
        SubclassField::new("role", &fx.user, "dispatch", Arc::clone(&fx.registry))
    }

    #[derive(Debug, Default)]
    struct Account {
        role: Value,
    }

    impl Model for Account {
        fn field_values(&self) -> Vec<(&'static str, Value)> {
            vec![("role", self.role.clone())]
        }

        fn set_value(&mut self, attname: &str, value: Value) -> PolyResult<()> {
            match attname {
                "role" => self.role = value,
                other => return Err(PolyError::TypeError(format!("no attribute '{other}'"))),
            }
            Ok(())
        }
    }

    #[test]
    fn test_construct_appends_validator() {
        let fx = fixture();
        let field = role_field(&fx);
        assert_eq!(field.def().validators.len(), 1);
        assert_eq!(field.def().validators[0].name(), "SubclassValidator");
        assert_eq!(field.internal_type(), FieldType::TextField);
        assert_eq!(field.db_type(), "TEXT");
        assert_eq!(field.description(), "SubclassField");
    }

    #[test]
    fn test_with_def_keeps_type_and_adds_validator() {
        let fx = fixture();
        let def = FieldDef::new("role", FieldType::CharField).max_length(32);
        let field = SubclassField::with_def(def, &fx.user, "dispatch", Arc::clone(&fx.registry));
        assert_eq!(field.internal_type(), FieldType::TextField);
        assert_eq!(field.def().max_length, Some(32));
        assert_eq!(field.def().validators.len(), 1);
    }

    #[test]
    fn test_to_python() {
        let fx = fixture();
        let field = role_field(&fx);
        assert_eq!(field.to_python(Value::Null).unwrap(), Value::Null);
        assert_eq!(field.to_python(Value::from(&fx.admin)).unwrap(), Value::from(&fx.admin));
        assert_eq!(field.to_python(Value::Int(3)).unwrap(), Value::Int(3));
        assert_eq!(field.to_python(Value::from("Guest")).unwrap(), Value::from(&fx.guest));
        assert!(matches!(
            field.to_python(Value::from("Robot")),
            Err(PolyError::ModelNotRegistered { .. })
        ));
    }

    #[test]
    fn test_string_to_class_ignores_case() {
        let fx = fixture();
        let field = role_field(&fx);
        for name in ["guest", "GUEST", "gUeSt"] {
            assert_eq!(field.string_to_class(name).unwrap(), fx.guest);
        }
    }

    #[test]
    fn test_get_prep_value() {
        let fx = fixture();
        let field = role_field(&fx);
        assert_eq!(field.get_prep_value(Value::Null).unwrap(), Value::Null);
        assert_eq!(field.get_prep_value(Value::from("")).unwrap(), Value::Null);
        assert_eq!(field.get_prep_value(Value::Int(0)).unwrap(), Value::Null);
        assert_eq!(
            field.get_prep_value(Value::from("SomeString")).unwrap(),
            Value::from("SomeString")
        );
        assert_eq!(field.get_prep_value(Value::from(&fx.admin)).unwrap(), Value::from("Admin"));
        assert!(matches!(
            field.get_prep_value(Value::Int(5)),
            Err(PolyError::TypeError(_))
        ));
    }

    #[test]
    fn test_from_db_value() {
        let fx = fixture();
        let field = role_field(&fx);
        assert_eq!(field.from_db_value(Value::Null).unwrap(), Value::Null);
        assert_eq!(field.from_db_value(Value::from("admin")).unwrap(), Value::from(&fx.admin));
        assert_eq!(field.from_db_value(Value::from("ADMIN")).unwrap(), Value::from(&fx.admin));
        assert!(matches!(
            field.from_db_value(Value::Int(1)),
            Err(PolyError::TypeError(_))
        ));
    }

    #[test]
    fn test_string_to_class_failures() {
        let fx = fixture();
        let field = role_field(&fx);
        match field.string_to_class("Robot") {
            Err(PolyError::ModelNotRegistered { app_label, model_name }) => {
                assert_eq!(app_label, "dispatch");
                assert_eq!(model_name, "robot");
            }
            other => panic!("expected ModelNotRegistered, got {other:?}"),
        }
        let orphan = SubclassField::new("role", &fx.user, "billing", Arc::clone(&fx.registry));
        assert!(matches!(
            orphan.string_to_class("Admin"),
            Err(PolyError::AppNotRegistered(label)) if label == "billing"
        ));
    }

    #[test]
    fn test_round_trip() {
        let fx = fixture();
        let field = role_field(&fx);
        for class in fx.user.subclasses() {
            let stored = field.get_prep_value(Value::from(&class)).unwrap();
            assert_eq!(field.to_python(stored.clone()).unwrap(), Value::from(&class));
            assert_eq!(field.from_db_value(stored).unwrap(), Value::from(&class));
        }
    }

    #[test]
    fn test_get_prep_lookup_uses_runtime_class_name() {
        let fx = fixture();
        let field = role_field(&fx);
        assert_eq!(
            field.get_prep_lookup(LookupType::Exact, Value::from(&fx.admin)).unwrap(),
            Value::from("Admin")
        );
        assert_eq!(
            field.get_prep_lookup(LookupType::Exact, Value::from("Admin")).unwrap(),
            Value::from("String")
        );
    }

    #[test]
    fn test_pre_save_writes_back_prep_value() {
        let fx = fixture();
        let field = role_field(&fx);
        let mut account = Account {
            role: Value::from(&fx.guest),
        };
        let saved = field.pre_save(&mut account, true).unwrap();
        assert_eq!(saved, Value::from("Guest"));
        assert_eq!(account.role, Value::from("Guest"));

        let mut empty = Account::default();
        assert_eq!(field.pre_save(&mut empty, false).unwrap(), Value::Null);
        assert_eq!(empty.role, Value::Null);
    }

    #[test]
    fn test_clean_accepts_class_and_resolves_string() {
        let fx = fixture();
        let field = role_field(&fx);
        assert_eq!(field.clean(Value::from(&fx.admin)).unwrap(), Value::from(&fx.admin));
        assert_eq!(field.clean(Value::from("guest")).unwrap(), Value::from(&fx.guest));
        let err = field.clean(Value::from(&fx.user)).unwrap_err();
        assert_eq!(err.as_validation_error().map(|e| e.code.as_str()), Some("subclass"));
    }

    #[test]
    fn test_value_to_string() {
        let fx = fixture();
        let field = role_field(&fx);
        let account = Account {
            role: Value::from(&fx.admin),
        };
        assert_eq!(field.value_to_string(&account), "Admin");
        assert_eq!(field.value_to_string(&Account::default()), "");
    }

    #[test]
    fn test_deconstruct() {
        let fx = fixture();
        let d = role_field(&fx).nullable().deconstruct();
        assert_eq!(d.path, "polyfield.SubclassField");
        assert_eq!(d.kwargs.get("superclass"), Some(&serde_json::json!("User")));
        assert_eq!(d.kwargs.get("app"), Some(&serde_json::json!("dispatch")));
        assert_eq!(d.kwargs.get("null"), Some(&serde_json::json!(true)));
        assert_eq!(role_field(&fx).deconstruct(), role_field(&fx).deconstruct());
    }

    #[test]
    fn test_formfield_defaults() {
        let fx = fixture();
        let field = role_field(&fx).help_text("Who handles it");
        let form_field = field.formfield(FormFieldOverrides::default());
        let expected = vec![
            ("Admin".to_string(), "Admin".to_string()),
            ("Guest".to_string(), "Guest".to_string()),
        ];
        assert_eq!(form_field.field_type.choices(), expected.as_slice());
        assert!(form_field.required);
        assert_eq!(form_field.label, "Role");
        assert_eq!(form_field.help_text, "Who handles it");
        assert_eq!(form_field.widget.widget_type(), WidgetType::Select);
        assert!(form_field.initial.is_none());
        assert_eq!(
            clean_field_value(&form_field, Some("Guest")).unwrap(),
            Value::from(&fx.guest)
        );
    }

    #[test]
    fn test_formfield_reflects_current_subclasses() {
        let fx = fixture();
        let field = role_field(&fx);
        let _bot = ModelClass::subclass(&fx.user, "Bot", "dispatch");
        let form_field = field.formfield(FormFieldOverrides::default());
        let names: Vec<&str> = form_field
            .field_type
            .choices()
            .iter()
            .map(|(value, _)| value.as_str())
            .collect();
        assert_eq!(names, vec!["Admin", "Guest", "Bot"]);
        // Bot is offered but not registered in the app, so coercion fails.
        let errors = clean_field_value(&form_field, Some("Bot")).unwrap_err();
        assert_eq!(errors, vec!["App 'dispatch' doesn't have a 'bot' model."]);
    }

    #[test]
    fn test_formfield_blank_default_and_overrides() {
        let fx = fixture();
        let field = role_field(&fx).blank().default(&fx.guest).verbose_name("assigned role");
        let form_field = field.formfield(FormFieldOverrides::default());
        assert!(!form_field.required);
        assert_eq!(form_field.label, "Assigned role");
        assert_eq!(form_field.initial, Some(Value::from(&fx.guest)));

        let overridden = field.formfield(FormFieldOverrides {
            required: Some(true),
            label: Some("Role".into()),
            choices: Some(vec![("Admin".into(), "Administrator".into())]),
            widget: Some(Box::new(Select::default())),
            ..FormFieldOverrides::default()
        });
        assert!(overridden.required);
        assert_eq!(overridden.label, "Role");
        assert_eq!(overridden.field_type.choices().len(), 1);
        assert!(clean_field_value(&overridden, Some("Guest")).is_err());
    }

    #[test]
    fn test_formfield_renders_selected_class() {
        let fx = fixture();
        let form_field = role_field(&fx).formfield(FormFieldOverrides::default());
        let html = form_field.render(&Value::from(&fx.admin));
        assert!(html.contains(r#"<option value="Admin" selected>Admin</option>"#));
        assert!(html.contains(r#"<option value="Guest">Guest</option>"#));
    }

    #[test]
    fn test_capfirst() {
        assert_eq!(capfirst("role"), "Role");
        assert_eq!(capfirst(""), "");
    }
}
