//! Model classes and the application registry.
//!
//! A [`ModelClass`] is a runtime descriptor for a model type: its name, the
//! app it belongs to, its parent class, and the direct subclasses registered
//! under it. The hierarchy is built explicitly during start-up with
//! [`ModelClass::root`] and [`ModelClass::subclass`]; enumerating
//! [`subclasses`](ModelClass::subclasses) always reflects the registrations
//! made so far.
//!
//! The [`AppRegistry`] maps application labels to their [`AppConfig`] and to
//! the model classes they own, keyed by lowercased model name. Fields that
//! persist class names resolve them back through
//! [`AppRegistry::get_model`]. This mirrors Django's `django.apps` module.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use crate::error::{PolyError, PolyResult};
use crate::settings::Settings;

/// A shared handle to a [`ModelClass`].
pub type ModelClassRef = Arc<ModelClass>;

/// A runtime descriptor for a model type.
///
/// Equality and hashing are by identity: two descriptors created separately
/// are different classes even when they share a name.
///
/// # Examples
///
/// ```
/// use polyfield_core::apps::ModelClass;
///
/// let user = ModelClass::root("User", "dispatch");
/// let admin = ModelClass::subclass(&user, "Admin", "dispatch");
///
/// assert_eq!(admin.model_name(), "admin");
/// assert!(admin.is_direct_subclass_of(&user));
/// assert_eq!(user.subclasses(), vec![admin]);
/// ```
pub struct ModelClass {
    name: String,
    app_label: String,
    parent: Option<ModelClassRef>,
    subclasses: RwLock<Vec<Weak<ModelClass>>>,
}

impl ModelClass {
    /// Creates a class with no parent.
    pub fn root(name: impl Into<String>, app_label: impl Into<String>) -> ModelClassRef {
        Arc::new(Self {
            name: name.into(),
            app_label: app_label.into(),
            parent: None,
            subclasses: RwLock::new(Vec::new()),
        })
    }

    /// Creates a class deriving directly from `parent` and records it as one
    /// of the parent's subclasses.
    pub fn subclass(
        parent: &ModelClassRef,
        name: impl Into<String>,
        app_label: impl Into<String>,
    ) -> ModelClassRef {
        let child = Arc::new(Self {
            name: name.into(),
            app_label: app_label.into(),
            parent: Some(Arc::clone(parent)),
            subclasses: RwLock::new(Vec::new()),
        });
        parent
            .subclasses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::downgrade(&child));
        child
    }

    /// Returns the class name, with its original casing (e.g. "Admin").
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the label of the application that defines this class.
    pub fn app_label(&self) -> &str {
        &self.app_label
    }

    /// Returns the lowercased class name used as the registry key.
    pub fn model_name(&self) -> String {
        self.name.to_lowercase()
    }

    /// Returns the parent class, if any.
    pub const fn parent(&self) -> Option<&ModelClassRef> {
        self.parent.as_ref()
    }

    /// Returns the direct subclasses that are still alive, in registration order.
    pub fn subclasses(&self) -> Vec<ModelClassRef> {
        self.subclasses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }

    /// Returns `true` if `other` is this class's immediate parent.
    pub fn is_direct_subclass_of(&self, other: &Self) -> bool {
        self.parent.as_deref().is_some_and(|parent| parent == other)
    }

    /// Returns `true` if `other` is this class or any of its ancestors.
    pub fn is_subclass_of(&self, other: &Self) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class == other {
                return true;
            }
            current = class.parent.as_deref();
        }
        false
    }
}

impl PartialEq for ModelClass {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for ModelClass {}

impl Hash for ModelClass {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self, state);
    }
}

impl fmt::Debug for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelClass")
            .field("name", &self.name)
            .field("app_label", &self.app_label)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Configuration for an installed application.
///
/// The [`ready`](AppConfig::ready) hook runs once the registry is populated.
///
/// # Examples
///
/// ```
/// use polyfield_core::apps::AppConfig;
///
/// struct Dispatch;
///
/// impl AppConfig for Dispatch {
///     fn name(&self) -> &str { "project.dispatch" }
/// }
///
/// assert_eq!(Dispatch.label(), "dispatch");
/// ```
pub trait AppConfig: Send + Sync {
    /// Returns the full dotted path of the application.
    fn name(&self) -> &str;

    /// Returns a short label derived from the name (the last component).
    fn label(&self) -> &str {
        self.name().rsplit('.').next().unwrap_or_else(|| self.name())
    }

    /// Returns a human-readable name for the application.
    fn verbose_name(&self) -> &str {
        self.name()
    }

    /// Called after all apps have been loaded.
    fn ready(&self) {}
}

/// An installed application together with the model classes it owns.
struct AppEntry {
    config: Box<dyn AppConfig>,
    models: Vec<ModelClassRef>,
    model_index: HashMap<String, usize>,
}

/// The central registry of installed applications and their models.
///
/// Apps are added with [`register`](AppRegistry::register), their model
/// classes with [`register_model`](AppRegistry::register_model), and
/// [`populate`](AppRegistry::populate) is called once to finish start-up.
/// [`populate_installed`](AppRegistry::populate_installed) does the same
/// after checking the apps against [`Settings::installed_apps`]. Afterwards the registry is read-only and is usually shared behind an `Arc`.
pub struct AppRegistry {
    apps: Vec<AppEntry>,
    app_labels: HashMap<String, usize>,
    ready: bool,
}

impl Default for AppRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AppRegistry {
    /// Creates a new, empty `AppRegistry`.
    pub fn new() -> Self {
        Self {
            apps: Vec::new(),
            app_labels: HashMap::new(),
            ready: false,
        }
    }

    /// Registers an application.
    ///
    /// # Panics
    ///
    /// Panics if an application with the same label is already registered,
    /// or if [`populate`](AppRegistry::populate) has already been called.
    pub fn register(&mut self, app: Box<dyn AppConfig>) {
        assert!(
            !self.ready,
            "Cannot register apps after the registry has been populated"
        );

        let label = app.label().to_string();
        assert!(
            !self.app_labels.contains_key(&label),
            "Application with label '{label}' is already registered"
        );

        let index = self.apps.len();
        self.app_labels.insert(label, index);
        self.apps.push(AppEntry {
            config: app,
            models: Vec::new(),
            model_index: HashMap::new(),
        });
    }

    /// Registers a model class under its own app label.
    ///
    /// # Panics
    ///
    /// Panics if the registry is already populated, if the class's app is not
    /// registered, or if the app already has a model with the same lowercased
    /// name.
    pub fn register_model(&mut self, class: ModelClassRef) {
        assert!(
            !self.ready,
            "Cannot register models after the registry has been populated"
        );

        let app_label = class.app_label().to_string();
        let Some(&idx) = self.app_labels.get(&app_label) else {
            panic!("Cannot register model '{class}': app '{app_label}' is not registered");
        };

        let entry = &mut self.apps[idx];
        let model_name = class.model_name();
        assert!(
            !entry.model_index.contains_key(&model_name),
            "Conflicting '{model_name}' models in application '{app_label}'"
        );

        tracing::debug!(app = %app_label, model = %model_name, "registered model class");
        entry.model_index.insert(model_name, entry.models.len());
        entry.models.push(class);
    }

    /// Returns the configuration for the app with the given label.
    pub fn get_app_config(&self, label: &str) -> PolyResult<&dyn AppConfig> {
        self.entry(label).map(|entry| entry.config.as_ref())
    }

    /// Returns an iterator over all registered app configurations.
    pub fn get_app_configs(&self) -> impl Iterator<Item = &dyn AppConfig> {
        self.apps.iter().map(|entry| entry.config.as_ref())
    }

    /// Returns the model classes of an app, in registration order.
    pub fn get_models(&self, app_label: &str) -> PolyResult<&[ModelClassRef]> {
        self.entry(app_label).map(|entry| entry.models.as_slice())
    }

    /// Looks up a model class by app label and model name.
    ///
    /// The model name is lowercased before the lookup, so `"Admin"` and
    /// `"admin"` resolve to the same class.
    pub fn get_model(&self, app_label: &str, model_name: &str) -> PolyResult<ModelClassRef> {
        let entry = self.entry(app_label)?;
        let key = model_name.to_lowercase();
        match entry.model_index.get(&key) {
            Some(&idx) => Ok(Arc::clone(&entry.models[idx])),
            None => Err(PolyError::ModelNotRegistered {
                app_label: app_label.to_string(),
                model_name: key,
            }),
        }
    }

    /// Finalizes the registry by calling `ready()` on each app in registration order.
    ///
    /// # Panics
    ///
    /// Panics if `populate` has already been called.
    pub fn populate(&mut self) {
        assert!(!self.ready, "AppRegistry has already been populated");

        for entry in &self.apps {
            entry.config.ready();
        }

        self.ready = true;
        tracing::debug!(apps = self.apps.len(), "app registry populated");
    }

    /// Checks the registered apps against `settings.installed_apps`, then
    /// populates the registry.
    ///
    /// Every installed app must have been registered, and every registered
    /// app must appear in `installed_apps` by its dotted name. The registry
    /// stays unpopulated when the check fails.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::ConfigurationError`] listing the mismatched apps.
    ///
    /// # Panics
    ///
    /// Panics if the registry has already been populated.
    pub fn populate_installed(&mut self, settings: &Settings) -> PolyResult<()> {
        let missing: Vec<&str> = settings
            .installed_apps
            .iter()
            .map(String::as_str)
            .filter(|name| !self.apps.iter().any(|entry| entry.config.name() == *name))
            .collect();
        if !missing.is_empty() {
            return Err(PolyError::ConfigurationError(format!(
                "Installed apps are not registered: {}",
                missing.join(", ")
            )));
        }

        let uninstalled: Vec<&str> = self
            .apps
            .iter()
            .map(|entry| entry.config.name())
            .filter(|name| !settings.installed_apps.iter().any(|app| app == name))
            .collect();
        if !uninstalled.is_empty() {
            return Err(PolyError::ConfigurationError(format!(
                "Registered apps are missing from installed_apps: {}",
                uninstalled.join(", ")
            )));
        }

        self.populate();
        Ok(())
    }

    /// Returns `true` if the registry has been populated.
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    fn entry(&self, label: &str) -> PolyResult<&AppEntry> {
        self.app_labels
            .get(label)
            .map(|&idx| &self.apps[idx])
            .ok_or_else(|| PolyError::AppNotRegistered(label.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct TestApp {
        app_name: String,
        ready_called: Arc<AtomicBool>,
    }

    impl TestApp {
        fn boxed(name: &str) -> Box<Self> {
            Box::new(Self {
                app_name: name.to_string(),
                ready_called: Arc::new(AtomicBool::new(false)),
            })
        }
    }

    impl AppConfig for TestApp {
        fn name(&self) -> &str {
            &self.app_name
        }

        fn ready(&self) {
            self.ready_called.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_subclass_enumeration_in_order() {
        let user = ModelClass::root("User", "dispatch");
        let admin = ModelClass::subclass(&user, "Admin", "dispatch");
        let guest = ModelClass::subclass(&user, "Guest", "dispatch");

        let names: Vec<_> = user.subclasses().iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["Admin", "Guest"]);
        assert!(admin.subclasses().is_empty());
        assert!(guest.is_direct_subclass_of(&user));
    }

    #[test]
    fn test_subclasses_reflect_later_registration() {
        let user = ModelClass::root("User", "dispatch");
        let _admin = ModelClass::subclass(&user, "Admin", "dispatch");
        assert_eq!(user.subclasses().len(), 1);

        let _guest = ModelClass::subclass(&user, "Guest", "dispatch");
        assert_eq!(user.subclasses().len(), 2);
    }

    #[test]
    fn test_dropped_subclass_disappears() {
        let user = ModelClass::root("User", "dispatch");
        let temp = ModelClass::subclass(&user, "Temp", "dispatch");
        assert_eq!(user.subclasses().len(), 1);
        drop(temp);
        assert!(user.subclasses().is_empty());
    }

    #[test]
    fn test_grandchild_is_not_direct() {
        let user = ModelClass::root("User", "dispatch");
        let admin = ModelClass::subclass(&user, "Admin", "dispatch");
        let root_admin = ModelClass::subclass(&admin, "RootAdmin", "dispatch");

        assert!(!root_admin.is_direct_subclass_of(&user));
        assert!(root_admin.is_subclass_of(&user));
        assert!(root_admin.is_subclass_of(&root_admin));
        assert!(!user.is_subclass_of(&admin));
        assert!(!user.subclasses().contains(&root_admin));
    }

    #[test]
    fn test_identity_equality() {
        let a = ModelClass::root("Admin", "dispatch");
        let b = ModelClass::root("Admin", "legacy");
        assert_ne!(a, b);
        assert_eq!(a, Arc::clone(&a));

        let set: HashSet<ModelClassRef> = [Arc::clone(&a), b, a].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_register_and_get_app() {
        let mut registry = AppRegistry::new();
        registry.register(TestApp::boxed("project.dispatch"));

        let app = registry.get_app_config("dispatch").expect("app should exist");
        assert_eq!(app.name(), "project.dispatch");
        assert_eq!(app.label(), "dispatch");
        assert_eq!(registry.get_app_configs().count(), 1);
    }

    #[test]
    fn test_get_missing_app() {
        let registry = AppRegistry::new();
        let err = registry.get_app_config("nonexistent").err().expect("should fail");
        assert!(matches!(err, PolyError::AppNotRegistered(ref l) if l == "nonexistent"));
    }

    #[test]
    fn test_get_model_is_case_insensitive() {
        let mut registry = AppRegistry::new();
        registry.register(TestApp::boxed("dispatch"));
        let user = ModelClass::root("User", "dispatch");
        let admin = ModelClass::subclass(&user, "Admin", "dispatch");
        registry.register_model(Arc::clone(&admin));

        assert_eq!(registry.get_model("dispatch", "admin").unwrap(), admin);
        assert_eq!(registry.get_model("dispatch", "Admin").unwrap(), admin);
        assert_eq!(registry.get_model("dispatch", "ADMIN").unwrap(), admin);
    }

    #[test]
    fn test_get_model_missing() {
        let mut registry = AppRegistry::new();
        registry.register(TestApp::boxed("dispatch"));

        let err = registry.get_model("dispatch", "Robot").unwrap_err();
        assert!(matches!(
            err,
            PolyError::ModelNotRegistered { ref app_label, ref model_name }
                if app_label == "dispatch" && model_name == "robot"
        ));

        let err = registry.get_model("billing", "admin").unwrap_err();
        assert!(matches!(err, PolyError::AppNotRegistered(_)));
    }

    #[test]
    fn test_get_models_in_order() {
        let mut registry = AppRegistry::new();
        registry.register(TestApp::boxed("dispatch"));
        let user = ModelClass::root("User", "dispatch");
        registry.register_model(Arc::clone(&user));
        registry.register_model(ModelClass::subclass(&user, "Guest", "dispatch"));

        let names: Vec<_> = registry
            .get_models("dispatch")
            .unwrap()
            .iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(names, vec!["User", "Guest"]);
    }

    #[test]
    fn test_populate_calls_ready() {
        let ready = Arc::new(AtomicBool::new(false));
        let mut registry = AppRegistry::new();
        registry.register(Box::new(TestApp {
            app_name: "dispatch".into(),
            ready_called: Arc::clone(&ready),
        }));

        assert!(!registry.is_ready());
        registry.populate();
        assert!(registry.is_ready());
        assert!(ready.load(Ordering::SeqCst));
    }

    fn installed(apps: &[&str]) -> Settings {
        Settings {
            installed_apps: apps.iter().map(ToString::to_string).collect(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_populate_installed_matching_apps() {
        let mut registry = AppRegistry::new();
        registry.register(TestApp::boxed("project.dispatch"));
        registry.register(TestApp::boxed("billing"));

        registry
            .populate_installed(&installed(&["billing", "project.dispatch"]))
            .unwrap();
        assert!(registry.is_ready());
    }

    #[test]
    fn test_populate_installed_rejects_unregistered_app() {
        let mut registry = AppRegistry::new();
        registry.register(TestApp::boxed("billing"));

        let err = registry
            .populate_installed(&installed(&["project.dispatch", "billing"]))
            .unwrap_err();
        assert!(matches!(err, PolyError::ConfigurationError(_)));
        assert!(err.to_string().contains("not registered: project.dispatch"));
        assert!(!registry.is_ready());
    }

    #[test]
    fn test_populate_installed_rejects_uninstalled_app() {
        let mut registry = AppRegistry::new();
        registry.register(TestApp::boxed("project.dispatch"));
        registry.register(TestApp::boxed("billing"));

        let err = registry
            .populate_installed(&installed(&["project.dispatch"]))
            .unwrap_err();
        assert!(err.to_string().contains("missing from installed_apps: billing"));
        assert!(!registry.is_ready());
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_duplicate_label_panics() {
        let mut registry = AppRegistry::new();
        registry.register(TestApp::boxed("dispatch"));
        registry.register(TestApp::boxed("other.dispatch"));
    }

    #[test]
    #[should_panic(expected = "Conflicting 'admin' models")]
    fn test_duplicate_model_panics() {
        let mut registry = AppRegistry::new();
        registry.register(TestApp::boxed("dispatch"));
        registry.register_model(ModelClass::root("Admin", "dispatch"));
        registry.register_model(ModelClass::root("ADMIN", "dispatch"));
    }

    #[test]
    #[should_panic(expected = "is not registered")]
    fn test_model_for_unknown_app_panics() {
        let mut registry = AppRegistry::new();
        registry.register_model(ModelClass::root("Admin", "dispatch"));
    }

    #[test]
    #[should_panic(expected = "Cannot register models after the registry has been populated")]
    fn test_register_model_after_populate_panics() {
        let mut registry = AppRegistry::new();
        registry.register(TestApp::boxed("dispatch"));
        registry.populate();
        registry.register_model(ModelClass::root("Admin", "dispatch"));
    }

    #[test]
    #[should_panic(expected = "already been populated")]
    fn test_double_populate_panics() {
        let mut registry = AppRegistry::new();
        registry.populate();
        registry.populate();
    }
}
