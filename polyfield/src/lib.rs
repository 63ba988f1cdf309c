//! # polyfield
//!
//! A model field whose value is one of the direct subclasses of a fixed
//! superclass. The column stores the subclass's name as text; reading it back
//! resolves the name through the application registry, so the defining
//! module never needs a static reference to every subclass.
//!
//! This is the meta-crate: it re-exports the sub-crates and adds the
//! [`subclass`] module with [`SubclassField`], [`SubclassValidator`], and
//! [`SubclassSelect`].
//!
//! ## Quick start
//!
//! ```
//! use std::sync::Arc;
//!
//! use polyfield::core::apps::{AppConfig, AppRegistry, ModelClass};
//! use polyfield::db::{Field, Value};
//! use polyfield::SubclassField;
//!
//! struct Dispatch;
//!
//! impl AppConfig for Dispatch {
//!     fn name(&self) -> &str { "dispatch" }
//! }
//!
//! let user = ModelClass::root("User", "dispatch");
//! let admin = ModelClass::subclass(&user, "Admin", "dispatch");
//!
//! let mut registry = AppRegistry::new();
//! registry.register(Box::new(Dispatch));
//! registry.register_model(Arc::clone(&admin));
//! registry.populate();
//!
//! let field = SubclassField::new("role", &user, "dispatch", Arc::new(registry));
//! assert_eq!(field.get_prep_value(Value::from(&admin)).unwrap(), Value::from("Admin"));
//! assert_eq!(field.from_db_value(Value::from("admin")).unwrap(), Value::from(&admin));
//! ```

/// Core types, settings, app registry, and error types.
pub use polyfield_core as core;

/// Field hooks, values, lookups, and the save/load helpers.
pub use polyfield_db as db;

/// Form data, choice widgets, and typed choice fields.
pub use polyfield_forms as forms;

pub mod subclass;

pub use subclass::{FormFieldOverrides, SubclassField, SubclassSelect, SubclassValidator};
