//! # polyfield-core
//!
//! Core types for polyfield: the error taxonomy, the model-class registry that
//! resolves stored class names back into class descriptors, settings, and
//! logging setup. This crate has no framework dependencies and is the
//! foundation for the ORM and forms crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`apps`] - Model classes, application configs, and the app registry
//! - [`settings`] - Start-up settings
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod apps;
pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use apps::{AppConfig, AppRegistry, ModelClass, ModelClassRef};
pub use error::{PolyError, PolyResult, ValidationError};
pub use settings::Settings;
