//! The subclass field and its companions.
//!
//! - [`SubclassField`] stores a direct subclass of a fixed superclass as its
//!   class name and resolves it back through the app registry.
//! - [`SubclassValidator`] rejects anything that is not one of those
//!   subclasses.
//! - [`SubclassSelect`] renders the form choices, selecting by class name.

mod field;
mod validator;
mod widget;

pub use field::{FormFieldOverrides, SubclassField};
pub use validator::SubclassValidator;
pub use widget::SubclassSelect;
