//! Field definitions and the field lifecycle.
//!
//! [`FieldDef`] holds the options every model field shares (column, nullability,
//! validators, ...) and [`FieldType`] names its column type. The [`Field`] trait
//! is the set of hooks the persistence layer calls; `FieldDef` implements it
//! with pass-through behaviour, and custom fields wrap a `FieldDef` and override
//! the hooks they need.

mod field;
pub mod types;

pub use field::{Deconstruction, Field};
pub use types::{FieldDef, FieldType};
