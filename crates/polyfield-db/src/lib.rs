//! # polyfield-db
//!
//! The ORM layer polyfield fields plug into. A [`Field`](fields::Field) is a
//! set of lifecycle hooks the persistence layer calls at fixed points:
//! `to_python` when cleaning input, `get_prep_value` before writing,
//! `from_db_value` after reading, `get_prep_lookup` when building filters,
//! and `pre_save` just before an instance is serialized.
//!
//! ## Module Overview
//!
//! - [`value`] - The backend-agnostic [`Value`](value::Value) enum
//! - [`validators`] - The [`Validator`](validators::Validator) trait
//! - [`fields`] - [`Field`](fields::Field), [`FieldDef`](fields::FieldDef), and column types
//! - [`lookups`] - Lookup types and compiled filters
//! - [`model`] - The [`Model`](model::Model) trait, [`ModelMeta`](model::ModelMeta), and [`Row`](model::Row)
//! - [`persist`] - Running the save and load hooks over a whole instance

// result_large_err: PolyError is the crate-wide error type and is used consistently
// needless_pass_by_value: hook signatures take values by value like their host counterparts
#![allow(clippy::result_large_err)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_const_for_fn)]

pub mod fields;
pub mod lookups;
pub mod model;
pub mod persist;
pub mod validators;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use fields::{Deconstruction, Field, FieldDef, FieldType};
pub use lookups::{Filter, LookupType};
pub use model::{Model, ModelMeta, Row};
pub use persist::{full_clean, hydrate, load_into, prepare_save};
pub use validators::Validator;
pub use value::Value;
