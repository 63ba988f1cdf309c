//! # polyfield-forms
//!
//! The form layer polyfield fields hand off to. A model field's `formfield`
//! builds a [`FormFieldDef`](fields::FormFieldDef); the definition owns a
//! [`Widget`](widgets::Widget) that renders it and reads it back out of
//! submitted [`FormData`](data::FormData), and [`clean_field_value`](fields::clean_field_value)
//! turns the raw string into a [`Value`](polyfield_db::Value).
//!
//! ## Module Overview
//!
//! - [`data`] - Submitted form data with multiple values per key
//! - [`widgets`] - The [`Widget`](widgets::Widget) and [`ChoiceWidget`](widgets::ChoiceWidget) traits and the select widgets
//! - [`fields`] - Form field definitions and cleaning

#![allow(clippy::result_large_err)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_const_for_fn)]

pub mod data;
pub mod fields;
pub mod widgets;

pub use data::FormData;
pub use fields::{clean_field_value, Coerce, FormFieldDef, FormFieldType};
pub use widgets::{ChoiceWidget, Select, SelectMultiple, Widget, WidgetType};
