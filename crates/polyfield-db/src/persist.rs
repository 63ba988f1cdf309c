//! Running the field hooks over whole instances.
//!
//! [`prepare_save`] is the write path: for each field it calls `pre_save` and
//! then `get_prep_value`, producing the column values an INSERT or UPDATE
//! binds. [`hydrate`] is the read path: it passes each column of a [`Row`]
//! through `from_db_value`. [`full_clean`] validates every editable field and
//! reports failures per field.

use std::collections::HashMap;

use polyfield_core::logging::field_span;
use polyfield_core::{PolyError, PolyResult, ValidationError};

use crate::model::{Model, ModelMeta, Row};
use crate::value::Value;

/// Produces the `(column, value)` pairs to write for `instance`.
///
/// When `add` is `true`, a primary key whose current value is null is left out
/// so the database can assign it.
pub fn prepare_save(
    meta: &ModelMeta,
    instance: &mut dyn Model,
    add: bool,
) -> PolyResult<Vec<(String, Value)>> {
    let label = meta.label();
    let mut values = Vec::with_capacity(meta.fields.len());
    for field in &meta.fields {
        let span = field_span(&label, field.name());
        let _guard = span.enter();

        if add && field.def().primary_key && field.value_from_object(instance).is_null() {
            continue;
        }
        let raw = field.pre_save(instance, add)?;
        let prepared = field.get_prep_value(raw)?;
        tracing::trace!(column = field.column(), value = %prepared, "prepared for save");
        values.push((field.column().to_string(), prepared));
    }
    Ok(values)
}

/// Converts a row read from storage into `(attname, value)` pairs.
///
/// Every field of `meta` must have a column in `row`.
pub fn hydrate(meta: &ModelMeta, row: &Row) -> PolyResult<Vec<(&'static str, Value)>> {
    let label = meta.label();
    meta.fields
        .iter()
        .map(|field| {
            let span = field_span(&label, field.name());
            let _guard = span.enter();
            let raw = row.get(field.column())?.clone();
            let value = field.from_db_value(raw)?;
            Ok((field.attname(), value))
        })
        .collect()
}

/// Hydrates `row` and writes each value onto `instance`.
pub fn load_into(meta: &ModelMeta, row: &Row, instance: &mut dyn Model) -> PolyResult<()> {
    for (attname, value) in hydrate(meta, row)? {
        instance.set_value(attname, value)?;
    }
    Ok(())
}

/// Cleans every editable field of `instance`, writing cleaned values back.
///
/// Validation failures are collected per field and returned together; any
/// other error (a failed class lookup, for instance) aborts immediately.
pub fn full_clean(meta: &ModelMeta, instance: &mut dyn Model) -> PolyResult<()> {
    let mut field_errors: HashMap<String, Vec<ValidationError>> = HashMap::new();
    for field in meta.fields.iter().filter(|f| f.def().editable) {
        let raw = field.value_from_object(instance);
        match field.clean(raw) {
            Ok(cleaned) => instance.set_value(field.attname(), cleaned)?,
            Err(PolyError::ValidationError(err)) => {
                field_errors
                    .entry(field.name().to_string())
                    .or_default()
                    .push(err);
            }
            Err(other) => return Err(other),
        }
    }
    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::with_field_errors(field_errors).into())
    }
}
