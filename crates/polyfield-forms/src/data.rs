//! Submitted form data.
//!
//! A browser submits `name=value` pairs where one name may appear several
//! times (a multi-select, for instance). [`FormData`] keeps every value in
//! submission order; [`get`](FormData::get) returns the last one.

use std::collections::HashMap;

/// Form data mapping each field name to the list of submitted values.
///
/// # Examples
///
/// ```
/// use polyfield_forms::data::FormData;
///
/// let mut data = FormData::new();
/// data.append("role", "Guest");
/// data.append("role", "Admin");
///
/// assert_eq!(data.get("role"), Some("Admin"));
/// assert_eq!(data.get_list("role"), Some(&["Guest".to_string(), "Admin".to_string()][..]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    inner: HashMap<String, Vec<String>>,
}

impl FormData {
    /// Creates empty form data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .get(name)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    /// Returns every value submitted under `name`.
    pub fn get_list(&self, name: &str) -> Option<&[String]> {
        self.inner.get(name).map(Vec::as_slice)
    }

    /// Replaces all values under `name` with a single value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(name.into(), vec![value.into()]);
    }

    /// Adds a value under `name`, keeping earlier ones.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.entry(name.into()).or_default().push(value.into());
    }

    /// Returns `true` if anything was submitted under `name`.
    pub fn contains_key(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Returns the number of distinct names.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if nothing was submitted.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = Self::new();
        for (name, value) in iter {
            data.append(name, value);
        }
        data
    }
}
