//! Per-form `{values, errors, touched}` record.

use std::collections::{BTreeMap, BTreeSet};

use crate::schema::{FormValues, Schema};
use crate::FieldError;

/// What a renderer keeps for one form.
///
/// Errors are recomputed from the schema; they are only *shown* for fields
/// the user has touched or after a submit attempt.
#[derive(Clone, Debug, Default)]
pub struct FormState {
    values: FormValues,
    errors: BTreeMap<String, String>,
    touched: BTreeSet<String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from default values (nothing touched).
    pub fn with_values(values: FormValues) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    /// Record user input. Marks the field touched and clears its stale error.
    pub fn set_value(&mut self, field: &str, value: impl Into<String>) {
        self.values.insert(field.to_string(), value.into());
        self.touched.insert(field.to_string());
        self.errors.remove(field);
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    /// Re-run the schema over the current values.
    pub fn validate(&mut self, schema: &Schema) -> bool {
        self.errors = match schema.validate(&self.values) {
            Ok(()) => BTreeMap::new(),
            Err(errs) => errs.into_iter().map(|e| (e.field, e.message)).collect(),
        };
        self.errors.is_empty()
    }

    /// Submit attempt: every schema field becomes touched, then validate.
    /// Returns the values only if they pass.
    pub fn submit(&mut self, schema: &Schema) -> Result<&FormValues, Vec<FieldError>> {
        for name in schema.field_names() {
            self.touched.insert(name.to_string());
        }
        if self.validate(schema) {
            Ok(&self.values)
        } else {
            Err(self.errors())
        }
    }

    /// All current errors, touched or not.
    pub fn errors(&self) -> Vec<FieldError> {
        self.errors
            .iter()
            .map(|(f, m)| FieldError::new(f, m))
            .collect()
    }

    /// The error to display next to `field`, if it has been touched.
    pub fn visible_error(&self, field: &str) -> Option<&str> {
        if !self.is_touched(field) {
            return None;
        }
        self.errors.get(field).map(String::as_str)
    }

    /// Clear a field (e.g. a dependent select after its parent changed).
    pub fn clear(&mut self, field: &str) {
        self.values.insert(field.to_string(), String::new());
        self.errors.remove(field);
    }
}
