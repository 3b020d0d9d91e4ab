//! Form cleaning.
//!
//! Each submitted form goes through two stages: the declarative `validator`
//! rules derived on the request struct (lengths, email, ranges), then an
//! explicit per-entity pipeline of content rules. All failures from both
//! stages are collected into one [`FieldErrors`] so the caller sees every bad
//! field at once. Nothing is persisted unless cleaning succeeds.

pub mod account;
pub mod blog;
pub mod catalog;
pub mod rules;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

pub use rules::{sanitize_text, Rule};

/// Field name -> messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(|v| v.as_slice())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                out.add(&field.to_string(), message);
            }
        }
        out
    }
}

impl From<FieldErrors> for crate::error::AppError {
    fn from(errors: FieldErrors) -> Self {
        crate::error::AppError::Validation(errors)
    }
}

/// Collects errors while a form's fields are being cleaned
#[derive(Debug, Default)]
pub struct Pipeline {
    errors: FieldErrors,
}

impl Pipeline {
    /// Start from the declarative rules of `form`
    pub fn start<T: Validate>(form: &T) -> Self {
        let errors = match form.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => e.into(),
        };
        Self { errors }
    }

    /// Run `rules` against the raw `value`
    pub fn rules(&mut self, field: &str, value: &str, rules: &[Rule]) {
        for rule in rules {
            if let Err(message) = rule(value) {
                self.errors.add(field, message);
            }
        }
    }

    /// Run `rules` against `value` and return its normalized form.
    /// The normalized value is only meaningful if the pipeline finishes Ok.
    pub fn text(&mut self, field: &str, value: &str, rules: &[Rule]) -> String {
        self.rules(field, value, rules);
        sanitize_text(value)
    }

    /// Like [`Pipeline::text`], with `max` checked on the normalized value,
    /// which is what gets stored
    pub fn limited(&mut self, field: &str, value: &str, rules: &[Rule], max: usize) -> String {
        let clean = self.text(field, value, rules);
        self.max_chars(field, &clean, max);
        clean
    }

    /// Like [`Pipeline::limited`], and the normalized value must not be empty
    pub fn required(&mut self, field: &str, value: &str, rules: &[Rule], max: usize) -> String {
        let clean = self.limited(field, value, rules, max);
        if !self.errors.contains(field) {
            if let Err(message) = rules::required(&clean) {
                self.errors.add(field, message);
            }
        }
        clean
    }

    pub fn optional_text(&mut self, field: &str, value: Option<&str>, rules: &[Rule]) -> String {
        value.map(|v| self.text(field, v, rules)).unwrap_or_default()
    }

    pub fn optional_limited(
        &mut self,
        field: &str,
        value: Option<&str>,
        rules: &[Rule],
        max: usize,
    ) -> String {
        value.map(|v| self.limited(field, v, rules, max)).unwrap_or_default()
    }

    pub fn max_chars(&mut self, field: &str, value: &str, max: usize) {
        let length = value.chars().count();
        if length > max {
            self.errors.add(
                field,
                format!(
                    "Ensure this value has at most {} characters once escaped (it has {}).",
                    max, length
                ),
            );
        }
    }

    /// Record the error of a single check, keeping its value on success
    pub fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.errors.add(field, message);
                None
            }
        }
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    pub fn has_errors_for(&self, field: &str) -> bool {
        self.errors.contains(field)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Return `record` if no field failed
    pub fn finish<T>(self, record: T) -> Result<T, FieldErrors> {
        if self.errors.is_empty() {
            Ok(record)
        } else {
            Err(self.errors)
        }
    }
}
