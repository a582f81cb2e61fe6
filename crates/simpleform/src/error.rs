//! Error types for forms.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::validation::Invalid;

/// Form usage errors.
///
/// Validation failures never show up here; they are collected into
/// [`ValidationErrors`] on the form.
#[derive(Debug, Error)]
pub enum FormError {
    /// The form has neither a schema nor field validators.
    #[error("a form needs a schema and/or field validators")]
    NoValidators,

    /// `bind` was called before `validate`.
    #[error("form has not been validated, call validate() first")]
    NotValidated,

    /// `bind` was called after a failed validation.
    #[error("cannot bind to object if form has errors")]
    HasErrors,

    /// A validated value does not fit the target field.
    #[error("cannot bind field {field}: {message}")]
    Bind { field: String, message: String },
}

/// Collection of validation errors by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    /// Errors keyed by field name.
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Creates a new empty ValidationErrors.
    pub fn new() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }

    /// Adds an error for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Adds a validator failure under `field`, flattening nested failures.
    ///
    /// Nested keys are joined with `dict_char` (`address.city`) and list
    /// positions with `list_char` (`tags-1`).
    pub fn add_invalid(&mut self, field: &str, invalid: &Invalid, dict_char: char, list_char: char) {
        match invalid {
            Invalid::Message(message) => self.add(field, message.clone()),
            Invalid::Fields(fields) => {
                for (key, nested) in fields {
                    let name = if field.is_empty() {
                        key.clone()
                    } else {
                        format!("{field}{dict_char}{key}")
                    };
                    self.add_invalid(&name, nested, dict_char, list_char);
                }
            }
            Invalid::Items(items) => {
                for (index, nested) in items.iter().enumerate() {
                    if let Some(nested) = nested {
                        let name = format!("{field}{list_char}{index}");
                        self.add_invalid(&name, nested, dict_char, list_char);
                    }
                }
            }
        }
    }

    /// Returns whether there are any errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of fields with errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns errors for a specific field.
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    /// Returns whether a field has errors.
    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Returns all errors as a flat list, ordered by field name.
    pub fn all_errors(&self) -> Vec<(&str, &str)> {
        self.errors
            .iter()
            .flat_map(|(field, messages)| {
                messages
                    .iter()
                    .map(move |msg| (field.as_str(), msg.as_str()))
            })
            .collect()
    }

    /// Removes every error.
    pub fn clear(&mut self) {
        self.errors.clear();
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (field, messages) in &self.errors {
            for message in messages {
                writeln!(f, "{field}: {message}")?;
            }
        }
        Ok(())
    }
}

/// Result type alias for form operations.
pub type Result<T> = std::result::Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_query() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "Missing value");
        errors.add("name", "Too short");
        errors.add("age", "Please enter an integer value");

        assert_eq!(errors.len(), 2);
        assert!(errors.contains("name"));
        assert_eq!(errors.get("name").map(Vec::len), Some(2));
        assert_eq!(
            errors.all_errors(),
            vec![
                ("age", "Please enter an integer value"),
                ("name", "Missing value"),
                ("name", "Too short"),
            ]
        );
    }

    #[test]
    fn test_add_invalid_flattens_nested_errors() {
        let invalid = Invalid::Fields(BTreeMap::from([
            (
                "address".to_string(),
                Invalid::Fields(BTreeMap::from([(
                    "city".to_string(),
                    Invalid::message("Missing value"),
                )])),
            ),
            (
                "tags".to_string(),
                Invalid::Items(vec![None, Some(Invalid::message("Please enter a value"))]),
            ),
        ]));

        let mut errors = ValidationErrors::new();
        errors.add_invalid("", &invalid, '.', '-');

        assert_eq!(
            errors.get("address.city"),
            Some(&vec!["Missing value".to_string()])
        );
        assert_eq!(
            errors.get("tags-1"),
            Some(&vec!["Please enter a value".to_string()])
        );
        assert!(!errors.contains("tags-0"));
    }

    #[test]
    fn test_serializes_as_map() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "Missing value");
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({"name": ["Missing value"]})
        );
    }

    #[test]
    fn test_display() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "Missing value");
        assert_eq!(errors.to_string(), "name: Missing value\n");
    }
}
