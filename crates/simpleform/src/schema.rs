//! Schemas: ordered field validators over a dict-like input.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::validation::{Invalid, Validator};

/// Message for a schema field absent from the input.
pub const MISSING_VALUE: &str = "Missing value";

/// Error key for failures that belong to no single field.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Validates a whole form submission.
///
/// Fields are validated in declaration order. A field missing from the input
/// takes its validator's [`Validator::if_missing`] value, then the schema's
/// `if_key_missing` value, and otherwise fails with [`MISSING_VALUE`].
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use simpleform::{All, Int, NotEmpty, Schema};
///
/// let schema = Schema::new()
///     .field("name", NotEmpty::new())
///     .field("age", All::new().then(NotEmpty::new()).then(Int::new()));
///
/// let input = json!({"name": "Fred", "age": "42"});
/// let clean = schema.validate_map(input.as_object().unwrap()).unwrap();
/// assert_eq!(clean["age"], json!(42));
/// ```
#[derive(Default)]
pub struct Schema {
    fields: Vec<(String, Box<dyn Validator>)>,
    chained: Vec<Box<dyn Validator>>,
    allow_extra_fields: bool,
    filter_extra_fields: bool,
    ignore_key_missing: bool,
    if_key_missing: Option<Value>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field validator.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, validator: impl Validator + 'static) -> Self {
        self.fields.push((name.into(), Box::new(validator)));
        self
    }

    /// Adds a validator run over the whole clean result once every field
    /// has passed.
    #[must_use]
    pub fn chained(mut self, validator: impl Validator + 'static) -> Self {
        self.chained.push(Box::new(validator));
        self
    }

    /// Accepts keys that have no validator.
    #[must_use]
    pub fn allow_extra_fields(mut self, allow: bool) -> Self {
        self.allow_extra_fields = allow;
        self
    }

    /// Drops accepted extra keys from the clean result.
    #[must_use]
    pub fn filter_extra_fields(mut self, filter: bool) -> Self {
        self.filter_extra_fields = filter;
        self
    }

    /// Leaves missing keys out of the result instead of failing them.
    #[must_use]
    pub fn ignore_key_missing(mut self, ignore: bool) -> Self {
        self.ignore_key_missing = ignore;
        self
    }

    /// Value used for any missing key whose validator has no own default.
    #[must_use]
    pub fn if_key_missing(mut self, value: impl Into<Value>) -> Self {
        self.if_key_missing = Some(value.into());
        self
    }

    /// Returns the field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Returns whether the schema declares `name`.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(field, _)| field == name)
    }

    /// Validates every field of `input`.
    pub fn validate_map(
        &self,
        input: &Map<String, Value>,
    ) -> Result<Map<String, Value>, BTreeMap<String, Invalid>> {
        let mut clean = Map::new();
        let mut errors = BTreeMap::new();

        for (key, value) in input {
            if self.has_field(key) {
                continue;
            }
            if !self.allow_extra_fields {
                errors.insert(
                    key.clone(),
                    Invalid::message(format!("The input field '{key}' was not expected.")),
                );
            } else if !self.filter_extra_fields {
                clean.insert(key.clone(), value.clone());
            }
        }

        for (name, validator) in &self.fields {
            let result = match input.get(name) {
                Some(value) => validator.validate(Some(value)),
                None => {
                    if self.ignore_key_missing {
                        continue;
                    }
                    match validator.if_missing().or_else(|| self.if_key_missing.clone()) {
                        Some(default) => Ok(default),
                        None => Err(Invalid::message(MISSING_VALUE)),
                    }
                }
            };
            match result {
                Ok(value) => {
                    clean.insert(name.clone(), value);
                }
                Err(invalid) => {
                    errors.insert(name.clone(), invalid);
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let mut clean = Value::Object(clean);
        for validator in &self.chained {
            match validator.validate(Some(&clean)) {
                Ok(value) => clean = value,
                Err(Invalid::Fields(fields)) => return Err(fields),
                Err(other) => return Err(BTreeMap::from([(NON_FIELD_ERRORS.to_string(), other)])),
            }
        }

        match clean {
            Value::Object(map) => Ok(map),
            _ => Err(BTreeMap::from([(
                NON_FIELD_ERRORS.to_string(),
                Invalid::message("The input must be dict-like"),
            )])),
        }
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .field("chained", &self.chained.len())
            .field("allow_extra_fields", &self.allow_extra_fields)
            .field("filter_extra_fields", &self.filter_extra_fields)
            .field("ignore_key_missing", &self.ignore_key_missing)
            .finish()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

impl Validator for Schema {
    fn validate(&self, value: Option<&Value>) -> Result<Value, Invalid> {
        match value {
            None | Some(Value::Null) => self
                .validate_map(&Map::new())
                .map(Value::Object)
                .map_err(Invalid::Fields),
            Some(Value::Object(map)) => self
                .validate_map(map)
                .map(Value::Object)
                .map_err(Invalid::Fields),
            Some(other) => Err(Invalid::message(format!(
                "The input must be dict-like (not a {})",
                type_name(other)
            ))),
        }
    }
}

/// Chained validator requiring several fields to hold the same value.
///
/// The mismatch is reported on every field after the first.
#[derive(Debug, Clone)]
pub struct FieldsMatch {
    fields: Vec<String>,
    message: String,
}

impl FieldsMatch {
    /// Creates a new FieldsMatch.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            message: "Fields do not match".to_string(),
        }
    }

    /// Sets the mismatch message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl Validator for FieldsMatch {
    fn validate(&self, value: Option<&Value>) -> Result<Value, Invalid> {
        let Some(Value::Object(map)) = value else {
            return Err(Invalid::message("The input must be dict-like"));
        };
        let Some((first, rest)) = self.fields.split_first() else {
            return Ok(Value::Object(map.clone()));
        };

        let expected = map.get(first);
        let errors: BTreeMap<String, Invalid> = rest
            .iter()
            .filter(|name| map.get(name.as_str()) != expected)
            .map(|name| (name.clone(), Invalid::message(&self.message)))
            .collect();

        if errors.is_empty() {
            Ok(Value::Object(map.clone()))
        } else {
            Err(Invalid::Fields(errors))
        }
    }
}
