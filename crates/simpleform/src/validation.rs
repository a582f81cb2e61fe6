//! Form field validators.
//!
//! A validator turns one submitted value into a clean value or an
//! [`Invalid`]. Every validator except [`NotEmpty`] accepts empty input
//! (missing, `null`, `""`, `[]`, `{}`) and converts it to its empty value,
//! so "required" is expressed by chaining [`NotEmpty`] in front with [`All`].

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::value::{is_empty, is_truthy, value_text};

/// Message used when a required field is empty.
pub const EMPTY_VALUE: &str = "Please enter a value";

/// A validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalid {
    /// A single message for the value.
    Message(String),
    /// Failures of a nested object, by key.
    Fields(BTreeMap<String, Invalid>),
    /// Failures of a list, by position; `None` for items that passed.
    Items(Vec<Option<Invalid>>),
}

impl Invalid {
    /// Creates a single-message failure.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl std::fmt::Display for Invalid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message(message) => f.write_str(message),
            Self::Fields(fields) => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|(key, nested)| format!("{key}: {nested}"))
                    .collect();
                f.write_str(&parts.join("\n"))
            }
            Self::Items(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .enumerate()
                    .filter_map(|(i, nested)| nested.as_ref().map(|n| format!("{i}: {n}")))
                    .collect();
                f.write_str(&parts.join("\n"))
            }
        }
    }
}

/// Trait for field validators.
pub trait Validator: Send + Sync {
    /// Validates a submitted value (`None` when the key was not submitted)
    /// and returns the clean value.
    fn validate(&self, value: Option<&Value>) -> Result<Value, Invalid>;

    /// Value used by a schema when the key is missing from the input.
    fn if_missing(&self) -> Option<Value> {
        None
    }
}

impl<V: Validator + ?Sized> Validator for Box<V> {
    fn validate(&self, value: Option<&Value>) -> Result<Value, Invalid> {
        (**self).validate(value)
    }

    fn if_missing(&self) -> Option<Value> {
        (**self).if_missing()
    }
}

/// Validator that requires a non-empty value.
#[derive(Debug, Clone)]
pub struct NotEmpty {
    message: String,
    strip: bool,
}

impl NotEmpty {
    /// Creates a new NotEmpty with default message.
    pub fn new() -> Self {
        Self {
            message: EMPTY_VALUE.to_string(),
            strip: false,
        }
    }

    /// Creates a new NotEmpty with custom message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            strip: false,
        }
    }

    /// Trims surrounding whitespace before checking, so blanks are empty.
    #[must_use]
    pub fn strip(mut self) -> Self {
        self.strip = true;
        self
    }
}

impl Default for NotEmpty {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for NotEmpty {
    fn validate(&self, value: Option<&Value>) -> Result<Value, Invalid> {
        let value = match value {
            Some(Value::String(s)) if self.strip => Some(Value::String(s.trim().to_string())),
            other => other.cloned(),
        };
        match value {
            Some(value) if !is_empty(Some(&value)) => Ok(value),
            _ => Err(Invalid::message(&self.message)),
        }
    }
}

/// Validator that converts the value to a string.
///
/// Empty input becomes the empty string.
#[derive(Debug, Clone, Default)]
pub struct Str {
    strip: bool,
}

impl Str {
    /// Creates a new Str.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trims surrounding whitespace.
    #[must_use]
    pub fn strip(mut self) -> Self {
        self.strip = true;
        self
    }
}

impl Validator for Str {
    fn validate(&self, value: Option<&Value>) -> Result<Value, Invalid> {
        let text = value.and_then(value_text).unwrap_or_default();
        let text = if self.strip {
            text.trim().to_string()
        } else {
            text
        };
        Ok(Value::String(text))
    }
}

fn length_of(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => value_text(other).map_or(0, |t| t.chars().count()),
    }
}

/// Validator that enforces a maximum length.
#[derive(Debug, Clone)]
pub struct MaxLength {
    max_length: usize,
    message: String,
}

impl MaxLength {
    /// Creates a new MaxLength.
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            message: format!("Enter a value less than {max_length} characters long"),
        }
    }

    /// Creates a new MaxLength with custom message.
    pub fn with_message(max_length: usize, message: impl Into<String>) -> Self {
        Self {
            max_length,
            message: message.into(),
        }
    }
}

impl Validator for MaxLength {
    fn validate(&self, value: Option<&Value>) -> Result<Value, Invalid> {
        match value {
            Some(v) if !is_empty(Some(v)) => {
                if length_of(v) > self.max_length {
                    Err(Invalid::message(&self.message))
                } else {
                    Ok(v.clone())
                }
            }
            _ => Ok(Value::Null),
        }
    }
}

/// Validator that enforces a minimum length.
#[derive(Debug, Clone)]
pub struct MinLength {
    min_length: usize,
    message: String,
}

impl MinLength {
    /// Creates a new MinLength.
    pub fn new(min_length: usize) -> Self {
        Self {
            min_length,
            message: format!("Enter a value at least {min_length} characters long"),
        }
    }

    /// Creates a new MinLength with custom message.
    pub fn with_message(min_length: usize, message: impl Into<String>) -> Self {
        Self {
            min_length,
            message: message.into(),
        }
    }
}

impl Validator for MinLength {
    fn validate(&self, value: Option<&Value>) -> Result<Value, Invalid> {
        match value {
            Some(v) if !is_empty(Some(v)) => {
                if length_of(v) < self.min_length {
                    Err(Invalid::message(&self.message))
                } else {
                    Ok(v.clone())
                }
            }
            _ => Ok(Value::Null),
        }
    }
}

/// Validator converting to an integer, with optional bounds.
#[derive(Debug, Clone, Default)]
pub struct Int {
    min: Option<i64>,
    max: Option<i64>,
}

impl Int {
    /// Creates a new Int without bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the smallest accepted value.
    #[must_use]
    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Sets the largest accepted value.
    #[must_use]
    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }
}

impl Validator for Int {
    fn validate(&self, value: Option<&Value>) -> Result<Value, Invalid> {
        let Some(value) = value.filter(|v| !is_empty(Some(*v))) else {
            return Ok(Value::Null);
        };
        let number = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
        .ok_or_else(|| Invalid::message("Please enter an integer value"))?;

        if let Some(min) = self.min {
            if number < min {
                return Err(Invalid::message(format!(
                    "Please enter a number that is {min} or greater"
                )));
            }
        }
        if let Some(max) = self.max {
            if number > max {
                return Err(Invalid::message(format!(
                    "Please enter a number that is {max} or smaller"
                )));
            }
        }
        Ok(Value::from(number))
    }
}

/// Validator converting to a number; integral results stay integers.
#[derive(Debug, Clone, Default)]
pub struct Number {
    min: Option<f64>,
    max: Option<f64>,
}

impl Number {
    /// Creates a new Number without bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the smallest accepted value.
    #[must_use]
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Sets the largest accepted value.
    #[must_use]
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }
}

impl Validator for Number {
    fn validate(&self, value: Option<&Value>) -> Result<Value, Invalid> {
        let Some(value) = value.filter(|v| !is_empty(Some(*v))) else {
            return Ok(Value::Null);
        };
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|f| f.is_finite())
        .ok_or_else(|| Invalid::message("Please enter a number"))?;

        if let Some(min) = self.min {
            if number < min {
                return Err(Invalid::message(format!(
                    "Please enter a number that is {min} or greater"
                )));
            }
        }
        if let Some(max) = self.max {
            if number > max {
                return Err(Invalid::message(format!(
                    "Please enter a number that is {max} or smaller"
                )));
            }
        }

        if number.fract() == 0.0 && number.abs() < 9_007_199_254_740_992.0 {
            return Ok(Value::from(number as i64));
        }
        serde_json::Number::from_f64(number)
            .map(Value::Number)
            .ok_or_else(|| Invalid::message("Please enter a number"))
    }
}

/// Validator converting any input to a boolean by truthiness.
///
/// Suited to checkboxes: an unchecked box is not submitted and becomes
/// `false`.
#[derive(Debug, Clone, Default)]
pub struct Bool;

impl Bool {
    /// Creates a new Bool.
    pub fn new() -> Self {
        Self
    }
}

impl Validator for Bool {
    fn validate(&self, value: Option<&Value>) -> Result<Value, Invalid> {
        Ok(Value::Bool(is_truthy(value)))
    }

    fn if_missing(&self) -> Option<Value> {
        Some(Value::Bool(false))
    }
}

const TRUE_WORDS: [&str; 6] = ["true", "t", "yes", "y", "on", "1"];
const FALSE_WORDS: [&str; 6] = ["false", "f", "no", "n", "off", "0"];

/// Validator accepting only well-known true/false words.
#[derive(Debug, Clone, Default)]
pub struct StringBool;

impl StringBool {
    /// Creates a new StringBool.
    pub fn new() -> Self {
        Self
    }
}

impl Validator for StringBool {
    fn validate(&self, value: Option<&Value>) -> Result<Value, Invalid> {
        let Some(value) = value.filter(|v| !is_empty(Some(*v))) else {
            return Ok(Value::Null);
        };
        if let Value::Bool(b) = value {
            return Ok(Value::Bool(*b));
        }
        let word = value_text(value).unwrap_or_default().trim().to_lowercase();
        if TRUE_WORDS.contains(&word.as_str()) {
            Ok(Value::Bool(true))
        } else if FALSE_WORDS.contains(&word.as_str()) {
            Ok(Value::Bool(false))
        } else {
            Err(Invalid::message("Value should be 'true' or 'false'"))
        }
    }
}

static EMAIL_USER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9!#$%&'*+\-/=?^_`{|}~.]+$").expect("valid email user pattern")
});

static EMAIL_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)(?:[a-z0-9](?:[a-z0-9\-]{0,61}[a-z0-9])?\.)+[a-z]{2,}$")
        .expect("valid email domain pattern")
});

/// Validator for email addresses.
#[derive(Debug, Clone, Default)]
pub struct Email;

impl Email {
    /// Creates a new Email.
    pub fn new() -> Self {
        Self
    }
}

impl Validator for Email {
    fn validate(&self, value: Option<&Value>) -> Result<Value, Invalid> {
        let Some(value) = value.filter(|v| !is_empty(Some(*v))) else {
            return Ok(Value::Null);
        };
        let address = value_text(value).unwrap_or_default().trim().to_string();

        let mut parts = address.split('@');
        let (Some(user), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Invalid::message("An email address must contain a single @"));
        };
        if !EMAIL_USER.is_match(user) {
            return Err(Invalid::message(format!(
                "The username portion of the email address is invalid \
                 (the portion before the @: {user})"
            )));
        }
        if !EMAIL_DOMAIN.is_match(domain) {
            return Err(Invalid::message(format!(
                "The domain portion of the email address is invalid \
                 (the portion after the @: {domain})"
            )));
        }
        Ok(Value::String(address))
    }
}

static URL_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)[a-z][a-z0-9+.\-]*://").expect("valid scheme pattern"));

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)https?://(?:[a-z0-9\-]+\.)+[a-z]{2,}(?::\d+)?(?:[/?#]\S*)?$")
        .expect("valid url pattern")
});

/// Validator for http(s) URLs.
#[derive(Debug, Clone, Default)]
pub struct Url {
    add_http: bool,
}

impl Url {
    /// Creates a new Url.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends `http://` when the value has no scheme.
    #[must_use]
    pub fn add_http(mut self) -> Self {
        self.add_http = true;
        self
    }
}

impl Validator for Url {
    fn validate(&self, value: Option<&Value>) -> Result<Value, Invalid> {
        let Some(value) = value.filter(|v| !is_empty(Some(*v))) else {
            return Ok(Value::Null);
        };
        let mut url = value_text(value).unwrap_or_default().trim().to_string();

        if !URL_SCHEME.is_match(&url) {
            if !self.add_http {
                return Err(Invalid::message(
                    "You must start your URL with http://, https://, etc",
                ));
            }
            url = format!("http://{url}");
        }
        if URL.is_match(&url) {
            Ok(Value::String(url))
        } else {
            Err(Invalid::message("That is not a valid URL"))
        }
    }
}

/// Validator using a custom regex pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    pattern: Regex,
    message: String,
}

impl Pattern {
    /// Creates a new Pattern.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            message: "The input is not valid".to_string(),
        })
    }

    /// Sets the failure message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl Validator for Pattern {
    fn validate(&self, value: Option<&Value>) -> Result<Value, Invalid> {
        let Some(value) = value.filter(|v| !is_empty(Some(*v))) else {
            return Ok(Value::Null);
        };
        let text = value_text(value).unwrap_or_default();
        if self.pattern.is_match(&text) {
            Ok(value.clone())
        } else {
            Err(Invalid::message(&self.message))
        }
    }
}

/// Validator accepting only values from a fixed list.
#[derive(Debug, Clone)]
pub struct OneOf {
    choices: Vec<Value>,
    hide_list: bool,
}

impl OneOf {
    /// Creates a new OneOf.
    pub fn new<I, V>(choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
            hide_list: false,
        }
    }

    /// Leaves the accepted values out of the failure message.
    #[must_use]
    pub fn hide_list(mut self) -> Self {
        self.hide_list = true;
        self
    }
}

impl Validator for OneOf {
    fn validate(&self, value: Option<&Value>) -> Result<Value, Invalid> {
        let Some(value) = value.filter(|v| !is_empty(Some(*v))) else {
            return Ok(Value::Null);
        };
        let text = value_text(value);
        let found = self
            .choices
            .iter()
            .find(|choice| *choice == value || value_text(choice) == text);
        if let Some(choice) = found {
            return Ok(choice.clone());
        }

        if self.hide_list {
            return Err(Invalid::message("Invalid value"));
        }
        let items: Vec<String> = self.choices.iter().filter_map(value_text).collect();
        Err(Invalid::message(format!(
            "Value must be one of: {} (not '{}')",
            items.join("; "),
            text.unwrap_or_default()
        )))
    }
}

/// Applies a validator to every item of a list.
///
/// A single value is treated as a one-item list; empty input is an empty
/// list.
#[derive(Debug, Clone)]
pub struct ForEach<V> {
    inner: V,
}

impl<V: Validator> ForEach<V> {
    /// Creates a new ForEach.
    pub fn new(inner: V) -> Self {
        Self { inner }
    }
}

impl<V: Validator> Validator for ForEach<V> {
    fn validate(&self, value: Option<&Value>) -> Result<Value, Invalid> {
        let items = match value {
            Some(Value::Array(items)) => items.clone(),
            Some(v) if !is_empty(Some(v)) => vec![v.clone()],
            _ => Vec::new(),
        };

        let mut clean = Vec::with_capacity(items.len());
        let mut failures = Vec::with_capacity(items.len());
        let mut failed = false;
        for item in &items {
            match self.inner.validate(Some(item)) {
                Ok(v) => {
                    clean.push(v);
                    failures.push(None);
                }
                Err(e) => {
                    failed = true;
                    failures.push(Some(e));
                }
            }
        }

        if failed {
            Err(Invalid::Items(failures))
        } else {
            Ok(Value::Array(clean))
        }
    }

    fn if_missing(&self) -> Option<Value> {
        Some(Value::Array(Vec::new()))
    }
}

/// Runs validators in order, feeding each the previous clean value.
///
/// Stops at the first failure.
#[derive(Default)]
pub struct All {
    validators: Vec<Box<dyn Validator>>,
}

impl All {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a validator.
    #[must_use]
    pub fn then(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }
}

impl std::fmt::Debug for All {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("All")
            .field("validators", &self.validators.len())
            .finish()
    }
}

impl Validator for All {
    fn validate(&self, value: Option<&Value>) -> Result<Value, Invalid> {
        let mut current = value.cloned();
        for validator in &self.validators {
            current = Some(validator.validate(current.as_ref())?);
        }
        Ok(current.unwrap_or(Value::Null))
    }

    fn if_missing(&self) -> Option<Value> {
        self.validators.iter().find_map(|v| v.if_missing())
    }
}

/// Gives a validator a value to use when its key is missing.
#[derive(Debug, Clone)]
pub struct IfMissing<V> {
    inner: V,
    default: Value,
}

impl<V: Validator> IfMissing<V> {
    /// Wraps `inner`, using `default` for missing keys.
    pub fn new(inner: V, default: impl Into<Value>) -> Self {
        Self {
            inner,
            default: default.into(),
        }
    }
}

impl<V: Validator> Validator for IfMissing<V> {
    fn validate(&self, value: Option<&Value>) -> Result<Value, Invalid> {
        self.inner.validate(value)
    }

    fn if_missing(&self) -> Option<Value> {
        Some(self.default.clone())
    }
}
