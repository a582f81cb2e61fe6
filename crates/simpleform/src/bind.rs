//! Objects that forms can read initial values from and bind clean data onto.

use std::collections::HashMap;

use serde_json::{Map, Value};

/// An object whose fields a form can read and write by name.
///
/// Usually implemented with `#[derive(Bind)]`:
///
/// ```rust
/// use simpleform::{Bind, Bindable};
///
/// #[derive(Bind, Default)]
/// struct Person {
///     name: Option<String>,
///     #[bind(rename = "years")]
///     age: u32,
///     #[bind(skip)]
///     id: u64,
/// }
///
/// let mut person = Person::default();
/// person.set_field("years", serde_json::json!(40)).unwrap();
/// assert_eq!(person.age, 40);
/// assert_eq!(person.field_names(), vec!["name", "years"]);
/// assert!(!person.has_field("id"));
/// ```
pub trait Bindable {
    /// Names of the fields forms may read.
    fn field_names(&self) -> Vec<&str>;

    /// Returns whether the object has a field called `name`.
    fn has_field(&self, name: &str) -> bool;

    /// Current value of a field.
    fn field_value(&self, name: &str) -> Option<Value>;

    /// Replaces a field with a validated value.
    fn set_field(&mut self, name: &str, value: Value) -> Result<(), String>;
}

impl Bindable for Map<String, Value> {
    fn field_names(&self) -> Vec<&str> {
        self.keys().map(String::as_str).collect()
    }

    fn has_field(&self, _name: &str) -> bool {
        true
    }

    fn field_value(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), String> {
        self.insert(name.to_string(), value);
        Ok(())
    }
}

impl Bindable for HashMap<String, Value> {
    fn field_names(&self) -> Vec<&str> {
        self.keys().map(String::as_str).collect()
    }

    fn has_field(&self, _name: &str) -> bool {
        true
    }

    fn field_value(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), String> {
        self.insert(name.to_string(), value);
        Ok(())
    }
}
