//! Decoding of flat field names into nested values.
//!
//! `address.city=Paris` becomes `{"address": {"city": "Paris"}}` and
//! `tags-0=a&tags-1=b` becomes `{"tags": ["a", "b"]}`. The two combine, as in
//! `people-0.name`.
//!
//! A name used both as a plain field and as a container (`a=1&a.b=2`, or
//! `a-0=1&a.b=2`) is a conflict and fails the decode.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use simpleform_http::Params;
use thiserror::Error;

/// Submitted names that cannot share one nested value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Conflicting values submitted for {field}")]
pub struct DecodeConflict {
    /// The parameter name that collided with an earlier one.
    pub field: String,
}

enum Node {
    Leaf(Vec<String>),
    Dict(Vec<(String, Node)>),
    List(BTreeMap<usize, Node>),
}

enum Step {
    Key(String),
    Index(usize),
}

fn parse_path(name: &str, dict_char: char, list_char: char) -> Vec<Step> {
    let mut steps = Vec::new();
    for segment in name.split(dict_char) {
        let mut parts = segment.split(list_char);
        let head = parts.next().unwrap_or_default();
        let indices: Option<Vec<usize>> = parts.map(|p| p.parse::<usize>().ok()).collect();
        match indices {
            Some(indices) if !indices.is_empty() && !head.is_empty() => {
                steps.push(Step::Key(head.to_string()));
                steps.extend(indices.into_iter().map(Step::Index));
            }
            _ => steps.push(Step::Key(segment.to_string())),
        }
    }
    steps
}

impl Node {
    /// Inserts `value` at `steps`; `false` when the path clashes with an
    /// existing value of another shape.
    fn insert(&mut self, steps: &[Step], value: &str) -> bool {
        let Some((step, rest)) = steps.split_first() else {
            return match self {
                Self::Leaf(values) => {
                    values.push(value.to_string());
                    true
                }
                _ => false,
            };
        };

        let child = match step {
            Step::Key(key) => {
                if matches!(self, Self::Leaf(values) if values.is_empty()) {
                    *self = Self::Dict(Vec::new());
                }
                let Self::Dict(entries) = self else {
                    return false;
                };
                let position = match entries.iter().position(|(k, _)| k == key) {
                    Some(position) => position,
                    None => {
                        entries.push((key.clone(), Self::Leaf(Vec::new())));
                        entries.len() - 1
                    }
                };
                &mut entries[position].1
            }
            Step::Index(index) => {
                if matches!(self, Self::Leaf(values) if values.is_empty()) {
                    *self = Self::List(BTreeMap::new());
                }
                let Self::List(items) = self else {
                    return false;
                };
                items.entry(*index).or_insert_with(|| Self::Leaf(Vec::new()))
            }
        };
        child.insert(rest, value)
    }

    fn into_value(self) -> Value {
        match self {
            Self::Leaf(mut values) => {
                if values.len() == 1 {
                    Value::String(values.remove(0))
                } else {
                    Value::Array(values.into_iter().map(Value::String).collect())
                }
            }
            Self::Dict(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(key, node)| (key, node.into_value()))
                    .collect(),
            ),
            Self::List(items) => Value::Array(items.into_values().map(Node::into_value).collect()),
        }
    }
}

/// Decodes flat parameter names into a nested JSON object.
///
/// Keys are split on `dict_char` into nested objects and on `list_char`
/// followed by a number into list positions. List positions are sorted and
/// gaps are closed. A key submitted several times becomes an array.
///
/// # Errors
///
/// Returns [`DecodeConflict`] when a name is used both for a plain value and
/// for a nested object or list.
pub fn variable_decode(
    params: &Params,
    dict_char: char,
    list_char: char,
) -> Result<Map<String, Value>, DecodeConflict> {
    let mut root = Node::Dict(Vec::new());
    for (name, value) in params.iter() {
        let steps = parse_path(name, dict_char, list_char);
        if !root.insert(&steps, value) {
            return Err(DecodeConflict {
                field: name.to_string(),
            });
        }
    }
    match root.into_value() {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(query: &str) -> Value {
        Value::Object(variable_decode(&Params::parse(query), '.', '-').unwrap())
    }

    fn conflict(query: &str) -> String {
        variable_decode(&Params::parse(query), '.', '-')
            .unwrap_err()
            .field
    }

    #[test]
    fn test_plain_keys() {
        assert_eq!(decode("name=Fred&age=42"), json!({"name": "Fred", "age": "42"}));
    }

    #[test]
    fn test_repeated_keys_become_arrays() {
        assert_eq!(decode("tag=a&tag=b"), json!({"tag": ["a", "b"]}));
    }

    #[test]
    fn test_dict_keys() {
        assert_eq!(
            decode("address.city=Paris&address.zip=75001"),
            json!({"address": {"city": "Paris", "zip": "75001"}})
        );
    }

    #[test]
    fn test_list_indices_sorted_and_compacted() {
        assert_eq!(decode("tags-5=c&tags-0=a&tags-2=b"), json!({"tags": ["a", "b", "c"]}));
    }

    #[test]
    fn test_list_of_dicts() {
        assert_eq!(
            decode("people-0.name=Fred&people-1.name=Barney&people-0.age=40"),
            json!({"people": [{"name": "Fred", "age": "40"}, {"name": "Barney"}]})
        );
    }

    #[test]
    fn test_non_numeric_suffix_is_a_plain_name() {
        assert_eq!(decode("first-name=Fred"), json!({"first-name": "Fred"}));
    }

    #[test]
    fn test_custom_separators() {
        let params = Params::parse("a:b=1&c_0=x");
        assert_eq!(
            Value::Object(variable_decode(&params, ':', '_').unwrap()),
            json!({"a": {"b": "1"}, "c": ["x"]})
        );
    }

    #[test]
    fn test_plain_value_then_container_conflicts() {
        assert_eq!(conflict("a=1&a.b=2"), "a.b");
        assert_eq!(conflict("a=1&a-0=2"), "a-0");
    }

    #[test]
    fn test_container_then_plain_value_conflicts() {
        assert_eq!(conflict("a-0=1&a=2"), "a");
        assert_eq!(conflict("a.b=1&a=2"), "a");
        assert_eq!(conflict("a-0=1&a.b=2"), "a.b");
    }

    #[test]
    fn test_conflict_message() {
        let err = variable_decode(&Params::parse("a=1&a.b=2"), '.', '-').unwrap_err();
        assert_eq!(err.to_string(), "Conflicting values submitted for a.b");
    }
}
