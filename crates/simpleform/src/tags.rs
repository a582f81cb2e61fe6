//! Low-level HTML tag building.

use std::collections::BTreeMap;

/// HTML attributes of a tag.
///
/// Attributes are kept sorted by name, so rendered tags are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs {
    /// Attribute values by name.
    pub attrs: BTreeMap<String, String>,
}

impl Attrs {
    /// Creates new empty attributes.
    pub fn new() -> Self {
        Self {
            attrs: BTreeMap::new(),
        }
    }

    /// Sets an attribute.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    /// Gets an attribute.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Removes an attribute, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.attrs.remove(key)
    }

    /// Returns whether no attribute is set.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Renders attributes as an HTML attribute string, values escaped.
    pub fn to_html(&self) -> String {
        self.attrs
            .iter()
            .map(|(k, v)| format!(r#"{k}="{}""#, html_escape(v)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Builder method to set an attribute.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            attrs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Escapes HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Renders a self-closing tag: `<input a="1" b="2" />`.
pub fn void_tag(name: &str, attrs: &Attrs) -> String {
    if attrs.is_empty() {
        format!("<{name} />")
    } else {
        format!("<{name} {} />", attrs.to_html())
    }
}

/// Renders an opening tag: `<form a="1">`.
pub fn open_tag(name: &str, attrs: &Attrs) -> String {
    if attrs.is_empty() {
        format!("<{name}>")
    } else {
        format!("<{name} {}>", attrs.to_html())
    }
}

/// Renders an element around already-escaped content.
pub fn content_tag(name: &str, attrs: &Attrs, content: &str) -> String {
    format!("{}{content}</{name}>", open_tag(name, attrs))
}

/// Builds an element id from a field name and value: `name_fred`.
///
/// Characters outside `[A-Za-z0-9_-]` become `_` and the result is
/// lowercased.
pub fn safe_id(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attrs_sorted() {
        let attrs = Attrs::new()
            .with("value", "Fred")
            .with("type", "text")
            .with("name", "name");
        assert_eq!(attrs.to_html(), r#"name="name" type="text" value="Fred""#);
    }

    #[test]
    fn test_attrs_escaped() {
        let attrs = Attrs::new().with("value", r#"<"a" & 'b'>"#);
        assert_eq!(
            attrs.to_html(),
            r#"value="&lt;&quot;a&quot; &amp; &#x27;b&#x27;&gt;""#
        );
    }

    #[test]
    fn test_attrs_from_iter() {
        let attrs: Attrs = [("class", "big"), ("id", "x")].into_iter().collect();
        assert_eq!(attrs.get("class"), Some("big"));
        assert_eq!(attrs.attrs.len(), 2);
    }

    #[test]
    fn test_tags() {
        let attrs = Attrs::new().with("name", "file").with("type", "file");
        assert_eq!(void_tag("input", &attrs), r#"<input name="file" type="file" />"#);
        assert_eq!(void_tag("br", &Attrs::new()), "<br />");
        assert_eq!(
            content_tag("textarea", &Attrs::new().with("name", "bio"), "hi"),
            r#"<textarea name="bio">hi</textarea>"#
        );
        assert_eq!(open_tag("form", &Attrs::new()), "<form>");
    }

    #[test]
    fn test_safe_id() {
        assert_eq!(safe_id("name_Fred"), "name_fred");
        assert_eq!(safe_id("size_X Large"), "size_x_large");
        assert_eq!(safe_id("a.b-c"), "a_b-c");
    }
}
