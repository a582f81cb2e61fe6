//! Filling existing HTML forms with data and errors.
//!
//! The filler rewrites `input`, `textarea`, `select` and `option` tags in
//! place and leaves all other markup byte-for-byte untouched.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::ValidationErrors;
use crate::tags::html_escape;
use crate::value::{selects, value_text};

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<(/?)(input|textarea|select|option)\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
        .expect("valid tag pattern")
});

static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s="'>/]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
        .expect("valid attribute pattern")
});

static TEXTAREA_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</textarea\s*>").expect("valid textarea pattern"));

const TEXT_TYPES: [&str; 16] = [
    "text",
    "hidden",
    "password",
    "search",
    "email",
    "number",
    "url",
    "tel",
    "date",
    "datetime-local",
    "time",
    "month",
    "week",
    "color",
    "range",
    "",
];

/// Options for [`fill`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlFillOptions {
    /// Insert the error messages of a field next to its first tag.
    pub auto_insert_errors: bool,
    /// Clear values and check states of fields without data.
    pub force_defaults: bool,
    /// Class added to tags of fields with errors.
    pub error_class: String,
    /// Insert error messages before the tag rather than after it.
    pub prefix_error: bool,
}

impl Default for HtmlFillOptions {
    fn default() -> Self {
        Self {
            auto_insert_errors: true,
            force_defaults: true,
            error_class: "error".to_string(),
            prefix_error: true,
        }
    }
}

struct Tag {
    name: String,
    attrs: Vec<(String, Option<String>)>,
    self_closing: bool,
}

impl Tag {
    fn parse(name: &str, raw: &str) -> Self {
        let trimmed = raw.trim_end();
        let (body, self_closing) = match trimmed.strip_suffix('/') {
            Some(body) => (body, true),
            None => (trimmed, false),
        };
        let attrs = ATTR
            .captures_iter(body)
            .map(|caps| {
                let value = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .or_else(|| caps.get(4))
                    .map(|m| html_unescape(m.as_str()));
                (caps[1].to_ascii_lowercase(), value)
            })
            .collect();
        Self {
            name: name.to_string(),
            attrs,
            self_closing,
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    fn set(&mut self, key: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = Some(value.to_string()),
            None => self.attrs.push((key.to_string(), Some(value.to_string()))),
        }
    }

    fn remove(&mut self, key: &str) {
        self.attrs.retain(|(k, _)| k != key);
    }

    fn add_class(&mut self, class: &str) {
        let classes = match self.get("class") {
            Some(existing) if existing.split_whitespace().any(|c| c == class) => return,
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        self.set("class", &classes);
    }

    fn render(&self) -> String {
        let mut html = format!("<{}", self.name);
        for (key, value) in &self.attrs {
            match value {
                Some(value) => html.push_str(&format!(r#" {key}="{}""#, html_escape(value))),
                None => html.push_str(&format!(" {key}")),
            }
        }
        html.push_str(if self.self_closing { " />" } else { ">" });
        html
    }
}

fn html_unescape(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

fn field_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items.first().and_then(value_text).unwrap_or_default(),
        other => value_text(other).unwrap_or_default(),
    }
}

fn fill_input(tag: &mut Tag, value: Option<&Value>, options: &HtmlFillOptions) -> bool {
    let kind = tag.get("type").unwrap_or("").to_ascii_lowercase();
    match kind.as_str() {
        "checkbox" | "radio" => {
            if value.is_none() && !options.force_defaults {
                return true;
            }
            let own = tag.get("value").unwrap_or("on").to_string();
            let checked = selects(value, &own) || (kind == "checkbox" && value == Some(&Value::Bool(true)));
            if checked {
                tag.set("checked", "checked");
            } else {
                tag.remove("checked");
            }
            true
        }
        kind if TEXT_TYPES.contains(&kind) => {
            match value {
                Some(value) => tag.set("value", &field_text(value)),
                None if options.force_defaults => tag.remove("value"),
                None => {}
            }
            true
        }
        _ => false,
    }
}

fn option_text(rest: &str) -> String {
    html_unescape(rest.split('<').next().unwrap_or("").trim())
}

fn error_markup(messages: &[String]) -> String {
    format!(
        "<span class=\"error-message\">{}</span><br />\n",
        html_escape(&messages.join("; "))
    )
}

/// Fills the form fields of `html` with `data` and marks fields with
/// `errors`.
pub fn fill(
    html: &str,
    data: &Map<String, Value>,
    errors: &ValidationErrors,
    options: &HtmlFillOptions,
) -> String {
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    let mut select: Option<String> = None;
    let mut reported: HashSet<String> = HashSet::new();

    while let Some(caps) = TAG.captures_at(html, pos) {
        let Some(whole) = caps.get(0) else {
            break;
        };
        out.push_str(&html[pos..whole.start()]);
        pos = whole.end();

        let element = caps[2].to_ascii_lowercase();
        if !caps[1].is_empty() {
            if element == "select" {
                select = None;
            }
            out.push_str(whole.as_str());
            continue;
        }

        let mut tag = Tag::parse(&element, &caps[3]);
        let field = tag.get("name").map(str::to_string);
        let value = field.as_deref().and_then(|f| data.get(f));
        let mut textarea_content = None;

        let fillable = match element.as_str() {
            "input" => field.is_some() && fill_input(&mut tag, value, options),
            "select" => {
                select.clone_from(&field);
                field.is_some()
            }
            "textarea" => {
                if field.is_some() && (value.is_some() || options.force_defaults) {
                    textarea_content = Some(value.map(field_text).unwrap_or_default());
                }
                field.is_some()
            }
            _ => {
                if let Some(current) = select.as_deref() {
                    let selected = data.get(current);
                    if selected.is_some() || options.force_defaults {
                        let own = match tag.get("value") {
                            Some(v) => v.to_string(),
                            None => option_text(&html[pos..]),
                        };
                        if selects(selected, &own) {
                            tag.set("selected", "selected");
                        } else {
                            tag.remove("selected");
                        }
                    }
                }
                false
            }
        };

        let mut error_html = String::new();
        if let Some(name) = field.as_deref().filter(|_| fillable) {
            if let Some(messages) = errors.get(name) {
                tag.add_class(&options.error_class);
                if options.auto_insert_errors && reported.insert(name.to_string()) {
                    error_html = error_markup(messages);
                }
            }
            trace!(field = name, tag = %element, "filled form field");
        }

        if options.prefix_error {
            out.push_str(&error_html);
            out.push_str(&tag.render());
        } else {
            out.push_str(&tag.render());
            out.push_str(&error_html);
        }

        if let Some(content) = textarea_content {
            out.push_str(&html_escape(&content));
            match TEXTAREA_END.find_at(html, pos) {
                Some(end) => pos = end.start(),
                None => pos = html.len(),
            }
        }
    }

    out.push_str(&html[pos..]);
    out
}
