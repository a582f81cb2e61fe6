//! HTML widgets pre-filled from a form.

use ironhtml::typed::Element;
use ironhtml_elements::{Div, Li, Ul};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use simpleform_http::Method;

use crate::form::Form;
use crate::request::FormRequest;
use crate::tags::{content_tag, html_escape, open_tag, safe_id, void_tag, Attrs};
use crate::value::{is_truthy, selects, value_text};

/// Name of the hidden field carrying the real method of a tunnelled form.
pub const METHOD_FIELD: &str = "_method";

/// Renderer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererOptions {
    /// Name of the hidden CSRF field.
    pub csrf_field: String,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            csrf_field: "_csrf".to_string(),
        }
    }
}

/// Renders form widgets with the values and errors of a [`Form`].
///
/// ```rust
/// use simpleform::{Form, FormRenderer, NotEmpty, Request};
///
/// let request = Request::get("/");
/// let form = Form::builder(&request)
///     .validator("name", NotEmpty::new())
///     .default_value("name", "Fred")
///     .build()
///     .unwrap();
/// let renderer = FormRenderer::new(&form);
///
/// assert_eq!(
///     renderer.text("name"),
///     r#"<input name="name" type="text" value="Fred" />"#
/// );
/// ```
#[derive(Debug)]
pub struct FormRenderer<'f, 'r, R: FormRequest + ?Sized> {
    form: &'f Form<'r, R>,
    options: RendererOptions,
}

impl<'f, 'r, R: FormRequest + ?Sized> FormRenderer<'f, 'r, R> {
    /// Creates a renderer with default options.
    pub fn new(form: &'f Form<'r, R>) -> Self {
        Self::with_options(form, RendererOptions::default())
    }

    /// Creates a renderer with explicit options.
    pub fn with_options(form: &'f Form<'r, R>, options: RendererOptions) -> Self {
        Self { form, options }
    }

    /// The wrapped form.
    pub fn form(&self) -> &'f Form<'r, R> {
        self.form
    }

    /// Current value of a field.
    pub fn value(&self, name: &str) -> Option<&'f Value> {
        self.form.value(name)
    }

    /// Returns whether a field has errors.
    pub fn is_error(&self, name: &str) -> bool {
        self.form.is_error(name)
    }

    /// Returns the error messages of a field.
    pub fn errors_for(&self, name: &str) -> &'f [String] {
        self.form.errors_for(name)
    }

    /// Returns every error as `(field, message)`, ordered by field.
    pub fn all_errors(&self) -> Vec<(&'f str, &'f str)> {
        self.form.all_errors()
    }

    fn value_or(&self, name: &str, attrs: &mut Attrs) -> Option<String> {
        let fallback = attrs.remove("value");
        match self.form.value(name) {
            Some(value) => value_text(value),
            None => fallback,
        }
    }

    /// Opens the form tag, posting to the request path.
    pub fn begin(&self) -> String {
        let path = self.form.request().path().to_string();
        self.begin_with(&path, None, Attrs::new())
    }

    /// Opens the form tag.
    ///
    /// `method` defaults to the form's method, or POST. Methods other than
    /// GET and POST are sent as POST with a hidden `_method` field.
    pub fn begin_with(&self, url: &str, method: Option<Method>, mut attrs: Attrs) -> String {
        let method = method
            .or(self.form.options().method)
            .unwrap_or(Method::Post);

        attrs.set("action", url);
        if self.form.options().multipart {
            attrs.set("enctype", "multipart/form-data");
        }
        let tunnelled = match method {
            Method::Get => {
                attrs.set("method", "get");
                None
            }
            Method::Post => {
                attrs.set("method", "post");
                None
            }
            other => {
                attrs.set("method", "post");
                Some(other)
            }
        };

        let mut html = open_tag("form", &attrs);
        if let Some(method) = tunnelled {
            html.push_str(&self.hidden_input(METHOD_FIELD, method.as_str()));
        }
        html
    }

    /// Closes the form tag.
    pub fn end(&self) -> String {
        "</form>".to_string()
    }

    fn input(&self, kind: &str, name: &str, value: Option<String>, mut attrs: Attrs) -> String {
        attrs.set("name", name);
        attrs.set("type", kind);
        if let Some(value) = value {
            attrs.set("value", value);
        }
        void_tag("input", &attrs)
    }

    fn hidden_input(&self, name: &str, value: &str) -> String {
        self.input("hidden", name, Some(value.to_string()), Attrs::new())
    }

    /// Text input.
    pub fn text(&self, name: &str) -> String {
        self.text_with(name, Attrs::new())
    }

    /// Text input with extra attributes.
    pub fn text_with(&self, name: &str, mut attrs: Attrs) -> String {
        let value = self.value_or(name, &mut attrs);
        self.input("text", name, value, attrs)
    }

    /// Hidden input.
    pub fn hidden(&self, name: &str) -> String {
        self.hidden_with(name, Attrs::new())
    }

    /// Hidden input with extra attributes.
    pub fn hidden_with(&self, name: &str, mut attrs: Attrs) -> String {
        let value = self.value_or(name, &mut attrs);
        self.input("hidden", name, value, attrs)
    }

    /// Password input. Never rendered with a value.
    pub fn password(&self, name: &str) -> String {
        self.password_with(name, Attrs::new())
    }

    /// Password input with extra attributes.
    pub fn password_with(&self, name: &str, mut attrs: Attrs) -> String {
        attrs.remove("value");
        self.input("password", name, None, attrs)
    }

    /// File input.
    pub fn file(&self, name: &str) -> String {
        self.file_with(name, Attrs::new())
    }

    /// File input with extra attributes.
    pub fn file_with(&self, name: &str, mut attrs: Attrs) -> String {
        attrs.remove("value");
        self.input("file", name, None, attrs)
    }

    /// Textarea.
    pub fn textarea(&self, name: &str) -> String {
        self.textarea_with(name, Attrs::new())
    }

    /// Textarea with extra attributes; a `value` attribute becomes the
    /// fallback content.
    pub fn textarea_with(&self, name: &str, mut attrs: Attrs) -> String {
        let content = self.value_or(name, &mut attrs).unwrap_or_default();
        attrs.set("name", name);
        content_tag("textarea", &attrs, &html_escape(&content))
    }

    /// Checkbox with value `1`, checked when the field's value is truthy.
    pub fn checkbox(&self, name: &str) -> String {
        self.checkbox_with(name, Attrs::new())
    }

    /// Checkbox with extra attributes; `value` overrides the submitted value.
    pub fn checkbox_with(&self, name: &str, mut attrs: Attrs) -> String {
        let value = attrs.remove("value").unwrap_or_else(|| "1".to_string());
        if is_truthy(self.form.value(name)) {
            attrs.set("checked", "checked");
        }
        self.input("checkbox", name, Some(value), attrs)
    }

    /// Radio button, checked when the field's value is `value`.
    pub fn radio(&self, name: &str, value: &str) -> String {
        self.radio_with(name, value, Attrs::new())
    }

    /// Radio button with extra attributes.
    pub fn radio_with(&self, name: &str, value: &str, mut attrs: Attrs) -> String {
        if selects(self.form.value(name), value) {
            attrs.set("checked", "checked");
        }
        if attrs.get("id").is_none() {
            attrs.set("id", safe_id(&format!("{name}_{value}")));
        }
        self.input("radio", name, Some(value.to_string()), attrs)
    }

    /// Select box from `(value, label)` pairs, with the field's value
    /// selected.
    pub fn select(&self, name: &str, options: &[(&str, &str)]) -> String {
        self.select_with(name, options, Attrs::new())
    }

    /// Select box with extra attributes.
    pub fn select_with(&self, name: &str, options: &[(&str, &str)], mut attrs: Attrs) -> String {
        let fallback = attrs.remove("value").map(Value::String);
        let current = self.form.value(name).or(fallback.as_ref());

        attrs.set("name", name);
        let mut lines = vec![open_tag("select", &attrs)];
        for (value, label) in options {
            let mut option = Attrs::new().with("value", *value);
            if selects(current, value) {
                option.set("selected", "selected");
            }
            lines.push(content_tag("option", &option, &html_escape(label)));
        }
        lines.push("</select>".to_string());
        lines.join("\n")
    }

    /// Submit button.
    pub fn submit(&self, name: &str, value: &str) -> String {
        self.submit_with(name, value, Attrs::new())
    }

    /// Submit button with extra attributes.
    pub fn submit_with(&self, name: &str, value: &str, attrs: Attrs) -> String {
        self.input("submit", name, Some(value.to_string()), attrs)
    }

    /// Label for a field; without `label` the field name is used, with
    /// underscores as spaces, the first letter upper-cased and the rest
    /// lower-cased (`firstName` becomes `Firstname`).
    pub fn label(&self, name: &str, label: Option<&str>) -> String {
        self.label_with(name, label, Attrs::new())
    }

    /// Label with extra attributes.
    pub fn label_with(&self, name: &str, label: Option<&str>, mut attrs: Attrs) -> String {
        let text = label.map_or_else(|| humanize(name), str::to_string);
        attrs.set("for", name);
        content_tag("label", &attrs, &html_escape(&text))
    }

    /// Error messages of one field, or of every field, as a list.
    ///
    /// Empty when there is nothing to show.
    pub fn errorlist(&self, name: Option<&str>) -> String {
        self.errorlist_with(name, Attrs::new())
    }

    /// Error list with extra attributes on the `ul`; a `class` attribute
    /// replaces the default `error` class.
    pub fn errorlist_with(&self, name: Option<&str>, mut attrs: Attrs) -> String {
        let messages: Vec<&str> = match name {
            Some(name) => self.errors_for(name).iter().map(String::as_str).collect(),
            None => self.all_errors().into_iter().map(|(_, m)| m).collect(),
        };
        if messages.is_empty() {
            return String::new();
        }
        let class = attrs.remove("class").unwrap_or_else(|| "error".to_string());
        attrs
            .attrs
            .iter()
            .fold(Element::<Ul>::new().class(class.as_str()), |ul, (key, value)| {
                ul.attr(key.clone(), value.as_str())
            })
            .children(messages, |message, li: Element<Li>| li.text(message))
            .render()
    }

    /// Hidden CSRF field holding the session token, or `token` when given.
    pub fn csrf(&self, token: Option<&str>) -> String {
        let token = token
            .or_else(|| self.form.request().csrf_token())
            .unwrap_or_default();
        self.hidden_input(&self.options.csrf_field, token)
    }

    /// The CSRF field inside a hidden `div`.
    pub fn csrf_token(&self, token: Option<&str>) -> String {
        let field = self.csrf(token);
        hidden_div(&field)
    }

    /// Hidden inputs for `names` followed by the CSRF field, all inside a
    /// hidden `div`.
    pub fn hidden_tag(&self, names: &[&str]) -> String {
        let mut fields: String = names.iter().map(|name| self.hidden(name)).collect();
        fields.push_str(&self.csrf(None));
        hidden_div(&fields)
    }
}

fn hidden_div(content: &str) -> String {
    Element::<Div>::new()
        .attr("style", "display:none;")
        .raw(content)
        .render()
}

fn humanize(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::NotEmpty;
    use serde_json::json;
    use simpleform_http::{Request, Session};

    fn request() -> Request {
        Request::get("/people").session(Session::with_csrf_token("csrft"))
    }

    fn form_with<'r>(req: &'r Request, field: &str, value: Value) -> Form<'r> {
        Form::builder(req)
            .validator("name", NotEmpty::new())
            .default_value(field, value)
            .build()
            .unwrap()
    }

    #[test]
    fn test_begin_defaults_to_request_path() {
        let req = request();
        let form = form_with(&req, "name", json!("Fred"));
        assert_eq!(
            FormRenderer::new(&form).begin(),
            r#"<form action="/people" method="post">"#
        );
    }

    #[test]
    fn test_begin_multipart_and_get() {
        let req = request();
        let form = Form::builder(&req)
            .validator("file", NotEmpty::new())
            .multipart(true)
            .build()
            .unwrap();
        let renderer = FormRenderer::new(&form);
        assert_eq!(
            renderer.begin_with("/upload", None, Attrs::new()),
            r#"<form action="/upload" enctype="multipart/form-data" method="post">"#
        );

        let form = Form::builder(&req)
            .validator("q", NotEmpty::new())
            .method(Some(Method::Get))
            .build()
            .unwrap();
        assert_eq!(
            FormRenderer::new(&form).begin_with("/search", None, Attrs::new().with("id", "f")),
            r#"<form action="/search" id="f" method="get">"#
        );
    }

    #[test]
    fn test_begin_tunnels_other_methods() {
        let req = request();
        let form = form_with(&req, "name", json!("Fred"));
        assert_eq!(
            FormRenderer::new(&form).begin_with("/people/1", Some(Method::Delete), Attrs::new()),
            concat!(
                r#"<form action="/people/1" method="post">"#,
                r#"<input name="_method" type="hidden" value="DELETE" />"#
            )
        );
    }

    #[test]
    fn test_attrs_value_is_fallback() {
        let req = request();
        let form = form_with(&req, "other", json!("x"));
        let renderer = FormRenderer::new(&form);
        assert_eq!(
            renderer.text_with("name", Attrs::new().with("value", "Wilma")),
            r#"<input name="name" type="text" value="Wilma" />"#
        );

        let form = form_with(&req, "name", json!("Fred"));
        let renderer = FormRenderer::new(&form);
        assert_eq!(
            renderer.text_with("name", Attrs::new().with("value", "Wilma").with("class", "big")),
            r#"<input class="big" name="name" type="text" value="Fred" />"#
        );
    }

    #[test]
    fn test_text_without_value() {
        let req = request();
        let form = form_with(&req, "other", json!("x"));
        assert_eq!(
            FormRenderer::new(&form).text("name"),
            r#"<input name="name" type="text" />"#
        );
    }

    #[test]
    fn test_values_are_escaped() {
        let req = request();
        let form = form_with(&req, "name", json!("<Fred & \"Barney\">"));
        let renderer = FormRenderer::new(&form);
        assert_eq!(
            renderer.text("name"),
            r#"<input name="name" type="text" value="&lt;Fred &amp; &quot;Barney&quot;&gt;" />"#
        );
        assert_eq!(
            renderer.textarea("name"),
            r#"<textarea name="name">&lt;Fred &amp; &quot;Barney&quot;&gt;</textarea>"#
        );
    }

    #[test]
    fn test_password_ignores_data() {
        let req = request();
        let form = form_with(&req, "password", json!("s3cret"));
        assert_eq!(
            FormRenderer::new(&form).password("password"),
            r#"<input name="password" type="password" />"#
        );
    }

    #[test]
    fn test_checkbox_unchecked_and_custom_value() {
        let req = request();
        let form = form_with(&req, "agree", json!(false));
        let renderer = FormRenderer::new(&form);
        assert_eq!(
            renderer.checkbox("agree"),
            r#"<input name="agree" type="checkbox" value="1" />"#
        );
        assert_eq!(
            renderer.checkbox_with("agree", Attrs::new().with("value", "yes")),
            r#"<input name="agree" type="checkbox" value="yes" />"#
        );
    }

    #[test]
    fn test_radio_id_override() {
        let req = request();
        let form = form_with(&req, "size", json!("X Large"));
        let renderer = FormRenderer::new(&form);
        assert_eq!(
            renderer.radio("size", "X Large"),
            r#"<input checked="checked" id="size_x_large" name="size" type="radio" value="X Large" />"#
        );
        assert_eq!(
            renderer.radio_with("size", "S", Attrs::new().with("id", "small")),
            r#"<input id="small" name="size" type="radio" value="S" />"#
        );
    }

    #[test]
    fn test_select_multiple_values() {
        let req = request();
        let form = form_with(&req, "tags", json!(["a", "c"]));
        let renderer = FormRenderer::new(&form);
        assert_eq!(
            renderer.select_with(
                "tags",
                &[("a", "A"), ("b", "B"), ("c", "C")],
                Attrs::new().with("multiple", "multiple")
            ),
            concat!(
                "<select multiple=\"multiple\" name=\"tags\">\n",
                "<option selected=\"selected\" value=\"a\">A</option>\n",
                "<option value=\"b\">B</option>\n",
                "<option selected=\"selected\" value=\"c\">C</option>\n",
                "</select>"
            )
        );
    }

    #[test]
    fn test_label_humanizes_name() {
        let req = request();
        let form = form_with(&req, "name", json!("Fred"));
        let renderer = FormRenderer::new(&form);
        assert_eq!(
            renderer.label("first_name", None),
            r#"<label for="first_name">First name</label>"#
        );
        assert_eq!(
            renderer.label_with("email", None, Attrs::new().with("class", "req")),
            r#"<label class="req" for="email">Email</label>"#
        );
    }

    #[test]
    fn test_csrf_field_name_and_explicit_token() {
        let req = request();
        let form = form_with(&req, "name", json!("Fred"));
        let renderer = FormRenderer::with_options(
            &form,
            RendererOptions {
                csrf_field: "csrf_token".to_string(),
            },
        );
        assert_eq!(
            renderer.csrf(Some("other")),
            r#"<input name="csrf_token" type="hidden" value="other" />"#
        );
    }

    #[test]
    fn test_hidden_tag() {
        let req = request();
        let form = form_with(&req, "name", json!("Fred"));
        assert_eq!(
            FormRenderer::new(&form).hidden_tag(&["name"]),
            concat!(
                r#"<div style="display:none;">"#,
                r#"<input name="name" type="hidden" value="Fred" />"#,
                r#"<input name="_csrf" type="hidden" value="csrft" />"#,
                "</div>"
            )
        );
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("name"), "Name");
        assert_eq!(humanize("date_of_birth"), "Date of birth");
        assert_eq!(humanize("firstName"), "Firstname");
        assert_eq!(humanize("URL"), "Url");
        assert_eq!(humanize(""), "");
    }
}
