//! Request-bound forms.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use simpleform_http::{Method, Params, Request};
use tracing::debug;

use crate::bind::Bindable;
use crate::decode::variable_decode;
use crate::error::{FormError, Result, ValidationErrors};
use crate::htmlfill::{fill, HtmlFillOptions};
use crate::request::FormRequest;
use crate::schema::{Schema, NON_FIELD_ERRORS};
use crate::validation::Validator;

/// Form configuration.
///
/// Every field has a default, so partial JSON configs deserialize:
///
/// ```rust
/// use simpleform::{FormOptions, Method};
///
/// let options: FormOptions = serde_json::from_str(r#"{"method": "GET"}"#).unwrap();
/// assert_eq!(options.method, Some(Method::Get));
/// assert_eq!(options.dict_char, '.');
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormOptions {
    /// Method a submission must use; `None` accepts any method.
    pub method: Option<Method>,
    /// Decode `a.b` / `a-0` field names into nested values.
    pub variable_decode: bool,
    /// Separator for nested object keys.
    pub dict_char: char,
    /// Separator for list positions.
    pub list_char: char,
    /// Render `enctype="multipart/form-data"` on the form tag.
    pub multipart: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            method: Some(Method::Post),
            variable_decode: false,
            dict_char: '.',
            list_char: '-',
            multipart: false,
        }
    }
}

/// A form bound to one request.
///
/// Validation runs at most once; the clean data and the errors are kept on
/// the form for binding and re-display.
///
/// # Example
///
/// ```rust
/// use simpleform::{Form, NotEmpty, Request, Schema};
///
/// let request = Request::post("/").form_body("name=Fred");
/// let schema = Schema::new().field("name", NotEmpty::new());
///
/// let mut form = Form::new(&request, schema);
/// assert!(form.validate());
/// assert_eq!(form.value("name"), Some(&serde_json::json!("Fred")));
/// ```
pub struct Form<'r, R: FormRequest + ?Sized = Request> {
    request: &'r R,
    schema: Option<Arc<Schema>>,
    validators: Vec<(String, Box<dyn Validator>)>,
    options: FormOptions,
    data: Map<String, Value>,
    errors: ValidationErrors,
    is_validated: bool,
}

impl<'r, R: FormRequest + ?Sized> Form<'r, R> {
    /// Creates a form validated by `schema`, with default options.
    pub fn new(request: &'r R, schema: impl Into<Arc<Schema>>) -> Self {
        Self {
            request,
            schema: Some(schema.into()),
            validators: Vec::new(),
            options: FormOptions::default(),
            data: Map::new(),
            errors: ValidationErrors::new(),
            is_validated: false,
        }
    }

    /// Starts building a form for `request`.
    pub fn builder(request: &'r R) -> FormBuilder<'r, R> {
        FormBuilder {
            request,
            schema: None,
            validators: Vec::new(),
            defaults: Map::new(),
            obj: None,
            options: FormOptions::default(),
        }
    }

    /// Validates the submission once.
    ///
    /// Returns the cached outcome when already validated. A request whose
    /// method differs from the form's returns `false` and leaves the form
    /// unvalidated.
    pub fn validate(&mut self) -> bool {
        if self.is_validated {
            return self.errors.is_empty();
        }
        if let Some(method) = self.options.method {
            let actual = self.request.method();
            if actual != method {
                debug!(expected = %method, actual = %actual, "request method does not match form");
                return false;
            }
        }
        self.force_validate()
    }

    /// Validates the submission regardless of the request method.
    pub fn force_validate(&mut self) -> bool {
        if self.is_validated {
            return self.errors.is_empty();
        }
        let params = self.submitted_params();
        self.validate_params(&params)
    }

    fn submitted_params(&self) -> Params {
        if self.options.method == Some(Method::Post) {
            self.request.post_params().clone()
        } else {
            self.request.all_params()
        }
    }

    /// Checks the CSRF token submitted under `field` against the session.
    ///
    /// Reads the same parameters as [`Form::force_validate`]. A missing
    /// token fails the check.
    pub fn check_csrf(&self, field: &str) -> bool {
        let params = self.submitted_params();
        let valid = params
            .get(field)
            .is_some_and(|token| self.request.check_csrf_token(token));
        if !valid {
            debug!(field, "CSRF check failed");
        }
        valid
    }

    /// Validates an explicit set of parameters instead of the request's.
    pub fn validate_params(&mut self, params: &Params) -> bool {
        if self.is_validated {
            return self.errors.is_empty();
        }
        let FormOptions {
            variable_decode: decode,
            dict_char,
            list_char,
            ..
        } = self.options;

        let decoded = if decode {
            match variable_decode(params, dict_char, list_char) {
                Ok(decoded) => decoded,
                Err(conflict) => {
                    debug!(field = %conflict.field, "submitted field names conflict");
                    self.errors.add(NON_FIELD_ERRORS, conflict.to_string());
                    self.is_validated = true;
                    return false;
                }
            }
        } else {
            params.mixed()
        };
        self.data
            .extend(decoded.iter().map(|(k, v)| (k.clone(), v.clone())));

        if let Some(schema) = &self.schema {
            match schema.validate_map(&decoded) {
                Ok(clean) => self.data = clean,
                Err(failures) => {
                    for (field, invalid) in &failures {
                        self.errors
                            .add_invalid(field, invalid, dict_char, list_char);
                    }
                }
            }
        }

        for (field, validator) in &self.validators {
            match validator.validate(decoded.get(field)) {
                Ok(value) => {
                    self.data.insert(field.clone(), value);
                }
                Err(invalid) => {
                    self.errors
                        .add_invalid(field, &invalid, dict_char, list_char);
                }
            }
        }

        self.is_validated = true;
        debug!(
            fields = self.data.len(),
            errors = self.errors.len(),
            "form validated"
        );
        self.errors.is_empty()
    }

    /// Copies the clean data onto `target`.
    ///
    /// Keys starting with `_` are never bound, nor are fields the target
    /// lacks. A non-empty `include` binds only the named fields; `exclude`
    /// names fields to leave alone.
    pub fn bind<T: Bindable + ?Sized>(
        &self,
        target: &mut T,
        include: &[&str],
        exclude: &[&str],
    ) -> Result<()> {
        if !self.is_validated {
            return Err(FormError::NotValidated);
        }
        if !self.errors.is_empty() {
            return Err(FormError::HasErrors);
        }

        for (key, value) in &self.data {
            if key.starts_with('_') {
                continue;
            }
            if !include.is_empty() && !include.contains(&key.as_str()) {
                continue;
            }
            if exclude.contains(&key.as_str()) {
                continue;
            }
            if !target.has_field(key) {
                debug!(field = %key, "bind target has no such field");
                continue;
            }
            target
                .set_field(key, value.clone())
                .map_err(|message| FormError::Bind {
                    field: key.clone(),
                    message,
                })?;
        }
        Ok(())
    }

    /// Returns the error messages of a field.
    pub fn errors_for(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns whether a field has errors.
    pub fn is_error(&self, field: &str) -> bool {
        self.errors.contains(field)
    }

    /// Returns every error as `(field, message)`, ordered by field.
    pub fn all_errors(&self) -> Vec<(&str, &str)> {
        self.errors.all_errors()
    }

    /// Fills the form fields of an HTML snippet with the current data and
    /// errors, using the default fill options.
    pub fn htmlfill(&self, html: &str) -> String {
        self.htmlfill_with(html, &HtmlFillOptions::default())
    }

    /// Fills an HTML snippet with explicit fill options.
    pub fn htmlfill_with(&self, html: &str, options: &HtmlFillOptions) -> String {
        fill(html, &self.data, &self.errors, options)
    }

    /// Current value of a field.
    pub fn value(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Current data: defaults and object values before validation, clean
    /// values after.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Validation errors by field.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Returns whether validation has run.
    pub fn is_validated(&self) -> bool {
        self.is_validated
    }

    /// The form's configuration.
    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    /// The request the form reads from.
    pub fn request(&self) -> &'r R {
        self.request
    }
}

impl<R: FormRequest + ?Sized> std::fmt::Debug for Form<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("schema", &self.schema)
            .field(
                "validators",
                &self.validators.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .field("options", &self.options)
            .field("data", &self.data)
            .field("errors", &self.errors)
            .field("is_validated", &self.is_validated)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Form`].
pub struct FormBuilder<'r, R: FormRequest + ?Sized = Request> {
    request: &'r R,
    schema: Option<Arc<Schema>>,
    validators: Vec<(String, Box<dyn Validator>)>,
    defaults: Map<String, Value>,
    obj: Option<Map<String, Value>>,
    options: FormOptions,
}

impl<'r, R: FormRequest + ?Sized> FormBuilder<'r, R> {
    /// Validates the whole submission with `schema`.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<Arc<Schema>>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Validates one field with `validator`, after the schema.
    #[must_use]
    pub fn validator(mut self, field: impl Into<String>, validator: impl Validator + 'static) -> Self {
        self.validators.push((field.into(), Box::new(validator)));
        self
    }

    /// Initial data shown before a submission.
    #[must_use]
    pub fn defaults(mut self, defaults: Map<String, Value>) -> Self {
        self.defaults = defaults;
        self
    }

    /// Sets one initial value.
    #[must_use]
    pub fn default_value(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(field.into(), value.into());
        self
    }

    /// Reads initial data from an existing object; its values win over
    /// defaults.
    #[must_use]
    pub fn obj<T: Bindable + ?Sized>(mut self, obj: &T) -> Self {
        let snapshot = obj
            .field_names()
            .into_iter()
            .filter_map(|name| obj.field_value(name).map(|value| (name.to_string(), value)))
            .collect();
        self.obj = Some(snapshot);
        self
    }

    /// Method a submission must use; `None` accepts any method.
    #[must_use]
    pub fn method(mut self, method: Option<Method>) -> Self {
        self.options.method = method;
        self
    }

    /// Decodes nested field names before validation.
    #[must_use]
    pub fn variable_decode(mut self, decode: bool) -> Self {
        self.options.variable_decode = decode;
        self
    }

    /// Marks the form as a file upload form.
    #[must_use]
    pub fn multipart(mut self, multipart: bool) -> Self {
        self.options.multipart = multipart;
        self
    }

    /// Replaces every option at once.
    #[must_use]
    pub fn options(mut self, options: FormOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the form.
    ///
    /// Fails with [`FormError::NoValidators`] when neither a schema nor a
    /// field validator was given.
    pub fn build(self) -> Result<Form<'r, R>> {
        if self.schema.is_none() && self.validators.is_empty() {
            return Err(FormError::NoValidators);
        }

        let mut data = self.defaults;
        if let Some(obj) = &self.obj {
            let schema_fields = self.schema.iter().flat_map(|s| s.field_names());
            let validator_fields = self.validators.iter().map(|(name, _)| name.as_str());
            for field in schema_fields.chain(validator_fields) {
                if let Some(value) = obj.get(field) {
                    data.insert(field.to_string(), value.clone());
                }
            }
        }

        Ok(Form {
            request: self.request,
            schema: self.schema,
            validators: self.validators,
            options: self.options,
            data,
            errors: ValidationErrors::new(),
            is_validated: false,
        })
    }
}
