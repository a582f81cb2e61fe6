//! # simpleform
//!
//! Request-bound form validation, data binding and HTML form widgets.
//!
//! This crate provides:
//! - `Form`, which validates a request's submission against a schema and/or
//!   per-field validators and keeps the clean data and the errors
//! - Validators and `Schema`, with nested schemas and chained validators
//! - `#[derive(Bind)]` and the `Bindable` trait for binding clean data onto
//!   plain structs
//! - `FormRenderer`, which renders inputs pre-filled with data and errors
//! - htmlfill, which fills an existing HTML form in place
//!
//! ## Quick Start
//!
//! ```rust
//! use simpleform::{All, Bind, Form, FormRenderer, Int, NotEmpty, Request, Schema};
//!
//! #[derive(Bind, Default)]
//! struct Person {
//!     name: String,
//!     age: Option<i64>,
//! }
//!
//! let request = Request::post("/people").form_body("name=Fred&age=42");
//! let schema = Schema::new()
//!     .field("name", NotEmpty::new())
//!     .field("age", All::new().then(NotEmpty::new()).then(Int::new()));
//!
//! let mut form = Form::new(&request, schema);
//! assert!(form.validate());
//!
//! let mut person = Person::default();
//! form.bind(&mut person, &[], &[]).unwrap();
//! assert_eq!(person.name, "Fred");
//! assert_eq!(person.age, Some(42));
//!
//! let renderer = FormRenderer::new(&form);
//! assert_eq!(
//!     renderer.text("name"),
//!     r#"<input name="name" type="text" value="Fred" />"#
//! );
//! ```
//!
//! ## Errors
//!
//! ```rust
//! use simpleform::{Form, FormRenderer, NotEmpty, Request, Schema};
//!
//! let request = Request::post("/people");
//! let mut form = Form::new(&request, Schema::new().field("name", NotEmpty::new()));
//! assert!(!form.validate());
//! assert_eq!(form.errors_for("name"), ["Missing value"]);
//!
//! let renderer = FormRenderer::new(&form);
//! assert_eq!(
//!     renderer.errorlist(Some("name")),
//!     r#"<ul class="error"><li>Missing value</li></ul>"#
//! );
//! ```

extern crate self as simpleform;

mod bind;
mod decode;
mod error;
mod form;
pub mod htmlfill;
mod renderer;
mod request;
pub mod schema;
pub mod tags;
pub mod validation;
pub mod value;

pub use bind::Bindable;
pub use decode::{variable_decode, DecodeConflict};
pub use error::{FormError, Result, ValidationErrors};
pub use form::{Form, FormBuilder, FormOptions};
pub use htmlfill::HtmlFillOptions;
pub use renderer::{FormRenderer, RendererOptions, METHOD_FIELD};
pub use request::FormRequest;
pub use schema::{FieldsMatch, Schema, MISSING_VALUE, NON_FIELD_ERRORS};
pub use tags::Attrs;
pub use validation::{
    All, Bool, Email, ForEach, IfMissing, Int, Invalid, MaxLength, MinLength, NotEmpty, Number,
    OneOf, Pattern, Str, StringBool, Url, Validator, EMPTY_VALUE,
};

pub use simpleform_derive::Bind;
pub use simpleform_http::{Method, Params, Request, Session};

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
