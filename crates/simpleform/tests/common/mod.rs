#![allow(dead_code)]

use simpleform::{Bind, Form, NotEmpty, Request, Schema, Session};

pub const CSRF_TOKEN: &str = "csrft";

/// A schema with a single required `name` field.
pub fn simple_schema() -> Schema {
    Schema::new().field("name", NotEmpty::new())
}

pub fn get_request() -> Request {
    Request::get("/").session(Session::with_csrf_token(CSRF_TOKEN))
}

pub fn post_request(body: &str) -> Request {
    Request::post("/")
        .form_body(body)
        .session(Session::with_csrf_token(CSRF_TOKEN))
}

/// A form over `simple_schema` with `name` pre-filled.
pub fn form_with_name<'r>(request: &'r Request, name: serde_json::Value) -> Form<'r> {
    Form::builder(request)
        .schema(simple_schema())
        .default_value("name", name)
        .build()
        .unwrap_or_else(|e| panic!("failed to build form: {e}"))
}

#[derive(Bind, Debug, Default, Clone, PartialEq)]
pub struct SimpleObj {
    pub name: Option<String>,
}

impl SimpleObj {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
        }
    }
}
