//! HTTP request type.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HttpError, Result};
use crate::params::Params;
use crate::session::Session;

/// Content type of urlencoded form submissions.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// HTTP request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// GET method
    Get,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// PATCH method
    Patch,
    /// DELETE method
    Delete,
    /// HEAD method
    Head,
    /// OPTIONS method
    Options,
}

impl Method {
    /// Returns the method as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl FromStr for Method {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(HttpError::UnknownMethod(s.to_string())),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An HTTP request as seen by form handling.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub path: String,
    /// Query string parameters.
    pub query: Params,
    /// Body parameters of a form submission.
    pub form: Params,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Raw request body.
    pub body: Vec<u8>,
    /// Session bound to the request.
    pub session: Session,
}

impl Request {
    /// Creates a new request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Params::new(),
            form: Params::new(),
            headers: HashMap::new(),
            body: Vec::new(),
            session: Session::new(),
        }
    }

    /// Creates a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Creates a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets an urlencoded body, its content type, and the parsed form params.
    #[must_use]
    pub fn form_body(self, body: &str) -> Self {
        let mut req = self.header("Content-Type", FORM_URLENCODED).body(body);
        req.form = Params::parse(body);
        req
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Appends a form body parameter.
    #[must_use]
    pub fn form_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(key.into(), value.into());
        self
    }

    /// Replaces the session.
    #[must_use]
    pub fn session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Gets a header value.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        // Case-insensitive header lookup
        let key_lower = key.to_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| k.to_lowercase() == key_lower)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the media type of the body, without parameters.
    pub fn content_type(&self) -> Option<&str> {
        self.get_header("Content-Type")
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim())
    }

    /// Re-parses the form params from the raw body.
    ///
    /// Only urlencoded bodies are parsed; other content types leave the
    /// form params untouched.
    pub fn parse_form_body(&mut self) -> Result<()> {
        if self.content_type() != Some(FORM_URLENCODED) {
            return Ok(());
        }
        let body = std::str::from_utf8(&self.body)
            .map_err(|e| HttpError::InvalidBody(e.to_string()))?;
        self.form = Params::parse(body);
        Ok(())
    }

    /// Query and form params combined, query first.
    pub fn params(&self) -> Params {
        let mut all = self.query.clone();
        all.extend(&self.form);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("post".parse::<Method>().unwrap(), Method::Post);
        assert!(matches!(
            "INVALID".parse::<Method>(),
            Err(HttpError::UnknownMethod(m)) if m == "INVALID"
        ));
    }

    #[test]
    fn test_method_serde() {
        let method: Method = serde_json::from_str("\"GET\"").unwrap();
        assert_eq!(method, Method::Get);
        assert_eq!(serde_json::to_string(&Method::Post).unwrap(), "\"POST\"");
    }

    #[test]
    fn test_request_builder() {
        let req = Request::get("/users")
            .header("Accept", "text/html")
            .query_param("page", "1");

        assert_eq!(req.method, Method::Get);
        assert_eq!(req.path, "/users");
        assert_eq!(req.get_header("accept"), Some("text/html"));
        assert_eq!(req.query.get("page"), Some("1"));
    }

    #[test]
    fn test_form_body() {
        let req = Request::post("/signup").form_body("name=Fred&tag=a&tag=b");

        assert_eq!(req.content_type(), Some(FORM_URLENCODED));
        assert_eq!(req.form.get("name"), Some("Fred"));
        assert_eq!(req.form.get_all("tag"), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_form_body_ignores_other_content_types() {
        let mut req = Request::post("/upload")
            .header("Content-Type", "application/json; charset=utf-8")
            .body("{\"name\": \"Fred\"}");
        req.parse_form_body().unwrap();
        assert!(req.form.is_empty());
    }

    #[test]
    fn test_parse_form_body_rejects_invalid_utf8() {
        let mut req = Request::post("/")
            .header("Content-Type", FORM_URLENCODED)
            .body(vec![0xff, 0xfe]);
        assert!(matches!(
            req.parse_form_body(),
            Err(HttpError::InvalidBody(_))
        ));
    }

    #[test]
    fn test_params_merges_query_and_form() {
        let req = Request::post("/search")
            .query_param("q", "rust")
            .form_param("page", "2");
        let params = req.params();
        assert_eq!(params.get("q"), Some("rust"));
        assert_eq!(params.get("page"), Some("2"));
    }
}
