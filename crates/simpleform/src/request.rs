//! The request interface forms read submissions from.

use simpleform_http::{Method, Params, Request};

/// What a form needs from an HTTP request.
pub trait FormRequest {
    /// Request method.
    fn method(&self) -> Method;

    /// Request path, used as the default form action.
    fn path(&self) -> &str;

    /// Parameters of the request body.
    fn post_params(&self) -> &Params;

    /// Query and body parameters combined.
    fn all_params(&self) -> Params;

    /// CSRF token of the session, if there is one.
    fn csrf_token(&self) -> Option<&str>;

    /// Checks a submitted CSRF token against the session's.
    fn check_csrf_token(&self, submitted: &str) -> bool {
        self.csrf_token() == Some(submitted)
    }
}

impl FormRequest for Request {
    fn method(&self) -> Method {
        self.method
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn post_params(&self) -> &Params {
        &self.form
    }

    fn all_params(&self) -> Params {
        self.params()
    }

    fn csrf_token(&self) -> Option<&str> {
        Some(self.session.csrf_token())
    }

    fn check_csrf_token(&self, submitted: &str) -> bool {
        self.session.check_csrf_token(submitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simpleform_http::Session;

    #[test]
    fn test_request_impl() {
        let req = Request::post("/signup")
            .query_param("next", "/home")
            .form_param("name", "Fred")
            .session(Session::with_csrf_token("csrft"));

        assert_eq!(FormRequest::method(&req), Method::Post);
        assert_eq!(FormRequest::path(&req), "/signup");
        assert_eq!(req.post_params().get("name"), Some("Fred"));
        assert!(!req.post_params().contains("next"));
        assert_eq!(req.all_params().get("next"), Some("/home"));
        assert_eq!(FormRequest::csrf_token(&req), Some("csrft"));
        assert!(FormRequest::check_csrf_token(&req, "csrft"));
        assert!(!FormRequest::check_csrf_token(&req, "csrfx"));
    }
}
