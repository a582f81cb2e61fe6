//! # simpleform-http
//!
//! The request-side collaborators of `simpleform`.
//!
//! This crate provides:
//! - `Method` with parsing and serde support
//! - `Params`, an ordered multi-valued parameter map
//! - `Request` with query params, urlencoded form params, headers and session
//! - `Session` with a per-session CSRF token
//!
//! ## Quick Start
//!
//! ```rust
//! use simpleform_http::{Method, Request, Session};
//!
//! let request = Request::post("/signup")
//!     .form_body("name=Fred&tags=a&tags=b")
//!     .session(Session::with_csrf_token("secret"));
//!
//! assert_eq!(request.method, Method::Post);
//! assert_eq!(request.form.get("name"), Some("Fred"));
//! assert_eq!(request.form.get_all("tags"), vec!["a", "b"]);
//! assert_eq!(request.session.csrf_token(), "secret");
//! ```

mod error;
mod params;
mod request;
mod session;

pub use error::{HttpError, Result};
pub use params::Params;
pub use request::{Method, Request, FORM_URLENCODED};
pub use session::Session;
