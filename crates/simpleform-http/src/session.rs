//! Request sessions and CSRF tokens.

use serde::{Deserialize, Serialize};

/// A session attached to a request.
///
/// Every session carries a CSRF token generated on creation; forms render it
/// into a hidden field and compare it on submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session key (64 character hex string).
    pub session_key: String,
    csrf_token: String,
}

impl Session {
    /// Creates a new session with a fresh CSRF token.
    pub fn new() -> Self {
        Self {
            session_key: generate_token(),
            csrf_token: generate_token(),
        }
    }

    /// Creates a session with a known CSRF token.
    ///
    /// Mostly useful in tests, where rendered markup must be predictable.
    pub fn with_csrf_token(token: impl Into<String>) -> Self {
        Self {
            csrf_token: token.into(),
            ..Self::new()
        }
    }

    /// Returns the CSRF token bound to this session.
    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    /// Checks a submitted token against the session token.
    pub fn check_csrf_token(&self, submitted: &str) -> bool {
        let matches = constant_time_eq(self.csrf_token.as_bytes(), submitted.as_bytes());
        if !matches {
            tracing::debug!(session = %self.session_key, "CSRF token mismatch");
        }
        matches
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates a random 64 character hex token.
fn generate_token() -> String {
    use rand::RngExt;
    let mut rng = rand::rng();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
