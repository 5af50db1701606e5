//! Explicit session context for API calls.
//!
//! The token is carried by value into whichever component performs
//! requests; nothing is stored in process-wide state.

use std::fmt;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    /// A session without credentials. Protected endpoints answer 401.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Drop the token, e.g. after the server rejected it with 401.
    pub fn clear(&mut self) {
        self.token = None;
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_session_has_no_token() {
        let session = Session::anonymous();
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
    }

    #[test]
    fn clear_removes_token() {
        let mut session = Session::with_token("abc");
        assert_eq!(session.token(), Some("abc"));
        session.clear();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn debug_output_redacts_token() {
        let session = Session::with_token("secret-token");
        let printed = format!("{session:?}");
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("redacted"));
    }
}
