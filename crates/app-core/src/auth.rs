//! Mock login flow
//!
//! Credential validation for the login screen. There is no backend: any
//! well-formed email and password sign in successfully. Violations are
//! reported per field and all together, so the form can highlight every
//! offending input at once.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// A single credential violation, keyed to the offending field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// Email field left empty
    #[error("Email is required")]
    EmailRequired,

    /// Email does not look like an address
    #[error("Please enter a valid email")]
    EmailInvalid,

    /// Password field left empty
    #[error("Password is required")]
    PasswordRequired,

    /// Password shorter than the minimum
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more credential fields failed validation
    #[error("Invalid credentials")]
    Validation(Vec<CredentialError>),
}

impl AuthError {
    /// The per-field violations behind this error
    pub fn violations(&self) -> &[CredentialError] {
        match self {
            AuthError::Validation(violations) => violations,
        }
    }
}

/// Result type for authentication operations
pub type Result<T> = std::result::Result<T, AuthError>;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Mailbox, host, and top-level label with no whitespace anywhere
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

/// Validate login credentials
///
/// All violations are collected rather than failing at the first one.
pub fn validate_credentials(
    email: &str,
    password: &str,
) -> std::result::Result<(), Vec<CredentialError>> {
    let mut violations = Vec::new();

    if email.is_empty() {
        violations.push(CredentialError::EmailRequired);
    } else if !email_pattern().is_match(email) {
        violations.push(CredentialError::EmailInvalid);
    }

    if password.is_empty() {
        violations.push(CredentialError::PasswordRequired);
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        violations.push(CredentialError::PasswordTooShort);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Mock sign-in result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockSession {
    /// Address the user signed in with
    pub email: String,
    /// Display name derived from the mailbox part of the address
    pub display_name: String,
}

/// Mock authenticator: validates credentials and always signs in
///
/// # Example
///
/// ```
/// use app_core::auth::MockAuthenticator;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let auth = MockAuthenticator::new();
/// let session = auth.login("alice@example.com", "hunter22").await.unwrap();
/// assert_eq!(session.display_name, "alice");
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MockAuthenticator;

impl MockAuthenticator {
    /// Create a new mock authenticator
    pub fn new() -> Self {
        Self
    }

    /// Validate credentials and produce a session
    ///
    /// No backend is consulted; every well-formed credential pair signs in.
    pub async fn login(&self, email: &str, password: &str) -> Result<MockSession> {
        validate_credentials(email, password).map_err(AuthError::Validation)?;

        let display_name = email.split('@').next().unwrap_or(email).to_string();

        tracing::debug!("mock login succeeded for {}", email);

        Ok(MockSession { email: email.to_string(), display_name })
    }
}
