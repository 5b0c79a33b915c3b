//! Authentication primitives: credentials, registrations and issued tokens.
//!
//! Keep form parsing outside the adapters by exposing constructors that
//! validate string inputs before anything talks to the backend.

use std::fmt;

use serde::Deserialize;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::identity::Identity;
use super::role::Role;

/// Length of a token fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Domain error returned when login or registration values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
    /// Email was blank or lacked an `@`.
    InvalidEmail,
    /// Credential token was blank.
    EmptyToken,
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyToken => write!(f, "credential token must not be empty"),
        }
    }
}

impl std::error::Error for CredentialValidationError {}

/// Validated login credentials sent to `POST /auth/login`.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use frontend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("admin", "password").unwrap();
/// assert_eq!(creds.username(), "admin");
/// assert_eq!(creds.password(), "password");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialValidationError`] for a blank username or password.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(CredentialValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for the login request.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated self-registration form sent to `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    credentials: LoginCredentials,
    email: String,
    role: Role,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl Registration {
    /// Validate a registration form.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialValidationError`] for blank credentials or an email
    /// without an `@`.
    pub fn try_new(
        credentials: LoginCredentials,
        email: &str,
        role: Role,
    ) -> Result<Self, CredentialValidationError> {
        let email = email.trim();
        let has_local_and_domain = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !has_local_and_domain {
            return Err(CredentialValidationError::InvalidEmail);
        }
        Ok(Self {
            credentials,
            email: email.to_owned(),
            role,
            first_name: None,
            last_name: None,
        })
    }

    /// Attach the optional display names; blank values are dropped.
    #[must_use]
    pub fn with_names(mut self, first_name: Option<&str>, last_name: Option<&str>) -> Self {
        self.first_name = non_blank(first_name);
        self.last_name = non_blank(last_name);
        self
    }

    /// Username and password.
    #[must_use]
    pub const fn credentials(&self) -> &LoginCredentials {
        &self.credentials
    }

    /// Contact email.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Requested role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Optional first name.
    #[must_use]
    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    /// Optional last name.
    #[must_use]
    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_owned)
}

/// Opaque bearer credential issued by the backend.
///
/// The secret is zeroed on drop and never printed by `Debug`; log the
/// [`CredentialToken::fingerprint`] instead.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct CredentialToken(Zeroizing<String>);

impl CredentialToken {
    /// Validate and wrap a token string.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialValidationError::EmptyToken`] for blank input.
    pub fn new(token: impl Into<String>) -> Result<Self, CredentialValidationError> {
        let raw = Zeroizing::new(token.into());
        if raw.trim().is_empty() {
            return Err(CredentialValidationError::EmptyToken);
        }
        Ok(Self(raw))
    }

    /// Raw token for the `Authorization` header and durable storage.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Truncated SHA-256 of the token as 16 hex characters.
    ///
    /// Enough to tell sessions apart in logs without exposing the secret.
    ///
    /// # Examples
    ///
    /// ```
    /// use frontend::domain::CredentialToken;
    ///
    /// let token = CredentialToken::new("abc.def.ghi").unwrap();
    /// let fp = token.fingerprint();
    /// assert_eq!(fp.len(), 16);
    /// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    /// ```
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        let result = hasher.finalize();
        hex::encode(result.get(..FINGERPRINT_BYTES).unwrap_or_default())
    }
}

impl fmt::Debug for CredentialToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CredentialToken")
            .field(&self.fingerprint())
            .finish()
    }
}

impl TryFrom<String> for CredentialToken {
    type Error = CredentialValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Successful login or registration response: `{token, user}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthGrant {
    /// Issued bearer credential.
    #[serde(alias = "access_token")]
    pub token: CredentialToken,
    /// Authenticated identity.
    #[serde(rename = "user")]
    pub identity: Identity,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", CredentialValidationError::EmptyUsername)]
    #[case("   ", "pw", CredentialValidationError::EmptyUsername)]
    #[case("user", "", CredentialValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: CredentialValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("  admin  ", "secret")]
    #[case("alice", "correct horse battery staple")]
    fn valid_credentials_trim_username(#[case] username: &str, #[case] password: &str) {
        let creds = LoginCredentials::try_from_parts(username, password)
            .expect("valid inputs should succeed");
        assert_eq!(creds.username(), username.trim());
        assert_eq!(creds.password(), password);
    }

    #[rstest]
    #[case("")]
    #[case("no-at-sign")]
    #[case("@hospital.test")]
    #[case("nurse@")]
    fn registration_rejects_bad_email(#[case] email: &str) {
        let creds = LoginCredentials::try_from_parts("nurse", "pw").expect("credentials");
        let err = Registration::try_new(creds, email, Role::Patient).expect_err("bad email");
        assert_eq!(err, CredentialValidationError::InvalidEmail);
    }

    #[rstest]
    fn registration_drops_blank_names() {
        let creds = LoginCredentials::try_from_parts("jdoe", "pw").expect("credentials");
        let registration = Registration::try_new(creds, " jdoe@hospital.test ", Role::Patient)
            .expect("valid registration")
            .with_names(Some(" Jane "), Some("  "));
        assert_eq!(registration.email(), "jdoe@hospital.test");
        assert_eq!(registration.first_name(), Some("Jane"));
        assert_eq!(registration.last_name(), None);
    }

    #[rstest]
    fn token_debug_hides_secret() {
        let token = CredentialToken::new("super-secret-token").expect("token");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("super-secret-token"));
        assert!(rendered.contains(&token.fingerprint()));
    }

    #[rstest]
    fn fingerprint_is_deterministic() {
        let first = CredentialToken::new("abc").expect("token");
        let second = CredentialToken::new("abc").expect("token");
        assert_eq!(first.fingerprint(), second.fingerprint());
        assert_eq!(first.fingerprint().len(), FINGERPRINT_BYTES * 2);
    }

    #[rstest]
    #[case(r#"{"token":"t-1","user":{"id":1,"username":"amy","role":"patient"}}"#)]
    #[case(r#"{"access_token":"t-1","user":{"id":"1","username":"amy","role":"Patient"}}"#)]
    fn auth_grant_decodes_backend_shapes(#[case] json: &str) {
        let grant: AuthGrant = serde_json::from_str(json).expect("grant decodes");
        assert_eq!(grant.token.expose(), "t-1");
        assert_eq!(grant.identity.role(), Role::Patient);
    }

    #[rstest]
    fn auth_grant_rejects_blank_token() {
        let json = r#"{"token":"  ","user":{"id":1,"username":"amy","role":"patient"}}"#;
        assert!(serde_json::from_str::<AuthGrant>(json).is_err());
    }
}
