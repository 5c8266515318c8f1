//! Credential resolution for the completion endpoint.
//!
//! A bearer token is resolved once per batch. Lookup order depends on the
//! caller's hint:
//!
//! - hint `react`: `GROQ_API_KEY_REACT`, then `GROQ_API_KEY` from the environment
//! - otherwise: `GROQ_API_KEY` in the secrets store, then in the environment
//!
//! The resolved token is wrapped in an [`ApiCredential`] that remembers its
//! [`KeySource`] and never shows the value in `Debug` or `Display` output.
//!
//! ## Usage
//!
//! ```ignore
//! let resolver = KeyResolver::new().with_secrets(secrets);
//! let credential = resolver.resolve("react")?;
//!
//! // Use in HTTP header (explicit exposure)
//! request.bearer_auth(credential.expose());
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::fmt;

use crate::RuntimeError;

/// Secrets-store key and primary environment variable for the API key.
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Environment variable checked first for React front-end callers.
pub const GROQ_API_KEY_REACT_ENV: &str = "GROQ_API_KEY_REACT";

/// Hint sent by the React front-end.
pub const REACT_HINT: &str = "react";

/// Diagnostic label used when no key can be found anywhere.
pub const KEY_NOT_FOUND_LABEL: &str = "GROQ_API_KEY not found in secrets or environment";

/// Where the active credential came from.
///
/// Cosmetic: shown to operators next to the results, never used for decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// React caller, default key from the environment
    ReactClient,
    /// Secrets store
    Secrets,
    /// Environment fallback for non-React callers; shares the React label
    Environment,
    /// Provided programmatically
    Programmatic,
}

impl KeySource {
    /// Human-readable diagnostic label.
    pub fn label(&self) -> &'static str {
        match self {
            KeySource::ReactClient | KeySource::Environment => "React client – using default key",
            KeySource::Secrets => "Using key from secrets",
            KeySource::Programmatic => "Key provided programmatically",
        }
    }
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for KeySource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// A securely-stored API credential.
///
/// This wrapper provides:
/// - Safe Debug implementation that shows `[REDACTED]`
/// - Memory zeroing on drop via `secrecy` crate
/// - Explicit exposure via `.expose()` method
/// - Source tracking for the key-source diagnostic
pub struct ApiCredential {
    value: SecretString,
    source: KeySource,
}

impl ApiCredential {
    /// Create a new credential from a string value.
    pub fn new(value: impl Into<String>, source: KeySource) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
        }
    }

    /// Expose the credential value for use in API calls.
    ///
    /// Only call this where the value is actually needed (the auth header).
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    /// Get the source of this credential.
    pub fn source(&self) -> KeySource {
        self.source
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API key ({}) [REDACTED]", self.source)
    }
}

/// Resolves the bearer token for a batch.
#[derive(Clone)]
pub struct KeyResolver {
    secrets: JsonValue,
    key_env: String,
    react_env: String,
}

impl KeyResolver {
    /// Resolver with no secrets store and the standard environment variables.
    pub fn new() -> Self {
        Self {
            secrets: JsonValue::Null,
            key_env: GROQ_API_KEY_ENV.to_string(),
            react_env: GROQ_API_KEY_REACT_ENV.to_string(),
        }
    }

    /// Use a secrets store (a JSON object holding `GROQ_API_KEY`).
    pub fn with_secrets(mut self, secrets: JsonValue) -> Self {
        self.secrets = secrets;
        self
    }

    /// Override the environment variable names.
    pub fn with_env_vars(mut self, key_env: impl Into<String>, react_env: impl Into<String>) -> Self {
        self.key_env = key_env.into();
        self.react_env = react_env.into();
        self
    }

    /// Resolve a credential for the given caller hint.
    ///
    /// Fails with [`RuntimeError::CredentialMissing`] when no non-empty key
    /// is available. Nothing should be classified in that case.
    pub fn resolve(&self, hint: &str) -> Result<ApiCredential, RuntimeError> {
        let found = if hint == REACT_HINT {
            env_value(&self.react_env)
                .or_else(|| env_value(&self.key_env))
                .map(|v| (v, KeySource::ReactClient))
        } else {
            self.secret_value()
                .map(|v| (v, KeySource::Secrets))
                .or_else(|| env_value(&self.key_env).map(|v| (v, KeySource::Environment)))
        };

        match found {
            Some((value, source)) => {
                tracing::debug!(source = %source, "Resolved API key");
                Ok(ApiCredential::new(value, source))
            }
            None => {
                tracing::error!(hint, "{}", KEY_NOT_FOUND_LABEL);
                Err(RuntimeError::CredentialMissing(KEY_NOT_FOUND_LABEL.to_string()))
            }
        }
    }

    fn secret_value(&self) -> Option<String> {
        self.secrets[self.key_env.as_str()]
            .as_str()
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for KeyResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyResolver")
            .field("has_secrets", &!self.secrets.is_null())
            .field("key_env", &self.key_env)
            .field("react_env", &self.react_env)
            .finish()
    }
}

fn env_value(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_redacted_in_debug() {
        let secret = "gsk-super-secret-key-12345";
        let cred = ApiCredential::new(secret, KeySource::Programmatic);

        let debug = format!("{:?}", cred);
        assert!(!debug.contains(secret), "Secret exposed in Debug!");
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_credential_redacted_in_display() {
        let secret = "gsk-super-secret-key-12345";
        let cred = ApiCredential::new(secret, KeySource::Secrets);

        let display = format!("{}", cred);
        assert!(!display.contains(secret), "Secret exposed in Display!");
        assert!(display.contains("[REDACTED]"));
        assert!(display.contains("Using key from secrets"));
    }

    #[test]
    fn test_credential_expose() {
        let cred = ApiCredential::new("gsk-key", KeySource::Programmatic);
        assert_eq!(cred.expose(), "gsk-key");
    }

    #[test]
    fn test_react_hint_prefers_react_key() {
        std::env::set_var("TEST_GROQ_REACT_PREF_R", "react-key");
        std::env::set_var("TEST_GROQ_REACT_PREF", "default-key");

        let resolver = KeyResolver::new()
            .with_secrets(serde_json::json!({"TEST_GROQ_REACT_PREF": "secret-key"}))
            .with_env_vars("TEST_GROQ_REACT_PREF", "TEST_GROQ_REACT_PREF_R");
        let cred = resolver.resolve("react").unwrap();

        assert_eq!(cred.expose(), "react-key");
        assert_eq!(cred.source(), KeySource::ReactClient);

        std::env::remove_var("TEST_GROQ_REACT_PREF_R");
        std::env::remove_var("TEST_GROQ_REACT_PREF");
    }

    #[test]
    fn test_react_hint_falls_back_to_default_key() {
        std::env::set_var("TEST_GROQ_REACT_FALLBACK", "default-key");

        let resolver = KeyResolver::new()
            .with_env_vars("TEST_GROQ_REACT_FALLBACK", "TEST_GROQ_REACT_FALLBACK_UNSET");
        let cred = resolver.resolve("react").unwrap();

        assert_eq!(cred.expose(), "default-key");
        assert_eq!(cred.source(), KeySource::ReactClient);

        std::env::remove_var("TEST_GROQ_REACT_FALLBACK");
    }

    #[test]
    fn test_secrets_preferred_over_environment() {
        std::env::set_var("TEST_GROQ_SECRETS_PREF", "env-key");

        let resolver = KeyResolver::new()
            .with_secrets(serde_json::json!({"TEST_GROQ_SECRETS_PREF": "secret-key"}))
            .with_env_vars("TEST_GROQ_SECRETS_PREF", "TEST_GROQ_SECRETS_PREF_R");
        let cred = resolver.resolve("").unwrap();

        assert_eq!(cred.expose(), "secret-key");
        assert_eq!(cred.source(), KeySource::Secrets);

        std::env::remove_var("TEST_GROQ_SECRETS_PREF");
    }

    #[test]
    fn test_environment_fallback() {
        std::env::set_var("TEST_GROQ_ENV_FALLBACK", "env-key");

        let resolver = KeyResolver::new()
            .with_secrets(serde_json::json!({"OTHER_KEY": "nope"}))
            .with_env_vars("TEST_GROQ_ENV_FALLBACK", "TEST_GROQ_ENV_FALLBACK_R");
        let cred = resolver.resolve("streamlit").unwrap();

        assert_eq!(cred.expose(), "env-key");
        assert_eq!(cred.source(), KeySource::Environment);
        assert_eq!(cred.source().label(), "React client – using default key");

        std::env::remove_var("TEST_GROQ_ENV_FALLBACK");
    }

    #[test]
    fn test_react_hint_is_case_sensitive() {
        std::env::set_var("TEST_GROQ_HINT_CASE_R", "react-key");

        let resolver = KeyResolver::new()
            .with_secrets(serde_json::json!({"TEST_GROQ_HINT_CASE": "secret-key"}))
            .with_env_vars("TEST_GROQ_HINT_CASE", "TEST_GROQ_HINT_CASE_R");
        let cred = resolver.resolve("React").unwrap();

        assert_eq!(cred.expose(), "secret-key");
        assert_eq!(cred.source(), KeySource::Secrets);

        std::env::remove_var("TEST_GROQ_HINT_CASE_R");
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let resolver =
            KeyResolver::new().with_env_vars("TEST_GROQ_MISSING_12345", "TEST_GROQ_MISSING_R_12345");

        for hint in ["react", ""] {
            match resolver.resolve(hint) {
                Err(RuntimeError::CredentialMissing(label)) => {
                    assert_eq!(label, KEY_NOT_FOUND_LABEL);
                }
                other => panic!("Expected CredentialMissing, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_empty_secret_counts_as_missing() {
        let resolver = KeyResolver::new()
            .with_secrets(serde_json::json!({"TEST_GROQ_EMPTY_12345": ""}))
            .with_env_vars("TEST_GROQ_EMPTY_12345", "TEST_GROQ_EMPTY_R_12345");

        assert!(matches!(
            resolver.resolve(""),
            Err(RuntimeError::CredentialMissing(_))
        ));
    }

    #[test]
    fn test_resolver_debug_hides_secrets() {
        let resolver =
            KeyResolver::new().with_secrets(serde_json::json!({"GROQ_API_KEY": "gsk-hidden"}));
        let debug = format!("{:?}", resolver);
        assert!(!debug.contains("gsk-hidden"));
        assert!(debug.contains("has_secrets: true"));
    }

    #[test]
    fn test_key_source_serializes_as_label() {
        let json = serde_json::to_value(KeySource::ReactClient).unwrap();
        assert_eq!(json, "React client – using default key");
    }
}
