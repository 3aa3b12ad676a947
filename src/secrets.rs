//! Access tokens for the target repository.

use crate::error::{Error, Result};

/// Environment variable prefix used by [`EnvSecretStore::default`].
pub const DEFAULT_SECRET_PREFIX: &str = "GIT_PROMOTION_SECRET_";

/// Looks up the access token stored under a secret name.
pub trait SecretStore: Send + Sync {
    fn token(&self, name: &str) -> Result<String>;
}

/// Reads tokens from environment variables.
///
/// The secret `github-token` is read from `GIT_PROMOTION_SECRET_GITHUB_TOKEN`:
/// the name is upper-cased and every character that is not ASCII
/// alphanumeric becomes `_`.
#[derive(Debug, Clone)]
pub struct EnvSecretStore {
    prefix: String,
}

impl Default for EnvSecretStore {
    fn default() -> Self {
        Self::new(DEFAULT_SECRET_PREFIX)
    }
}

impl EnvSecretStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Name of the environment variable holding `secret`.
    ///
    /// # Examples
    ///
    /// ```
    /// use git_promotion::secrets::EnvSecretStore;
    ///
    /// let store = EnvSecretStore::default();
    /// assert_eq!(
    ///     store.variable_name("github-token"),
    ///     "GIT_PROMOTION_SECRET_GITHUB_TOKEN"
    /// );
    /// ```
    pub fn variable_name(&self, secret: &str) -> String {
        let suffix: String = secret
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}{}", self.prefix, suffix)
    }
}

impl SecretStore for EnvSecretStore {
    fn token(&self, name: &str) -> Result<String> {
        let variable = self.variable_name(name);
        match std::env::var(&variable) {
            Ok(value) if !value.is_empty() => Ok(value),
            Ok(_) => Err(Error::Secret {
                name: name.to_string(),
                message: format!("{} is empty", variable),
            }),
            Err(e) => Err(Error::Secret {
                name: name.to_string(),
                message: format!("{}: {}", variable, e),
            }),
        }
    }
}
