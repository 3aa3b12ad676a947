//! # Error Handling
//!
//! This module defines the centralized error type for `git-promotion`. It uses
//! the `thiserror` library to build a single `Error` enum covering every
//! failure a promotion run can hit, with messages meant to end up verbatim in
//! the run's report.
//!
//! ## Categories
//!
//! - **Validation errors** (`Validation`): the merged promotion config breaks
//!   one or more rules. All violations are carried together.
//! - **Conflict errors** (`BranchExists`): a named condition that points at a
//!   concurrent or stale run rather than an infrastructure problem. Use
//!   [`Error::is_conflict`] to tell them apart.
//! - **Transport errors** (`Repository`, `Network`): any failure of the
//!   repository access port. These are propagated unchanged.
//! - **Collaborator errors** (`Secret`, `Stage`, `ConfigParse`): failures of
//!   the secret store, the stage sequencer or the config store.
//!
//! No-op outcomes (nothing to promote) are not errors; they are successful
//! results carrying an explanatory message.

use thiserror::Error;

/// Main error type for git-promotion operations
#[derive(Error, Debug)]
pub enum Error {
    /// A promotion config fragment or settings file could not be read.
    #[error("Configuration parsing error: {message}")]
    ConfigParse { message: String },

    /// The merged promotion config failed validation.
    ///
    /// Holds every violation found, in the order they were detected.
    #[error("Validation error: {}", violations.join(","))]
    Validation { violations: Vec<String> },

    /// The promotion branch of a flat-pr run already exists.
    #[error("branch with name {branch} already exists")]
    BranchExists { branch: String },

    /// The repository rejected or failed an operation.
    #[error("Repository operation failed: {operation} - {message}")]
    Repository { operation: String, message: String },

    /// An error occurred during a network operation.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// A credential could not be retrieved from the secret store.
    #[error("Secret error: {name} - {message}")]
    Secret { name: String, message: String },

    /// The next stage of the pipeline could not be determined.
    #[error("Stage error: {message}")]
    Stage { message: String },

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Returns true for conflict errors, which indicate a concurrent or stale
    /// run instead of an infrastructure failure.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::BranchExists { .. })
    }

    /// Shorthand for a [`Error::Repository`] failure.
    pub fn repository(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Repository {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config_parse() {
        let error = Error::ConfigParse {
            message: "Invalid YAML".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Configuration parsing error"));
        assert!(display.contains("Invalid YAML"));
    }

    #[test]
    fn test_error_display_validation_joins_violations() {
        let error = Error::Validation {
            violations: vec![
                r#""spec.strategy" missing"#.to_string(),
                r#""target.secret" missing"#.to_string(),
            ],
        };
        let display = format!("{}", error);
        assert_eq!(
            display,
            r#"Validation error: "spec.strategy" missing,"target.secret" missing"#
        );
    }

    #[test]
    fn test_error_display_branch_exists() {
        let error = Error::BranchExists {
            branch: "promote/dev_staging-1234".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "branch with name promote/dev_staging-1234 already exists"
        );
    }

    #[test]
    fn test_branch_exists_is_conflict() {
        let error = Error::BranchExists {
            branch: "x".to_string(),
        };
        assert!(error.is_conflict());
    }

    #[test]
    fn test_transport_errors_are_not_conflicts() {
        assert!(!Error::repository("create branch", "409 conflict").is_conflict());
        assert!(!Error::Network {
            url: "https://api.github.com".to_string(),
            message: "timeout".to_string(),
        }
        .is_conflict());
    }

    #[test]
    fn test_error_display_repository() {
        let error = Error::repository("list files", "404 Not Found");
        let display = format!("{}", error);
        assert!(display.contains("Repository operation failed"));
        assert!(display.contains("list files"));
        assert!(display.contains("404 Not Found"));
    }

    #[test]
    fn test_error_network() {
        let error = Error::Network {
            url: "https://example.com".to_string(),
            message: "Connection timeout".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Network operation error"));
        assert!(display.contains("https://example.com"));
        assert!(display.contains("Connection timeout"));
    }

    #[test]
    fn test_error_secret() {
        let error = Error::Secret {
            name: "github-token".to_string(),
            message: "not set".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("github-token"));
        assert!(display.contains("not set"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_str = "invalid: [unclosed";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: Error = yaml_error.into();
        let display = format!("{}", error);
        assert!(display.contains("YAML parsing error"));
    }

    #[test]
    fn test_error_from_regex_error() {
        let regex_error = regex::Error::Syntax("Invalid regex".to_string());
        let error: Error = regex_error.into();
        let display = format!("{}", error);
        assert!(display.contains("Regex error"));
    }
}
