//! Service settings and their default values.
//!
//! Settings tune how promotions are carried out (PR title prefix, marker
//! namespace, base branch, ...) without touching the per-project promotion
//! configs. They can be read from a YAML file with kebab-case keys; every key
//! is optional and falls back to the constants below.
//!
//! ```yaml
//! title-prefix: "promotion:"
//! base-branch: main
//! external-url: https://ci.example.com
//! unchanged-paths: stop
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Prefix identifying pull requests opened by this tool.
pub const DEFAULT_TITLE_PREFIX: &str = "promotion:";
/// Namespace of the marker comments rewritten by field substitution.
pub const DEFAULT_MARKER_NAMESPACE: &str = "git-promotion.replacewith";
/// Branch flat-pr promotions start from and open their pull request into.
pub const DEFAULT_BASE_BRANCH: &str = "main";
/// File name of a promotion config fragment.
pub const DEFAULT_CONFIG_FILE: &str = "git-promotion.yaml";
/// Root of the GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// What a flat-pr run does with a path whose rendered files already match
/// the target location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnchangedPathPolicy {
    /// End the run with "no changes detected", leaving the promotion branch
    /// in place. Later paths are not processed.
    #[default]
    Stop,
    /// Move on to the next path. A run in which no path changed removes the
    /// promotion branch again.
    Skip,
}

impl fmt::Display for UnchangedPathPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnchangedPathPolicy::Skip => f.write_str("skip"),
            UnchangedPathPolicy::Stop => f.write_str("stop"),
        }
    }
}

impl FromStr for UnchangedPathPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "skip" => Ok(UnchangedPathPolicy::Skip),
            "stop" => Ok(UnchangedPathPolicy::Stop),
            other => Err(Error::ConfigParse {
                message: format!("unknown unchanged-path policy '{}'", other),
            }),
        }
    }
}

/// Settings shared by every promotion run of a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// Prefix of managed pull request titles.
    pub title_prefix: String,
    pub marker_namespace: String,
    pub base_branch: String,
    /// Base URL linked from pull request bodies, if any.
    pub external_url: Option<String>,
    pub unchanged_paths: UnchangedPathPolicy,
    pub config_file: String,
    pub api_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title_prefix: DEFAULT_TITLE_PREFIX.to_string(),
            marker_namespace: DEFAULT_MARKER_NAMESPACE.to_string(),
            base_branch: DEFAULT_BASE_BRANCH.to_string(),
            external_url: None,
            unchanged_paths: UnchangedPathPolicy::default(),
            config_file: DEFAULT_CONFIG_FILE.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl Settings {
    /// Parses settings from YAML. Missing keys take their default value.
    pub fn parse(yaml_content: &str) -> Result<Self> {
        // an empty document deserializes to null, not to an empty mapping
        if yaml_content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
            message: format!("invalid settings: {}", e),
        })
    }

    /// Reads settings from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.title_prefix, "promotion:");
        assert_eq!(settings.marker_namespace, "git-promotion.replacewith");
        assert_eq!(settings.base_branch, "main");
        assert_eq!(settings.external_url, None);
        assert_eq!(settings.unchanged_paths, UnchangedPathPolicy::Stop);
        assert_eq!(settings.config_file, "git-promotion.yaml");
        assert_eq!(settings.api_url, "https://api.github.com");
    }

    #[test]
    fn test_parse_partial() {
        let settings = Settings::parse(
            "title-prefix: \"[bot]\"\nexternal-url: https://ci.example.com\nunchanged-paths: skip\n",
        )
        .unwrap();
        assert_eq!(settings.title_prefix, "[bot]");
        assert_eq!(
            settings.external_url.as_deref(),
            Some("https://ci.example.com")
        );
        assert_eq!(settings.unchanged_paths, UnchangedPathPolicy::Skip);
        assert_eq!(settings.base_branch, "main");
    }

    #[test]
    fn test_parse_empty_document() {
        assert_eq!(Settings::parse("").unwrap(), Settings::default());
        assert_eq!(Settings::parse("  \n").unwrap(), Settings::default());
    }

    #[test]
    fn test_parse_unknown_policy() {
        let result = Settings::parse("unchanged-paths: abort\n");
        assert!(matches!(result, Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "base-branch: trunk").unwrap();
        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.base_branch, "trunk");
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "stop".parse::<UnchangedPathPolicy>().unwrap(),
            UnchangedPathPolicy::Stop
        );
        assert_eq!(UnchangedPathPolicy::Skip.to_string(), "skip");
        assert!("halt".parse::<UnchangedPathPolicy>().is_err());
    }
}
