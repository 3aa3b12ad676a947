//! # Promotion Configuration Schema
//!
//! This module defines the data structures behind a promotion config fragment
//! (`git-promotion.yaml`) and the operations the resolver performs on them:
//! parsing, layering and placeholder substitution.
//!
//! ## Fragment format
//!
//! ```yaml
//! apiVersion: v1
//! kind: GitPromotionConfig
//! spec:
//!   strategy: flat-pr
//!   target:
//!     repo: https://github.com/acme/${project}-config
//!     secret: github-token
//!     provider: github
//!   paths:
//!     - source: templates
//!       target: ${nextstage}
//! ```
//!
//! Every scalar is optional so a fragment can carry only the fields it wants
//! to override. Absence (`None`) and emptiness (`Some("")`) are kept apart all
//! the way through merging and placeholder resolution; validation decides
//! what an empty value means.
//!
//! ## Layering
//!
//! Fragments are merged in project → stage → service order with
//! [`PromotionConfig::merge`]: a scalar set in a later fragment replaces the
//! earlier value, while `paths` are concatenated.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the strategy that promotes through a long-lived stage branch.
pub const STRATEGY_BRANCH: &str = "branch";
/// Name of the strategy that syncs templated files into a fresh branch.
pub const STRATEGY_FLAT_PR: &str = "flat-pr";
/// The only repository provider currently supported.
pub const PROVIDER_GITHUB: &str = "github";

/// The promotion mode selected by a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Compare two stage branches and open (or refresh) a pull request
    /// between them.
    Branch,
    /// Stamp templated files into an ephemeral branch and open a pull
    /// request back into the base branch.
    FlatPr,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Branch => STRATEGY_BRANCH,
            Strategy::FlatPr => STRATEGY_FLAT_PR,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            STRATEGY_BRANCH => Ok(Strategy::Branch),
            STRATEGY_FLAT_PR => Ok(Strategy::FlatPr),
            other => Err(Error::ConfigParse {
                message: format!("unknown strategy '{}'", other),
            }),
        }
    }
}

/// The repository promotions are written to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// HTTPS URL of the repository, e.g. `https://github.com/acme/config`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    /// Name of the secret holding the access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Git hosting provider. Only `github` is accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// A source → target location mapping used by the flat-pr strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMapping {
    /// Where templates are read from. When absent the target is templated in
    /// place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Where the rendered files end up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl PathMapping {
    /// Creates a mapping that renders `source` into `target`.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            target: Some(target.into()),
        }
    }

    /// Creates an in-place mapping.
    pub fn in_place(target: impl Into<String>) -> Self {
        Self {
            source: None,
            target: Some(target.into()),
        }
    }

    /// The location templates are read from: `source` if set, else `target`.
    pub fn read_location(&self) -> Option<&str> {
        self.source.as_deref().or(self.target.as_deref())
    }
}

/// The `spec` section of a promotion config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(default)]
    pub target: Target,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<PathMapping>,
}

/// A promotion config, either a single fragment or the merged result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionConfig {
    #[serde(
        default,
        rename = "apiVersion",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub spec: PromotionSpec,
}

impl PromotionConfig {
    /// Layers `other` on top of `self`.
    ///
    /// Scalars present in `other` win; `paths` from `other` are appended
    /// after the ones already collected.
    pub fn merge(mut self, other: PromotionConfig) -> Self {
        override_with(&mut self.api_version, other.api_version);
        override_with(&mut self.kind, other.kind);
        override_with(&mut self.spec.strategy, other.spec.strategy);
        override_with(&mut self.spec.target.repo, other.spec.target.repo);
        override_with(&mut self.spec.target.secret, other.spec.target.secret);
        override_with(&mut self.spec.target.provider, other.spec.target.provider);
        self.spec.paths.extend(other.spec.paths);
        self
    }

    /// Parsed strategy, if the `strategy` field names a known one.
    pub fn strategy(&self) -> Option<Strategy> {
        self.spec.strategy.as_deref().and_then(|s| s.parse().ok())
    }

    /// Substitutes `${project}`, `${stage}`, `${nextstage}` and `${service}`
    /// in the repository URL, the secret name and every path.
    ///
    /// Unknown placeholders are kept verbatim and absent fields stay absent.
    pub fn resolve_placeholders(&mut self, placeholders: &Placeholders) {
        let target = &mut self.spec.target;
        placeholders.apply_opt(&mut target.repo);
        placeholders.apply_opt(&mut target.secret);
        for path in &mut self.spec.paths {
            placeholders.apply_opt(&mut path.source);
            placeholders.apply_opt(&mut path.target);
        }
    }
}

fn override_with(current: &mut Option<String>, new: Option<String>) {
    if new.is_some() {
        *current = new;
    }
}

/// Values substituted for the `${...}` placeholders of a config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholders {
    pub project: String,
    pub stage: String,
    pub next_stage: String,
    pub service: String,
}

impl Placeholders {
    pub fn new(
        project: impl Into<String>,
        stage: impl Into<String>,
        next_stage: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            stage: stage.into(),
            next_stage: next_stage.into(),
            service: service.into(),
        }
    }

    /// Replaces every known placeholder in `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use git_promotion::config::Placeholders;
    ///
    /// let placeholders = Placeholders::new("foo", "dev", "staging", "api");
    /// assert_eq!(placeholders.apply("${project}/${stage}"), "foo/dev");
    /// assert_eq!(placeholders.apply("${unknown}"), "${unknown}");
    /// ```
    pub fn apply(&self, value: &str) -> String {
        let pairs = [
            ("${project}", self.project.as_str()),
            ("${stage}", self.stage.as_str()),
            ("${nextstage}", self.next_stage.as_str()),
            ("${service}", self.service.as_str()),
        ];
        pairs
            .iter()
            .fold(value.to_string(), |acc, (placeholder, replacement)| {
                acc.replace(placeholder, replacement)
            })
    }

    fn apply_opt(&self, value: &mut Option<String>) {
        if let Some(v) = value.as_mut() {
            *v = self.apply(v);
        }
    }
}

/// Parses a single promotion config fragment.
pub fn parse(yaml_content: &str) -> Result<PromotionConfig> {
    serde_yaml::from_str(yaml_content).map_err(Error::Yaml)
}

/// Parses a promotion config fragment from a file.
pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<PromotionConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(strategy: Option<&str>, repo: Option<&str>, paths: Vec<PathMapping>) -> PromotionConfig {
        PromotionConfig {
            spec: PromotionSpec {
                strategy: strategy.map(str::to_string),
                target: Target {
                    repo: repo.map(str::to_string),
                    ..Target::default()
                },
                paths,
            },
            ..PromotionConfig::default()
        }
    }

    #[test]
    fn test_parse_full_fragment() {
        let yaml = r#"
apiVersion: v1
kind: GitPromotionConfig
spec:
  strategy: flat-pr
  target:
    repo: https://github.com/acme/config
    secret: github-token
    provider: github
  paths:
    - source: templates
      target: dev
    - target: shared
"#;
        let config = parse(yaml).unwrap();
        assert_eq!(config.api_version.as_deref(), Some("v1"));
        assert_eq!(config.kind.as_deref(), Some("GitPromotionConfig"));
        assert_eq!(config.strategy(), Some(Strategy::FlatPr));
        assert_eq!(
            config.spec.target.repo.as_deref(),
            Some("https://github.com/acme/config")
        );
        assert_eq!(config.spec.target.secret.as_deref(), Some("github-token"));
        assert_eq!(config.spec.target.provider.as_deref(), Some("github"));
        assert_eq!(
            config.spec.paths,
            vec![
                PathMapping::new("templates", "dev"),
                PathMapping::in_place("shared")
            ]
        );
    }

    #[test]
    fn test_parse_partial_fragment_leaves_fields_absent() {
        let config = parse("spec:\n  target:\n    secret: other-token\n").unwrap();
        assert_eq!(config.spec.strategy, None);
        assert_eq!(config.spec.target.repo, None);
        assert_eq!(config.spec.target.secret.as_deref(), Some("other-token"));
        assert!(config.spec.paths.is_empty());
    }

    #[test]
    fn test_parse_keeps_empty_string_distinct_from_absent() {
        let config = parse("spec:\n  strategy: \"\"\n").unwrap();
        assert_eq!(config.spec.strategy.as_deref(), Some(""));
        assert_eq!(config.spec.target.repo, None);
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let result = parse("spec: [unclosed");
        assert!(matches!(result, Err(Error::Yaml(_))));
    }

    #[test]
    fn test_from_file_nonexistent() {
        let result = from_file("/nonexistent/git-promotion.yaml");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("branch".parse::<Strategy>().unwrap(), Strategy::Branch);
        assert_eq!("flat-pr".parse::<Strategy>().unwrap(), Strategy::FlatPr);
        assert!("rebase".parse::<Strategy>().is_err());
        assert_eq!(Strategy::FlatPr.to_string(), "flat-pr");
    }

    #[test]
    fn test_merge_later_scalar_wins() {
        let project = fragment(Some("branch"), Some("https://github.com/a/project"), vec![]);
        let service = fragment(None, Some("https://github.com/a/service"), vec![]);

        let merged = PromotionConfig::default().merge(project).merge(service);
        assert_eq!(merged.spec.strategy.as_deref(), Some("branch"));
        assert_eq!(
            merged.spec.target.repo.as_deref(),
            Some("https://github.com/a/service")
        );
    }

    #[test]
    fn test_merge_concatenates_paths_in_order() {
        let project = fragment(None, None, vec![PathMapping::in_place("p")]);
        let stage = fragment(None, None, vec![PathMapping::in_place("s")]);
        let service = fragment(None, None, vec![PathMapping::in_place("v")]);

        let merged = PromotionConfig::default()
            .merge(project)
            .merge(stage)
            .merge(service);
        let targets: Vec<_> = merged
            .spec
            .paths
            .iter()
            .map(|p| p.target.as_deref().unwrap())
            .collect();
        assert_eq!(targets, vec!["p", "s", "v"]);
    }

    #[test]
    fn test_merge_empty_string_overrides() {
        let project = fragment(Some("branch"), None, vec![]);
        let stage = fragment(Some(""), None, vec![]);
        let merged = PromotionConfig::default().merge(project).merge(stage);
        assert_eq!(merged.spec.strategy.as_deref(), Some(""));
    }

    #[test]
    fn test_resolve_placeholders() {
        let mut config = PromotionConfig {
            spec: PromotionSpec {
                strategy: Some("flat-pr".to_string()),
                target: Target {
                    repo: Some("https://github.com/acme/${project}".to_string()),
                    secret: Some("${service}-token".to_string()),
                    provider: Some("${project}".to_string()),
                },
                paths: vec![
                    PathMapping::new("${stage}/templates", "${nextstage}"),
                    PathMapping::in_place("${unknown}/x"),
                ],
            },
            ..PromotionConfig::default()
        };
        config.resolve_placeholders(&Placeholders::new("shop", "dev", "staging", "cart"));

        assert_eq!(
            config.spec.target.repo.as_deref(),
            Some("https://github.com/acme/shop")
        );
        assert_eq!(config.spec.target.secret.as_deref(), Some("cart-token"));
        // provider is not a placeholder-resolved field
        assert_eq!(config.spec.target.provider.as_deref(), Some("${project}"));
        assert_eq!(config.spec.paths[0], PathMapping::new("dev/templates", "staging"));
        assert_eq!(config.spec.paths[1], PathMapping::in_place("${unknown}/x"));
    }

    #[test]
    fn test_resolve_placeholders_keeps_absent_fields_absent() {
        let mut config = PromotionConfig::default();
        config.spec.paths.push(PathMapping::in_place("${stage}"));
        config.resolve_placeholders(&Placeholders::new("p", "dev", "prod", "s"));
        assert_eq!(config.spec.target.repo, None);
        assert_eq!(config.spec.paths[0].source, None);
        assert_eq!(config.spec.paths[0].target.as_deref(), Some("dev"));
    }

    #[test]
    fn test_read_location() {
        assert_eq!(PathMapping::new("a", "b").read_location(), Some("a"));
        assert_eq!(PathMapping::in_place("b").read_location(), Some("b"));
        assert_eq!(PathMapping::default().read_location(), None);
    }
}
