//! Validation of a merged promotion config.
//!
//! [`validate`] never stops at the first problem: it walks every rule and
//! returns all violations so a caller can report them in one pass. An empty
//! list means the config is usable.

use crate::config::{PromotionConfig, PROVIDER_GITHUB, STRATEGY_BRANCH, STRATEGY_FLAT_PR};
use log::info;
use regex::Regex;
use url::Url;

const GITHUB_HOST: &str = "github.com";
const GITHUB_PATH_PATTERN: &str = "^/[A-Za-z0-9-]+/[A-Za-z._-]+$";
const REPO_NOT_ON_GITHUB: &str =
    r#""target.repo" must be a "https" url to a repository on github.com"#;

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

/// Checks a merged config and returns every violation found, in rule order.
pub fn validate(config: &PromotionConfig) -> Vec<String> {
    let mut violations = Vec::new();
    let spec = &config.spec;

    match spec.strategy.as_deref() {
        None | Some("") => violations.push(r#""spec.strategy" missing"#.to_string()),
        Some(STRATEGY_BRANCH) | Some(STRATEGY_FLAT_PR) => {}
        Some(other) => violations.push(format!(r#""spec.strategy" {} invalid"#, other)),
    }

    if is_blank(&spec.target.secret) {
        violations.push(r#""target.secret" missing"#.to_string());
    }

    match spec.target.provider.as_deref() {
        None | Some("") => violations.push(r#""target.provider" missing"#.to_string()),
        Some(PROVIDER_GITHUB) => {}
        Some(other) => violations.push(format!(r#""target.provider" {} not supported"#, other)),
    }

    match spec.target.repo.as_deref() {
        None | Some("") => violations.push(r#""target.repo" missing"#.to_string()),
        Some(repo) => {
            if let Some(violation) = check_repo_url(repo) {
                violations.push(violation);
            }
        }
    }

    match spec.strategy.as_deref() {
        Some(STRATEGY_BRANCH) if !spec.paths.is_empty() => {
            violations.push(r#"no "paths" supported for branch strategy"#.to_string())
        }
        Some(STRATEGY_FLAT_PR) if spec.paths.is_empty() => violations
            .push("at least one path is necessary for strategy flat-pr".to_string()),
        _ => {}
    }

    for (i, path) in spec.paths.iter().enumerate() {
        match path.target.as_deref() {
            None | Some("") => violations.push(format!(r#""paths[{}].target" is missing"#, i)),
            Some(target) => {
                for (j, other) in spec.paths.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    if let Some(other_target) = other.target.as_deref() {
                        if target.starts_with(other_target) {
                            violations.push(format!(
                                "paths[{}].target is already included in paths[{}].target",
                                i, j
                            ));
                        }
                    }
                }
            }
        }
        if path.source.is_some() && path.source == path.target {
            violations.push(format!(r#""paths[{}].source" is same as target"#, i));
        }
    }

    info!(
        "validation finished with {} validation errors",
        violations.len()
    );
    violations
}

fn check_repo_url(repo: &str) -> Option<String> {
    let url = match Url::parse(repo) {
        Ok(url) => url,
        Err(_) => return Some(r#""target.repo" is not a valid URL"#.to_string()),
    };
    if url.scheme() != "https" || url.host_str() != Some(GITHUB_HOST) {
        return Some(REPO_NOT_ON_GITHUB.to_string());
    }
    let matched = Regex::new(GITHUB_PATH_PATTERN)
        .map(|re| re.is_match(url.path()))
        .unwrap_or(false);
    if !matched {
        return Some(REPO_NOT_ON_GITHUB.to_string());
    }
    None
}
