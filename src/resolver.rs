//! # Configuration Resolver
//!
//! Builds the effective promotion config of a service by layering up to
//! three fragments:
//!
//! 1. the project fragment,
//! 2. the stage fragment,
//! 3. the service fragment.
//!
//! Fragments come from a [`ConfigStore`]. A fragment that does not exist
//! contributes nothing; a fragment that does not parse is logged and
//! skipped, so one broken file cannot hide the rest of the configuration.
//! Placeholders are resolved after merging, so a project-level
//! `${service}` is filled in with the service actually being promoted.

use crate::config::{self, Placeholders, PromotionConfig};
use crate::error::Result;
use crate::settings::DEFAULT_CONFIG_FILE;
use log::{debug, error, info};
use std::fmt;
use std::path::{Path, PathBuf};

/// The level a config fragment is stored at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Project {
        project: String,
    },
    Stage {
        project: String,
        stage: String,
    },
    Service {
        project: String,
        stage: String,
        service: String,
    },
}

impl Scope {
    /// The three scopes of a promotion, in merge order.
    pub fn layers(project: &str, stage: &str, service: &str) -> [Scope; 3] {
        [
            Scope::Project {
                project: project.to_string(),
            },
            Scope::Stage {
                project: project.to_string(),
                stage: stage.to_string(),
            },
            Scope::Service {
                project: project.to_string(),
                stage: stage.to_string(),
                service: service.to_string(),
            },
        ]
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Project { project } => write!(f, "project {}", project),
            Scope::Stage { project, stage } => write!(f, "stage {}/{}", project, stage),
            Scope::Service {
                project,
                stage,
                service,
            } => write!(f, "service {}/{}/{}", project, stage, service),
        }
    }
}

/// Source of raw config fragments.
pub trait ConfigStore: Send + Sync {
    /// Returns the fragment stored for `scope`, or `None` if there is none.
    fn fragment(&self, scope: &Scope) -> Result<Option<String>>;
}

/// Reads fragments from a directory tree:
///
/// ```text
/// <root>/<file>                      project
/// <root>/<stage>/<file>              stage
/// <root>/<stage>/<service>/<file>    service
/// ```
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    root: PathBuf,
    file_name: String,
}

impl FileConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_file_name(root, DEFAULT_CONFIG_FILE)
    }

    pub fn with_file_name(root: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            file_name: file_name.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the fragment for `scope`.
    pub fn fragment_path(&self, scope: &Scope) -> PathBuf {
        match scope {
            Scope::Project { .. } => self.root.join(&self.file_name),
            Scope::Stage { stage, .. } => self.root.join(stage).join(&self.file_name),
            Scope::Service { stage, service, .. } => self
                .root
                .join(stage)
                .join(service)
                .join(&self.file_name),
        }
    }
}

impl ConfigStore for FileConfigStore {
    fn fragment(&self, scope: &Scope) -> Result<Option<String>> {
        let path = self.fragment_path(scope);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Merges the fragments of a promotion and resolves its placeholders.
///
/// The config is not validated here; see [`crate::validation::validate`].
pub fn resolve(store: &dyn ConfigStore, placeholders: &Placeholders) -> Result<PromotionConfig> {
    let mut merged = PromotionConfig::default();
    for scope in Scope::layers(
        &placeholders.project,
        &placeholders.stage,
        &placeholders.service,
    ) {
        match store.fragment(&scope)? {
            None => debug!("no promotion config found for {}", scope),
            Some(content) => match config::parse(&content) {
                Ok(fragment) => {
                    debug!("merging promotion config of {}", scope);
                    merged = merged.merge(fragment);
                }
                Err(e) => error!("skipping promotion config of {}: {}", scope, e),
            },
        }
    }
    merged.resolve_placeholders(placeholders);
    info!(
        "resolved promotion config for {}/{}/{} with strategy {}",
        placeholders.project,
        placeholders.stage,
        placeholders.service,
        merged.spec.strategy.as_deref().unwrap_or("<none>")
    );
    Ok(merged)
}
