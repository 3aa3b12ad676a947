//! Stage sequencing: which stage comes after the current one.

use crate::error::{Error, Result};

/// Answers the stage a promotion from `stage` goes to.
pub trait StageSequencer: Send + Sync {
    fn next_stage(&self, project: &str, stage: &str) -> Result<String>;
}

/// An ordered list of stages, shared by every project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageList {
    stages: Vec<String>,
}

impl StageList {
    pub fn new<I, S>(stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stages: stages.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a comma separated list such as `dev,staging,production`.
    pub fn parse(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|stage| !stage.is_empty()),
        )
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }
}

impl StageSequencer for StageList {
    fn next_stage(&self, _project: &str, stage: &str) -> Result<String> {
        let position = self
            .stages
            .iter()
            .position(|s| s == stage)
            .ok_or_else(|| Error::Stage {
                message: format!("stage {} not found", stage),
            })?;
        self.stages
            .get(position + 1)
            .cloned()
            .ok_or_else(|| Error::Stage {
                message: format!("no stage defined after stage {}", stage),
            })
    }
}

/// Always promotes to the same stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedStage(pub String);

impl StageSequencer for FixedStage {
    fn next_stage(&self, _project: &str, _stage: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}
