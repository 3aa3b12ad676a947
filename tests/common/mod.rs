//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures and config snippets to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new().with_project_config(configs::FLAT_PR);
//! ```

use assert_fs::prelude::*;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
#[allow(unused_imports)]
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    pub use super::configs;
    pub use super::TestFixture;
}

/// Promotion config fragments used across tests.
#[allow(dead_code)]
pub mod configs {
    /// Project fragment for the flat-pr strategy, rendering `templates`
    /// into the next stage's directory.
    pub const FLAT_PR: &str = r#"apiVersion: v1
kind: GitPromotionConfig
spec:
  strategy: flat-pr
  target:
    repo: https://github.com/acme/${project}-config
    secret: github-token
    provider: github
  paths:
    - source: templates
      target: ${nextstage}
"#;

    /// Project fragment for the branch strategy.
    pub const BRANCH: &str = r#"apiVersion: v1
kind: GitPromotionConfig
spec:
  strategy: branch
  target:
    repo: https://github.com/acme/config
    secret: github-token
    provider: github
"#;

    /// Fragment breaking several validation rules at once.
    pub const INVALID: &str = r#"spec:
  strategy: branch
  target:
    repo: http://gitlab.com/acme/config
    provider: gitlab
  paths:
    - target: dev
"#;

    /// Not YAML at all.
    pub const BROKEN: &str = "spec: [unclosed";

    /// A templated values file with one marker.
    pub const VALUES_TEMPLATE: &str =
        "image:\n  tag: latest # {\"git-promotion.replacewith\":\"data.image.tag\"}\n";

    /// A promotion event.
    pub const EVENT: &str = r#"{
  "specversion": "1.0",
  "id": "c2b1e7a0-4bd1-4f6c-9d35-3b0e0b0b8f11",
  "source": "ci",
  "type": "promotion.triggered",
  "data": {
    "project": "shop",
    "stage": "dev",
    "service": "cart",
    "image": { "tag": "2.6.0" }
  }
}"#;
}

/// A temporary config directory laid out the way `FileConfigStore` reads it.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add the project fragment.
    pub fn with_project_config(self, content: &str) -> Self {
        self.with_file("git-promotion.yaml", content)
    }

    /// Add a stage fragment.
    pub fn with_stage_config(self, stage: &str, content: &str) -> Self {
        self.with_file(&format!("{}/git-promotion.yaml", stage), content)
    }

    /// Add a service fragment.
    pub fn with_service_config(self, stage: &str, service: &str, content: &str) -> Self {
        self.with_file(
            &format!("{}/{}/git-promotion.yaml", stage, service),
            content,
        )
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
