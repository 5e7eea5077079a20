//! Issue snapshot sources.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use urbanfix_common::{Issue, UrbanFixError};

use crate::traits::IssueSource;

/// Fixed, in-memory snapshot.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIssueSource {
    issues: Vec<Issue>,
}

impl InMemoryIssueSource {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }
}

#[async_trait]
impl IssueSource for InMemoryIssueSource {
    async fn snapshot(&self) -> Result<Vec<Issue>> {
        Ok(self.issues.clone())
    }
}

/// Reads a JSON array of issue documents (an export of the issue store) on
/// every snapshot, so edits to the file show up on the next query.
#[derive(Debug, Clone)]
pub struct JsonFileIssueSource {
    path: PathBuf,
}

impl JsonFileIssueSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reject records whose coordinates are out of range or not finite.
pub fn validate_issues(issues: &[Issue]) -> Result<(), UrbanFixError> {
    match issues.iter().find(|issue| !issue.location.is_valid()) {
        Some(bad) => Err(UrbanFixError::Validation(format!(
            "issue {} has invalid location ({}, {})",
            bad.id, bad.location.lat, bad.location.lng
        ))),
        None => Ok(()),
    }
}

#[async_trait]
impl IssueSource for JsonFileIssueSource {
    async fn snapshot(&self) -> Result<Vec<Issue>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read issue snapshot {}", self.path.display()))?;
        let issues: Vec<Issue> = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse issue snapshot {}", self.path.display()))?;
        validate_issues(&issues)?;
        debug!(path = %self.path.display(), issues = issues.len(), "Loaded issue snapshot");
        Ok(issues)
    }
}
