// Capability boundaries for the grouping engine.
//
// IssueSource: read-only snapshot of the issue store.
// TextClassifier / RiskOracle: best-effort inference calls. Callers wrap
//   every call in a timeout and substitute a fallback on any error, so
//   implementations only need to report failure, never recover from it.

use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use urbanfix_common::{Category, Issue, RiskTier};

#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Every stored report. Order is not relied upon.
    async fn snapshot(&self) -> Result<Vec<Issue>>;
}

#[async_trait]
pub trait TextClassifier: Send + Sync {
    /// Pick one label from `allowed` for `text`. Returns the raw answer; the
    /// caller decides whether it is acceptable.
    async fn classify(&self, text: &str, allowed: &[Category]) -> Result<String>;
    fn name(&self) -> &str;
}

#[async_trait]
pub trait RiskOracle: Send + Sync {
    /// Qualitative risk for a block of `- description` lines.
    async fn assess(&self, descriptions: &str) -> Result<RiskTier>;
    fn name(&self) -> &str;
}

/// Await `call`, turning an elapsed `limit` into an error.
pub(crate) async fn within<T, F>(limit: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(anyhow!("timed out after {}ms", limit.as_millis())),
    }
}
