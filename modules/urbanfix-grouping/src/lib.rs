//! Risk grouping for civic-issue reports.
//!
//! A snapshot of raw reports is partitioned into anchor-relative spatial
//! clusters, each cluster gets a resolved category and a risk tier, and the
//! result is reduced to one display record per distinct urban problem.

pub mod category;
pub mod clustering;
pub mod engine;
pub mod filter;
pub mod formatter;
pub mod geo;
pub mod llm;
pub mod relevance;
pub mod risk;
pub mod snapshot;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use clustering::{cluster_issues, sort_most_recent_first, Cluster};
pub use engine::{GroupingEngine, GroupingOptions, GroupingService};
pub use filter::filter_by_tier;
pub use llm::{LlmClassifier, LlmRiskOracle, UnavailableCapability};
pub use snapshot::{InMemoryIssueSource, JsonFileIssueSource};
pub use traits::{IssueSource, RiskOracle, TextClassifier};
