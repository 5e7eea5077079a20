use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use ai_client::Claude;
use urbanfix_common::{config, Category, Config, GroupedIssue, Issue, RiskTier, UrbanFixError};

use crate::category::resolve_category;
use crate::clustering::{cluster_issues, sort_most_recent_first, Cluster};
use crate::filter::filter_by_tier;
use crate::formatter::{format_cluster, normalized_title};
use crate::llm::{LlmClassifier, LlmRiskOracle, UnavailableCapability};
use crate::relevance::is_urban;
use crate::risk::{assess_signals, corroborators, decide_tier};
use crate::traits::{IssueSource, RiskOracle, TextClassifier};

/// Tunables for one engine instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupingOptions {
    pub radius_meters: f64,
    /// Clusters processed at once. Each may make up to two outbound calls.
    pub max_concurrency: usize,
    /// Limit applied to every outbound call.
    pub call_timeout: Duration,
}

impl Default for GroupingOptions {
    fn default() -> Self {
        Self {
            radius_meters: config::DEFAULT_RADIUS_METERS,
            max_concurrency: config::DEFAULT_MAX_CONCURRENCY,
            call_timeout: config::DEFAULT_AI_CALL_TIMEOUT,
        }
    }
}

impl GroupingOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            radius_meters: config.radius_meters,
            max_concurrency: config.max_concurrency.max(1),
            call_timeout: config.ai_call_timeout,
        }
    }
}

/// Stateless batch transform from a report snapshot to grouped records.
/// Safe to share across concurrent requests.
#[derive(Clone)]
pub struct GroupingEngine {
    classifier: Arc<dyn TextClassifier>,
    oracle: Arc<dyn RiskOracle>,
    options: GroupingOptions,
}

impl GroupingEngine {
    pub fn new(classifier: Arc<dyn TextClassifier>, oracle: Arc<dyn RiskOracle>) -> Self {
        Self {
            classifier,
            oracle,
            options: GroupingOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GroupingOptions) -> Self {
        self.options = GroupingOptions {
            max_concurrency: options.max_concurrency.max(1),
            ..options
        };
        self
    }

    /// Claude-backed engine when a key is configured, otherwise an engine
    /// whose external calls always take their fallbacks.
    pub fn from_config(config: &Config) -> Self {
        let engine = match config.anthropic_api_key.as_deref() {
            Some(key) => {
                let ai = Claude::new(key, &config.ai_model);
                Self::new(
                    Arc::new(LlmClassifier::new(ai.clone())),
                    Arc::new(LlmRiskOracle::new(ai)),
                )
            }
            None => {
                warn!("ANTHROPIC_API_KEY not set, categories and risk will use fallbacks");
                Self::new(Arc::new(UnavailableCapability), Arc::new(UnavailableCapability))
            }
        };
        engine.with_options(GroupingOptions::from_config(config))
    }

    pub fn options(&self) -> &GroupingOptions {
        &self.options
    }

    /// Group `issues` as of now, optionally keeping only one risk tier.
    pub async fn group(&self, issues: &[Issue], tier: Option<RiskTier>) -> Vec<GroupedIssue> {
        self.group_at(issues, tier, Utc::now()).await
    }

    /// Group `issues` with recency measured against `now`.
    pub async fn group_at(
        &self,
        issues: &[Issue],
        tier: Option<RiskTier>,
        now: DateTime<Utc>,
    ) -> Vec<GroupedIssue> {
        let ordered = sort_most_recent_first(issues);
        let clusters = cluster_issues(ordered, self.options.radius_meters);

        info!(
            issues = issues.len(),
            clusters = clusters.len(),
            max_concurrency = self.options.max_concurrency,
            "Grouping issues"
        );

        let tasks: Vec<BoxFuture<'_, (usize, GroupedIssue)>> = clusters
            .iter()
            .enumerate()
            .map(|(index, cluster)| {
                async move { (index, self.process_cluster(cluster, now).await) }.boxed()
            })
            .collect();

        let mut indexed: Vec<(usize, GroupedIssue)> = stream::iter(tasks)
            .buffer_unordered(self.options.max_concurrency)
            .collect()
            .await;
        indexed.sort_by_key(|(index, _)| *index);

        let grouped: Vec<GroupedIssue> = indexed.into_iter().map(|(_, g)| g).collect();
        let total = grouped.len();
        let filtered = filter_by_tier(grouped, tier);

        if let Some(tier) = tier {
            info!(%tier, total, kept = filtered.len(), "Filtered grouped issues by risk");
        }
        filtered
    }

    async fn process_cluster(&self, cluster: &Cluster<'_>, now: DateTime<Utc>) -> GroupedIssue {
        let title = normalized_title(cluster);
        let people = corroborators(cluster);

        // Gate first: a non-civic cluster ends up unrelated/low whatever the
        // resolver or oracle would say, so neither is consulted. Unrelated
        // from the classifier also pins the tier to low.
        let category = if is_urban(&title) {
            resolve_category(cluster, self.classifier.as_ref(), self.options.call_timeout).await
        } else {
            Category::Unrelated
        };

        let risk_level = if category == Category::Unrelated {
            RiskTier::Low
        } else {
            let signals = assess_signals(
                cluster,
                people.len(),
                self.oracle.as_ref(),
                self.options.call_timeout,
                now,
            )
            .await;
            decide_tier(category, &signals)
        };

        debug!(
            anchor = cluster.anchor().id.as_str(),
            reports = cluster.len(),
            title = title.as_str(),
            %category,
            %risk_level,
            "Cluster assessed"
        );

        format_cluster(cluster, &title, category, people, risk_level)
    }
}

/// Engine bound to a snapshot source: the single read-only query operation.
#[derive(Clone)]
pub struct GroupingService {
    source: Arc<dyn IssueSource>,
    engine: GroupingEngine,
}

impl GroupingService {
    pub fn new(source: Arc<dyn IssueSource>, engine: GroupingEngine) -> Self {
        Self { source, engine }
    }

    pub fn engine(&self) -> &GroupingEngine {
        &self.engine
    }

    /// Fetch a fresh snapshot and group it. Only snapshot retrieval can fail.
    pub async fn grouped(&self, tier: Option<RiskTier>) -> Result<Vec<GroupedIssue>, UrbanFixError> {
        let issues = self.source.snapshot().await.map_err(|e| {
            match e.downcast::<UrbanFixError>() {
                Ok(err) => err,
                Err(e) => UrbanFixError::Snapshot(format!("{e:#}")),
            }
        })?;
        Ok(self.engine.group(&issues, tier).await)
    }
}
