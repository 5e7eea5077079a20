//! Risk tier for a cluster.
//!
//! The external assessment is never trusted on its own: escalation needs
//! corroboration by people (upvoters and reporters) or a fresh cluster.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::warn;

use urbanfix_common::{Category, RiskTier};

use crate::clustering::Cluster;
use crate::traits::{within, RiskOracle};

pub const EMERGENCY_KEYWORDS: &[&str] = &[
    "urgent",
    "emergency",
    "danger",
    "accident",
    "critical",
    "immediate",
    "life-threatening",
    "fire",
    "flood",
    "ambulance",
    "hospital",
];

/// External assessment used when the oracle errors, times out or answers
/// with something other than a tier.
pub const FALLBACK_EXTERNAL_RISK: RiskTier = RiskTier::Moderate;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Inputs to [`decide_tier`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskSignals {
    pub external: RiskTier,
    pub emergency: bool,
    pub corroboration: usize,
    /// Days since the oldest report in the cluster.
    pub recency_days: f64,
}

/// The decision table. First matching row wins.
pub fn decide_tier(category: Category, signals: &RiskSignals) -> RiskTier {
    let RiskSignals {
        external,
        emergency,
        corroboration,
        recency_days,
    } = *signals;

    if category == Category::Unrelated {
        return RiskTier::Low;
    }
    if (external == RiskTier::Urgent || emergency) && (corroboration >= 3 || recency_days < 3.0) {
        return RiskTier::Urgent;
    }
    if (external == RiskTier::Moderate && corroboration >= 2) || (emergency && corroboration >= 1) {
        return RiskTier::Moderate;
    }
    RiskTier::Low
}

/// Upvoters then reporters, deduplicated, first-seen order.
pub fn corroborators(cluster: &Cluster) -> Vec<String> {
    let members = cluster.members();
    let voters = members.iter().flat_map(|issue| issue.upvotes.iter());
    let reporters = members.iter().map(|issue| &issue.user_id);

    let mut seen = HashSet::new();
    voters
        .chain(reporters)
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

/// Any member description contains an emergency keyword.
pub fn has_emergency_keyword(cluster: &Cluster) -> bool {
    cluster.members().iter().any(|issue| {
        let lower = issue.description.to_lowercase();
        EMERGENCY_KEYWORDS.iter().any(|k| lower.contains(*k))
    })
}

/// Fractional days between the oldest member report and `now`.
pub fn recency_days(cluster: &Cluster, now: DateTime<Utc>) -> f64 {
    let earliest = cluster
        .members()
        .iter()
        .map(|issue| issue.created_at)
        .min()
        .unwrap_or(now);
    (now - earliest).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// `- description` per member, one per line, cluster order.
pub fn description_lines(cluster: &Cluster) -> String {
    cluster
        .members()
        .iter()
        .map(|issue| format!("- {}", issue.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ask the oracle, falling back to [`FALLBACK_EXTERNAL_RISK`] on any failure.
pub async fn external_risk(
    cluster: &Cluster<'_>,
    descriptions: &str,
    oracle: &dyn RiskOracle,
    timeout: Duration,
) -> RiskTier {
    match within(timeout, oracle.assess(descriptions)).await {
        Ok(tier) => tier,
        Err(e) => {
            warn!(
                anchor = cluster.anchor().id.as_str(),
                oracle = oracle.name(),
                error = %e,
                "Risk assessment failed, assuming moderate"
            );
            FALLBACK_EXTERNAL_RISK
        }
    }
}

/// Gather every signal for `cluster`, calling the oracle once.
pub async fn assess_signals(
    cluster: &Cluster<'_>,
    corroboration: usize,
    oracle: &dyn RiskOracle,
    timeout: Duration,
    now: DateTime<Utc>,
) -> RiskSignals {
    let descriptions = description_lines(cluster);
    RiskSignals {
        external: external_risk(cluster, &descriptions, oracle, timeout).await,
        emergency: has_emergency_keyword(cluster),
        corroboration,
        recency_days: recency_days(cluster, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{issue, FailingCapability, FixedRiskOracle, SlowCapability};
    use chrono::Duration as ChronoDuration;
    use urbanfix_common::Issue;

    fn signals(external: RiskTier, emergency: bool, corroboration: usize, recency_days: f64) -> RiskSignals {
        RiskSignals {
            external,
            emergency,
            corroboration,
            recency_days,
        }
    }

    fn cluster(issues: &[Issue]) -> Cluster<'_> {
        Cluster::from_members(issues.iter().collect()).unwrap()
    }

    #[test]
    fn unrelated_is_always_low() {
        let s = signals(RiskTier::Urgent, true, 50, 0.1);
        assert_eq!(decide_tier(Category::Unrelated, &s), RiskTier::Low);
    }

    #[test]
    fn urgent_needs_corroboration_or_recency() {
        let cat = Category::Infrastructure;
        assert_eq!(decide_tier(cat, &signals(RiskTier::Urgent, false, 3, 30.0)), RiskTier::Urgent);
        assert_eq!(decide_tier(cat, &signals(RiskTier::Urgent, false, 1, 2.9)), RiskTier::Urgent);
        assert_eq!(decide_tier(cat, &signals(RiskTier::Low, true, 3, 30.0)), RiskTier::Urgent);
        // Urgent external risk alone, old and barely corroborated, does not escalate.
        assert_eq!(decide_tier(cat, &signals(RiskTier::Urgent, false, 2, 3.0)), RiskTier::Low);
    }

    #[test]
    fn moderate_rows() {
        let cat = Category::Sanitation;
        assert_eq!(decide_tier(cat, &signals(RiskTier::Moderate, false, 2, 10.0)), RiskTier::Moderate);
        assert_eq!(decide_tier(cat, &signals(RiskTier::Moderate, false, 1, 0.5)), RiskTier::Low);
        // Emergency wording with a single corroborator, too old for urgent.
        assert_eq!(decide_tier(cat, &signals(RiskTier::Low, true, 1, 10.0)), RiskTier::Moderate);
        assert_eq!(decide_tier(cat, &signals(RiskTier::Low, true, 0, 10.0)), RiskTier::Low);
    }

    #[test]
    fn low_external_without_emergency_is_low() {
        let s = signals(RiskTier::Low, false, 40, 0.0);
        assert_eq!(decide_tier(Category::Traffic, &s), RiskTier::Low);
    }

    #[test]
    fn corroborators_union_voters_and_reporters() {
        let issues = vec![
            issue("a").reporter("alice").upvotes(&["bob", "carol"]).build(),
            issue("b").reporter("bob").upvotes(&["carol", "dave"]).build(),
            issue("c").reporter("alice").build(),
        ];
        assert_eq!(
            corroborators(&cluster(&issues)),
            vec!["bob", "carol", "dave", "alice"]
        );
    }

    #[test]
    fn lone_report_counts_its_reporter() {
        let issues = vec![issue("a").reporter("alice").build()];
        assert_eq!(corroborators(&cluster(&issues)), vec!["alice"]);
    }

    #[test]
    fn emergency_keyword_in_any_description() {
        let issues = vec![
            issue("a").description("Broken bench").build(),
            issue("b").description("Live wire, EMERGENCY").build(),
        ];
        assert!(has_emergency_keyword(&cluster(&issues)));

        let calm = vec![issue("a").description("Faded paint").build()];
        assert!(!has_emergency_keyword(&cluster(&calm)));
    }

    #[test]
    fn recency_measures_from_oldest_member() {
        let now = Utc::now();
        let issues = vec![
            issue("new").created_at(now - ChronoDuration::hours(1)).build(),
            issue("old").created_at(now - ChronoDuration::days(5)).build(),
        ];
        let days = recency_days(&cluster(&issues), now);
        assert!((days - 5.0).abs() < 1e-6, "Expected 5 days, got {days}");
    }

    #[test]
    fn description_lines_are_bullets() {
        let issues = vec![
            issue("a").description("first").build(),
            issue("b").description("second").build(),
        ];
        assert_eq!(description_lines(&cluster(&issues)), "- first\n- second");
    }

    #[tokio::test]
    async fn oracle_answer_is_used() {
        let issues = vec![issue("a").description("water main burst").build()];
        let oracle = FixedRiskOracle::new(RiskTier::Low).when_contains("burst", RiskTier::Urgent);
        let now = Utc::now();
        let s = assess_signals(&cluster(&issues), 1, &oracle, Duration::from_secs(5), now).await;
        assert_eq!(s.external, RiskTier::Urgent);
        assert_eq!(oracle.calls(), 1);
    }

    #[tokio::test]
    async fn oracle_failure_falls_back_to_moderate() {
        let issues = vec![issue("a").build()];
        let oracle = FailingCapability::new();
        let s = assess_signals(&cluster(&issues), 1, &oracle, Duration::from_secs(5), Utc::now()).await;
        assert_eq!(s.external, RiskTier::Moderate);
    }

    #[tokio::test(start_paused = true)]
    async fn oracle_timeout_falls_back_to_moderate() {
        let issues = vec![issue("a").build()];
        let oracle = SlowCapability::new(Duration::from_secs(300));
        let s = assess_signals(&cluster(&issues), 1, &oracle, Duration::from_secs(2), Utc::now()).await;
        assert_eq!(s.external, RiskTier::Moderate);
    }
}
