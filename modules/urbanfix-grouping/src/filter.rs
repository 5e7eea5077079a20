use urbanfix_common::{Category, GroupedIssue, RiskTier};

/// Keep records at `tier`, never `unrelated` ones. `None` keeps everything.
pub fn filter_by_tier(grouped: Vec<GroupedIssue>, tier: Option<RiskTier>) -> Vec<GroupedIssue> {
    match tier {
        None => grouped,
        Some(tier) => grouped
            .into_iter()
            .filter(|g| g.risk_level == tier && g.category != Category::Unrelated)
            .collect(),
    }
}
