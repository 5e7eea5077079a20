use urbanfix_common::{Category, GroupedIssue, RiskTier};

use crate::clustering::Cluster;
use crate::risk::description_lines;

/// Most frequent title after trim + lowercase. Ties go to the first occurrence.
pub fn normalized_title(cluster: &Cluster) -> String {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for issue in cluster.members() {
        let title = issue.title.trim().to_lowercase();
        match counts.iter_mut().find(|(t, _)| *t == title) {
            Some((_, n)) => *n += 1,
            None => counts.push((title, 1)),
        }
    }

    let mut best: Option<(String, usize)> = None;
    for (title, n) in counts {
        if best.as_ref().map_or(true, |(_, top)| n > *top) {
            best = Some((title, n));
        }
    }
    best.map(|(t, _)| t).unwrap_or_default()
}

/// Upper-case the first character, leave the rest alone.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Reduce a cluster to its display record.
pub fn format_cluster(
    cluster: &Cluster,
    normalized_title: &str,
    category: Category,
    corroborators: Vec<String>,
    risk_level: RiskTier,
) -> GroupedIssue {
    let anchor = cluster.anchor();
    GroupedIssue {
        id: anchor.id.clone(),
        title: capitalize_first(normalized_title),
        description: description_lines(cluster),
        category,
        location: anchor.location,
        image: anchor.image.clone(),
        upvote_count: corroborators.len(),
        upvotes: corroborators,
        created_at: anchor.created_at,
        risk_level,
        report_count: cluster.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{issue, KORAMANGALA};
    use urbanfix_common::Issue;

    fn cluster(issues: &[Issue]) -> Cluster<'_> {
        Cluster::from_members(issues.iter().collect()).unwrap()
    }

    #[test]
    fn canonical_title_is_case_insensitive_majority() {
        let issues = vec![
            issue("a").title("Broken signal").build(),
            issue("b").title("  garbage PILEUP").build(),
            issue("c").title("Garbage pileup ").build(),
        ];
        assert_eq!(normalized_title(&cluster(&issues)), "garbage pileup");
    }

    #[test]
    fn title_ties_go_to_first_occurrence() {
        let issues = vec![
            issue("a").title("Open manhole").build(),
            issue("b").title("Broken signal").build(),
        ];
        assert_eq!(normalized_title(&cluster(&issues)), "open manhole");
    }

    #[test]
    fn capitalize_first_character_only() {
        assert_eq!(capitalize_first("garbage pileup"), "Garbage pileup");
        assert_eq!(capitalize_first("émission"), "Émission");
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn anchor_fields_represent_the_cluster() {
        let issues = vec![
            issue("anchor")
                .at(KORAMANGALA)
                .image("/uploads/anchor.jpg")
                .description("first")
                .build(),
            issue("member").image("/uploads/member.jpg").description("second").build(),
        ];
        let c = cluster(&issues);
        let grouped = format_cluster(
            &c,
            "pothole on the road",
            Category::Infrastructure,
            vec!["u1".into(), "u2".into()],
            RiskTier::Moderate,
        );
        assert_eq!(grouped.id, "anchor");
        assert_eq!(grouped.title, "Pothole on the road");
        assert_eq!(grouped.location, KORAMANGALA);
        assert_eq!(grouped.image.as_deref(), Some("/uploads/anchor.jpg"));
        assert_eq!(grouped.created_at, issues[0].created_at);
        assert_eq!(grouped.description, "- first\n- second");
        assert_eq!(grouped.upvote_count, 2);
        assert_eq!(grouped.report_count, 2);
        assert_eq!(grouped.risk_level, RiskTier::Moderate);
    }
}
