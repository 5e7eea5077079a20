//! Category resolution for a cluster.
//!
//! 1. Majority vote over member categories (ties go to the first seen).
//! 2. If that is `other`: keyword dictionary over titles and descriptions.
//! 3. If no keyword hits: one external classification call, accepted only
//!    when it answers with a known label. Any failure keeps `other`.

use std::time::Duration;

use tracing::{debug, warn};

use urbanfix_common::Category;

use crate::clustering::Cluster;
use crate::traits::{within, TextClassifier};

/// Keyword table. Order matters: the first category with a hit wins.
pub const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Infrastructure,
        &["road", "bridge", "utility", "construction"],
    ),
    (
        Category::Sanitation,
        &["waste", "garbage", "clean", "sanitation", "trash"],
    ),
    (
        Category::Traffic,
        &["traffic", "signal", "congestion", "sign", "bus", "transport"],
    ),
    (
        Category::PublicSafety,
        &["safety", "security", "street light", "crime", "danger"],
    ),
    (
        Category::Environment,
        &["pollution", "park", "tree", "green", "air", "water"],
    ),
    (
        Category::Utilities,
        &["electricity", "water", "gas", "power", "outage"],
    ),
];

/// Most frequent member category; ties go to the category seen first.
pub fn majority_category(cluster: &Cluster) -> Category {
    let mut counts: Vec<(Category, usize)> = Vec::new();
    for issue in cluster.members() {
        match counts.iter_mut().find(|(c, _)| *c == issue.category) {
            Some((_, n)) => *n += 1,
            None => counts.push((issue.category, 1)),
        }
    }

    let mut best: Option<(Category, usize)> = None;
    for (category, n) in counts {
        if best.map_or(true, |(_, top)| n > top) {
            best = Some((category, n));
        }
    }
    best.map(|(c, _)| c).unwrap_or_default()
}

/// Every member's `title description`, space-joined.
pub fn cluster_text(cluster: &Cluster) -> String {
    cluster
        .members()
        .iter()
        .map(|issue| format!("{} {}", issue.title, issue.description))
        .collect::<Vec<_>>()
        .join(" ")
}

/// First dictionary category with a keyword inside `text` (case-insensitive).
pub fn keyword_category(text: &str) -> Option<Category> {
    let lower = text.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(*k)))
        .map(|(category, _)| *category)
}

/// Map a raw classifier answer onto the closed label set.
pub fn accept_classification(raw: &str) -> Option<Category> {
    Category::from_label(&ai_client::normalize_label(raw))
}

/// Resolve the category of `cluster`, consulting `classifier` at most once.
pub async fn resolve_category(
    cluster: &Cluster<'_>,
    classifier: &dyn TextClassifier,
    timeout: Duration,
) -> Category {
    let majority = majority_category(cluster);
    if majority != Category::Other {
        return majority;
    }

    let text = cluster_text(cluster);
    if let Some(category) = keyword_category(&text) {
        debug!(anchor = cluster.anchor().id.as_str(), %category, "Category from keywords");
        return category;
    }

    match within(timeout, classifier.classify(&text, &Category::CLASSIFIABLE)).await {
        Ok(raw) => match accept_classification(&raw) {
            Some(category) => {
                debug!(
                    anchor = cluster.anchor().id.as_str(),
                    classifier = classifier.name(),
                    %category,
                    "Category from classifier"
                );
                category
            }
            None => {
                warn!(
                    anchor = cluster.anchor().id.as_str(),
                    classifier = classifier.name(),
                    answer = raw.as_str(),
                    "Classifier answered outside the label set, keeping other"
                );
                Category::Other
            }
        },
        Err(e) => {
            warn!(
                anchor = cluster.anchor().id.as_str(),
                classifier = classifier.name(),
                error = %e,
                "Classification failed, keeping other"
            );
            Category::Other
        }
    }
}
