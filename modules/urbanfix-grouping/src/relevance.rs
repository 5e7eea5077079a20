//! Urban-relevance gate.
//!
//! A cluster whose canonical title mentions none of these words is not a
//! civic problem. It is reported as `unrelated` with risk `low` and never
//! appears in a tier-filtered view.

pub const URBAN_KEYWORDS: &[&str] = &[
    "road",
    "street",
    "light",
    "pothole",
    "sanitation",
    "traffic",
    "environment",
    "public",
    "safety",
    "water",
    "drain",
    "garbage",
    "infrastructure",
    "park",
    "signal",
    "bus",
    "transport",
    "electricity",
    "sewage",
    "construction",
    "bridge",
    "crosswalk",
    "sidewalk",
    "pollution",
    "waste",
    "clean",
    "repair",
    "accident",
    "danger",
    "flood",
    "fire",
    "ambulance",
    "hospital",
    "school",
    "power",
    "outage",
    "tree",
    "fallen",
    "block",
    "hazard",
    "maintenance",
];

/// Whether `title` names a civic issue. Case-insensitive substring test.
pub fn is_urban(title: &str) -> bool {
    let lower = title.to_lowercase();
    URBAN_KEYWORDS.iter().any(|k| lower.contains(*k))
}
