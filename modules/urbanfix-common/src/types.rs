use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// --- Geo ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and inside lat [-90, 90], lng [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Infrastructure,
    Sanitation,
    Traffic,
    PublicSafety,
    Environment,
    Utilities,
    #[default]
    Other,
    /// Synthetic: content that is not a civic issue at all.
    Unrelated,
}

impl Category {
    /// Every category an external classifier may answer with.
    pub const CLASSIFIABLE: [Category; 8] = [
        Category::Infrastructure,
        Category::Sanitation,
        Category::Traffic,
        Category::PublicSafety,
        Category::Environment,
        Category::Utilities,
        Category::Other,
        Category::Unrelated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Infrastructure => "infrastructure",
            Category::Sanitation => "sanitation",
            Category::Traffic => "traffic",
            Category::PublicSafety => "public-safety",
            Category::Environment => "environment",
            Category::Utilities => "utilities",
            Category::Other => "other",
            Category::Unrelated => "unrelated",
        }
    }

    /// Exact label match, `None` for anything else.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::CLASSIFIABLE
            .into_iter()
            .find(|category| category.as_str() == label)
    }

    /// Lenient parse used for stored records: empty or unknown → `Other`.
    pub fn from_str_loose(s: &str) -> Self {
        Self::from_label(s.trim().to_lowercase().as_str()).unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn deserialize_category_loose<'de, D>(deserializer: D) -> Result<Category, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().map(Category::from_str_loose).unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Moderate,
    Urgent,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Moderate => "moderate",
            RiskTier::Urgent => "urgent",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRiskTier(pub String);

impl fmt::Display for UnknownRiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown risk tier '{}' (expected low, moderate or urgent)", self.0)
    }
}

impl std::error::Error for UnknownRiskTier {}

impl FromStr for RiskTier {
    type Err = UnknownRiskTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(RiskTier::Low),
            "moderate" => Ok(RiskTier::Moderate),
            "urgent" => Ok(RiskTier::Urgent),
            other => Err(UnknownRiskTier(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssuePriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

// --- Records ---

/// A citizen report as held by the issue store. Read-only to the grouping engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_category_loose")]
    pub category: Category,
    pub location: Location,
    pub created_at: DateTime<Utc>,
    /// Reporter id.
    pub user_id: String,
    /// Reporter contact.
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub upvotes: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub status: IssueStatus,
    #[serde(default)]
    pub priority: IssuePriority,
    #[serde(default)]
    pub admin_notes: String,
}

/// One distinct urban problem: a cluster of reports reduced to a single record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedIssue {
    /// Borrowed from the cluster's anchor report.
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub location: Location,
    pub image: Option<String>,
    /// Upvoters and reporters, deduplicated.
    pub upvotes: Vec<String>,
    pub upvote_count: usize,
    pub created_at: DateTime<Utc>,
    pub risk_level: RiskTier,
    pub report_count: usize,
}
