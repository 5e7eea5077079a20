// Test doubles for the grouping engine.
//
// Capability mocks matching the trait boundaries:
// - FixedClassifier (TextClassifier): one canned answer, counts calls
// - FixedRiskOracle (RiskOracle): default tier plus substring rules, counts calls
// - FailingCapability (both): always errors, counts calls
// - SlowCapability (both): sleeps past any reasonable timeout
//
// Plus an issue builder and coordinate helpers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use urbanfix_common::{Category, Issue, IssuePriority, IssueStatus, Location, RiskTier};

use crate::traits::{RiskOracle, TextClassifier};

// ---------------------------------------------------------------------------
// Test constants
// ---------------------------------------------------------------------------

/// MG Road, Bengaluru.
pub const MG_ROAD: Location = Location {
    lat: 12.9756,
    lng: 77.6050,
};
/// Koramangala, Bengaluru (~4.5 km from MG Road).
pub const KORAMANGALA: Location = Location {
    lat: 12.9352,
    lng: 77.6245,
};

const METERS_PER_DEGREE_LAT: f64 = 111_195.0;

/// Shift a location due north by `meters`.
pub fn meters_north(from: Location, meters: f64) -> Location {
    Location {
        lat: from.lat + meters / METERS_PER_DEGREE_LAT,
        lng: from.lng,
    }
}

// ---------------------------------------------------------------------------
// Issue builder
// ---------------------------------------------------------------------------

pub fn issue(id: &str) -> IssueBuilder {
    IssueBuilder {
        issue: Issue {
            id: id.to_string(),
            title: "Pothole on the road".to_string(),
            description: "Deep pothole in the left lane".to_string(),
            category: Category::Infrastructure,
            location: MG_ROAD,
            created_at: Utc::now(),
            user_id: format!("reporter-{id}"),
            user_email: format!("{id}@example.com"),
            upvotes: Vec::new(),
            image: None,
            status: IssueStatus::Pending,
            priority: IssuePriority::Medium,
            admin_notes: String::new(),
        },
    }
}

pub struct IssueBuilder {
    issue: Issue,
}

impl IssueBuilder {
    pub fn title(mut self, title: &str) -> Self {
        self.issue.title = title.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.issue.description = description.to_string();
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.issue.category = category;
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.issue.location = location;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.issue.created_at = created_at;
        self
    }

    pub fn reporter(mut self, user_id: &str) -> Self {
        self.issue.user_id = user_id.to_string();
        self
    }

    pub fn upvotes(mut self, voters: &[&str]) -> Self {
        self.issue.upvotes = voters.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn image(mut self, image: &str) -> Self {
        self.issue.image = Some(image.to_string());
        self
    }

    pub fn build(self) -> Issue {
        self.issue
    }
}

// ---------------------------------------------------------------------------
// FixedClassifier
// ---------------------------------------------------------------------------

/// Answers every classification with the same raw string.
pub struct FixedClassifier {
    answer: String,
    calls: AtomicUsize,
}

impl FixedClassifier {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextClassifier for FixedClassifier {
    async fn classify(&self, _text: &str, _allowed: &[Category]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

// ---------------------------------------------------------------------------
// FixedRiskOracle
// ---------------------------------------------------------------------------

/// Returns `default` unless the descriptions contain a registered substring.
/// Rules are checked in registration order.
pub struct FixedRiskOracle {
    default: RiskTier,
    rules: Vec<(String, RiskTier)>,
    calls: AtomicUsize,
}

impl FixedRiskOracle {
    pub fn new(default: RiskTier) -> Self {
        Self {
            default,
            rules: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn when_contains(mut self, needle: &str, tier: RiskTier) -> Self {
        self.rules.push((needle.to_string(), tier));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RiskOracle for FixedRiskOracle {
    async fn assess(&self, descriptions: &str) -> Result<RiskTier> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let tier = self
            .rules
            .iter()
            .find(|(needle, _)| descriptions.contains(needle.as_str()))
            .map(|(_, tier)| *tier)
            .unwrap_or(self.default);
        Ok(tier)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

// ---------------------------------------------------------------------------
// FailingCapability
// ---------------------------------------------------------------------------

/// Stands in for an unreachable inference service.
#[derive(Default)]
pub struct FailingCapability {
    calls: AtomicUsize,
}

impl FailingCapability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextClassifier for FailingCapability {
    async fn classify(&self, _text: &str, _allowed: &[Category]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        bail!("connection refused")
    }

    fn name(&self) -> &str {
        "failing"
    }
}

#[async_trait]
impl RiskOracle for FailingCapability {
    async fn assess(&self, _descriptions: &str) -> Result<RiskTier> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        bail!("connection refused")
    }

    fn name(&self) -> &str {
        "failing"
    }
}

// ---------------------------------------------------------------------------
// SlowCapability
// ---------------------------------------------------------------------------

/// Sleeps for `delay` before answering `urgent` / `traffic`.
pub struct SlowCapability {
    delay: Duration,
}

impl SlowCapability {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl TextClassifier for SlowCapability {
    async fn classify(&self, _text: &str, _allowed: &[Category]) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        Ok("traffic".to_string())
    }

    fn name(&self) -> &str {
        "slow"
    }
}

#[async_trait]
impl RiskOracle for SlowCapability {
    async fn assess(&self, _descriptions: &str) -> Result<RiskTier> {
        tokio::time::sleep(self.delay).await;
        Ok(RiskTier::Urgent)
    }

    fn name(&self) -> &str {
        "slow"
    }
}
