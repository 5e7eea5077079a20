//! Star clustering of issue reports.
//!
//! Every cluster is seeded by an *anchor*: the first unassigned report in
//! most-recent-first order. A later report joins the cluster when it is
//! within the radius of the anchor (not of any other member) and carries the
//! anchor's category. Membership is therefore not transitive: two members may
//! sit up to twice the radius apart when the anchor lies between them.

use std::cmp::Reverse;

use urbanfix_common::{Category, Issue};

use crate::geo::distance_meters;

/// Default anchor radius for treating two reports as the same problem.
pub const CLUSTER_RADIUS_METERS: f64 = 100.0;

/// A non-empty group of reports, anchor first.
#[derive(Debug, Clone)]
pub struct Cluster<'a> {
    members: Vec<&'a Issue>,
}

impl<'a> Cluster<'a> {
    fn seeded(anchor: &'a Issue) -> Self {
        Self {
            members: vec![anchor],
        }
    }

    /// Build a cluster from already-grouped members, anchor first.
    /// Returns `None` for an empty list.
    pub fn from_members(members: Vec<&'a Issue>) -> Option<Self> {
        if members.is_empty() {
            None
        } else {
            Some(Self { members })
        }
    }

    /// The report whose id, location, image and timestamp stand for the cluster.
    pub fn anchor(&self) -> &'a Issue {
        self.members[0]
    }

    pub fn members(&self) -> &[&'a Issue] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn category(&self) -> Category {
        self.anchor().category
    }
}

/// Stable sort by `created_at`, newest first. Equal timestamps keep input order.
pub fn sort_most_recent_first(issues: &[Issue]) -> Vec<&Issue> {
    let mut ordered: Vec<&Issue> = issues.iter().collect();
    ordered.sort_by_key(|issue| Reverse(issue.created_at));
    ordered
}

/// Partition `issues` (taken in the given order) into anchor clusters.
///
/// Every input report lands in exactly one cluster. Clusters come back in the
/// order their anchors were encountered.
pub fn cluster_issues<'a, I>(issues: I, radius_meters: f64) -> Vec<Cluster<'a>>
where
    I: IntoIterator<Item = &'a Issue>,
{
    let ordered: Vec<&'a Issue> = issues.into_iter().collect();
    let mut assigned = vec![false; ordered.len()];
    let mut clusters = Vec::new();

    for i in 0..ordered.len() {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;
        let anchor = ordered[i];
        let mut cluster = Cluster::seeded(anchor);

        for j in (i + 1)..ordered.len() {
            if assigned[j] {
                continue;
            }
            let candidate = ordered[j];
            if candidate.category == anchor.category
                && distance_meters(&anchor.location, &candidate.location) <= radius_meters
            {
                cluster.members.push(candidate);
                assigned[j] = true;
            }
        }

        clusters.push(cluster);
    }

    clusters
}
