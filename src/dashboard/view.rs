//! Aggregated dashboard view: filtering, ordering and rollups over the raw
//! partnership data.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::model::{ActionItem, ActionStatus, DashboardData, MetricSnapshot, Organization, StaffStats};
use crate::util::normalize_label;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ViewFilter {
    #[serde(default)]
    pub status: Option<ActionStatus>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ViewFilter {
    fn accepts(&self, item: &ActionItem) -> bool {
        let status_ok = self.status.map_or(true, |s| s == item.status);
        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |c| normalize_label(c) == normalize_label(&item.category));
        status_ok && category_ok
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub completed: usize,
    pub paused: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.completed + self.paused
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct DashboardView {
    pub organization: Organization,
    pub staff_stats: StaffStats,
    /// Filtered items in display order.
    pub action_items: Vec<ActionItem>,
    /// Item ids of the filtered list grouped by category, in display order.
    pub by_category: BTreeMap<String, Vec<String>>,
    /// Counts over all items, ignoring the filter.
    pub counts: StatusCounts,
    pub completion_percent: u8,
    /// Most recent snapshot per metric name, sorted by name.
    pub latest_metrics: Vec<MetricSnapshot>,
}

/// Display order: `sort_order`, then priority (high first), then title.
pub fn sort_items(items: &mut [ActionItem]) {
    items.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then(a.priority.cmp(&b.priority))
            .then_with(|| a.title.cmp(&b.title))
    });
}

pub fn status_counts(items: &[ActionItem]) -> StatusCounts {
    items.iter().fold(StatusCounts::default(), |mut acc, item| {
        match item.status {
            ActionStatus::Pending => acc.pending += 1,
            ActionStatus::Completed => acc.completed += 1,
            ActionStatus::Paused => acc.paused += 1,
        }
        acc
    })
}

pub fn completion_percent(counts: &StatusCounts) -> u8 {
    let total = counts.total();
    if total == 0 {
        return 0;
    }
    ((counts.completed * 100) / total) as u8
}

pub fn latest_metrics(metrics: &[MetricSnapshot]) -> Vec<MetricSnapshot> {
    let mut latest: HashMap<&str, &MetricSnapshot> = HashMap::new();
    for m in metrics {
        latest
            .entry(m.name.as_str())
            .and_modify(|cur| {
                if m.recorded_at > cur.recorded_at {
                    *cur = m;
                }
            })
            .or_insert(m);
    }
    let mut out: Vec<MetricSnapshot> = latest.into_values().cloned().collect();
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

pub fn build_view(data: &DashboardData, filter: &ViewFilter) -> DashboardView {
    let counts = status_counts(&data.action_items);

    let mut items: Vec<ActionItem> = data
        .action_items
        .iter()
        .filter(|i| filter.accepts(i))
        .cloned()
        .collect();
    sort_items(&mut items);

    let mut by_category: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for item in &items {
        by_category
            .entry(item.category.clone())
            .or_default()
            .push(item.id.clone());
    }

    DashboardView {
        organization: data.organization.clone(),
        staff_stats: data.staff_stats.clone(),
        action_items: items,
        by_category,
        counts,
        completion_percent: completion_percent(&counts),
        latest_metrics: latest_metrics(&data.metrics),
    }
}
