//! Dashboard records as returned by the partnership data API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub partnership_type: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    Completed,
    Paused,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    pub status: ActionStatus,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub evidence_path: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct StaffStats {
    #[serde(default)]
    pub total_staff: u32,
    #[serde(default)]
    pub active_staff: u32,
    #[serde(default)]
    pub sessions_completed: u32,
    #[serde(default)]
    pub hours_logged: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MetricSnapshot {
    pub name: String,
    pub value: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Everything one partnership dashboard renders.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DashboardData {
    pub organization: Organization,
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
    #[serde(default)]
    pub staff_stats: StaffStats,
    #[serde(default)]
    pub metrics: Vec<MetricSnapshot>,
}
