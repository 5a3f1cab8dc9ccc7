//! Where dashboard data comes from: the partnership data API over HTTP, or
//! records configured in TOML for demos and offline workshops.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::{StatusCode, Url};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, instrument};

use super::model::{ActionItem, ActionStatus, DashboardData};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("access denied")]
    Unauthorized,
    #[error("unknown partnership '{0}'")]
    UnknownPartnership(String),
    #[error("unknown action item '{0}'")]
    UnknownActionItem(String),
    #[error("dashboard service answered {0}")]
    Upstream(u16),
    #[error("dashboard service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid dashboard base url '{0}'")]
    BadBaseUrl(String),
}

#[derive(Clone)]
pub struct RemoteDashboard {
    pub client: reqwest::Client,
    pub base_url: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct StatusPatch {
    status: ActionStatus,
}

impl RemoteDashboard {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, base_url, api_key }
    }

    /// `{base_url}/seg/seg/...` with each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, DashboardError> {
        let mut url = Url::parse(&self.base_url).map_err(|_| DashboardError::BadBaseUrl(self.base_url.clone()))?;
        url.path_segments_mut()
            .map_err(|_| DashboardError::BadBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let req = req.header(USER_AGENT, "workshop-backend/0.1");
        match &self.api_key {
            Some(key) => req.header(AUTHORIZATION, format!("Bearer {key}")),
            None => req,
        }
    }

    fn check(status: StatusCode, partnership_id: &str, item_id: Option<&str>) -> Result<(), DashboardError> {
        if status.is_success() {
            Ok(())
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(DashboardError::Unauthorized)
        } else if status == StatusCode::NOT_FOUND {
            Err(match item_id {
                Some(item) => DashboardError::UnknownActionItem(item.to_string()),
                None => DashboardError::UnknownPartnership(partnership_id.to_string()),
            })
        } else {
            Err(DashboardError::Upstream(status.as_u16()))
        }
    }

    #[instrument(level = "info", skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch(&self, partnership_id: &str) -> Result<DashboardData, DashboardError> {
        let url = self.url(&["partnerships", partnership_id, "dashboard"])?;
        let t0 = std::time::Instant::now();
        let resp = self.authorize(self.client.get(url)).send().await?;
        Self::check(resp.status(), partnership_id, None)?;
        let data = resp.json::<DashboardData>().await?;
        info!(target: "dashboard", %partnership_id, items = data.action_items.len(), elapsed_ms = t0.elapsed().as_millis() as u64, "Dashboard fetched");
        Ok(data)
    }

    #[instrument(level = "info", skip(self), fields(base_url = %self.base_url))]
    pub async fn update_status(
        &self,
        partnership_id: &str,
        item_id: &str,
        status: ActionStatus,
    ) -> Result<ActionItem, DashboardError> {
        let url = self.url(&["partnerships", partnership_id, "action-items", item_id])?;
        let resp = self
            .authorize(self.client.patch(url))
            .json(&StatusPatch { status })
            .send()
            .await?;
        Self::check(resp.status(), partnership_id, Some(item_id))?;
        Ok(resp.json::<ActionItem>().await?)
    }
}

/// Source of dashboard data, chosen once at startup.
#[derive(Clone)]
pub enum DashboardSource {
    Remote(RemoteDashboard),
    /// In-memory records keyed by partnership id; status updates mutate them.
    Static(Arc<RwLock<HashMap<String, DashboardData>>>),
}

impl DashboardSource {
    pub fn from_records(records: Vec<DashboardData>) -> Self {
        let map = records
            .into_iter()
            .map(|d| (d.organization.id.clone(), d))
            .collect();
        DashboardSource::Static(Arc::new(RwLock::new(map)))
    }

    pub fn describe(&self) -> String {
        match self {
            DashboardSource::Remote(r) => format!("remote({})", r.base_url),
            DashboardSource::Static(_) => "static".into(),
        }
    }

    pub async fn fetch(&self, partnership_id: &str) -> Result<DashboardData, DashboardError> {
        match self {
            DashboardSource::Remote(r) => r.fetch(partnership_id).await.inspect_err(|e| {
                error!(target: "dashboard", %partnership_id, error = %e, "Dashboard fetch failed");
            }),
            DashboardSource::Static(map) => map
                .read()
                .await
                .get(partnership_id)
                .cloned()
                .ok_or_else(|| DashboardError::UnknownPartnership(partnership_id.to_string())),
        }
    }

    pub async fn update_action_status(
        &self,
        partnership_id: &str,
        item_id: &str,
        status: ActionStatus,
    ) -> Result<ActionItem, DashboardError> {
        match self {
            DashboardSource::Remote(r) => r.update_status(partnership_id, item_id, status).await,
            DashboardSource::Static(map) => {
                let mut map = map.write().await;
                let data = map
                    .get_mut(partnership_id)
                    .ok_or_else(|| DashboardError::UnknownPartnership(partnership_id.to_string()))?;
                let item = data
                    .action_items
                    .iter_mut()
                    .find(|i| i.id == item_id)
                    .ok_or_else(|| DashboardError::UnknownActionItem(item_id.to_string()))?;
                item.status = status;
                info!(target: "dashboard", %partnership_id, %item_id, ?status, "Action item status updated");
                Ok(item.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::model::{Organization, Priority, StaffStats};

    fn record() -> DashboardData {
        DashboardData {
            organization: Organization {
                id: "lincoln-usd".into(),
                name: "Lincoln Unified".into(),
                district: None,
                partnership_type: None,
            },
            action_items: vec![ActionItem {
                id: "kickoff".into(),
                title: "Kickoff meeting".into(),
                description: String::new(),
                category: "Onboarding".into(),
                priority: Priority::High,
                status: ActionStatus::Pending,
                sort_order: 0,
                evidence_path: None,
            }],
            staff_stats: StaffStats::default(),
            metrics: vec![],
        }
    }

    #[tokio::test]
    async fn static_source_fetch_and_update() {
        let src = DashboardSource::from_records(vec![record()]);
        let data = src.fetch("lincoln-usd").await.unwrap();
        assert_eq!(data.action_items[0].status, ActionStatus::Pending);

        let item = src
            .update_action_status("lincoln-usd", "kickoff", ActionStatus::Completed)
            .await
            .unwrap();
        assert_eq!(item.status, ActionStatus::Completed);
        let data = src.fetch("lincoln-usd").await.unwrap();
        assert_eq!(data.action_items[0].status, ActionStatus::Completed);
    }

    #[tokio::test]
    async fn static_source_unknown_ids() {
        let src = DashboardSource::from_records(vec![record()]);
        assert!(matches!(src.fetch("nope").await, Err(DashboardError::UnknownPartnership(_))));
        assert!(matches!(
            src.update_action_status("lincoln-usd", "nope", ActionStatus::Paused).await,
            Err(DashboardError::UnknownActionItem(_))
        ));
    }

    #[test]
    fn remote_urls_encode_segments() {
        let r = RemoteDashboard::new("https://data.example.org/api/".into(), None);
        let url = r.url(&["partnerships", "a b/c", "dashboard"]).unwrap();
        assert_eq!(url.as_str(), "https://data.example.org/api/partnerships/a%20b%2Fc/dashboard");
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(RemoteDashboard::check(StatusCode::FORBIDDEN, "p", None), Err(DashboardError::Unauthorized)));
        assert!(matches!(RemoteDashboard::check(StatusCode::UNAUTHORIZED, "p", None), Err(DashboardError::Unauthorized)));
        assert!(matches!(
            RemoteDashboard::check(StatusCode::NOT_FOUND, "p", Some("i")),
            Err(DashboardError::UnknownActionItem(_))
        ));
        assert!(matches!(RemoteDashboard::check(StatusCode::BAD_GATEWAY, "p", None), Err(DashboardError::Upstream(502))));
        assert!(RemoteDashboard::check(StatusCode::OK, "p", None).is_ok());
    }

    #[test]
    fn bad_base_url_is_reported() {
        let r = RemoteDashboard::new("not a url".into(), None);
        assert!(matches!(r.url(&["x"]), Err(DashboardError::BadBaseUrl(_))));
    }
}
