//! Tab-engagement tracking: how long a viewer dwells on each dashboard tab.
//!
//! [`TabTracker`] measures dwell time; [`EngagementReporter`] ships the
//! resulting records to the logging endpoint. Delivery is fire-and-forget:
//! failures are logged and dropped, never retried or queued.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Time spent on one tab before the viewer left it or hid the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabDwell {
  pub tab: String,
  pub elapsed: Duration,
}

#[derive(Debug)]
pub struct TabTracker {
  current: Option<String>,
  started_at: Instant,
  hidden: bool,
}

impl TabTracker {
  pub fn new(now: Instant) -> Self {
    Self { current: None, started_at: now, hidden: false }
  }

  #[cfg(test)]
  pub fn current(&self) -> Option<&str> {
    self.current.as_deref()
  }

  /// Switch to `tab`, closing the interval of the previous tab.
  /// Switching to the tab already shown does nothing.
  pub fn switch_to(&mut self, tab: &str, now: Instant) -> Option<TabDwell> {
    if self.current.as_deref() == Some(tab) {
      return None;
    }
    let dwell = if self.hidden { None } else { self.take_interval(now) };
    self.current = Some(tab.to_string());
    self.started_at = now;
    dwell
  }

  /// Page became hidden: flush the running interval and stop timing.
  pub fn hide(&mut self, now: Instant) -> Option<TabDwell> {
    if self.hidden {
      return None;
    }
    self.hidden = true;
    self.take_interval(now)
  }

  /// Page became visible again: resume timing from `now`.
  pub fn show(&mut self, now: Instant) {
    if self.hidden {
      self.hidden = false;
      self.started_at = now;
    }
  }

  /// Flush without changing tab or visibility (e.g. the socket is closing).
  pub fn flush(&mut self, now: Instant) -> Option<TabDwell> {
    if self.hidden {
      return None;
    }
    self.take_interval(now)
  }

  fn take_interval(&mut self, now: Instant) -> Option<TabDwell> {
    let tab = self.current.clone()?;
    let elapsed = now.saturating_duration_since(self.started_at);
    self.started_at = now;
    Some(TabDwell { tab, elapsed })
  }
}

/// Payload sent to the engagement logging endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngagementRecord {
  pub tab: String,
  pub elapsed_ms: u64,
  #[serde(default)]
  pub page: Option<String>,
  #[serde(default)]
  pub session_id: Option<String>,
}

impl EngagementRecord {
  pub fn from_dwell(dwell: TabDwell, page: Option<String>, session_id: Option<String>) -> Self {
    Self {
      tab: dwell.tab,
      elapsed_ms: u64::try_from(dwell.elapsed.as_millis()).unwrap_or(u64::MAX),
      page,
      session_id,
    }
  }
}

#[derive(Debug, Error)]
pub enum ReportError {
  #[error("engagement endpoint request failed: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("engagement endpoint answered {0}")]
  Status(u16),
}

#[derive(Clone)]
pub enum EngagementReporter {
  /// POST each record as JSON to the configured endpoint.
  Http { client: reqwest::Client, endpoint: String },
  /// No endpoint configured; records only reach the log.
  Log,
}

impl EngagementReporter {
  pub fn new(endpoint: Option<String>) -> Self {
    match endpoint {
      Some(endpoint) if !endpoint.trim().is_empty() => {
        let client = reqwest::Client::builder()
          .timeout(Duration::from_secs(5))
          .build()
          .unwrap_or_else(|_| reqwest::Client::new());
        EngagementReporter::Http { client, endpoint }
      }
      _ => EngagementReporter::Log,
    }
  }

  pub fn is_remote(&self) -> bool {
    matches!(self, EngagementReporter::Http { .. })
  }

  #[instrument(level = "debug", skip(self, record), fields(tab = %record.tab, elapsed_ms = record.elapsed_ms))]
  pub async fn send(&self, record: &EngagementRecord) -> Result<(), ReportError> {
    match self {
      EngagementReporter::Http { client, endpoint } => {
        let resp = client.post(endpoint).json(record).send().await?;
        if !resp.status().is_success() {
          return Err(ReportError::Status(resp.status().as_u16()));
        }
        Ok(())
      }
      EngagementReporter::Log => {
        debug!(target: "engagement", tab = %record.tab, elapsed_ms = record.elapsed_ms, page = ?record.page, "Tab dwell recorded");
        Ok(())
      }
    }
  }

  /// Send in the background; the caller never waits or learns the outcome.
  pub fn dispatch(&self, record: EngagementRecord) {
    let reporter = self.clone();
    tokio::spawn(async move {
      if let Err(e) = reporter.send(&record).await {
        warn!(target: "engagement", tab = %record.tab, error = %e, "Dropping engagement record");
      }
    });
  }
}
