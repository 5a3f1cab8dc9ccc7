//! Loading workshop configuration (game catalogs, dashboards, partners) from
//! TOML plus environment overrides.
//!
//! See `WorkshopConfig` for the expected schema. Every section is optional;
//! an absent file means built-in catalogs and no dashboard records.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use crate::dashboard::DashboardData;
use crate::domain::{CatalogError, Classification, GameKind, LocalizedText, Prompt, QualityLevel};
use crate::partners::PartnerProfile;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct WorkshopConfig {
  #[serde(default)]
  pub storage: StorageCfg,
  #[serde(default)]
  pub engagement: EngagementCfg,
  #[serde(default)]
  pub dashboard: DashboardCfg,
  /// Countdown tick length; 1000 unless overridden (demos run faster).
  #[serde(default)]
  pub tick_millis: Option<u64>,
  #[serde(default)]
  pub games: Vec<GameCfg>,
  #[serde(default)]
  pub partners: Vec<PartnerProfile>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct StorageCfg {
  #[serde(default)]
  pub dir: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct EngagementCfg {
  #[serde(default)]
  pub endpoint: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct DashboardCfg {
  #[serde(default)]
  pub base_url: Option<String>,
  #[serde(default)]
  pub api_key: Option<String>,
  /// Static records served when no `base_url` is set.
  #[serde(default)]
  pub records: Vec<DashboardData>,
}

/// Per-game overrides. A non-empty `prompts` list replaces the built-in catalog.
#[derive(Clone, Debug, Deserialize)]
pub struct GameCfg {
  pub kind: GameKind,
  #[serde(default)]
  pub title: Option<String>,
  /// 0 turns the countdown off.
  #[serde(default)]
  pub timer_seconds: Option<u32>,
  #[serde(default)]
  pub rounds: Option<usize>,
  #[serde(default)]
  pub enabled: Option<bool>,
  #[serde(default)]
  pub prompts: Vec<PromptCfg>,
}

/// Prompt entry accepted in TOML. Fill `category` for classification games
/// and `level` for leveling games.
#[derive(Clone, Debug, Deserialize)]
pub struct PromptCfg {
  #[serde(default)] pub id: Option<String>,
  pub text: String,
  #[serde(default)] pub text_es: Option<String>,
  #[serde(default)] pub category: Option<String>,
  #[serde(default)] pub level: Option<u8>,
  #[serde(default)] pub rationale: Option<String>,
  #[serde(default)] pub rationale_es: Option<String>,
}

impl PromptCfg {
  pub fn into_prompt(self, fallback_id: String) -> Result<Prompt, CatalogError> {
    let classification = match (self.level, self.category) {
      (Some(level), _) => Some(Classification::Level(QualityLevel::try_from(level)?)),
      (None, Some(category)) => Some(Classification::Category(category)),
      (None, None) => None,
    };
    let localized = |en: String, es: Option<String>| LocalizedText { en, es };
    Ok(Prompt {
      id: self.id.unwrap_or(fallback_id),
      text: localized(self.text, self.text_es),
      classification,
      rationale: self.rationale.map(|r| localized(r, self.rationale_es)),
    })
  }
}

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Read { path: String, source: std::io::Error },
  #[error("failed to parse config {path}: {source}")]
  Parse { path: String, source: toml::de::Error },
}

pub fn load_config(path: &Path) -> Result<WorkshopConfig, ConfigError> {
  let shown = path.display().to_string();
  let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: shown.clone(), source })?;
  toml::from_str::<WorkshopConfig>(&raw).map_err(|source| ConfigError::Parse { path: shown, source })
}

/// Attempt to load `WorkshopConfig` from WORKSHOP_CONFIG_PATH. On any
/// parsing/IO error, logs and returns None.
pub fn load_config_from_env() -> Option<WorkshopConfig> {
  let path = std::env::var("WORKSHOP_CONFIG_PATH").ok()?;
  match load_config(Path::new(&path)) {
    Ok(cfg) => {
      info!(target: "workshop", %path, games = cfg.games.len(), partners = cfg.partners.len(), "Loaded workshop config (TOML)");
      Some(cfg)
    }
    Err(e) => {
      error!(target: "workshop", %path, error = %e, "Ignoring workshop config");
      None
    }
  }
}

/// Runtime settings after applying environment overrides to the file config.
#[derive(Clone, Debug)]
pub struct Settings {
  pub store_dir: PathBuf,
  pub engagement_endpoint: Option<String>,
  pub dashboard_url: Option<String>,
  pub dashboard_api_key: Option<String>,
  pub tick: Duration,
}

impl Settings {
  pub fn from_env(cfg: &WorkshopConfig) -> Self {
    Self::resolve(cfg, |k| std::env::var(k).ok())
  }

  /// Environment wins over the file; empty values count as unset.
  pub fn resolve(cfg: &WorkshopConfig, env: impl Fn(&str) -> Option<String>) -> Self {
    let set = |v: &String| !v.trim().is_empty();
    let pick = |key: &str, file: &Option<String>| env(key).filter(set).or_else(|| file.clone().filter(set));
    Self {
      store_dir: pick("COMPLETION_STORE_DIR", &cfg.storage.dir)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./data/checklists")),
      engagement_endpoint: pick("ENGAGEMENT_ENDPOINT", &cfg.engagement.endpoint),
      dashboard_url: pick("DASHBOARD_API_URL", &cfg.dashboard.base_url),
      dashboard_api_key: pick("DASHBOARD_API_KEY", &cfg.dashboard.api_key),
      tick: Duration::from_millis(cfg.tick_millis.filter(|ms| *ms > 0).unwrap_or(1000)),
    }
  }
}
