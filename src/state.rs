//! Application state: game definitions, checklist store, dashboard source,
//! engagement reporter and partner profiles.
//!
//! Game catalogs start from the built-in seeds; a `[[games]]` entry in the
//! TOML config can retitle a game, change its timer or round count, replace
//! its prompts or disable it. Invalid prompts are skipped at load.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, instrument, warn};

use crate::completion::CompletionStore;
use crate::config::{load_config_from_env, GameCfg, Settings, WorkshopConfig};
use crate::dashboard::{DashboardSource, RemoteDashboard};
use crate::domain::{GameKind, Prompt};
use crate::engagement::EngagementReporter;
use crate::partners::PartnerProfile;
use crate::seeds::seed_catalog;

/// Everything needed to run one mini-game.
#[derive(Clone, Debug)]
pub struct GameDefinition {
    pub kind: GameKind,
    pub title: String,
    /// Countdown per round, if the game is timed.
    pub timer_seconds: Option<u32>,
    /// Prompts per play-through; the whole catalog when `None`.
    pub rounds: Option<usize>,
    pub catalog: Vec<Prompt>,
}

pub struct AppState {
    pub games: BTreeMap<GameKind, Arc<GameDefinition>>,
    pub completions: CompletionStore,
    pub dashboard: DashboardSource,
    pub engagement: EngagementReporter,
    pub partners: Vec<PartnerProfile>,
    pub timer_tick: Duration,
}

impl AppState {
    /// Build state from env: load config, resolve settings, build catalogs.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_config_from_env().unwrap_or_default();
        let settings = Settings::from_env(&cfg);
        Self::build(cfg, settings)
    }

    pub fn build(cfg: WorkshopConfig, settings: Settings) -> Self {
        let games = build_games(&cfg.games);
        for def in games.values() {
            info!(target: "game", kind = ?def.kind, prompts = def.catalog.len(), timer_seconds = ?def.timer_seconds, rounds = ?def.rounds, "Game ready");
        }

        let dashboard = match &settings.dashboard_url {
            Some(url) => DashboardSource::Remote(RemoteDashboard::new(url.clone(), settings.dashboard_api_key.clone())),
            None => DashboardSource::from_records(cfg.dashboard.records),
        };
        info!(target: "dashboard", source = %dashboard.describe(), "Dashboard source selected");

        let engagement = EngagementReporter::new(settings.engagement_endpoint.clone());
        if engagement.is_remote() {
            info!(target: "engagement", "Engagement reporting enabled.");
        } else {
            info!(target: "engagement", "No ENGAGEMENT_ENDPOINT; tab dwell times only go to the log.");
        }

        info!(target: "checklist", dir = %settings.store_dir.display(), "Checklist store");

        Self {
            games,
            completions: CompletionStore::new(settings.store_dir),
            dashboard,
            engagement,
            partners: cfg.partners,
            timer_tick: settings.tick,
        }
    }

    pub fn game(&self, kind: GameKind) -> Option<Arc<GameDefinition>> {
        self.games.get(&kind).cloned()
    }

    pub fn partner(&self, slug: &str) -> Option<&PartnerProfile> {
        self.partners.iter().find(|p| p.slug == slug)
    }
}

fn build_games(overrides: &[GameCfg]) -> BTreeMap<GameKind, Arc<GameDefinition>> {
    let mut games = BTreeMap::new();
    for kind in GameKind::ALL {
        let cfg = overrides.iter().find(|g| g.kind == kind);
        if cfg.and_then(|c| c.enabled) == Some(false) {
            info!(target: "game", ?kind, "Game disabled by config");
            continue;
        }

        let catalog = match cfg {
            Some(c) if !c.prompts.is_empty() => load_catalog(kind, c),
            _ => seed_catalog(kind),
        };
        if catalog.is_empty() {
            error!(target: "game", ?kind, "No valid prompts; game disabled");
            continue;
        }

        let timer_seconds = match cfg.and_then(|c| c.timer_seconds) {
            Some(0) => None,
            Some(n) => Some(n),
            None => kind.default_timer_seconds(),
        };

        let rounds = match cfg.and_then(|c| c.rounds) {
            Some(0) | None => None,
            Some(n) if n > catalog.len() => {
                warn!(target: "game", ?kind, requested = n, available = catalog.len(), "Round count exceeds catalog; playing every prompt");
                None
            }
            Some(n) => Some(n),
        };

        let title = cfg
            .and_then(|c| c.title.clone())
            .unwrap_or_else(|| kind.default_title().to_string());

        games.insert(kind, Arc::new(GameDefinition { kind, title, timer_seconds, rounds, catalog }));
    }
    games
}

fn load_catalog(kind: GameKind, cfg: &GameCfg) -> Vec<Prompt> {
    let prefix = format!("{kind:?}").to_lowercase();
    cfg.prompts
        .iter()
        .cloned()
        .enumerate()
        .filter_map(|(i, pc)| {
            let prompt = match pc.into_prompt(format!("{prefix}-{i}")) {
                Ok(p) => p,
                Err(e) => {
                    error!(target: "game", ?kind, index = i, error = %e, "Skipping catalog prompt");
                    return None;
                }
            };
            match prompt.validate_for(kind) {
                Ok(()) => Some(prompt),
                Err(e) => {
                    error!(target: "game", ?kind, id = %prompt.id, error = %e, "Skipping catalog prompt");
                    None
                }
            }
        })
        .collect()
}
