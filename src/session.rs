//! One WebSocket client's game session: the mounted game, its round state,
//! the countdown bound to the open round, and the tab tracker.
//!
//! The session is owned by the socket task, so the reducer runs without
//! locks. Timer events arrive through a channel and are matched against the
//! timer's current epoch before they touch the round state.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::deck::Deck;
use crate::domain::Locale;
#[cfg(test)]
use crate::domain::GameKind;
use crate::engagement::{EngagementRecord, TabDwell, TabTracker};
use crate::engine::{reduce, Action, RoundState};
use crate::protocol::{to_snapshot, ClientWsMessage, ServerWsMessage};
use crate::state::{AppState, GameDefinition};
use crate::timer::{CountdownTimer, EpochSource, TimerEvent, TimerEventKind};
use crate::util::trunc_for_log;

struct ActiveGame {
  def: Arc<GameDefinition>,
  state: RoundState,
  timer: Option<CountdownTimer>,
}

pub struct GameSession {
  pub id: String,
  locale: Locale,
  active: Option<ActiveGame>,
  tracker: TabTracker,
  page: Option<String>,
  timer_events: mpsc::UnboundedSender<TimerEvent>,
  timer_epochs: EpochSource,
}

impl GameSession {
  pub fn new(timer_events: mpsc::UnboundedSender<TimerEvent>) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      locale: Locale::default(),
      active: None,
      tracker: TabTracker::new(Instant::now()),
      page: None,
      timer_events,
      timer_epochs: EpochSource::default(),
    }
  }

  #[cfg(test)]
  pub fn current_game(&self) -> Option<GameKind> {
    self.active.as_ref().map(|a| a.def.kind)
  }

  #[instrument(level = "debug", skip(self, app), fields(session = %self.id))]
  pub fn handle(&mut self, msg: ClientWsMessage, app: &AppState) -> Vec<ServerWsMessage> {
    match msg {
      ClientWsMessage::Ping => vec![ServerWsMessage::Pong],

      ClientWsMessage::StartGame { game } => match app.game(game) {
        Some(def) => {
          let timer = def
            .timer_seconds
            .map(|secs| {
              CountdownTimer::new(secs, app.timer_tick, self.timer_events.clone(), self.timer_epochs.clone())
            });
          let state = RoundState::new(def.kind.is_scored());
          info!(target: "game", session = %self.id, kind = ?game, "Game mounted");
          self.active = Some(ActiveGame { def, state, timer });
          self.snapshot()
        }
        None => error_msg(format!("Game {game:?} is not available.")),
      },

      ClientWsMessage::Start => {
        let Some(active) = &self.active else { return no_game() };
        let deck = match Deck::deal(&active.def.catalog, active.def.rounds) {
          Ok(deck) => deck,
          Err(e) => return error_msg(e.to_string()),
        };
        info!(target: "game", session = %self.id, kind = ?active.def.kind, prompts = deck.len(), order = ?deck.prompt_ids().collect::<Vec<_>>(), "Play-through started");
        self.apply(Action::Start(deck))
      }

      ClientWsMessage::Reveal => self.apply(Action::Reveal),

      ClientWsMessage::SubmitGuess { value } => {
        debug!(target: "game", session = %self.id, guess = %trunc_for_log(&value, 80), "Guess submitted");
        self.apply(Action::SubmitGuess(value))
      }

      ClientWsMessage::Advance => self.apply(Action::Advance),

      ClientWsMessage::Exit => {
        if let Some(active) = self.active.take() {
          info!(target: "game", session = %self.id, kind = ?active.def.kind, "Game exited");
        }
        vec![ServerWsMessage::Home]
      }

      ClientWsMessage::SetLocale { locale } => {
        self.locale = locale;
        if self.active.is_some() { self.snapshot() } else { vec![] }
      }

      ClientWsMessage::PauseTimer => match self.active.as_mut().and_then(|a| a.timer.as_mut()) {
        Some(timer) => {
          timer.pause();
          vec![ServerWsMessage::TimerTick { remaining: timer.remaining(), total: timer.total() }]
        }
        None => error_msg("No timer to pause.".into()),
      },

      ClientWsMessage::ResumeTimer => {
        let Some(active) = self.active.as_mut() else { return no_game() };
        let open = active.state.open_round().is_some();
        match active.timer.as_mut() {
          Some(timer) if open => {
            timer.start();
            vec![]
          }
          Some(_) => error_msg("The round is not waiting for input.".into()),
          None => error_msg("No timer to resume.".into()),
        }
      }

      ClientWsMessage::TabSwitch { tab, page } => {
        if page.is_some() {
          self.page = page;
        }
        let dwell = self.tracker.switch_to(&tab, Instant::now());
        self.report(dwell, app);
        vec![]
      }

      ClientWsMessage::Visibility { hidden } => {
        if hidden {
          let dwell = self.tracker.hide(Instant::now());
          self.report(dwell, app);
        } else {
          self.tracker.show(Instant::now());
        }
        vec![]
      }
    }
  }

  /// React to a countdown event. Events from a superseded countdown are dropped.
  pub fn on_timer(&mut self, ev: TimerEvent) -> Vec<ServerWsMessage> {
    let current = self
      .active
      .as_ref()
      .and_then(|a| a.timer.as_ref())
      .map(CountdownTimer::epoch);
    if current != Some(ev.epoch) {
      debug!(target: "game", session = %self.id, epoch = ev.epoch, ?current, "Discarding stale timer event");
      return vec![];
    }
    match ev.kind {
      TimerEventKind::Tick { remaining, total } => vec![ServerWsMessage::TimerTick { remaining, total }],
      TimerEventKind::Done => {
        let mut out = vec![ServerWsMessage::TimerDone];
        out.extend(self.apply(Action::TimeUp));
        out
      }
    }
  }

  /// Flush engagement for the last tab; called when the socket closes.
  pub fn close(&mut self, app: &AppState) {
    let dwell = self.tracker.flush(Instant::now());
    self.report(dwell, app);
    self.active = None;
  }

  fn report(&self, dwell: Option<TabDwell>, app: &AppState) {
    if let Some(dwell) = dwell {
      app.engagement.dispatch(EngagementRecord::from_dwell(dwell, self.page.clone(), Some(self.id.clone())));
    }
  }

  fn apply(&mut self, action: Action) -> Vec<ServerWsMessage> {
    let Some(active) = self.active.as_mut() else { return no_game() };
    let before = active.state.open_round();
    let fresh = RoundState::new(active.state.is_scored());
    let state = std::mem::replace(&mut active.state, fresh);
    active.state = reduce(state, action);
    let after = active.state.open_round();

    // Each newly opened round gets a full countdown; leaving the open round
    // (reveal, time up, done) cancels it.
    if let Some(timer) = active.timer.as_mut() {
      if after != before {
        match after {
          Some(_) => {
            timer.reset(active.def.timer_seconds.unwrap_or(0));
            timer.start();
          }
          None => timer.reset(active.def.timer_seconds.unwrap_or(0)),
        }
      }
    }
    self.snapshot()
  }

  fn snapshot(&self) -> Vec<ServerWsMessage> {
    match &self.active {
      Some(active) => vec![ServerWsMessage::Round(to_snapshot(&active.def, &active.state, self.locale))],
      None => vec![],
    }
  }
}

fn no_game() -> Vec<ServerWsMessage> {
  error_msg("No game selected; send start_game first.".into())
}

fn error_msg(message: String) -> Vec<ServerWsMessage> {
  vec![ServerWsMessage::Error { message }]
}
