//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::dashboard::ActionStatus;
use crate::domain::{GameKind, Locale};
use crate::engine::{RoundPhase, RoundState, Screen};
use crate::state::GameDefinition;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    /// Mount a game on its intro screen.
    StartGame {
        game: GameKind,
    },
    /// Begin or replay the mounted game with a fresh shuffle.
    Start,
    Reveal,
    SubmitGuess {
        value: String,
    },
    Advance,
    /// Leave the game and return home.
    Exit,
    SetLocale {
        locale: Locale,
    },
    PauseTimer,
    ResumeTimer,
    TabSwitch {
        tab: String,
        #[serde(default)]
        page: Option<String>,
    },
    Visibility {
        hidden: bool,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Round(RoundSnapshot),
    TimerTick {
        remaining: u32,
        total: u32,
    },
    TimerDone,
    /// The session left its game.
    Home,
    Error {
        message: String,
    },
}

/// What the client renders for the current round.
#[derive(Debug, Serialize, PartialEq)]
pub struct RoundSnapshot {
    pub game: GameKind,
    pub title: String,
    pub screen: Screen,
    pub phase: Option<RoundPhase>,
    /// Zero-based position in the deck.
    pub round: usize,
    pub total_rounds: usize,
    pub prompt: Option<PromptOut>,
    pub scored: bool,
    pub tally: u32,
    pub best_streak: u32,
    pub correct: u32,
    pub answered: u32,
    pub last_guess: Option<String>,
    pub last_correct: Option<bool>,
    pub timer_seconds: Option<u32>,
}

/// Prompt as shown to players. Answer and rationale stay hidden until reveal.
#[derive(Debug, Serialize, PartialEq)]
pub struct PromptOut {
    pub id: String,
    pub text: String,
    pub answer: Option<String>,
    pub rationale: Option<String>,
}

pub fn to_snapshot(def: &GameDefinition, state: &RoundState, locale: Locale) -> RoundSnapshot {
    let revealed = state.revealed();
    let prompt = match (&state.deck, state.screen) {
        (Some(deck), Screen::Play) => {
            let p = deck.current();
            Some(PromptOut {
                id: p.id.clone(),
                text: p.text.get(locale).to_string(),
                answer: revealed.then(|| p.classification.as_ref().map(|c| c.label())).flatten(),
                rationale: revealed
                    .then(|| p.rationale.as_ref().map(|r| r.get(locale).to_string()))
                    .flatten(),
            })
        }
        _ => None,
    };
    let total_rounds = state
        .deck
        .as_ref()
        .map_or_else(|| def.rounds.unwrap_or(def.catalog.len()), |d| d.len());

    RoundSnapshot {
        game: def.kind,
        title: def.title.clone(),
        screen: state.screen,
        phase: (state.screen == Screen::Play).then_some(state.phase),
        round: state.position(),
        total_rounds,
        prompt,
        scored: state.is_scored(),
        tally: state.tally,
        best_streak: state.best_streak,
        correct: state.correct,
        answered: state.answered,
        last_guess: state.last_guess.as_ref().map(|g| g.value.clone()),
        last_correct: state.last_guess.as_ref().and_then(|g| g.correct),
        timer_seconds: def.timer_seconds,
    }
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct GameOut {
    pub kind: GameKind,
    pub title: String,
    pub prompts: usize,
    pub rounds: usize,
    pub timer_seconds: Option<u32>,
    pub scored: bool,
}

impl From<&GameDefinition> for GameOut {
    fn from(def: &GameDefinition) -> Self {
        Self {
            kind: def.kind,
            title: def.title.clone(),
            prompts: def.catalog.len(),
            rounds: def.rounds.unwrap_or(def.catalog.len()),
            timer_seconds: def.timer_seconds,
            scored: def.kind.is_scored(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChecklistItemIn {
    pub done: bool,
}

#[derive(Debug, Deserialize)]
pub struct ActionStatusIn {
    pub status: ActionStatus,
}

#[derive(Debug, Deserialize)]
pub struct TipQuery {
    #[serde(default)]
    pub index: usize,
}

#[derive(Serialize)]
pub struct TipOut {
    pub index: usize,
    pub tip: String,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Deck;
    use crate::domain::{Classification, LocalizedText, Prompt};
    use crate::engine::{reduce, Action};

    fn def() -> GameDefinition {
        GameDefinition {
            kind: GameKind::Classification,
            title: "Sort It Out".into(),
            timer_seconds: None,
            rounds: None,
            catalog: vec![Prompt {
                id: "p0".into(),
                text: LocalizedText::new("Leaves when work is hard").with_es("Se va cuando el trabajo es difícil"),
                classification: Some(Classification::Category("escape".into())),
                rationale: Some(LocalizedText::new("Avoids the task")),
            }],
        }
    }

    #[test]
    fn client_messages_parse() {
        let m: ClientWsMessage = serde_json::from_str(r#"{"type":"start_game","game":"timed_qa"}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::StartGame { game: GameKind::TimedQa }));
        let m: ClientWsMessage = serde_json::from_str(r#"{"type":"submit_guess","value":"escape"}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::SubmitGuess { .. }));
        let m: ClientWsMessage = serde_json::from_str(r#"{"type":"tab_switch","tab":"metrics"}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::TabSwitch { page: None, .. }));
    }

    #[test]
    fn answer_hidden_until_reveal() {
        let d = def();
        let s = reduce(RoundState::new(true), Action::Start(Deck::new(d.catalog.clone()).unwrap()));
        let snap = to_snapshot(&d, &s, Locale::Es);
        let prompt = snap.prompt.unwrap();
        assert_eq!(prompt.text, "Se va cuando el trabajo es difícil");
        assert_eq!(prompt.answer, None);
        assert_eq!(prompt.rationale, None);

        let s = reduce(s, Action::SubmitGuess("escape".into()));
        let snap = to_snapshot(&d, &s, Locale::En);
        let prompt = snap.prompt.unwrap();
        assert_eq!(prompt.answer.as_deref(), Some("escape"));
        assert_eq!(prompt.rationale.as_deref(), Some("Avoids the task"));
        assert_eq!(snap.last_correct, Some(true));
        assert_eq!(snap.tally, 1);
    }

    #[test]
    fn round_message_is_flat_json() {
        let d = def();
        let s = RoundState::new(true);
        let msg = ServerWsMessage::Round(to_snapshot(&d, &s, Locale::En));
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["type"], "round");
        assert_eq!(v["screen"], "intro");
        assert_eq!(v["total_rounds"], 1);
        assert!(v["prompt"].is_null());
    }
}
