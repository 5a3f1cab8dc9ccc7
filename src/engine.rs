//! Round engine: the intro → play → done state machine shared by every
//! mini-game, expressed as a pure reducer over [`RoundState`].
//!
//! Within `play` each round moves awaiting-input → revealed → (advance).
//! Actions that do not apply to the current state are ignored, so a stray
//! double-click can never skip a reveal or run past the end of the deck.

use serde::Serialize;
use tracing::debug;

use crate::deck::Deck;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
  Intro,
  Play,
  Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
  AwaitingInput,
  Revealed,
}

#[derive(Debug)]
pub enum Action {
  /// Begin (or replay) with a freshly shuffled deck.
  Start(Deck),
  Reveal,
  SubmitGuess(String),
  /// The round's countdown ran out.
  TimeUp,
  Advance,
}

/// The guess made in the current round, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LastGuess {
  pub value: String,
  /// `None` for unscored games.
  pub correct: Option<bool>,
}

#[derive(Clone, Debug)]
pub struct RoundState {
  pub screen: Screen,
  pub phase: RoundPhase,
  pub deck: Option<Deck>,
  /// Consecutive correct guesses.
  pub tally: u32,
  pub best_streak: u32,
  pub correct: u32,
  pub answered: u32,
  pub last_guess: Option<LastGuess>,
  /// Number of play-throughs started.
  pub plays: u32,
  scored: bool,
}

impl RoundState {
  pub fn new(scored: bool) -> Self {
    Self {
      screen: Screen::Intro,
      phase: RoundPhase::AwaitingInput,
      deck: None,
      tally: 0,
      best_streak: 0,
      correct: 0,
      answered: 0,
      last_guess: None,
      plays: 0,
      scored,
    }
  }

  pub fn is_scored(&self) -> bool {
    self.scored
  }

  pub fn revealed(&self) -> bool {
    self.screen == Screen::Play && self.phase == RoundPhase::Revealed
  }

  pub fn position(&self) -> usize {
    self.deck.as_ref().map_or(0, Deck::position)
  }

  /// Identifies the round currently waiting for input, if any. Changes every
  /// time a new round opens, including replays of the same position.
  pub fn open_round(&self) -> Option<(u32, usize)> {
    (self.screen == Screen::Play && self.phase == RoundPhase::AwaitingInput)
      .then(|| (self.plays, self.position()))
  }

  fn awaiting_input(&self) -> bool {
    self.screen == Screen::Play && self.phase == RoundPhase::AwaitingInput
  }
}

/// Apply `action` to `state`, returning the next state.
pub fn reduce(mut state: RoundState, action: Action) -> RoundState {
  match action {
    Action::Start(deck) => {
      state.screen = Screen::Play;
      state.phase = RoundPhase::AwaitingInput;
      state.deck = Some(deck);
      state.tally = 0;
      state.best_streak = 0;
      state.correct = 0;
      state.answered = 0;
      state.last_guess = None;
      state.plays += 1;
    }

    Action::Reveal | Action::TimeUp if state.awaiting_input() => {
      state.phase = RoundPhase::Revealed;
    }

    Action::SubmitGuess(value) if state.awaiting_input() => {
      let correct = if state.scored {
        let matched = state
          .deck
          .as_ref()
          .and_then(|d| d.current().classification.as_ref())
          .is_some_and(|c| c.matches(&value));
        if matched {
          state.tally += 1;
          state.correct += 1;
          state.best_streak = state.best_streak.max(state.tally);
        } else {
          state.tally = 0;
        }
        Some(matched)
      } else {
        None
      };
      state.answered += 1;
      state.last_guess = Some(LastGuess { value, correct });
      state.phase = RoundPhase::Revealed;
    }

    Action::Advance if state.revealed() => {
      let moved = state.deck.as_mut().is_some_and(Deck::advance);
      if moved {
        state.phase = RoundPhase::AwaitingInput;
        state.last_guess = None;
      } else {
        state.screen = Screen::Done;
      }
    }

    ignored => {
      debug!(target: "game", action = ?ignored, screen = ?state.screen, phase = ?state.phase, "Ignoring action in current state");
    }
  }
  state
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Classification, LocalizedText, Prompt};
  use proptest::prelude::*;

  fn labelled(labels: &[&str]) -> Deck {
    let prompts = labels
      .iter()
      .enumerate()
      .map(|(i, l)| Prompt {
        id: format!("p{i}"),
        text: LocalizedText::new(format!("prompt {i}")),
        classification: Some(Classification::Category((*l).to_string())),
        rationale: None,
      })
      .collect();
    Deck::new(prompts).unwrap()
  }

  fn started(labels: &[&str]) -> RoundState {
    reduce(RoundState::new(true), Action::Start(labelled(labels)))
  }

  #[test]
  fn starts_on_intro() {
    let s = RoundState::new(true);
    assert_eq!(s.screen, Screen::Intro);
    assert!(s.open_round().is_none());
  }

  #[test]
  fn play_actions_are_ignored_on_intro() {
    let s = RoundState::new(true);
    let s = reduce(s, Action::Reveal);
    let s = reduce(s, Action::Advance);
    let s = reduce(s, Action::SubmitGuess("a".into()));
    assert_eq!(s.screen, Screen::Intro);
    assert_eq!(s.answered, 0);
  }

  #[test]
  fn advance_before_reveal_is_a_no_op() {
    let s = started(&["a", "b"]);
    let s = reduce(s, Action::Advance);
    assert_eq!(s.position(), 0);
    assert_eq!(s.phase, RoundPhase::AwaitingInput);
  }

  #[test]
  fn double_advance_moves_only_once() {
    let s = started(&["a", "b", "c"]);
    let s = reduce(s, Action::Reveal);
    let s = reduce(s, Action::Advance);
    let s = reduce(s, Action::Advance);
    assert_eq!(s.position(), 1);
    assert!(!s.revealed());
  }

  #[test]
  fn second_guess_after_reveal_is_ignored() {
    let s = started(&["a", "b"]);
    let s = reduce(s, Action::SubmitGuess("a".into()));
    let s = reduce(s, Action::SubmitGuess("a".into()));
    assert_eq!(s.tally, 1);
    assert_eq!(s.answered, 1);
  }

  #[test]
  fn time_up_reveals_without_scoring() {
    let s = started(&["a"]);
    let s = reduce(s, Action::TimeUp);
    assert!(s.revealed());
    assert_eq!(s.answered, 0);
    assert!(s.last_guess.is_none());
  }

  #[test]
  fn unscored_games_reveal_on_guess() {
    let s = reduce(RoundState::new(false), Action::Start(labelled(&["a"])));
    let s = reduce(s, Action::SubmitGuess("My rewrite".into()));
    assert!(s.revealed());
    assert_eq!(s.tally, 0);
    assert_eq!(s.last_guess.as_ref().and_then(|g| g.correct), None);
  }

  #[test]
  fn concrete_scenario_tallies_and_finishes() {
    let mut s = started(&["A", "B", "A"]);
    let mut tallies = vec![];
    for guess in ["A", "A", "B"] {
      s = reduce(s, Action::SubmitGuess(guess.into()));
      tallies.push(s.tally);
      s = reduce(s, Action::Advance);
    }
    assert_eq!(tallies, vec![1, 0, 0]);
    assert_eq!(s.screen, Screen::Done);
    assert_eq!(s.correct, 1);
    assert_eq!(s.best_streak, 1);
  }

  #[test]
  fn done_is_terminal_until_restart() {
    let mut s = started(&["a"]);
    s = reduce(s, Action::SubmitGuess("a".into()));
    s = reduce(s, Action::Advance);
    assert_eq!(s.screen, Screen::Done);

    s = reduce(s, Action::Reveal);
    s = reduce(s, Action::Advance);
    assert_eq!(s.screen, Screen::Done);

    s = reduce(s, Action::Start(labelled(&["x", "y"])));
    assert_eq!(s.screen, Screen::Play);
    assert_eq!(s.position(), 0);
    assert!(!s.revealed());
    assert_eq!(s.tally, 0);
    assert_eq!(s.plays, 2);
  }

  #[test]
  fn open_round_changes_on_replay_of_same_position() {
    let s = started(&["a"]);
    let first = s.open_round();
    let s = reduce(s, Action::Start(labelled(&["a"])));
    assert_ne!(first, s.open_round());
  }

  proptest! {
    #[test]
    fn deck_exhaustion_takes_exactly_n_advances(n in 1usize..30) {
      let labels: Vec<String> = (0..n).map(|i| format!("l{i}")).collect();
      let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
      let mut s = started(&refs);
      for step in 0..n {
        prop_assert_eq!(s.screen, Screen::Play, "finished early at step {}", step);
        s = reduce(s, Action::Reveal);
        s = reduce(s, Action::Advance);
      }
      prop_assert_eq!(s.screen, Screen::Done);
    }

    #[test]
    fn tally_increments_on_match_and_resets_on_miss(hits in proptest::collection::vec(any::<bool>(), 1..40)) {
      let labels: Vec<&str> = hits.iter().map(|_| "yes").collect();
      let mut s = started(&labels);
      let mut expected = 0u32;
      for hit in hits {
        let guess = if hit { "yes" } else { "no" };
        s = reduce(s, Action::SubmitGuess(guess.into()));
        expected = if hit { expected + 1 } else { 0 };
        prop_assert_eq!(s.tally, expected);
        s = reduce(s, Action::Advance);
      }
    }

    #[test]
    fn restart_from_done_resets_everything(n in 1usize..10) {
      let labels: Vec<&str> = (0..n).map(|_| "a").collect();
      let mut s = started(&labels);
      while s.screen != Screen::Done {
        s = reduce(s, Action::SubmitGuess("a".into()));
        s = reduce(s, Action::Advance);
      }
      s = reduce(s, Action::Start(labelled(&labels)));
      prop_assert_eq!(s.screen, Screen::Play);
      prop_assert_eq!(s.position(), 0);
      prop_assert!(!s.revealed());
      prop_assert_eq!(s.tally, 0);
      prop_assert_eq!(s.correct, 0);
    }
  }
}
