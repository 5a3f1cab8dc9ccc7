//! Domain models: game kinds, localized prompt text, classifications and the
//! prompt record itself.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::normalize_label;

/// Which mini-game a catalog belongs to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
  /// Scenario question on a countdown; the answer is revealed when time runs out.
  TimedQa,
  /// Sort each prompt into a named category.
  Classification,
  /// Rate each prompt on a 1–4 quality scale.
  Leveling,
  /// Rewrite a statement, then compare against a model rewrite.
  Rewrite,
}

impl GameKind {
  pub const ALL: [GameKind; 4] = [
    GameKind::TimedQa,
    GameKind::Classification,
    GameKind::Leveling,
    GameKind::Rewrite,
  ];

  /// Scored games compare the guess against the prompt's classification.
  pub fn is_scored(self) -> bool {
    matches!(self, GameKind::Classification | GameKind::Leveling)
  }

  pub fn default_title(self) -> &'static str {
    match self {
      GameKind::TimedQa => "Quick Think: Classroom Scenarios",
      GameKind::Classification => "Sort It Out: Behavior Functions",
      GameKind::Leveling => "Level Up: Rate the Feedback",
      GameKind::Rewrite => "Say It Better: Positive Phrasing",
    }
  }

  pub fn default_timer_seconds(self) -> Option<u32> {
    match self {
      GameKind::TimedQa => Some(30),
      GameKind::Rewrite => Some(90),
      GameKind::Classification | GameKind::Leveling => None,
    }
  }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
  #[default]
  En,
  Es,
}

/// Display text with an English primary and an optional Spanish variant.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalizedText {
  pub en: String,
  #[serde(default)]
  pub es: Option<String>,
}

impl LocalizedText {
  pub fn new(en: impl Into<String>) -> Self {
    Self { en: en.into(), es: None }
  }

  pub fn with_es(mut self, es: impl Into<String>) -> Self {
    self.es = Some(es.into());
    self
  }

  /// Text for `locale`, falling back to English when no variant exists.
  pub fn get(&self, locale: Locale) -> &str {
    match (locale, &self.es) {
      (Locale::Es, Some(es)) if !es.trim().is_empty() => es,
      _ => &self.en,
    }
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
  #[error("quality level {0} is outside 1..=4")]
  LevelOutOfRange(u8),
  #[error("prompt {0} has no display text")]
  EmptyText(String),
  #[error("prompt {id} needs a {expected} classification for this game")]
  MissingClassification { id: String, expected: &'static str },
  #[error("prompt {0} has an empty category label")]
  EmptyCategory(String),
}

/// A quality level on the 1–4 rubric used by the leveling quiz.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub struct QualityLevel(u8);

impl QualityLevel {
  pub fn get(self) -> u8 {
    self.0
  }
}

impl TryFrom<u8> for QualityLevel {
  type Error = CatalogError;

  fn try_from(v: u8) -> Result<Self, Self::Error> {
    if (1..=4).contains(&v) {
      Ok(Self(v))
    } else {
      Err(CatalogError::LevelOutOfRange(v))
    }
  }
}

impl From<QualityLevel> for u8 {
  fn from(l: QualityLevel) -> u8 {
    l.0
  }
}

/// The correct answer a scored game compares guesses against.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Classification {
  Category(String),
  Level(QualityLevel),
}

impl Classification {
  /// Category guesses compare case- and spacing-insensitively; level guesses
  /// must parse to the same number.
  pub fn matches(&self, guess: &str) -> bool {
    match self {
      Classification::Category(c) => normalize_label(c) == normalize_label(guess),
      Classification::Level(l) => guess.trim().parse::<u8>().is_ok_and(|g| g == l.get()),
    }
  }

  pub fn label(&self) -> String {
    match self {
      Classification::Category(c) => c.clone(),
      Classification::Level(l) => l.get().to_string(),
    }
  }
}

/// One unit of content shown during a round. Never mutated after load.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prompt {
  pub id: String,
  pub text: LocalizedText,
  #[serde(default)]
  pub classification: Option<Classification>,
  #[serde(default)]
  pub rationale: Option<LocalizedText>,
}

impl Prompt {
  /// Check the prompt fits the rules of `kind`.
  pub fn validate_for(&self, kind: GameKind) -> Result<(), CatalogError> {
    if self.text.en.trim().is_empty() {
      return Err(CatalogError::EmptyText(self.id.clone()));
    }
    match (kind, &self.classification) {
      (GameKind::Classification, Some(Classification::Category(c))) if c.trim().is_empty() => {
        Err(CatalogError::EmptyCategory(self.id.clone()))
      }
      (GameKind::Classification, Some(Classification::Category(_))) => Ok(()),
      (GameKind::Classification, _) => Err(CatalogError::MissingClassification {
        id: self.id.clone(),
        expected: "category",
      }),
      (GameKind::Leveling, Some(Classification::Level(_))) => Ok(()),
      (GameKind::Leveling, _) => Err(CatalogError::MissingClassification {
        id: self.id.clone(),
        expected: "level",
      }),
      (GameKind::TimedQa | GameKind::Rewrite, _) => Ok(()),
    }
  }
}
