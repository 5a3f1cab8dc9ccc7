//! Content deck: a shuffled, session-scoped sequence of prompts.
//!
//! Shuffling is not cryptographic; it only needs to vary play-throughs.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::domain::Prompt;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeckError {
  #[error("cannot build a deck from an empty catalog")]
  Empty,
  #[error("requested {requested} prompts but the catalog only has {available}")]
  NotEnough { requested: usize, available: usize },
}

/// Returns a shuffled copy of `catalog`; the input is left untouched.
pub fn shuffle<T: Clone>(catalog: &[T]) -> Vec<T> {
  shuffle_with(catalog, &mut rand::thread_rng())
}

pub fn shuffle_with<T: Clone, R: Rng + ?Sized>(catalog: &[T], rng: &mut R) -> Vec<T> {
  let mut out = catalog.to_vec();
  out.shuffle(rng);
  out
}

/// Returns `n` distinct elements of `catalog` in random order.
/// Rejects `n` larger than the catalog instead of clamping.
pub fn shuffle_and_pick<T: Clone>(catalog: &[T], n: usize) -> Result<Vec<T>, DeckError> {
  shuffle_and_pick_with(catalog, n, &mut rand::thread_rng())
}

pub fn shuffle_and_pick_with<T: Clone, R: Rng + ?Sized>(
  catalog: &[T],
  n: usize,
  rng: &mut R,
) -> Result<Vec<T>, DeckError> {
  if n > catalog.len() {
    return Err(DeckError::NotEnough { requested: n, available: catalog.len() });
  }
  let mut out = shuffle_with(catalog, rng);
  out.truncate(n);
  Ok(out)
}

/// Ordered prompts for one play-through plus the current position.
///
/// The position always stays inside `[0, len)`; the deck is never empty.
#[derive(Clone, Debug)]
pub struct Deck {
  prompts: Vec<Prompt>,
  index: usize,
}

impl Deck {
  pub fn new(prompts: Vec<Prompt>) -> Result<Self, DeckError> {
    if prompts.is_empty() {
      return Err(DeckError::Empty);
    }
    Ok(Self { prompts, index: 0 })
  }

  /// Fresh shuffle of `catalog`, optionally cut down to `rounds` prompts.
  pub fn deal(catalog: &[Prompt], rounds: Option<usize>) -> Result<Self, DeckError> {
    let prompts = match rounds {
      Some(n) => shuffle_and_pick(catalog, n)?,
      None => shuffle(catalog),
    };
    Self::new(prompts)
  }

  /// Same as [`Deck::deal`] with a caller-supplied RNG.
  #[cfg(test)]
  pub fn shuffled<R: Rng + ?Sized>(
    catalog: &[Prompt],
    rounds: Option<usize>,
    rng: &mut R,
  ) -> Result<Self, DeckError> {
    let prompts = match rounds {
      Some(n) => shuffle_and_pick_with(catalog, n, rng)?,
      None => shuffle_with(catalog, rng),
    };
    Self::new(prompts)
  }

  pub fn current(&self) -> &Prompt {
    &self.prompts[self.index]
  }

  pub fn position(&self) -> usize {
    self.index
  }

  pub fn len(&self) -> usize {
    self.prompts.len()
  }

  pub fn has_next(&self) -> bool {
    self.index + 1 < self.prompts.len()
  }

  /// Move to the next prompt. Returns false (and stays put) on the last one.
  pub fn advance(&mut self) -> bool {
    if self.has_next() {
      self.index += 1;
      true
    } else {
      false
    }
  }

  pub fn prompt_ids(&self) -> impl Iterator<Item = &str> {
    self.prompts.iter().map(|p| p.id.as_str())
  }
}
