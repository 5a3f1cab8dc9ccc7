//! Countdown timer for timed rounds.
//!
//! [`Countdown`] is the pure counter; [`CountdownTimer`] drives it from a
//! tokio task and publishes [`TimerEvent`]s on a channel. The task is aborted
//! on pause, reset and drop. Every event carries the epoch it was produced
//! under, and the epoch moves on each cancellation, so receivers can discard
//! anything queued by a superseded countdown. Timers that publish on the same
//! channel draw epochs from one shared [`EpochSource`], so no two countdowns
//! ever share an epoch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Outcome of a single decrement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
  /// Not running; nothing changed.
  Idle,
  Progress { remaining: u32 },
  /// Reached zero on this tick. Produced at most once per reset.
  Finished,
}

#[derive(Clone, Debug)]
pub struct Countdown {
  total: u32,
  remaining: u32,
  running: bool,
}

impl Countdown {
  pub fn new(total: u32) -> Self {
    Self { total, remaining: total, running: false }
  }

  pub fn total(&self) -> u32 {
    self.total
  }

  pub fn remaining(&self) -> u32 {
    self.remaining
  }

  #[cfg(test)]
  pub fn is_running(&self) -> bool {
    self.running
  }

  /// Returns true if this call started the countdown. No-op when already
  /// running or when nothing is left to count.
  pub fn start(&mut self) -> bool {
    if self.running || self.remaining == 0 {
      return false;
    }
    self.running = true;
    true
  }

  pub fn pause(&mut self) {
    self.running = false;
  }

  pub fn reset(&mut self, total: u32) {
    self.total = total;
    self.remaining = total;
    self.running = false;
  }

  pub fn tick(&mut self) -> Tick {
    if !self.running {
      return Tick::Idle;
    }
    self.remaining = self.remaining.saturating_sub(1);
    if self.remaining == 0 {
      self.running = false;
      Tick::Finished
    } else {
      Tick::Progress { remaining: self.remaining }
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEventKind {
  /// One decrement happened; `remaining` is 0 on the final one.
  Tick { remaining: u32, total: u32 },
  Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerEvent {
  pub epoch: u64,
  pub kind: TimerEventKind,
}

/// Monotonic epoch counter shared by every timer on one event channel.
#[derive(Clone, Debug, Default)]
pub struct EpochSource(Arc<AtomicU64>);

impl EpochSource {
  pub fn next(&self) -> u64 {
    self.0.fetch_add(1, Ordering::Relaxed) + 1
  }
}

/// Owned handle over a running countdown.
pub struct CountdownTimer {
  countdown: Arc<Mutex<Countdown>>,
  epochs: EpochSource,
  epoch: u64,
  period: Duration,
  events: mpsc::UnboundedSender<TimerEvent>,
  task: Option<JoinHandle<()>>,
}

impl CountdownTimer {
  pub fn new(
    total: u32,
    period: Duration,
    events: mpsc::UnboundedSender<TimerEvent>,
    epochs: EpochSource,
  ) -> Self {
    Self {
      countdown: Arc::new(Mutex::new(Countdown::new(total))),
      epoch: epochs.next(),
      epochs,
      period,
      events,
      task: None,
    }
  }

  pub fn epoch(&self) -> u64 {
    self.epoch
  }

  pub fn remaining(&self) -> u32 {
    self.lock().remaining()
  }

  pub fn total(&self) -> u32 {
    self.lock().total()
  }

  #[cfg(test)]
  pub fn is_running(&self) -> bool {
    self.lock().is_running()
  }

  /// Begin counting down from the current remaining value. Idempotent.
  pub fn start(&mut self) {
    if !self.lock().start() {
      return;
    }
    let countdown = Arc::clone(&self.countdown);
    let events = self.events.clone();
    let epoch = self.epoch;
    let period = self.period;
    debug!(target: "game", epoch, period_ms = period.as_millis() as u64, "Countdown started");

    self.task = Some(tokio::spawn(async move {
      let mut interval = interval_at(Instant::now() + period, period);
      interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
      loop {
        interval.tick().await;
        let (tick, total) = {
          let mut c = countdown.lock().unwrap_or_else(PoisonError::into_inner);
          (c.tick(), c.total())
        };
        let sent = match tick {
          Tick::Idle => break,
          Tick::Progress { remaining } => events
            .send(TimerEvent { epoch, kind: TimerEventKind::Tick { remaining, total } })
            .is_ok(),
          Tick::Finished => {
            let _ = events.send(TimerEvent { epoch, kind: TimerEventKind::Tick { remaining: 0, total } });
            let _ = events.send(TimerEvent { epoch, kind: TimerEventKind::Done });
            trace!(target: "game", epoch, "Countdown finished");
            break;
          }
        };
        if !sent {
          break;
        }
      }
    }));
  }

  /// Stop counting; remaining time is kept.
  pub fn pause(&mut self) {
    self.cancel();
    self.lock().pause();
  }

  /// Stop and set remaining time to `total`.
  pub fn reset(&mut self, total: u32) {
    self.cancel();
    self.lock().reset(total);
  }

  fn cancel(&mut self) {
    if let Some(task) = self.task.take() {
      task.abort();
    }
    self.epoch = self.epochs.next();
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Countdown> {
    self.countdown.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl Drop for CountdownTimer {
  fn drop(&mut self) {
    if let Some(task) = self.task.take() {
      task.abort();
    }
  }
}
