//! Per-question countdown.
//!
//! Each armed countdown runs as its own tokio task and reports back over a
//! channel: one `Tick` per elapsed second while time remains, then exactly
//! one `Expired`, unless the countdown is disarmed first. The session layer
//! decides what an event means; a tick or expiry carrying a stale
//! generation token is simply dropped there.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Event emitted by an armed countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// One second elapsed; `remaining_secs` is always at least 1.
    Tick { generation: u64, remaining_secs: u32 },
    /// The countdown ran out. At most one per armed countdown.
    Expired { generation: u64 },
}

impl ClockEvent {
    #[must_use]
    pub fn generation(&self) -> u64 {
        match self {
            ClockEvent::Tick { generation, .. } | ClockEvent::Expired { generation } => *generation,
        }
    }
}

/// Cancellable one-shot countdown, one per open question.
#[derive(Debug)]
pub struct CountdownClock {
    events: mpsc::UnboundedSender<ClockEvent>,
    active: Option<JoinHandle<()>>,
}

impl CountdownClock {
    /// Create a clock and the receiving end of its event channel.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ClockEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (
            Self {
                events,
                active: None,
            },
            receiver,
        )
    }

    /// True while a countdown task is live (armed and not yet expired or
    /// disarmed).
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.active.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Arm a countdown of `secs` seconds tagged with the session's current
    /// generation token.
    ///
    /// # Panics
    ///
    /// Panics if a countdown is still live. The caller must disarm first;
    /// two concurrent countdowns would mean the session layer lost track of
    /// question boundaries.
    pub fn arm(&mut self, secs: u32, generation: u64) {
        assert!(
            !self.is_armed(),
            "countdown armed while another is still running"
        );

        debug!(secs, generation, "countdown armed");
        let events = self.events.clone();
        self.active = Some(tokio::spawn(run_countdown(secs, generation, events)));
    }

    /// Cancel the live countdown, if any. A disarmed countdown never emits
    /// `Expired`.
    pub fn disarm(&mut self) {
        if let Some(task) = self.active.take() {
            task.abort();
            debug!("countdown disarmed");
        }
    }
}

impl Drop for CountdownClock {
    fn drop(&mut self) {
        self.disarm();
    }
}

async fn run_countdown(secs: u32, generation: u64, events: mpsc::UnboundedSender<ClockEvent>) {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of a tokio interval completes immediately.
    ticker.tick().await;

    let mut remaining = secs;
    while remaining > 0 {
        ticker.tick().await;
        remaining -= 1;
        if remaining == 0 {
            break;
        }
        let tick = ClockEvent::Tick {
            generation,
            remaining_secs: remaining,
        };
        if events.send(tick).is_err() {
            return;
        }
    }

    let _ = events.send(ClockEvent::Expired { generation });
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn counts_down_with_one_tick_per_second() {
        let (mut clock, mut events) = CountdownClock::new();
        clock.arm(3, 7);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(
            events.recv().await,
            Some(ClockEvent::Tick {
                generation: 7,
                remaining_secs: 2
            })
        );

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(
            events.recv().await,
            Some(ClockEvent::Tick {
                generation: 7,
                remaining_secs: 1
            })
        );

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(events.recv().await, Some(ClockEvent::Expired { generation: 7 }));
    }

    #[tokio::test(start_paused = true)]
    async fn emits_exactly_one_expiry() {
        let (mut clock, mut events) = CountdownClock::new();
        clock.arm(1, 0);

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(events.recv().await, Some(ClockEvent::Expired { generation: 0 }));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn disarmed_countdown_stays_silent() {
        let (mut clock, mut events) = CountdownClock::new();
        clock.arm(2, 0);
        clock.disarm();

        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert!(events.try_recv().is_err());
        assert!(!clock.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn clock_can_be_rearmed_after_disarm() {
        let (mut clock, mut events) = CountdownClock::new();
        clock.arm(5, 1);
        clock.disarm();
        clock.arm(1, 2);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(events.recv().await, Some(ClockEvent::Expired { generation: 2 }));
    }

    #[tokio::test(start_paused = true)]
    #[should_panic(expected = "countdown armed while another is still running")]
    async fn arming_twice_is_a_contract_violation() {
        let (mut clock, _events) = CountdownClock::new();
        clock.arm(5, 0);
        clock.arm(5, 1);
    }
}
