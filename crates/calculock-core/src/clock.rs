//! Periodic tick source for block expiry.
//!
//! The clock carries no business logic. It wakes on a fixed interval, takes
//! the target's lock and hands it the current wall-clock time. Taking the
//! same lock as user commands keeps ticks from landing mid-mutation.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::block::BlockSession;
use crate::blocker::Blocker;

/// Something that wants to hear about the passage of time.
pub trait Tick: Send + 'static {
    fn on_tick(&mut self, now: DateTime<Utc>);
}

impl Tick for Blocker {
    fn on_tick(&mut self, now: DateTime<Utc>) {
        self.tick(now);
    }
}

impl Tick for BlockSession {
    fn on_tick(&mut self, now: DateTime<Utc>) {
        self.tick(now);
    }
}

#[derive(Debug)]
pub struct SessionClock {
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl SessionClock {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            handle: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start ticking `target`, first tick immediately.
    ///
    /// Any ticker already running is stopped first.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start<T: Tick>(&mut self, target: Arc<Mutex<T>>) {
        self.stop();
        let period = self.interval;
        debug!(?period, "session clock started");
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let now = Utc::now();
                match target.lock() {
                    Ok(mut guard) => guard.on_tick(now),
                    Err(_) => {
                        warn!("tick target lock poisoned, stopping session clock");
                        break;
                    }
                }
            }
        }));
    }

    /// Stop ticking. Safe to call when not running.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("session clock stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}

impl Drop for SessionClock {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AppCatalog, AppId};
    use crate::category::CategoryStore;
    use crate::events::Event;
    use crate::problem::ProblemBank;

    #[derive(Default)]
    struct Counter {
        ticks: usize,
    }

    impl Tick for Counter {
        fn on_tick(&mut self, _now: DateTime<Utc>) {
            self.ticks += 1;
        }
    }

    fn ticks(counter: &Arc<Mutex<Counter>>) -> usize {
        counter.lock().unwrap().ticks
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_interval() {
        let counter = Arc::new(Mutex::new(Counter::default()));
        let mut clock = SessionClock::default();
        clock.start(Arc::clone(&counter));
        assert!(clock.is_running());

        tokio::time::sleep(Duration::from_millis(3500)).await;
        let seen = ticks(&counter);
        assert!((3..=4).contains(&seen), "saw {seen} ticks");
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_ticks() {
        let counter = Arc::new(Mutex::new(Counter::default()));
        let mut clock = SessionClock::new(Duration::from_millis(100));
        clock.start(Arc::clone(&counter));
        tokio::time::sleep(Duration::from_millis(250)).await;

        clock.stop();
        let before = ticks(&counter);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks(&counter), before);
        assert!(!clock.is_running());

        clock.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn restart_never_overlaps() {
        let counter = Arc::new(Mutex::new(Counter::default()));
        let mut clock = SessionClock::default();
        clock.start(Arc::clone(&counter));
        clock.start(Arc::clone(&counter));

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let seen = ticks(&counter);
        assert!((2..=3).contains(&seen), "saw {seen} ticks");
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_a_bare_session() {
        let mut session = BlockSession::new();
        session.select_apps([AppId::from("Games")]);
        session
            .start_block(
                crate::block::BlockDuration::from_minutes(15),
                Utc::now() - chrono::Duration::minutes(20),
            )
            .unwrap();

        let shared = Arc::new(Mutex::new(session));
        let mut clock = SessionClock::default();
        clock.start(Arc::clone(&shared));
        tokio::time::sleep(Duration::from_millis(10)).await;

        let session = shared.lock().unwrap();
        assert_eq!(session.block_expiry(), None);
        assert_eq!(session.selected_apps().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expires_overdue_block() {
        let mut blocker = Blocker::new(
            AppCatalog::standard(),
            CategoryStore::new(),
            ProblemBank::standard_seeded(9),
        );
        blocker.select_apps([AppId::from("Reddit")], Utc::now()).unwrap();
        // Started two minutes ago for one minute: already overdue.
        blocker
            .start_block(1, Utc::now() - chrono::Duration::minutes(2))
            .unwrap();
        let mut rx = blocker.subscribe();

        let shared = Arc::new(Mutex::new(blocker));
        let mut clock = SessionClock::default();
        clock.start(Arc::clone(&shared));
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(matches!(rx.try_recv(), Ok(Event::BlockExpired { .. })));
        assert_eq!(shared.lock().unwrap().session().block_expiry(), None);
    }
}
