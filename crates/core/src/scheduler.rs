//! Periodic polling with an explicit Idle/Running lifecycle.
//!
//! Stopping bumps a generation counter. Ticks carry a [`TickGuard`] stamped
//! with the generation they were issued under, and must check it after their
//! fetch completes and before they mutate anything, so a fetch still in flight
//! when `stop` is called can never write into a torn-down view.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info};

use crate::error::Error;
use crate::result::Result;

/// Lifecycle state of a [`PollingScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Running => f.write_str("running"),
        }
    }
}

/// Proof that a tick was issued by a scheduler run that has not been stopped.
#[derive(Debug, Clone)]
pub struct TickGuard {
    generation: Arc<AtomicU64>,
    issued: u64,
}

impl TickGuard {
    /// True while the run that issued this guard is still active.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.issued
    }
}

/// Work performed on every tick.
#[async_trait]
pub trait PollTask: Send + Sync + 'static {
    /// Run one poll cycle. Implementations must not mutate shared state
    /// unless `guard.is_current()` holds at the moment of mutation.
    async fn tick(&self, guard: TickGuard);
}

/// Drives a [`PollTask`] at a fixed period.
///
/// Each tick runs as its own task, so a slow tick does not delay the next one
/// and ticks may overlap.
pub struct PollingScheduler {
    name: &'static str,
    generation: Arc<AtomicU64>,
    driver: Option<JoinHandle<()>>,
}

impl PollingScheduler {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            generation: Arc::new(AtomicU64::new(0)),
            driver: None,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn state(&self) -> SchedulerState {
        if self.driver.is_some() {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.driver.is_some()
    }

    /// Guard for the current run, if Running.
    #[must_use]
    pub fn current_guard(&self) -> Option<TickGuard> {
        self.driver.as_ref().map(|_| self.issue_guard())
    }

    /// Idle → Running. The first tick fires one full period after this call.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` for a zero period and
    /// `Error::AlreadyRunning` if the scheduler is already Running.
    pub fn start(&mut self, period: Duration, task: Arc<dyn PollTask>) -> Result<()> {
        if period.is_zero() {
            return Err(Error::invalid_config(format!(
                "{} poll period must be greater than 0",
                self.name
            )));
        }
        if self.driver.is_some() {
            return Err(Error::already_running(self.name));
        }

        let guard = self.issue_guard();
        let name = self.name;
        let driver = tokio::spawn(async move {
            let first = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
            let mut ticker = interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if !guard.is_current() {
                    break;
                }
                debug!(scheduler = name, "Tick");
                let task = Arc::clone(&task);
                let guard = guard.clone();
                tokio::spawn(async move {
                    task.tick(guard).await;
                });
            }
        });
        self.driver = Some(driver);

        info!(
            scheduler = self.name,
            period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
            "Polling started"
        );
        Ok(())
    }

    /// Running → Idle. Idempotent.
    ///
    /// Future ticks are cancelled; in-flight ticks finish their fetch but see
    /// a stale guard and discard the result.
    pub fn stop(&mut self) {
        if let Some(driver) = self.driver.take() {
            self.generation.fetch_add(1, Ordering::SeqCst);
            driver.abort();
            info!(scheduler = self.name, "Polling stopped");
        }
    }

    fn issue_guard(&self) -> TickGuard {
        TickGuard {
            generation: Arc::clone(&self.generation),
            issued: self.generation.load(Ordering::SeqCst),
        }
    }
}

impl fmt::Debug for PollingScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollingScheduler")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
