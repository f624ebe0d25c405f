//! Block session state machine.
//!
//! A wall-clock state machine with two states. It keeps no thread and reads
//! no clock of its own: every time-dependent call takes `now` from the
//! caller, and expiry is only observed when `tick()` runs.
//!
//! ## State Transitions
//!
//! ```text
//! Inactive --start_block--> Active --(tick past expiry | correct answer)--> Inactive
//! ```

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::duration::BlockDuration;
use crate::catalog::AppId;
use crate::error::BlockError;
use crate::problem::CalculusProblem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockState {
    Inactive,
    Active,
}

/// Snapshot of the session for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DisplayStatus {
    Active {
        expires_at: DateTime<Utc>,
        remaining_secs: u64,
        blocked_apps: usize,
    },
    Inactive {
        selected_apps: usize,
    },
}

impl DisplayStatus {
    pub fn state(&self) -> BlockState {
        match self {
            DisplayStatus::Active { .. } => BlockState::Active,
            DisplayStatus::Inactive { .. } => BlockState::Inactive,
        }
    }

    /// Time left in the block; zero when inactive.
    pub fn remaining(&self) -> Duration {
        match self {
            DisplayStatus::Active { remaining_secs, .. } => {
                Duration::seconds(i64::try_from(*remaining_secs).unwrap_or(i64::MAX))
            }
            DisplayStatus::Inactive { .. } => Duration::zero(),
        }
    }
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayStatus::Active { expires_at, .. } => write!(
                f,
                "Apps blocked until {}",
                expires_at.with_timezone(&Local).format("%H:%M")
            ),
            DisplayStatus::Inactive { selected_apps: 0 } => f.write_str("No apps currently blocked"),
            DisplayStatus::Inactive { selected_apps } => {
                write!(f, "{selected_apps} apps selected for blocking")
            }
        }
    }
}

/// Selected apps plus an optional block expiry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSession {
    selected_apps: BTreeSet<AppId>,
    #[serde(default)]
    block_expiry: Option<DateTime<Utc>>,
}

impl BlockSession {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn selected_apps(&self) -> &BTreeSet<AppId> {
        &self.selected_apps
    }

    pub fn block_expiry(&self) -> Option<DateTime<Utc>> {
        self.block_expiry
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.block_expiry.is_some_and(|expiry| expiry > now)
    }

    pub fn state(&self, now: DateTime<Utc>) -> BlockState {
        if self.is_active(now) {
            BlockState::Active
        } else {
            BlockState::Inactive
        }
    }

    /// Pure projection of the session at `now`.
    pub fn status_summary(&self, now: DateTime<Utc>) -> DisplayStatus {
        match self.block_expiry {
            Some(expires_at) if expires_at > now => DisplayStatus::Active {
                expires_at,
                remaining_secs: (expires_at - now).num_seconds().max(0) as u64,
                blocked_apps: self.selected_apps.len(),
            },
            _ => DisplayStatus::Inactive {
                selected_apps: self.selected_apps.len(),
            },
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the selection. Allowed in either state.
    pub fn select_apps(&mut self, apps: impl IntoIterator<Item = AppId>) {
        self.selected_apps = apps.into_iter().collect();
        debug!(count = self.selected_apps.len(), "selection replaced");
    }

    /// Start a block of `duration` from `now`. Returns the expiry.
    pub fn start_block(
        &mut self,
        duration: BlockDuration,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, BlockError> {
        if self.selected_apps.is_empty() {
            return Err(BlockError::EmptySelection);
        }
        if duration.minutes() == 0 {
            return Err(BlockError::InvalidDuration {
                minutes: duration.minutes(),
            });
        }
        if let Some(expires_at) = self.block_expiry.filter(|expiry| *expiry > now) {
            return Err(BlockError::AlreadyActive { expires_at });
        }

        let expires_at = now + Duration::seconds(duration.secs());
        self.block_expiry = Some(expires_at);
        info!(
            apps = self.selected_apps.len(),
            minutes = duration.minutes(),
            %expires_at,
            "block started"
        );
        Ok(expires_at)
    }

    /// Lift the block if `answer` solves `problem`.
    pub fn attempt_unblock(&mut self, answer: &str, problem: &CalculusProblem) -> bool {
        if !problem.check_answer(answer) {
            return false;
        }
        self.block_expiry = None;
        info!("block lifted by correct answer");
        true
    }

    /// Call periodically. Returns `true` when this call ended an expired block.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        match self.block_expiry {
            Some(expiry) if expiry <= now => {
                self.block_expiry = None;
                info!(%expiry, "block expired");
                true
            }
            _ => false,
        }
    }
}
