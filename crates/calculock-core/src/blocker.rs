//! The blocker: one owner for the session, categories and unblock gate.
//!
//! Presentation layers talk only to [`Blocker`]. Each operation validates
//! its input against the catalog, applies the change, returns the result
//! synchronously and publishes an [`Event`] for observers.
//!
//! Time is never read here: every operation that publishes takes the
//! caller's `now`, and events carry exactly that instant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::block::{BlockDuration, BlockSession, DisplayStatus};
use crate::catalog::{AppCatalog, AppId};
use crate::category::CategoryStore;
use crate::error::{BlockError, CategoryError, Result};
use crate::events::{CategoryChange, Event, EventBus};
use crate::problem::{CalculusProblem, ProblemBank};
use crate::storage::Config;

/// Result of submitting an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnblockOutcome {
    Unblocked,
    Incorrect,
}

impl UnblockOutcome {
    pub fn is_unblocked(self) -> bool {
        self == UnblockOutcome::Unblocked
    }
}

#[derive(Debug)]
pub struct Blocker {
    catalog: AppCatalog,
    session: BlockSession,
    categories: CategoryStore,
    problems: ProblemBank,
    current_problem: CalculusProblem,
    events: EventBus,
}

impl Blocker {
    /// Create a blocker. A first problem is drawn immediately.
    pub fn new(catalog: AppCatalog, categories: CategoryStore, mut problems: ProblemBank) -> Self {
        let current_problem = problems.random_problem().clone();
        Self {
            catalog,
            session: BlockSession::new(),
            categories,
            problems,
            current_problem,
            events: EventBus::default(),
        }
    }

    /// Build from validated configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            config.catalog(),
            config.category_store(),
            config.problem_bank(),
        ))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn catalog(&self) -> &AppCatalog {
        &self.catalog
    }

    pub fn session(&self) -> &BlockSession {
        &self.session
    }

    pub fn categories(&self) -> &CategoryStore {
        &self.categories
    }

    pub fn status(&self, now: DateTime<Utc>) -> DisplayStatus {
        self.session.status_summary(now)
    }

    pub fn current_problem(&self) -> &CalculusProblem {
        &self.current_problem
    }

    pub fn hint(&self) -> &str {
        &self.current_problem.hint
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Replace the selection. Every app must be in the catalog; on error
    /// the selection is unchanged.
    pub fn select_apps<I>(&mut self, apps: I, now: DateTime<Utc>) -> Result<(), BlockError>
    where
        I: IntoIterator<Item = AppId>,
    {
        let apps: Vec<AppId> = apps.into_iter().collect();
        if let Some(unknown) = apps.iter().find(|app| !self.catalog.contains(app)) {
            return Err(BlockError::UnknownApp(unknown.clone()));
        }
        self.session.select_apps(apps);
        self.events.publish(Event::AppsSelected {
            apps: self.session.selected_apps().iter().cloned().collect(),
            at: now,
        });
        Ok(())
    }

    /// Replace the selection with a category's members. Returns how many
    /// apps are now selected.
    pub fn select_category(&mut self, name: &str, now: DateTime<Utc>) -> Result<usize> {
        let members = self
            .categories
            .members(name)
            .ok_or_else(|| CategoryError::UnknownCategory(name.to_string()))?
            .to_vec();
        self.select_apps(members, now)?;
        Ok(self.session.selected_apps().len())
    }

    /// Start a block of `minutes` from `now`. Returns the expiry.
    pub fn start_block(&mut self, minutes: u32, now: DateTime<Utc>) -> Result<DateTime<Utc>, BlockError> {
        let duration = BlockDuration::from_minutes(minutes);
        let expires_at = self.session.start_block(duration, now)?;
        self.events.publish(Event::BlockStarted {
            apps: self.session.selected_apps().iter().cloned().collect(),
            duration_min: duration.minutes(),
            expires_at,
            at: now,
        });
        Ok(expires_at)
    }

    /// Submit an answer to the current problem.
    ///
    /// A correct answer lifts the block and draws a fresh problem for the
    /// next attempt. A wrong one keeps both the block and the problem.
    pub fn attempt_unblock(&mut self, answer: &str, now: DateTime<Utc>) -> Result<UnblockOutcome, BlockError> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(BlockError::EmptyAnswer);
        }
        self.tick(now);
        if !self.session.is_active(now) {
            return Err(BlockError::NotActive);
        }

        let question = self.current_problem.question.clone();
        if self.session.attempt_unblock(answer, &self.current_problem) {
            self.events.publish(Event::Unblocked { question, at: now });
            self.request_new_problem(now);
            Ok(UnblockOutcome::Unblocked)
        } else {
            warn!(%question, "incorrect answer");
            self.events.publish(Event::UnblockRejected { question, at: now });
            Ok(UnblockOutcome::Incorrect)
        }
    }

    /// Replace the current problem with a random one.
    pub fn request_new_problem(&mut self, now: DateTime<Utc>) -> &CalculusProblem {
        self.current_problem = self.problems.random_problem().clone();
        debug!(question = %self.current_problem.question, "problem issued");
        self.events.publish(Event::ProblemIssued {
            question: self.current_problem.question.clone(),
            at: now,
        });
        &self.current_problem
    }

    /// Expire the block if its time is up. Returns the expiry event when
    /// this call ended the block.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let expired_at = self.session.block_expiry()?;
        if !self.session.tick(now) {
            return None;
        }
        let event = Event::BlockExpired { expired_at, at: now };
        self.events.publish(event.clone());
        Some(event)
    }

    // ── Categories ───────────────────────────────────────────────────

    pub fn list_categories(&self) -> Vec<String> {
        self.categories.list_categories()
    }

    pub fn category_members(&self, name: &str) -> Option<&[AppId]> {
        self.categories.members(name)
    }

    pub fn available_apps(&self, name: &str) -> Result<Vec<AppId>, CategoryError> {
        self.categories.available_apps(name, &self.catalog)
    }

    pub fn create_category(&mut self, name: &str, now: DateTime<Utc>) -> Result<(), CategoryError> {
        self.categories.create_category(name)?;
        self.category_changed(name.trim(), CategoryChange::Created, now);
        Ok(())
    }

    /// Returns `false` if there was nothing to delete.
    pub fn delete_category(&mut self, name: &str, now: DateTime<Utc>) -> bool {
        let removed = self.categories.delete_category(name);
        if removed {
            self.category_changed(name, CategoryChange::Deleted, now);
        }
        removed
    }

    pub fn rename_category(&mut self, old: &str, new: &str, now: DateTime<Utc>) -> Result<(), CategoryError> {
        self.categories.rename_category(old, new)?;
        if old != new.trim() {
            self.category_changed(
                new.trim(),
                CategoryChange::Renamed {
                    from: old.to_string(),
                },
                now,
            );
        }
        Ok(())
    }

    pub fn add_app(&mut self, category: &str, app: AppId, now: DateTime<Utc>) -> Result<(), CategoryError> {
        if !self.catalog.contains(&app) {
            return Err(CategoryError::UnknownApp(app));
        }
        self.categories.add_app(category, app.clone())?;
        self.category_changed(category, CategoryChange::AppAdded { app }, now);
        Ok(())
    }

    /// Returns `false` if nothing changed.
    pub fn remove_app(&mut self, category: &str, app: &AppId, now: DateTime<Utc>) -> bool {
        let removed = self.categories.remove_app(category, app);
        if removed {
            self.category_changed(category, CategoryChange::AppRemoved { app: app.clone() }, now);
        }
        removed
    }

    fn category_changed(&self, category: &str, change: CategoryChange, at: DateTime<Utc>) {
        debug!(%category, ?change, "category changed");
        self.events.publish(Event::CategoryChanged {
            category: category.to_string(),
            change,
            at,
        });
    }
}
