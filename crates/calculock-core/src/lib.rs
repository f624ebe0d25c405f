//! # CalcuLock Core Library
//!
//! This library provides the core logic for CalcuLock, an app blocker whose
//! blocks can only be lifted early by solving a calculus problem. Blocking
//! is simulated in memory; presentation layers (the CLI shell, a GUI) call
//! into the core and render what it returns.
//!
//! ## Architecture
//!
//! - **Block Session**: A wall-clock-based state machine that requires the
//!   caller to periodically invoke `tick()` to observe expiry
//! - **Session Clock**: Tokio ticker that drives `tick()` once a second
//! - **Categories**: Named, ordered groupings of apps
//! - **Problem Bank**: Static calculus pool with a seedable selector
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Blocker`]: Facade owning all state; the only entry point UIs need
//! - [`BlockSession`]: Core block state machine
//! - [`SessionClock`]: Periodic tick source
//! - [`Config`]: Application configuration management

pub mod block;
pub mod blocker;
pub mod catalog;
pub mod category;
pub mod clock;
pub mod error;
pub mod events;
pub mod problem;
pub mod storage;

pub use block::{BlockDuration, BlockSession, BlockState, DisplayStatus};
pub use blocker::{Blocker, UnblockOutcome};
pub use catalog::{AppCatalog, AppId};
pub use category::CategoryStore;
pub use clock::{SessionClock, Tick};
pub use error::{BlockError, CategoryError, ConfigError, CoreError};
pub use events::{CategoryChange, Event, EventBus};
pub use problem::{CalculusProblem, ProblemBank};
pub use storage::Config;
