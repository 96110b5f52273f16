//! # review-nudge Core Library
//!
//! This library decides when an application should ask its user for a
//! rating or review. It keeps a handful of persisted counters and dates,
//! runs them through an ordered gate, and hands the actual prompt to the
//! host platform on its UI context.
//!
//! ## Architecture
//!
//! - **Prompt Engine**: Owns the persisted counters and evaluates the gate
//!   on launch, significant action and app activation
//! - **Policy**: Immutable thresholds read by the engine
//! - **Storage**: Key-value capability with in-memory and SQLite backends,
//!   plus TOML-based configuration
//! - **Host capabilities**: Review presenter, app metadata, UI dispatch and clock
//!
//! ## Key Components
//!
//! - [`PromptEngine`]: Gate evaluation and persisted state
//! - [`ThresholdPolicy`]: Launch, action and day thresholds
//! - [`KeyValueStore`]: Trait for the persistent store
//! - [`UiExecutor`]: Trait for running the prompt on the UI context

pub mod calendar;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod policy;
pub mod prompt;
pub mod storage;

pub use calendar::{calendar_days_between, Clock, FixedClock, SystemClock};
pub use dispatch::{ui_channel, InlineExecutor, UiDispatcher, UiExecutor, UiPump, UiTask};
pub use error::{ConfigError, CoreError, StorageError};
pub use host::{AppMetadata, PresentOutcome, ReviewPresenter, StaticMetadata, UNKNOWN_VERSION};
pub use policy::ThresholdPolicy;
pub use prompt::{BlockReason, GateDecision, PromptEngine, PromptEngineBuilder, PromptSnapshot};
pub use storage::{Config, KeyValueStore, MemoryStore, SqliteStore};
