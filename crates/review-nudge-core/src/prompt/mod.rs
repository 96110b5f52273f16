//! Review prompt decision engine.
//!
//! The engine counts launches and significant actions, remembers when the
//! app was first launched and when it last asked for a review, and runs an
//! ordered gate over those values:
//!
//! ```text
//! cooldown -> launches -> actions -> first-use maturity -> dispatch
//! ```
//!
//! The first failing condition stops evaluation with no side effect.

mod engine;
mod gate;
mod state;

pub use engine::{PromptEngine, PromptEngineBuilder};
pub use gate::{BlockReason, GateDecision};
pub use state::{keys, PromptSnapshot};
