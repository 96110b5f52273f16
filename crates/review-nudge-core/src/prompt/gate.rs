//! Gate conditions and decisions.

use std::fmt;

use serde::Serialize;

use super::state::PromptSnapshot;
use crate::policy::ThresholdPolicy;

/// Why the gate did not dispatch a review request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    /// The last request is more recent than the cooldown window.
    Cooldown { days_since_last_request: i64, required: u32 },
    TooFewLaunches { launches: u64, required: u32 },
    TooFewActions { actions: u64, required: u32 },
    /// First prompt overall or for this version, and the app is too new.
    FirstUseTooRecent { days_since_first_launch: i64, required: u32 },
    /// Every condition passed but an earlier request is still queued for
    /// the UI context.
    RequestPending,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::Cooldown { days_since_last_request, required } => write!(
                f,
                "cooldown: {days_since_last_request} day(s) since last request, need {required}"
            ),
            BlockReason::TooFewLaunches { launches, required } => {
                write!(f, "launches: {launches} of {required}")
            }
            BlockReason::TooFewActions { actions, required } => {
                write!(f, "significant actions: {actions} of {required}")
            }
            BlockReason::FirstUseTooRecent { days_since_first_launch, required } => write!(
                f,
                "first use: {days_since_first_launch} day(s) since first launch, need {required}"
            ),
            BlockReason::RequestPending => write!(f, "a review request is already queued"),
        }
    }
}

/// Outcome of running the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    /// A review request was handed to the UI executor for `version`.
    Dispatched { version: String },
    /// Dry run only: the gate would dispatch for `version` right now.
    Eligible { version: String },
    Blocked(BlockReason),
}

impl GateDecision {
    pub fn is_blocked(&self) -> bool {
        matches!(self, GateDecision::Blocked(_))
    }

    pub fn block_reason(&self) -> Option<&BlockReason> {
        match self {
            GateDecision::Blocked(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for GateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateDecision::Dispatched { version } => write!(f, "review requested (version {version})"),
            GateDecision::Eligible { version } => write!(f, "eligible (version {version})"),
            GateDecision::Blocked(reason) => write!(f, "blocked: {reason}"),
        }
    }
}

/// Activation pre-check: launch count, then time since first launch.
pub(crate) fn check_launches(launches: u64, policy: &ThresholdPolicy) -> Result<(), BlockReason> {
    let required = policy.min_launches_before_prompt();
    if launches < u64::from(required) {
        return Err(BlockReason::TooFewLaunches { launches, required });
    }
    Ok(())
}

pub(crate) fn check_first_use(
    days_since_first_launch: Option<i64>,
    policy: &ThresholdPolicy,
) -> Result<(), BlockReason> {
    let required = policy.min_days_since_first_launch_before_prompt();
    match days_since_first_launch {
        Some(days) if days < i64::from(required) => Err(BlockReason::FirstUseTooRecent {
            days_since_first_launch: days,
            required,
        }),
        _ => Ok(()),
    }
}

/// The full gate, in order. Stops at the first failing condition.
pub(crate) fn evaluate(
    snapshot: &PromptSnapshot,
    policy: &ThresholdPolicy,
    current_version: &str,
) -> Result<(), BlockReason> {
    if let Some(days) = snapshot.days_since_last_request {
        let required = policy.min_days_between_prompts();
        if days < i64::from(required) {
            return Err(BlockReason::Cooldown {
                days_since_last_request: days,
                required,
            });
        }
    }

    check_launches(snapshot.app_launch_count, policy)?;

    let required = policy.min_significant_actions_before_prompt();
    if snapshot.significant_action_count < u64::from(required) {
        return Err(BlockReason::TooFewActions {
            actions: snapshot.significant_action_count,
            required,
        });
    }

    // Maturity only gates the first prompt for a given version
    let already_prompted_this_version =
        snapshot.last_version_prompted_for_review.as_deref() == Some(current_version);
    if !already_prompted_this_version {
        check_first_use(snapshot.days_since_first_launch, policy)?;
    }

    Ok(())
}
