//! Threshold policy for the review prompt gate.
//!
//! Four tunable thresholds, fixed at construction. Zero means "always
//! satisfied" and a very large value effectively disables that path.
//! No relationship between the fields is enforced.

use serde::{Deserialize, Serialize};

/// Immutable thresholds read by [`crate::PromptEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdPolicy {
    #[serde(default = "default_min_launches")]
    min_launches_before_prompt: u32,
    #[serde(default = "default_min_actions")]
    min_significant_actions_before_prompt: u32,
    #[serde(default = "default_min_days_since_first_launch")]
    min_days_since_first_launch_before_prompt: u32,
    #[serde(default = "default_min_days_between_prompts")]
    min_days_between_prompts: u32,
}

fn default_min_launches() -> u32 {
    5
}
fn default_min_actions() -> u32 {
    3
}
fn default_min_days_since_first_launch() -> u32 {
    7
}
fn default_min_days_between_prompts() -> u32 {
    90
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            min_launches_before_prompt: default_min_launches(),
            min_significant_actions_before_prompt: default_min_actions(),
            min_days_since_first_launch_before_prompt: default_min_days_since_first_launch(),
            min_days_between_prompts: default_min_days_between_prompts(),
        }
    }
}

impl ThresholdPolicy {
    pub fn new(
        min_launches_before_prompt: u32,
        min_significant_actions_before_prompt: u32,
        min_days_since_first_launch_before_prompt: u32,
        min_days_between_prompts: u32,
    ) -> Self {
        Self {
            min_launches_before_prompt,
            min_significant_actions_before_prompt,
            min_days_since_first_launch_before_prompt,
            min_days_between_prompts,
        }
    }

    /// A policy where every condition is satisfied immediately.
    pub fn always_eligible() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub fn min_launches_before_prompt(&self) -> u32 {
        self.min_launches_before_prompt
    }

    pub fn min_significant_actions_before_prompt(&self) -> u32 {
        self.min_significant_actions_before_prompt
    }

    pub fn min_days_since_first_launch_before_prompt(&self) -> u32 {
        self.min_days_since_first_launch_before_prompt
    }

    pub fn min_days_between_prompts(&self) -> u32 {
        self.min_days_between_prompts
    }
}
