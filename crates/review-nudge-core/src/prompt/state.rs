//! Typed view over the persisted prompt fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{calendar_days_between, Clock};
use crate::storage::{parse_counter, KeyValueStore, StoreResult};

/// Store keys owned by the engine.
pub mod keys {
    pub const APP_LAUNCH_COUNT: &str = "review_prompt.app_launch_count";
    pub const SIGNIFICANT_ACTION_COUNT: &str = "review_prompt.significant_action_count";
    pub const FIRST_LAUNCH_DATE: &str = "review_prompt.first_launch_date";
    pub const LAST_REVIEW_REQUEST_DATE: &str = "review_prompt.last_review_request_date";
    pub const LAST_VERSION_PROMPTED: &str = "review_prompt.last_version_prompted";

    pub const ALL: [&str; 5] = [
        APP_LAUNCH_COUNT,
        SIGNIFICANT_ACTION_COUNT,
        FIRST_LAUNCH_DATE,
        LAST_REVIEW_REQUEST_DATE,
        LAST_VERSION_PROMPTED,
    ];
}

/// Everything the gate looks at, read in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSnapshot {
    pub app_launch_count: u64,
    pub significant_action_count: u64,
    pub first_launch_date: Option<DateTime<Utc>>,
    pub last_review_request_date: Option<DateTime<Utc>>,
    pub last_version_prompted_for_review: Option<String>,
    /// When the snapshot was taken; the day counts are relative to it.
    pub evaluated_at: DateTime<Utc>,
    /// Calendar days from `first_launch_date` to `evaluated_at`.
    pub days_since_first_launch: Option<i64>,
    /// Calendar days from `last_review_request_date` to `evaluated_at`.
    pub days_since_last_request: Option<i64>,
}

pub(crate) struct PromptState<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> PromptState<'a> {
    pub(crate) fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub(crate) fn launch_count(&self) -> StoreResult<u64> {
        self.read_count(keys::APP_LAUNCH_COUNT)
    }

    pub(crate) fn first_launch_date(&self) -> StoreResult<Option<DateTime<Utc>>> {
        self.read_timestamp(keys::FIRST_LAUNCH_DATE)
    }

    pub(crate) fn record_launch(&self) -> StoreResult<u64> {
        self.store.increment(keys::APP_LAUNCH_COUNT)
    }

    pub(crate) fn record_action(&self) -> StoreResult<u64> {
        self.store.increment(keys::SIGNIFICANT_ACTION_COUNT)
    }

    /// Set the first launch date unless one is already stored.
    ///
    /// Returns whether a date was written. An unparsable stored value is
    /// left alone rather than overwritten.
    pub(crate) fn ensure_first_launch_date(&self, now: DateTime<Utc>) -> StoreResult<bool> {
        if self.store.get(keys::FIRST_LAUNCH_DATE)?.is_some() {
            return Ok(false);
        }
        self.store.set(keys::FIRST_LAUNCH_DATE, &now.to_rfc3339())?;
        Ok(true)
    }

    /// Record an issued review request.
    pub(crate) fn stamp_request(&self, now: DateTime<Utc>, version: &str) -> StoreResult<()> {
        self.store.set(keys::LAST_REVIEW_REQUEST_DATE, &now.to_rfc3339())?;
        self.store.set(keys::LAST_VERSION_PROMPTED, version)
    }

    pub(crate) fn clear(&self) -> StoreResult<()> {
        for key in keys::ALL {
            self.store.remove(key)?;
        }
        Ok(())
    }

    pub(crate) fn snapshot(&self, clock: &dyn Clock) -> StoreResult<PromptSnapshot> {
        let now = clock.now();
        let first_launch_date = self.first_launch_date()?;
        let last_review_request_date = self.read_timestamp(keys::LAST_REVIEW_REQUEST_DATE)?;

        Ok(PromptSnapshot {
            app_launch_count: self.launch_count()?,
            significant_action_count: self.read_count(keys::SIGNIFICANT_ACTION_COUNT)?,
            first_launch_date,
            last_review_request_date,
            last_version_prompted_for_review: self.store.get(keys::LAST_VERSION_PROMPTED)?,
            evaluated_at: now,
            days_since_first_launch: first_launch_date
                .map(|first| calendar_days_between(clock, first, now)),
            days_since_last_request: last_review_request_date
                .map(|last| calendar_days_between(clock, last, now)),
        })
    }

    fn read_count(&self, key: &str) -> StoreResult<u64> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(0);
        };
        match parse_counter(&raw) {
            Some(n) => Ok(n),
            None => {
                tracing::warn!(key, value = %raw, "ignoring unparsable counter");
                Ok(0)
            }
        }
    }

    fn read_timestamp(&self, key: &str) -> StoreResult<Option<DateTime<Utc>>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        match DateTime::parse_from_rfc3339(raw.trim()) {
            Ok(ts) => Ok(Some(ts.with_timezone(&Utc))),
            Err(_) => {
                tracing::warn!(key, value = %raw, "ignoring unparsable timestamp");
                Ok(None)
            }
        }
    }
}
