mod config;
pub mod database;
pub mod memory;

pub use config::{AppConfig, Config};
pub use database::SqliteStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StorageError;

pub type StoreResult<T> = std::result::Result<T, StorageError>;

/// Persistent string key-value capability.
///
/// Values are opaque text; typed interpretation lives with the owner of the
/// keys. A missing key is `Ok(None)`, never an error.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Add one to the integer stored at `key` (absent or unparsable counts
    /// as 0) and return the new value.
    ///
    /// The default is a separate read and write, so concurrent callers can
    /// lose updates. Backends that can do better override it.
    fn increment(&self, key: &str) -> StoreResult<u64> {
        let current = self.get(key)?.map_or(0, |v| counter_or_zero(key, &v));
        let next = current.saturating_add(1);
        self.set(key, &next.to_string())?;
        Ok(next)
    }
}

/// Parse a stored counter. Only plain decimal digits (surrounding spaces
/// allowed) count; signs, fractions and empty text do not. Matches the
/// `trim`/`GLOB` test in [`SqliteStore`]'s increment.
pub(crate) fn parse_counter(raw: &str) -> Option<u64> {
    let digits = raw.trim_matches(' ');
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn counter_or_zero(key: &str, raw: &str) -> u64 {
    parse_counter(raw).unwrap_or_else(|| {
        tracing::warn!(key, value = %raw, "resetting unparsable counter");
        0
    })
}

/// Returns the data directory for review-nudge.
///
/// `REVIEW_NUDGE_HOME` wins when set. Otherwise `~/.config/review-nudge[-dev]/`,
/// with the `-dev` suffix when `REVIEW_NUDGE_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("REVIEW_NUDGE_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("REVIEW_NUDGE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("review-nudge-dev")
            } else {
                base_dir.join("review-nudge")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
