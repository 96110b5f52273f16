//! Capabilities the host application provides to the engine.

/// Version string persisted when the host cannot report one.
pub const UNKNOWN_VERSION: &str = "Unknown";

/// Result of handing a review request to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    /// The platform call was made. The platform may still decline to show
    /// anything (per-period quotas), and there is no way to tell.
    Issued,
    /// No foreground UI context was available, so nothing was called.
    NoForegroundContext,
}

/// The platform's "request a review" capability.
///
/// Always invoked from the task handed to [`crate::UiExecutor`], never from
/// the caller of the engine directly.
pub trait ReviewPresenter: Send + Sync {
    fn request_review(&self) -> PresentOutcome;
}

impl<F> ReviewPresenter for F
where
    F: Fn() -> PresentOutcome + Send + Sync,
{
    fn request_review(&self) -> PresentOutcome {
        self()
    }
}

/// Application metadata provided by the host.
pub trait AppMetadata: Send + Sync {
    /// Current version identifier, if the host can determine one.
    fn current_version(&self) -> Option<String>;
}

/// Metadata with a version fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadata {
    version: Option<String>,
}

impl StaticMetadata {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
        }
    }

    /// Metadata that never knows the version.
    pub fn unavailable() -> Self {
        Self { version: None }
    }
}

impl AppMetadata for StaticMetadata {
    fn current_version(&self) -> Option<String> {
        self.version.clone()
    }
}

/// Resolve the version the engine should compare and persist.
pub(crate) fn version_or_unknown(metadata: &dyn AppMetadata) -> String {
    metadata
        .current_version()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
}
