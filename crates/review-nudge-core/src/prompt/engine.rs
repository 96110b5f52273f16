//! Prompt engine implementation.
//!
//! The engine is owned by the host for the life of the process; there is no
//! global instance. It never presents UI itself: when the gate passes it
//! hands a task to the [`UiExecutor`], and that task calls the presenter and
//! stamps the cooldown once the platform call has been issued.
//!
//! ## Usage
//!
//! ```ignore
//! let engine = PromptEngine::builder(store, presenter)
//!     .metadata(Arc::new(StaticMetadata::new("1.4.0")))
//!     .build()?;
//! engine.on_launch()?;
//! // later, after the user completes something meaningful
//! engine.on_significant_action()?;
//! ```
//!
//! "Issued" is all the engine ever learns. A platform that silently declines
//! because of its own quota still starts a full cooldown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::gate::{self, BlockReason, GateDecision};
use super::state::{PromptSnapshot, PromptState};
use crate::calendar::{calendar_days_between, Clock, SystemClock};
use crate::dispatch::{InlineExecutor, UiExecutor};
use crate::error::Result;
use crate::host::{version_or_unknown, AppMetadata, PresentOutcome, ReviewPresenter, StaticMetadata};
use crate::policy::ThresholdPolicy;
use crate::storage::KeyValueStore;

/// Decides when to ask for a review and keeps the persisted counters.
pub struct PromptEngine {
    store: Arc<dyn KeyValueStore>,
    policy: ThresholdPolicy,
    presenter: Arc<dyn ReviewPresenter>,
    executor: Arc<dyn UiExecutor>,
    metadata: Arc<dyn AppMetadata>,
    clock: Arc<dyn Clock>,
    /// Set while a gate run or a dispatched request is in flight.
    pending: Arc<AtomicBool>,
}

/// Builder for [`PromptEngine`].
///
/// Store and presenter are required. Defaults: [`ThresholdPolicy::default`],
/// [`InlineExecutor`], no version metadata, [`SystemClock`].
pub struct PromptEngineBuilder {
    store: Arc<dyn KeyValueStore>,
    presenter: Arc<dyn ReviewPresenter>,
    policy: ThresholdPolicy,
    executor: Arc<dyn UiExecutor>,
    metadata: Arc<dyn AppMetadata>,
    clock: Arc<dyn Clock>,
}

impl PromptEngineBuilder {
    pub fn policy(mut self, policy: ThresholdPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn executor(mut self, executor: Arc<dyn UiExecutor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn metadata(mut self, metadata: Arc<dyn AppMetadata>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the engine, anchoring the first launch date on a fresh store.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn build(self) -> Result<PromptEngine> {
        let engine = PromptEngine {
            store: self.store,
            policy: self.policy,
            presenter: self.presenter,
            executor: self.executor,
            metadata: self.metadata,
            clock: self.clock,
            pending: Arc::new(AtomicBool::new(false)),
        };

        let now = engine.clock.now();
        if engine.state().ensure_first_launch_date(now)? {
            info!(first_launch = %now, "first launch date recorded");
        }
        Ok(engine)
    }
}

/// Clears the pending flag when dropped: on a blocked or failed gate run,
/// or when the dispatched task finishes or is discarded.
struct PendingGuard(Arc<AtomicBool>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl PromptEngine {
    pub fn builder(
        store: Arc<dyn KeyValueStore>,
        presenter: Arc<dyn ReviewPresenter>,
    ) -> PromptEngineBuilder {
        PromptEngineBuilder {
            store,
            presenter,
            policy: ThresholdPolicy::default(),
            executor: Arc::new(InlineExecutor),
            metadata: Arc::new(StaticMetadata::unavailable()),
            clock: Arc::new(SystemClock),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn policy(&self) -> &ThresholdPolicy {
        &self.policy
    }

    /// Current persisted values and derived day counts.
    pub fn snapshot(&self) -> Result<PromptSnapshot> {
        Ok(self.state().snapshot(&*self.clock)?)
    }

    /// Run the full gate without dispatching or stamping anything.
    pub fn evaluate(&self) -> Result<GateDecision> {
        let version = version_or_unknown(&*self.metadata);
        let snapshot = self.snapshot()?;
        let decision = match gate::evaluate(&snapshot, &self.policy, &version) {
            Err(reason) => GateDecision::Blocked(reason),
            Ok(()) if self.pending.load(Ordering::Acquire) => {
                GateDecision::Blocked(BlockReason::RequestPending)
            }
            Ok(()) => GateDecision::Eligible { version },
        };
        Ok(decision)
    }

    // ── Host events ──────────────────────────────────────────────────

    /// Record one app launch. Returns the new launch count.
    pub fn on_launch(&self) -> Result<u64> {
        let launches = self.state().record_launch()?;
        debug!(launches, "app launch recorded");
        Ok(launches)
    }

    /// Record one significant action, then run the full gate.
    pub fn on_significant_action(&self) -> Result<GateDecision> {
        let actions = self.state().record_action()?;
        debug!(actions, "significant action recorded");
        self.request_review_if_eligible()
    }

    /// Cheap launch and first-use pre-check, then the full gate.
    ///
    /// The pre-check only ever rejects; prompting goes through the same
    /// gate as [`Self::on_significant_action`].
    pub fn on_app_became_active(&self) -> Result<GateDecision> {
        let state = self.state();

        let launches = state.launch_count()?;
        let days = state
            .first_launch_date()?
            .map(|first| calendar_days_between(&*self.clock, first, self.clock.now()));

        let precheck = gate::check_launches(launches, &self.policy)
            .and_then(|()| gate::check_first_use(days, &self.policy));
        if let Err(reason) = precheck {
            debug!(%reason, "activation pre-check blocked review prompt");
            return Ok(GateDecision::Blocked(reason));
        }

        self.request_review_if_eligible()
    }

    /// Remove every persisted prompt field, back to fresh-install state.
    ///
    /// The first launch date is not re-created here; the next engine built
    /// on this store sets it.
    pub fn reset_review_prompt_counters(&self) -> Result<()> {
        self.state().clear()?;
        info!("review prompt state reset");
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn state(&self) -> PromptState<'_> {
        PromptState::new(&*self.store)
    }

    fn request_review_if_eligible(&self) -> Result<GateDecision> {
        // Claim before reading state, so no caller can act on a read taken
        // while another request was in flight.
        if self
            .pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("review request already in flight");
            return Ok(GateDecision::Blocked(BlockReason::RequestPending));
        }
        // Released on any early return, or handed to the UI task.
        let guard = PendingGuard(Arc::clone(&self.pending));

        let version = version_or_unknown(&*self.metadata);
        let snapshot = self.snapshot()?;

        if let Err(reason) = gate::evaluate(&snapshot, &self.policy, &version) {
            debug!(%reason, "review prompt blocked");
            return Ok(GateDecision::Blocked(reason));
        }

        self.dispatch_request(version.clone(), guard);
        Ok(GateDecision::Dispatched { version })
    }

    fn dispatch_request(&self, version: String, guard: PendingGuard) {
        let store = Arc::clone(&self.store);
        let presenter = Arc::clone(&self.presenter);
        let clock = Arc::clone(&self.clock);

        info!(%version, "dispatching review request to UI context");
        self.executor.dispatch(Box::new(move || {
            let _guard = guard;
            match presenter.request_review() {
                PresentOutcome::Issued => {
                    let now = clock.now();
                    match PromptState::new(&*store).stamp_request(now, &version) {
                        Ok(()) => info!(%version, requested_at = %now, "review requested"),
                        Err(e) => warn!(error = %e, "review requested but cooldown was not stamped"),
                    }
                }
                PresentOutcome::NoForegroundContext => {
                    info!("no foreground UI context; review request not issued");
                }
            }
        }));
    }
}
