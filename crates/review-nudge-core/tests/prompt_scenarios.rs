//! End-to-end gate scenarios.
//!
//! Each test drives a fresh engine through host events with a settable
//! clock and checks both the decision and what ended up in the store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use review_nudge_core::prompt::keys;
use review_nudge_core::Clock;
use review_nudge_core::{
    BlockReason, FixedClock, GateDecision, KeyValueStore, MemoryStore, PresentOutcome,
    PromptEngine, ReviewPresenter, StaticMetadata, ThresholdPolicy,
};

#[derive(Default)]
struct RecordingPresenter {
    calls: AtomicUsize,
}

impl ReviewPresenter for RecordingPresenter {
    fn request_review(&self) -> PresentOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        PresentOutcome::Issued
    }
}

struct App {
    store: Arc<MemoryStore>,
    presenter: Arc<RecordingPresenter>,
    clock: Arc<FixedClock>,
}

fn install_day() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 2, 9, 30, 0).unwrap()
}

impl App {
    fn fresh() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            presenter: Arc::new(RecordingPresenter::default()),
            clock: Arc::new(FixedClock::new(install_day())),
        }
    }

    fn engine(&self, version: &str) -> PromptEngine {
        PromptEngine::builder(self.store.clone(), self.presenter.clone())
            .policy(ThresholdPolicy::default())
            .metadata(Arc::new(StaticMetadata::new(version)))
            .clock(self.clock.clone())
            .build()
            .unwrap()
    }

    fn prompts(&self) -> usize {
        self.presenter.calls.load(Ordering::SeqCst)
    }

    fn stored(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap()
    }
}

fn launch(engine: &PromptEngine, times: usize) {
    for _ in 0..times {
        engine.on_launch().unwrap();
    }
}

fn act(engine: &PromptEngine, times: usize) -> GateDecision {
    let mut last = None;
    for _ in 0..times {
        last = Some(engine.on_significant_action().unwrap());
    }
    last.expect("at least one action")
}

#[test]
fn scenario_a_fresh_install_reaches_prompt() {
    let app = App::fresh();
    let engine = app.engine("1.0");
    app.clock.advance(Duration::days(8));

    launch(&engine, 5);
    let decision = act(&engine, 3);

    assert_eq!(decision, GateDecision::Dispatched { version: "1.0".into() });
    assert_eq!(app.prompts(), 1);
    assert!(app.stored(keys::LAST_REVIEW_REQUEST_DATE).is_some());
    assert_eq!(app.stored(keys::LAST_VERSION_PROMPTED).as_deref(), Some("1.0"));
}

#[test]
fn scenario_b_one_launch_short() {
    let app = App::fresh();
    let engine = app.engine("1.0");
    app.clock.advance(Duration::days(8));

    launch(&engine, 4);
    let decision = act(&engine, 3);

    assert_eq!(
        decision,
        GateDecision::Blocked(BlockReason::TooFewLaunches {
            launches: 4,
            required: 5
        })
    );
    assert_eq!(app.prompts(), 0);
    assert!(app.stored(keys::LAST_REVIEW_REQUEST_DATE).is_none());
    assert!(app.stored(keys::LAST_VERSION_PROMPTED).is_none());
}

#[test]
fn scenario_c_next_day_is_in_cooldown() {
    let app = App::fresh();
    let engine = app.engine("1.0");
    app.clock.advance(Duration::days(8));
    launch(&engine, 5);
    act(&engine, 3);
    assert_eq!(app.prompts(), 1);

    app.clock.advance(Duration::days(1));
    launch(&engine, 3);
    let decision = act(&engine, 1);

    assert_eq!(
        decision,
        GateDecision::Blocked(BlockReason::Cooldown {
            days_since_last_request: 1,
            required: 90
        })
    );
    assert_eq!(app.prompts(), 1);
}

#[test]
fn scenario_d_new_version_waits_for_maturity() {
    let app = App::fresh();
    let now = install_day();
    app.store
        .set(keys::FIRST_LAUNCH_DATE, &(now - Duration::days(2)).to_rfc3339())
        .unwrap();
    app.store
        .set(keys::LAST_REVIEW_REQUEST_DATE, &(now - Duration::days(200)).to_rfc3339())
        .unwrap();
    app.store.set(keys::LAST_VERSION_PROMPTED, "1.0").unwrap();
    app.store.set(keys::APP_LAUNCH_COUNT, "40").unwrap();
    app.store.set(keys::SIGNIFICANT_ACTION_COUNT, "20").unwrap();

    let engine = app.engine("2.0");
    let decision = act(&engine, 1);

    assert_eq!(
        decision,
        GateDecision::Blocked(BlockReason::FirstUseTooRecent {
            days_since_first_launch: 2,
            required: 7
        })
    );
    assert_eq!(app.prompts(), 0);
}

#[test]
fn same_version_skips_maturity_but_not_cooldown() {
    let app = App::fresh();
    let now = install_day();
    app.store
        .set(keys::FIRST_LAUNCH_DATE, &(now - Duration::days(2)).to_rfc3339())
        .unwrap();
    app.store
        .set(keys::LAST_REVIEW_REQUEST_DATE, &(now - Duration::days(30)).to_rfc3339())
        .unwrap();
    app.store.set(keys::LAST_VERSION_PROMPTED, "1.0").unwrap();
    app.store.set(keys::APP_LAUNCH_COUNT, "40").unwrap();
    app.store.set(keys::SIGNIFICANT_ACTION_COUNT, "20").unwrap();

    // A maturity window the install can never reach within this test
    let engine = PromptEngine::builder(app.store.clone(), app.presenter.clone())
        .policy(ThresholdPolicy::new(5, 3, 365, 90))
        .metadata(Arc::new(StaticMetadata::new("1.0")))
        .clock(app.clock.clone())
        .build()
        .unwrap();
    assert!(matches!(
        act(&engine, 1).block_reason(),
        Some(BlockReason::Cooldown { .. })
    ));

    // Once the cooldown lapses the young install date no longer matters
    app.clock.advance(Duration::days(60));
    assert_eq!(act(&engine, 1), GateDecision::Dispatched { version: "1.0".into() });
    assert_eq!(app.prompts(), 1);
}

#[test]
fn cooldown_failure_short_circuits_everything() {
    let app = App::fresh();
    app.store
        .set(keys::LAST_REVIEW_REQUEST_DATE, &install_day().to_rfc3339())
        .unwrap();
    let engine = app.engine("1.0");

    // Counts are far below thresholds, yet cooldown is what gets reported
    let decision = act(&engine, 1);
    assert!(matches!(decision.block_reason(), Some(BlockReason::Cooldown { .. })));
    assert_eq!(app.prompts(), 0);
    assert_eq!(
        app.stored(keys::LAST_REVIEW_REQUEST_DATE),
        Some(install_day().to_rfc3339())
    );
}

#[test]
fn maturity_counts_calendar_days_not_elapsed_hours() {
    let app = App::fresh();
    // Installed late in the evening
    app.clock.set(Utc.with_ymd_and_hms(2026, 2, 2, 23, 0, 0).unwrap());
    let engine = PromptEngine::builder(app.store.clone(), app.presenter.clone())
        .policy(ThresholdPolicy::new(0, 0, 2, 90))
        .metadata(Arc::new(StaticMetadata::new("1.0")))
        .clock(app.clock.clone())
        .build()
        .unwrap();

    // 26 hours later: one elapsed day, two calendar days
    app.clock.advance(Duration::hours(26));
    assert_eq!(act(&engine, 1), GateDecision::Dispatched { version: "1.0".into() });
}

#[test]
fn activation_then_action_flow() {
    let app = App::fresh();
    let engine = app.engine("1.0");

    launch(&engine, 5);
    assert!(matches!(
        engine.on_app_became_active().unwrap().block_reason(),
        Some(BlockReason::FirstUseTooRecent { .. })
    ));

    app.clock.advance(Duration::days(7));
    act(&engine, 2);
    assert!(matches!(
        engine.on_app_became_active().unwrap().block_reason(),
        Some(BlockReason::TooFewActions { .. })
    ));

    act(&engine, 1);
    assert_eq!(app.prompts(), 1);
    assert!(matches!(
        engine.on_app_became_active().unwrap().block_reason(),
        Some(BlockReason::Cooldown { .. })
    ));
}

#[test]
fn reset_twice_equals_reset_once() {
    let app = App::fresh();
    let engine = app.engine("1.0");
    app.clock.advance(Duration::days(8));
    launch(&engine, 5);
    act(&engine, 3);

    engine.reset_review_prompt_counters().unwrap();
    let once = app.store.entries().unwrap();
    engine.reset_review_prompt_counters().unwrap();
    let twice = app.store.entries().unwrap();

    assert!(once.is_empty());
    assert_eq!(once, twice);

    // Reset does not recreate the anchor; the next engine does
    assert!(engine.snapshot().unwrap().first_launch_date.is_none());
    let rebuilt = app.engine("1.0");
    assert_eq!(rebuilt.snapshot().unwrap().first_launch_date, Some(app.clock.now()));
}

#[test]
fn partially_migrated_store_is_tolerated() {
    let store: MemoryStore = [(keys::APP_LAUNCH_COUNT, "12")].into_iter().collect();
    let app = App {
        store: Arc::new(store),
        presenter: Arc::new(RecordingPresenter::default()),
        clock: Arc::new(FixedClock::new(install_day())),
    };
    let engine = app.engine("1.0");
    let snapshot = engine.snapshot().unwrap();
    assert_eq!(snapshot.app_launch_count, 12);
    assert_eq!(snapshot.significant_action_count, 0);
    assert_eq!(snapshot.first_launch_date, Some(install_day()));
}
