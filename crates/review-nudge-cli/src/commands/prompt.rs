//! Host-event simulation against the on-disk store.
//!
//! Every invocation is one "process": the engine is built, handles a single
//! event, and is dropped. The review prompt is "shown" by printing a line.

use std::sync::Arc;

use review_nudge_core::{
    AppMetadata, Config, GateDecision, PresentOutcome, PromptEngine, ReviewPresenter,
    SqliteStore, StaticMetadata,
};

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Presents the review request on stdout.
struct ConsolePresenter;

impl ReviewPresenter for ConsolePresenter {
    fn request_review(&self) -> PresentOutcome {
        println!("* review requested *");
        PresentOutcome::Issued
    }
}

fn open_engine(app_version: Option<String>) -> CliResult<PromptEngine> {
    let config = Config::load()?;
    let metadata: Arc<dyn AppMetadata> = match app_version.or(config.app.version) {
        Some(version) => Arc::new(StaticMetadata::new(version)),
        None => Arc::new(StaticMetadata::unavailable()),
    };
    let store = SqliteStore::open()?;

    let engine = PromptEngine::builder(Arc::new(store), Arc::new(ConsolePresenter))
        .policy(config.policy)
        .metadata(metadata)
        .build()?;
    Ok(engine)
}

fn print_decision(decision: &GateDecision) {
    println!("{decision}");
}

pub fn launch(app_version: Option<String>) -> CliResult {
    let engine = open_engine(app_version)?;
    let launches = engine.on_launch()?;
    println!("launches: {launches}");
    Ok(())
}

pub fn action(app_version: Option<String>) -> CliResult {
    let engine = open_engine(app_version)?;
    print_decision(&engine.on_significant_action()?);
    Ok(())
}

pub fn active(app_version: Option<String>) -> CliResult {
    let engine = open_engine(app_version)?;
    print_decision(&engine.on_app_became_active()?);
    Ok(())
}

pub fn status(app_version: Option<String>, json: bool) -> CliResult {
    let engine = open_engine(app_version)?;
    let snapshot = engine.snapshot()?;
    let decision = engine.evaluate()?;

    if json {
        let out = serde_json::json!({
            "state": snapshot,
            "policy": engine.policy(),
            "decision": decision,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let date = |d: Option<chrono::DateTime<chrono::Utc>>| {
        d.map(|d| d.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    let days = |d: Option<i64>| d.map(|d| format!(" ({d} day(s) ago)")).unwrap_or_default();
    let policy = engine.policy();

    println!(
        "launches:            {} / {}",
        snapshot.app_launch_count,
        policy.min_launches_before_prompt()
    );
    println!(
        "significant actions: {} / {}",
        snapshot.significant_action_count,
        policy.min_significant_actions_before_prompt()
    );
    println!(
        "first launch:        {}{}",
        date(snapshot.first_launch_date),
        days(snapshot.days_since_first_launch)
    );
    println!(
        "last request:        {}{}",
        date(snapshot.last_review_request_date),
        days(snapshot.days_since_last_request)
    );
    println!(
        "last version:        {}",
        snapshot.last_version_prompted_for_review.as_deref().unwrap_or("-")
    );
    println!("decision:            {decision}");
    Ok(())
}

pub fn reset(app_version: Option<String>) -> CliResult {
    let engine = open_engine(app_version)?;
    engine.reset_review_prompt_counters()?;
    println!("review prompt state reset");
    Ok(())
}
