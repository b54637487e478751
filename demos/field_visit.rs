//! A caregiver's visit, start to finish, against in-memory collaborators.
//!
//! Run with `RUST_LOG=caretrack=debug` to see the engine's logs.

use caretrack::format::{format_elapsed, format_slot_duration, format_time_range, format_visit_date};
use caretrack::testing::{InMemoryVisitStore, ScriptedLocation};
use caretrack::{
    ActionKind, EngineConfig, ScheduledSlot, Task, TaskId, TaskStatus, Visit, VisitId,
    VisitLifecycle,
};
use chrono::{Duration, Utc};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("caretrack=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let start = Utc::now();
    let visit = Visit::scheduled("visit-1", ScheduledSlot::new(start, start + Duration::minutes(90))?)
        .with_service_name("Personal care")
        .with_client_name("Ada Lovelace")
        .with_task(Task::pending("t1", "Medication", "Morning dose"))
        .with_task(Task::pending("t2", "Lunch", "Prepare and serve lunch"));

    let config = EngineConfig::builder().display_offset_minutes(60).build()?;
    let offset = config.display_offset();
    let engine = VisitLifecycle::with_config(
        ScriptedLocation::at(51.5072, -0.1276),
        InMemoryVisitStore::new().with_visit(visit),
        config,
    );

    let tracked = engine.load(&VisitId::new("visit-1")).await?;
    let current = tracked.current();
    println!(
        "{} for {} on {}, {} ({})",
        current.service_name,
        current.client_name,
        format_visit_date(current.scheduled_slot.from(), offset),
        format_time_range(&current.scheduled_slot, offset),
        format_slot_duration(&current.scheduled_slot),
    );

    let steps: Vec<(ActionKind, _)> = vec![
        (ActionKind::CheckIn, engine.perform_check_in(&tracked).await),
        (
            ActionKind::UpdateTask,
            engine
                .perform_task_update(&tracked, &TaskId::new("t1"), TaskStatus::Completed, Some("taken with water".into()))
                .await,
        ),
        (ActionKind::Cancel, engine.perform_cancel(&tracked).await),
        (
            ActionKind::SaveNote,
            engine.perform_save_note(&tracked, "Client in good spirits").await,
        ),
        (ActionKind::CheckOut, engine.perform_check_out(&tracked).await),
    ];

    for (action, outcome) in &steps {
        let notice = engine.notice(*action, outcome);
        println!("[{:?}] {}", notice.tone, notice.message);
    }

    let visit = tracked.current();
    if let (Some(checkin), Some(checkout)) = (visit.checkin_time, visit.checkout_time) {
        println!("time on site: {}", format_elapsed(checkin, checkout));
    }
    let progress = visit.task_progress();
    println!("tasks: {}/{} completed", progress.completed, progress.total);
    println!("badge: {}", tracked.view().status_badge.label);

    Ok(())
}
