//! Today's events and cache rebuild.

use gcalsync_core::Event;
use gcalsync_sync::CalendarSync;
use serde::Serialize;

use crate::commands::{print_json, require_auth};
use crate::error::ClientResult;

#[derive(Debug, Serialize)]
struct CalendarEvents {
    calendar_id: String,
    events: Vec<Event>,
}

/// Prints today's events for one calendar, or for every selected calendar
/// in weight order.
pub async fn today(
    sync: &CalendarSync,
    calendar: Option<String>,
    force: bool,
    as_json: bool,
) -> ClientResult<()> {
    let session = sync.validate().await;
    require_auth(&session)?;

    let calendar_ids = match calendar {
        Some(id) => vec![id],
        None => {
            let mut selection = sync.available_calendars();
            selection.sort_by_key(|selected| selected.weight);
            selection.into_iter().map(|selected| selected.id).collect()
        }
    };

    if calendar_ids.is_empty() {
        println!("No calendars selected: run `gcalsync calendars select`.");
        return Ok(());
    }

    let mut results = Vec::with_capacity(calendar_ids.len());
    for calendar_id in calendar_ids {
        let read = sync.read_today(&session, &calendar_id, force).await;
        results.push(CalendarEvents {
            calendar_id,
            events: read.events,
        });
    }

    if as_json {
        return print_json(&results);
    }

    for (index, calendar) in results.iter().enumerate() {
        if results.len() > 1 {
            if index > 0 {
                println!();
            }
            println!("{}", calendar.calendar_id);
        }
        if calendar.events.is_empty() {
            println!("  No events today.");
        }
        for event in &calendar.events {
            println!("  {}", event);
        }
    }
    Ok(())
}

/// Force-refreshes every calendar.
pub async fn rebuild(sync: &CalendarSync, as_json: bool) -> ClientResult<()> {
    let session = sync.validate().await;
    require_auth(&session)?;

    let report = sync.rebuild_all(&session).await;

    if as_json {
        let outcomes: Vec<_> = report
            .outcomes
            .iter()
            .map(|outcome| {
                serde_json::json!({
                    "calendar_id": outcome.calendar_id,
                    "refreshed": outcome.source.is_refreshed(),
                    "events": outcome.events,
                })
            })
            .collect();
        return print_json(&outcomes);
    }

    println!(
        "Refreshed {} of {} calendar(s).",
        report.refreshed(),
        report.outcomes.len()
    );
    let failed = report.failed();
    if !failed.is_empty() {
        println!("No events fetched for: {}", failed.join(", "));
    }
    Ok(())
}
