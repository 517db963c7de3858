//! Calendar commands.

use gcalsync_sync::{CalendarChoice, CalendarSync, SettingsUpdate};

use crate::commands::{print_json, require_auth};
use crate::error::{ClientError, ClientResult};

/// Lists remote calendars merged with the selection.
pub async fn list(sync: &CalendarSync, as_json: bool) -> ClientResult<()> {
    let session = sync.validate().await;
    require_auth(&session)?;

    let catalog = sync.catalog(&session).await;
    if as_json {
        return print_json(&catalog);
    }

    if catalog.is_empty() {
        println!("No calendars.");
        return Ok(());
    }
    for entry in &catalog {
        let mark = if entry.selected { "*" } else { " " };
        println!("{} {:>4}  {}  ({})", mark, entry.weight, entry.name, entry.id);
    }
    Ok(())
}

/// Parses `ID` or `ID=WEIGHT` arguments into selected calendar rows.
///
/// Entries without a weight get their position.
pub fn parse_choices(args: &[String]) -> ClientResult<Vec<CalendarChoice>> {
    args.iter()
        .enumerate()
        .map(|(position, arg)| match arg.rsplit_once('=') {
            Some((id, weight)) if !id.is_empty() => {
                let weight = weight.trim().parse::<i64>().map_err(|_| {
                    ClientError::Config(format!("invalid weight in `{}`", arg))
                })?;
                Ok(CalendarChoice::selected(id, weight))
            }
            _ if arg.is_empty() => Err(ClientError::Config("empty calendar id".to_string())),
            _ => Ok(CalendarChoice::selected(arg.as_str(), position as i64)),
        })
        .collect()
}

/// Replaces the calendar selection.
pub async fn select(sync: &CalendarSync, args: &[String], rebuild: bool) -> ClientResult<()> {
    let choices = parse_choices(args)?;
    let mut update = SettingsUpdate::new(sync.settings().credentials()).with_calendars(choices);
    if rebuild {
        update = update.with_rebuild_cache();
    }

    let outcome = update.apply(sync).await?;
    println!(
        "Selected {} calendar(s).",
        outcome.selected_calendars.unwrap_or_default()
    );
    if let Some(report) = outcome.rebuild {
        println!(
            "Refreshed {} of {} calendar(s).",
            report.refreshed(),
            report.outcomes.len()
        );
    }
    Ok(())
}
