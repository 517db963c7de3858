//! Remote calendar list merged with the operator's selection.

use std::collections::HashMap;
use std::time::Duration;

use gcalsync_core::{CalendarRef, CalendarSelection, CatalogEntry};
use tracing::{debug, warn};

use crate::deadline::with_timeout;
use crate::token_manager::AuthSession;

/// Lists calendars visible to the account.
#[derive(Debug, Clone)]
pub struct CalendarCatalog {
    timeout: Duration,
}

impl CalendarCatalog {
    /// Creates a catalog whose remote calls are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Lists remote calendars in provider order.
    ///
    /// Best effort: returns an empty list when unauthenticated or when the
    /// provider fails.
    pub async fn list_remote_calendars(&self, session: &AuthSession) -> Vec<CalendarRef> {
        let Some((client, access_token)) = session.authorized() else {
            debug!("not authenticated, no calendars to list");
            return Vec::new();
        };

        match with_timeout(self.timeout, client.list_calendars(access_token)).await {
            Ok(calendars) => calendars,
            Err(e) => {
                warn!(error = %e, "failed to list calendars");
                Vec::new()
            }
        }
    }
}

/// Merges remote calendars with `selection`.
///
/// Selected calendars take their configured weight; the others get the
/// length of their id. The result is sorted by ascending weight, keeping
/// provider order among equal weights. Selected calendars that no longer
/// exist remotely are dropped.
pub fn merge_with_selection(
    remote: &[CalendarRef],
    selection: &[CalendarSelection],
) -> Vec<CatalogEntry> {
    let weights: HashMap<&str, i64> = selection
        .iter()
        .map(|selected| (selected.id.as_str(), selected.weight))
        .collect();

    let mut entries: Vec<CatalogEntry> = remote
        .iter()
        .map(|calendar| {
            let configured = weights.get(calendar.id.as_str()).copied();
            CatalogEntry {
                id: calendar.id.clone(),
                name: calendar.name.clone(),
                weight: configured.unwrap_or(calendar.id.len() as i64),
                selected: configured.is_some(),
            }
        })
        .collect();

    // sort_by_key is stable
    entries.sort_by_key(|entry| entry.weight);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcalsync_providers::mock::MockProvider;
    use gcalsync_providers::{CalendarProvider, ProviderError, ProviderFactory};
    use std::sync::Arc;

    fn refs(ids: &[&str]) -> Vec<CalendarRef> {
        ids.iter()
            .map(|id| CalendarRef::new(*id, id.to_uppercase()))
            .collect()
    }

    fn ids(entries: &[CatalogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn unselected_calendars_sort_by_id_length() {
        let merged = merge_with_selection(&refs(&["bb", "a"]), &[]);
        assert_eq!(ids(&merged), vec!["a", "bb"]);
        assert!(merged.iter().all(|e| !e.selected));
        assert_eq!(merged[1].weight, 2);
    }

    #[test]
    fn selected_weights_win() {
        let remote = refs(&["primary@x", "team@x", "holidays"]);
        let selection = vec![
            CalendarSelection::new("team@x", "Team", -5),
            CalendarSelection::new("primary@x", "Primary", 20),
        ];

        let merged = merge_with_selection(&remote, &selection);
        assert_eq!(ids(&merged), vec!["team@x", "holidays", "primary@x"]);
        assert!(merged[0].selected);
        assert!(!merged[1].selected);
        assert_eq!(merged[1].weight, 8);
        assert_eq!(merged[2].name, "PRIMARY@X");
    }

    #[test]
    fn ties_keep_remote_order() {
        let remote = refs(&["cc", "aa", "bb"]);
        let selection = vec![CalendarSelection::new("bb", "", 2)];
        let merged = merge_with_selection(&remote, &selection);
        assert_eq!(ids(&merged), vec!["cc", "aa", "bb"]);
    }

    #[test]
    fn missing_selected_calendars_are_dropped() {
        let selection = vec![CalendarSelection::new("gone", "Gone", 0)];
        let merged = merge_with_selection(&refs(&["a"]), &selection);
        assert_eq!(ids(&merged), vec!["a"]);
    }

    fn session_with(mock: &MockProvider) -> AuthSession {
        let client: Arc<dyn CalendarProvider> = mock
            .build(&gcalsync_providers::Credentials::new("id", "secret"))
            .unwrap();
        AuthSession::for_tests(client, "ya29")
    }

    #[tokio::test]
    async fn lists_remote_calendars() {
        let mock = MockProvider::new()
            .with_calendar("a", "Alpha")
            .with_calendar("b", "Beta");
        let catalog = CalendarCatalog::new(Duration::from_secs(5));

        let calendars = catalog.list_remote_calendars(&session_with(&mock)).await;
        assert_eq!(calendars, vec![CalendarRef::new("a", "Alpha"), CalendarRef::new("b", "Beta")]);
    }

    #[tokio::test]
    async fn provider_errors_become_empty_list() {
        let mock = MockProvider::new().with_calendars_error(ProviderError::server("boom"));
        let catalog = CalendarCatalog::new(Duration::from_secs(5));
        assert!(catalog.list_remote_calendars(&session_with(&mock)).await.is_empty());
    }

    #[tokio::test]
    async fn unauthenticated_session_lists_nothing() {
        let catalog = CalendarCatalog::new(Duration::from_secs(5));
        let calendars = catalog
            .list_remote_calendars(&AuthSession::unauthenticated())
            .await;
        assert!(calendars.is_empty());
    }
}
