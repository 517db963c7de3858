//! Applying a settings form submission.

use std::collections::HashMap;

use gcalsync_core::CalendarSelection;
use gcalsync_providers::Credentials;
use tracing::{debug, info};

use crate::error::SyncResult;
use crate::service::{CalendarSync, RebuildReport};

/// One calendar row of a settings submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarChoice {
    /// Calendar id.
    pub id: String,
    /// Whether the calendar is checked.
    pub selected: bool,
    /// Display order weight.
    pub weight: i64,
}

impl CalendarChoice {
    /// Creates a checked calendar row.
    pub fn selected(id: impl Into<String>, weight: i64) -> Self {
        Self {
            id: id.into(),
            selected: true,
            weight,
        }
    }

    /// Creates an unchecked calendar row.
    pub fn unselected(id: impl Into<String>, weight: i64) -> Self {
        Self {
            id: id.into(),
            selected: false,
            weight,
        }
    }
}

/// A settings submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsUpdate {
    /// Client credentials to store.
    pub credentials: Credentials,
    /// Verification code to exchange, if one was entered.
    pub verification_code: Option<String>,
    /// New calendar selection; `None` leaves the stored selection alone.
    pub calendars: Option<Vec<CalendarChoice>>,
    /// Force-refresh every calendar after storing.
    pub rebuild_cache: bool,
    /// Clear the verification code and token.
    pub revoke_access: bool,
}

/// What [`SettingsUpdate::apply`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// A verification code was exchanged and the token stored.
    pub token_exchanged: bool,
    /// Number of calendars now selected, if the selection was updated.
    pub selected_calendars: Option<usize>,
    /// Rebuild results, if a rebuild was requested.
    pub rebuild: Option<RebuildReport>,
    /// Access was revoked.
    pub revoked: bool,
}

impl SettingsUpdate {
    /// Creates a submission that only stores `credentials`.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            verification_code: None,
            calendars: None,
            rebuild_cache: false,
            revoke_access: false,
        }
    }

    /// Builder method to submit a verification code.
    pub fn with_verification_code(mut self, code: impl Into<String>) -> Self {
        self.verification_code = Some(code.into());
        self
    }

    /// Builder method to submit calendar rows.
    pub fn with_calendars(mut self, calendars: Vec<CalendarChoice>) -> Self {
        self.calendars = Some(calendars);
        self
    }

    /// Builder method to request a cache rebuild.
    pub fn with_rebuild_cache(mut self) -> Self {
        self.rebuild_cache = true;
        self
    }

    /// Builder method to request access revocation.
    pub fn with_revoke_access(mut self) -> Self {
        self.revoke_access = true;
        self
    }

    /// Stores the submission through `sync` and saves the config.
    ///
    /// Steps run in order: credentials, verification code exchange,
    /// calendar selection, rebuild, revoke, save. A failed code exchange
    /// stops the submission before anything is saved.
    pub async fn apply(self, sync: &CalendarSync) -> SyncResult<SubmitOutcome> {
        let settings = sync.settings();
        let mut outcome = SubmitOutcome::default();

        settings.set_credentials(&self.credentials);

        if let Some(code) = self.verification_code.as_deref().map(str::trim)
            && !code.is_empty()
        {
            settings.set_verification_code(code);
            if let Some(token) = sync.exchange_code(code).await? {
                settings.set_access_token(Some(&token))?;
                outcome.token_exchanged = true;
                info!("verification code exchanged");
            }
        }

        if self.calendars.is_some() || self.rebuild_cache {
            let session = sync.validate().await;

            if let Some(choices) = self.calendars {
                let remote: HashMap<String, String> = sync
                    .list_calendars(&session)
                    .await
                    .into_iter()
                    .map(|calendar| (calendar.id, calendar.name))
                    .collect();
                let previous: HashMap<String, String> = settings
                    .calendar_selection()
                    .into_iter()
                    .map(|selection| (selection.id, selection.name))
                    .collect();

                let selection: Vec<CalendarSelection> = choices
                    .into_iter()
                    .filter(|choice| choice.selected)
                    .map(|choice| {
                        let name = remote
                            .get(&choice.id)
                            .or_else(|| previous.get(&choice.id))
                            .cloned()
                            .unwrap_or_default();
                        CalendarSelection::new(choice.id, name, choice.weight)
                    })
                    .collect();

                debug!(count = selection.len(), "storing calendar selection");
                settings.set_calendar_selection(&selection)?;
                outcome.selected_calendars = Some(selection.len());
            }

            if self.rebuild_cache {
                outcome.rebuild = Some(sync.rebuild_all(&session).await);
            }
        }

        if self.revoke_access {
            settings.revoke();
            outcome.revoked = true;
            info!("account access revoked");
        }

        settings.save()?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::service::SyncOptions;
    use crate::store::{MemoryConfigStore, MemoryStateStore};
    use chrono::{DateTime, TimeZone, Utc};
    use gcalsync_core::FixedClock;
    use gcalsync_providers::mock::MockProvider;
    use gcalsync_providers::{ProviderError, RawEvent, RawEventTime, Token};
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn setup(mock: &MockProvider) -> (CalendarSync, Arc<MemoryConfigStore>) {
        let config = Arc::new(MemoryConfigStore::new());
        let sync = CalendarSync::with_clock(
            config.clone(),
            Arc::new(MemoryStateStore::new()),
            Arc::new(mock.clone()),
            SyncOptions::default(),
            Arc::new(FixedClock(now())),
        );
        (sync, config)
    }

    fn credentials() -> Credentials {
        Credentials::new("id.apps.googleusercontent.com", "secret")
    }

    #[tokio::test]
    async fn credentials_only() {
        let mock = MockProvider::new();
        let (sync, config) = setup(&mock);

        let outcome = SettingsUpdate::new(credentials()).apply(&sync).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::default());
        assert!(sync.has_credentials());
        assert_eq!(config.save_count(), 1);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn code_is_exchanged_and_calendars_named_from_remote() {
        let mock = MockProvider::new()
            .with_code_token(Token::new("ya29").with_expires_in(now(), 3600))
            .with_calendar("team@x", "Team")
            .with_calendar("primary@x", "Me");
        let (sync, _) = setup(&mock);

        let outcome = SettingsUpdate::new(credentials())
            .with_verification_code(" 4/code ")
            .with_calendars(vec![
                CalendarChoice::selected("team@x", 3),
                CalendarChoice::unselected("primary@x", 1),
            ])
            .apply(&sync)
            .await
            .unwrap();

        assert!(outcome.token_exchanged);
        assert_eq!(outcome.selected_calendars, Some(1));
        assert_eq!(mock.code_exchanges(), 1);
        assert_eq!(sync.settings().verification_code().as_deref(), Some("4/code"));
        assert_eq!(sync.settings().access_token().unwrap().access_token, "ya29");
        assert_eq!(
            sync.available_calendars(),
            vec![CalendarSelection::new("team@x", "Team", 3)]
        );
    }

    #[tokio::test]
    async fn failed_exchange_is_returned_and_nothing_saved() {
        let mock = MockProvider::new().with_code_error(ProviderError::network("offline"));
        let (sync, config) = setup(&mock);

        let err = SettingsUpdate::new(credentials())
            .with_verification_code("4/code")
            .apply(&sync)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::TokenExchangeFailed { .. }));
        assert_eq!(config.save_count(), 0);
    }

    #[tokio::test]
    async fn rebuild_then_revoke() {
        let mock = MockProvider::new()
            .with_calendar("team@x", "Team")
            .with_events(
                "team@x",
                vec![RawEvent::new(
                    "Review",
                    RawEventTime::date_time("2025-03-10T15:00:00Z"),
                    RawEventTime::date_time("2025-03-10T16:00:00Z"),
                )],
            );
        let (sync, _) = setup(&mock);

        let outcome = SettingsUpdate::new(credentials())
            .with_verification_code("4/code")
            .with_rebuild_cache()
            .with_revoke_access()
            .apply(&sync)
            .await
            .unwrap();

        assert_eq!(outcome.rebuild.map(|report| report.refreshed()), Some(1));
        assert!(outcome.revoked);
        assert!(sync.settings().access_token().is_none());
        assert!(sync.settings().verification_code().is_none());
        assert_eq!(sync.cache().entry("team@x").unwrap().events.len(), 1);
    }
}
