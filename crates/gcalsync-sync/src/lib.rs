//! Google Calendar sync core: token lifecycle, calendar catalog, event
//! fetching and a per-day event cache.
//!
//! - [`TokenManager`] builds a provider client from stored credentials and
//!   validates, refreshes or exchanges the OAuth token, yielding an
//!   [`AuthSession`]
//! - [`CalendarCatalog`] lists remote calendars and merges them with the
//!   operator's selection
//! - [`EventFetcher`] queries events in a time window and normalizes them
//! - [`EventCache`] keeps today's events per calendar in a [`StateStore`]
//! - [`CalendarSync`] wires them together; [`SettingsUpdate`] applies a
//!   settings submission
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use gcalsync_providers::google::GoogleProviderFactory;
//! use gcalsync_sync::{CalendarSync, JsonFileConfigStore, JsonFileStateStore, SyncOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sync = CalendarSync::new(
//!         Arc::new(JsonFileConfigStore::open("settings.json")?),
//!         Arc::new(JsonFileStateStore::open("state.json")?),
//!         Arc::new(GoogleProviderFactory::default()),
//!         SyncOptions::default(),
//!     );
//!
//!     let session = sync.validate().await;
//!     for event in sync.today_events(&session, "primary", false).await {
//!         println!("{event}");
//!     }
//!     Ok(())
//! }
//! ```

mod cache;
mod catalog;
mod deadline;
mod error;
mod fetcher;
mod service;
mod settings;
mod store;
mod submit;
mod token_manager;

pub use cache::{CacheSource, DayCacheEntry, EventCache, TodayEvents};
pub use catalog::{CalendarCatalog, merge_with_selection};
pub use error::{SyncError, SyncResult};
pub use fetcher::{EventFetcher, FetchParams};
pub use service::{
    CalendarSync, DEFAULT_REQUEST_TIMEOUT, RebuildOutcome, RebuildReport, SyncOptions,
};
pub use settings::{
    ACCESS_TOKEN_KEY, CALENDARS_KEY, CLIENT_ID_KEY, CLIENT_SECRET_KEY, Settings,
    VERIFICATION_CODE_KEY,
};
pub use store::{
    ConfigStore, JsonFileConfigStore, JsonFileStateStore, MemoryConfigStore, MemoryStateStore,
    StateStore,
};
pub use submit::{CalendarChoice, SettingsUpdate, SubmitOutcome};
pub use token_manager::{AuthSession, TokenManager};
