//! CalendarProvider trait and implementations.
//!
//! This crate provides the abstraction layer for the remote calendar service:
//!
//! - [`CalendarProvider`] - The trait the sync core talks to
//! - [`Token`] / [`Credentials`] - OAuth material
//! - [`RawEvent`] - Events as the provider sent them
//! - [`normalize_event`] - Conversion to display-ready [`gcalsync_core::Event`]s
//! - [`ProviderError`] - Error types for provider operations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐
//! │  Google API     │    │   test script   │
//! └────────┬────────┘    └────────┬────────┘
//!          │                      │
//!          ▼                      ▼
//! ┌─────────────────┐    ┌─────────────────┐
//! │ GoogleProvider  │    │  MockProvider   │
//! └────────┬────────┘    └────────┬────────┘
//!          │   CalendarProvider   │
//!          └──────────┬───────────┘
//!                     ▼
//!              ┌─────────────┐
//!              │  RawEvent   │
//!              └──────┬──────┘
//!                     ▼ normalize_event()
//!              ┌─────────────┐
//!              │    Event    │
//!              └─────────────┘
//! ```

pub mod credentials;
pub mod error;
#[cfg(feature = "google")]
pub mod google;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod normalize;
pub mod provider;
pub mod raw_event;
pub mod token;

// Re-export main types at crate root
pub use credentials::Credentials;
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use normalize::{normalize_event, normalize_event_in, normalize_events};
pub use provider::{
    BoxFuture, CalendarProvider, DEFAULT_MAX_RESULTS, EventOrder, EventQuery,
    ProviderFactory,
};
pub use raw_event::{RawEvent, RawEventTime};
pub use token::{NETWORK_ERROR, Token};
