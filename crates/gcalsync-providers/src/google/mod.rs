//! Google Calendar provider implementation.
//!
//! This module provides a [`GoogleProvider`] that talks to the Google
//! Calendar API v3 with read-only scope.
//!
//! # Authentication Flow
//!
//! 1. The operator registers an OAuth client and stores its id and secret
//! 2. The user opens [`CalendarProvider::auth_url`](crate::CalendarProvider::auth_url)
//!    and grants access
//! 3. Google displays a verification code (out-of-band redirect)
//! 4. The code is exchanged for access and refresh tokens
//! 5. Expired access tokens are renewed with the refresh token
//!
//! # Example
//!
//! ```ignore
//! use gcalsync_providers::Credentials;
//! use gcalsync_providers::google::{GoogleConfig, GoogleProvider};
//!
//! let credentials = Credentials::new(
//!     "your-client-id.apps.googleusercontent.com",
//!     "your-client-secret",
//! );
//!
//! let provider = GoogleProvider::new(GoogleConfig::new(credentials))?;
//! println!("visit {}", provider.auth_url());
//! let token = provider.exchange_auth_code("4/0Ab...").await?;
//! ```

mod client;
mod config;
mod oauth;
mod provider;

pub use client::{CalendarListEntry, GoogleCalendarClient};
pub use config::GoogleConfig;
pub use oauth::OAuthClient;
pub use provider::{GoogleProvider, GoogleProviderFactory};
