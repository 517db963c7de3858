//! Google Calendar API client.
//!
//! Low-level HTTP access to the Calendar v3 API: request building, status
//! classification and response parsing. Tokens are passed per call.

use std::time::Duration;

use gcalsync_core::CalendarRef;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::EventQuery;
use crate::raw_event::RawEvent;

/// Google Calendar API client.
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    api_base: String,
}

impl GoogleCalendarClient {
    /// Creates a client for the API rooted at `api_base`.
    pub fn new(http_client: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            http_client,
            api_base: api_base.into(),
        }
    }

    /// Lists events from a calendar.
    ///
    /// Returns at most `query.max_results` events in the order the API
    /// returned them.
    pub async fn list_events(
        &self,
        access_token: &str,
        query: &EventQuery,
    ) -> ProviderResult<Vec<RawEvent>> {
        let url = events_url(&self.api_base, &query.calendar_id);

        let mut params = vec![
            ("timeMin", query.window.start.to_rfc3339()),
            ("maxResults", query.max_results.to_string()),
            ("orderBy", query.order_by.as_str().to_string()),
            ("singleEvents", query.single_events.to_string()),
        ];
        if let Some(end) = query.window.end {
            params.push(("timeMax", end.to_rfc3339()));
        }

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .query(&params)
            .send()
            .await
            .map_err(map_request_error)?;

        let body = read_success_body(response).await?;
        let list: EventListResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse response: {}", e))
        })?;

        let events: Vec<RawEvent> = list
            .items
            .into_iter()
            .filter(|event| event.status.as_deref() != Some("cancelled"))
            .collect();

        debug!(
            calendar_id = %query.calendar_id,
            count = events.len(),
            "fetched events"
        );
        Ok(events)
    }

    /// Lists available calendars, following pagination.
    pub async fn list_calendars(&self, access_token: &str) -> ProviderResult<Vec<CalendarRef>> {
        let url = format!("{}/users/me/calendarList", self.api_base);
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.http_client.get(&url).bearer_auth(access_token);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await.map_err(map_request_error)?;
            let body = read_success_body(response).await?;
            let list: CalendarListResponse = serde_json::from_str(&body).map_err(|e| {
                ProviderError::invalid_response(format!("failed to parse response: {}", e))
            })?;

            calendars.extend(list.items.into_iter().map(CalendarListEntry::into_ref));

            match list.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(count = calendars.len(), "fetched calendar list");
        Ok(calendars)
    }
}

fn events_url(api_base: &str, calendar_id: &str) -> String {
    format!(
        "{}/calendars/{}/events",
        api_base,
        urlencoding::encode(calendar_id)
    )
}

fn map_request_error(e: reqwest::Error) -> ProviderError {
    let error = if e.is_timeout() {
        ProviderError::network("request timeout")
    } else if e.is_connect() {
        ProviderError::network(format!("connection failed: {}", e))
    } else {
        ProviderError::network(format!("request failed: {}", e))
    };
    error.with_source(e)
}

async fn read_success_body(response: reqwest::Response) -> ProviderResult<String> {
    let status = response.status().as_u16();

    if !(200..300).contains(&status) {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();
        return Err(classify_status(status, &body, retry_after));
    }

    response
        .text()
        .await
        .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))
}

/// Maps a non-success API status to a provider error.
fn classify_status(status: u16, body: &str, retry_after: Option<u64>) -> ProviderError {
    match status {
        401 => ProviderError::authentication("access token expired or invalid"),
        403 => ProviderError::authorization("access denied to calendar"),
        404 => ProviderError::not_found(format!("calendar not found: {}", body)),
        429 => {
            let err = ProviderError::rate_limited("rate limit exceeded");
            match retry_after {
                Some(secs) => err.with_retry_after(Duration::from_secs(secs)),
                None => err,
            }
        }
        400 => ProviderError::bad_request(format!("bad request: {}", body)),
        500.. => ProviderError::server(format!("API error ({}): {}", status, body)),
        _ => ProviderError::invalid_response(format!("unexpected status ({}): {}", status, body)),
    }
}

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<RawEvent>,
}

/// Response from the calendarList endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarListResponse {
    #[serde(default)]
    items: Vec<CalendarListEntry>,
    next_page_token: Option<String>,
}

/// A calendar from the calendar list.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListEntry {
    /// The calendar ID.
    pub id: String,
    /// The calendar summary (name).
    #[serde(default)]
    pub summary: String,
    /// The name the user gave the calendar in their own list, if any.
    pub summary_override: Option<String>,
}

impl CalendarListEntry {
    /// Converts to a [`CalendarRef`], naming it the way the user sees it.
    fn into_ref(self) -> CalendarRef {
        let name = self
            .summary_override
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(self.summary);
        CalendarRef::new(self.id, name)
    }
}
