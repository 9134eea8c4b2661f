//! Record of the API calls made during a session.
//!
//! Every request issued by [`crate::ApiClient`] ends up here, successful or
//! not, together with an equivalent `curl` invocation so the exchange can be
//! inspected or replayed by hand.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use reqwest::Method;
use serde_json::Value;

/// Number of entries kept by [`ActivityLog::default`].
pub const ACTIVITY_LOG_CAPACITY: usize = 6;

/// One recorded API call.
#[derive(Clone, derive_more::Debug)]
pub struct ActivityEntry {
    pub id: u64,
    pub label: String,
    pub method: Method,
    pub endpoint: String,
    pub url: String,
    /// `None` when no response was received.
    pub http_status: Option<u16>,
    pub request_payload: Option<Value>,
    pub response_payload: Option<Value>,
    /// Why the call failed, including failures reported with a 2xx status.
    pub error: Option<String>,
    #[debug(skip)]
    pub curl: String,
    #[debug("{timestamp}")]
    pub timestamp: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.http_status.is_some_and(|s| (200..300).contains(&s))
    }
}

/// Call details known before the response arrives.
#[derive(Clone, Debug)]
pub(crate) struct PendingCall {
    pub label: String,
    pub method: Method,
    pub endpoint: String,
    pub url: String,
    pub request_payload: Option<Value>,
    pub curl: String,
}

/// Bounded, most-recent-first log of [`ActivityEntry`] records.
#[derive(Clone, Debug)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    capacity: usize,
    next_id: u64,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_capacity(ACTIVITY_LOG_CAPACITY)
    }
}

impl ActivityLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            next_id: 1,
        }
    }

    pub(crate) fn record(
        &mut self,
        call: PendingCall,
        http_status: Option<u16>,
        response_payload: Option<Value>,
        error: Option<String>,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push_front(ActivityEntry {
            id,
            label: call.label,
            method: call.method,
            endpoint: call.endpoint,
            url: call.url,
            http_status,
            request_payload: call.request_payload,
            response_payload,
            error,
            curl: call.curl,
            timestamp: Utc::now(),
        });
        self.entries.truncate(self.capacity);
        id
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&ActivityEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Renders a copy-pasteable `curl` command for a request.
pub fn curl_command(
    method: &Method,
    url: &str,
    headers: &[(&str, &str)],
    body: Option<&Value>,
) -> String {
    let mut parts = vec![format!("curl -X {} {}", method, shell_quote(url))];
    parts.extend(
        headers
            .iter()
            .map(|(name, value)| format!("-H {}", shell_quote(&format!("{name}: {value}")))),
    );
    if let Some(body) = body {
        parts.push(format!("-d {}", shell_quote(&body.to_string())));
    }
    parts.into_iter().join(" \\\n  ")
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
