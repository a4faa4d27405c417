// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};

use crate::{MIN_PRODUCT_QUERY_CHARS, PRODUCT_SEARCH_DEBOUNCE, RequestId, RequestSequence};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductLookup {
    pub request_id: RequestId,
    pub query: String,
}

/// Debounced product query. Input restarts the countdown; `poll` fires the
/// lookup once the countdown has run out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSearch {
    query: String,
    deadline: Option<Instant>,
    delay: Duration,
    requests: RequestSequence,
}

impl Default for ProductSearch {
    fn default() -> Self {
        Self::with_delay(PRODUCT_SEARCH_DEBOUNCE)
    }
}

impl ProductSearch {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            query: String::new(),
            deadline: None,
            delay,
            requests: RequestSequence::default(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn pending_request(&self) -> Option<RequestId> {
        self.requests.latest()
    }

    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.query = text.into();
        self.deadline = Some(now + self.delay);
    }

    pub fn poll(&mut self, now: Instant) -> Option<ProductLookup> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;

        let trimmed = self.query.trim();
        if trimmed.chars().count() < MIN_PRODUCT_QUERY_CHARS {
            return None;
        }
        let query = trimmed.to_owned();
        Some(ProductLookup {
            request_id: self.requests.issue(),
            query,
        })
    }

    /// Whether an answer to `request_id` may still be rendered.
    pub fn accepts(&self, request_id: RequestId) -> bool {
        self.requests.is_current(request_id)
    }

    pub fn time_until_deadline(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}
