// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{RequestId, RequestSequence};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListVisibility {
    Hidden,
    Shown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierLookup {
    pub request_id: RequestId,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupplierResponse {
    Applied { count: usize },
    Stale,
    Failed { message: String },
}

/// Supplier query box plus its suggestion dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierPicker {
    query: String,
    suggestions: Vec<String>,
    list: ListVisibility,
    selected: bool,
    cursor: usize,
    requests: RequestSequence,
}

impl Default for SupplierPicker {
    fn default() -> Self {
        Self {
            query: String::new(),
            suggestions: Vec::new(),
            list: ListVisibility::Hidden,
            selected: false,
            cursor: 0,
            requests: RequestSequence::default(),
        }
    }
}

impl SupplierPicker {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn list(&self) -> ListVisibility {
        self.list
    }

    pub fn is_list_shown(&self) -> bool {
        self.list == ListVisibility::Shown
    }

    /// Whether the query box carries the "chosen supplier" styling.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn pending_request(&self) -> Option<RequestId> {
        self.requests.latest()
    }

    /// Records new query text. A non-blank query yields the lookup to send;
    /// a blank one hides the list and forgets whatever is in flight.
    pub fn set_query(&mut self, text: impl Into<String>) -> Option<SupplierLookup> {
        self.query = text.into();
        let trimmed = self.query.trim();
        if trimmed.is_empty() {
            self.list = ListVisibility::Hidden;
            self.selected = false;
            self.requests.invalidate();
            return None;
        }

        let query = trimmed.to_owned();
        Some(SupplierLookup {
            request_id: self.requests.issue(),
            query,
        })
    }

    pub fn apply_response(
        &mut self,
        request_id: RequestId,
        result: Result<Vec<String>, String>,
    ) -> SupplierResponse {
        if !self.requests.is_current(request_id) {
            return SupplierResponse::Stale;
        }

        match result {
            Ok(suggestions) => {
                let count = suggestions.len();
                self.suggestions = suggestions;
                self.cursor = 0;
                self.list = ListVisibility::Shown;
                self.selected = true;
                SupplierResponse::Applied { count }
            }
            Err(message) => SupplierResponse::Failed { message },
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if !self.is_list_shown() || self.suggestions.is_empty() {
            return;
        }
        let len = self.suggestions.len() as isize;
        self.cursor = (self.cursor as isize + delta).rem_euclid(len) as usize;
    }

    pub fn hide_list(&mut self) {
        self.list = ListVisibility::Hidden;
    }

    /// Picks a suggestion; the returned name is what the table gets filtered by.
    pub fn select(&mut self, index: usize) -> Option<String> {
        if !self.is_list_shown() {
            return None;
        }
        let choice = self.suggestions.get(index)?.clone();
        self.query = choice.clone();
        self.selected = true;
        self.list = ListVisibility::Hidden;
        self.cursor = index;
        Some(choice)
    }
}

#[cfg(test)]
mod tests {
    use super::{ListVisibility, SupplierPicker, SupplierResponse};

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    #[test]
    fn blank_query_issues_nothing_and_hides_list() {
        let mut picker = SupplierPicker::default();
        assert!(picker.set_query("   ").is_none());
        assert_eq!(picker.list(), ListVisibility::Hidden);
        assert!(!picker.is_selected());
    }

    #[test]
    fn query_is_trimmed_for_lookup() {
        let mut picker = SupplierPicker::default();
        let lookup = picker.set_query("  ac ").expect("lookup expected");
        assert_eq!(lookup.query, "ac");
        assert_eq!(picker.query(), "  ac ");
    }

    #[test]
    fn response_shows_suggestions_in_server_order() {
        let mut picker = SupplierPicker::default();
        let lookup = picker.set_query("a").expect("lookup expected");
        let outcome =
            picker.apply_response(lookup.request_id, Ok(names(&["Zest Co", "Acme", "Bay"])));

        assert_eq!(outcome, SupplierResponse::Applied { count: 3 });
        assert_eq!(picker.suggestions(), names(&["Zest Co", "Acme", "Bay"]).as_slice());
        assert!(picker.is_list_shown());
        assert!(picker.is_selected());
    }

    #[test]
    fn older_response_is_stale() {
        let mut picker = SupplierPicker::default();
        let first = picker.set_query("a").expect("lookup expected");
        let second = picker.set_query("ac").expect("lookup expected");

        let outcome = picker.apply_response(first.request_id, Ok(names(&["Bay"])));
        assert_eq!(outcome, SupplierResponse::Stale);
        assert!(picker.suggestions().is_empty());

        let outcome = picker.apply_response(second.request_id, Ok(names(&["Acme"])));
        assert_eq!(outcome, SupplierResponse::Applied { count: 1 });
    }

    #[test]
    fn clearing_query_invalidates_in_flight_lookup() {
        let mut picker = SupplierPicker::default();
        let lookup = picker.set_query("ac").expect("lookup expected");
        picker.set_query("");

        let outcome = picker.apply_response(lookup.request_id, Ok(names(&["Acme"])));
        assert_eq!(outcome, SupplierResponse::Stale);
        assert!(!picker.is_list_shown());
    }

    #[test]
    fn failure_leaves_list_untouched() {
        let mut picker = SupplierPicker::default();
        let first = picker.set_query("a").expect("lookup expected");
        picker.apply_response(first.request_id, Ok(names(&["Acme"])));
        picker.hide_list();

        let second = picker.set_query("ac").expect("lookup expected");
        let outcome = picker.apply_response(second.request_id, Err("boom".to_owned()));
        assert_eq!(
            outcome,
            SupplierResponse::Failed {
                message: "boom".to_owned()
            }
        );
        assert_eq!(picker.suggestions(), names(&["Acme"]).as_slice());
        assert!(!picker.is_list_shown());
    }

    #[test]
    fn select_sets_query_and_hides_list() {
        let mut picker = SupplierPicker::default();
        let lookup = picker.set_query("a").expect("lookup expected");
        picker.apply_response(lookup.request_id, Ok(names(&["Acme", "Bay Produce"])));

        let chosen = picker.select(1);
        assert_eq!(chosen.as_deref(), Some("Bay Produce"));
        assert_eq!(picker.query(), "Bay Produce");
        assert!(!picker.is_list_shown());
        assert!(picker.is_selected());
    }

    #[test]
    fn select_requires_visible_list_and_valid_index() {
        let mut picker = SupplierPicker::default();
        assert!(picker.select(0).is_none());

        let lookup = picker.set_query("a").expect("lookup expected");
        picker.apply_response(lookup.request_id, Ok(names(&["Acme"])));
        assert!(picker.select(3).is_none());
        assert!(picker.is_list_shown());
    }

    #[test]
    fn cursor_wraps() {
        let mut picker = SupplierPicker::default();
        let lookup = picker.set_query("a").expect("lookup expected");
        picker.apply_response(lookup.request_id, Ok(names(&["A", "B", "C"])));

        picker.move_cursor(-1);
        assert_eq!(picker.cursor(), 2);
        picker.move_cursor(1);
        assert_eq!(picker.cursor(), 0);
    }
}
