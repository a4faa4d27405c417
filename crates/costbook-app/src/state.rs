// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::fmt;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::{
    CostingTable, FilterSummary, ProductLookup, ProductRecord, ProductSearch, RequestId,
    RowField, SubscriptionId, SupplierLookup, SupplierPicker, SupplierResponse,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Suppliers,
    Products,
}

impl LookupKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Suppliers => "supplier search",
            Self::Products => "product search",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerCommand {
    SupplierQueryChanged(String),
    MoveSuggestionCursor(isize),
    SelectSuggestion(usize),
    HideSuggestions,
    ProductQueryChanged { query: String, at: Instant },
    Tick(Instant),
    EditCell {
        row: usize,
        field: RowField,
        value: String,
    },
    ClearRow(usize),
    FilterBySupplier(String),
    SuppliersLoaded {
        request_id: RequestId,
        result: Result<Vec<String>, String>,
    },
    ProductsLoaded {
        request_id: RequestId,
        result: Result<Vec<ProductRecord>, String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    SupplierLookupRequested(SupplierLookup),
    ProductLookupRequested(ProductLookup),
    SuggestionsShown(usize),
    SuggestionsHidden,
    SuggestionSelected(String),
    TableReplaced { rows: usize },
    SubtotalUpdated { row: usize, display: String },
    RowEdited { row: usize, field: RowField },
    RowCleared(usize),
    TableFiltered {
        supplier: String,
        visible: usize,
        hidden: usize,
    },
    StaleResponseDropped {
        kind: LookupKind,
        request_id: RequestId,
    },
    LookupFailed {
        kind: LookupKind,
        message: String,
    },
}

type Subscriber = Box<dyn FnMut(&ControllerEvent)>;

/// Owns the costing screen: supplier resolver, debounced product search and
/// the table. Built once at startup; front ends subscribe, then dispatch.
pub struct CostingController {
    pub supplier: SupplierPicker,
    pub product: ProductSearch,
    pub table: CostingTable,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Default for CostingController {
    fn default() -> Self {
        Self::new(ProductSearch::default())
    }
}

impl fmt::Debug for CostingController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CostingController")
            .field("supplier", &self.supplier)
            .field("product", &self.product)
            .field("table", &self.table)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl CostingController {
    pub fn new(product: ProductSearch) -> Self {
        Self {
            supplier: SupplierPicker::default(),
            product,
            table: CostingTable::with_blank_rows(),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&ControllerEvent) + 'static) -> SubscriptionId {
        self.next_subscription = self.next_subscription.saturating_add(1);
        let id = SubscriptionId::new(self.next_subscription);
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    pub fn dispatch(&mut self, command: ControllerCommand) -> Result<Vec<ControllerEvent>> {
        let events = self.apply(command)?;
        for event in &events {
            for (_, subscriber) in &mut self.subscribers {
                subscriber(event);
            }
        }
        Ok(events)
    }

    fn apply(&mut self, command: ControllerCommand) -> Result<Vec<ControllerEvent>> {
        let events = match command {
            ControllerCommand::SupplierQueryChanged(text) => {
                let was_shown = self.supplier.is_list_shown();
                match self.supplier.set_query(text) {
                    Some(lookup) => vec![ControllerEvent::SupplierLookupRequested(lookup)],
                    None if was_shown => vec![ControllerEvent::SuggestionsHidden],
                    None => Vec::new(),
                }
            }
            ControllerCommand::MoveSuggestionCursor(delta) => {
                self.supplier.move_cursor(delta);
                Vec::new()
            }
            ControllerCommand::SelectSuggestion(index) => match self.supplier.select(index) {
                Some(name) => {
                    let summary = self.table.filter_by_supplier(&name);
                    vec![
                        ControllerEvent::SuggestionSelected(name.clone()),
                        ControllerEvent::SuggestionsHidden,
                        filtered_event(name, summary),
                    ]
                }
                None => Vec::new(),
            },
            ControllerCommand::HideSuggestions => {
                if self.supplier.is_list_shown() {
                    self.supplier.hide_list();
                    vec![ControllerEvent::SuggestionsHidden]
                } else {
                    Vec::new()
                }
            }
            ControllerCommand::ProductQueryChanged { query, at } => {
                self.product.input(query, at);
                Vec::new()
            }
            ControllerCommand::Tick(now) => match self.product.poll(now) {
                Some(lookup) => {
                    debug!(request_id = %lookup.request_id, query = %lookup.query, "product search fired");
                    vec![ControllerEvent::ProductLookupRequested(lookup)]
                }
                None => Vec::new(),
            },
            ControllerCommand::EditCell { row, field, value } => {
                let display = self.table.edit(row, field, value)?;
                let mut events = vec![ControllerEvent::RowEdited { row, field }];
                if field.affects_subtotal() {
                    events.push(ControllerEvent::SubtotalUpdated { row, display });
                }
                events
            }
            ControllerCommand::ClearRow(row) => {
                self.table.clear_row(row)?;
                vec![ControllerEvent::RowCleared(row)]
            }
            ControllerCommand::FilterBySupplier(supplier) => {
                let summary = self.table.filter_by_supplier(&supplier);
                vec![filtered_event(supplier, summary)]
            }
            ControllerCommand::SuppliersLoaded { request_id, result } => {
                match self.supplier.apply_response(request_id, result) {
                    SupplierResponse::Applied { count } => {
                        vec![ControllerEvent::SuggestionsShown(count)]
                    }
                    SupplierResponse::Stale => stale(LookupKind::Suppliers, request_id),
                    SupplierResponse::Failed { message } => {
                        failed(LookupKind::Suppliers, request_id, message)
                    }
                }
            }
            ControllerCommand::ProductsLoaded { request_id, result } => {
                if !self.product.accepts(request_id) {
                    stale(LookupKind::Products, request_id)
                } else {
                    match result {
                        Ok(records) => {
                            self.table.replace_with_results(&records);
                            info!(
                                request_id = %request_id,
                                results = records.len(),
                                "costing table replaced"
                            );
                            vec![ControllerEvent::TableReplaced {
                                rows: self.table.len(),
                            }]
                        }
                        Err(message) => failed(LookupKind::Products, request_id, message),
                    }
                }
            }
        };
        Ok(events)
    }
}

fn filtered_event(supplier: String, summary: FilterSummary) -> ControllerEvent {
    ControllerEvent::TableFiltered {
        supplier,
        visible: summary.visible,
        hidden: summary.hidden,
    }
}

fn stale(kind: LookupKind, request_id: RequestId) -> Vec<ControllerEvent> {
    debug!(request_id = %request_id, "dropping stale {} response", kind.label());
    vec![ControllerEvent::StaleResponseDropped { kind, request_id }]
}

fn failed(kind: LookupKind, request_id: RequestId, message: String) -> Vec<ControllerEvent> {
    error!(request_id = %request_id, "{} failed: {message}", kind.label());
    vec![ControllerEvent::LookupFailed { kind, message }]
}
