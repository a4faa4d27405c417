// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const PRODUCT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
pub const MIN_PRODUCT_QUERY_CHARS: usize = 2;
pub const BLANK_TRAILING_ROWS: usize = 3;

/// One product as returned by the product search endpoint, already reduced to
/// the text each input shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub supplier: String,
    pub ingredient: String,
    pub unit: String,
    pub unit_cost: String,
    pub reference_unit_cost: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowField {
    Supplier,
    Ingredient,
    Unit,
    UnitCost,
    Quantity,
    Comment,
}

impl RowField {
    pub const EDITABLE: [Self; 6] = [
        Self::Supplier,
        Self::Ingredient,
        Self::Unit,
        Self::UnitCost,
        Self::Quantity,
        Self::Comment,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Supplier => "supplier",
            Self::Ingredient => "ingredient",
            Self::Unit => "unit",
            Self::UnitCost => "unit cost",
            Self::Quantity => "qty",
            Self::Comment => "comment",
        }
    }

    pub const fn affects_subtotal(self) -> bool {
        matches!(self, Self::UnitCost | Self::Quantity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowVisibility {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFill {
    Populated,
    Cleared,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CostRow {
    supplier: String,
    ingredient: String,
    unit: String,
    unit_cost: String,
    reference_unit_cost: String,
    quantity: String,
    comment: String,
    subtotal: f64,
    visibility: RowVisibility,
    fill: RowFill,
}

impl CostRow {
    pub fn blank() -> Self {
        Self {
            supplier: String::new(),
            ingredient: String::new(),
            unit: String::new(),
            unit_cost: String::new(),
            reference_unit_cost: String::new(),
            quantity: String::new(),
            comment: String::new(),
            subtotal: 0.0,
            visibility: RowVisibility::Visible,
            fill: RowFill::Cleared,
        }
    }

    pub fn from_record(record: &ProductRecord) -> Self {
        Self {
            supplier: record.supplier.clone(),
            ingredient: record.ingredient.clone(),
            unit: record.unit.clone(),
            unit_cost: record.unit_cost.clone(),
            reference_unit_cost: record.reference_unit_cost.clone(),
            fill: RowFill::Populated,
            ..Self::blank()
        }
    }

    pub fn field(&self, field: RowField) -> &str {
        match field {
            RowField::Supplier => &self.supplier,
            RowField::Ingredient => &self.ingredient,
            RowField::Unit => &self.unit,
            RowField::UnitCost => &self.unit_cost,
            RowField::Quantity => &self.quantity,
            RowField::Comment => &self.comment,
        }
    }

    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn reference_unit_cost(&self) -> &str {
        &self.reference_unit_cost
    }

    pub fn subtotal(&self) -> f64 {
        self.subtotal
    }

    pub fn subtotal_display(&self) -> String {
        format_amount(self.subtotal)
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == RowVisibility::Visible
    }

    pub fn fill(&self) -> RowFill {
        self.fill
    }

    pub(crate) fn set_field(&mut self, field: RowField, value: String) {
        if !value.is_empty() {
            self.fill = RowFill::Populated;
        }
        let slot = match field {
            RowField::Supplier => &mut self.supplier,
            RowField::Ingredient => &mut self.ingredient,
            RowField::Unit => &mut self.unit,
            RowField::UnitCost => &mut self.unit_cost,
            RowField::Quantity => &mut self.quantity,
            RowField::Comment => &mut self.comment,
        };
        *slot = value;
        if field.affects_subtotal() {
            self.recalculate();
        }
    }

    pub(crate) fn clear(&mut self) {
        let visibility = self.visibility;
        *self = Self {
            visibility,
            ..Self::blank()
        };
    }

    pub(crate) fn set_visibility(&mut self, visibility: RowVisibility) {
        self.visibility = visibility;
    }

    fn recalculate(&mut self) {
        self.subtotal = parse_amount(&self.unit_cost) * parse_amount(&self.quantity);
    }
}

/// Reads a cost or quantity the way the costing inputs do: anything that is
/// not a finite, non-negative number counts as zero.
pub fn parse_amount(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value,
        _ => 0.0,
    }
}

pub fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}
