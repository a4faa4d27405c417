// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};

use crate::{BLANK_TRAILING_ROWS, CostRow, ProductRecord, RowField, RowVisibility};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostingTable {
    rows: Vec<CostRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSummary {
    pub visible: usize,
    pub hidden: usize,
}

impl CostingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table shown before any search has run.
    pub fn with_blank_rows() -> Self {
        let mut table = Self::new();
        table.replace_with_results(&[]);
        table
    }

    pub fn rows(&self) -> &[CostRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&CostRow> {
        self.rows.get(index)
    }

    pub fn visible_indices(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_visible())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn replace_with_results(&mut self, records: &[ProductRecord]) {
        self.rows = records
            .iter()
            .map(CostRow::from_record)
            .chain(std::iter::repeat_with(CostRow::blank).take(BLANK_TRAILING_ROWS))
            .collect();
    }

    /// Writes one cell and returns the row's subtotal display afterwards.
    pub fn edit(&mut self, index: usize, field: RowField, value: impl Into<String>) -> Result<String> {
        let row = self.row_mut(index)?;
        row.set_field(field, value.into());
        Ok(row.subtotal_display())
    }

    pub fn clear_row(&mut self, index: usize) -> Result<()> {
        self.row_mut(index)?.clear();
        Ok(())
    }

    pub fn filter_by_supplier(&mut self, supplier: &str) -> FilterSummary {
        let mut summary = FilterSummary {
            visible: 0,
            hidden: 0,
        };
        for row in &mut self.rows {
            if !row.supplier().is_empty() && row.supplier() != supplier {
                row.set_visibility(RowVisibility::Hidden);
                summary.hidden += 1;
            } else {
                row.set_visibility(RowVisibility::Visible);
                summary.visible += 1;
            }
        }
        summary
    }

    fn row_mut(&mut self, index: usize) -> Result<&mut CostRow> {
        let len = self.rows.len();
        self.rows
            .get_mut(index)
            .ok_or_else(|| anyhow!("row {index} out of range; table has {len} rows"))
    }
}

#[cfg(test)]
mod tests {
    use super::CostingTable;
    use crate::{ProductRecord, RowField, RowFill};

    fn product(supplier: &str, ingredient: &str, unit_cost: &str) -> ProductRecord {
        ProductRecord {
            supplier: supplier.to_owned(),
            ingredient: ingredient.to_owned(),
            unit: "kg".to_owned(),
            unit_cost: unit_cost.to_owned(),
            reference_unit_cost: unit_cost.to_owned(),
        }
    }

    fn sample_table() -> CostingTable {
        let mut table = CostingTable::new();
        table.replace_with_results(&[
            product("Acme", "Flour", "1.20"),
            product("Brindle Foods", "Sugar", "0.95"),
            product("Acme", "Salt", "0.40"),
        ]);
        table
    }

    #[test]
    fn results_get_three_blank_trailing_rows() {
        let table = sample_table();
        assert_eq!(table.len(), 6);
        for row in &table.rows()[3..] {
            assert_eq!(row.supplier(), "");
            assert_eq!(row.field(RowField::Ingredient), "");
            assert_eq!(row.subtotal_display(), "0.00");
        }
    }

    #[test]
    fn empty_results_leave_only_blank_rows() {
        let table = CostingTable::with_blank_rows();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn replace_discards_previous_rows() {
        let mut table = sample_table();
        table.replace_with_results(&[product("Acme", "Yeast", "4.00")]);
        assert_eq!(table.len(), 4);
        assert_eq!(table.rows()[0].field(RowField::Ingredient), "Yeast");
    }

    #[test]
    fn edit_recalculates_only_that_row() -> anyhow::Result<()> {
        let mut table = sample_table();
        table.edit(0, RowField::Quantity, "2")?;
        let display = table.edit(1, RowField::Quantity, "4")?;
        assert_eq!(display, "3.80");
        assert_eq!(table.rows()[0].subtotal_display(), "2.40");
        assert_eq!(table.rows()[2].subtotal_display(), "0.00");
        Ok(())
    }

    #[test]
    fn edit_unit_cost_on_blank_row() -> anyhow::Result<()> {
        let mut table = sample_table();
        table.edit(4, RowField::Quantity, "3")?;
        let display = table.edit(4, RowField::UnitCost, "2.5")?;
        assert_eq!(display, "7.50");
        Ok(())
    }

    #[test]
    fn non_numeric_edit_zeroes_subtotal() -> anyhow::Result<()> {
        let mut table = sample_table();
        table.edit(0, RowField::Quantity, "5")?;
        let display = table.edit(0, RowField::UnitCost, "cheap")?;
        assert_eq!(display, "0.00");
        assert_eq!(table.rows()[0].field(RowField::UnitCost), "cheap");
        Ok(())
    }

    #[test]
    fn edit_out_of_range_is_an_error() {
        let mut table = sample_table();
        let error = table
            .edit(42, RowField::Quantity, "1")
            .expect_err("row 42 should not exist");
        assert!(error.to_string().contains("out of range"));
    }

    #[test]
    fn clear_row_keeps_row_count() -> anyhow::Result<()> {
        let mut table = sample_table();
        table.edit(0, RowField::Quantity, "2")?;
        table.edit(0, RowField::Comment, "check price")?;
        table.clear_row(0)?;

        assert_eq!(table.len(), 6);
        let row = &table.rows()[0];
        for field in RowField::EDITABLE {
            assert_eq!(row.field(field), "");
        }
        assert_eq!(row.reference_unit_cost(), "");
        assert_eq!(row.subtotal_display(), "0.00");
        assert_eq!(row.fill(), RowFill::Cleared);
        Ok(())
    }

    #[test]
    fn filter_hides_other_suppliers_but_keeps_empty_ones() {
        let mut table = sample_table();
        let summary = table.filter_by_supplier("Acme");

        assert_eq!(summary.hidden, 1);
        assert_eq!(summary.visible, 5);
        assert!(table.rows()[0].is_visible());
        assert!(!table.rows()[1].is_visible());
        assert!(table.rows()[2].is_visible());
        assert!(table.rows()[5].is_visible());
        assert_eq!(table.visible_indices(), vec![0, 2, 3, 4, 5]);
    }

    #[test]
    fn filter_is_exact_match() {
        let mut table = sample_table();
        let summary = table.filter_by_supplier("acme");
        assert_eq!(summary.hidden, 3);
    }

    #[test]
    fn refilter_unhides_rows() {
        let mut table = sample_table();
        table.filter_by_supplier("Acme");
        table.filter_by_supplier("Brindle Foods");
        assert!(!table.rows()[0].is_visible());
        assert!(table.rows()[1].is_visible());
    }

    #[test]
    fn clear_keeps_hidden_state() -> anyhow::Result<()> {
        let mut table = sample_table();
        table.filter_by_supplier("Acme");
        table.clear_row(1)?;
        assert!(!table.rows()[1].is_visible());
        Ok(())
    }

    #[test]
    fn replace_unhides_everything() {
        let mut table = sample_table();
        table.filter_by_supplier("Acme");
        table.replace_with_results(&[product("Brindle Foods", "Oats", "2.10")]);
        assert_eq!(table.visible_indices().len(), table.len());
    }
}
