// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use costbook_app::ProductRecord;

const SUPPLIER_PREFIXES: [&str; 10] = [
    "Acme",
    "Brindle",
    "Harbor",
    "Meadowgate",
    "Northfield",
    "Copper Pot",
    "Greenleaf",
    "Summit",
    "Oakridge",
    "Saltmarsh",
];

const SUPPLIER_SUFFIXES: [&str; 6] = [
    "Foods",
    "Provisions",
    "Wholesale",
    "Produce",
    "Trading Co",
    "Dairy",
];

const INGREDIENTS: [(&str, &str, i64, i64); 20] = [
    ("Plain Flour", "kg", 90, 180),
    ("Caster Sugar", "kg", 110, 240),
    ("Unsalted Butter", "kg", 650, 1_100),
    ("Whole Milk", "l", 80, 160),
    ("Double Cream", "l", 320, 560),
    ("Free Range Eggs", "dozen", 280, 460),
    ("Sea Salt", "kg", 150, 420),
    ("Olive Oil", "l", 700, 1_400),
    ("Basmati Rice", "kg", 180, 340),
    ("Rolled Oats", "kg", 120, 260),
    ("Dark Chocolate", "kg", 900, 1_800),
    ("Vanilla Extract", "100ml", 650, 1_500),
    ("Chicken Thigh", "kg", 540, 890),
    ("Beef Mince", "kg", 780, 1_250),
    ("Brown Onions", "kg", 60, 140),
    ("Garlic", "kg", 400, 900),
    ("Cherry Tomatoes", "kg", 380, 720),
    ("Fresh Basil", "bunch", 90, 220),
    ("Parmesan", "kg", 1_600, 2_800),
    ("Lemons", "each", 25, 70),
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator for supplier price lists.
#[derive(Debug, Clone)]
pub struct CatalogFaker {
    rng: DeterministicRng,
    seed: u64,
}

impl CatalogFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn supplier_names(&mut self, count: usize) -> Vec<String> {
        let mut names: Vec<String> = Vec::with_capacity(count);
        let mut attempts = 0;
        while names.len() < count && attempts < count * 20 {
            attempts += 1;
            let name = format!(
                "{} {}",
                self.pick(&SUPPLIER_PREFIXES),
                self.pick(&SUPPLIER_SUFFIXES)
            );
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Every supplier quotes a random subset of the ingredient list.
    pub fn products(&mut self, suppliers: &[String]) -> Vec<ProductRecord> {
        let mut out = Vec::new();
        for supplier in suppliers {
            for (ingredient, unit, low, high) in INGREDIENTS {
                if !self.rng.bool() {
                    continue;
                }
                let cost_cents = self.int_range_i64(low, high);
                let drift = self.int_range_i64(-15, 15);
                let reference_cents = (cost_cents + drift).max(1);
                out.push(ProductRecord {
                    supplier: supplier.clone(),
                    ingredient: ingredient.to_owned(),
                    unit: unit.to_owned(),
                    unit_cost: format_cents(cost_cents),
                    reference_unit_cost: format_cents(reference_cents),
                });
            }
        }
        out
    }

    fn pick<'a>(&mut self, values: &'a [&'a str]) -> &'a str {
        values[self.rng.int_n(values.len())]
    }

    fn int_range_i64(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        let span = (high - low + 1) as usize;
        low + self.rng.int_n(span) as i64
    }
}

/// In-memory stand-in for the two search endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoCatalog {
    suppliers: Vec<String>,
    products: Vec<ProductRecord>,
}

impl DemoCatalog {
    pub fn generate(seed: u64) -> Self {
        let mut faker = CatalogFaker::new(seed);
        let suppliers = faker.supplier_names(8);
        let products = faker.products(&suppliers);
        Self {
            suppliers,
            products,
        }
    }

    pub fn from_parts(suppliers: Vec<String>, products: Vec<ProductRecord>) -> Self {
        Self {
            suppliers,
            products,
        }
    }

    pub fn suppliers(&self) -> &[String] {
        &self.suppliers
    }

    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    pub fn search_suppliers(&self, query: &str) -> Vec<String> {
        self.suppliers
            .iter()
            .filter(|name| contains_ignore_case(name, query))
            .cloned()
            .collect()
    }

    pub fn search_products(&self, query: &str) -> Vec<ProductRecord> {
        self.products
            .iter()
            .filter(|record| contains_ignore_case(&record.ingredient, query))
            .cloned()
            .collect()
    }
}

pub fn product(supplier: &str, ingredient: &str, unit: &str, unit_cost: &str) -> ProductRecord {
    ProductRecord {
        supplier: supplier.to_owned(),
        ingredient: ingredient.to_owned(),
        unit: unit.to_owned(),
        unit_cost: unit_cost.to_owned(),
        reference_unit_cost: unit_cost.to_owned(),
    }
}

pub fn ingredient_names() -> Vec<&'static str> {
    INGREDIENTS.iter().map(|(name, ..)| *name).collect()
}

fn format_cents(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::{CatalogFaker, DemoCatalog, format_cents, ingredient_names, product};
    use std::collections::BTreeSet;

    #[test]
    fn new_deterministic_seed() {
        let mut left = CatalogFaker::new(42);
        let mut right = CatalogFaker::new(42);
        assert_eq!(left.supplier_names(4), right.supplier_names(4));
    }

    #[test]
    fn zero_seed_is_normalized() {
        assert_eq!(CatalogFaker::new(0).seed(), 1);
    }

    #[test]
    fn supplier_names_are_unique() {
        let mut faker = CatalogFaker::new(7);
        let names = faker.supplier_names(12);
        let unique = names.iter().collect::<BTreeSet<_>>();
        assert_eq!(unique.len(), names.len());
        assert_eq!(names.len(), 12);
    }

    #[test]
    fn products_carry_known_ingredients_and_costs() {
        let mut faker = CatalogFaker::new(3);
        let suppliers = faker.supplier_names(3);
        let products = faker.products(&suppliers);
        let known = ingredient_names();

        assert!(!products.is_empty());
        for record in &products {
            assert!(suppliers.contains(&record.supplier));
            assert!(known.contains(&record.ingredient.as_str()));
            assert!(record.unit_cost.parse::<f64>().is_ok(), "{record:?}");
            assert!(record.reference_unit_cost.parse::<f64>().is_ok(), "{record:?}");
        }
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let catalog = DemoCatalog::from_parts(
            vec!["Acme Foods".to_owned(), "Harbor Dairy".to_owned()],
            vec![
                product("Acme Foods", "Olive Oil", "l", "7.00"),
                product("Harbor Dairy", "Whole Milk", "l", "0.95"),
            ],
        );
        assert_eq!(catalog.search_suppliers("acme"), vec!["Acme Foods".to_owned()]);
        assert_eq!(catalog.search_suppliers("o").len(), 2);
        assert_eq!(catalog.search_products("MILK").len(), 1);
        assert!(catalog.search_products("basil").is_empty());
    }

    #[test]
    fn generated_catalog_is_searchable() {
        let catalog = DemoCatalog::generate(11);
        assert_eq!(catalog.suppliers().len(), 8);
        let first = &catalog.products()[0];
        assert!(
            catalog
                .search_products(&first.ingredient)
                .iter()
                .any(|record| record == first)
        );
    }

    #[test]
    fn format_cents_pads() {
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(1_250), "12.50");
    }
}
