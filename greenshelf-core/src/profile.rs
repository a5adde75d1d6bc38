//! Static per-SKU reference data: shelf-life and pricing profiles.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Storage and shelf-life characteristics of a SKU.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductProfile {
    pub sku: String,
    pub name: String,
    pub category: String,
    /// Ideal storage temperature in degrees Celsius.
    pub ideal_temp_c: f64,
    /// Shelf life from receipt when kept at or below the ideal temperature.
    pub base_shelf_life_days: u32,
    /// Shelf-life days lost per degree-day above ideal.
    pub temp_sensitivity_factor: f64,
}

/// Base pricing for a SKU.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingProfile {
    pub sku: String,
    pub original_price: f64,
    pub cost_price: f64,
    /// Minimum margin over cost as a fraction (0.10 = cost + 10%).
    pub min_margin_fraction: f64,
}

impl PricingProfile {
    /// Lowest price that still keeps the guaranteed margin.
    pub fn min_profitable_price(&self) -> f64 {
        self.cost_price * (1.0 + self.min_margin_fraction)
    }
}

/// Immutable reference data keyed by SKU.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    products: HashMap<String, ProductProfile>,
    pricing: HashMap<String, PricingProfile>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(mut self, profile: ProductProfile) -> Self {
        self.insert_product(profile);
        self
    }

    pub fn with_pricing(mut self, profile: PricingProfile) -> Self {
        self.insert_pricing(profile);
        self
    }

    pub fn insert_product(&mut self, profile: ProductProfile) {
        self.products.insert(profile.sku.clone(), profile);
    }

    pub fn insert_pricing(&mut self, profile: PricingProfile) {
        self.pricing.insert(profile.sku.clone(), profile);
    }

    pub fn product(&self, sku: &str) -> Option<&ProductProfile> {
        self.products.get(sku)
    }

    pub fn pricing(&self, sku: &str) -> Option<&PricingProfile> {
        self.pricing.get(sku)
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// SKUs with a product profile, sorted.
    pub fn skus(&self) -> Vec<&str> {
        let mut skus: Vec<&str> = self.products.keys().map(String::as_str).collect();
        skus.sort_unstable();
        skus
    }
}

fn product(sku: &str, name: &str, category: &str, ideal: f64, life: u32, sensitivity: f64) -> ProductProfile {
    ProductProfile {
        sku: sku.into(),
        name: name.into(),
        category: category.into(),
        ideal_temp_c: ideal,
        base_shelf_life_days: life,
        temp_sensitivity_factor: sensitivity,
    }
}

fn pricing(sku: &str, original: f64, cost: f64, min_margin: f64) -> PricingProfile {
    PricingProfile {
        sku: sku.into(),
        original_price: original,
        cost_price: cost,
        min_margin_fraction: min_margin,
    }
}

/// The five-SKU perishables catalog used by the demo store.
pub fn demo_catalog() -> Catalog {
    Catalog::new()
        .with_product(product("SKU_DAIRY_MILK1G", "Whole Milk (1 Gallon)", "Dairy", 3.0, 12, 0.25))
        .with_product(product("SKU_FRUIT_BANANAS", "Organic Bananas (Bunch)", "Produce", 13.0, 7, 0.15))
        .with_product(product("SKU_VEG_LETTUCE", "Romaine Lettuce Head", "Produce", 2.0, 10, 0.2))
        .with_product(product("SKU_MEAT_CHICKEN", "Chicken Thighs (1lb)", "Meat", 1.0, 5, 0.3))
        .with_product(product("SKU_BAKE_BREADW", "Whole Wheat Bread", "Bakery", 20.0, 7, 0.05))
        .with_pricing(pricing("SKU_DAIRY_MILK1G", 3.99, 2.00, 0.10))
        .with_pricing(pricing("SKU_FRUIT_BANANAS", 1.99, 0.50, 0.15))
        .with_pricing(pricing("SKU_VEG_LETTUCE", 2.49, 0.75, 0.10))
        .with_pricing(pricing("SKU_MEAT_CHICKEN", 7.99, 4.00, 0.20))
        .with_pricing(pricing("SKU_BAKE_BREADW", 3.29, 1.20, 0.10))
}
