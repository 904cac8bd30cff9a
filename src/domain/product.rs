use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, DEFAULT_CURRENCY};

pub type ProductId = Uuid;

/// A catalogue entry. `unit_price_cents` is a template: lines copy it when
/// they are written and keep their own copy afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_price_cents: Option<Cents>,
    pub currency: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(sku: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            sku,
            name,
            description: None,
            unit_price_cents: None,
            currency: DEFAULT_CURRENCY.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_price(mut self, unit_price_cents: Cents) -> Self {
        self.unit_price_cents = Some(unit_price_cents);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update of a product. `None` leaves the field as it is.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub unit_price_cents: Option<Cents>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl ProductUpdate {
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(price) = self.unit_price_cents {
            product.unit_price_cents = Some(price);
        }
        if let Some(currency) = self.currency {
            product.currency = currency;
        }
        if let Some(description) = self.description {
            product.description = Some(description);
        }
        if let Some(active) = self.is_active {
            product.is_active = active;
        }
        product.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_product_defaults() {
        let product = Product::new("SKU-001".into(), "Licence CRM - Basic".into());
        assert!(product.is_active);
        assert_eq!(product.currency, "EUR");
        assert_eq!(product.unit_price_cents, None);
    }

    #[test]
    fn test_update_changes_price_only() {
        let mut product =
            Product::new("SKU-002".into(), "Licence CRM - Pro".into()).with_price(19900);

        ProductUpdate {
            unit_price_cents: Some(24900),
            ..Default::default()
        }
        .apply(&mut product);

        assert_eq!(product.unit_price_cents, Some(24900));
        assert_eq!(product.name, "Licence CRM - Pro");
    }
}
