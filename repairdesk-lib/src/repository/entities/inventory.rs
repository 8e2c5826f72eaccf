use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Applied whenever an item doesn't carry an explicit threshold.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

/// A stocked part or accessory belonging to one branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryItem {
    pub id: String,
    pub item_name: String,
    pub brand: String,
    pub model: String,
    pub stock_quantity: u32,
    pub purchase_price: f64,
    pub selling_price: f64,
    pub branch_id: String,
    pub last_updated: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_stock_threshold: Option<u32>,
}

impl Default for InventoryItem {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            item_name: String::new(),
            brand: String::new(),
            model: String::new(),
            stock_quantity: 0,
            purchase_price: 0.0,
            selling_price: 0.0,
            branch_id: String::new(),
            last_updated: Utc::now(),
            low_stock_threshold: None,
        }
    }
}

impl InventoryItem {
    /// The effective threshold, falling back to [`DEFAULT_LOW_STOCK_THRESHOLD`].
    pub fn threshold(&self) -> u32 {
        self.low_stock_threshold
            .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD)
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.threshold()
    }

    /// Stock value at purchase price.
    pub fn stock_value(&self) -> f64 {
        f64::from(self.stock_quantity) * self.purchase_price
    }

    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.item_name.to_lowercase().contains(&term)
            || self.brand.to_lowercase().contains(&term)
            || self.model.to_lowercase().contains(&term)
    }
}
