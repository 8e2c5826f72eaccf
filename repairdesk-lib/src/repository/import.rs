//! Bulk inventory import.
//!
//! Accepts spreadsheet-style CSV rows with named columns. Rows missing any
//! of item name, brand, or model are dropped silently; numeric columns fall
//! back to 0 (quantity, prices) or 10 (low-stock threshold) when absent or
//! unparsable. Only a fully empty result is reported to the caller as a
//! failure.

use std::io::Read;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::repository::entities::{DEFAULT_LOW_STOCK_THRESHOLD, InventoryItem, Result};

/// One spreadsheet row. Both the template's header spellings and the
/// camelCase variants are accepted.
#[derive(Debug, Deserialize)]
struct ImportRow {
    #[serde(rename = "Item Name", alias = "itemName")]
    item_name: Option<String>,
    #[serde(rename = "Brand", alias = "brand")]
    brand: Option<String>,
    #[serde(rename = "Model", alias = "model")]
    model: Option<String>,
    #[serde(rename = "Stock Quantity", alias = "stockQuantity")]
    stock_quantity: Option<String>,
    #[serde(rename = "Purchase Price", alias = "purchasePrice")]
    purchase_price: Option<String>,
    #[serde(rename = "Selling Price", alias = "sellingPrice")]
    selling_price: Option<String>,
    #[serde(rename = "Low Stock Threshold", alias = "lowStockThreshold")]
    low_stock_threshold: Option<String>,
}

fn required(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

fn numeric<T: std::str::FromStr>(field: Option<&String>, fallback: T) -> T {
    field
        .and_then(|value| value.parse().ok())
        .unwrap_or(fallback)
}

/// Parse CSV rows into inventory items for `branch_id`.
pub(crate) fn read_items<R: Read>(
    reader: R,
    branch_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<InventoryItem>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut items = Vec::new();
    let mut dropped = 0usize;

    for row in rdr.deserialize::<ImportRow>() {
        let row = row?;

        let (Some(item_name), Some(brand), Some(model)) = (
            required(row.item_name),
            required(row.brand),
            required(row.model),
        ) else {
            dropped += 1;
            continue;
        };

        items.push(InventoryItem {
            item_name,
            brand,
            model,
            stock_quantity: numeric(row.stock_quantity.as_ref(), 0),
            purchase_price: numeric(row.purchase_price.as_ref(), 0.0),
            selling_price: numeric(row.selling_price.as_ref(), 0.0),
            branch_id: branch_id.to_string(),
            last_updated: now,
            low_stock_threshold: Some(numeric(
                row.low_stock_threshold.as_ref(),
                DEFAULT_LOW_STOCK_THRESHOLD,
            )),
            ..InventoryItem::default()
        });
    }

    if dropped > 0 {
        debug!("Dropped {dropped} import rows missing item name, brand, or model");
    }

    Ok(items)
}

#[cfg(test)]
mod test {
    use super::*;

    fn read(csv: &str) -> Vec<InventoryItem> {
        read_items(csv.as_bytes(), "b1", Utc::now()).unwrap()
    }

    #[test]
    fn rows_missing_required_fields_are_dropped() {
        let items = read(
            "Item Name,Brand,Model,Stock Quantity\n\
             iPhone Screen,Apple,iPhone 12,10\n\
             Samsung Battery,Samsung,,15\n\
             Charging Port,Google,Pixel 7,5\n",
        );

        assert_eq!(items.len(), 2);
        assert_eq!(items.first().unwrap().item_name, "iPhone Screen");
        assert_eq!(items.last().unwrap().item_name, "Charging Port");
        // Threshold column absent entirely: the default applies.
        assert!(items.iter().all(|item| item.threshold() == 10));
    }

    #[test]
    fn unparsable_numbers_fall_back_to_defaults() {
        let items = read(
            "Item Name,Brand,Model,Stock Quantity,Purchase Price,Low Stock Threshold\n\
             iPhone Screen,Apple,iPhone 12,lots,abc,soon\n",
        );

        let item = items.first().unwrap();
        assert_eq!(item.stock_quantity, 0);
        assert_eq!(item.purchase_price, 0.0);
        assert_eq!(item.threshold(), 10);
    }

    #[test]
    fn camel_case_headers_are_accepted() {
        let items = read(
            "itemName,brand,model,stockQuantity,purchasePrice,sellingPrice,lowStockThreshold\n\
             iPhone Screen,Apple,iPhone 12,10,2500,3500,5\n",
        );

        let item = items.first().unwrap();
        assert_eq!(item.stock_quantity, 10);
        assert_eq!(item.purchase_price, 2500.0);
        assert_eq!(item.selling_price, 3500.0);
        assert_eq!(item.threshold(), 5);
    }

    #[test]
    fn rows_assigned_to_the_branch() {
        let items = read("Item Name,Brand,Model\nScreen,Apple,iPhone 12\n");

        assert_eq!(items.first().unwrap().branch_id, "b1");
        assert_eq!(items.first().unwrap().stock_quantity, 0);
    }
}
