//! Flat-file rendering of inventory listings and branch reports. These are
//! presentation helpers over already-computed values; the CLI decides where
//! the output goes.

use chrono::{DateTime, NaiveDate, Utc};
use heck::ToSnakeCase;

use crate::repository::{
    entities::{Branch, InventoryItem, Result},
    report::{BranchReport, percentage},
};

/// Render inventory items as CSV with the same columns the bulk import
/// accepts.
pub(crate) fn inventory_csv(items: &[InventoryItem]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);

    writer.write_record([
        "Item Name",
        "Brand",
        "Model",
        "Stock Quantity",
        "Purchase Price",
        "Selling Price",
        "Low Stock Threshold",
        "Last Updated",
    ])?;

    for item in items {
        writer.write_record([
            item.item_name.as_str(),
            item.brand.as_str(),
            item.model.as_str(),
            &item.stock_quantity.to_string(),
            &item.purchase_price.to_string(),
            &item.selling_price.to_string(),
            &item.threshold().to_string(),
            &item.last_updated.format("%Y-%m-%d").to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(csv::IntoInnerError::into_error)?;
    Ok(String::from_utf8(bytes).expect("csv output is utf-8"))
}

/// The flat text report the original tool offered for download.
pub(crate) fn report_text(
    report: &BranchReport,
    branch: &Branch,
    from: NaiveDate,
    to: NaiveDate,
    generated: DateTime<Utc>,
) -> String {
    let mut lines = vec![
        format!("Service Center Report - {}", branch.name),
        format!("Generated: {}", generated.format("%Y-%m-%d %H:%M:%S")),
        format!("Period: {from} to {to}"),
        String::new(),
        "SERVICE METRICS".to_string(),
        format!("Total Services: {}", report.total_services),
        format!("Completed Services: {}", report.completed_services),
        format!("Pending Services: {}", report.pending_services),
        format!("Completion Rate: {:.1}%", report.completion_rate),
        String::new(),
        "STATUS BREAKDOWN".to_string(),
    ];
    lines.extend(
        report
            .status_breakdown
            .iter()
            .map(|(status, count)| format!("{}: {count}", status.to_string().to_uppercase())),
    );

    lines.push(String::new());
    lines.push("TECHNICIAN PERFORMANCE".to_string());
    lines.extend(report.technician_performance.iter().map(|(tech, stats)| {
        format!(
            "{tech}: {}/{} ({:.1}%)",
            stats.completed,
            stats.total,
            percentage(stats.completed, stats.total)
        )
    }));

    lines.push(String::new());
    lines.push("INVENTORY METRICS".to_string());
    lines.push(format!(
        "Total Inventory Items: {}",
        report.total_inventory_items
    ));
    lines.push(format!(
        "Total Inventory Value: ₹{:.2}",
        report.total_inventory_value
    ));
    lines.push(format!("Low Stock Items: {}", report.low_stock_items));

    lines.join("\n")
}

pub fn inventory_export_name(branch_code: &str, date: NaiveDate) -> String {
    format!("inventory_{}_{date}.csv", branch_code.to_snake_case())
}

pub fn report_export_name(branch_code: &str, from: NaiveDate, to: NaiveDate) -> String {
    format!("report_{}_{from}_to_{to}.txt", branch_code.to_snake_case())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn inventory_csv_defaults_the_threshold() {
        let item = InventoryItem {
            item_name: "iPhone Screen".to_string(),
            brand: "Apple".to_string(),
            model: "iPhone 12".to_string(),
            stock_quantity: 10,
            purchase_price: 2500.0,
            selling_price: 3500.0,
            ..InventoryItem::default()
        };

        let csv = inventory_csv(&[item]).unwrap();
        let mut lines = csv.lines();

        assert!(lines.next().unwrap().starts_with("Item Name,Brand,Model"));
        assert!(
            lines
                .next()
                .unwrap()
                .starts_with("iPhone Screen,Apple,iPhone 12,10,2500,3500,10,")
        );
    }

    #[test]
    fn report_text_sections() {
        let branch = Branch::new("Main Branch", "MAIN");
        let report = BranchReport {
            total_services: 4,
            completed_services: 2,
            pending_services: 2,
            completion_rate: 50.0,
            ..BranchReport::default()
        };
        let from = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();

        let text = report_text(&report, &branch, from, to, Utc::now());

        assert!(text.starts_with("Service Center Report - Main Branch"));
        assert!(text.contains("Period: 2025-01-01 to 2025-01-31"));
        assert!(text.contains("Total Services: 4"));
        assert!(text.contains("Completion Rate: 50.0%"));
        assert!(text.contains("STATUS BREAKDOWN"));
        assert!(text.contains("INVENTORY METRICS"));
    }

    #[test]
    fn export_names_use_snake_case_codes() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        assert_eq!(
            inventory_export_name("MAIN", date),
            "inventory_main_2025-01-15.csv"
        );
        assert_eq!(
            report_export_name("MAIN", date, date),
            "report_main_2025-01-15_to_2025-01-15.txt"
        );
    }
}
