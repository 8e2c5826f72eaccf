use std::fs::{self, File};

use chrono::Local;
use clap::Subcommand;
use colored::Colorize;
use repairdesk_lib::{InventoryItem, Repository, Result, inventory_export_name};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the branch's inventory
    List {
        /// Match against item name, brand, or model
        #[arg(long)]
        search: Option<String>,
        /// Only items at or below their low-stock threshold
        #[arg(long)]
        low: bool,
    },
    /// Add an inventory item
    Add {
        name: String,
        brand: String,
        model: String,
        #[arg(long, default_value_t = 0)]
        qty: u32,
        #[arg(long, default_value_t = 0.0)]
        purchase: f64,
        #[arg(long, default_value_t = 0.0)]
        selling: f64,
        #[arg(long)]
        threshold: Option<u32>,
    },
    /// Remove an item
    Remove { id: String },
    /// Bulk-import items from a CSV file
    Import { file: String },
    /// Write the branch inventory to a CSV file
    Export,
}

pub fn handle(repo: &Repository, cmd: &Command, branch: Option<&str>) -> Result<()> {
    let branch = crate::resolve_branch(repo, branch)?;

    match cmd {
        Command::List { search, low } => {
            let items = repo
                .items(&branch.id)
                .into_iter()
                .filter(|item| search.as_deref().is_none_or(|term| item.matches(term)))
                .filter(|item| !low || item.is_low_stock());
            for item in items {
                let marker = if item.is_low_stock() {
                    format!(" {}", "LOW".red().bold())
                } else {
                    String::new()
                };
                println!(
                    "{} {} {} x{}{marker} (buy {} / sell {})",
                    item.item_name.bold(),
                    item.brand,
                    item.model,
                    item.stock_quantity,
                    item.purchase_price,
                    item.selling_price,
                );
            }
        }
        Command::Add {
            name,
            brand,
            model,
            qty,
            purchase,
            selling,
            threshold,
        } => {
            let item = repo.add_item(InventoryItem {
                item_name: name.clone(),
                brand: brand.clone(),
                model: model.clone(),
                stock_quantity: *qty,
                purchase_price: *purchase,
                selling_price: *selling,
                low_stock_threshold: *threshold,
                branch_id: branch.id.clone(),
                ..InventoryItem::default()
            })?;
            println!("Added {} ({})", item.item_name, item.id);
        }
        Command::Remove { id } => {
            repo.remove_item(id)?;
        }
        Command::Import { file } => {
            let accepted = repo.import_inventory(&branch.id, File::open(file)?)?;
            println!("Imported {accepted} items into {}", branch.name);
        }
        Command::Export => {
            let csv = repo.export_inventory_csv(&branch.id)?;
            let name = inventory_export_name(&branch.code, Local::now().date_naive());
            fs::write(&name, csv)?;
            println!("Wrote {name}");
        }
    }

    Ok(())
}
