use std::fs;

use chrono::{Duration, Local, NaiveDate};
use clap::Subcommand;
use colored::Colorize;
use repairdesk_lib::{Repository, Result, report_export_name};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Branch figures over a date range (defaults to the last 30 days)
    Show {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Write the flat text report to a file
    Export {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Today's operational counters
    Dashboard,
}

fn range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> (NaiveDate, NaiveDate) {
    let today = Local::now().date_naive();
    (from.unwrap_or(today - Duration::days(30)), to.unwrap_or(today))
}

pub fn handle(repo: &Repository, cmd: &Command, branch: Option<&str>) -> Result<()> {
    let branch = crate::resolve_branch(repo, branch)?;

    match cmd {
        Command::Show { from, to } => {
            let (from, to) = range(*from, *to);
            let report = repo.report(&branch.id, from, to)?;

            println!("{} ({from} to {to})", branch.name.bold());
            println!("services:   {}", report.total_services);
            println!("completed:  {}", report.completed_services);
            println!("pending:    {}", report.pending_services);
            println!("rate:       {:.1}%", report.completion_rate);
            for (status, count) in &report.status_breakdown {
                println!("  {} {count}", crate::service::status_label(*status));
            }
            println!("inventory:  {} items", report.total_inventory_items);
            println!("value:      ₹{:.2}", report.total_inventory_value);
            println!("low stock:  {}", report.low_stock_items);
        }
        Command::Export { from, to } => {
            let (from, to) = range(*from, *to);
            let text = repo.export_report_text(&branch.id, from, to)?;
            let name = report_export_name(&branch.code, from, to);
            fs::write(&name, text)?;
            println!("Wrote {name}");
        }
        Command::Dashboard => {
            let metrics = repo.dashboard(&branch.id)?;

            println!("{}", branch.name.bold());
            println!("today:        {}", metrics.today_service_count);
            println!("due tomorrow: {}", metrics.tomorrow_pending_services);
            println!("in process:   {}", metrics.in_process_count);
            println!("ready:        {}", metrics.ready_for_delivery_count);
            println!("6+ months:    {}", metrics.over_six_month_count);
        }
    }

    Ok(())
}
