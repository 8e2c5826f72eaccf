use chrono::{NaiveDate, NaiveTime, Utc};
use clap::Subcommand;
use colored::{ColoredString, Colorize};
use repairdesk_lib::{Repository, Result, ServiceDraft, ServiceEntry, ServiceFilter, ServiceStatus};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List service entries for the branch, newest first
    List {
        /// Match against bill number, device, model, or technician
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<ServiceStatus>,
    },
    /// Create a new service entry
    Add {
        device: String,
        model: String,
        /// Expected delivery date (YYYY-MM-DD)
        #[arg(long)]
        due: NaiveDate,
        #[arg(long, default_value = "")]
        problem: String,
        #[arg(long)]
        imei: Option<String>,
        #[arg(long)]
        technician: Option<String>,
        /// Manual bill number; leaves the branch counter untouched
        #[arg(long)]
        bill_number: Option<String>,
    },
    /// Show one entry with its full status history
    Show { id: String },
    /// Move an entry one step along the status chain
    Advance {
        id: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Mark a ready entry as delivered
    Deliver {
        id: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Mark a ready entry as returned to the customer
    Return {
        id: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete an entry
    Remove { id: String },
}

pub fn handle(repo: &Repository, cmd: &Command, branch: Option<&str>) -> Result<()> {
    match cmd {
        Command::List { search, status } => {
            let branch = crate::resolve_branch(repo, branch)?;
            let filter = ServiceFilter {
                term: search.clone(),
                status: *status,
            };
            for entry in repo.services(&branch.id, &filter) {
                print_line(&entry);
            }
        }
        Command::Add {
            device,
            model,
            due,
            problem,
            imei,
            technician,
            bill_number,
        } => {
            let branch = crate::resolve_branch(repo, branch)?;
            let entry = repo.create_service(
                &branch.id,
                ServiceDraft {
                    bill_number: bill_number.clone(),
                    device_name: device.clone(),
                    model: model.clone(),
                    imei: imei.clone(),
                    problem_description: problem.clone(),
                    technician: technician.clone(),
                    expected_delivery: due.and_time(NaiveTime::MIN).and_utc(),
                    delay_reason: None,
                },
            )?;
            println!("Created {} ({})", entry.bill_number.bold(), entry.id);
        }
        Command::Show { id } => {
            let entry = repo.service(id)?;
            print_line(&entry);
            if !entry.problem_description.is_empty() {
                println!("  problem: {}", entry.problem_description);
            }
            if let Some(technician) = &entry.technician {
                println!("  technician: {technician}");
            }
            println!("  history:");
            for record in &entry.history {
                println!(
                    "    {} {} by {}{}",
                    record.timestamp.format("%Y-%m-%d %H:%M"),
                    status_label(record.status),
                    record.user,
                    record
                        .notes
                        .as_deref()
                        .map(|n| format!(" — {n}"))
                        .unwrap_or_default()
                );
            }
        }
        Command::Advance { id, notes } => {
            let status = repo.advance_service(id, notes.as_deref())?;
            println!("Now {}", status_label(status));
        }
        Command::Deliver { id, notes } => {
            repo.deliver_service(id, notes.as_deref())?;
            println!("Now {}", status_label(ServiceStatus::Delivered));
        }
        Command::Return { id, notes } => {
            repo.return_service(id, notes.as_deref())?;
            println!("Now {}", status_label(ServiceStatus::Returned));
        }
        Command::Remove { id } => {
            repo.remove_service(id);
        }
    }

    Ok(())
}

fn print_line(entry: &ServiceEntry) {
    let now = Utc::now();
    let mut flags = String::new();
    if entry.is_overdue(now) {
        flags.push_str(&format!(" {}", "OVERDUE".red().bold()));
    }
    if entry.is_stale(now) {
        flags.push_str(&format!(" {}", "6+ MONTHS".red()));
    }

    println!(
        "{} {} {} {} due {}{flags}",
        entry.bill_number.bold(),
        entry.device_name,
        entry.model,
        status_label(entry.status()),
        entry.expected_delivery.format("%Y-%m-%d"),
    );
}

pub(crate) fn status_label(status: ServiceStatus) -> ColoredString {
    let label = status.to_string();
    match status {
        ServiceStatus::Pending => label.yellow(),
        ServiceStatus::InProcess => label.magenta(),
        ServiceStatus::Ready => label.blue(),
        ServiceStatus::Delivered => label.green(),
        ServiceStatus::Returned => label.red(),
    }
}
