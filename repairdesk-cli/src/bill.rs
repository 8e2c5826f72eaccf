use clap::Subcommand;
use colored::Colorize;
use repairdesk_lib::{BillSequence, Repository, Result};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the branch's bill settings and a preview of the next number
    Show,
    /// Edit the branch's bill settings
    Set {
        #[arg(long)]
        prefix: Option<String>,
        /// Counter value for the next bill; clamps at 1
        #[arg(long)]
        number: Option<u32>,
        /// Format template; {PREFIX}, {YY}, {MM}, and {####} are substituted
        #[arg(long)]
        format: Option<String>,
    },
}

pub fn handle(repo: &Repository, cmd: &Command, branch: Option<&str>) -> Result<()> {
    let branch = crate::resolve_branch(repo, branch)?;
    let settings = repo.bill_settings(&branch.id)?;

    match cmd {
        Command::Show => {
            println!("prefix:  {}", settings.prefix);
            println!("number:  {}", settings.current_number);
            println!("format:  {}", settings.format);
            println!(
                "preview: {}",
                repo.preview_bill_number(&branch.id)?.bold()
            );
        }
        Command::Set {
            prefix,
            number,
            format,
        } => {
            repo.update_bill_settings(BillSequence {
                prefix: prefix.clone().unwrap_or(settings.prefix),
                current_number: number.unwrap_or(settings.current_number),
                format: format.clone().unwrap_or(settings.format),
                branch_id: settings.branch_id,
            })?;
            println!(
                "Updated bill settings; next: {}",
                repo.preview_bill_number(&branch.id)?.bold()
            );
        }
    }

    Ok(())
}
