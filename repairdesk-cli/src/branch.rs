use clap::Subcommand;
use colored::Colorize;
use repairdesk_lib::{Repository, Result};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List branches
    List,
    /// Add a new branch
    Add {
        name: String,
        code: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        manager: Option<String>,
    },
    /// Make a branch the selected one
    Select { code: String },
    /// Clear the branch selection
    Deselect,
    /// Remove a branch and its bill sequence
    Remove { code: String },
}

pub fn handle(repo: &Repository, cmd: &Command) -> Result<()> {
    match cmd {
        Command::List => {
            let selected = repo.selected_branch();
            for branch in repo.branches() {
                let marker = if selected.as_ref().is_some_and(|s| s.id == branch.id) {
                    "*".green().bold()
                } else {
                    " ".normal()
                };
                println!("{marker} {} [{}]", branch.name, branch.code.bold());
            }
        }
        Command::Add {
            name,
            code,
            address,
            phone,
            manager,
        } => {
            let branch = repo.add_branch(
                name,
                code,
                address.as_deref(),
                phone.as_deref(),
                manager.as_deref(),
            )?;
            println!("Added branch {} [{}]", branch.name, branch.code.bold());
        }
        Command::Select { code } => {
            let branch = crate::resolve_branch(repo, Some(code))?;
            repo.select_branch(Some(&branch.id))?;
            println!("Selected branch {}", branch.name);
        }
        Command::Deselect => {
            repo.select_branch(None)?;
        }
        Command::Remove { code } => {
            let branch = crate::resolve_branch(repo, Some(code))?;
            repo.remove_branch(&branch.id)?;
            println!("Removed branch {}", branch.name);
        }
    }

    Ok(())
}
