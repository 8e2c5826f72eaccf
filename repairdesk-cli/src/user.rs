use clap::Subcommand;
use colored::Colorize;
use repairdesk_lib::{Repository, Result, Role};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List operator accounts
    List,
    /// Add an account
    Add {
        name: String,
        username: String,
        password: String,
        #[arg(long, default_value_t = Role::User)]
        role: Role,
        /// Restrict the account to one branch
        #[arg(long)]
        branch_id: Option<String>,
    },
    /// Remove an account
    Remove { id: String },
    /// Log in as an operator
    Login { username: String, password: String },
    /// Log the current operator out
    Logout,
}

pub fn handle(repo: &Repository, cmd: &Command) -> Result<()> {
    match cmd {
        Command::List => {
            let current = repo.current_user();
            for user in repo.users() {
                let marker = if current.as_ref().is_some_and(|c| c.id == user.id) {
                    "*".green().bold()
                } else {
                    " ".normal()
                };
                println!("{marker} {} (@{}) {}", user.name, user.username, user.role);
            }
        }
        Command::Add {
            name,
            username,
            password,
            role,
            branch_id,
        } => {
            let user = repo.add_user(name, username, password, *role, branch_id.as_deref())?;
            println!("Added user {} (@{})", user.name, user.username);
        }
        Command::Remove { id } => {
            repo.remove_user(id)?;
        }
        Command::Login { username, password } => {
            let user = repo.login(username, password)?;
            println!("Logged in as {}", user.name.bold());
        }
        Command::Logout => {
            repo.logout();
        }
    }

    Ok(())
}
