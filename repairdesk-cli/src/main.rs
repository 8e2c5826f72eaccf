use clap::{Parser, Subcommand};
use colored::Colorize;
use repairdesk_lib::{Branch, Error, Repository, Result};
use sysexits::ExitCode;

mod bill;
mod branch;
mod inventory;
mod report;
mod service;
mod user;

#[derive(Parser, Debug)]
#[command(name = "repairdesk")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Override the selected branch by code or id
    #[arg(short, long, global = true)]
    branch: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Operate on branches
    #[command(subcommand)]
    Branch(branch::Command),
    /// Operate on service entries
    #[command(subcommand)]
    Service(service::Command),
    /// Operate on inventory
    #[command(subcommand)]
    Inventory(inventory::Command),
    /// Operate on operator accounts
    #[command(subcommand)]
    User(user::Command),
    /// Inspect or edit bill-number settings
    #[command(subcommand)]
    Bill(bill::Command),
    /// Reports and dashboard figures
    #[command(subcommand)]
    Report(report::Command),
}

fn main() -> ExitCode {
    human_panic::setup_panic!();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let repo = Repository::new();
    let cli = Cli::parse();

    let branch = cli.branch.as_deref();
    let result = match &cli.command {
        Command::Branch(cmd) => branch::handle(&repo, cmd),
        Command::Service(cmd) => service::handle(&repo, cmd, branch),
        Command::Inventory(cmd) => inventory::handle(&repo, cmd, branch),
        Command::User(cmd) => user::handle(&repo, cmd),
        Command::Bill(cmd) => bill::handle(&repo, cmd, branch),
        Command::Report(cmd) => report::handle(&repo, cmd, branch),
    };

    match result.and_then(|()| repo.commit()) {
        Ok(()) => ExitCode::Ok,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            exit_code(&err)
        }
    }
}

fn exit_code(err: &Error) -> ExitCode {
    match err {
        Error::BadCredentials | Error::NotLoggedIn | Error::BuiltinAdmin => ExitCode::NoPerm,
        Error::Csv(_) | Error::EmptyImport => ExitCode::DataErr,
        Error::Store(_) | Error::Io(_) => ExitCode::IoErr,
        Error::DuplicateUsername(_) | Error::NoSelectedBranch => ExitCode::Usage,
        _ => ExitCode::Unavailable,
    }
}

/// The branch a command operates on: an explicit `--branch` override (code
/// or id) or the persisted selection.
pub(crate) fn resolve_branch(repo: &Repository, key: Option<&str>) -> Result<Branch> {
    if let Some(key) = key {
        return repo
            .branches()
            .into_iter()
            .find(|b| b.id == key || b.code.eq_ignore_ascii_case(key))
            .ok_or_else(|| Error::BranchNotFound(key.to_string()));
    }

    repo.selected_branch().ok_or(Error::NoSelectedBranch)
}
