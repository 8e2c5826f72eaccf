//! Core domain entities for Repairdesk.
//!
//! These types represent branches, inventory items, service entries, and
//! users managed by the system. They are plain data carried inside the
//! snapshot; all cross-entity rules (uniqueness, cascades, sequencing) live
//! in the [`Repository`](crate::Repository).

use thiserror::Error;

mod branch;
mod inventory;
mod service;
mod user;

pub use branch::Branch;
pub use inventory::{DEFAULT_LOW_STOCK_THRESHOLD, InventoryItem};
pub use service::{ServiceDraft, ServiceEntry, ServiceStatus, StatusRecord};
pub use user::{ADMIN_USER_ID, Role, User};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] crate::repository::store::StoreError),
    #[error("csv data error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no branch with id {0}")]
    BranchNotFound(String),
    #[error("no service entry with id {0}")]
    ServiceNotFound(String),
    #[error("no inventory item with id {0}")]
    ItemNotFound(String),
    #[error("no user with id {0}")]
    UserNotFound(String),
    #[error("no bill sequence for branch {0}")]
    SequenceNotFound(String),
    #[error("username {0} already exists")]
    DuplicateUsername(String),
    #[error("the built-in admin account cannot be deleted")]
    BuiltinAdmin,
    #[error("invalid username or password")]
    BadCredentials,
    #[error("no branch is selected")]
    NoSelectedBranch,
    #[error("no user is logged in")]
    NotLoggedIn,
    #[error("no forward transition from {0}")]
    TerminalStatus(ServiceStatus),
    #[error("cannot move from {from} to {to}")]
    InvalidTransition {
        from: ServiceStatus,
        to: ServiceStatus,
    },
    #[error("no valid rows found in import data")]
    EmptyImport,
}
