//! Core library for Repairdesk, a service-center management tool.
//!
//! All state lives in a single in-memory [`Snapshot`] persisted as one JSON
//! blob; the [`Repository`] is the central access point for branches,
//! inventory, service entries, users, bill sequences, and reports.

pub mod fs;
pub mod repository;

pub use repository::{
    ADMIN_USER_ID, BillSequence, Branch, BranchReport, DEFAULT_BILL_FORMAT,
    DEFAULT_LOW_STOCK_THRESHOLD, DashboardMetrics, Error, InventoryItem, Repository, Result, Role,
    ServiceDraft, ServiceEntry, ServiceFilter, ServiceStatus, Snapshot, StatusRecord,
    TechnicianStats, User, inventory_export_name, report_export_name,
};
