//! Branch reports and dashboard metrics, computed from the snapshot.
//! Everything here is read-only and derived; nothing is stored.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::repository::{
    entities::{ServiceEntry, ServiceStatus},
    store::Snapshot,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TechnicianStats {
    pub total: usize,
    pub completed: usize,
}

/// Service and inventory figures for one branch over a date range.
#[derive(Debug, Clone, Default)]
pub struct BranchReport {
    pub total_services: usize,
    pub completed_services: usize,
    pub pending_services: usize,
    /// Percentage of services delivered within the range.
    pub completion_rate: f64,
    pub status_breakdown: BTreeMap<ServiceStatus, usize>,
    pub technician_performance: BTreeMap<String, TechnicianStats>,
    pub daily_services: BTreeMap<NaiveDate, usize>,
    pub total_inventory_items: usize,
    /// Stock quantity times purchase price, summed over the branch.
    pub total_inventory_value: f64,
    pub low_stock_items: usize,
}

/// Operator-facing counters shown on the landing screen.
#[derive(Debug, Clone, Default)]
pub struct DashboardMetrics {
    pub today_service_count: usize,
    pub tomorrow_pending_services: usize,
    pub in_process_count: usize,
    pub ready_for_delivery_count: usize,
    pub over_six_month_count: usize,
    /// Total service entries per branch, across all branches.
    pub branch_totals: BTreeMap<String, usize>,
}

pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    f64::from(u32::try_from(part).unwrap_or(u32::MAX))
        / f64::from(u32::try_from(whole).unwrap_or(u32::MAX))
        * 100.0
}

pub(crate) fn branch_report(
    snapshot: &Snapshot,
    branch_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> BranchReport {
    let in_range = |entry: &&ServiceEntry| {
        let date = entry.entry_date.date_naive();
        entry.branch_id == branch_id && date >= from && date <= to
    };
    let services: Vec<&ServiceEntry> = snapshot.service_entries.iter().filter(in_range).collect();

    let total_services = services.len();
    let completed_services = services
        .iter()
        .filter(|s| s.status() == ServiceStatus::Delivered)
        .count();

    let mut status_breakdown = BTreeMap::new();
    let mut technician_performance: BTreeMap<String, TechnicianStats> = BTreeMap::new();
    let mut daily_services = BTreeMap::new();
    for entry in &services {
        *status_breakdown.entry(entry.status()).or_default() += 1;
        *daily_services
            .entry(entry.entry_date.date_naive())
            .or_default() += 1;

        let technician = entry.technician.as_deref().unwrap_or("unassigned");
        let stats = technician_performance
            .entry(technician.to_string())
            .or_default();
        stats.total += 1;
        if entry.status() == ServiceStatus::Delivered {
            stats.completed += 1;
        }
    }

    let inventory: Vec<_> = snapshot
        .inventory_items
        .iter()
        .filter(|item| item.branch_id == branch_id)
        .collect();

    BranchReport {
        total_services,
        completed_services,
        pending_services: total_services - completed_services,
        completion_rate: percentage(completed_services, total_services),
        status_breakdown,
        technician_performance,
        daily_services,
        total_inventory_items: inventory.len(),
        total_inventory_value: inventory.iter().map(|item| item.stock_value()).sum(),
        low_stock_items: inventory.iter().filter(|item| item.is_low_stock()).count(),
    }
}

pub(crate) fn dashboard_metrics(
    snapshot: &Snapshot,
    branch_id: &str,
    now: DateTime<Utc>,
) -> DashboardMetrics {
    let today = now.date_naive();
    let tomorrow = today.succ_opt();
    let branch_services: Vec<&ServiceEntry> = snapshot
        .service_entries
        .iter()
        .filter(|entry| entry.branch_id == branch_id)
        .collect();

    let mut branch_totals = BTreeMap::new();
    for branch in &snapshot.branches {
        branch_totals.insert(
            branch.id.clone(),
            snapshot
                .service_entries
                .iter()
                .filter(|entry| entry.branch_id == branch.id)
                .count(),
        );
    }

    DashboardMetrics {
        today_service_count: branch_services
            .iter()
            .filter(|entry| entry.entry_date.date_naive() == today)
            .count(),
        tomorrow_pending_services: branch_services
            .iter()
            .filter(|entry| {
                entry.status() != ServiceStatus::Delivered
                    && tomorrow.is_some_and(|t| entry.expected_delivery.date_naive() == t)
            })
            .count(),
        in_process_count: branch_services
            .iter()
            .filter(|entry| entry.status() == ServiceStatus::InProcess)
            .count(),
        ready_for_delivery_count: branch_services
            .iter()
            .filter(|entry| entry.status() == ServiceStatus::Ready)
            .count(),
        over_six_month_count: branch_services
            .iter()
            .filter(|entry| entry.is_stale(now))
            .count(),
        branch_totals,
    }
}
