use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::{
    entities::{Branch, InventoryItem, ServiceEntry, ServiceStatus, User},
    sequence::BillSequence,
};

/// The full persisted state: every collection plus the branch selection and
/// the logged-in user.
///
/// Every field carries its own default so a partially corrupt snapshot
/// degrades collection-by-collection instead of being rejected whole. The
/// selection and the current user are stored by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub branches: Vec<Branch>,
    pub inventory_items: Vec<InventoryItem>,
    pub service_entries: Vec<ServiceEntry>,
    pub users: Vec<User>,
    pub bill_settings: Vec<BillSequence>,
    pub selected_branch: Option<String>,
    pub current_user: Option<String>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            branches: Vec::new(),
            inventory_items: Vec::new(),
            service_entries: Vec::new(),
            users: vec![User::builtin_admin()],
            bill_settings: Vec::new(),
            selected_branch: None,
            current_user: None,
        }
    }
}

impl Snapshot {
    /// The built-in admin must always exist; re-seed it when a loaded
    /// snapshot lost its users collection.
    pub(crate) fn ensure_admin(&mut self) {
        if !self.users.iter().any(User::is_builtin_admin) {
            self.users.push(User::builtin_admin());
        }
    }

    pub fn branch(&self, id: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.id == id)
    }

    pub(crate) fn branch_mut(&mut self, id: &str) -> Option<&mut Branch> {
        self.branches.iter_mut().find(|b| b.id == id)
    }

    pub fn sequence(&self, branch_id: &str) -> Option<&BillSequence> {
        self.bill_settings.iter().find(|s| s.branch_id == branch_id)
    }

    pub(crate) fn sequence_mut(&mut self, branch_id: &str) -> Option<&mut BillSequence> {
        self.bill_settings
            .iter_mut()
            .find(|s| s.branch_id == branch_id)
    }

    pub fn service(&self, id: &str) -> Option<&ServiceEntry> {
        self.service_entries.iter().find(|s| s.id == id)
    }

    pub(crate) fn service_mut(&mut self, id: &str) -> Option<&mut ServiceEntry> {
        self.service_entries.iter_mut().find(|s| s.id == id)
    }

    pub fn item(&self, id: &str) -> Option<&InventoryItem> {
        self.inventory_items.iter().find(|i| i.id == id)
    }

    pub(crate) fn item_mut(&mut self, id: &str) -> Option<&mut InventoryItem> {
        self.inventory_items.iter_mut().find(|i| i.id == id)
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub(crate) fn user_mut(&mut self, id: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    /// Drop delivered entries whose final status record is at or before
    /// `cutoff`. Covers purge tasks that were pending when a previous
    /// process exited; returns how many entries were dropped.
    pub(crate) fn sweep_delivered(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.service_entries.len();
        self.service_entries.retain(|entry| {
            entry.status() != ServiceStatus::Delivered
                || entry
                    .history
                    .last()
                    .is_none_or(|record| record.timestamp > cutoff)
        });
        before - self.service_entries.len()
    }
}
