use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::repository::{
    config::{Cfg, CoreConfig},
    store::Store,
};

pub mod config;
pub mod entities;
mod export;
mod import;
pub mod report;
pub mod sequence;
pub mod store;

pub use entities::{
    ADMIN_USER_ID, Branch, DEFAULT_LOW_STOCK_THRESHOLD, Error, InventoryItem, Result, Role,
    ServiceDraft, ServiceEntry, ServiceStatus, StatusRecord, User,
};
pub use export::{inventory_export_name, report_export_name};
pub use report::{BranchReport, DashboardMetrics, TechnicianStats};
pub use sequence::{BillSequence, DEFAULT_BILL_FORMAT};
pub use store::{Snapshot, StoreError};

/// Central access point for all application state.
///
/// The [`Repository`] wraps the snapshot store and the configuration file
/// and exposes every operation the operator surfaces need: branches, users,
/// inventory, service entries, bill sequences, and reports. Mutations are
/// applied to the in-memory snapshot only; nothing reaches disk until
/// [`Repository::commit`] is called.
#[derive(Clone, Debug)]
pub struct Repository {
    store: Store,
    cfg: Cfg,
}

/// Search and status filters for service listings.
#[derive(Debug, Clone, Default)]
pub struct ServiceFilter {
    pub term: Option<String>,
    pub status: Option<ServiceStatus>,
}

impl ServiceFilter {
    fn accepts(&self, entry: &ServiceEntry) -> bool {
        self.term.as_deref().is_none_or(|term| entry.matches(term))
            && self.status.is_none_or(|status| entry.status() == status)
    }
}

impl Repository {
    pub fn new() -> Self {
        let cfg: Cfg = Arc::new(RwLock::new(CoreConfig::load()));
        let (path, purge_delay, backup_keep) = {
            let cfg = cfg.read();
            (cfg.snapshot_file(), cfg.purge_delay(), cfg.backup_keep())
        };

        Self {
            store: Store::open(&path, purge_delay, backup_keep),
            cfg,
        }
    }

    /// Persist the current snapshot. Every state-changing operation only
    /// touches memory; callers decide when a batch of changes is committed.
    pub fn commit(&self) -> Result<()> {
        Ok(self.store.save()?)
    }

    /// A consistent read-only view of the full state.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.store.current()
    }

    // Branches

    pub fn add_branch(
        &self,
        name: &str,
        code: &str,
        address: Option<&str>,
        phone: Option<&str>,
        manager: Option<&str>,
    ) -> Result<Branch> {
        let branch = Branch {
            address: address.map(str::to_string),
            phone: phone.map(str::to_string),
            manager: manager.map(str::to_string),
            ..Branch::new(name, code)
        };

        self.store.update(|snapshot| {
            snapshot
                .bill_settings
                .push(BillSequence::new(&branch.id, &branch.code));
            snapshot.branches.push(branch.clone());
        });

        debug!("Created new branch: {}", branch.name);

        Ok(branch)
    }

    pub fn branches(&self) -> Vec<Branch> {
        self.snapshot().branches.clone()
    }

    pub fn branch(&self, id: &str) -> Result<Branch> {
        self.snapshot()
            .branch(id)
            .cloned()
            .ok_or_else(|| Error::BranchNotFound(id.to_string()))
    }

    /// Replace a branch's fields. The branch's bill sequence follows the
    /// code: editing the code re-points the prefix.
    pub fn update_branch(&self, branch: Branch) -> Result<()> {
        self.store.try_update(|snapshot| {
            let existing = snapshot
                .branch_mut(&branch.id)
                .ok_or_else(|| Error::BranchNotFound(branch.id.clone()))?;
            *existing = branch.clone();

            if let Some(sequence) = snapshot.sequence_mut(&branch.id) {
                sequence.prefix = branch.code.clone();
            }

            Ok(())
        })
    }

    /// Remove a branch together with its bill sequence, clearing the
    /// selection when it pointed here. Inventory and service entries keep
    /// their branch reference.
    pub fn remove_branch(&self, id: &str) -> Result<()> {
        self.store.try_update(|snapshot| {
            if snapshot.branch(id).is_none() {
                return Err(Error::BranchNotFound(id.to_string()));
            }

            snapshot.branches.retain(|b| b.id != id);
            snapshot.bill_settings.retain(|s| s.branch_id != id);
            if snapshot.selected_branch.as_deref() == Some(id) {
                snapshot.selected_branch = None;
            }

            Ok(())
        })?;

        debug!("Removed branch {id}");

        Ok(())
    }

    pub fn select_branch(&self, id: Option<&str>) -> Result<()> {
        self.store.try_update(|snapshot| {
            if let Some(id) = id
                && snapshot.branch(id).is_none()
            {
                return Err(Error::BranchNotFound(id.to_string()));
            }

            snapshot.selected_branch = id.map(str::to_string);
            Ok(())
        })
    }

    pub fn selected_branch(&self) -> Option<Branch> {
        let snapshot = self.snapshot();
        snapshot
            .selected_branch
            .as_deref()
            .and_then(|id| snapshot.branch(id))
            .cloned()
    }

    // Users

    pub fn login(&self, username: &str, password: &str) -> Result<User> {
        let now = Utc::now();

        self.store.try_update(|snapshot| {
            let user = snapshot
                .users
                .iter_mut()
                .find(|u| u.username == username && u.password == password)
                .ok_or(Error::BadCredentials)?;

            user.last_login = Some(now);
            let user = user.clone();
            snapshot.current_user = Some(user.id.clone());

            Ok(user)
        })
    }

    pub fn logout(&self) {
        self.store.update(|snapshot| snapshot.current_user = None);
    }

    /// The logged-in user, if any.
    pub fn current_user(&self) -> Option<User> {
        let snapshot = self.snapshot();
        snapshot
            .current_user
            .as_deref()
            .and_then(|id| snapshot.user(id))
            .cloned()
    }

    fn actor(&self) -> Result<String> {
        self.current_user()
            .map(|user| user.name)
            .ok_or(Error::NotLoggedIn)
    }

    pub fn users(&self) -> Vec<User> {
        self.snapshot().users.clone()
    }

    pub fn add_user(
        &self,
        name: &str,
        username: &str,
        password: &str,
        role: Role,
        branch_id: Option<&str>,
    ) -> Result<User> {
        let user = User {
            name: name.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            role,
            branch_id: branch_id.map(str::to_string),
            ..User::default()
        };

        self.store.try_update(|snapshot| {
            if snapshot.users.iter().any(|u| u.username == username) {
                return Err(Error::DuplicateUsername(username.to_string()));
            }

            snapshot.users.push(user.clone());
            Ok(user)
        })
    }

    pub fn update_user(&self, user: User) -> Result<()> {
        self.store.try_update(|snapshot| {
            if snapshot
                .users
                .iter()
                .any(|u| u.username == user.username && u.id != user.id)
            {
                return Err(Error::DuplicateUsername(user.username.clone()));
            }

            let existing = snapshot
                .user_mut(&user.id)
                .ok_or_else(|| Error::UserNotFound(user.id.clone()))?;
            *existing = user.clone();

            Ok(())
        })
    }

    pub fn remove_user(&self, id: &str) -> Result<()> {
        self.store.try_update(|snapshot| {
            let user = snapshot
                .user(id)
                .ok_or_else(|| Error::UserNotFound(id.to_string()))?;
            if user.is_builtin_admin() {
                return Err(Error::BuiltinAdmin);
            }

            snapshot.users.retain(|u| u.id != id);
            Ok(())
        })
    }

    // Inventory

    pub fn add_item(&self, mut item: InventoryItem) -> Result<InventoryItem> {
        item.last_updated = Utc::now();

        self.store.try_update(|snapshot| {
            if snapshot.branch(&item.branch_id).is_none() {
                return Err(Error::BranchNotFound(item.branch_id.clone()));
            }

            snapshot.inventory_items.push(item.clone());
            Ok(item)
        })
    }

    pub fn update_item(&self, mut item: InventoryItem) -> Result<()> {
        item.last_updated = Utc::now();

        self.store.try_update(|snapshot| {
            let existing = snapshot
                .item_mut(&item.id)
                .ok_or_else(|| Error::ItemNotFound(item.id.clone()))?;
            *existing = item.clone();
            Ok(())
        })
    }

    pub fn remove_item(&self, id: &str) -> Result<()> {
        self.store.try_update(|snapshot| {
            if snapshot.item(id).is_none() {
                return Err(Error::ItemNotFound(id.to_string()));
            }

            snapshot.inventory_items.retain(|i| i.id != id);
            Ok(())
        })
    }

    pub fn items(&self, branch_id: &str) -> Vec<InventoryItem> {
        self.snapshot()
            .inventory_items
            .iter()
            .filter(|item| item.branch_id == branch_id)
            .cloned()
            .collect()
    }

    pub fn low_stock_items(&self, branch_id: &str) -> Vec<InventoryItem> {
        self.items(branch_id)
            .into_iter()
            .filter(InventoryItem::is_low_stock)
            .collect()
    }

    /// Bulk-import inventory rows for a branch. Returns how many rows were
    /// accepted; rows missing required fields are dropped silently, and only
    /// an import that accepts nothing is an error.
    pub fn import_inventory<R: std::io::Read>(&self, branch_id: &str, reader: R) -> Result<usize> {
        if self.snapshot().branch(branch_id).is_none() {
            return Err(Error::BranchNotFound(branch_id.to_string()));
        }

        let items = import::read_items(reader, branch_id, Utc::now())?;
        if items.is_empty() {
            return Err(Error::EmptyImport);
        }

        let accepted = items.len();
        self.store
            .update(|snapshot| snapshot.inventory_items.extend(items.iter().cloned()));

        debug!("Imported {accepted} inventory items into branch {branch_id}");

        Ok(accepted)
    }

    /// The branch's inventory rendered as CSV, import-compatible.
    pub fn export_inventory_csv(&self, branch_id: &str) -> Result<String> {
        if self.snapshot().branch(branch_id).is_none() {
            return Err(Error::BranchNotFound(branch_id.to_string()));
        }

        export::inventory_csv(&self.items(branch_id))
    }

    // Service entries

    /// Create a work order. Without a manual bill number the branch
    /// sequence renders one and its counter advances by exactly one; a
    /// manual number bypasses the sequence entirely.
    pub fn create_service(&self, branch_id: &str, draft: ServiceDraft) -> Result<ServiceEntry> {
        let actor = self.actor()?;
        let now = Utc::now();
        let today = Local::now().date_naive();

        let entry = self.store.try_update(|snapshot| {
            if snapshot.branch(branch_id).is_none() {
                return Err(Error::BranchNotFound(branch_id.to_string()));
            }

            let manual = draft
                .bill_number
                .clone()
                .filter(|number| !number.is_empty());
            let bill_number = match &manual {
                Some(number) => number.clone(),
                None => snapshot
                    .sequence(branch_id)
                    .ok_or_else(|| Error::SequenceNotFound(branch_id.to_string()))?
                    .render(&today),
            };

            if manual.is_none() {
                let sequence = snapshot
                    .sequence_mut(branch_id)
                    .ok_or_else(|| Error::SequenceNotFound(branch_id.to_string()))?;
                *sequence = sequence.advance();
            }

            let entry = ServiceEntry::create(branch_id, bill_number, draft, &actor, now);
            snapshot.service_entries.push(entry.clone());
            Ok(entry)
        })?;

        debug!("Created service entry {}", entry.bill_number);

        Ok(entry)
    }

    pub fn service(&self, id: &str) -> Result<ServiceEntry> {
        self.snapshot()
            .service(id)
            .cloned()
            .ok_or_else(|| Error::ServiceNotFound(id.to_string()))
    }

    /// Service entries for a branch, newest first.
    pub fn services(&self, branch_id: &str, filter: &ServiceFilter) -> Vec<ServiceEntry> {
        let mut entries: Vec<ServiceEntry> = self
            .snapshot()
            .service_entries
            .iter()
            .filter(|entry| entry.branch_id == branch_id && filter.accepts(entry))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.entry_date.cmp(&a.entry_date));
        entries
    }

    /// Replace a service entry's operator-editable fields. The status
    /// history is never touched by an edit.
    pub fn edit_service(&self, id: &str, draft: ServiceDraft) -> Result<()> {
        self.store.try_update(|snapshot| {
            let entry = snapshot
                .service_mut(id)
                .ok_or_else(|| Error::ServiceNotFound(id.to_string()))?;
            entry.apply_edit(draft);
            Ok(())
        })
    }

    /// Move an entry one step along `pending → in-process → ready →
    /// delivered`, recording the transition in its history.
    pub fn advance_service(&self, id: &str, notes: Option<&str>) -> Result<ServiceStatus> {
        let actor = self.actor()?;
        let now = Utc::now();

        let status = self.store.try_update(|snapshot| {
            snapshot
                .service_mut(id)
                .ok_or_else(|| Error::ServiceNotFound(id.to_string()))?
                .advance(&actor, notes, now)
        })?;

        if status == ServiceStatus::Delivered {
            self.schedule_purge(id);
        }

        Ok(status)
    }

    /// Explicit `ready → delivered` completion.
    pub fn deliver_service(&self, id: &str, notes: Option<&str>) -> Result<()> {
        let actor = self.actor()?;
        let now = Utc::now();

        self.store.try_update(|snapshot| {
            snapshot
                .service_mut(id)
                .ok_or_else(|| Error::ServiceNotFound(id.to_string()))?
                .deliver(&actor, notes, now)
        })?;

        self.schedule_purge(id);

        Ok(())
    }

    /// Explicit `ready → returned` reversal.
    pub fn return_service(&self, id: &str, notes: Option<&str>) -> Result<()> {
        let actor = self.actor()?;
        let now = Utc::now();

        self.store.try_update(|snapshot| {
            snapshot
                .service_mut(id)
                .ok_or_else(|| Error::ServiceNotFound(id.to_string()))?
                .mark_returned(&actor, notes, now)
        })
    }

    /// Remove a service entry. Removing an id that is already gone is a
    /// no-op, so an operator delete never conflicts with the deferred purge.
    pub fn remove_service(&self, id: &str) {
        self.store
            .update(|snapshot| snapshot.service_entries.retain(|entry| entry.id != id));
    }

    /// Delivered entries leave the active list: schedule the removal after
    /// the configured delay. Without a runtime the load-time sweep picks the
    /// entry up on the next start instead.
    fn schedule_purge(&self, id: &str) {
        let delay = self.cfg.read().purge_delay();
        let store = self.store.clone();
        let id = id.to_string();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    store.update(|snapshot| {
                        snapshot.service_entries.retain(|entry| entry.id != id);
                    });
                    debug!("Purged delivered entry {id}");
                });
            }
            Err(_) => {
                warn!("No async runtime; delivered entry {id} is purged on the next load");
            }
        }
    }

    // Bill sequences

    pub fn bill_settings(&self, branch_id: &str) -> Result<BillSequence> {
        self.snapshot()
            .sequence(branch_id)
            .cloned()
            .ok_or_else(|| Error::SequenceNotFound(branch_id.to_string()))
    }

    /// Replace a branch's bill settings. The counter never drops below 1.
    pub fn update_bill_settings(&self, settings: BillSequence) -> Result<()> {
        self.store.try_update(|snapshot| {
            let sequence = snapshot
                .sequence_mut(&settings.branch_id)
                .ok_or_else(|| Error::SequenceNotFound(settings.branch_id.clone()))?;

            sequence.prefix = settings.prefix.clone();
            sequence.format = settings.format.clone();
            sequence.current_number = settings.current_number.max(1);

            Ok(())
        })
    }

    /// The bill number the next auto-numbered service entry would get.
    /// Pure preview; the counter does not move.
    pub fn preview_bill_number(&self, branch_id: &str) -> Result<String> {
        Ok(self
            .bill_settings(branch_id)?
            .render(&Local::now().date_naive()))
    }

    // Reports

    pub fn report(&self, branch_id: &str, from: NaiveDate, to: NaiveDate) -> Result<BranchReport> {
        let snapshot = self.snapshot();
        if snapshot.branch(branch_id).is_none() {
            return Err(Error::BranchNotFound(branch_id.to_string()));
        }

        Ok(report::branch_report(&snapshot, branch_id, from, to))
    }

    pub fn dashboard(&self, branch_id: &str) -> Result<DashboardMetrics> {
        let snapshot = self.snapshot();
        if snapshot.branch(branch_id).is_none() {
            return Err(Error::BranchNotFound(branch_id.to_string()));
        }

        Ok(report::dashboard_metrics(&snapshot, branch_id, Utc::now()))
    }

    /// The flat text report the original tool offered for download.
    pub fn export_report_text(
        &self,
        branch_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<String> {
        let branch = self.branch(branch_id)?;
        let report = self.report(branch_id, from, to)?;

        Ok(export::report_text(&report, &branch, from, to, Utc::now()))
    }

    /// Return a mock version of a [`Repository`] with an in-memory store
    /// and default configuration.
    #[cfg(test)]
    pub(crate) fn mock() -> Self {
        Self {
            store: Store::in_memory(),
            cfg: Arc::new(RwLock::new(CoreConfig::mock())),
        }
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use chrono::Duration as ChronoDuration;

    use super::*;

    fn logged_in() -> Repository {
        let repo = Repository::mock();
        repo.login("admin", "4567").unwrap();
        repo
    }

    fn draft() -> ServiceDraft {
        ServiceDraft {
            device_name: "Galaxy S21".to_string(),
            model: "SM-G991".to_string(),
            problem_description: "Cracked screen".to_string(),
            expected_delivery: Utc::now() + ChronoDuration::days(3),
            ..ServiceDraft::default()
        }
    }

    #[test]
    fn branch_creation_seeds_a_sequence() {
        let repo = logged_in();

        let branch = repo
            .add_branch("Main Branch", "MAIN", Some("Main Street"), None, None)
            .unwrap();

        let settings = repo.bill_settings(&branch.id).unwrap();
        assert_eq!(settings.prefix, "MAIN");
        assert_eq!(settings.current_number, 1);
        assert_eq!(settings.format, DEFAULT_BILL_FORMAT);
    }

    #[test]
    fn branch_code_edit_repoints_the_prefix() {
        let repo = logged_in();
        let branch = repo
            .add_branch("Main Branch", "MAIN", None, None, None)
            .unwrap();

        repo.update_branch(Branch {
            code: "HQ".to_string(),
            ..branch.clone()
        })
        .unwrap();

        assert_eq!(repo.bill_settings(&branch.id).unwrap().prefix, "HQ");
    }

    #[test]
    fn branch_removal_cascades_to_its_sequence() {
        let repo = logged_in();
        let branch = repo
            .add_branch("Main Branch", "MAIN", None, None, None)
            .unwrap();
        repo.select_branch(Some(&branch.id)).unwrap();

        repo.remove_branch(&branch.id).unwrap();

        assert!(repo.branches().is_empty());
        assert!(repo.selected_branch().is_none());
        assert!(matches!(
            repo.bill_settings(&branch.id),
            Err(Error::SequenceNotFound(_))
        ));
    }

    #[test]
    fn auto_bill_numbers_advance_the_counter() {
        let repo = logged_in();
        let branch = repo
            .add_branch("Main Branch", "MAIN", None, None, None)
            .unwrap();

        let first = repo.create_service(&branch.id, draft()).unwrap();
        let second = repo.create_service(&branch.id, draft()).unwrap();

        assert!(first.bill_number.starts_with("MAIN"));
        assert!(first.bill_number.ends_with("0001"));
        assert!(second.bill_number.ends_with("0002"));
        assert_eq!(repo.bill_settings(&branch.id).unwrap().current_number, 3);
    }

    #[test]
    fn manual_bill_numbers_bypass_the_sequence() {
        let repo = logged_in();
        let branch = repo
            .add_branch("Main Branch", "MAIN", None, None, None)
            .unwrap();

        let entry = repo
            .create_service(
                &branch.id,
                ServiceDraft {
                    bill_number: Some("CUSTOM-1".to_string()),
                    ..draft()
                },
            )
            .unwrap();

        assert_eq!(entry.bill_number, "CUSTOM-1");
        assert_eq!(repo.bill_settings(&branch.id).unwrap().current_number, 1);
    }

    #[test]
    fn preview_does_not_move_the_counter() {
        let repo = logged_in();
        let branch = repo
            .add_branch("Main Branch", "MAIN", None, None, None)
            .unwrap();

        let first = repo.preview_bill_number(&branch.id).unwrap();
        let second = repo.preview_bill_number(&branch.id).unwrap();

        assert_eq!(first, second);
        assert_eq!(repo.bill_settings(&branch.id).unwrap().current_number, 1);
    }

    #[test]
    fn bill_settings_counter_never_drops_below_one() {
        let repo = logged_in();
        let branch = repo
            .add_branch("Main Branch", "MAIN", None, None, None)
            .unwrap();

        repo.update_bill_settings(BillSequence {
            branch_id: branch.id.clone(),
            prefix: "M".to_string(),
            current_number: 0,
            format: "{PREFIX}{####}".to_string(),
        })
        .unwrap();

        let settings = repo.bill_settings(&branch.id).unwrap();
        assert_eq!(settings.current_number, 1);
        assert_eq!(settings.format, "{PREFIX}{####}");
    }

    #[test]
    fn creating_a_service_requires_a_login() {
        let repo = Repository::mock();
        let branch = repo
            .add_branch("Main Branch", "MAIN", None, None, None)
            .unwrap();

        assert!(matches!(
            repo.create_service(&branch.id, draft()),
            Err(Error::NotLoggedIn)
        ));
    }

    #[test]
    fn service_listing_filters_and_sorts() {
        let repo = logged_in();
        let branch = repo
            .add_branch("Main Branch", "MAIN", None, None, None)
            .unwrap();

        let first = repo.create_service(&branch.id, draft()).unwrap();
        let second = repo
            .create_service(
                &branch.id,
                ServiceDraft {
                    device_name: "iPhone 12".to_string(),
                    ..draft()
                },
            )
            .unwrap();
        repo.advance_service(&second.id, None).unwrap();

        let all = repo.services(&branch.id, &ServiceFilter::default());
        assert_eq!(all.len(), 2);

        let by_term = repo.services(
            &branch.id,
            &ServiceFilter {
                term: Some("iphone".to_string()),
                ..ServiceFilter::default()
            },
        );
        assert_eq!(by_term.len(), 1);
        assert_eq!(by_term.first().unwrap().id, second.id);

        let by_status = repo.services(
            &branch.id,
            &ServiceFilter {
                status: Some(ServiceStatus::Pending),
                ..ServiceFilter::default()
            },
        );
        assert_eq!(by_status.len(), 1);
        assert_eq!(by_status.first().unwrap().id, first.id);
    }

    #[test]
    fn duplicate_usernames_are_rejected_before_mutation() {
        let repo = logged_in();

        repo.add_user("Priya", "priya", "secret", Role::User, None)
            .unwrap();
        let err = repo
            .add_user("Priya Again", "priya", "other", Role::User, None)
            .unwrap_err();

        assert!(matches!(err, Error::DuplicateUsername(name) if name == "priya"));
        assert_eq!(repo.users().len(), 2);
    }

    #[test]
    fn builtin_admin_cannot_be_deleted() {
        let repo = logged_in();

        assert!(matches!(
            repo.remove_user(ADMIN_USER_ID),
            Err(Error::BuiltinAdmin)
        ));
        assert!(!repo.users().is_empty());
    }

    #[test]
    fn login_records_last_login() {
        let repo = Repository::mock();

        assert!(repo.current_user().is_none());
        let user = repo.login("admin", "4567").unwrap();
        assert!(user.last_login.is_some());
        assert_eq!(repo.current_user().unwrap().id, ADMIN_USER_ID);

        repo.logout();
        assert!(repo.current_user().is_none());

        assert!(matches!(
            repo.login("admin", "wrong"),
            Err(Error::BadCredentials)
        ));
    }

    #[test]
    fn failed_updates_leave_the_snapshot_untouched() {
        let repo = logged_in();
        let before = repo.snapshot();

        let err = repo
            .add_user("Someone", "admin", "pw", Role::User, None)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateUsername(_)));

        // try_update discards the copy on error, so not even the Arc moved.
        assert!(Arc::ptr_eq(&before, &repo.snapshot()));
    }

    #[test]
    fn import_rejects_an_all_invalid_file() {
        let repo = logged_in();
        let branch = repo
            .add_branch("Main Branch", "MAIN", None, None, None)
            .unwrap();

        let err = repo
            .import_inventory(&branch.id, "Item Name,Brand,Model\n,,\n".as_bytes())
            .unwrap_err();

        assert!(matches!(err, Error::EmptyImport));
        assert!(repo.items(&branch.id).is_empty());
    }

    #[test]
    fn import_and_export_roundtrip_through_the_branch() {
        let repo = logged_in();
        let branch = repo
            .add_branch("Main Branch", "MAIN", None, None, None)
            .unwrap();

        let accepted = repo
            .import_inventory(
                &branch.id,
                "Item Name,Brand,Model,Stock Quantity\n\
                 iPhone Screen,Apple,iPhone 12,10\n\
                 Samsung Battery,Samsung,,15\n"
                    .as_bytes(),
            )
            .unwrap();

        assert_eq!(accepted, 1);
        let csv = repo.export_inventory_csv(&branch.id).unwrap();
        assert!(csv.contains("iPhone Screen,Apple,iPhone 12,10"));
    }

    #[tokio::test(start_paused = true)]
    async fn delivered_entries_are_purged_after_the_delay() {
        let repo = logged_in();
        let branch = repo
            .add_branch("Main Branch", "MAIN", None, None, None)
            .unwrap();
        let entry = repo.create_service(&branch.id, draft()).unwrap();

        repo.advance_service(&entry.id, None).unwrap();
        repo.advance_service(&entry.id, None).unwrap();
        repo.deliver_service(&entry.id, None).unwrap();

        // Still listed until the deferred purge fires.
        assert!(repo.service(&entry.id).is_ok());

        tokio::time::sleep(std::time::Duration::from_secs(2)).await;

        assert!(matches!(
            repo.service(&entry.id),
            Err(Error::ServiceNotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn purge_after_manual_delete_is_a_noop() {
        let repo = logged_in();
        let branch = repo
            .add_branch("Main Branch", "MAIN", None, None, None)
            .unwrap();
        let entry = repo.create_service(&branch.id, draft()).unwrap();

        for _ in 0..2 {
            repo.advance_service(&entry.id, None).unwrap();
        }
        repo.deliver_service(&entry.id, None).unwrap();
        repo.remove_service(&entry.id);

        tokio::time::sleep(std::time::Duration::from_secs(2)).await;

        assert!(repo.service(&entry.id).is_err());
        assert!(repo.services(&branch.id, &ServiceFilter::default()).is_empty());
    }

    #[test]
    fn returned_entries_record_the_reversal() {
        let repo = logged_in();
        let branch = repo
            .add_branch("Main Branch", "MAIN", None, None, None)
            .unwrap();
        let entry = repo.create_service(&branch.id, draft()).unwrap();

        assert_eq!(
            repo.advance_service(&entry.id, None).unwrap(),
            ServiceStatus::InProcess
        );
        assert_eq!(
            repo.advance_service(&entry.id, None).unwrap(),
            ServiceStatus::Ready
        );
        repo.return_service(&entry.id, Some("Customer changed their mind"))
            .unwrap();

        let entry = repo.service(&entry.id).unwrap();
        assert_eq!(entry.status(), ServiceStatus::Returned);
        assert_eq!(entry.history.len(), 4);
    }
}
