use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::repository::entities::{Error, Result};

/// Entries older than this are flagged as stale on the operator surfaces.
const STALE_AFTER_DAYS: i64 = 180;

/// Workshop status of a service entry.
///
/// The forward chain is `pending → in-process → ready → delivered`. From
/// `ready` an operator may also send the device back with
/// [`ServiceEntry::mark_returned`]. `delivered` and `returned` have no
/// forward transition.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ServiceStatus {
    Pending,
    InProcess,
    Ready,
    Delivered,
    Returned,
}

impl ServiceStatus {
    /// The next status in the linear chain, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::InProcess),
            Self::InProcess => Some(Self::Ready),
            Self::Ready => Some(Self::Delivered),
            Self::Delivered | Self::Returned => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Returned)
    }
}

/// One line of a service entry's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    pub status: ServiceStatus,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Operator-supplied fields for creating or editing a service entry.
///
/// `bill_number` is a manual override; when left empty the repository
/// renders one from the branch's bill sequence and advances the counter.
#[derive(Debug, Clone, Default)]
pub struct ServiceDraft {
    pub bill_number: Option<String>,
    pub device_name: String,
    pub model: String,
    pub imei: Option<String>,
    pub problem_description: String,
    pub technician: Option<String>,
    pub expected_delivery: DateTime<Utc>,
    pub delay_reason: Option<String>,
}

/// A tracked repair work order for one device.
///
/// `history` is append-only and ordered by timestamp. The current status is
/// not stored separately; [`ServiceEntry::status`] reads the last history
/// record, so the two can never fall out of sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceEntry {
    pub id: String,
    pub bill_number: String,
    pub branch_id: String,
    pub device_name: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imei: Option<String>,
    pub problem_description: String,
    #[serde(rename = "technicianAssignment", skip_serializing_if = "Option::is_none")]
    pub technician: Option<String>,
    pub entry_date: DateTime<Utc>,
    #[serde(rename = "expectedDeliveryDate")]
    pub expected_delivery: DateTime<Utc>,
    #[serde(rename = "statusHistory")]
    pub history: Vec<StatusRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_reason: Option<String>,
}

impl Default for ServiceEntry {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            bill_number: String::new(),
            branch_id: String::new(),
            device_name: String::new(),
            model: String::new(),
            imei: None,
            problem_description: String::new(),
            technician: None,
            entry_date: Utc::now(),
            expected_delivery: Utc::now(),
            history: Vec::new(),
            delay_reason: None,
        }
    }
}

impl ServiceEntry {
    /// Create a fresh entry in `pending` with its creation record already in
    /// the history.
    pub(crate) fn create(
        branch_id: &str,
        bill_number: String,
        draft: ServiceDraft,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            bill_number,
            branch_id: branch_id.to_string(),
            device_name: draft.device_name,
            model: draft.model,
            imei: draft.imei,
            problem_description: draft.problem_description,
            technician: draft.technician,
            entry_date: now,
            expected_delivery: draft.expected_delivery,
            history: vec![StatusRecord {
                status: ServiceStatus::Pending,
                timestamp: now,
                user: actor.to_string(),
                notes: Some("Service entry created".to_string()),
            }],
            delay_reason: draft.delay_reason,
            ..Self::default()
        }
    }

    /// Replace the operator-editable fields. The status history is never
    /// touched by an edit.
    pub(crate) fn apply_edit(&mut self, draft: ServiceDraft) {
        if let Some(bill_number) = draft.bill_number {
            self.bill_number = bill_number;
        }
        self.device_name = draft.device_name;
        self.model = draft.model;
        self.imei = draft.imei;
        self.problem_description = draft.problem_description;
        self.technician = draft.technician;
        self.expected_delivery = draft.expected_delivery;
        self.delay_reason = draft.delay_reason;
    }

    /// The current status: the status of the most recent history record.
    /// Derived, never stored, so it cannot drift from the history.
    pub fn status(&self) -> ServiceStatus {
        self.history
            .last()
            .map_or(ServiceStatus::Pending, |record| record.status)
    }

    /// Move to the next status in the linear chain.
    pub fn advance(
        &mut self,
        actor: &str,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ServiceStatus> {
        let next = self
            .status()
            .next()
            .ok_or(Error::TerminalStatus(self.status()))?;
        self.record(next, actor, notes, now);
        Ok(next)
    }

    /// Explicit completion, only valid from `ready`.
    pub fn deliver(&mut self, actor: &str, notes: Option<&str>, now: DateTime<Utc>) -> Result<()> {
        self.transition_from_ready(ServiceStatus::Delivered, actor, notes, now)
    }

    /// Customer-initiated reversal, only valid from `ready`.
    pub fn mark_returned(
        &mut self,
        actor: &str,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.transition_from_ready(ServiceStatus::Returned, actor, notes, now)
    }

    fn transition_from_ready(
        &mut self,
        to: ServiceStatus,
        actor: &str,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if self.status() != ServiceStatus::Ready {
            return Err(Error::InvalidTransition {
                from: self.status(),
                to,
            });
        }
        self.record(to, actor, notes, now);
        Ok(())
    }

    /// The single mutation path for the status history.
    fn record(&mut self, status: ServiceStatus, actor: &str, notes: Option<&str>, now: DateTime<Utc>) {
        let notes = notes
            .map(str::to_string)
            .unwrap_or_else(|| format!("Status changed to {status}"));
        self.history.push(StatusRecord {
            status,
            timestamp: now,
            user: actor.to_string(),
            notes: Some(notes),
        });
    }

    /// Past the expected delivery date and not yet delivered.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now > self.expected_delivery && self.status() != ServiceStatus::Delivered
    }

    /// Sitting in the workshop for more than 180 days without delivery.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        (now - self.entry_date).num_days() > STALE_AFTER_DAYS
            && self.status() != ServiceStatus::Delivered
    }

    /// Case-insensitive match against bill number, device, model, and
    /// technician.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.bill_number.to_lowercase().contains(&term)
            || self.device_name.to_lowercase().contains(&term)
            || self.model.to_lowercase().contains(&term)
            || self
                .technician
                .as_ref()
                .is_some_and(|t| t.to_lowercase().contains(&term))
    }
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;

    fn entry() -> ServiceEntry {
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
        ServiceEntry::create(
            "b1",
            "MAIN25010001".to_string(),
            ServiceDraft {
                device_name: "Galaxy S21".to_string(),
                model: "SM-G991".to_string(),
                problem_description: "Cracked screen".to_string(),
                expected_delivery: now + chrono::Duration::days(3),
                ..ServiceDraft::default()
            },
            "Administrator",
            now,
        )
    }

    #[test]
    fn creation_seeds_history() {
        let entry = entry();

        assert_eq!(entry.status(), ServiceStatus::Pending);
        assert_eq!(entry.history.len(), 1);
        let first = entry.history.first().unwrap();
        assert_eq!(first.status, ServiceStatus::Pending);
        assert_eq!(first.notes.as_deref(), Some("Service entry created"));
    }

    #[test]
    fn forward_chain_in_order() {
        let mut entry = entry();
        let mut now = entry.entry_date;

        let expected = [
            ServiceStatus::InProcess,
            ServiceStatus::Ready,
            ServiceStatus::Delivered,
        ];
        for status in expected {
            now += chrono::Duration::hours(1);
            assert_eq!(entry.advance("Administrator", None, now).unwrap(), status);
            assert_eq!(entry.status(), status);
        }

        // Three transitions on top of the creation record.
        assert_eq!(entry.history.len(), 4);
        let recorded: Vec<_> = entry.history.iter().map(|r| r.status).collect();
        assert_eq!(
            recorded,
            vec![
                ServiceStatus::Pending,
                ServiceStatus::InProcess,
                ServiceStatus::Ready,
                ServiceStatus::Delivered,
            ]
        );
        assert_eq!(entry.history.last().unwrap().status, entry.status());
        assert!(
            entry
                .history
                .windows(2)
                .all(|w| w.first().unwrap().timestamp <= w.last().unwrap().timestamp)
        );
    }

    #[test]
    fn no_skipping_to_delivered() {
        let mut entry = entry();
        let now = entry.entry_date;

        // The only operation naming `delivered` requires `ready`.
        let err = entry.deliver("Administrator", None, now).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: ServiceStatus::Pending,
                to: ServiceStatus::Delivered,
            }
        ));
        assert_eq!(entry.status(), ServiceStatus::Pending);
        assert_eq!(entry.history.len(), 1);
    }

    #[test]
    fn returned_only_from_ready() {
        let mut entry = entry();
        let now = entry.entry_date;

        assert!(entry.mark_returned("Administrator", None, now).is_err());

        entry.advance("Administrator", None, now).unwrap();
        entry.advance("Administrator", None, now).unwrap();
        entry
            .mark_returned("Administrator", Some("Customer pickup"), now)
            .unwrap();

        assert_eq!(entry.status(), ServiceStatus::Returned);
        assert_eq!(
            entry.history.last().unwrap().notes.as_deref(),
            Some("Customer pickup")
        );
    }

    #[test]
    fn terminal_states_have_no_advance() {
        let mut entry = entry();
        let now = entry.entry_date;

        for _ in 0..3 {
            entry.advance("Administrator", None, now).unwrap();
        }

        let err = entry.advance("Administrator", None, now).unwrap_err();
        assert!(matches!(
            err,
            Error::TerminalStatus(ServiceStatus::Delivered)
        ));
        assert_eq!(entry.history.len(), 4);
    }

    #[test]
    fn default_transition_notes() {
        let mut entry = entry();
        let now = entry.entry_date;

        entry.advance("Administrator", None, now).unwrap();

        assert_eq!(
            entry.history.last().unwrap().notes.as_deref(),
            Some("Status changed to in-process")
        );
    }

    #[test]
    fn edits_leave_history_alone() {
        let mut entry = entry();
        let now = entry.entry_date;

        entry.apply_edit(ServiceDraft {
            device_name: "Galaxy S21 Ultra".to_string(),
            model: "SM-G998".to_string(),
            technician: Some("Priya".to_string()),
            expected_delivery: now + chrono::Duration::days(5),
            ..ServiceDraft::default()
        });

        assert_eq!(entry.device_name, "Galaxy S21 Ultra");
        assert_eq!(entry.bill_number, "MAIN25010001");
        assert_eq!(entry.history.len(), 1);
        assert_eq!(entry.status(), ServiceStatus::Pending);
    }

    #[test]
    fn overdue_and_stale_indicators() {
        let mut entry = entry();
        let now = entry.entry_date;

        assert!(!entry.is_overdue(now));
        assert!(entry.is_overdue(now + chrono::Duration::days(4)));
        assert!(!entry.is_stale(now + chrono::Duration::days(4)));
        assert!(entry.is_stale(now + chrono::Duration::days(181)));

        // Delivered entries are neither overdue nor stale.
        for _ in 0..3 {
            entry.advance("Administrator", None, now).unwrap();
        }
        assert!(!entry.is_overdue(now + chrono::Duration::days(400)));
        assert!(!entry.is_stale(now + chrono::Duration::days(400)));
    }
}
