//! Per-branch bill-number sequences.
//!
//! A [`BillSequence`] renders human-readable bill numbers from a format
//! template and a monotonic counter. Rendering is pure; the counter only
//! moves through [`BillSequence::advance`], and only the repository calls
//! that (when a service entry is created without a manual bill number).

use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Format template applied to branches that never had their settings edited.
pub const DEFAULT_BILL_FORMAT: &str = "{PREFIX}{YY}{MM}{####}";

/// Placeholder tokens recognized in a format template. Anything else in the
/// template is literal text.
const TOKENS: [&str; 4] = ["{PREFIX}", "{YY}", "{MM}", "{####}"];

/// Bill-number state for one branch: prefix, counter, and format template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillSequence {
    pub branch_id: String,
    pub prefix: String,
    pub current_number: u32,
    pub format: String,
}

impl Default for BillSequence {
    fn default() -> Self {
        Self {
            branch_id: String::new(),
            prefix: String::new(),
            current_number: 1,
            format: DEFAULT_BILL_FORMAT.to_string(),
        }
    }
}

impl BillSequence {
    /// A fresh sequence for a new branch. The branch code doubles as the
    /// bill prefix until the settings are edited.
    pub fn new(branch_id: &str, code: &str) -> Self {
        Self {
            branch_id: branch_id.to_string(),
            prefix: code.to_string(),
            ..Self::default()
        }
    }

    /// Render the bill number for the current counter value at `now`.
    ///
    /// The template is scanned once, left to right. Each token is
    /// substituted at most once and substituted text is emitted verbatim, so
    /// a prefix that itself contains `{YY}` is not expanded again. Pure:
    /// calling this any number of times yields the same string until
    /// [`advance`](Self::advance) is applied.
    pub fn render(&self, now: &impl Datelike) -> String {
        let mut pending = vec![
            (TOKENS[0], self.prefix.clone()),
            (TOKENS[1], format!("{:02}", now.year().rem_euclid(100))),
            (TOKENS[2], format!("{:02}", now.month())),
            (TOKENS[3], format!("{:04}", self.current_number)),
        ];

        let mut out = String::with_capacity(self.format.len());
        let mut rest = self.format.as_str();

        // Earliest remaining token wins; two tokens can't start at the same
        // byte, so the minimum is unambiguous.
        while let Some((pos, slot)) = pending
            .iter()
            .enumerate()
            .filter_map(|(slot, (token, _))| rest.find(token).map(|pos| (pos, slot)))
            .min()
        {
            let (token, value) = pending.remove(slot);
            let (head, tail) = rest.split_at(pos);
            out.push_str(head);
            out.push_str(&value);
            rest = tail.strip_prefix(token).expect("tail starts with token");
        }

        out.push_str(rest);
        out
    }

    /// A copy with the counter moved forward by exactly one. Never
    /// decreases and never wraps.
    pub fn advance(&self) -> Self {
        Self {
            current_number: self.current_number.saturating_add(1),
            ..self.clone()
        }
    }
}
