use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::state::ScheduleEntry;

/// flat per-installment fine: `fine_rate * amount_due`, charged at most once
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FineEngine {
    pub fine_rate: Rate,
}

impl FineEngine {
    pub fn new(fine_rate: Rate) -> Self {
        Self { fine_rate }
    }

    /// fine owed for one installment, whatever its state
    pub fn fine_for(&self, entry: &ScheduleEntry) -> Money {
        entry.amount_due.apply_rate(self.fine_rate)
    }

    /// an outstanding installment that has gone past due as of `as_of`.
    ///
    /// An installment with a partial payment on file is not fined on its due
    /// date itself, only from the following day.
    pub fn accrues_on_outstanding(&self, entry: &ScheduleEntry, as_of: NaiveDate) -> bool {
        entry.is_overdue(as_of) && (entry.paid_on.is_none() || as_of > entry.due_date)
    }

    /// fined as of `as_of`: paid late, or overdue and still outstanding.
    ///
    /// A late installment counts only once `as_of` is past its due date, so a
    /// backdated query never sees lateness that had not happened yet.
    pub fn is_fined(&self, entry: &ScheduleEntry, as_of: NaiveDate) -> bool {
        (entry.is_late && as_of > entry.due_date) || self.accrues_on_outstanding(entry, as_of)
    }

    /// fines on installments the allocator marked late
    pub fn charged(&self, schedule: &[ScheduleEntry]) -> Money {
        schedule
            .iter()
            .filter(|e| e.is_late)
            .map(|e| self.fine_for(e))
            .sum()
    }

    /// all fines standing against the schedule as of `as_of`
    pub fn assessed_as_of(&self, schedule: &[ScheduleEntry], as_of: NaiveDate) -> Money {
        schedule
            .iter()
            .filter(|e| self.is_fined(e, as_of))
            .map(|e| self.fine_for(e))
            .sum()
    }
}
