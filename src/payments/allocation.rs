use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::state::ScheduleEntry;

/// what one installment received from a payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationLine {
    pub index: usize,
    pub due_date: NaiveDate,
    pub applied: Money,
    pub settled: bool,
    pub late: bool,
}

/// result of spreading one payment over a schedule
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub schedule: Vec<ScheduleEntry>,
    pub amount: Money,
    pub applied: Money,
    pub unapplied: Money,
    pub payment_date: NaiveDate,
    pub lines: Vec<AllocationLine>,
}

impl Allocation {
    pub fn has_unapplied(&self) -> bool {
        self.unapplied.is_positive()
    }

    pub fn late_lines(&self) -> impl Iterator<Item = &AllocationLine> {
        self.lines.iter().filter(|l| l.late)
    }
}

/// oldest-first payment allocator
///
/// The only writer of `paid_amount`, `paid_on` and `is_late`. It never touches
/// the caller's schedule: the updated copy comes back in the [`Allocation`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentAllocator;

impl PaymentAllocator {
    pub fn new() -> Self {
        Self
    }

    /// apply `amount` to the unpaid installments in due-date order
    pub fn apply(
        &self,
        schedule: &[ScheduleEntry],
        amount: Money,
        payment_date: NaiveDate,
    ) -> Result<Allocation> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidPaymentAmount { amount });
        }

        let mut updated = schedule.to_vec();
        let mut order: Vec<usize> = (0..updated.len()).collect();
        order.sort_by_key(|&i| updated[i].due_date);

        let mut remaining = amount;
        let mut lines = Vec::new();

        for index in order {
            if remaining.is_zero() {
                break;
            }

            let entry = &mut updated[index];
            if entry.is_settled() {
                continue;
            }

            let applied = entry.remaining().min(remaining);
            entry.paid_amount += applied;
            entry.paid_on = Some(payment_date);
            entry.is_late = payment_date > entry.due_date;
            remaining -= applied;

            debug!(
                index,
                due_date = %entry.due_date,
                %applied,
                late = entry.is_late,
                "installment allocated"
            );

            lines.push(AllocationLine {
                index,
                due_date: entry.due_date,
                applied,
                settled: entry.is_settled(),
                late: entry.is_late,
            });
        }

        Ok(Allocation {
            schedule: updated,
            amount,
            applied: amount - remaining,
            unapplied: remaining,
            payment_date,
            lines,
        })
    }

    /// total that a payment could still absorb
    pub fn capacity(&self, schedule: &[ScheduleEntry]) -> Money {
        schedule.iter().map(|e| e.remaining()).sum()
    }
}
