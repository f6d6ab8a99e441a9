use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::interest::FineEngine;
use crate::state::RepaymentPlan;

/// what a plan owes as of a reference date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DueAmount {
    pub overdue_amount: Money,
    pub upcoming_amount: Money,
    pub fine_amount: Money,
    /// overdue plus fines; upcoming installments are not yet payable
    pub total_due: Money,
    pub as_of: NaiveDate,
}

impl DueAmount {
    pub fn zero(as_of: NaiveDate) -> Self {
        Self {
            overdue_amount: Money::ZERO,
            upcoming_amount: Money::ZERO,
            fine_amount: Money::ZERO,
            total_due: Money::ZERO,
            as_of,
        }
    }
}

/// read-only due-amount query over a plan's schedule
#[derive(Debug, Clone, Copy, Default)]
pub struct DueCalculator;

impl DueCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn due_as_of(&self, plan: &RepaymentPlan, as_of: NaiveDate) -> DueAmount {
        if plan.is_completed() {
            return DueAmount::zero(as_of);
        }

        let fines = FineEngine::new(plan.fine_rate);
        let mut due = DueAmount::zero(as_of);

        for entry in &plan.schedule {
            if fines.is_fined(entry, as_of) {
                due.fine_amount += fines.fine_for(entry);
            }

            let remaining = entry.remaining();
            if remaining.is_zero() {
                continue;
            }

            if as_of >= entry.due_date {
                due.overdue_amount += remaining;
            } else {
                due.upcoming_amount += remaining;
            }
        }

        due.total_due = due.overdue_amount + due.fine_amount;
        due
    }
}
