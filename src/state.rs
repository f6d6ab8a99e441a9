use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::types::{OwnerId, PlanId, PlanKind, PlanStatus, TemplateId};

/// one installment of a repayment plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub due_date: NaiveDate,
    pub amount_due: Money,
    pub paid_amount: Money,
    pub paid_on: Option<NaiveDate>,
    pub is_late: bool,
}

impl ScheduleEntry {
    pub fn new(due_date: NaiveDate, amount_due: Money) -> Self {
        Self {
            due_date,
            amount_due,
            paid_amount: Money::ZERO,
            paid_on: None,
            is_late: false,
        }
    }

    /// amount still owed on this installment
    pub fn remaining(&self) -> Money {
        self.amount_due.saturating_sub(self.paid_amount)
    }

    pub fn is_settled(&self) -> bool {
        self.paid_amount >= self.amount_due
    }

    /// unpaid and due on or before `as_of`
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        !self.is_settled() && as_of >= self.due_date
    }
}

/// loan or subscription account with its installment schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentPlan {
    // identification
    pub id: PlanId,
    pub owner_id: OwnerId,
    pub kind: PlanKind,
    pub template_id: Option<TemplateId>,

    // terms
    pub principal: Money,
    pub total_amount: Money,
    pub interest_rate: Rate,
    pub fine_rate: Rate,
    pub duration_months: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    // schedule, ordered by ascending due date
    pub schedule: Vec<ScheduleEntry>,

    // derived state
    pub status: PlanStatus,
    pub interest_earned: Money,
    pub fine_charged: Money,

    pub created_at: DateTime<Utc>,
}

/// terms needed to open a plan around a generated schedule
#[derive(Debug, Clone)]
pub struct PlanTerms {
    pub owner_id: OwnerId,
    pub kind: PlanKind,
    pub template_id: Option<TemplateId>,
    pub principal: Money,
    pub total_amount: Money,
    pub interest_rate: Rate,
    pub fine_rate: Rate,
    pub duration_months: u32,
    pub start_date: NaiveDate,
}

impl RepaymentPlan {
    /// open a plan with an already generated schedule
    pub fn open(terms: PlanTerms, schedule: Vec<ScheduleEntry>, created_at: DateTime<Utc>) -> Self {
        let end_date = add_months(terms.start_date, terms.duration_months);

        Self {
            id: Uuid::new_v4(),
            owner_id: terms.owner_id,
            kind: terms.kind,
            template_id: terms.template_id,
            principal: terms.principal,
            total_amount: terms.total_amount,
            interest_rate: terms.interest_rate,
            fine_rate: terms.fine_rate,
            duration_months: terms.duration_months,
            start_date: terms.start_date,
            end_date,
            schedule,
            status: PlanStatus::Active,
            interest_earned: Money::ZERO,
            fine_charged: Money::ZERO,
            created_at,
        }
    }

    pub fn total_paid(&self) -> Money {
        self.schedule.iter().map(|e| e.paid_amount).sum()
    }

    pub fn total_remaining(&self) -> Money {
        self.schedule.iter().map(|e| e.remaining()).sum()
    }

    pub fn scheduled_total(&self) -> Money {
        self.schedule.iter().map(|e| e.amount_due).sum()
    }

    pub fn all_paid(&self) -> bool {
        self.schedule.iter().all(|e| e.is_settled())
    }

    pub fn has_late_entries(&self) -> bool {
        self.schedule.iter().any(|e| e.is_late)
    }

    /// earliest installment that still has money owing
    pub fn next_unpaid(&self) -> Option<&ScheduleEntry> {
        self.schedule.iter().find(|e| !e.is_settled())
    }

    pub fn is_completed(&self) -> bool {
        self.status == PlanStatus::Completed
    }
}

/// add calendar months, clamping to the last day of shorter months
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}
