use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{OwnerId, PlanId, PlanKind, PlanStatus};

/// all events that can be emitted by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // lifecycle events
    PlanOriginated {
        plan_id: PlanId,
        owner_id: OwnerId,
        kind: PlanKind,
        total_amount: Money,
        installments: u32,
        start_date: NaiveDate,
    },
    LoanDisbursed {
        plan_id: PlanId,
        owner_id: OwnerId,
        principal: Money,
        total_repayment: Money,
        date: NaiveDate,
    },
    PlanCompleted {
        plan_id: PlanId,
        interest_earned: Money,
        date: NaiveDate,
    },
    PlanDefaulted {
        plan_id: PlanId,
        outstanding: Money,
        date: NaiveDate,
    },
    StatusChanged {
        plan_id: PlanId,
        old_status: PlanStatus,
        new_status: PlanStatus,
        date: NaiveDate,
    },

    // payment events
    PaymentApplied {
        plan_id: PlanId,
        amount: Money,
        applied: Money,
        date: NaiveDate,
    },
    InstallmentPaid {
        plan_id: PlanId,
        due_date: NaiveDate,
        amount: Money,
        date: NaiveDate,
    },
    InstallmentPaidLate {
        plan_id: PlanId,
        due_date: NaiveDate,
        amount: Money,
        days_late: i64,
        date: NaiveDate,
    },
    OverpaymentUnapplied {
        plan_id: PlanId,
        unapplied: Money,
        date: NaiveDate,
    },

    // fine events
    FineAssessed {
        plan_id: PlanId,
        fine_charged: Money,
        late_installments: u32,
        date: NaiveDate,
    },

    // owner events
    EligibilityGranted {
        owner_id: OwnerId,
        plan_id: PlanId,
        date: NaiveDate,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
