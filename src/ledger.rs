use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::types::{OwnerId, PlanId, TransactionKind, TransactionStatus};

/// transaction record handed to the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub id: Uuid,
    pub owner_id: OwnerId,
    pub plan_id: PlanId,
    /// money applied to the plan, net of any unapplied excess
    pub amount: Money,
    pub occurred_on: NaiveDate,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
}

impl PaymentEvent {
    pub fn completed(
        owner_id: OwnerId,
        plan_id: PlanId,
        amount: Money,
        occurred_on: NaiveDate,
        kind: TransactionKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            plan_id,
            amount,
            occurred_on,
            kind,
            status: TransactionStatus::Completed,
        }
    }
}

/// transaction log fed by the engine
pub trait LedgerRecorder: Send + Sync {
    fn record(&self, event: PaymentEvent) -> Result<()>;

    fn for_owner(&self, owner_id: OwnerId) -> Vec<PaymentEvent>;

    fn for_plan(&self, plan_id: PlanId) -> Vec<PaymentEvent>;
}

/// ledger kept in memory, append-only
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    entries: RwLock<Vec<PaymentEvent>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn all(&self) -> Vec<PaymentEvent> {
        self.entries.read().clone()
    }
}

impl LedgerRecorder for InMemoryLedger {
    fn record(&self, event: PaymentEvent) -> Result<()> {
        let mut entries = self.entries.write();
        if entries.iter().any(|e| e.id == event.id) {
            return Err(EngineError::DuplicateRecord { id: event.id });
        }
        entries.push(event);
        Ok(())
    }

    fn for_owner(&self, owner_id: OwnerId) -> Vec<PaymentEvent> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .collect()
    }

    fn for_plan(&self, plan_id: PlanId) -> Vec<PaymentEvent> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.plan_id == plan_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_filters_by_owner_and_plan() {
        let ledger = InMemoryLedger::new();
        let owner = Uuid::new_v4();
        let plan_a = Uuid::new_v4();
        let plan_b = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        ledger
            .record(PaymentEvent::completed(owner, plan_a, Money::from_major(100), date, TransactionKind::Payment))
            .unwrap();
        ledger
            .record(PaymentEvent::completed(owner, plan_b, Money::from_major(500), date, TransactionKind::LoanDisbursement))
            .unwrap();
        ledger
            .record(PaymentEvent::completed(Uuid::new_v4(), plan_a, Money::ONE, date, TransactionKind::Payment))
            .unwrap();

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.for_owner(owner).len(), 2);
        assert_eq!(ledger.for_plan(plan_a).len(), 2);
        assert_eq!(ledger.for_plan(plan_b)[0].kind, TransactionKind::LoanDisbursement);
    }

    #[test]
    fn test_ledger_rejects_duplicate_ids() {
        let ledger = InMemoryLedger::new();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let event = PaymentEvent::completed(Uuid::new_v4(), Uuid::new_v4(), Money::ONE, date, TransactionKind::Payment);

        ledger.record(event.clone()).unwrap();
        assert_eq!(
            ledger.record(event.clone()),
            Err(EngineError::DuplicateRecord { id: event.id })
        );
    }
}
