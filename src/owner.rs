use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{OwnerId, PaymentStanding, PlanId};

/// loan eligibility earned through payment behaviour.
///
/// One-way: once granted it stays granted and has no reset operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EligibilityFlag(bool);

impl EligibilityFlag {
    pub fn new() -> Self {
        Self(false)
    }

    /// grant eligibility; returns true only on the first grant
    pub fn grant(&mut self) -> bool {
        let newly_granted = !self.0;
        self.0 = true;
        newly_granted
    }

    pub fn is_granted(&self) -> bool {
        self.0
    }
}

/// one line of an owner's payment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentHistoryEntry {
    pub plan_id: PlanId,
    pub standing: PaymentStanding,
    pub completed_on: Option<NaiveDate>,
    pub recorded_on: NaiveDate,
}

/// paying party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountOwner {
    pub id: OwnerId,
    pub name: String,
    #[serde(rename = "is_eligible_for_loan")]
    pub eligibility: EligibilityFlag,
    pub payment_history: Vec<PaymentHistoryEntry>,
}

impl AccountOwner {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            eligibility: EligibilityFlag::new(),
            payment_history: Vec::new(),
        }
    }

    pub fn is_eligible_for_loan(&self) -> bool {
        self.eligibility.is_granted()
    }

    pub fn record_history(&mut self, entry: PaymentHistoryEntry) {
        self.payment_history.push(entry);
    }

    /// history lines for one plan, oldest first
    pub fn history_for(&self, plan_id: PlanId) -> impl Iterator<Item = &PaymentHistoryEntry> {
        self.payment_history.iter().filter(move |h| h.plan_id == plan_id)
    }
}
