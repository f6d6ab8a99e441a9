pub mod allocation;
pub mod amortization;
pub mod due;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::types::PlanId;

pub use allocation::{Allocation, AllocationLine, PaymentAllocator};
pub use amortization::{LoanQuote, ScheduleGenerator};
pub use due::{DueAmount, DueCalculator};

/// payment request against one plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub plan_id: PlanId,
    pub amount: Money,
    /// defaults to today when absent
    pub payment_date: Option<NaiveDate>,
}

impl PaymentRequest {
    pub fn new(plan_id: PlanId, amount: Money) -> Self {
        Self {
            plan_id,
            amount,
            payment_date: None,
        }
    }

    pub fn on(mut self, payment_date: NaiveDate) -> Self {
        self.payment_date = Some(payment_date);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(EngineError::InvalidPaymentAmount { amount: self.amount });
        }
        Ok(())
    }
}
