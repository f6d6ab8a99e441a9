use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for a repayment plan
pub type PlanId = Uuid;

/// unique identifier for the paying party
pub type OwnerId = Uuid;

/// unique identifier for a plan template
pub type TemplateId = Uuid;

/// which product a repayment plan belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    /// money lent to the owner, repaid with simple interest
    Loan,
    /// savings-style subscription to a plan template
    Subscription,
}

/// plan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// created and accepting payments
    Active,
    /// every installment fully paid; terminal
    Completed,
    /// flagged externally as defaulted
    Defaulted,
}

impl PlanStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlanStatus::Completed)
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlanStatus::Active => "active",
            PlanStatus::Completed => "completed",
            PlanStatus::Defaulted => "defaulted",
        };
        f.write_str(label)
    }
}

/// ledger transaction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Payment,
    Fine,
    Interest,
    LoanDisbursement,
    LoanRepayment,
}

/// ledger transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

/// how an owner has been paying a given plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStanding {
    Timely,
    Late,
    Defaulted,
}

/// first installment offset from the start month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FirstDueOffset {
    /// first installment falls due in the start month
    SameMonth,
    /// first installment falls due one month after start
    NextMonth,
}

impl FirstDueOffset {
    pub fn months(&self) -> u32 {
        match self {
            FirstDueOffset::SameMonth => 0,
            FirstDueOffset::NextMonth => 1,
        }
    }
}

/// which installment absorbs the rounding remainder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundingPolicy {
    LastInstallmentAbsorbs,
    FirstInstallmentAbsorbs,
}

/// what to do with money left over after every installment is paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverpaymentPolicy {
    /// apply what fits and report the remainder to the caller
    Surface,
    /// refuse the whole payment, nothing is applied
    Reject,
}

/// upper bound on the principal of a new loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanCapPolicy {
    /// capped at what the owner has paid into subscriptions
    TotalPaid,
    Uncapped,
}
