use thiserror::Error;

use crate::decimal::Money;
use crate::types::{OwnerId, PlanId, PlanStatus, TemplateId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid schedule parameters: {message}")]
    InvalidScheduleParameters {
        message: String,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("plan not found: {id}")]
    PlanNotFound {
        id: PlanId,
    },

    #[error("payment exceeds amount due: {unapplied} left unapplied")]
    OverpaymentUnapplied {
        unapplied: Money,
    },

    #[error("owner not found: {id}")]
    OwnerNotFound {
        id: OwnerId,
    },

    #[error("owner {id} is not eligible for a loan")]
    NotEligibleForLoan {
        id: OwnerId,
    },

    #[error("loan amount exceeds total paid: limit {limit}, requested {requested}")]
    LoanExceedsPaidAmount {
        limit: Money,
        requested: Money,
    },

    #[error("plan template not found: {id}")]
    TemplateNotFound {
        id: TemplateId,
    },

    #[error("plan template is disabled: {id}")]
    TemplateDisabled {
        id: TemplateId,
    },

    #[error("plan already completed: {id}")]
    PlanAlreadyCompleted {
        id: PlanId,
    },

    #[error("invalid status transition: {from} -> {to}")]
    InvalidStateTransition {
        from: PlanStatus,
        to: PlanStatus,
    },

    #[error("concurrent modification: expected version {expected}, found {found}")]
    ConcurrentModification {
        expected: u64,
        found: u64,
    },

    #[error("gave up after {attempts} conflicting attempts")]
    RetriesExhausted {
        attempts: u32,
    },

    #[error("duplicate record: {id}")]
    DuplicateRecord {
        id: uuid::Uuid,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("serialization error: {message}")]
    Serialization {
        message: String,
    },
}

impl EngineError {
    /// errors that a fresh reload and retry may resolve
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::ConcurrentModification { .. })
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
