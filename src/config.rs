use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::{EngineError, Result};
use crate::types::{FirstDueOffset, LoanCapPolicy, OverpaymentPolicy, RoundingPolicy, TemplateId};

/// engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// simple interest added on top of a loan principal
    pub loan_interest_rate: Rate,
    /// fine rate applied to overdue loan installments
    pub loan_fine_rate: Rate,
    pub loan_schedule: ScheduleConfig,
    pub subscription_schedule: ScheduleConfig,
    pub overpayment_policy: OverpaymentPolicy,
    pub loan_cap_policy: LoanCapPolicy,
    /// reload-and-retry attempts on a version conflict
    pub max_conflict_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            loan_interest_rate: Rate::from_percentage(8),
            loan_fine_rate: Rate::ZERO,
            loan_schedule: ScheduleConfig::loan(),
            subscription_schedule: ScheduleConfig::subscription(),
            overpayment_policy: OverpaymentPolicy::Surface,
            loan_cap_policy: LoanCapPolicy::TotalPaid,
            max_conflict_retries: 3,
        }
    }
}

impl EngineConfig {
    /// load from a json document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.loan_interest_rate.is_negative() || self.loan_fine_rate.is_negative() {
            return Err(EngineError::InvalidConfiguration {
                message: "loan rates must not be negative".to_string(),
            });
        }
        self.loan_schedule.validate()?;
        self.subscription_schedule.validate()
    }
}

/// schedule generation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub first_due_offset: FirstDueOffset,
    pub rounding: RoundingPolicy,
    /// decimal places of each installment amount
    pub precision: u32,
}

impl ScheduleConfig {
    /// loans: first installment one month after disbursement
    pub fn loan() -> Self {
        Self {
            first_due_offset: FirstDueOffset::NextMonth,
            rounding: RoundingPolicy::LastInstallmentAbsorbs,
            precision: 2,
        }
    }

    /// subscriptions: first installment due in the start month
    pub fn subscription() -> Self {
        Self {
            first_due_offset: FirstDueOffset::SameMonth,
            rounding: RoundingPolicy::LastInstallmentAbsorbs,
            precision: 2,
        }
    }

    pub fn with_offset(mut self, offset: FirstDueOffset) -> Self {
        self.first_due_offset = offset;
        self
    }

    pub fn with_rounding(mut self, rounding: RoundingPolicy) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.precision > Money::SCALE {
            return Err(EngineError::InvalidConfiguration {
                message: format!(
                    "installment precision {} exceeds money scale {}",
                    self.precision,
                    Money::SCALE
                ),
            });
        }
        Ok(())
    }
}

/// a subscribable plan template (amount, duration and rates)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTemplate {
    pub id: TemplateId,
    pub name: String,
    pub amount: Money,
    pub duration_months: u32,
    /// interest credited to the subscriber on completion
    pub interest_rate: Rate,
    /// fine charged per late installment
    pub fine_rate: Rate,
    pub description: Option<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl PlanTemplate {
    pub fn new(
        name: impl Into<String>,
        amount: Money,
        duration_months: u32,
        interest_rate: Rate,
        fine_rate: Rate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            amount,
            duration_months,
            interest_rate,
            fine_rate,
            description: None,
            enabled: true,
            created_at,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// flip the enabled flag
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(EngineError::InvalidConfiguration {
                message: "template name is required".to_string(),
            });
        }
        if !self.amount.is_positive() || self.duration_months == 0 {
            return Err(EngineError::InvalidScheduleParameters {
                message: format!(
                    "template amount {} and duration {} must be positive",
                    self.amount, self.duration_months
                ),
            });
        }
        if self.interest_rate.is_negative() || self.fine_rate.is_negative() {
            return Err(EngineError::InvalidConfiguration {
                message: "template rates must not be negative".to_string(),
            });
        }
        Ok(())
    }
}
