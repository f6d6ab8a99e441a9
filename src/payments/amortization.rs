use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ScheduleConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{EngineError, Result};
use crate::state::{add_months, ScheduleEntry};
use crate::types::RoundingPolicy;

/// flat-installment schedule generator
#[derive(Debug, Clone, Copy)]
pub struct ScheduleGenerator {
    config: ScheduleConfig,
}

impl ScheduleGenerator {
    pub fn new(config: ScheduleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// split `total_amount` into `duration_months` monthly installments.
    ///
    /// Installments are rounded to the configured precision and one entry
    /// (chosen by the rounding policy) absorbs the remainder, so the amounts
    /// always sum to `total_amount` exactly. Fails without producing any
    /// entries when the inputs are non-positive or too small to split.
    pub fn generate(
        &self,
        total_amount: Money,
        duration_months: u32,
        start_date: NaiveDate,
    ) -> Result<Vec<ScheduleEntry>> {
        if duration_months == 0 {
            return Err(EngineError::InvalidScheduleParameters {
                message: "duration must be at least one month".to_string(),
            });
        }
        if !total_amount.is_positive() {
            return Err(EngineError::InvalidScheduleParameters {
                message: format!("total amount must be positive, got {}", total_amount),
            });
        }

        let installment = total_amount.split_even(duration_months, self.config.precision);
        let others = installment * Decimal::from(duration_months - 1);
        let absorbing = total_amount - others;

        if !installment.is_positive() || !absorbing.is_positive() {
            return Err(EngineError::InvalidScheduleParameters {
                message: format!(
                    "{} cannot be split into {} positive installments",
                    total_amount, duration_months
                ),
            });
        }

        let absorbing_index = match self.config.rounding {
            RoundingPolicy::LastInstallmentAbsorbs => duration_months - 1,
            RoundingPolicy::FirstInstallmentAbsorbs => 0,
        };
        let offset = self.config.first_due_offset.months();

        let schedule = (0..duration_months)
            .map(|i| {
                let amount = if i == absorbing_index { absorbing } else { installment };
                ScheduleEntry::new(add_months(start_date, i + offset), amount)
            })
            .collect();

        Ok(schedule)
    }
}

/// simple-interest loan terms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanQuote {
    pub principal: Money,
    pub interest: Money,
    pub total_repayment: Money,
    pub installment: Money,
}

impl LoanQuote {
    /// principal plus flat interest, spread evenly over the term
    pub fn new(principal: Money, rate: Rate, duration_months: u32, precision: u32) -> Result<Self> {
        if duration_months == 0 || !principal.is_positive() {
            return Err(EngineError::InvalidScheduleParameters {
                message: format!(
                    "loan principal {} and duration {} must be positive",
                    principal, duration_months
                ),
            });
        }

        let too_large = || EngineError::InvalidScheduleParameters {
            message: format!("loan principal {} is too large to quote at {}", principal, rate),
        };
        let interest = principal.checked_apply_rate(rate).ok_or_else(too_large)?;
        let total_repayment = principal.checked_add(interest).ok_or_else(too_large)?;

        Ok(Self {
            principal,
            interest,
            total_repayment,
            installment: total_repayment.split_even(duration_months, precision),
        })
    }
}
