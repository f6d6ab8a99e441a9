pub mod penalty;

use crate::decimal::{Money, Rate};
use crate::state::RepaymentPlan;

pub use penalty::FineEngine;

/// flat interest on a principal: `principal * rate`
pub fn simple_interest(principal: Money, rate: Rate) -> Money {
    principal.apply_rate(rate)
}

/// interest credited once a plan is fully paid
pub fn interest_on_completion(plan: &RepaymentPlan) -> Money {
    simple_interest(plan.principal, plan.interest_rate)
}
