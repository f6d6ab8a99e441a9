//! request and response shapes for the engine's outer surface
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::engine::{PaymentOutcome, PlanCreated};
use crate::interest::FineEngine;
use crate::ledger::PaymentEvent;
use crate::payments::{DueAmount, PaymentRequest};
use crate::state::{RepaymentPlan, ScheduleEntry};
use crate::types::{OwnerId, PlanId, PlanKind, PlanStatus, TemplateId, TransactionKind, TransactionStatus};

/// loan request; `totalAmount` is accepted for `amount`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    pub owner_id: OwnerId,
    #[serde(alias = "totalAmount")]
    pub amount: Money,
    pub duration_months: u32,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

/// subscription to an existing template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    pub owner_id: OwnerId,
    pub template_id: TemplateId,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyPaymentRequest {
    pub plan_id: PlanId,
    pub amount: Money,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
}

impl From<ApplyPaymentRequest> for PaymentRequest {
    fn from(request: ApplyPaymentRequest) -> Self {
        PaymentRequest {
            plan_id: request.plan_id,
            amount: request.amount,
            payment_date: request.payment_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueAmountQuery {
    pub plan_id: PlanId,
    #[serde(default)]
    pub as_of_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntryView {
    pub due_date: NaiveDate,
    pub amount_due: Money,
    pub paid_amount: Money,
    pub paid_on: Option<NaiveDate>,
    pub is_late: bool,
}

impl From<&ScheduleEntry> for ScheduleEntryView {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            due_date: entry.due_date,
            amount_due: entry.amount_due,
            paid_amount: entry.paid_amount,
            paid_on: entry.paid_on,
            is_late: entry.is_late,
        }
    }
}

/// serializable view of a plan; rates are shown as percentages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanView {
    pub id: PlanId,
    pub owner_id: OwnerId,
    pub kind: PlanKind,
    pub template_id: Option<TemplateId>,
    pub principal: Money,
    pub total_amount: Money,
    pub interest_rate: Decimal,
    pub fine_rate: Decimal,
    pub duration_months: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PlanStatus,
    pub interest_earned: Money,
    pub fine_charged: Money,
    pub total_paid: Money,
    pub total_remaining: Money,
    pub schedule: Vec<ScheduleEntryView>,
}

impl PlanView {
    pub fn from_plan(plan: &RepaymentPlan) -> Self {
        PlanView {
            id: plan.id,
            owner_id: plan.owner_id,
            kind: plan.kind,
            template_id: plan.template_id,
            principal: plan.principal,
            total_amount: plan.total_amount,
            interest_rate: plan.interest_rate.as_percentage().normalize(),
            fine_rate: plan.fine_rate.as_percentage().normalize(),
            duration_months: plan.duration_months,
            start_date: plan.start_date,
            end_date: plan.end_date,
            status: plan.status,
            interest_earned: plan.interest_earned,
            fine_charged: plan.fine_charged,
            total_paid: plan.total_paid(),
            total_remaining: plan.total_remaining(),
            schedule: plan.schedule.iter().map(ScheduleEntryView::from).collect(),
        }
    }
}

/// ledger record as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub id: uuid::Uuid,
    pub account_id: PlanId,
    pub owner_id: OwnerId,
    pub amount: Money,
    pub occurred_on: NaiveDate,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
}

impl From<&PaymentEvent> for TransactionView {
    fn from(event: &PaymentEvent) -> Self {
        Self {
            id: event.id,
            account_id: event.plan_id,
            owner_id: event.owner_id,
            amount: event.amount,
            occurred_on: event.occurred_on,
            kind: event.kind,
            status: event.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanResponse {
    pub plan: PlanView,
    pub payment_event: Option<TransactionView>,
}

impl From<&PlanCreated> for CreatePlanResponse {
    fn from(created: &PlanCreated) -> Self {
        Self {
            plan: PlanView::from_plan(&created.plan),
            payment_event: created.disbursement.as_ref().map(TransactionView::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub updated_plan: PlanView,
    pub payment_event: TransactionView,
    pub amount_unapplied: Money,
}

impl From<&PaymentOutcome> for PaymentResponse {
    fn from(outcome: &PaymentOutcome) -> Self {
        Self {
            updated_plan: PlanView::from_plan(&outcome.plan),
            payment_event: TransactionView::from(&outcome.payment_event),
            amount_unapplied: outcome.unapplied,
        }
    }
}

/// one installment's contribution to a due-amount answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueLineView {
    pub due_date: NaiveDate,
    pub remaining: Money,
    pub overdue: bool,
    pub fine: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueAmountResponse {
    pub total_due: Money,
    pub overdue_amount: Money,
    pub upcoming_amount: Money,
    pub fine_amount: Money,
    pub as_of_date: NaiveDate,
    pub breakdown: Vec<DueLineView>,
}

impl DueAmountResponse {
    /// totals from `due`, per-installment lines from `plan`
    pub fn new(plan: &RepaymentPlan, due: &DueAmount) -> Self {
        let breakdown = if plan.is_completed() {
            Vec::new()
        } else {
            let fines = FineEngine::new(plan.fine_rate);
            plan.schedule
                .iter()
                .filter_map(|entry| {
                    let fine = if fines.is_fined(entry, due.as_of) {
                        fines.fine_for(entry)
                    } else {
                        Money::ZERO
                    };
                    let remaining = entry.remaining();
                    if remaining.is_zero() && fine.is_zero() {
                        return None;
                    }
                    Some(DueLineView {
                        due_date: entry.due_date,
                        remaining,
                        overdue: remaining.is_positive() && due.as_of >= entry.due_date,
                        fine,
                    })
                })
                .collect()
        };

        Self {
            total_due: due.total_due,
            overdue_amount: due.overdue_amount,
            upcoming_amount: due.upcoming_amount,
            fine_amount: due.fine_amount,
            as_of_date: due.as_of,
            breakdown,
        }
    }
}

/// convert to pretty-printed json string
pub fn to_json_pretty<T: Serialize>(value: &T) -> crate::errors::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::payments::{DueCalculator, PaymentAllocator};
    use crate::state::PlanTerms;
    use chrono::Utc;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn plan() -> RepaymentPlan {
        let schedule = (1..=3)
            .map(|m| ScheduleEntry::new(date(2024, m, 1), Money::from_major(100)))
            .collect();
        RepaymentPlan::open(
            PlanTerms {
                owner_id: Uuid::new_v4(),
                kind: PlanKind::Subscription,
                template_id: None,
                principal: Money::from_major(300),
                total_amount: Money::from_major(300),
                interest_rate: Rate::from_percentage(5),
                fine_rate: Rate::from_percentage(8),
                duration_months: 3,
                start_date: date(2024, 1, 1),
            },
            schedule,
            Utc::now(),
        )
    }

    #[test]
    fn test_payment_request_accepts_camel_case() {
        let id = Uuid::new_v4();
        let json = format!(r#"{{"planId":"{}","amount":"150","paymentDate":"2024-01-02"}}"#, id);

        let request: PaymentRequest = serde_json::from_str::<ApplyPaymentRequest>(&json).unwrap().into();
        assert_eq!(request.plan_id, id);
        assert_eq!(request.amount, Money::from_major(150));
        assert_eq!(request.payment_date, Some(date(2024, 1, 2)));
    }

    #[test]
    fn test_create_plan_accepts_total_amount_alias() {
        let owner = Uuid::new_v4();
        let json = format!(r#"{{"ownerId":"{}","totalAmount":"1200","durationMonths":12}}"#, owner);

        let request: CreatePlanRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request.amount, Money::from_major(1_200));
        assert_eq!(request.start_date, None);
    }

    #[test]
    fn test_plan_view_field_names() {
        let json = serde_json::to_value(PlanView::from_plan(&plan())).unwrap();

        assert_eq!(json["durationMonths"], 3);
        assert_eq!(json["status"], "active");
        assert_eq!(json["schedule"][0]["isLate"], false);
        assert!(json["schedule"][0]["paidOn"].is_null());
        assert_eq!(json["fineRate"], "8");
    }

    #[test]
    fn test_due_breakdown() {
        let mut plan = plan();
        let allocation = PaymentAllocator::new()
            .apply(&plan.schedule, Money::from_major(150), date(2024, 1, 2))
            .unwrap();
        plan.schedule = allocation.schedule;

        let due = DueCalculator::new().due_as_of(&plan, date(2024, 1, 2));
        let response = DueAmountResponse::new(&plan, &due);

        assert_eq!(response.fine_amount, Money::from_major(8));
        assert_eq!(response.breakdown.len(), 3);
        assert_eq!(response.breakdown[0].remaining, Money::ZERO);
        assert_eq!(response.breakdown[0].fine, Money::from_major(8));
        assert!(!response.breakdown[1].overdue);

        let json = to_json_pretty(&response).unwrap();
        assert!(json.contains("\"asOfDate\": \"2024-01-02\""));
    }
}
