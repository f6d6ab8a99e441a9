use tracing::{debug, info};

use crate::events::Event;
use crate::interest::{interest_on_completion, FineEngine};
use crate::ledger::PaymentEvent;
use crate::owner::PaymentHistoryEntry;
use crate::payments::Allocation;
use crate::state::RepaymentPlan;
use crate::types::{PaymentStanding, PlanKind, PlanStatus, TransactionKind};

/// everything that follows from one applied payment
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub plan: RepaymentPlan,
    /// ledger record for the payment just applied
    pub payment_event: PaymentEvent,
    /// the owner has now paid something and qualifies for a loan
    pub grants_eligibility: bool,
    pub history: Option<PaymentHistoryEntry>,
    pub events: Vec<Event>,
}

/// derives status, fines and interest from a plan's schedule
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountStateEvaluator;

impl AccountStateEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// recompute derived fields from the schedule.
    ///
    /// `completed` is terminal and is entered only once every installment is
    /// paid. Any other plan with money paid in is `active` again, so a
    /// defaulted plan that receives a payment is reinstated.
    pub fn recompute(&self, mut plan: RepaymentPlan) -> RepaymentPlan {
        if !plan.status.is_terminal() {
            if plan.all_paid() {
                plan.status = PlanStatus::Completed;
                plan.interest_earned = interest_on_completion(&plan);
            } else if plan.total_paid().is_positive() {
                plan.status = PlanStatus::Active;
            }
        }

        plan.fine_charged = FineEngine::new(plan.fine_rate).charged(&plan.schedule);
        plan
    }

    /// fold an allocation into the plan it was computed from
    pub fn evaluate(&self, before: &RepaymentPlan, allocation: &Allocation) -> Evaluation {
        let date = allocation.payment_date;
        let mut plan = before.clone();
        plan.schedule = allocation.schedule.clone();
        let plan = self.recompute(plan);

        let mut events = vec![Event::PaymentApplied {
            plan_id: plan.id,
            amount: allocation.amount,
            applied: allocation.applied,
            date,
        }];

        for line in allocation.lines.iter().filter(|l| l.settled) {
            if line.late {
                events.push(Event::InstallmentPaidLate {
                    plan_id: plan.id,
                    due_date: line.due_date,
                    amount: line.applied,
                    days_late: (date - line.due_date).num_days(),
                    date,
                });
            } else {
                events.push(Event::InstallmentPaid {
                    plan_id: plan.id,
                    due_date: line.due_date,
                    amount: line.applied,
                    date,
                });
            }
        }

        if allocation.has_unapplied() {
            events.push(Event::OverpaymentUnapplied {
                plan_id: plan.id,
                unapplied: allocation.unapplied,
                date,
            });
        }

        if plan.fine_charged != before.fine_charged {
            events.push(Event::FineAssessed {
                plan_id: plan.id,
                fine_charged: plan.fine_charged,
                late_installments: plan.schedule.iter().filter(|e| e.is_late).count() as u32,
                date,
            });
        }

        if plan.status != before.status {
            events.push(Event::StatusChanged {
                plan_id: plan.id,
                old_status: before.status,
                new_status: plan.status,
                date,
            });
        }

        if plan.is_completed() && !before.is_completed() {
            info!(plan_id = %plan.id, interest_earned = %plan.interest_earned, "plan completed");
            events.push(Event::PlanCompleted {
                plan_id: plan.id,
                interest_earned: plan.interest_earned,
                date,
            });
        }

        let kind = match plan.kind {
            PlanKind::Loan => TransactionKind::LoanRepayment,
            PlanKind::Subscription => TransactionKind::Payment,
        };
        let payment_event = PaymentEvent::completed(plan.owner_id, plan.id, allocation.applied, date, kind);

        let grants_eligibility = plan.total_paid().is_positive();
        let history = grants_eligibility.then(|| PaymentHistoryEntry {
            plan_id: plan.id,
            standing: if plan.has_late_entries() {
                PaymentStanding::Late
            } else {
                PaymentStanding::Timely
            },
            completed_on: plan.is_completed().then_some(date),
            recorded_on: date,
        });

        debug!(
            plan_id = %plan.id,
            status = %plan.status,
            fine_charged = %plan.fine_charged,
            "plan state recomputed"
        );

        Evaluation {
            plan,
            payment_event,
            grants_eligibility,
            history,
            events,
        }
    }
}
