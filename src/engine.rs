use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::clock;
use crate::config::{EngineConfig, PlanTemplate};
use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::evaluator::AccountStateEvaluator;
use crate::events::{Event, EventStore};
use crate::ledger::{InMemoryLedger, LedgerRecorder, PaymentEvent};
use crate::owner::{AccountOwner, PaymentHistoryEntry};
use crate::payments::{DueAmount, DueCalculator, LoanQuote, PaymentAllocator, PaymentRequest, ScheduleGenerator};
use crate::repository::{AccountRepository, InMemoryStore, OwnerRepository, TemplateRepository};
use crate::state::{PlanTerms, RepaymentPlan};
use crate::types::{
    LoanCapPolicy, OverpaymentPolicy, OwnerId, PaymentStanding, PlanId, PlanKind, PlanStatus, TemplateId,
    TransactionKind,
};

/// storage and ledger collaborators used by the engine
#[derive(Clone)]
pub struct Collaborators {
    pub plans: Arc<dyn AccountRepository>,
    pub owners: Arc<dyn OwnerRepository>,
    pub templates: Arc<dyn TemplateRepository>,
    pub ledger: Arc<dyn LedgerRecorder>,
}

impl Collaborators {
    /// one shared in-memory store plus an in-memory ledger
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            plans: store.clone(),
            owners: store.clone(),
            templates: store,
            ledger: Arc::new(InMemoryLedger::new()),
        }
    }
}

/// a freshly opened plan and its disbursement record, if any
#[derive(Debug, Clone, PartialEq)]
pub struct PlanCreated {
    pub plan: RepaymentPlan,
    pub disbursement: Option<PaymentEvent>,
}

/// result of applying one payment
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentOutcome {
    pub plan: RepaymentPlan,
    pub payment_event: PaymentEvent,
    /// part of the payment that no installment could absorb
    pub unapplied: Money,
}

impl PaymentOutcome {
    /// the unapplied remainder as an error value, if there is one
    pub fn overpayment(&self) -> Option<EngineError> {
        self.unapplied.is_positive().then_some(EngineError::OverpaymentUnapplied {
            unapplied: self.unapplied,
        })
    }
}

/// loan and subscription engine
pub struct RepaymentEngine {
    config: EngineConfig,
    plans: Arc<dyn AccountRepository>,
    owners: Arc<dyn OwnerRepository>,
    templates: Arc<dyn TemplateRepository>,
    ledger: Arc<dyn LedgerRecorder>,
    time: SafeTimeProvider,
    events: Mutex<EventStore>,
}

impl RepaymentEngine {
    /// engine over in-memory storage
    pub fn new(config: EngineConfig, time: SafeTimeProvider) -> Result<Self> {
        Self::with_collaborators(config, Collaborators::in_memory(), time)
    }

    pub fn with_collaborators(
        config: EngineConfig,
        collaborators: Collaborators,
        time: SafeTimeProvider,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            plans: collaborators.plans,
            owners: collaborators.owners,
            templates: collaborators.templates,
            ledger: collaborators.ledger,
            time,
            events: Mutex::new(EventStore::new()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerRecorder> {
        &self.ledger
    }

    /// current business date
    pub fn today(&self) -> NaiveDate {
        clock::today(&self.time)
    }

    pub fn register_owner(&self, name: impl Into<String>) -> Result<AccountOwner> {
        let owner = AccountOwner::new(name);
        self.owners.insert_owner(owner.clone())?;
        debug!(owner_id = %owner.id, "owner registered");
        Ok(owner)
    }

    pub fn owner(&self, id: OwnerId) -> Result<AccountOwner> {
        self.owners.load_owner(id)
    }

    pub fn add_template(&self, template: PlanTemplate) -> Result<TemplateId> {
        let id = template.id;
        self.templates.insert_template(template)?;
        Ok(id)
    }

    /// enable or disable a template; existing subscriptions are unaffected
    pub fn toggle_template(&self, id: TemplateId) -> Result<PlanTemplate> {
        self.templates.update_template(id, &mut |t| t.toggle())
    }

    pub fn plan(&self, id: PlanId) -> Result<RepaymentPlan> {
        self.plans.load(id)
    }

    pub fn plans_for_owner(&self, owner_id: OwnerId) -> Result<Vec<RepaymentPlan>> {
        self.plans.find_by_owner(owner_id)
    }

    /// subscribe an owner to a template
    #[instrument(name = "repayment.subscribe", skip(self), err)]
    pub fn subscribe(
        &self,
        owner_id: OwnerId,
        template_id: TemplateId,
        start_date: Option<NaiveDate>,
    ) -> Result<RepaymentPlan> {
        self.owners.load_owner(owner_id)?;

        let template = self.templates.load_template(template_id)?;
        if !template.enabled {
            return Err(EngineError::TemplateDisabled { id: template_id });
        }

        let start_date = clock::date_or_today(start_date, &self.time);
        let schedule = ScheduleGenerator::new(self.config.subscription_schedule).generate(
            template.amount,
            template.duration_months,
            start_date,
        )?;

        let plan = RepaymentPlan::open(
            PlanTerms {
                owner_id,
                kind: PlanKind::Subscription,
                template_id: Some(template_id),
                principal: template.amount,
                total_amount: template.amount,
                interest_rate: template.interest_rate,
                fine_rate: template.fine_rate,
                duration_months: template.duration_months,
                start_date,
            },
            schedule,
            self.time.now(),
        );
        self.plans.insert(plan.clone())?;

        info!(plan_id = %plan.id, total = %plan.total_amount, "subscription opened");
        self.events.lock().emit(Event::PlanOriginated {
            plan_id: plan.id,
            owner_id,
            kind: plan.kind,
            total_amount: plan.total_amount,
            installments: plan.duration_months,
            start_date,
        });

        Ok(plan)
    }

    /// lend `amount` to an eligible owner
    #[instrument(name = "repayment.provide_loan", skip(self), err)]
    pub fn provide_loan(
        &self,
        owner_id: OwnerId,
        amount: Money,
        duration_months: u32,
        start_date: Option<NaiveDate>,
    ) -> Result<PlanCreated> {
        let owner = self.owners.load_owner(owner_id)?;
        if !owner.is_eligible_for_loan() {
            return Err(EngineError::NotEligibleForLoan { id: owner_id });
        }

        let schedule_config = self.config.loan_schedule;
        let quote = LoanQuote::new(amount, self.config.loan_interest_rate, duration_months, schedule_config.precision)?;

        if self.config.loan_cap_policy == LoanCapPolicy::TotalPaid {
            let limit = self.loan_limit(owner_id)?;
            if amount > limit {
                return Err(EngineError::LoanExceedsPaidAmount {
                    limit,
                    requested: amount,
                });
            }
        }

        let start_date = clock::date_or_today(start_date, &self.time);
        let schedule =
            ScheduleGenerator::new(schedule_config).generate(quote.total_repayment, duration_months, start_date)?;

        let plan = RepaymentPlan::open(
            PlanTerms {
                owner_id,
                kind: PlanKind::Loan,
                template_id: None,
                principal: amount,
                total_amount: quote.total_repayment,
                interest_rate: self.config.loan_interest_rate,
                fine_rate: self.config.loan_fine_rate,
                duration_months,
                start_date,
            },
            schedule,
            self.time.now(),
        );
        self.plans.insert(plan.clone())?;

        let disbursement = PaymentEvent::completed(owner_id, plan.id, amount, start_date, TransactionKind::LoanDisbursement);
        self.ledger.record(disbursement.clone())?;

        info!(
            plan_id = %plan.id,
            principal = %amount,
            total_repayment = %quote.total_repayment,
            "loan disbursed"
        );

        let mut events = self.events.lock();
        events.emit(Event::PlanOriginated {
            plan_id: plan.id,
            owner_id,
            kind: plan.kind,
            total_amount: plan.total_amount,
            installments: duration_months,
            start_date,
        });
        events.emit(Event::LoanDisbursed {
            plan_id: plan.id,
            owner_id,
            principal: amount,
            total_repayment: quote.total_repayment,
            date: start_date,
        });

        Ok(PlanCreated {
            plan,
            disbursement: Some(disbursement),
        })
    }

    /// most an owner may currently borrow: everything paid into subscriptions
    pub fn loan_limit(&self, owner_id: OwnerId) -> Result<Money> {
        Ok(self
            .plans
            .find_by_owner(owner_id)?
            .iter()
            .filter(|p| p.kind == PlanKind::Subscription)
            .map(|p| p.total_paid())
            .sum())
    }

    /// allocate a payment, recompute the plan and persist it atomically
    #[instrument(name = "repayment.apply_payment", skip(self), err)]
    pub fn apply_payment(&self, request: PaymentRequest) -> Result<PaymentOutcome> {
        request.validate()?;
        let payment_date = clock::date_or_today(request.payment_date, &self.time);

        let (evaluation, unapplied) = self.with_retries(|| {
            let current = self.plans.load_for_update(request.plan_id)?;
            let plan = current.value;

            if plan.status.is_terminal() {
                return Err(EngineError::PlanAlreadyCompleted { id: plan.id });
            }

            let allocation = PaymentAllocator::new().apply(&plan.schedule, request.amount, payment_date)?;
            if allocation.has_unapplied() && self.config.overpayment_policy == OverpaymentPolicy::Reject {
                return Err(EngineError::OverpaymentUnapplied {
                    unapplied: allocation.unapplied,
                });
            }

            let evaluation = AccountStateEvaluator::new().evaluate(&plan, &allocation);
            self.plans.save(evaluation.plan.clone(), current.version)?;
            Ok((evaluation, allocation.unapplied))
        })?;

        self.ledger.record(evaluation.payment_event.clone())?;

        let plan = &evaluation.plan;
        let mut events = evaluation.events.clone();

        if evaluation.grants_eligibility {
            let mut newly_granted = false;
            self.owners.update_owner(plan.owner_id, &mut |owner| {
                newly_granted = owner.eligibility.grant();
                if let Some(entry) = &evaluation.history {
                    owner.record_history(entry.clone());
                }
            })?;

            if newly_granted {
                info!(owner_id = %plan.owner_id, "owner became eligible for loans");
                events.push(Event::EligibilityGranted {
                    owner_id: plan.owner_id,
                    plan_id: plan.id,
                    date: payment_date,
                });
            }
        }

        if unapplied.is_positive() {
            warn!(plan_id = %plan.id, unapplied = %unapplied, "payment exceeded amount due");
        }
        self.events.lock().extend(events);

        Ok(PaymentOutcome {
            plan: evaluation.plan,
            payment_event: evaluation.payment_event,
            unapplied,
        })
    }

    /// what a plan owes as of `as_of`, today when absent
    #[instrument(name = "repayment.due_amount", skip(self), err)]
    pub fn due_amount(&self, plan_id: PlanId, as_of: Option<NaiveDate>) -> Result<DueAmount> {
        let plan = self.plans.load(plan_id)?;
        let as_of = clock::date_or_today(as_of, &self.time);
        Ok(DueCalculator::new().due_as_of(&plan, as_of))
    }

    /// flag a plan as defaulted; a no-op when it already is
    #[instrument(name = "repayment.mark_defaulted", skip(self), err)]
    pub fn mark_defaulted(&self, plan_id: PlanId) -> Result<RepaymentPlan> {
        let date = self.today();

        let (plan, changed) = self.with_retries(|| {
            let current = self.plans.load_for_update(plan_id)?;
            let mut plan = current.value;

            match plan.status {
                status if status.is_terminal() => Err(EngineError::InvalidStateTransition {
                    from: status,
                    to: PlanStatus::Defaulted,
                }),
                PlanStatus::Defaulted => Ok((plan, false)),
                _ => {
                    plan.status = PlanStatus::Defaulted;
                    self.plans.save(plan.clone(), current.version)?;
                    Ok((plan, true))
                }
            }
        })?;

        if changed {
            let outstanding = plan.total_remaining();
            warn!(plan_id = %plan.id, outstanding = %outstanding, "plan defaulted");

            self.owners.update_owner(plan.owner_id, &mut |owner| {
                owner.record_history(PaymentHistoryEntry {
                    plan_id: plan.id,
                    standing: PaymentStanding::Defaulted,
                    completed_on: None,
                    recorded_on: date,
                });
            })?;

            let mut events = self.events.lock();
            events.emit(Event::StatusChanged {
                plan_id: plan.id,
                old_status: PlanStatus::Active,
                new_status: PlanStatus::Defaulted,
                date,
            });
            events.emit(Event::PlanDefaulted {
                plan_id: plan.id,
                outstanding,
                date,
            });
        }

        Ok(plan)
    }

    /// drain collected events
    pub fn take_events(&self) -> Vec<Event> {
        self.events.lock().take_events()
    }

    /// run `op`, reloading and retrying on version conflicts
    fn with_retries<T>(&self, mut op: impl FnMut() -> Result<T>) -> Result<T> {
        let attempts = self.config.max_conflict_retries.saturating_add(1);

        for attempt in 1..=attempts {
            match op() {
                Err(err) if err.is_retryable() => {
                    warn!(attempt, error = %err, "version conflict, reloading plan");
                }
                result => return result,
            }
        }

        Err(EngineError::RetriesExhausted { attempts })
    }
}
