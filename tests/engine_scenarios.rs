use std::sync::Arc;
use std::thread;

use chrono::{Duration, NaiveDate};
use repayment_engine::{
    clock, EngineConfig, EngineError, Event, LoanCapPolicy, LoanQuote, Money, OwnerId, PaymentRequest, PlanId,
    PlanKind, PlanStatus, PlanTemplate, Rate, RepaymentEngine, ScheduleConfig, ScheduleGenerator,
    TransactionKind,
};
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("repayment_engine=debug")
        .with_test_writer()
        .try_init();
}

fn engine_with(config: EngineConfig) -> RepaymentEngine {
    init_tracing();
    RepaymentEngine::new(config, clock::fixed(date(2024, 1, 1))).unwrap()
}

/// three monthly installments of 100 from 2024-01-01, 8% fine
fn three_by_hundred(engine: &RepaymentEngine) -> (OwnerId, PlanId) {
    let owner = engine.register_owner("Asha").unwrap();
    let template = engine
        .add_template(PlanTemplate::new(
            "Three months",
            Money::from_major(300),
            3,
            Rate::from_percentage(5),
            Rate::from_percentage(8),
            clock::start_of_day(date(2024, 1, 1)),
        ))
        .unwrap();
    let plan = engine.subscribe(owner.id, template, Some(date(2024, 1, 1))).unwrap();
    (owner.id, plan.id)
}

#[test]
fn loan_of_1200_over_12_months_at_8_percent() {
    let engine = engine_with(EngineConfig {
        loan_cap_policy: LoanCapPolicy::Uncapped,
        ..EngineConfig::default()
    });
    let (owner, plan) = three_by_hundred(&engine);
    engine.apply_payment(PaymentRequest::new(plan, Money::from_major(100))).unwrap();

    let created = engine
        .provide_loan(owner, Money::from_major(1_200), 12, Some(date(2024, 1, 1)))
        .unwrap();
    let loan = created.plan;

    assert_eq!(loan.kind, PlanKind::Loan);
    assert_eq!(loan.total_amount, Money::from_major(1_296));
    assert_eq!(loan.schedule.len(), 12);
    assert!(loan.schedule.iter().all(|e| e.amount_due == Money::from_major(108)));
    assert_eq!(loan.schedule[0].due_date, date(2024, 2, 1));
    assert_eq!(loan.schedule[11].due_date, date(2025, 1, 1));
    assert_eq!(loan.end_date, date(2025, 1, 1));

    let disbursement = created.disbursement.unwrap();
    assert_eq!(disbursement.kind, TransactionKind::LoanDisbursement);
    assert_eq!(disbursement.amount, Money::from_major(1_200));
}

#[test]
fn schedule_sum_matches_total_for_awkward_splits() {
    for (total, months) in [(dec!(1000), 3u32), (dec!(100), 7), (dec!(999.99), 11), (dec!(1), 3)] {
        for config in [ScheduleConfig::loan(), ScheduleConfig::subscription()] {
            let schedule = ScheduleGenerator::new(config)
                .generate(Money::from_decimal(total), months, date(2024, 1, 31))
                .unwrap();

            assert_eq!(schedule.len(), months as usize);
            let sum: Money = schedule.iter().map(|e| e.amount_due).sum();
            assert_eq!(sum, Money::from_decimal(total));
            assert!(schedule.windows(2).all(|w| w[0].due_date < w[1].due_date));
        }
    }

    let quote = LoanQuote::new(Money::from_major(1_000), Rate::from_percentage(8), 7, 2).unwrap();
    assert_eq!(quote.total_repayment, Money::from_major(1_080));
}

#[test]
fn late_partial_payment_scenario() {
    let engine = engine_with(EngineConfig::default());
    let (_, plan) = three_by_hundred(&engine);

    let outcome = engine
        .apply_payment(PaymentRequest::new(plan, Money::from_major(150)).on(date(2024, 1, 2)))
        .unwrap();
    let schedule = &outcome.plan.schedule;

    assert_eq!(schedule[0].paid_amount, Money::from_major(100));
    assert!(schedule[0].is_late);
    assert_eq!(schedule[1].paid_amount, Money::from_major(50));
    assert!(!schedule[1].is_late);
    assert_eq!(schedule[2].paid_amount, Money::ZERO);
    assert_eq!(schedule[2].paid_on, None);

    let due = engine.due_amount(plan, Some(date(2024, 1, 2))).unwrap();
    assert_eq!(due.overdue_amount, Money::ZERO);
    assert_eq!(due.upcoming_amount, Money::from_major(150));
    assert_eq!(due.fine_amount, Money::from_major(8));
    assert_eq!(due.total_due, Money::from_major(8));
    assert_eq!(outcome.plan.fine_charged, due.fine_amount);
}

#[test]
fn zero_payment_is_rejected_without_mutation() {
    let engine = engine_with(EngineConfig::default());
    let (_, plan) = three_by_hundred(&engine);
    let before = engine.plan(plan).unwrap();

    assert_eq!(
        engine.apply_payment(PaymentRequest::new(plan, Money::ZERO)),
        Err(EngineError::InvalidPaymentAmount { amount: Money::ZERO })
    );
    assert_eq!(engine.plan(plan).unwrap(), before);
    assert!(engine.ledger().for_plan(plan).is_empty());
}

#[test]
fn overpayment_surfaces_remainder_and_completes() {
    let engine = engine_with(EngineConfig::default());
    let (_, plan) = three_by_hundred(&engine);

    let outcome = engine
        .apply_payment(PaymentRequest::new(plan, Money::from_major(325)).on(date(2024, 1, 1)))
        .unwrap();

    assert_eq!(outcome.unapplied, Money::from_major(25));
    assert_eq!(
        outcome.overpayment(),
        Some(EngineError::OverpaymentUnapplied {
            unapplied: Money::from_major(25)
        })
    );
    assert_eq!(outcome.plan.status, PlanStatus::Completed);
    assert!(outcome.plan.schedule.iter().all(|e| e.is_settled()));
    assert_eq!(outcome.payment_event.amount, Money::from_major(300));
    let recorded = engine.ledger().for_plan(plan);
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].amount, Money::from_major(300));
    assert_eq!(outcome.plan.interest_earned, Money::from_major(15));

    let events = engine.take_events();
    assert!(events.iter().any(|e| matches!(e, Event::OverpaymentUnapplied { .. })));
    assert!(events.iter().any(|e| matches!(e, Event::PlanCompleted { .. })));
}

#[test]
fn completed_plan_owes_nothing_on_any_date() {
    let engine = engine_with(EngineConfig::default());
    let (_, plan) = three_by_hundred(&engine);
    engine
        .apply_payment(PaymentRequest::new(plan, Money::from_major(300)).on(date(2024, 5, 1)))
        .unwrap();

    for as_of in [date(2023, 12, 1), date(2024, 3, 1), date(2030, 1, 1)] {
        assert_eq!(engine.due_amount(plan, Some(as_of)).unwrap().total_due, Money::ZERO);
    }
}

#[test]
fn fine_gated_on_day_after_due_date() {
    let engine = engine_with(EngineConfig::default());
    let (_, on_time) = three_by_hundred(&engine);
    let (_, late) = three_by_hundred(&engine);

    let on_time = engine
        .apply_payment(PaymentRequest::new(on_time, Money::from_major(100)).on(date(2024, 1, 1)))
        .unwrap();
    let late = engine
        .apply_payment(PaymentRequest::new(late, Money::from_major(100)).on(date(2024, 1, 2)))
        .unwrap();

    assert_eq!(on_time.plan.fine_charged, Money::ZERO);
    assert_eq!(late.plan.fine_charged, Money::from_major(8));
}

#[test]
fn payments_settle_oldest_installment_first() {
    let engine = engine_with(EngineConfig::default());
    let (_, plan) = three_by_hundred(&engine);

    engine
        .apply_payment(PaymentRequest::new(plan, Money::from_major(40)).on(date(2024, 1, 1)))
        .unwrap();
    let outcome = engine
        .apply_payment(PaymentRequest::new(plan, Money::from_major(60)).on(date(2024, 1, 1)))
        .unwrap();

    let schedule = &outcome.plan.schedule;
    assert!(schedule[0].is_settled());
    assert_eq!(schedule[1].paid_amount, Money::ZERO);
    assert_eq!(schedule[2].paid_amount, Money::ZERO);
}

#[test]
fn clock_drives_default_dates() {
    let engine = engine_with(EngineConfig::default());
    let (_, plan) = three_by_hundred(&engine);

    let due = engine.due_amount(plan, None).unwrap();
    assert_eq!(due.as_of, date(2024, 1, 1));
    assert_eq!(due.overdue_amount, Money::from_major(100));
    // untouched installment is fined from its due date on
    assert_eq!(due.fine_amount, Money::from_major(8));

    let later = engine.due_amount(plan, Some(date(2024, 1, 1) + Duration::days(40))).unwrap();
    assert_eq!(later.overdue_amount, Money::from_major(200));
    assert_eq!(later.fine_amount, Money::from_major(16));
}

#[test]
fn defaulted_plan_returns_to_active_on_payment() {
    let engine = engine_with(EngineConfig::default());
    let (owner, plan) = three_by_hundred(&engine);

    engine.mark_defaulted(plan).unwrap();
    assert_eq!(engine.plan(plan).unwrap().status, PlanStatus::Defaulted);
    let partial = engine
        .apply_payment(PaymentRequest::new(plan, Money::from_major(100)).on(date(2024, 6, 1)))
        .unwrap();
    assert_eq!(partial.plan.status, PlanStatus::Active);
    assert_eq!(engine.plan(plan).unwrap().status, PlanStatus::Active);

    let payoff = engine
        .apply_payment(PaymentRequest::new(plan, Money::from_major(200)).on(date(2024, 6, 1)))
        .unwrap();
    assert_eq!(payoff.plan.status, PlanStatus::Completed);
    assert_eq!(payoff.plan.fine_charged, Money::from_major(24));
    assert!(engine.owner(owner).unwrap().is_eligible_for_loan());
}

#[test]
fn concurrent_payments_on_one_plan_never_double_allocate() {
    let engine = Arc::new(engine_with(EngineConfig {
        max_conflict_retries: 16,
        ..EngineConfig::default()
    }));
    let (_, plan) = three_by_hundred(&engine);

    thread::scope(|scope| {
        for _ in 0..10 {
            let engine = Arc::clone(&engine);
            scope.spawn(move || {
                engine
                    .apply_payment(PaymentRequest::new(plan, Money::from_major(25)).on(date(2024, 1, 1)))
                    .unwrap();
            });
        }
    });

    let plan_state = engine.plan(plan).unwrap();
    assert_eq!(plan_state.total_paid(), Money::from_major(250));
    assert_eq!(plan_state.schedule[0].paid_amount, Money::from_major(100));
    assert_eq!(plan_state.schedule[1].paid_amount, Money::from_major(100));
    assert_eq!(plan_state.schedule[2].paid_amount, Money::from_major(50));
    assert!(plan_state.schedule.iter().all(|e| e.paid_amount <= e.amount_due));

    let ledger = engine.ledger().for_plan(plan);
    assert_eq!(ledger.len(), 10);
    let recorded: Money = ledger.iter().map(|e| e.amount).sum();
    assert_eq!(recorded, Money::from_major(250));
}

#[test]
fn payments_on_different_plans_run_in_parallel() {
    let engine = Arc::new(engine_with(EngineConfig::default()));
    let plans: Vec<PlanId> = (0..4).map(|_| three_by_hundred(&engine).1).collect();

    thread::scope(|scope| {
        for &plan in &plans {
            let engine = Arc::clone(&engine);
            scope.spawn(move || {
                engine
                    .apply_payment(PaymentRequest::new(plan, Money::from_major(300)).on(date(2024, 1, 1)))
                    .unwrap();
            });
        }
    });

    for plan in plans {
        assert_eq!(engine.plan(plan).unwrap().status, PlanStatus::Completed);
    }
}
