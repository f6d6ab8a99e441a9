/// subscription - open a plan from a template and pay it off month by month
use chrono::{Duration, NaiveDate};
use repayment_engine::{clock, EngineConfig, Money, PaymentRequest, PlanTemplate, Rate, RepaymentEngine};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").with_target(false).init();

    println!("=== subscription example ===\n");

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?;
    let time = clock::fixed(start);
    let controller = time.test_control().ok_or("test clock required")?;
    let engine = RepaymentEngine::new(EngineConfig::default(), time.clone())?;

    let owner = engine.register_owner("Asha")?;
    let template = engine.add_template(
        PlanTemplate::new(
            "Gold saver",
            Money::from_major(1_200),
            12,
            Rate::from_percentage(6),
            Rate::from_percentage(2),
            time.now(),
        )
        .with_description("twelve monthly deposits of 100"),
    )?;

    let plan = engine.subscribe(owner.id, template, None)?;
    println!("plan {} opened, {} installments", plan.id, plan.schedule.len());
    for entry in plan.schedule.iter().take(3) {
        println!("  due {} amount {}", entry.due_date, entry.amount_due);
    }

    // pay every installment on its due date, except the fourth which is a week late
    for month in 0..12 {
        let due_date = plan.schedule[month].due_date;
        let paid_on = if month == 3 { due_date + Duration::days(7) } else { due_date };
        controller.set(clock::start_of_day(paid_on));

        let outcome = engine.apply_payment(PaymentRequest::new(plan.id, Money::from_major(100)))?;
        println!(
            "paid {} on {} -> status {}, fine charged {}",
            outcome.payment_event.amount,
            paid_on,
            outcome.plan.status,
            outcome.plan.fine_charged
        );
    }

    let plan = engine.plan(plan.id)?;
    println!("\ninterest earned: {}", plan.interest_earned);
    println!("eligible for loan: {}", engine.owner(owner.id)?.is_eligible_for_loan());
    println!("events collected: {}", engine.take_events().len());

    Ok(())
}
