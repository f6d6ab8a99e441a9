/// due amount - overdue, upcoming and fines as the clock moves
use chrono::{Duration, NaiveDate};
use repayment_engine::views::{to_json_pretty, DueAmountQuery, DueAmountResponse};
use repayment_engine::{clock, EngineConfig, Money, PaymentRequest, PlanTemplate, Rate, RepaymentEngine};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").with_target(false).init();

    println!("=== due amount example ===\n");

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?;
    let time = clock::fixed(start);
    let controller = time.test_control().ok_or("test clock required")?;
    let engine = RepaymentEngine::new(EngineConfig::default(), time.clone())?;

    let owner = engine.register_owner("Meera")?;
    let template = engine.add_template(PlanTemplate::new(
        "Quarterly",
        Money::from_major(300),
        3,
        Rate::ZERO,
        Rate::from_percentage(8),
        time.now(),
    ))?;
    let plan = engine.subscribe(owner.id, template, None)?;

    // one day late: first installment settled late, second half paid
    controller.advance(Duration::days(1));
    engine.apply_payment(PaymentRequest::new(plan.id, Money::from_major(150)))?;

    for days in [0, 31, 61] {
        let query = DueAmountQuery {
            plan_id: plan.id,
            as_of_date: Some(clock::today(&time) + Duration::days(days)),
        };
        let due = engine.due_amount(query.plan_id, query.as_of_date)?;
        let response = DueAmountResponse::new(&engine.plan(plan.id)?, &due);
        println!("{}\n", to_json_pretty(&response)?);
    }

    Ok(())
}
