/// loan lifecycle - earn eligibility, borrow against paid savings, repay
use chrono::NaiveDate;
use repayment_engine::views::{to_json_pretty, CreatePlanRequest, CreatePlanResponse, PaymentResponse};
use repayment_engine::{clock, EngineConfig, EngineError, Money, PaymentRequest, PlanTemplate, Rate, RepaymentEngine};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").with_target(false).init();

    println!("=== loan lifecycle example ===\n");

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?;
    let time = clock::fixed(start);
    let engine = RepaymentEngine::new(EngineConfig::default(), time.clone())?;

    let owner = engine.register_owner("Ravi")?;
    let template = engine.add_template(PlanTemplate::new(
        "Starter",
        Money::from_major(2_400),
        12,
        Rate::from_percentage(5),
        Rate::from_percentage(2),
        time.now(),
    ))?;

    // no payments yet, so no loan
    match engine.provide_loan(owner.id, Money::from_major(500), 6, None) {
        Err(EngineError::NotEligibleForLoan { .. }) => println!("loan refused: owner not yet eligible"),
        other => println!("unexpected: {:?}", other),
    }

    let savings = engine.subscribe(owner.id, template, None)?;
    engine.apply_payment(PaymentRequest::new(savings.id, Money::from_major(1_200)).on(start))?;
    println!("paid 1200 into savings, loan limit now {}", engine.loan_limit(owner.id)?);

    let request: CreatePlanRequest = serde_json::from_str(&format!(
        r#"{{"ownerId":"{}","totalAmount":"1200","durationMonths":12,"startDate":"2024-01-15"}}"#,
        owner.id
    ))?;
    let created = engine.provide_loan(request.owner_id, request.amount, request.duration_months, request.start_date)?;
    println!("\n{}", to_json_pretty(&CreatePlanResponse::from(&created))?);

    // repay everything in one go, with a little extra
    let repaid_on = NaiveDate::from_ymd_opt(2024, 1, 20).ok_or("bad date")?;
    let outcome = engine.apply_payment(PaymentRequest::new(created.plan.id, Money::from_major(1_300)).on(repaid_on))?;
    if let Some(err) = outcome.overpayment() {
        println!("note: {}", err);
    }
    println!("\n{}", to_json_pretty(&PaymentResponse::from(&outcome))?);

    Ok(())
}
