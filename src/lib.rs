pub mod clock;
pub mod config;
pub mod decimal;
pub mod engine;
pub mod errors;
pub mod evaluator;
pub mod events;
pub mod interest;
pub mod ledger;
pub mod owner;
pub mod payments;
pub mod repository;
pub mod state;
pub mod types;
pub mod views;

// re-export key types
pub use config::{EngineConfig, PlanTemplate, ScheduleConfig};
pub use decimal::{Money, Rate};
pub use engine::{Collaborators, PaymentOutcome, PlanCreated, RepaymentEngine};
pub use errors::{EngineError, Result};
pub use evaluator::{AccountStateEvaluator, Evaluation};
pub use events::{Event, EventStore};
pub use interest::FineEngine;
pub use ledger::{InMemoryLedger, LedgerRecorder, PaymentEvent};
pub use owner::{AccountOwner, EligibilityFlag, PaymentHistoryEntry};
pub use payments::{
    Allocation, AllocationLine, DueAmount, DueCalculator, LoanQuote, PaymentAllocator, PaymentRequest,
    ScheduleGenerator,
};
pub use repository::{AccountRepository, InMemoryStore, OwnerRepository, TemplateRepository, Versioned};
pub use state::{RepaymentPlan, ScheduleEntry};
pub use types::{
    FirstDueOffset, LoanCapPolicy, OverpaymentPolicy, OwnerId, PaymentStanding, PlanId, PlanKind, PlanStatus,
    RoundingPolicy, TemplateId, TransactionKind, TransactionStatus,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
