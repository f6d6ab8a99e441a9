use parking_lot::RwLock;
use std::collections::HashMap;

use crate::config::PlanTemplate;
use crate::errors::{EngineError, Result};
use crate::owner::AccountOwner;
use crate::state::RepaymentPlan;
use crate::types::{OwnerId, PlanId, TemplateId};

/// a stored value together with the version it was read at
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

/// plan storage with compare-and-swap writes.
///
/// A payment is one `load_for_update` / `save` pair. `save` succeeds only if
/// nobody else saved the plan since it was loaded.
pub trait AccountRepository: Send + Sync {
    fn insert(&self, plan: RepaymentPlan) -> Result<u64>;

    fn load_for_update(&self, id: PlanId) -> Result<Versioned<RepaymentPlan>>;

    /// store `plan` if the current version is still `expected_version`
    fn save(&self, plan: RepaymentPlan, expected_version: u64) -> Result<u64>;

    fn find_by_owner(&self, owner_id: OwnerId) -> Result<Vec<RepaymentPlan>>;

    fn load(&self, id: PlanId) -> Result<RepaymentPlan> {
        self.load_for_update(id).map(|v| v.value)
    }
}

pub trait OwnerRepository: Send + Sync {
    fn insert_owner(&self, owner: AccountOwner) -> Result<()>;

    fn load_owner(&self, id: OwnerId) -> Result<AccountOwner>;

    /// apply `update` atomically and return the stored result
    fn update_owner(&self, id: OwnerId, update: &mut dyn FnMut(&mut AccountOwner)) -> Result<AccountOwner>;
}

pub trait TemplateRepository: Send + Sync {
    fn insert_template(&self, template: PlanTemplate) -> Result<()>;

    fn load_template(&self, id: TemplateId) -> Result<PlanTemplate>;

    fn update_template(&self, id: TemplateId, update: &mut dyn FnMut(&mut PlanTemplate)) -> Result<PlanTemplate>;
}

/// in-memory implementation of every repository
#[derive(Debug, Default)]
pub struct InMemoryStore {
    plans: RwLock<HashMap<PlanId, Versioned<RepaymentPlan>>>,
    owners: RwLock<HashMap<OwnerId, AccountOwner>>,
    templates: RwLock<HashMap<TemplateId, PlanTemplate>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan_count(&self) -> usize {
        self.plans.read().len()
    }
}

impl AccountRepository for InMemoryStore {
    fn insert(&self, plan: RepaymentPlan) -> Result<u64> {
        let mut plans = self.plans.write();
        if plans.contains_key(&plan.id) {
            return Err(EngineError::DuplicateRecord { id: plan.id });
        }
        plans.insert(plan.id, Versioned { value: plan, version: 1 });
        Ok(1)
    }

    fn load_for_update(&self, id: PlanId) -> Result<Versioned<RepaymentPlan>> {
        self.plans
            .read()
            .get(&id)
            .cloned()
            .ok_or(EngineError::PlanNotFound { id })
    }

    fn save(&self, plan: RepaymentPlan, expected_version: u64) -> Result<u64> {
        let mut plans = self.plans.write();
        let stored = plans
            .get_mut(&plan.id)
            .ok_or(EngineError::PlanNotFound { id: plan.id })?;

        if stored.version != expected_version {
            return Err(EngineError::ConcurrentModification {
                expected: expected_version,
                found: stored.version,
            });
        }

        stored.value = plan;
        stored.version += 1;
        Ok(stored.version)
    }

    fn find_by_owner(&self, owner_id: OwnerId) -> Result<Vec<RepaymentPlan>> {
        let mut plans: Vec<RepaymentPlan> = self
            .plans
            .read()
            .values()
            .filter(|v| v.value.owner_id == owner_id)
            .map(|v| v.value.clone())
            .collect();
        plans.sort_by_key(|p| p.created_at);
        Ok(plans)
    }
}

impl OwnerRepository for InMemoryStore {
    fn insert_owner(&self, owner: AccountOwner) -> Result<()> {
        let mut owners = self.owners.write();
        if owners.contains_key(&owner.id) {
            return Err(EngineError::DuplicateRecord { id: owner.id });
        }
        owners.insert(owner.id, owner);
        Ok(())
    }

    fn load_owner(&self, id: OwnerId) -> Result<AccountOwner> {
        self.owners
            .read()
            .get(&id)
            .cloned()
            .ok_or(EngineError::OwnerNotFound { id })
    }

    fn update_owner(&self, id: OwnerId, update: &mut dyn FnMut(&mut AccountOwner)) -> Result<AccountOwner> {
        let mut owners = self.owners.write();
        let owner = owners.get_mut(&id).ok_or(EngineError::OwnerNotFound { id })?;
        update(owner);
        Ok(owner.clone())
    }
}

impl TemplateRepository for InMemoryStore {
    fn insert_template(&self, template: PlanTemplate) -> Result<()> {
        template.validate()?;
        let mut templates = self.templates.write();
        if templates.contains_key(&template.id) {
            return Err(EngineError::DuplicateRecord { id: template.id });
        }
        templates.insert(template.id, template);
        Ok(())
    }

    fn load_template(&self, id: TemplateId) -> Result<PlanTemplate> {
        self.templates
            .read()
            .get(&id)
            .cloned()
            .ok_or(EngineError::TemplateNotFound { id })
    }

    fn update_template(&self, id: TemplateId, update: &mut dyn FnMut(&mut PlanTemplate)) -> Result<PlanTemplate> {
        let mut templates = self.templates.write();
        let template = templates.get_mut(&id).ok_or(EngineError::TemplateNotFound { id })?;
        let mut candidate = template.clone();
        update(&mut candidate);
        candidate.validate()?;
        *template = candidate;
        Ok(template.clone())
    }
}
