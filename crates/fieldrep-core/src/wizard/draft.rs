//! The plan being composed and the payload it becomes.

use std::collections::BTreeSet;

use chrono::{Local, NaiveDate};
use fieldrep_store::models::{EntityId, PersonKind, deserialize_id};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Date layout the backend expects in `planDate`.
pub const PLAN_DATE_FORMAT: &str = "%d/%m/%Y";

/// A guard the wizard checks before moving on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("select a working area first")]
    NoWorkingArea,

    #[error("select at least one doctor or chemist")]
    EmptySelection,

    #[error("working area {0} is not one of yours")]
    UnknownWorkingArea(EntityId),

    #[error("{kind} {id} is not in the selected working area")]
    UnknownPerson { kind: PersonKind, id: EntityId },
}

/// Wizard-owned draft of a daily plan. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDraft {
    pub working_area_id: Option<EntityId>,
    pub doctor_ids: BTreeSet<EntityId>,
    pub chemist_ids: BTreeSet<EntityId>,
    pub plan_date: NaiveDate,
    pub notes: String,
    pub work_together: bool,
}

impl PlanDraft {
    pub fn new(plan_date: NaiveDate) -> Self {
        Self {
            working_area_id: None,
            doctor_ids: BTreeSet::new(),
            chemist_ids: BTreeSet::new(),
            plan_date,
            notes: String::new(),
            work_together: false,
        }
    }

    /// A blank draft dated today in local time.
    pub fn for_today() -> Self {
        Self::new(Local::now().date_naive())
    }

    /// Return `true` if at least one doctor or chemist is selected.
    pub fn has_selection(&self) -> bool {
        !self.doctor_ids.is_empty() || !self.chemist_ids.is_empty()
    }

    /// Flip the selection of one person. Returns whether they are now
    /// selected.
    pub fn toggle(&mut self, kind: PersonKind, id: EntityId) -> bool {
        let ids = match kind {
            PersonKind::Doctor => &mut self.doctor_ids,
            PersonKind::Chemist => &mut self.chemist_ids,
        };
        if ids.remove(&id) {
            false
        } else {
            ids.insert(id);
            true
        }
    }

    pub fn clear_selection(&mut self) {
        self.doctor_ids.clear();
        self.chemist_ids.clear();
    }

    /// Build the backend payload. Only the working area is checked here;
    /// everything else is the server's call.
    pub fn to_submission(&self) -> Result<PlanSubmission, ValidationError> {
        let working_area_id = self.working_area_id.ok_or(ValidationError::NoWorkingArea)?;
        Ok(PlanSubmission {
            working_area_id,
            doctor_company_ids: self.doctor_ids.iter().copied().collect(),
            chemist_company_ids: self.chemist_ids.iter().copied().collect(),
            notes: self.notes.clone(),
            work_together: self.work_together,
            plan_date: self.plan_date.format(PLAN_DATE_FORMAT).to_string(),
        })
    }
}

/// `CreateDailyPlanInput` as sent to the backend. Id lists are sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSubmission {
    pub working_area_id: EntityId,
    pub doctor_company_ids: Vec<EntityId>,
    pub chemist_company_ids: Vec<EntityId>,
    pub notes: String,
    pub work_together: bool,
    pub plan_date: String,
}

/// What the backend returns for a created plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPlan {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: EntityId,
    #[serde(default)]
    pub plan_date: Option<String>,
}
