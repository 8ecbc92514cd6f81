//! Three-step daily plan wizard.
//!
//! The wizard walks `location -> selection -> details` (see
//! [`step::transition`] for the full graph) and owns a [`PlanDraft`] for
//! its whole life. Reference data for the first two steps goes through the
//! [`ReferenceDataCache`]; every exit (cancel, successful submit, dismiss
//! or drop) clears the wizard's cache keys so the next wizard starts from
//! the network.

pub mod draft;
pub mod draft_file;
pub mod step;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use fieldrep_store::models::{EntityId, PersonKind, WorkingArea};
use thiserror::Error;

use crate::api::PeopleLists;
use crate::cache::ReferenceDataCache;
use crate::cache::keys::{CHEMISTS, DAILY_PLAN_KEYS, DOCTORS, SELECTED_WORKING_AREA, WORKING_AREAS};
use crate::pipeline::RequestError;

pub use draft::{CreatedPlan, PlanDraft, PlanSubmission, ValidationError};
pub use draft_file::{AreaRef, DraftParseError, PlanFile, parse_plan_date, parse_plan_file};
pub use step::{Target, Trigger, WizardStep};

/// Backend calls the wizard needs.
#[async_trait]
pub trait PlanBackend: Send + Sync {
    async fn working_areas(&self) -> Result<Vec<WorkingArea>, RequestError>;

    /// Doctors and chemists related to one working area.
    async fn area_people(&self, working_area_id: EntityId) -> Result<PeopleLists, RequestError>;

    async fn create_daily_plan(&self, plan: &PlanSubmission) -> Result<CreatedPlan, RequestError>;
}

// Compile-time assertion: PlanBackend must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn PlanBackend) {}
};

/// Errors returned by [`PlanWizard`] actions.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("cannot {trigger} from the {from} step")]
    InvalidTransition { from: WizardStep, trigger: Trigger },

    #[error("action only available on the {expected} step (currently {actual})")]
    WrongStep {
        expected: WizardStep,
        actual: WizardStep,
    },

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("the wizard has already exited")]
    Exited,
}

/// How the wizard was left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardExit {
    Cancelled,
    Submitted(CreatedPlan),
    /// Navigated away without cancelling or submitting.
    Dismissed,
}

pub struct PlanWizard {
    backend: Arc<dyn PlanBackend>,
    cache: ReferenceDataCache,
    step: WizardStep,
    draft: PlanDraft,
    working_areas: Vec<WorkingArea>,
    selected_area: Option<WorkingArea>,
    people: PeopleLists,
    /// Area whose people this wizard last loaded. The cached people lists
    /// carry no area, so this decides whether they may be reused.
    people_area: Option<EntityId>,
    exit: Option<WizardExit>,
}

impl PlanWizard {
    /// A fresh wizard on the location step with a draft dated today.
    pub fn new(backend: Arc<dyn PlanBackend>, cache: ReferenceDataCache) -> Self {
        Self {
            backend,
            cache,
            step: WizardStep::Location,
            draft: PlanDraft::for_today(),
            working_areas: Vec::new(),
            selected_area: None,
            people: PeopleLists::default(),
            people_area: None,
            exit: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &PlanDraft {
        &self.draft
    }

    pub fn working_areas(&self) -> &[WorkingArea] {
        &self.working_areas
    }

    pub fn selected_working_area(&self) -> Option<&WorkingArea> {
        self.selected_area.as_ref()
    }

    /// Doctors and chemists of the selected area, once the selection step
    /// has been entered.
    pub fn people(&self) -> &PeopleLists {
        &self.people
    }

    /// `Some` once the wizard has been left.
    pub fn exit(&self) -> Option<&WizardExit> {
        self.exit.as_ref()
    }

    // -- location step ------------------------------------------------------

    /// Load the working areas, from cache when fresh.
    ///
    /// A cached selected area from an earlier visit is restored if it is
    /// still in the list.
    pub async fn load_working_areas(&mut self) -> Result<&[WorkingArea], WizardError> {
        self.require_step(WizardStep::Location)?;

        let areas = match self.cache.get(&WORKING_AREAS).await {
            Some(areas) => areas,
            None => {
                let areas = self.backend.working_areas().await?;
                self.cache.set(&WORKING_AREAS, &areas).await;
                areas
            }
        };
        tracing::debug!(count = areas.len(), "working areas loaded");
        self.working_areas = areas;

        if self.selected_area.is_none() {
            if let Some(cached) = self.cache.get(&SELECTED_WORKING_AREA).await {
                if self.working_areas.iter().any(|a| a.id == cached.id) {
                    self.draft.working_area_id = Some(cached.id);
                    self.selected_area = Some(cached);
                }
            }
        }

        Ok(self.working_areas.as_slice())
    }

    /// Choose the single working area for this plan.
    ///
    /// Changing the area drops any doctor or chemist selection.
    pub fn select_working_area(&mut self, id: EntityId) -> Result<&WorkingArea, WizardError> {
        self.require_step(WizardStep::Location)?;

        let area = self
            .working_areas
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(ValidationError::UnknownWorkingArea(id))?;

        if self.draft.working_area_id != Some(id) {
            self.draft.clear_selection();
            self.people = PeopleLists::default();
        }
        self.draft.working_area_id = Some(id);
        Ok(self.selected_area.insert(area))
    }

    // -- transitions ----------------------------------------------------------

    /// Advance one step.
    ///
    /// From location this persists the selected area and enters the
    /// selection step, which loads its people. If that load fails the
    /// wizard is already on the selection step and the error is returned;
    /// [`Self::enter_selection`] retries it.
    pub async fn next(&mut self) -> Result<WizardStep, WizardError> {
        let to = self.edge(Trigger::Next)?;

        match self.step {
            WizardStep::Location => {
                let area = self
                    .selected_area
                    .clone()
                    .ok_or(ValidationError::NoWorkingArea)?;

                // People are cached per wizard, not per area. Reuse them only
                // for the area they were loaded for; the cached selection
                // can expire before the lists written after it.
                let reusable = match self.people_area {
                    Some(loaded) => loaded == area.id,
                    None => self
                        .cache
                        .get(&SELECTED_WORKING_AREA)
                        .await
                        .is_some_and(|p| p.id == area.id),
                };
                if !reusable {
                    self.cache
                        .invalidate_all(&[DOCTORS.name(), CHEMISTS.name()])
                        .await;
                }
                self.cache.set(&SELECTED_WORKING_AREA, &area).await;

                self.move_to(to);
                self.enter_selection().await?;
            }
            WizardStep::Selection => {
                if !self.draft.has_selection() {
                    return Err(ValidationError::EmptySelection.into());
                }
                self.move_to(to);
            }
            WizardStep::Details => {}
        }

        Ok(self.step)
    }

    /// Go back one step. Arriving at selection re-checks the cache.
    pub async fn back(&mut self) -> Result<WizardStep, WizardError> {
        let to = self.edge(Trigger::Back)?;
        self.move_to(to);
        if self.step == WizardStep::Selection {
            self.enter_selection().await?;
        }
        Ok(self.step)
    }

    /// Leave from the location step, clearing the wizard's cache keys.
    pub async fn cancel(&mut self) -> Result<WizardExit, WizardError> {
        self.edge(Trigger::Cancel)?;
        self.clear_cache().await;
        tracing::info!(from = %self.step, "plan wizard cancelled");
        Ok(self.finish(WizardExit::Cancelled))
    }

    /// Leave from wherever the wizard is, as when its screen goes away.
    /// Does nothing if the wizard already exited.
    pub async fn dismiss(&mut self) {
        if self.exit.is_some() {
            return;
        }
        self.clear_cache().await;
        tracing::info!(from = %self.step, "plan wizard dismissed");
        self.finish(WizardExit::Dismissed);
    }

    // -- selection step -------------------------------------------------------

    /// Load doctors and chemists for the selected area: cached lists when
    /// both are present and fresh, otherwise one backend call whose result
    /// refills both keys.
    ///
    /// Selected ids that are no longer in the lists are dropped.
    pub async fn enter_selection(&mut self) -> Result<&PeopleLists, WizardError> {
        self.require_step(WizardStep::Selection)?;
        let area_id = self
            .draft
            .working_area_id
            .ok_or(ValidationError::NoWorkingArea)?;

        let cached = match (self.cache.get(&DOCTORS).await, self.cache.get(&CHEMISTS).await) {
            (Some(doctors), Some(chemists)) => Some(PeopleLists { doctors, chemists }),
            _ => None,
        };

        let people = match cached {
            Some(people) => {
                tracing::debug!(working_area_id = area_id, "using cached doctors and chemists");
                people
            }
            None => {
                let people = self.backend.area_people(area_id).await?;
                self.cache.set(&DOCTORS, &people.doctors).await;
                self.cache.set(&CHEMISTS, &people.chemists).await;
                people
            }
        };

        self.draft
            .doctor_ids
            .retain(|id| people.find_doctor(*id).is_some());
        self.draft
            .chemist_ids
            .retain(|id| people.find_chemist(*id).is_some());
        self.people = people;
        self.people_area = Some(area_id);
        Ok(&self.people)
    }

    /// Flip one doctor's selection. Returns whether they are now selected.
    pub fn toggle_doctor(&mut self, id: EntityId) -> Result<bool, WizardError> {
        self.toggle(PersonKind::Doctor, id)
    }

    /// Flip one chemist's selection. Returns whether they are now selected.
    pub fn toggle_chemist(&mut self, id: EntityId) -> Result<bool, WizardError> {
        self.toggle(PersonKind::Chemist, id)
    }

    fn toggle(&mut self, kind: PersonKind, id: EntityId) -> Result<bool, WizardError> {
        self.require_step(WizardStep::Selection)?;
        let known = match kind {
            PersonKind::Doctor => self.people.find_doctor(id).is_some(),
            PersonKind::Chemist => self.people.find_chemist(id).is_some(),
        };
        if !known {
            return Err(ValidationError::UnknownPerson { kind, id }.into());
        }
        Ok(self.draft.toggle(kind, id))
    }

    // -- details step ---------------------------------------------------------

    pub fn set_plan_date(&mut self, date: NaiveDate) -> Result<(), WizardError> {
        self.ensure_active()?;
        self.draft.plan_date = date;
        Ok(())
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) -> Result<(), WizardError> {
        self.ensure_active()?;
        self.draft.notes = notes.into();
        Ok(())
    }

    pub fn set_work_together(&mut self, work_together: bool) -> Result<(), WizardError> {
        self.ensure_active()?;
        self.draft.work_together = work_together;
        Ok(())
    }

    /// Submit the plan.
    ///
    /// On success the wizard's cache keys are cleared before this returns
    /// and the wizard exits. On failure the wizard stays on the details
    /// step with the draft intact.
    pub async fn submit(&mut self) -> Result<CreatedPlan, WizardError> {
        self.edge(Trigger::Submit)?;
        let submission = self.draft.to_submission()?;

        let created = self.backend.create_daily_plan(&submission).await?;

        self.clear_cache().await;
        tracing::info!(
            plan_id = created.id,
            working_area_id = submission.working_area_id,
            doctors = submission.doctor_company_ids.len(),
            chemists = submission.chemist_company_ids.len(),
            "daily plan created"
        );
        self.finish(WizardExit::Submitted(created.clone()));
        Ok(created)
    }

    // -- internals ------------------------------------------------------------

    fn ensure_active(&self) -> Result<(), WizardError> {
        if self.exit.is_some() {
            return Err(WizardError::Exited);
        }
        Ok(())
    }

    fn require_step(&self, expected: WizardStep) -> Result<(), WizardError> {
        self.ensure_active()?;
        if self.step != expected {
            return Err(WizardError::WrongStep {
                expected,
                actual: self.step,
            });
        }
        Ok(())
    }

    /// Look up the edge for `trigger` from the current step.
    fn edge(&self, trigger: Trigger) -> Result<Target, WizardError> {
        self.ensure_active()?;
        step::transition(self.step, trigger).ok_or(WizardError::InvalidTransition {
            from: self.step,
            trigger,
        })
    }

    fn move_to(&mut self, target: Target) {
        if let Target::Step(to) = target {
            tracing::info!(from = %self.step, to = %to, "plan wizard step changed");
            self.step = to;
        }
    }

    fn finish(&mut self, exit: WizardExit) -> WizardExit {
        self.exit = Some(exit.clone());
        exit
    }

    async fn clear_cache(&self) {
        self.cache.invalidate_all(&DAILY_PLAN_KEYS).await;
    }
}

impl Drop for PlanWizard {
    fn drop(&mut self) {
        if self.exit.is_some() {
            return;
        }
        // Best effort: without a runtime the entries simply age out.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let cache = self.cache.clone();
            handle.spawn(async move {
                cache.invalidate_all(&DAILY_PLAN_KEYS).await;
            });
        }
    }
}

impl std::fmt::Debug for PlanWizard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanWizard")
            .field("step", &self.step)
            .field("draft", &self.draft)
            .field("exit", &self.exit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use fieldrep_store::models::{Chemist, Doctor, PersonProfile};
    use fieldrep_store::{KeyValueStore, MemoryStore};

    use super::*;
    use crate::cache::ManualClock;

    #[derive(Default)]
    struct FakeBackend {
        area_calls: AtomicUsize,
        people_calls: AtomicUsize,
        submitted: Mutex<Vec<PlanSubmission>>,
        fail_submit: bool,
    }

    fn area(id: EntityId, label: &str) -> WorkingArea {
        WorkingArea {
            id,
            state: "KA".to_string(),
            city: "Bengaluru".to_string(),
            district: "East".to_string(),
            label: label.to_string(),
        }
    }

    fn profile(id: EntityId, name: &str) -> PersonProfile {
        PersonProfile {
            id,
            name: name.to_string(),
            title: None,
            phone: None,
            profile_image_url: None,
        }
    }

    #[async_trait]
    impl PlanBackend for FakeBackend {
        async fn working_areas(&self) -> Result<Vec<WorkingArea>, RequestError> {
            self.area_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![area(7, "Indiranagar"), area(8, "Koramangala")])
        }

        async fn area_people(&self, working_area_id: EntityId) -> Result<PeopleLists, RequestError> {
            self.people_calls.fetch_add(1, Ordering::SeqCst);
            Ok(PeopleLists {
                doctors: vec![Doctor {
                    profile: profile(working_area_id * 100 + 1, "Asha Rao"),
                    specialty: None,
                }],
                chemists: vec![Chemist {
                    profile: profile(working_area_id * 100 + 50, "Mehta"),
                    shop_name: None,
                }],
            })
        }

        async fn create_daily_plan(&self, plan: &PlanSubmission) -> Result<CreatedPlan, RequestError> {
            if self.fail_submit {
                return Err(RequestError::Backend {
                    message: "plan date is in the past".to_string(),
                });
            }
            self.submitted.lock().unwrap().push(plan.clone());
            Ok(CreatedPlan {
                id: 1,
                plan_date: Some(plan.plan_date.clone()),
            })
        }
    }

    fn setup(backend: FakeBackend) -> (Arc<FakeBackend>, Arc<MemoryStore>, PlanWizard) {
        let backend = Arc::new(backend);
        let store = Arc::new(MemoryStore::new());
        let cache = ReferenceDataCache::new(store.clone(), "t", Duration::from_secs(300));
        let wizard = PlanWizard::new(backend.clone(), cache);
        (backend, store, wizard)
    }

    async fn at_selection(wizard: &mut PlanWizard) {
        wizard.load_working_areas().await.unwrap();
        wizard.select_working_area(7).unwrap();
        assert_eq!(wizard.next().await.unwrap(), WizardStep::Selection);
    }

    #[tokio::test]
    async fn next_without_area_is_a_validation_error() {
        let (_backend, _store, mut wizard) = setup(FakeBackend::default());
        wizard.load_working_areas().await.unwrap();

        let err = wizard.next().await.unwrap_err();
        assert!(matches!(err, WizardError::Validation(ValidationError::NoWorkingArea)));
        assert_eq!(wizard.step(), WizardStep::Location);
    }

    #[tokio::test]
    async fn unknown_area_is_rejected() {
        let (_backend, _store, mut wizard) = setup(FakeBackend::default());
        wizard.load_working_areas().await.unwrap();

        let err = wizard.select_working_area(99).unwrap_err();
        assert!(matches!(
            err,
            WizardError::Validation(ValidationError::UnknownWorkingArea(99))
        ));
    }

    #[tokio::test]
    async fn working_areas_come_from_cache_on_second_load() {
        let (backend, _store, mut wizard) = setup(FakeBackend::default());
        wizard.load_working_areas().await.unwrap();
        wizard.load_working_areas().await.unwrap();
        assert_eq!(backend.area_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_selection_blocks_next() {
        let (backend, _store, mut wizard) = setup(FakeBackend::default());
        at_selection(&mut wizard).await;
        let calls_before = backend.people_calls.load(Ordering::SeqCst);

        let err = wizard.next().await.unwrap_err();
        assert!(matches!(err, WizardError::Validation(ValidationError::EmptySelection)));
        assert_eq!(wizard.step(), WizardStep::Selection);
        assert_eq!(backend.people_calls.load(Ordering::SeqCst), calls_before);
    }

    #[tokio::test]
    async fn back_to_selection_uses_cached_people() {
        let (backend, _store, mut wizard) = setup(FakeBackend::default());
        at_selection(&mut wizard).await;
        wizard.toggle_doctor(701).unwrap();
        wizard.next().await.unwrap();

        assert_eq!(wizard.back().await.unwrap(), WizardStep::Selection);
        assert_eq!(backend.people_calls.load(Ordering::SeqCst), 1);
        assert!(wizard.draft().doctor_ids.contains(&701));
    }

    #[tokio::test]
    async fn changing_area_refetches_people_and_drops_selection() {
        let (backend, _store, mut wizard) = setup(FakeBackend::default());
        at_selection(&mut wizard).await;
        wizard.toggle_doctor(701).unwrap();

        wizard.back().await.unwrap();
        wizard.select_working_area(8).unwrap();
        assert!(!wizard.draft().has_selection());
        wizard.next().await.unwrap();

        assert_eq!(backend.people_calls.load(Ordering::SeqCst), 2);
        assert!(wizard.people().find_doctor(801).is_some());
    }

    /// Takes two seconds of clock time to load people.
    struct SlowPeopleBackend {
        clock: Arc<ManualClock>,
        inner: FakeBackend,
    }

    #[async_trait]
    impl PlanBackend for SlowPeopleBackend {
        async fn working_areas(&self) -> Result<Vec<WorkingArea>, RequestError> {
            self.inner.working_areas().await
        }

        async fn area_people(&self, working_area_id: EntityId) -> Result<PeopleLists, RequestError> {
            self.clock.advance(Duration::from_secs(2));
            self.inner.area_people(working_area_id).await
        }

        async fn create_daily_plan(&self, plan: &PlanSubmission) -> Result<CreatedPlan, RequestError> {
            self.inner.create_daily_plan(plan).await
        }
    }

    #[tokio::test]
    async fn people_of_previous_area_are_not_reused_after_selection_expires() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
        ));
        let backend = Arc::new(SlowPeopleBackend {
            clock: clock.clone(),
            inner: FakeBackend::default(),
        });
        let cache = ReferenceDataCache::new(Arc::new(MemoryStore::new()), "t", Duration::from_secs(300))
            .with_clock(clock.clone());
        let mut wizard = PlanWizard::new(backend.clone(), cache);

        at_selection(&mut wizard).await;
        wizard.back().await.unwrap();

        // The stored selection is now older than the ttl, the people lists
        // written two seconds after it are not.
        clock.advance(Duration::from_secs(299));
        wizard.select_working_area(8).unwrap();
        wizard.next().await.unwrap();

        assert_eq!(backend.inner.people_calls.load(Ordering::SeqCst), 2);
        assert!(wizard.people().find_doctor(801).is_some());
        assert!(wizard.people().find_doctor(701).is_none());
        assert!(wizard.people().find_chemist(850).is_some());
    }

    #[tokio::test]
    async fn new_wizard_reuses_people_cached_for_the_same_area() {
        let (backend, store, mut wizard) = setup(FakeBackend::default());
        at_selection(&mut wizard).await;

        let cache = ReferenceDataCache::new(store.clone(), "t", Duration::from_secs(300));
        let mut again = PlanWizard::new(backend.clone(), cache);
        at_selection(&mut again).await;

        assert_eq!(backend.people_calls.load(Ordering::SeqCst), 1);
        assert!(again.people().find_doctor(701).is_some());
    }

    #[tokio::test]
    async fn toggling_unknown_person_fails() {
        let (_backend, _store, mut wizard) = setup(FakeBackend::default());
        at_selection(&mut wizard).await;

        let err = wizard.toggle_chemist(701).unwrap_err();
        assert!(matches!(
            err,
            WizardError::Validation(ValidationError::UnknownPerson {
                kind: PersonKind::Chemist,
                id: 701
            })
        ));
    }

    #[tokio::test]
    async fn back_from_location_is_invalid() {
        let (_backend, _store, mut wizard) = setup(FakeBackend::default());
        let err = wizard.back().await.unwrap_err();
        assert!(matches!(
            err,
            WizardError::InvalidTransition {
                from: WizardStep::Location,
                trigger: Trigger::Back
            }
        ));
    }

    #[tokio::test]
    async fn cancel_clears_cache_and_exits() {
        let (_backend, store, mut wizard) = setup(FakeBackend::default());
        wizard.load_working_areas().await.unwrap();
        assert!(!store.is_empty());

        assert_eq!(wizard.cancel().await.unwrap(), WizardExit::Cancelled);
        assert!(store.is_empty());
        assert!(matches!(wizard.next().await, Err(WizardError::Exited)));
    }

    #[tokio::test]
    async fn failed_submit_stays_on_details() {
        let (_backend, store, mut wizard) = setup(FakeBackend {
            fail_submit: true,
            ..FakeBackend::default()
        });
        at_selection(&mut wizard).await;
        wizard.toggle_chemist(750).unwrap();
        wizard.next().await.unwrap();

        let err = wizard.submit().await.unwrap_err();
        assert_eq!(err.to_string(), "plan date is in the past");
        assert_eq!(wizard.step(), WizardStep::Details);
        assert!(wizard.exit().is_none());
        assert!(store.get("t:daily-plan:chemists").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn successful_submit_sends_draft_and_clears_cache() {
        let (backend, store, mut wizard) = setup(FakeBackend::default());
        at_selection(&mut wizard).await;
        wizard.toggle_doctor(701).unwrap();
        wizard.next().await.unwrap();
        wizard
            .set_plan_date(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
            .unwrap();
        wizard.set_notes("bring samples").unwrap();

        let created = wizard.submit().await.unwrap();
        assert_eq!(created.id, 1);
        assert!(store.is_empty());

        let submitted = backend.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].doctor_company_ids, vec![701]);
        assert_eq!(submitted[0].plan_date, "01/03/2025");
        assert!(matches!(wizard.exit(), Some(WizardExit::Submitted(_))));
    }

    #[tokio::test]
    async fn dismiss_clears_cache_from_any_step() {
        let (_backend, store, mut wizard) = setup(FakeBackend::default());
        at_selection(&mut wizard).await;

        wizard.dismiss().await;
        assert!(store.is_empty());
        assert_eq!(wizard.exit(), Some(&WizardExit::Dismissed));
    }

    #[tokio::test]
    async fn restores_cached_selected_area() {
        let (_backend, store, mut wizard) = setup(FakeBackend::default());
        at_selection(&mut wizard).await;

        let cache = ReferenceDataCache::new(store.clone(), "t", Duration::from_secs(300));
        let mut second = PlanWizard::new(Arc::new(FakeBackend::default()), cache);
        second.load_working_areas().await.unwrap();
        assert_eq!(second.selected_working_area().map(|a| a.id), Some(7));
        drop(wizard);
    }
}
