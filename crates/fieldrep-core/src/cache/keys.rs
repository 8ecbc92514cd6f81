//! Typed cache keys.

use std::fmt;
use std::marker::PhantomData;

use fieldrep_store::models::{Chemist, Doctor, WorkingArea};

/// A logical cache slot holding a value of type `T`.
///
/// The type parameter only exists at compile time; it stops a doctor list
/// from being read back as a working area.
pub struct CacheKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> CacheKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for CacheKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CacheKey<T> {}

impl<T> fmt::Debug for CacheKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CacheKey").field(&self.name).finish()
    }
}

/// Working areas offered in the first wizard step.
pub const WORKING_AREAS: CacheKey<Vec<WorkingArea>> = CacheKey::new("daily-plan:working-areas");

/// The area picked in the first wizard step.
pub const SELECTED_WORKING_AREA: CacheKey<WorkingArea> =
    CacheKey::new("daily-plan:selected-working-area");

/// Doctors of the selected area.
pub const DOCTORS: CacheKey<Vec<Doctor>> = CacheKey::new("daily-plan:doctors");

/// Chemists of the selected area.
pub const CHEMISTS: CacheKey<Vec<Chemist>> = CacheKey::new("daily-plan:chemists");

/// Every key owned by the plan wizard; cleared together on exit.
pub const DAILY_PLAN_KEYS: [&str; 4] = [
    WORKING_AREAS.name(),
    SELECTED_WORKING_AREA.name(),
    DOCTORS.name(),
    CHEMISTS.name(),
];
