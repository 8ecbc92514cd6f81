//! TOML plan draft files.
//!
//! ```toml
//! [plan]
//! working_area = 7            # id, or a label prefix such as "indira"
//! date = "2025-03-01"         # or "01/03/2025"; defaults to today
//! notes = "follow up"
//! work_together = false
//! doctors = [101]
//! chemists = []
//! ```
//!
//! Parsing validates:
//! - The date is in one of the accepted layouts.
//! - At least one doctor or chemist is listed.
//! - No id is listed twice.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use fieldrep_store::models::{EntityId, PersonKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::draft::PLAN_DATE_FORMAT;

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors that can occur while reading a plan draft file.
#[derive(Debug, Error)]
pub enum DraftParseError {
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("invalid plan date {0:?} (expected YYYY-MM-DD or DD/MM/YYYY)")]
    InvalidDate(String),

    #[error("plan must list at least one doctor or chemist")]
    EmptySelection,

    #[error("{kind} {id} is listed more than once")]
    DuplicateId { kind: PersonKind, id: EntityId },

    #[error("working area must not be blank")]
    BlankWorkingArea,
}

/// How a working area is named by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AreaRef {
    Id(EntityId),
    Label(String),
}

impl AreaRef {
    /// Interpret free text: all digits is an id, anything else a label.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.parse::<EntityId>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Label(trimmed.to_string()),
        }
    }
}

impl fmt::Display for AreaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Label(label) => write!(f, "{label:?}"),
        }
    }
}

/// Top-level structure of a plan draft file.
#[derive(Debug, Clone, Deserialize)]
struct PlanFileToml {
    plan: PlanSection,
}

/// The `[plan]` table.
#[derive(Debug, Clone, Deserialize)]
struct PlanSection {
    working_area: AreaRef,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    work_together: bool,
    #[serde(default)]
    doctors: Vec<EntityId>,
    #[serde(default)]
    chemists: Vec<EntityId>,
}

/// A validated plan draft file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanFile {
    pub working_area: AreaRef,
    /// `None` means "today".
    pub date: Option<NaiveDate>,
    pub notes: String,
    pub work_together: bool,
    pub doctors: Vec<EntityId>,
    pub chemists: Vec<EntityId>,
}

impl PlanFile {
    /// Check the rules a parsed file must satisfy. Drafts assembled from
    /// command-line flags go through the same checks.
    pub fn validate(&self) -> Result<(), DraftParseError> {
        if let AreaRef::Label(label) = &self.working_area {
            if label.trim().is_empty() {
                return Err(DraftParseError::BlankWorkingArea);
            }
        }
        if self.doctors.is_empty() && self.chemists.is_empty() {
            return Err(DraftParseError::EmptySelection);
        }
        check_unique(PersonKind::Doctor, &self.doctors)?;
        check_unique(PersonKind::Chemist, &self.chemists)?;
        Ok(())
    }
}

/// Parse and validate a plan draft file.
pub fn parse_plan_file(content: &str) -> Result<PlanFile, DraftParseError> {
    let raw: PlanFileToml = toml::from_str(content)?;
    let section = raw.plan;

    let file = PlanFile {
        working_area: section.working_area,
        date: section.date.as_deref().map(parse_plan_date).transpose()?,
        notes: section.notes,
        work_together: section.work_together,
        doctors: section.doctors,
        chemists: section.chemists,
    };
    file.validate()?;
    Ok(file)
}

/// Accepts `YYYY-MM-DD` and the backend's `DD/MM/YYYY`.
pub fn parse_plan_date(value: &str) -> Result<NaiveDate, DraftParseError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, PLAN_DATE_FORMAT))
        .map_err(|_| DraftParseError::InvalidDate(value.to_string()))
}

fn check_unique(kind: PersonKind, ids: &[EntityId]) -> Result<(), DraftParseError> {
    let mut seen = HashSet::new();
    for &id in ids {
        if !seen.insert(id) {
            return Err(DraftParseError::DuplicateId { kind, id });
        }
    }
    Ok(())
}
