//! Wizard steps and the transition table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where the plan wizard currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Step 0: pick exactly one working area.
    Location,
    /// Step 1: pick doctors and chemists from that area.
    Selection,
    /// Step 2: date, notes and the work-together flag, then submit.
    Details,
}

impl WizardStep {
    /// Zero-based position of the step.
    pub fn index(self) -> u8 {
        match self {
            Self::Location => 0,
            Self::Selection => 1,
            Self::Details => 2,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Location),
            1 => Some(Self::Selection),
            2 => Some(Self::Details),
            _ => None,
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Location => "location",
            Self::Selection => "selection",
            Self::Details => "details",
        };
        f.write_str(s)
    }
}

impl FromStr for WizardStep {
    type Err = WizardStepParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "location" => Ok(Self::Location),
            "selection" => Ok(Self::Selection),
            "details" => Ok(Self::Details),
            other => Err(WizardStepParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`WizardStep`] string.
#[derive(Debug, Clone)]
pub struct WizardStepParseError(pub String);

impl fmt::Display for WizardStepParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid wizard step: {:?}", self.0)
    }
}

impl std::error::Error for WizardStepParseError {}

/// A user action that may move the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Next,
    Back,
    Cancel,
    Submit,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Next => "next",
            Self::Back => "back",
            Self::Cancel => "cancel",
            Self::Submit => "submit",
        };
        f.write_str(s)
    }
}

/// Where a trigger leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Step(WizardStep),
    /// Leave the wizard for the home context.
    Exit,
}

/// The wizard's transition graph:
///
/// ```text
/// location  --next-->   selection
/// location  --cancel--> exit
/// selection --next-->   details
/// selection --back-->   location
/// details   --back-->   selection
/// details   --submit--> exit      (on success only)
/// ```
///
/// Guards are not part of the table; they are checked by the wizard before
/// the edge is taken. Unmounting is not a trigger and is valid anywhere.
pub fn transition(from: WizardStep, trigger: Trigger) -> Option<Target> {
    use Trigger::*;
    use WizardStep::*;

    match (from, trigger) {
        (Location, Next) => Some(Target::Step(Selection)),
        (Location, Cancel) => Some(Target::Exit),
        (Selection, Next) => Some(Target::Step(Details)),
        (Selection, Back) => Some(Target::Step(Location)),
        (Details, Back) => Some(Target::Step(Selection)),
        (Details, Submit) => Some(Target::Exit),
        _ => None,
    }
}
