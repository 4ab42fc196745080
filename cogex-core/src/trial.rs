use serde::{Deserialize, Serialize};

use crate::gate::{AGE_FIELD, FormSnapshot, GENDER_FIELD};

/// Side picked in the forced-choice response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ChosenSide {
    First,
    Second,
}

impl ChosenSide {
    pub const LABELS: [&'static str; 2] = ["1", "2"];

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "1" => Some(ChosenSide::First),
            "2" => Some(ChosenSide::Second),
            _ => None,
        }
    }
}

impl From<ChosenSide> for u8 {
    fn from(side: ChosenSide) -> u8 {
        match side {
            ChosenSide::First => 1,
            ChosenSide::Second => 2,
        }
    }
}

impl TryFrom<u8> for ChosenSide {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ChosenSide::First),
            2 => Ok(ChosenSide::Second),
            other => Err(format!("chosen side must be 1 or 2, got {other}")),
        }
    }
}

/// Recorded result per trial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub pair_index: usize,
    pub chosen_side: ChosenSide,
    pub reaction_time_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantProperties {
    pub age: String,
    pub gender: String,
}

impl ParticipantProperties {
    pub fn new(age: impl Into<String>, gender: impl Into<String>) -> Self {
        Self {
            age: age.into(),
            gender: gender.into(),
        }
    }

    /// Reads the `age` and `gender` fields; `Err` names the first missing one
    pub fn from_form(form: &FormSnapshot) -> Result<Self, &'static str> {
        let age = form.filled(AGE_FIELD).ok_or(AGE_FIELD)?;
        let gender = form.filled(GENDER_FIELD).ok_or(GENDER_FIELD)?;
        Ok(Self::new(age, gender))
    }
}
