use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const AGE_FIELD: &str = "age";
pub const GENDER_FIELD: &str = "gender";

/// Field values captured by the runtime when the participant tries to advance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormSnapshot(BTreeMap<String, String>);

impl FormSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Trimmed value, `None` when missing or blank
    pub fn filled(&self, field: &str) -> Option<&str> {
        self.get(field).map(str::trim).filter(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Pass/fail predicate attached to a stage that needs input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    /// Every listed field is present and non-blank
    RequiredFields(Vec<String>),
    /// `age` (decimal digits) and `gender` are filled in
    ParticipantInfo,
}

impl Gate {
    /// Fields the runtime has to collect for this gate
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Gate::RequiredFields(fields) => fields.iter().map(String::as_str).collect(),
            Gate::ParticipantInfo => vec![AGE_FIELD, GENDER_FIELD],
        }
    }

    pub fn check(&self, form: &FormSnapshot) -> bool {
        self.failed_fields(form).is_empty()
    }

    /// Fields that are missing or invalid, in declaration order
    pub fn failed_fields(&self, form: &FormSnapshot) -> Vec<String> {
        match self {
            Gate::RequiredFields(fields) => fields
                .iter()
                .filter(|f| form.filled(f).is_none())
                .cloned()
                .collect(),
            Gate::ParticipantInfo => {
                let mut failed = Vec::new();
                let age_ok = form
                    .filled(AGE_FIELD)
                    .is_some_and(|age| age.chars().all(|c| c.is_ascii_digit()));
                if !age_ok {
                    failed.push(AGE_FIELD.to_string());
                }
                if form.filled(GENDER_FIELD).is_none() {
                    failed.push(GENDER_FIELD.to_string());
                }
                failed
            }
        }
    }
}

/// Side effect fired once when a gate first accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    CommitParticipantProperties,
}
