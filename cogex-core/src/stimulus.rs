use cogex_cache::ContentRef;
use serde::{Deserialize, Serialize};

/// The two candidate stimuli compared in one trial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(ContentRef, ContentRef)", into = "(ContentRef, ContentRef)")]
pub struct StimulusPair {
    pub first: ContentRef,
    pub second: ContentRef,
}

impl StimulusPair {
    pub fn new(first: impl Into<ContentRef>, second: impl Into<ContentRef>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }
}

impl From<(ContentRef, ContentRef)> for StimulusPair {
    fn from((first, second): (ContentRef, ContentRef)) -> Self {
        Self { first, second }
    }
}

impl From<StimulusPair> for (ContentRef, ContentRef) {
    fn from(pair: StimulusPair) -> Self {
        (pair.first, pair.second)
    }
}

/// Keys of the variables bound into a trial template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKey {
    W1,
    W2,
}

impl VariableKey {
    pub fn name(&self) -> &'static str {
        match self {
            VariableKey::W1 => "w1",
            VariableKey::W2 => "w2",
        }
    }
}

/// Variables bound to one instance of the trial template, one per dataset row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineVariables {
    pub w1: ContentRef,
    pub w2: ContentRef,
}

impl TimelineVariables {
    pub fn get(&self, key: VariableKey) -> &ContentRef {
        match key {
            VariableKey::W1 => &self.w1,
            VariableKey::W2 => &self.w2,
        }
    }
}

impl From<&StimulusPair> for TimelineVariables {
    fn from(pair: &StimulusPair) -> Self {
        Self {
            w1: pair.first.clone(),
            w2: pair.second.clone(),
        }
    }
}
