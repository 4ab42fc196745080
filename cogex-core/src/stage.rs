use cogex_cache::ContentRef;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gate::{Gate, HookKind};
use crate::stimulus::VariableKey;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(String);

impl StageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StageId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    StaticContent,
    TimedContent,
    TrialUnit,
    Wait,
}

/// What input may complete a stage
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputConstraint {
    #[default]
    None,
    Choices(Vec<String>),
}

impl InputConstraint {
    pub fn allows(&self, value: &str) -> bool {
        match self {
            InputConstraint::None => false,
            InputConstraint::Choices(choices) => choices.iter().any(|c| c == value),
        }
    }
}

/// Position of a stage inside the five-stage trial template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialRole {
    FirstMarker,
    FirstStimulus,
    SecondMarker,
    SecondStimulus,
    Response,
}

impl TrialRole {
    pub const TEMPLATE: [TrialRole; 5] = [
        TrialRole::FirstMarker,
        TrialRole::FirstStimulus,
        TrialRole::SecondMarker,
        TrialRole::SecondStimulus,
        TrialRole::Response,
    ];

    /// Timeline variable the stage content is bound to, if any
    pub fn binding(&self) -> Option<VariableKey> {
        match self {
            TrialRole::FirstStimulus => Some(VariableKey::W1),
            TrialRole::SecondStimulus => Some(VariableKey::W2),
            _ => None,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            TrialRole::FirstMarker => "marker-1",
            TrialRole::FirstStimulus => "w1",
            TrialRole::SecondMarker => "marker-2",
            TrialRole::SecondStimulus => "w2",
            TrialRole::Response => "response",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialSlot {
    pub pair_index: usize,
    pub role: TrialRole,
}

/// One atomic unit of presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub kind: StageKind,
    pub content: ContentRef,
    pub prompt: Option<String>,
    pub duration_ms: Option<u64>,
    pub post_gap_ms: Option<u64>,
    pub input: InputConstraint,
    pub gate: Option<Gate>,
    pub on_success: Option<HookKind>,
    pub trial: Option<TrialSlot>,
}

impl Stage {
    fn bare(id: StageId, kind: StageKind, content: ContentRef) -> Self {
        Self {
            id,
            kind,
            content,
            prompt: None,
            duration_ms: None,
            post_gap_ms: None,
            input: InputConstraint::None,
            gate: None,
            on_success: None,
            trial: None,
        }
    }

    /// Instruction page; advanced by the participant when `continue_label` is set
    pub fn static_content(
        id: impl Into<StageId>,
        content: impl Into<ContentRef>,
        continue_label: Option<&str>,
    ) -> Self {
        let mut stage = Self::bare(id.into(), StageKind::StaticContent, content.into());
        if let Some(label) = continue_label {
            stage.input = InputConstraint::Choices(vec![label.to_string()]);
        }
        stage
    }

    pub fn timed(id: impl Into<StageId>, content: impl Into<ContentRef>, duration_ms: u64) -> Self {
        let mut stage = Self::bare(id.into(), StageKind::TimedContent, content.into());
        stage.duration_ms = Some(duration_ms);
        stage
    }

    pub fn wait(id: impl Into<StageId>, blank: impl Into<ContentRef>, duration_ms: u64) -> Self {
        let mut stage = Self::bare(id.into(), StageKind::Wait, blank.into());
        stage.duration_ms = Some(duration_ms);
        stage
    }

    pub fn trial_unit(
        id: impl Into<StageId>,
        content: impl Into<ContentRef>,
        slot: TrialSlot,
    ) -> Self {
        let mut stage = Self::bare(id.into(), StageKind::TrialUnit, content.into());
        stage.trial = Some(slot);
        stage
    }

    pub fn with_gate(mut self, gate: Gate, on_success: Option<HookKind>) -> Self {
        self.gate = Some(gate);
        self.on_success = on_success;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_duration(mut self, duration_ms: Option<u64>) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_post_gap(mut self, gap_ms: u64) -> Self {
        self.post_gap_ms = (gap_ms > 0).then_some(gap_ms);
        self
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input = InputConstraint::Choices(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_response(&self) -> bool {
        matches!(
            self.trial,
            Some(TrialSlot {
                role: TrialRole::Response,
                ..
            })
        )
    }

    /// Display time plus post-stage gap, zero for untimed stages
    pub fn scheduled_ms(&self) -> u64 {
        self.duration_ms.unwrap_or(0) + self.post_gap_ms.unwrap_or(0)
    }
}
