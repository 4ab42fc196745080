use serde::{Deserialize, Serialize};

use crate::gate::FormSnapshot;
use crate::stage::StageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    Timeout,
    Input,
}

/// Signal from the presentation runtime that the current stage ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCompletion {
    pub stage_id: StageId,
    pub kind: CompletionKind,
    pub selected_value: Option<String>,
    pub elapsed_ms: u64,
    pub form: Option<FormSnapshot>,
}

impl StageCompletion {
    pub fn timeout(stage_id: impl Into<StageId>, elapsed_ms: u64) -> Self {
        Self {
            stage_id: stage_id.into(),
            kind: CompletionKind::Timeout,
            selected_value: None,
            elapsed_ms,
            form: None,
        }
    }

    pub fn input(stage_id: impl Into<StageId>, value: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            stage_id: stage_id.into(),
            kind: CompletionKind::Input,
            selected_value: Some(value.into()),
            elapsed_ms,
            form: None,
        }
    }

    pub fn with_form(mut self, form: FormSnapshot) -> Self {
        self.form = Some(form);
        self
    }
}
