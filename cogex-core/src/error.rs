//! Engine errors

use thiserror::Error;

use crate::gate::HookKind;
use crate::stage::StageId;
use cogex_cache::ContentRef;

/// Engine result type
pub type Result<T> = std::result::Result<T, Error>;

/// Rejection annotation for a gated stage; recoverable, the stage is shown again
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed on stage {stage}: {fields:?}")]
pub struct ValidationFailure {
    pub stage: StageId,
    pub fields: Vec<String>,
}

/// Engine errors. All variants abort the run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("trial block has no stimulus pairs")]
    EmptyDataset,

    #[error("duplicate stage id: {0}")]
    DuplicateStageId(StageId),

    #[error("stage {stage} fires {hook:?} but its gate does not collect the needed fields")]
    IncompatibleHook { stage: StageId, hook: HookKind },

    #[error("trials present but no stage commits participant properties")]
    MissingParticipantProperties,

    #[error("participant properties committed again on stage {0}")]
    DuplicatePropertiesHook(StageId),

    #[error("participant properties committed on stage {0}, after the first trial")]
    PropertiesAfterTrials(StageId),

    #[error("content unavailable: {0}")]
    ContentUnavailable(ContentRef),

    #[error("participant properties already set")]
    PropertiesAlreadySet,

    #[error("session incomplete: timeline has not reached its terminal stage")]
    SessionIncomplete,

    #[error("completion for stage {got} but current stage is {expected}")]
    StageMismatch { expected: StageId, got: StageId },

    #[error("completion received after the timeline finished")]
    RunFinished,

    #[error("response stage {0} completed without a selected value")]
    MissingResponse(StageId),

    #[error("invalid choice {value:?} on stage {stage}")]
    InvalidChoice { stage: StageId, value: String },

    #[error("accepted form on stage {stage} is missing field {field}")]
    MissingFormField { stage: StageId, field: String },
}
