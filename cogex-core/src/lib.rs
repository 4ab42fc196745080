pub mod completion;
pub mod error;
pub mod gate;
pub mod stage;
pub mod stimulus;
pub mod trial;

pub use cogex_cache::ContentRef;
pub use completion::{CompletionKind, StageCompletion};
pub use error::{Error, Result, ValidationFailure};
pub use gate::{FormSnapshot, Gate, HookKind};
pub use stage::{InputConstraint, Stage, StageId, StageKind, TrialRole, TrialSlot};
pub use stimulus::{StimulusPair, TimelineVariables, VariableKey};
pub use trial::{ChosenSide, ParticipantProperties, TrialRecord};
