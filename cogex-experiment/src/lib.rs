pub mod config;
pub mod error;
pub mod gate;
pub mod protocol;
pub mod session;
pub mod state;
pub mod subtimeline;
pub mod timeline;
pub mod trial;
pub mod trial_block;

pub use config::ExperimentConfig;
pub use error::{ConfigError, ExportError};
pub use gate::{GateOutcome, ValidationGate};
pub use protocol::{Protocol, ProtocolEntry};
pub use session::{SessionDataStore, SessionRow, SessionTable};
pub use state::{Advance, ExperimentStateMachine};
pub use subtimeline::{SubtimelineExpander, Subtimeline, TimedEntry, expanded_duration_ms};
pub use timeline::{StageGroup, Timeline, TimelineBuilder};
pub use trial::TrialDurations;
pub use trial_block::{TrialBlockGenerator, TrialGroup, TrialOrder};
