use std::path::Path;

use cogex_core::{Gate, HookKind, Result, Stage, StimulusPair};
use rand::Rng;
use serde::Deserialize;

use crate::config::ExperimentConfig;
use crate::error::ConfigError;
use crate::subtimeline::Subtimeline;
use crate::timeline::{StageGroup, Timeline, TimelineBuilder};
use crate::trial_block::TrialOrder;

/// Experiment description loaded from TOML: settings plus the ordered timeline
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Protocol {
    #[serde(default)]
    pub config: ExperimentConfig,
    pub timeline: Vec<ProtocolEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProtocolEntry {
    Page {
        id: String,
        content: String,
        continue_label: Option<String>,
        gate: Option<Gate>,
        on_success: Option<HookKind>,
        /// Final page without a continue button
        #[serde(default)]
        terminal: bool,
    },
    Animation(Subtimeline),
    Trials {
        #[serde(default)]
        order: TrialOrder,
        pairs: Vec<StimulusPair>,
    },
}

impl Protocol {
    pub fn from_toml_str(s: &str) -> std::result::Result<Self, ConfigError> {
        let protocol: Self = toml::from_str(s)?;
        protocol.validate()?;
        Ok(protocol)
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        for entry in &self.timeline {
            if let ProtocolEntry::Page {
                id,
                gate: None,
                on_success: Some(_),
                ..
            } = entry
            {
                return Err(ConfigError::HookWithoutGate { page: id.clone() });
            }
        }
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn stage_groups(&self) -> Vec<StageGroup> {
        self.timeline
            .iter()
            .map(|entry| match entry {
                ProtocolEntry::Page {
                    id,
                    content,
                    continue_label,
                    gate,
                    on_success,
                    terminal,
                } => {
                    let label = (!terminal)
                        .then(|| continue_label.as_deref().unwrap_or(&self.config.continue_label));
                    let mut stage = Stage::static_content(id.as_str(), content.as_str(), label);
                    if let Some(gate) = gate {
                        stage = stage.with_gate(gate.clone(), *on_success);
                    }
                    StageGroup::Stage(stage)
                }
                ProtocolEntry::Animation(sub) => StageGroup::Subtimeline(sub.clone()),
                ProtocolEntry::Trials { order, pairs } => StageGroup::TrialBlock {
                    pairs: pairs.clone(),
                    order: *order,
                },
            })
            .collect()
    }

    pub fn build_timeline<R: Rng>(&self, rng: R) -> Result<Timeline> {
        TimelineBuilder::new(self.config.clone(), rng)
            .extend(self.stage_groups())
            .build()
    }
}
