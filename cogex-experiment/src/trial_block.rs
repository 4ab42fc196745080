use cogex_core::{
    ChosenSide, ContentRef, Error, Result, Stage, StageId, StimulusPair, TimelineVariables, TrialRole,
    TrialSlot,
};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use tracing::debug;

use crate::config::ExperimentConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrialOrder {
    #[default]
    Sequential,
    Randomized,
}

/// The five stages instantiated from one stimulus pair
#[derive(Debug, Clone, PartialEq)]
pub struct TrialGroup {
    pub pair_index: usize,
    pub variables: TimelineVariables,
    pub stages: Vec<Stage>,
}

/// Expands a pair dataset into trial groups using the fixed template
#[derive(Debug, Clone)]
pub struct TrialBlockGenerator {
    config: ExperimentConfig,
}

impl TrialBlockGenerator {
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    pub fn generate<R: Rng + ?Sized>(
        &self,
        pairs: &[StimulusPair],
        order: TrialOrder,
        rng: &mut R,
    ) -> Result<Vec<TrialGroup>> {
        if pairs.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let mut groups: Vec<TrialGroup> = pairs
            .iter()
            .enumerate()
            .map(|(i, pair)| self.instantiate(i, pair))
            .collect();

        if order == TrialOrder::Randomized {
            groups.shuffle(rng);
        }

        debug!(pairs = pairs.len(), ?order, "trial block generated");
        Ok(groups)
    }

    fn instantiate(&self, pair_index: usize, pair: &StimulusPair) -> TrialGroup {
        let variables = TimelineVariables::from(pair);
        let d = &self.config.durations;
        let stages = TrialRole::TEMPLATE
            .iter()
            .map(|&role| {
                let id = StageId::new(format!("trial-{pair_index}-{}", role.suffix()));
                let slot = TrialSlot { pair_index, role };
                match role {
                    TrialRole::Response => {
                        Stage::trial_unit(id, self.config.response_prompt.as_str(), slot)
                            .with_choices(ChosenSide::LABELS)
                            .with_post_gap(d.response_gap_ms)
                    }
                    _ => {
                        let (content, duration_ms) = match role.binding() {
                            Some(key) => (variables.get(key).clone(), d.stimulus_ms),
                            None if role == TrialRole::FirstMarker => {
                                (ContentRef::new(&self.config.marker_labels[0]), d.marker_ms)
                            }
                            None => (ContentRef::new(&self.config.marker_labels[1]), d.marker_ms),
                        };
                        Stage::trial_unit(id, content, slot)
                            .with_duration(Some(duration_ms))
                            .with_post_gap(d.gap_ms)
                    }
                }
            })
            .collect();

        TrialGroup {
            pair_index,
            variables,
            stages,
        }
    }
}
