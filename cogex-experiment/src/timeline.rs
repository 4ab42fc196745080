use std::collections::HashSet;

use cogex_core::gate::{AGE_FIELD, GENDER_FIELD};
use cogex_core::{ContentRef, Error, HookKind, Result, Stage, StageKind, StimulusPair};
use rand::Rng;
use tracing::{debug, info};

use crate::config::ExperimentConfig;
use crate::subtimeline::{Subtimeline, SubtimelineExpander};
use crate::trial_block::{TrialBlockGenerator, TrialOrder};

/// One input group to the builder, expanded in place
#[derive(Debug, Clone, PartialEq)]
pub enum StageGroup {
    Stage(Stage),
    Subtimeline(Subtimeline),
    TrialBlock {
        pairs: Vec<StimulusPair>,
        order: TrialOrder,
    },
}

/// Fully built stage sequence. Nothing can be added, removed or reordered.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    stages: Vec<Stage>,
    trial_groups: usize,
}

impl Timeline {
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn get(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stage> {
        self.stages.iter()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.id.as_str() == id)
    }

    /// Number of trial groups (one per stimulus pair)
    pub fn trial_count(&self) -> usize {
        self.trial_groups
    }

    /// Fails on the first asset-like content reference `available` does not accept
    pub fn preflight<F>(&self, available: F) -> Result<()>
    where
        F: Fn(&ContentRef) -> bool,
    {
        let mut checked = HashSet::new();
        for stage in &self.stages {
            let content = &stage.content;
            if content.is_asset() && checked.insert(content.clone()) && !available(content) {
                return Err(Error::ContentUnavailable(content.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
impl Timeline {
    /// Skips every build-time check
    pub(crate) fn unchecked(stages: Vec<Stage>) -> Self {
        Self {
            stages,
            trial_groups: 0,
        }
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Stage;
    type IntoIter = std::slice::Iter<'a, Stage>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.iter()
    }
}

pub struct TimelineBuilder<R: Rng> {
    config: ExperimentConfig,
    rng: R,
    groups: Vec<StageGroup>,
}

impl<R: Rng> TimelineBuilder<R> {
    pub fn new(config: ExperimentConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            groups: Vec::new(),
        }
    }

    pub fn push(mut self, group: StageGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn stage(self, stage: Stage) -> Self {
        self.push(StageGroup::Stage(stage))
    }

    pub fn subtimeline(self, sub: Subtimeline) -> Self {
        self.push(StageGroup::Subtimeline(sub))
    }

    pub fn trial_block(self, pairs: Vec<StimulusPair>, order: TrialOrder) -> Self {
        self.push(StageGroup::TrialBlock { pairs, order })
    }

    pub fn extend<I: IntoIterator<Item = StageGroup>>(mut self, groups: I) -> Self {
        self.groups.extend(groups);
        self
    }

    pub fn build(mut self) -> Result<Timeline> {
        let expander =
            SubtimelineExpander::new(self.config.default_duration_ms, self.config.blank_content.as_str());
        let generator = TrialBlockGenerator::new(self.config.clone());

        let mut stages = Vec::new();
        let mut trial_groups = 0;
        for group in std::mem::take(&mut self.groups) {
            match group {
                StageGroup::Stage(stage) => stages.push(stage),
                StageGroup::Subtimeline(sub) => stages.extend(expander.expand(&sub)),
                StageGroup::TrialBlock { pairs, order } => {
                    let block = generator.generate(&pairs, order, &mut self.rng)?;
                    trial_groups += block.len();
                    stages.extend(block.into_iter().flat_map(|g| g.stages));
                }
            }
        }

        let mut ids = HashSet::with_capacity(stages.len());
        for stage in &stages {
            if !ids.insert(stage.id.clone()) {
                debug!(id = %stage.id, "duplicate stage id");
                return Err(Error::DuplicateStageId(stage.id.clone()));
            }
        }

        check_properties_hook(&stages)?;

        info!(stages = stages.len(), trial_groups, "timeline built");
        Ok(Timeline {
            stages,
            trial_groups,
        })
    }
}

/// Participant properties are committed exactly once, by a gate that collects
/// them, before the first trial stage
fn check_properties_hook(stages: &[Stage]) -> Result<()> {
    let first_trial = stages.iter().position(|s| s.kind == StageKind::TrialUnit);
    let mut committed = false;
    for (i, stage) in stages.iter().enumerate() {
        let Some(hook @ HookKind::CommitParticipantProperties) = stage.on_success else {
            continue;
        };
        let collects = stage.gate.as_ref().is_some_and(|gate| {
            let fields = gate.fields();
            fields.contains(&AGE_FIELD) && fields.contains(&GENDER_FIELD)
        });
        if !collects {
            return Err(Error::IncompatibleHook {
                stage: stage.id.clone(),
                hook,
            });
        }
        if committed {
            return Err(Error::DuplicatePropertiesHook(stage.id.clone()));
        }
        if first_trial.is_some_and(|t| i > t) {
            return Err(Error::PropertiesAfterTrials(stage.id.clone()));
        }
        committed = true;
    }
    if first_trial.is_some() && !committed {
        return Err(Error::MissingParticipantProperties);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtimeline::TimedEntry;
    use cogex_core::Gate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn builder() -> TimelineBuilder<StdRng> {
        TimelineBuilder::new(ExperimentConfig::default(), StdRng::seed_from_u64(11))
    }

    fn personal_info(id: &str) -> Stage {
        Stage::static_content(id, "Taustatiedot", Some("next"))
            .with_gate(Gate::ParticipantInfo, Some(HookKind::CommitParticipantProperties))
    }

    fn kissa() -> Vec<StimulusPair> {
        vec![StimulusPair::new("kissa", "koira")]
    }

    #[test]
    fn groups_are_flattened_in_order() {
        let timeline = builder()
            .stage(Stage::static_content("intro", "instructions1", Some("next")))
            .stage(personal_info("personal_info"))
            .subtimeline(Subtimeline {
                id: "example".into(),
                prompt: None,
                entries: vec![
                    TimedEntry::new("example1.png", None, Some(500)),
                    TimedEntry::new("example2.png", None, None),
                ],
            })
            .trial_block(vec![StimulusPair::new("kissa", "koira")], TrialOrder::Sequential)
            .stage(Stage::static_content("thanks", "thank_you", None))
            .build()
            .unwrap();

        let ids: Vec<_> = timeline.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "intro",
                "personal_info",
                "example-0",
                "example-0-wait",
                "example-1",
                "trial-0-marker-1",
                "trial-0-w1",
                "trial-0-marker-2",
                "trial-0-w2",
                "trial-0-response",
                "thanks"
            ]
        );
        assert_eq!(timeline.trial_count(), 1);
        assert_eq!(timeline.position("thanks"), Some(10));
    }

    #[test]
    fn duplicate_ids_fail() {
        let err = builder()
            .stage(Stage::static_content("intro", "a", Some("next")))
            .stage(Stage::static_content("intro", "b", Some("next")))
            .build()
            .unwrap_err();
        assert_eq!(err, Error::DuplicateStageId("intro".into()));
    }

    #[test]
    fn two_trial_blocks_collide_on_ids() {
        let pairs = vec![StimulusPair::new("a", "b")];
        let err = builder()
            .trial_block(pairs.clone(), TrialOrder::Sequential)
            .trial_block(pairs, TrialOrder::Sequential)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateStageId(_)));
    }

    #[test]
    fn empty_trial_block_fails() {
        let err = builder()
            .stage(Stage::static_content("intro", "a", Some("next")))
            .trial_block(Vec::new(), TrialOrder::Randomized)
            .build()
            .unwrap_err();
        assert_eq!(err, Error::EmptyDataset);
    }

    #[test]
    fn preflight_reports_missing_assets_only() {
        let timeline = builder()
            .stage(personal_info("personal_info"))
            .stage(Stage::timed("frame", "example1.png", 1000))
            .trial_block(kissa(), TrialOrder::Sequential)
            .build()
            .unwrap();

        assert!(timeline.preflight(|_| true).is_ok());
        assert_eq!(
            timeline.preflight(|c| c.as_str() != "example1.png"),
            Err(Error::ContentUnavailable(ContentRef::new("example1.png")))
        );
    }

    #[test]
    fn properties_must_be_committed_before_trials() {
        let err = builder()
            .trial_block(kissa(), TrialOrder::Sequential)
            .stage(personal_info("personal_info"))
            .build()
            .unwrap_err();
        assert_eq!(err, Error::PropertiesAfterTrials("personal_info".into()));
    }

    #[test]
    fn trials_without_properties_stage_fail() {
        let err = builder()
            .trial_block(kissa(), TrialOrder::Sequential)
            .build()
            .unwrap_err();
        assert_eq!(err, Error::MissingParticipantProperties);
    }

    #[test]
    fn properties_are_committed_only_once() {
        let err = builder()
            .stage(personal_info("personal_info"))
            .stage(personal_info("personal_info_again"))
            .trial_block(kissa(), TrialOrder::Sequential)
            .build()
            .unwrap_err();
        assert_eq!(err, Error::DuplicatePropertiesHook("personal_info_again".into()));
    }

    #[test]
    fn commit_hook_needs_a_gate_collecting_age_and_gender() {
        let stage = Stage::static_content("age_only", "Ikä", Some("next")).with_gate(
            Gate::RequiredFields(vec!["age".into()]),
            Some(HookKind::CommitParticipantProperties),
        );
        let err = builder()
            .stage(stage)
            .trial_block(kissa(), TrialOrder::Sequential)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            Error::IncompatibleHook {
                stage: "age_only".into(),
                hook: HookKind::CommitParticipantProperties,
            }
        );
    }

    #[test]
    fn timeline_without_trials_needs_no_properties() {
        let timeline = builder()
            .stage(Stage::static_content("intro", "a", None))
            .build()
            .unwrap();
        assert_eq!(timeline.trial_count(), 0);
    }
}
