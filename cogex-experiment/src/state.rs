use cogex_core::{
    ChosenSide, Error, FormSnapshot, HookKind, ParticipantProperties, Result, Stage,
    StageCompletion, StageId, StageKind, TrialRecord, ValidationFailure,
};
use tracing::{debug, info, warn};

use crate::gate::{GateOutcome, ValidationGate};
use crate::session::{SessionDataStore, SessionTable};
use crate::timeline::Timeline;

/// Result of feeding one completion into the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Gate rejected the form; the same stage must be shown again
    Stay(ValidationFailure),
    /// Moved on to the stage with this id
    Next(StageId),
    Finished,
}

/// Walks a timeline one stage at a time as the presentation runtime reports completions
pub struct ExperimentStateMachine {
    timeline: Timeline,
    cursor: usize,
    gates: Vec<Option<ValidationGate>>,
    session: SessionDataStore,
}

impl ExperimentStateMachine {
    pub fn new(timeline: Timeline) -> Self {
        let gates = timeline.iter().map(ValidationGate::for_stage).collect();
        let mut machine = Self {
            timeline,
            cursor: 0,
            gates,
            session: SessionDataStore::new(),
        };
        machine.enter();
        machine
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn current_stage(&self) -> Option<&Stage> {
        self.timeline.get(self.cursor)
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.timeline.len()
    }

    pub fn session(&self) -> &SessionDataStore {
        &self.session
    }

    /// Responses recorded so far out of the timeline's trial count
    pub fn trial_progress(&self) -> (usize, usize) {
        (self.session.records().len(), self.timeline.trial_count())
    }

    pub fn handle_completion(&mut self, completion: StageCompletion) -> Result<Advance> {
        let stage = self.timeline.get(self.cursor).ok_or(Error::RunFinished)?;
        if stage.id != completion.stage_id {
            return Err(Error::StageMismatch {
                expected: stage.id.clone(),
                got: completion.stage_id,
            });
        }

        if let Some(gate) = &self.gates[self.cursor] {
            let form = completion.form.clone().unwrap_or_default();
            match gate.evaluate(&form) {
                GateOutcome::Rejected(failure) => {
                    debug!(stage = %failure.stage, fields = ?failure.fields, "gate rejected form");
                    return Ok(Advance::Stay(failure));
                }
                GateOutcome::Accepted { hook } => {
                    if let Some(hook) = hook {
                        let id = stage.id.clone();
                        self.dispatch(hook, &id, &form)?;
                    }
                    if let Some(gate) = self.gates[self.cursor].as_mut() {
                        gate.commit();
                    }
                }
                GateOutcome::AlreadyAccepted => {}
            }
        }

        let stage = &self.timeline.stages()[self.cursor];
        if let Some(slot) = stage.trial.filter(|_| stage.is_response()) {
            let value = completion
                .selected_value
                .as_deref()
                .ok_or_else(|| Error::MissingResponse(stage.id.clone()))?;
            let chosen_side = ChosenSide::from_label(value)
                .filter(|_| stage.input.allows(value.trim()))
                .ok_or_else(|| Error::InvalidChoice {
                    stage: stage.id.clone(),
                    value: value.to_string(),
                })?;
            self.session.record_trial(TrialRecord {
                pair_index: slot.pair_index,
                chosen_side,
                reaction_time_ms: completion.elapsed_ms,
            });
        }

        self.cursor += 1;
        self.enter();
        Ok(match self.current_stage() {
            Some(next) => Advance::Next(next.id.clone()),
            None => {
                let (done, total) = self.trial_progress();
                info!(trials = done, of = total, "timeline finished");
                Advance::Finished
            }
        })
    }

    /// Results table; fails until the terminal stage has been reached
    pub fn finalize(&self) -> Result<SessionTable> {
        self.session.finalize()
    }

    fn enter(&mut self) {
        let last = self.timeline.len().saturating_sub(1);
        let terminal = match self.timeline.get(self.cursor) {
            // a trial or gated stage at the end still has to be answered
            Some(stage) => {
                self.cursor == last
                    && stage.kind != StageKind::TrialUnit
                    && self.gates[self.cursor].is_none()
            }
            None => true,
        };
        if terminal && !self.session.is_terminal() {
            debug!(position = self.cursor, "terminal stage reached");
            self.session.mark_terminal();
        }
    }

    fn dispatch(&mut self, hook: HookKind, stage: &StageId, form: &FormSnapshot) -> Result<()> {
        match hook {
            HookKind::CommitParticipantProperties => {
                let props = ParticipantProperties::from_form(form).map_err(|field| {
                    warn!(%stage, field, "accepted form lacks participant field");
                    Error::MissingFormField {
                        stage: stage.clone(),
                        field: field.to_string(),
                    }
                })?;
                self.session.add_properties(props)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExperimentConfig;
    use crate::timeline::{Timeline, TimelineBuilder};
    use crate::trial_block::TrialOrder;
    use cogex_core::{Gate, StimulusPair};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn machine(pairs: Vec<StimulusPair>) -> ExperimentStateMachine {
        let timeline = TimelineBuilder::new(ExperimentConfig::default(), StdRng::seed_from_u64(5))
            .stage(
                Stage::static_content("personal_info", "personal_info", Some("next"))
                    .with_gate(Gate::ParticipantInfo, Some(HookKind::CommitParticipantProperties)),
            )
            .trial_block(pairs, TrialOrder::Sequential)
            .stage(Stage::static_content("thank_you", "thank_you", None))
            .build()
            .unwrap();
        ExperimentStateMachine::new(timeline)
    }

    fn person() -> FormSnapshot {
        FormSnapshot::new().with("age", "24").with("gender", "mies")
    }

    fn run_trial(m: &mut ExperimentStateMachine, i: usize, choice: &str, rt: u64) {
        for suffix in ["marker-1", "w1", "marker-2", "w2"] {
            let id = format!("trial-{i}-{suffix}");
            m.handle_completion(StageCompletion::timeout(id.as_str(), 1000))
                .unwrap();
        }
        let id = format!("trial-{i}-response");
        m.handle_completion(StageCompletion::input(id.as_str(), choice, rt))
            .unwrap();
    }

    #[test]
    fn failing_gate_keeps_stage_and_session_untouched() {
        let mut m = machine(vec![StimulusPair::new("kissa", "koira")]);
        for _ in 0..3 {
            let advance = m
                .handle_completion(
                    StageCompletion::input("personal_info", "next", 0)
                        .with_form(FormSnapshot::new().with("age", "x")),
                )
                .unwrap();
            assert!(matches!(advance, Advance::Stay(_)));
        }
        assert_eq!(m.position(), 0);
        assert!(m.session().properties().is_none());

        let advance = m
            .handle_completion(StageCompletion::input("personal_info", "next", 0).with_form(person()))
            .unwrap();
        assert_eq!(advance, Advance::Next("trial-0-marker-1".into()));
        assert_eq!(m.session().properties().unwrap().gender, "mies");
    }

    #[test]
    fn missing_form_counts_as_empty() {
        let mut m = machine(vec![StimulusPair::new("kissa", "koira")]);
        let advance = m
            .handle_completion(StageCompletion::input("personal_info", "next", 0))
            .unwrap();
        assert!(matches!(advance, Advance::Stay(f) if f.fields.len() == 2));
    }

    #[test]
    fn completion_for_wrong_stage_fails() {
        let mut m = machine(vec![StimulusPair::new("kissa", "koira")]);
        let err = m
            .handle_completion(StageCompletion::timeout("trial-0-w1", 1000))
            .unwrap_err();
        assert!(matches!(err, Error::StageMismatch { .. }));
    }

    #[test]
    fn response_needs_a_valid_label() {
        let mut m = machine(vec![StimulusPair::new("kissa", "koira")]);
        m.handle_completion(StageCompletion::input("personal_info", "next", 0).with_form(person()))
            .unwrap();
        for suffix in ["marker-1", "w1", "marker-2", "w2"] {
            let id = format!("trial-0-{suffix}");
            m.handle_completion(StageCompletion::timeout(id.as_str(), 1000))
                .unwrap();
        }
        assert_eq!(
            m.handle_completion(StageCompletion::timeout("trial-0-response", 0)),
            Err(Error::MissingResponse("trial-0-response".into()))
        );
        assert!(matches!(
            m.handle_completion(StageCompletion::input("trial-0-response", "3", 400)),
            Err(Error::InvalidChoice { .. })
        ));
        assert!(m.session().records().is_empty());
    }

    #[test]
    fn finalize_before_thank_you_fails() {
        let mut m = machine(vec![StimulusPair::new("a", "b"), StimulusPair::new("c", "d")]);
        m.handle_completion(StageCompletion::input("personal_info", "next", 0).with_form(person()))
            .unwrap();
        run_trial(&mut m, 0, "2", 700);
        assert_eq!(m.finalize(), Err(Error::SessionIncomplete));

        run_trial(&mut m, 1, "1", 650);
        assert_eq!(m.current_stage().unwrap().id.as_str(), "thank_you");
        assert_eq!(m.finalize().unwrap().len(), 2);
        assert_eq!(m.trial_progress(), (2, 2));
    }

    #[test]
    fn run_ends_after_last_stage() {
        let mut m = machine(vec![StimulusPair::new("a", "b")]);
        m.handle_completion(StageCompletion::input("personal_info", "next", 0).with_form(person()))
            .unwrap();
        run_trial(&mut m, 0, "1", 500);
        assert_eq!(
            m.handle_completion(StageCompletion::timeout("thank_you", 0)),
            Ok(Advance::Finished)
        );
        assert!(m.is_finished());
        assert_eq!(
            m.handle_completion(StageCompletion::timeout("thank_you", 0)),
            Err(Error::RunFinished)
        );
    }

    #[test]
    fn failed_hook_leaves_gate_open() {
        let timeline = Timeline::unchecked(vec![
            Stage::static_content("age_only", "Ikä", Some("next")).with_gate(
                Gate::RequiredFields(vec!["age".into()]),
                Some(HookKind::CommitParticipantProperties),
            ),
            Stage::timed("pause", "empty", 500),
        ]);
        let mut m = ExperimentStateMachine::new(timeline);

        let partial = FormSnapshot::new().with("age", "24");
        assert_eq!(
            m.handle_completion(StageCompletion::input("age_only", "next", 0).with_form(partial)),
            Err(Error::MissingFormField {
                stage: "age_only".into(),
                field: "gender".into(),
            })
        );
        assert_eq!(m.position(), 0);

        let advance = m
            .handle_completion(StageCompletion::input("age_only", "next", 0).with_form(person()))
            .unwrap();
        assert_eq!(advance, Advance::Next("pause".into()));
        assert_eq!(
            m.session().properties(),
            Some(&ParticipantProperties::new("24", "mies"))
        );
    }

    #[test]
    fn gated_last_stage_is_terminal_only_once_passed() {
        let timeline = TimelineBuilder::new(ExperimentConfig::default(), StdRng::seed_from_u64(5))
            .stage(
                Stage::static_content("personal_info", "personal_info", Some("next"))
                    .with_gate(Gate::ParticipantInfo, Some(HookKind::CommitParticipantProperties)),
            )
            .trial_block(vec![StimulusPair::new("a", "b")], TrialOrder::Sequential)
            .stage(
                Stage::static_content("feedback", "Palaute", Some("next"))
                    .with_gate(Gate::RequiredFields(vec!["feedback".into()]), None),
            )
            .build()
            .unwrap();
        let mut m = ExperimentStateMachine::new(timeline);
        m.handle_completion(StageCompletion::input("personal_info", "next", 0).with_form(person()))
            .unwrap();
        run_trial(&mut m, 0, "1", 500);

        assert_eq!(m.current_stage().unwrap().id.as_str(), "feedback");
        assert_eq!(m.finalize(), Err(Error::SessionIncomplete));

        let advance = m
            .handle_completion(StageCompletion::input("feedback", "next", 0))
            .unwrap();
        assert!(matches!(advance, Advance::Stay(_)));
        assert_eq!(m.finalize(), Err(Error::SessionIncomplete));

        let form = FormSnapshot::new().with("feedback", "selkeä");
        assert_eq!(
            m.handle_completion(StageCompletion::input("feedback", "next", 0).with_form(form)),
            Ok(Advance::Finished)
        );
        assert_eq!(m.finalize().unwrap().len(), 1);
    }
}
