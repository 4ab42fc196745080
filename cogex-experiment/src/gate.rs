use cogex_core::{FormSnapshot, Gate, HookKind, Stage, StageId, ValidationFailure};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Form did not pass; nothing changed
    Rejected(ValidationFailure),
    /// Form passes; fire the hook, if any, then `commit` the gate
    Accepted { hook: Option<HookKind> },
    /// Gate already passed earlier; re-submission is a no-op
    AlreadyAccepted,
}

/// One-shot gate state for a single stage instance
#[derive(Debug, Clone)]
pub struct ValidationGate {
    stage: StageId,
    gate: Gate,
    hook: Option<HookKind>,
    passed: bool,
}

impl ValidationGate {
    pub fn for_stage(stage: &Stage) -> Option<Self> {
        stage.gate.as_ref().map(|gate| Self {
            stage: stage.id.clone(),
            gate: gate.clone(),
            hook: stage.on_success,
            passed: false,
        })
    }

    pub fn check(&self, form: &FormSnapshot) -> bool {
        self.gate.check(form)
    }

    /// Does not change the gate; acceptance only sticks after `commit`
    pub fn evaluate(&self, form: &FormSnapshot) -> GateOutcome {
        if self.passed {
            return GateOutcome::AlreadyAccepted;
        }
        let fields = self.gate.failed_fields(form);
        if !fields.is_empty() {
            return GateOutcome::Rejected(ValidationFailure {
                stage: self.stage.clone(),
                fields,
            });
        }
        GateOutcome::Accepted { hook: self.hook }
    }

    /// Marks the gate passed once the accepted form's hook has run
    pub fn commit(&mut self) {
        self.passed = true;
    }

    pub fn is_passed(&self) -> bool {
        self.passed
    }
}
