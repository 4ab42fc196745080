use std::io::{BufRead, Write};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use cogex_core::{FormSnapshot, InputConstraint, Stage, StageCompletion, StageKind};
use cogex_experiment::{Advance, ExperimentStateMachine, SessionTable};
use cogex_timing::Timer;
use tracing::{debug, info};

/// Terminal presentation runtime: shows one stage at a time and reports completions
pub struct ConsoleRuntime<T: Timer, I: BufRead, O: Write> {
    experiment: ExperimentStateMachine,
    timer: T,
    input: I,
    output: O,
}

impl<T, I, O> ConsoleRuntime<T, I, O>
where
    T: Timer<Timestamp = u64>,
    I: BufRead,
    O: Write,
{
    pub fn new(experiment: ExperimentStateMachine, timer: T, input: I, output: O) -> Self {
        Self {
            experiment,
            timer,
            input,
            output,
        }
    }

    /// Runs until the timeline is exhausted and returns the finalized table
    pub fn run(mut self) -> Result<SessionTable> {
        while let Some(stage) = self.experiment.current_stage().cloned() {
            let completion = self.present(&stage)?;
            match self.experiment.handle_completion(completion)? {
                Advance::Stay(failure) => {
                    writeln!(self.output, "! Tarkista kentät: {}", failure.fields.join(", "))?;
                    continue;
                }
                Advance::Next(next) => debug!(from = %stage.id, to = %next, "advanced"),
                Advance::Finished => debug!(from = %stage.id, "finished"),
            }
            if let Some(gap) = stage.post_gap_ms {
                self.timer.sleep(Duration::from_millis(gap));
            }
        }

        let (done, total) = self.experiment.trial_progress();
        info!(done, total, "session complete");
        Ok(self.experiment.finalize()?)
    }

    fn present(&mut self, stage: &Stage) -> Result<StageCompletion> {
        match stage.kind {
            StageKind::Wait => writeln!(self.output)?,
            _ => {
                if let Some(prompt) = &stage.prompt {
                    writeln!(self.output, "{prompt}")?;
                }
                if stage.content.is_asset() {
                    writeln!(self.output, "[{}]", stage.content)?;
                } else {
                    writeln!(self.output, "{}", stage.content)?;
                }
            }
        }
        self.output.flush()?;

        if let Some(gate) = &stage.gate {
            let mut form = FormSnapshot::new();
            for field in gate.fields() {
                let value = self.prompt_line(&format!("{field}: "))?;
                form.insert(field, value);
            }
            let label = match &stage.input {
                InputConstraint::Choices(choices) => choices.first().cloned().unwrap_or_default(),
                InputConstraint::None => String::new(),
            };
            return Ok(StageCompletion::input(stage.id.clone(), label, 0).with_form(form));
        }

        match &stage.input {
            InputConstraint::Choices(choices) if choices.len() == 1 => {
                let start = self.timer.now();
                self.prompt_line(&format!("[Enter: {}] ", choices[0]))?;
                let elapsed = self.timer.elapsed_ms(start);
                Ok(StageCompletion::input(stage.id.clone(), choices[0].clone(), elapsed))
            }
            InputConstraint::Choices(choices) => {
                let start = self.timer.now();
                let hint = format!("[{}] ", choices.join("/"));
                loop {
                    let answer = self.prompt_line(&hint)?;
                    if stage.input.allows(&answer) {
                        let elapsed = self.timer.elapsed_ms(start);
                        return Ok(StageCompletion::input(stage.id.clone(), answer, elapsed));
                    }
                }
            }
            InputConstraint::None => {
                let start = self.timer.now();
                if let Some(ms) = stage.duration_ms {
                    self.timer.sleep(Duration::from_millis(ms));
                }
                Ok(StageCompletion::timeout(stage.id.clone(), self.timer.elapsed_ms(start)))
            }
        }
    }

    fn prompt_line(&mut self, hint: &str) -> Result<String> {
        write!(self.output, "{hint}")?;
        self.output.flush()?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read participant input")?;
        if read == 0 {
            bail!("input closed before the experiment finished");
        }
        Ok(line.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogex_experiment::Protocol;
    use cogex_timing::ManualTimer;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::io::Cursor;

    const PROTOCOL: &str = r#"
        [[timeline]]
        type = "page"
        id = "personal_info"
        content = "Taustatiedot"
        gate = "participant_info"
        on_success = "commit_participant_properties"

        [[timeline]]
        type = "trials"
        pairs = [["kissa", "koira"], ["talo", "taloo"]]

        [[timeline]]
        type = "page"
        id = "thank_you"
        content = "Kiitos"
        terminal = true
    "#;

    fn runtime(script: &str) -> ConsoleRuntime<ManualTimer, Cursor<Vec<u8>>, Vec<u8>> {
        let timeline = Protocol::from_toml_str(PROTOCOL)
            .unwrap()
            .build_timeline(StdRng::seed_from_u64(1))
            .unwrap();
        ConsoleRuntime::new(
            ExperimentStateMachine::new(timeline),
            ManualTimer::new(),
            Cursor::new(script.as_bytes().to_vec()),
            Vec::new(),
        )
    }

    #[test]
    fn scripted_session_produces_table() {
        // rejected form first, then valid; second response retried after a bad key
        let table = runtime("abc\nmies\n24\nmies\n1\n3\n2\n").run().unwrap();
        let sides: Vec<_> = table.rows.iter().map(|r| r.chosen_side).collect();
        assert_eq!(sides, [1, 2]);
        assert!(table.rows.iter().all(|r| r.age == "24"));
    }

    #[test]
    fn timed_stages_advance_virtual_clock() {
        let rt = runtime("24\nmies\n1\n2\n");
        let timer = rt.timer.clone();
        rt.run().unwrap();
        // per trial: 2 * 1000 marker + 2 * 1000 word + 4 * 500 gaps + 500 response gap
        assert_eq!(timer.now(), 2 * 6_500 * 1_000_000);
    }

    #[test]
    fn closed_input_is_an_error() {
        let err = runtime("24\nmies\n").run().unwrap_err();
        assert!(err.to_string().contains("input closed"));
    }
}
