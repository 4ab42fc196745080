use cogex_core::{ContentRef, Stage};
use serde::Deserialize;

/// One frame of a timed sequence
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimedEntry {
    pub content: ContentRef,
    pub duration_ms: Option<u64>,
    pub gap_ms: Option<u64>,
}

impl TimedEntry {
    pub fn new(content: impl Into<ContentRef>, duration_ms: Option<u64>, gap_ms: Option<u64>) -> Self {
        Self {
            content: content.into(),
            duration_ms,
            gap_ms,
        }
    }
}

/// A compound timed stimulus sequence such as the example animation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Subtimeline {
    pub id: String,
    pub prompt: Option<String>,
    pub entries: Vec<TimedEntry>,
}

/// Flattens a subtimeline into timed stages with explicit wait stages between them
#[derive(Debug, Clone)]
pub struct SubtimelineExpander {
    pub default_duration_ms: u64,
    pub blank: ContentRef,
}

impl SubtimelineExpander {
    pub fn new(default_duration_ms: u64, blank: impl Into<ContentRef>) -> Self {
        Self {
            default_duration_ms,
            blank: blank.into(),
        }
    }

    pub fn expand(&self, sub: &Subtimeline) -> Vec<Stage> {
        let last = sub.entries.len().saturating_sub(1);
        let mut stages = Vec::with_capacity(sub.entries.len() * 2);

        for (n, entry) in sub.entries.iter().enumerate() {
            let duration = entry.duration_ms.unwrap_or(self.default_duration_ms);
            let mut stage = Stage::timed(format!("{}-{n}", sub.id), entry.content.clone(), duration);
            if let Some(prompt) = &sub.prompt {
                stage = stage.with_prompt(prompt.clone());
            }
            stages.push(stage);

            let gap = entry.gap_ms.unwrap_or(0);
            if n < last && gap > 0 {
                stages.push(Stage::wait(
                    format!("{}-{n}-wait", sub.id),
                    self.blank.clone(),
                    gap,
                ));
            }
        }
        stages
    }
}

/// Wall-clock length of a run of stages, including post-stage gaps
pub fn expanded_duration_ms(stages: &[Stage]) -> u64 {
    stages.iter().map(Stage::scheduled_ms).sum()
}
