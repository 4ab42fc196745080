use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use cogex_experiment::{ExperimentStateMachine, Protocol};
use cogex_timing::HighPrecisionTimer;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::runtime::ConsoleRuntime;

const DEMO_PROTOCOL: &str = include_str!("../../demos/word_choice.toml");

pub struct App {
    protocol: Protocol,
    results_path: Option<PathBuf>,
}

impl App {
    /// Loads the protocol at `protocol_path`, or the bundled demo when `None`
    pub fn new(protocol_path: Option<PathBuf>, results_path: Option<PathBuf>) -> Result<Self> {
        let protocol = match &protocol_path {
            Some(path) => Protocol::load(path)
                .with_context(|| format!("loading protocol {}", path.display()))?,
            None => Protocol::from_toml_str(DEMO_PROTOCOL).context("parsing bundled protocol")?,
        };
        Ok(Self {
            protocol,
            results_path,
        })
    }

    pub fn run(self) -> Result<()> {
        let rng = match self.protocol.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let timeline = self.protocol.build_timeline(rng)?;
        if let Some(root) = &self.protocol.config.content_root {
            timeline
                .preflight(|content| root.join(content.as_str()).is_file())
                .context("cannot start: content missing")?;
        }
        info!(
            stages = timeline.len(),
            trials = timeline.trial_count(),
            "starting session"
        );

        println!("=== COGNITIVE EXPERIMENT ===");
        println!("Platform: {}", std::env::consts::OS);
        println!("Press ENTER to continue, Ctrl-C to abort.\n");

        let stdin = io::stdin();
        let runtime = ConsoleRuntime::new(
            ExperimentStateMachine::new(timeline),
            HighPrecisionTimer::new(),
            stdin.lock(),
            io::stdout(),
        );
        let table = runtime.run()?;

        println!();
        table.write_csv(io::stdout().lock())?;

        if let Some(path) = &self.results_path {
            let file = File::create(path)
                .with_context(|| format!("cannot create result file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            table.write_csv(&mut writer)?;
            writer.flush()?;
            info!(path = %path.display(), rows = table.len(), "results saved");
        }
        Ok(())
    }
}
