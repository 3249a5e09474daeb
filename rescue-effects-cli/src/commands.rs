// CLI command handlers
use anyhow::{bail, Context, Result};
use indicatif::ProgressBar;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rescue_effects_core::host::DataResponse;
use rescue_effects_core::memory::addresses::{
    CAN_GO, CURRENT_HP, DATA_FIELDS, FLOOR, MAX_HP, MONEY, STATUS,
};
use rescue_effects_core::{
    EffectPack, EffectRequest, EffectResponse, PackConfig, PackManifest, RecordingMessenger,
    SimulatedWram,
};

pub fn write_catalog(output: Option<&Path>, pretty: bool) -> Result<()> {
    let json = PackManifest::new()
        .to_json(pretty)
        .context("Failed to serialize catalog")?;
    match output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("Failed to write catalog: {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}

pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    PackConfig::default().save_to_file(path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

/// Game state written into simulated memory before the run.
#[derive(Debug, Clone, Copy)]
pub struct Seed {
    pub floor: u8,
    pub money: u32,
    pub current_hp: u8,
    pub max_hp: u32,
    pub status: u8,
    pub can_go: bool,
}

impl Default for Seed {
    fn default() -> Self {
        Self {
            floor: 1,
            money: 0,
            current_hp: 20,
            max_hp: 20,
            status: 0,
            can_go: true,
        }
    }
}

impl Seed {
    fn load(&self, wram: &SimulatedWram) -> Result<()> {
        wram.load_bytes(FLOOR.address, &[self.floor])?;
        wram.load_bytes(MONEY.address, &self.money.to_le_bytes())?;
        wram.load_bytes(CURRENT_HP.address, &[self.current_hp])?;
        wram.load_bytes(MAX_HP.address, &self.max_hp.to_le_bytes())?;
        wram.load_bytes(STATUS.address, &[self.status])?;
        wram.load_bytes(CAN_GO.address, &[u8::from(self.can_go)])?;
        Ok(())
    }
}

/// One line of a simulation script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Effect { viewer: String, code: String },
    /// Advance the simulated clock and expire due timed effects.
    Wait(Duration),
}

/// Parse a script: one `[viewer] code` or `wait <seconds>` per line.
/// Blank lines and `#` comments are skipped.
pub fn parse_script(text: &str, default_viewer: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        let step = match words.as_slice() {
            ["wait", secs] => {
                let secs: u64 = secs
                    .parse()
                    .with_context(|| format!("line {}: bad wait '{}'", number + 1, secs))?;
                Step::Wait(Duration::from_secs(secs))
            }
            [code] => Step::Effect {
                viewer: default_viewer.to_string(),
                code: (*code).to_string(),
            },
            [viewer, code] => Step::Effect {
                viewer: (*viewer).to_string(),
                code: (*code).to_string(),
            },
            _ => bail!("line {}: expected '[viewer] code' or 'wait <seconds>'", number + 1),
        };
        steps.push(step);
    }
    Ok(steps)
}

pub struct SimulateOptions {
    pub config: Option<PathBuf>,
    pub seed: Seed,
    pub viewer: String,
    pub codes: Vec<String>,
    pub script: Option<PathBuf>,
    /// Seconds to advance after the last step before shutting down.
    pub settle_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub responses: Vec<EffectResponse>,
    /// Codes that got no response.
    pub ignored: Vec<String>,
    pub messages: Vec<String>,
    pub state: Vec<DataResponse>,
}

impl SimulateOptions {
    pub fn steps(&self) -> Result<Vec<Step>> {
        let mut steps: Vec<Step> = self
            .codes
            .iter()
            .map(|code| Step::Effect {
                viewer: self.viewer.clone(),
                code: code.clone(),
            })
            .collect();
        if let Some(path) = &self.script {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read script: {}", path.display()))?;
            steps.extend(parse_script(&text, &self.viewer)?);
        }
        Ok(steps)
    }
}

/// Run effect steps against simulated memory on a simulated clock.
pub fn simulate(options: &SimulateOptions, steps: &[Step], pb: &ProgressBar) -> Result<SimulationReport> {
    let config = match &options.config {
        Some(path) => PackConfig::load_from_file(path)?,
        None => PackConfig::default(),
    };

    let wram = Arc::new(SimulatedWram::new());
    options.seed.load(&wram).context("Failed to seed simulated memory")?;
    let messenger = Arc::new(RecordingMessenger::new());
    let pack = EffectPack::new(wram.clone(), messenger.clone(), config);

    let mut report = SimulationReport {
        responses: Vec::new(),
        ignored: Vec::new(),
        messages: Vec::new(),
        state: Vec::new(),
    };
    let mut now = Instant::now();
    let mut next_id = 1u64;

    for step in steps {
        match step {
            Step::Effect { viewer, code } => {
                pb.set_message(code.clone());
                let request = EffectRequest::new(next_id, viewer.as_str(), code.as_str());
                next_id += 1;
                match pack.start_effect_at(&request, now) {
                    Some(response) => report.responses.push(response),
                    None => {
                        log::warn!("No handler for '{}'", code);
                        report.ignored.push(code.clone());
                    }
                }
            }
            Step::Wait(duration) => {
                now += *duration;
                report.responses.extend(pack.tick(now));
            }
        }
        pb.inc(1);
    }

    now += Duration::from_secs(options.settle_secs);
    report.responses.extend(pack.tick(now));
    report.responses.extend(pack.shutdown());

    report.state = DATA_FIELDS
        .iter()
        .map(|(key, _)| pack.request_data(key))
        .collect();
    report.messages = messenger.take();
    Ok(report)
}
