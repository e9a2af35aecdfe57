//! TOML scenario files: a seed, a run length and a schedule of host inputs.
//!
//! ```toml
//! seed = 7
//! ticks = 600
//! chapter = 2
//! start_set = 4
//!
//! [[inputs]]
//! tick = 20
//! input = { kind = "player_combat", on = true }
//! ```

use std::fs;
use std::path::Path;

use actor_ai::{ContentPack, HostInput, InputJournal, SceneId, SetId, keys};
use anyhow::{Context, Result, bail};
use serde::Deserialize;

const DEFAULT_TICK_MS: u32 = 50;

fn default_tick_ms() -> u32 {
    DEFAULT_TICK_MS
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub seed: u64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u32,
    pub ticks: u64,
    /// Value of the chapter variable before the first tick.
    #[serde(default)]
    pub chapter: Option<i32>,
    /// Set the detective starts in, instead of the precinct.
    #[serde(default)]
    pub start_set: Option<u16>,
    #[serde(default)]
    pub inputs: Vec<ScheduledInput>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduledInput {
    pub tick: u64,
    pub input: HostInput,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid scenario: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let scenario: Scenario =
            toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse scenario TOML: {}", e))?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            bail!("tick_ms must be positive");
        }
        if let Some(late) = self.inputs.iter().find(|scheduled| scheduled.tick > self.ticks) {
            bail!("input at tick {} is scheduled after the run ends at {}", late.tick, self.ticks);
        }
        Ok(())
    }

    /// Turns the scenario into a journal ready for replay. Setup inputs come
    /// first at tick 0; scheduled inputs keep their file order within a tick.
    pub fn to_journal(&self, build_id: &str) -> InputJournal {
        let mut journal = InputJournal::new(self.seed, self.tick_ms);
        journal.build_id = build_id.to_string();
        journal.content_hash = ContentPack::default().content_hash();
        journal.run_ticks = self.ticks;

        if let Some(chapter) = self.chapter {
            journal.append(0, HostInput::SetGlobal { var: keys::VAR_CHAPTER, value: chapter });
        }
        if let Some(set) = self.start_set {
            journal.append(0, HostInput::MovePlayer { set: SetId(set), scene: SceneId(set.saturating_mul(10)) });
        }

        let mut scheduled: Vec<&ScheduledInput> = self.inputs.iter().collect();
        scheduled.sort_by_key(|scheduled| scheduled.tick);
        for entry in scheduled {
            journal.append(entry.tick, entry.input.clone());
        }
        journal
    }
}
