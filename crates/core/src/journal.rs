use serde::{Deserialize, Serialize};

use crate::types::*;

pub const JOURNAL_FORMAT_VERSION: u16 = 1;

/// Everything a recorded run needs to be reproduced: the seed, the tick
/// length, how long it ran, and the host inputs applied along the way.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputJournal {
    pub format_version: u16,
    pub build_id: String,
    pub content_hash: u64,
    pub seed: u64,
    pub tick_ms: u32,
    pub run_ticks: u64,
    pub inputs: Vec<InputRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    pub seq: u64,
    /// Inputs are applied before the tick with this number runs.
    pub tick: u64,
    pub input: HostInput,
}

/// Host-side events the engine feeds into the script runtime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostInput {
    ClickActor { actor: ActorId },
    Shoot { target: ActorId, shooter: ActorId, hit: bool, damage: i32 },
    Retire { actor: ActorId, by: Option<ActorId> },
    GiveClue { actor: ActorId, clue: ClueId, from: Option<ActorId> },
    MovePlayer { set: SetId, scene: SceneId },
    PlayerCombat { on: bool },
    SetFlag { flag: FlagId, on: bool },
    SetGlobal { var: VariableId, value: i32 },
    SetGoal { actor: ActorId, goal: Goal },
}

impl InputJournal {
    pub fn new(seed: u64, tick_ms: u32) -> Self {
        Self {
            format_version: JOURNAL_FORMAT_VERSION,
            build_id: "dev".to_string(),
            content_hash: 0,
            seed,
            tick_ms,
            run_ticks: 0,
            inputs: Vec::new(),
        }
    }

    pub fn append(&mut self, tick: u64, input: HostInput) {
        let seq = self.inputs.len() as u64;
        self.inputs.push(InputRecord { seq, tick, input });
    }

    /// Inputs scheduled for `tick`, in recording order.
    pub fn inputs_at(&self, tick: u64) -> impl Iterator<Item = &HostInput> + '_ {
        self.inputs.iter().filter(move |record| record.tick == tick).map(|record| &record.input)
    }
}
