use thiserror::Error;
use tracing::debug;

use crate::director::Director;
use crate::error::ScriptError;
use crate::journal::InputJournal;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplayError {
    #[error("journal was recorded against content {recorded:#x}, current content is {current:#x}")]
    ContentMismatch { recorded: u64, current: u64 },
    #[error("input {seq} is scheduled for tick {tick}, after the run ended at {run_ticks}")]
    InputPastEnd { seq: u64, tick: u64, run_ticks: u64 },
    #[error("script failure at tick {tick}: {source}")]
    Script {
        tick: u64,
        #[source]
        source: ScriptError,
    },
}

#[derive(Debug, PartialEq, Eq)]
pub struct ReplayResult {
    pub final_snapshot_hash: u64,
    pub final_tick: u64,
    pub log_len: usize,
}

/// Drives a fresh [`Director`] through a recorded journal.
///
/// A `content_hash` of zero skips the content check, matching journals
/// written by hand.
pub fn replay_to_end(journal: &InputJournal) -> Result<ReplayResult, ReplayError> {
    let director = replay_director(journal)?;
    Ok(ReplayResult {
        final_snapshot_hash: director.snapshot_hash(),
        final_tick: director.current_tick(),
        log_len: director.log().len(),
    })
}

/// Same as [`replay_to_end`] but hands back the director for inspection.
pub fn replay_director(journal: &InputJournal) -> Result<Director, ReplayError> {
    if let Some(record) = journal.inputs.iter().find(|record| record.tick > journal.run_ticks) {
        return Err(ReplayError::InputPastEnd {
            seq: record.seq,
            tick: record.tick,
            run_ticks: journal.run_ticks,
        });
    }

    let mut director = Director::with_default_scripts(journal.seed)
        .map_err(|source| ReplayError::Script { tick: 0, source })?;
    let current = director.content().content_hash();
    if journal.content_hash != 0 && journal.content_hash != current {
        return Err(ReplayError::ContentMismatch { recorded: journal.content_hash, current });
    }

    let mut pending = journal.inputs.iter().peekable();
    for tick in 0..=journal.run_ticks {
        while let Some(record) = pending.next_if(|record| record.tick <= tick) {
            debug!(seq = record.seq, tick, input = ?record.input, "replaying input");
            director.apply(&record.input).map_err(|source| ReplayError::Script { tick, source })?;
        }
        if tick < journal.run_ticks {
            director.tick(journal.tick_ms).map_err(|source| ReplayError::Script { tick, source })?;
        }
    }
    Ok(director)
}
