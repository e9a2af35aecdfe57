//! Movement tracks: the queued waypoint walks scripts hand to their actors.

use serde::{Deserialize, Serialize};

use crate::types::{AnimationMode, Vec3, WaypointId};

/// Upper bound on queued entries per actor; further appends are dropped.
pub const MAX_TRACK_ENTRIES: usize = 100;

/// World units per second.
pub const WALK_SPEED: f32 = 48.0;
pub const RUN_SPEED: f32 = 120.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackEntry {
    pub waypoint: WaypointId,
    /// Pause after arriving, in milliseconds.
    pub delay_ms: u32,
    /// Heading to face on arrival.
    pub heading: Option<u16>,
    pub run: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MovementTrack {
    entries: Vec<TrackEntry>,
    index: usize,
    active: bool,
    paused: bool,
}

impl MovementTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flush(&mut self) {
        self.entries.clear();
        self.index = 0;
        self.active = false;
    }

    /// Returns `false` when the track is full.
    pub fn append(&mut self, entry: TrackEntry) -> bool {
        if self.entries.len() >= MAX_TRACK_ENTRIES {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Rewinds to the first entry and starts walking.
    pub fn repeat(&mut self) {
        self.index = 0;
        self.active = !self.entries.is_empty();
    }

    /// Stops following the track without dropping its entries.
    pub fn halt(&mut self) {
        self.active = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn unpause(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the next entry [`MovementTrack::next`] hands out.
    pub fn cursor(&self) -> usize {
        self.index
    }

    pub fn entries(&self) -> &[TrackEntry] {
        &self.entries
    }

    /// Next entry to walk. Returns `None` exactly once when an active track
    /// runs out, after which the track is inactive.
    pub fn next(&mut self) -> Option<TrackEntry> {
        if !self.active {
            return None;
        }
        match self.entries.get(self.index).copied() {
            Some(entry) => {
                self.index += 1;
                Some(entry)
            }
            None => {
                self.active = false;
                None
            }
        }
    }
}

/// Mode played while following a track entry.
pub fn locomotion_mode(run: bool, in_combat: bool) -> AnimationMode {
    match (run, in_combat) {
        (false, false) => AnimationMode::WALK,
        (true, false) => AnimationMode::RUN,
        (false, true) => AnimationMode::COMBAT_WALK,
        (true, true) => AnimationMode::COMBAT_RUN,
    }
}

/// Mode played when an actor stops on or between waypoints.
pub fn standing_mode(in_combat: bool) -> AnimationMode {
    if in_combat { AnimationMode::COMBAT_IDLE } else { AnimationMode::IDLE }
}

/// What an actor's legs are doing right now.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Motion {
    #[default]
    Still,
    Walking { entry: TrackEntry, target: Vec3 },
    /// Parked at a waypoint until the delay runs out.
    Waiting { remaining_ms: u32 },
}

impl Motion {
    pub fn is_walking(&self) -> bool {
        matches!(self, Self::Walking { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(waypoint: u16, delay_ms: u32) -> TrackEntry {
        TrackEntry { waypoint: WaypointId(waypoint), delay_ms, heading: None, run: false }
    }

    #[test]
    fn appended_entries_need_repeat_to_start() {
        let mut track = MovementTrack::new();
        track.append(entry(1, 0));
        assert_eq!(track.next(), None);
        track.repeat();
        assert_eq!(track.next().map(|e| e.waypoint), Some(WaypointId(1)));
    }

    #[test]
    fn exhausted_track_reports_end_once() {
        let mut track = MovementTrack::new();
        track.append(entry(1, 0));
        track.append(entry(2, 500));
        track.repeat();
        assert!(track.next().is_some());
        assert_eq!(track.next().map(|e| e.delay_ms), Some(500));
        assert!(track.is_active());
        assert_eq!(track.next(), None);
        assert!(!track.is_active());
        assert_eq!(track.next(), None);
    }

    #[test]
    fn repeat_rewinds_to_first_entry() {
        let mut track = MovementTrack::new();
        track.append(entry(7, 0));
        track.append(entry(8, 0));
        track.repeat();
        track.next();
        track.next();
        track.repeat();
        assert_eq!(track.next().map(|e| e.waypoint), Some(WaypointId(7)));
    }

    #[test]
    fn repeat_on_empty_track_stays_inactive() {
        let mut track = MovementTrack::new();
        track.repeat();
        assert!(!track.is_active());
    }

    #[test]
    fn flush_clears_entries_and_stops() {
        let mut track = MovementTrack::new();
        track.append(entry(1, 0));
        track.repeat();
        track.flush();
        assert!(track.is_empty());
        assert!(!track.is_active());
    }

    #[test]
    fn append_is_capped() {
        let mut track = MovementTrack::new();
        for i in 0..MAX_TRACK_ENTRIES {
            assert!(track.append(entry(i as u16, 0)));
        }
        assert!(!track.append(entry(999, 0)));
        assert_eq!(track.len(), MAX_TRACK_ENTRIES);
    }

    #[test]
    fn halted_track_keeps_entries_until_repeated() {
        let mut track = MovementTrack::new();
        track.append(entry(4, 0));
        track.append(entry(5, 0));
        track.repeat();
        track.next();
        track.halt();
        assert_eq!(track.next(), None);
        assert_eq!(track.len(), 2);
        track.repeat();
        assert_eq!(track.next().map(|e| e.waypoint), Some(WaypointId(4)));
    }

    #[test]
    fn pause_flag_is_independent_of_entries() {
        let mut track = MovementTrack::new();
        track.pause();
        track.flush();
        assert!(track.is_paused());
        track.unpause();
        assert!(!track.is_paused());
    }
}
