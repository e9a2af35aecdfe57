use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::mem;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

use crate::error::ScriptError;
use crate::movement::{Motion, MovementTrack};
use crate::types::*;

pub const DEFAULT_FRIENDLINESS: i32 = 50;
pub const MAX_FRIENDLINESS: i32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CombatState {
    pub target: Option<ActorId>,
}

#[derive(Clone, Debug)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub set: SetId,
    pub position: Vec3,
    pub heading: u16,
    pub goal: Goal,
    /// `None` until the first mode change, so that one always dispatches.
    pub animation_mode: Option<AnimationMode>,
    pub frame: AnimationFrame,
    pub frame_timer_ms: u32,
    pub hp: i32,
    pub max_hp: i32,
    pub score: i32,
    pub friendliness: BTreeMap<ActorId, i32>,
    pub clues: BTreeSet<ClueId>,
    /// Clues not yet uploaded to the mainframe.
    pub new_clues: BTreeSet<ClueId>,
    pub combat: Option<CombatState>,
    pub retired: bool,
    pub track: MovementTrack,
    pub motion: Motion,
    pub timers: [Option<u32>; 3],
}

impl Actor {
    pub fn new(id: ActorId, name: &str, set: SetId, position: Vec3, max_hp: i32) -> Self {
        Self {
            id,
            name: name.to_string(),
            set,
            position,
            heading: 0,
            goal: Goal(0),
            animation_mode: None,
            frame: AnimationFrame { animation: AnimationId(0), frame: 0 },
            frame_timer_ms: 0,
            hp: max_hp,
            max_hp,
            score: 0,
            friendliness: BTreeMap::new(),
            clues: BTreeSet::new(),
            new_clues: BTreeSet::new(),
            combat: None,
            retired: false,
            track: MovementTrack::new(),
            motion: Motion::Still,
            timers: [None; 3],
        }
    }

    pub fn friendliness_to(&self, other: ActorId) -> i32 {
        self.friendliness.get(&other).copied().unwrap_or(DEFAULT_FRIENDLINESS)
    }

    pub fn in_combat(&self) -> bool {
        self.combat.is_some()
    }

    pub fn timer(&self, timer: CustomTimer) -> Option<u32> {
        self.timers[timer.slot()]
    }
}

/// Deferred callback produced while a script runs; delivered once it returns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Notice {
    GoalChanged { actor: ActorId, from: Goal, to: Goal },
    AnimationMode { actor: ActorId, mode: AnimationMode },
    EnteredSet { actor: ActorId, set: SetId },
    OtherEnteredSet { actor: ActorId, other: ActorId },
    OtherExitedSet { actor: ActorId, other: ActorId },
    OtherCombat { actor: ActorId, other: ActorId, toggle: CombatToggle },
    ClueReceived { actor: ActorId, clue: ClueId, from: Option<ActorId> },
    Retired { actor: ActorId, by: Option<ActorId> },
}

impl Notice {
    pub(crate) fn actor(&self) -> ActorId {
        match *self {
            Self::GoalChanged { actor, .. }
            | Self::AnimationMode { actor, .. }
            | Self::EnteredSet { actor, .. }
            | Self::OtherEnteredSet { actor, .. }
            | Self::OtherExitedSet { actor, .. }
            | Self::OtherCombat { actor, .. }
            | Self::ClueReceived { actor, .. }
            | Self::Retired { actor, .. } => actor,
        }
    }
}

pub struct WorldState {
    pub actors: BTreeMap<ActorId, Actor>,
    pub player: ActorId,
    pub player_scene: SceneId,
    flags: BTreeSet<FlagId>,
    globals: BTreeMap<VariableId, i32>,
    mainframe: BTreeSet<ClueId>,
    rng: ChaCha8Rng,
    log: Vec<LogEvent>,
    pub(crate) notices: VecDeque<Notice>,
    pub(crate) time_ms: u64,
}

impl WorldState {
    pub fn new(seed: u64, player: ActorId) -> Self {
        Self {
            actors: BTreeMap::new(),
            player,
            player_scene: SceneId(0),
            flags: BTreeSet::new(),
            globals: BTreeMap::new(),
            mainframe: BTreeSet::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            log: Vec::new(),
            notices: VecDeque::new(),
            time_ms: 0,
        }
    }

    pub fn actor(&self, id: ActorId) -> Result<&Actor, ScriptError> {
        self.actors.get(&id).ok_or(ScriptError::UnknownActor(id))
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Result<&mut Actor, ScriptError> {
        self.actors.get_mut(&id).ok_or(ScriptError::UnknownActor(id))
    }

    pub fn actor_ids(&self) -> Vec<ActorId> {
        self.actors.keys().copied().collect()
    }

    pub fn actors_in_set(&self, set: SetId) -> Vec<ActorId> {
        self.actors.values().filter(|a| a.set == set).map(|a| a.id).collect()
    }

    pub fn player_set(&self) -> Option<SetId> {
        self.actors.get(&self.player).map(|a| a.set)
    }

    pub fn time_ms(&self) -> u64 {
        self.time_ms
    }

    pub fn log(&self) -> &[LogEvent] {
        &self.log
    }

    pub(crate) fn push_log(&mut self, event: LogEvent) {
        self.log.push(event);
    }

    pub fn flag(&self, flag: FlagId) -> bool {
        self.flags.contains(&flag)
    }

    pub fn set_flag(&mut self, flag: FlagId) {
        self.flags.insert(flag);
    }

    pub fn reset_flag(&mut self, flag: FlagId) {
        self.flags.remove(&flag);
    }

    pub fn flags(&self) -> impl Iterator<Item = FlagId> + '_ {
        self.flags.iter().copied()
    }

    pub fn global(&self, var: VariableId) -> i32 {
        self.globals.get(&var).copied().unwrap_or(0)
    }

    pub fn set_global(&mut self, var: VariableId, value: i32) {
        self.globals.insert(var, value);
    }

    pub fn increment_global(&mut self, var: VariableId, by: i32) -> i32 {
        let slot = self.globals.entry(var).or_insert(0);
        *slot = slot.saturating_add(by);
        *slot
    }

    pub fn globals(&self) -> impl Iterator<Item = (VariableId, i32)> + '_ {
        self.globals.iter().map(|(k, v)| (*k, *v))
    }

    /// Uniform integer in `min..=max`.
    pub fn random_query(&mut self, min: i32, max: i32) -> i32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let span = (i64::from(hi) - i64::from(lo) + 1) as u64;
        // Draws below 2^64 mod span would favour the low values.
        let reject_below = span.wrapping_neg() % span;
        let roll = loop {
            let draw = self.rng.next_u64();
            if draw >= reject_below {
                break draw % span;
            }
        };
        (i64::from(lo) + roll as i64) as i32
    }

    /// Next draw of the random source, without consuming it.
    pub(crate) fn rng_fingerprint(&self) -> u64 {
        self.rng.clone().next_u64()
    }

    pub fn mainframe(&self) -> &BTreeSet<ClueId> {
        &self.mainframe
    }

    pub(crate) fn notify(&mut self, notice: Notice) {
        self.notices.push_back(notice);
    }

    pub fn set_goal(&mut self, id: ActorId, goal: Goal) -> Result<(), ScriptError> {
        let actor = self.actor_mut(id)?;
        let from = actor.goal;
        if from == goal {
            return Ok(());
        }
        actor.goal = goal;
        self.notify(Notice::GoalChanged { actor: id, from, to: goal });
        Ok(())
    }

    /// Queues a mode change when the mode differs or `force` is set.
    pub fn change_animation_mode(
        &mut self,
        id: ActorId,
        mode: AnimationMode,
        force: bool,
    ) -> Result<(), ScriptError> {
        let actor = self.actor_mut(id)?;
        if !force && actor.animation_mode == Some(mode) {
            return Ok(());
        }
        actor.animation_mode = Some(mode);
        self.notify(Notice::AnimationMode { actor: id, mode });
        Ok(())
    }

    pub fn put_in_set(&mut self, id: ActorId, set: SetId) -> Result<(), ScriptError> {
        let old = self.actor(id)?.set;
        if old == set {
            return Ok(());
        }
        for other in self.actors_in_set(old) {
            if other != id {
                self.notify(Notice::OtherExitedSet { actor: other, other: id });
            }
        }
        self.actor_mut(id)?.set = set;
        self.push_log(LogEvent::EnteredSet { actor: id, set });
        self.notify(Notice::EnteredSet { actor: id, set });
        for other in self.actors_in_set(set) {
            if other != id {
                self.notify(Notice::OtherEnteredSet { actor: other, other: id });
            }
        }
        Ok(())
    }

    /// Returns whether the clue was new to the actor.
    pub fn acquire_clue(
        &mut self,
        id: ActorId,
        clue: ClueId,
        from: Option<ActorId>,
    ) -> Result<bool, ScriptError> {
        let actor = self.actor_mut(id)?;
        if !actor.clues.insert(clue) {
            return Ok(false);
        }
        actor.new_clues.insert(clue);
        self.push_log(LogEvent::ClueAcquired { actor: id, clue, from });
        self.notify(Notice::ClueReceived { actor: id, clue, from });
        Ok(true)
    }

    pub fn transfer_new_clues_to_mainframe(&mut self, id: ActorId) -> Result<usize, ScriptError> {
        let actor = self.actor_mut(id)?;
        let uploaded: Vec<ClueId> = mem::take(&mut actor.new_clues).into_iter().collect();
        let count = uploaded.len();
        self.mainframe.extend(uploaded);
        Ok(count)
    }

    /// Downloads mainframe clues the actor lacks. Mainframe clues carry no sender.
    pub fn transfer_new_clues_from_mainframe(&mut self, id: ActorId) -> Result<usize, ScriptError> {
        let known = &self.actor(id)?.clues;
        let missing: Vec<ClueId> =
            self.mainframe.iter().filter(|c| !known.contains(c)).copied().collect();
        for clue in &missing {
            self.acquire_clue(id, *clue, None)?;
        }
        if let Ok(actor) = self.actor_mut(id) {
            for clue in &missing {
                actor.new_clues.remove(clue);
            }
        }
        Ok(missing.len())
    }

    pub fn modify_friendliness(
        &mut self,
        id: ActorId,
        toward: ActorId,
        delta: i32,
    ) -> Result<i32, ScriptError> {
        let actor = self.actor_mut(id)?;
        let value = (actor.friendliness_to(toward) + delta).clamp(0, MAX_FRIENDLINESS);
        actor.friendliness.insert(toward, value);
        self.push_log(LogEvent::FriendlinessChanged { actor: id, toward, value });
        Ok(value)
    }

    pub fn set_friendliness(
        &mut self,
        id: ActorId,
        toward: ActorId,
        value: i32,
    ) -> Result<(), ScriptError> {
        let value = value.clamp(0, MAX_FRIENDLINESS);
        self.actor_mut(id)?.friendliness.insert(toward, value);
        self.push_log(LogEvent::FriendlinessChanged { actor: id, toward, value });
        Ok(())
    }

    pub fn combat_on(&mut self, id: ActorId, target: Option<ActorId>) -> Result<(), ScriptError> {
        let actor = self.actor_mut(id)?;
        if actor.retired {
            return Err(ScriptError::ActorRetired(id));
        }
        let was_in_combat = actor.in_combat();
        actor.combat = Some(CombatState { target });
        self.change_animation_mode(id, AnimationMode::COMBAT_IDLE, false)?;
        if !was_in_combat {
            self.push_log(LogEvent::Combat { actor: id, toggle: CombatToggle::On, target });
            self.notify_combat_witnesses(id, CombatToggle::On)?;
        }
        Ok(())
    }

    pub fn combat_off(&mut self, id: ActorId) -> Result<(), ScriptError> {
        let actor = self.actor_mut(id)?;
        if actor.combat.take().is_none() {
            return Ok(());
        }
        let retired = actor.retired;
        self.push_log(LogEvent::Combat { actor: id, toggle: CombatToggle::Off, target: None });
        if !retired {
            self.change_animation_mode(id, AnimationMode::IDLE, false)?;
        }
        self.notify_combat_witnesses(id, CombatToggle::Off)
    }

    fn notify_combat_witnesses(&mut self, id: ActorId, toggle: CombatToggle) -> Result<(), ScriptError> {
        let set = self.actor(id)?.set;
        for witness in self.actors_in_set(set) {
            if witness != id {
                self.notify(Notice::OtherCombat { actor: witness, other: id, toggle });
            }
        }
        Ok(())
    }

    /// Marks the actor dead, stops its legs and plays the matching death mode.
    pub fn retire(&mut self, id: ActorId, by: Option<ActorId>) -> Result<(), ScriptError> {
        let actor = self.actor_mut(id)?;
        if actor.retired {
            return Ok(());
        }
        let died_in_combat = actor.combat.take().is_some();
        actor.retired = true;
        actor.hp = 0;
        actor.track.flush();
        actor.motion = Motion::Still;
        actor.timers = [None; 3];
        let mode = if died_in_combat { AnimationMode::COMBAT_DIE } else { AnimationMode::DIE };
        self.push_log(LogEvent::Retired { actor: id, by });
        self.change_animation_mode(id, mode, false)?;
        self.notify(Notice::Retired { actor: id, by });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER: ActorId = ActorId(0);
    const OTHER: ActorId = ActorId(1);
    const THIRD: ActorId = ActorId(2);

    fn world() -> WorldState {
        let mut world = WorldState::new(7, PLAYER);
        world.actors.insert(PLAYER, Actor::new(PLAYER, "player", SetId(1), Vec3::default(), 10));
        world.actors.insert(OTHER, Actor::new(OTHER, "other", SetId(1), Vec3::default(), 10));
        world.actors.insert(THIRD, Actor::new(THIRD, "third", SetId(2), Vec3::default(), 10));
        world
    }

    #[test]
    fn setting_same_goal_queues_nothing() {
        let mut world = world();
        world.set_goal(OTHER, Goal(0)).unwrap();
        assert!(world.notices.is_empty());
        world.set_goal(OTHER, Goal(5)).unwrap();
        assert_eq!(
            world.notices.pop_front(),
            Some(Notice::GoalChanged { actor: OTHER, from: Goal(0), to: Goal(5) })
        );
    }

    #[test]
    fn animation_mode_dedups_unless_forced() {
        let mut world = world();
        world.change_animation_mode(OTHER, AnimationMode::WALK, false).unwrap();
        world.change_animation_mode(OTHER, AnimationMode::WALK, false).unwrap();
        assert_eq!(world.notices.len(), 1);
        world.change_animation_mode(OTHER, AnimationMode::WALK, true).unwrap();
        assert_eq!(world.notices.len(), 2);
    }

    #[test]
    fn moving_between_sets_notifies_both_sides() {
        let mut world = world();
        world.put_in_set(OTHER, SetId(2)).unwrap();
        let notices: Vec<Notice> = world.notices.drain(..).collect();
        assert_eq!(
            notices,
            vec![
                Notice::OtherExitedSet { actor: PLAYER, other: OTHER },
                Notice::EnteredSet { actor: OTHER, set: SetId(2) },
                Notice::OtherEnteredSet { actor: THIRD, other: OTHER },
            ]
        );
    }

    #[test]
    fn random_query_is_inclusive_and_seeded() {
        let mut a = world();
        let mut b = world();
        let rolls_a: Vec<i32> = (0..64).map(|_| a.random_query(1, 3)).collect();
        let rolls_b: Vec<i32> = (0..64).map(|_| b.random_query(3, 1)).collect();
        assert_eq!(rolls_a, rolls_b);
        assert!(rolls_a.iter().all(|r| (1..=3).contains(r)));
        assert!(rolls_a.contains(&1) && rolls_a.contains(&3));
    }

    #[test]
    fn random_query_handles_wide_and_single_value_ranges() {
        let mut world = world();
        let (lo, hi) = (i32::MIN, 1_073_741_823);
        for _ in 0..256 {
            let roll = world.random_query(lo, hi);
            assert!((lo..=hi).contains(&roll));
        }
        assert_eq!(world.random_query(7, 7), 7);
        let full: Vec<i32> = (0..64).map(|_| world.random_query(i32::MIN, i32::MAX)).collect();
        assert!(full.iter().any(|r| *r < 0) && full.iter().any(|r| *r > 0));
    }

    #[test]
    fn rng_fingerprint_peeks_without_consuming() {
        let mut world = world();
        let before = world.rng_fingerprint();
        assert_eq!(world.rng_fingerprint(), before);
        world.random_query(0, 9);
        assert_ne!(world.rng_fingerprint(), before);
    }

    #[test]
    fn friendliness_is_clamped() {
        let mut world = world();
        assert_eq!(world.modify_friendliness(OTHER, PLAYER, 80).unwrap(), MAX_FRIENDLINESS);
        assert_eq!(world.modify_friendliness(OTHER, PLAYER, -500).unwrap(), 0);
    }

    #[test]
    fn duplicate_clue_is_not_new() {
        let mut world = world();
        assert!(world.acquire_clue(OTHER, ClueId(4), Some(PLAYER)).unwrap());
        assert!(!world.acquire_clue(OTHER, ClueId(4), None).unwrap());
        assert_eq!(world.notices.len(), 1);
    }

    #[test]
    fn mainframe_round_trip_shares_clues() {
        let mut world = world();
        world.acquire_clue(PLAYER, ClueId(9), None).unwrap();
        assert_eq!(world.transfer_new_clues_to_mainframe(PLAYER).unwrap(), 1);
        assert_eq!(world.transfer_new_clues_to_mainframe(PLAYER).unwrap(), 0);
        assert_eq!(world.transfer_new_clues_from_mainframe(OTHER).unwrap(), 1);
        let other = world.actor(OTHER).unwrap();
        assert!(other.clues.contains(&ClueId(9)));
        assert!(other.new_clues.is_empty());
    }

    #[test]
    fn combat_toggle_notifies_only_witnesses_in_set() {
        let mut world = world();
        world.combat_on(PLAYER, Some(OTHER)).unwrap();
        let witnesses: Vec<ActorId> = world
            .notices
            .iter()
            .filter(|n| matches!(n, Notice::OtherCombat { .. }))
            .map(Notice::actor)
            .collect();
        assert_eq!(witnesses, vec![OTHER]);
        assert_eq!(world.actor(PLAYER).unwrap().animation_mode, Some(AnimationMode::COMBAT_IDLE));
    }

    #[test]
    fn retire_is_idempotent_and_clears_combat() {
        let mut world = world();
        world.combat_on(OTHER, Some(PLAYER)).unwrap();
        world.notices.clear();
        world.retire(OTHER, Some(PLAYER)).unwrap();
        world.retire(OTHER, Some(PLAYER)).unwrap();
        let actor = world.actor(OTHER).unwrap();
        assert!(actor.retired);
        assert!(!actor.in_combat());
        assert_eq!(actor.animation_mode, Some(AnimationMode::COMBAT_DIE));
        let retired = world.notices.iter().filter(|n| matches!(n, Notice::Retired { .. })).count();
        assert_eq!(retired, 1);
        assert_eq!(world.combat_on(OTHER, None), Err(ScriptError::ActorRetired(OTHER)));
    }
}
