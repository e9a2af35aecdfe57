//! The script-facing host API.
//!
//! A [`ScriptContext`] borrows the world for the duration of one callback.
//! Every call is traced on the `actor_ai::script` target, mirroring the
//! per-call debug channel of the host engine.

use tracing::{debug, trace, warn};

use crate::animation::AnimationLibrary;
use crate::content::ContentPack;
use crate::error::ScriptError;
use crate::movement::{Motion, TrackEntry, standing_mode};
use crate::script::ScriptResult;
use crate::state::WorldState;
use crate::types::*;

const TARGET: &str = "actor_ai::script";

pub struct ScriptContext<'a> {
    world: &'a mut WorldState,
    content: &'a ContentPack,
    me: ActorId,
}

impl<'a> ScriptContext<'a> {
    pub(crate) fn new(world: &'a mut WorldState, content: &'a ContentPack, me: ActorId) -> Self {
        Self { world, content, me }
    }

    /// The actor whose script is running.
    pub fn me(&self) -> ActorId {
        self.me
    }

    pub fn player(&self) -> ActorId {
        self.world.player
    }

    pub fn animations(&self) -> &'a AnimationLibrary {
        &self.content.animations
    }

    pub fn time_ms(&self) -> u64 {
        self.world.time_ms()
    }

    // -- goals -------------------------------------------------------------

    pub fn goal(&self, actor: ActorId) -> ScriptResult<Goal> {
        Ok(self.world.actor(actor)?.goal)
    }

    pub fn my_goal(&self) -> ScriptResult<Goal> {
        self.goal(self.me)
    }

    pub fn set_goal(&mut self, actor: ActorId, goal: Goal) -> ScriptResult {
        debug!(target: TARGET, %actor, %goal, "set goal");
        self.world.set_goal(actor, goal)
    }

    pub fn set_my_goal(&mut self, goal: Goal) -> ScriptResult {
        self.set_goal(self.me, goal)
    }

    // -- flags, globals, random ----------------------------------------------

    pub fn flag(&self, flag: FlagId) -> bool {
        trace!(target: TARGET, %flag, "query flag");
        self.world.flag(flag)
    }

    pub fn set_flag(&mut self, flag: FlagId) {
        debug!(target: TARGET, %flag, "set flag");
        self.world.set_flag(flag);
    }

    pub fn reset_flag(&mut self, flag: FlagId) {
        debug!(target: TARGET, %flag, "reset flag");
        self.world.reset_flag(flag);
    }

    pub fn global(&self, var: VariableId) -> i32 {
        self.world.global(var)
    }

    pub fn set_global(&mut self, var: VariableId, value: i32) {
        debug!(target: TARGET, %var, value, "set global");
        self.world.set_global(var, value);
    }

    pub fn increment_global(&mut self, var: VariableId, by: i32) -> i32 {
        debug!(target: TARGET, %var, by, "increment global");
        self.world.increment_global(var, by)
    }

    /// Uniform integer in `min..=max`.
    pub fn random(&mut self, min: i32, max: i32) -> i32 {
        let roll = self.world.random_query(min, max);
        trace!(target: TARGET, min, max, roll, "random query");
        roll
    }

    // -- speech and facing ---------------------------------------------------

    pub fn says(&mut self, actor: ActorId, line: LineId) -> ScriptResult {
        self.world.actor(actor)?;
        debug!(target: TARGET, %actor, %line, "says");
        self.world.push_log(LogEvent::Said { actor, line });
        Ok(())
    }

    pub fn face_actor(&mut self, actor: ActorId, other: ActorId) -> ScriptResult {
        let target = self.world.actor(other)?.position;
        let me = self.world.actor_mut(actor)?;
        me.heading = me.position.heading_to(target);
        debug!(target: TARGET, %actor, %other, heading = me.heading, "face actor");
        Ok(())
    }

    pub fn face_waypoint(&mut self, actor: ActorId, waypoint: WaypointId) -> ScriptResult {
        let target = self.content.waypoints.get(waypoint)?.position;
        let me = self.world.actor_mut(actor)?;
        me.heading = me.position.heading_to(target);
        debug!(target: TARGET, %actor, %waypoint, "face waypoint");
        Ok(())
    }

    pub fn face_heading(&mut self, actor: ActorId, heading: u16) -> ScriptResult {
        self.world.actor_mut(actor)?.heading = heading % 1024;
        Ok(())
    }

    // -- placement -----------------------------------------------------------

    pub fn actor_set(&self, actor: ActorId) -> ScriptResult<SetId> {
        Ok(self.world.actor(actor)?.set)
    }

    pub fn in_set(&self, actor: ActorId, set: SetId) -> ScriptResult<bool> {
        Ok(self.world.actor(actor)?.set == set)
    }

    pub fn same_set(&self, a: ActorId, b: ActorId) -> ScriptResult<bool> {
        Ok(self.world.actor(a)?.set == self.world.actor(b)?.set)
    }

    pub fn player_set(&self) -> Option<SetId> {
        self.world.player_set()
    }

    pub fn player_scene(&self) -> SceneId {
        self.world.player_scene
    }

    pub fn position(&self, actor: ActorId) -> ScriptResult<Vec3> {
        Ok(self.world.actor(actor)?.position)
    }

    /// Distance between two actors, `None` when they stand in different sets.
    pub fn distance(&self, a: ActorId, b: ActorId) -> ScriptResult<Option<f32>> {
        let (a, b) = (self.world.actor(a)?, self.world.actor(b)?);
        Ok((a.set == b.set).then(|| a.position.distance(b.position)))
    }

    pub fn put_in_set(&mut self, actor: ActorId, set: SetId) -> ScriptResult {
        debug!(target: TARGET, %actor, %set, "put in set");
        self.world.put_in_set(actor, set)
    }

    pub fn set_at_waypoint(
        &mut self,
        actor: ActorId,
        waypoint: WaypointId,
        heading: u16,
    ) -> ScriptResult {
        let wp = self.content.waypoints.get(waypoint)?;
        debug!(target: TARGET, %actor, %waypoint, heading, "set at waypoint");
        self.world.put_in_set(actor, wp.set)?;
        let me = self.world.actor_mut(actor)?;
        me.position = wp.position;
        me.heading = heading % 1024;
        Ok(())
    }

    // -- movement tracks -----------------------------------------------------

    /// Drops every queued entry and stops the actor where it stands.
    pub fn track_flush(&mut self, actor: ActorId) -> ScriptResult {
        debug!(target: TARGET, %actor, "movement track flush");
        let me = self.world.actor_mut(actor)?;
        me.track.flush();
        let was_moving = me.motion != Motion::Still;
        me.motion = Motion::Still;
        if was_moving && !me.retired {
            let mode = standing_mode(me.in_combat());
            self.world.change_animation_mode(actor, mode, false)?;
        }
        Ok(())
    }

    pub fn track_append(&mut self, actor: ActorId, waypoint: WaypointId, delay_ms: u32) -> ScriptResult {
        self.push_entry(actor, TrackEntry { waypoint, delay_ms, heading: None, run: false })
    }

    pub fn track_append_with_facing(
        &mut self,
        actor: ActorId,
        waypoint: WaypointId,
        delay_ms: u32,
        heading: u16,
    ) -> ScriptResult {
        self.push_entry(actor, TrackEntry { waypoint, delay_ms, heading: Some(heading), run: false })
    }

    pub fn track_append_run(&mut self, actor: ActorId, waypoint: WaypointId, delay_ms: u32) -> ScriptResult {
        self.push_entry(actor, TrackEntry { waypoint, delay_ms, heading: None, run: true })
    }

    fn push_entry(&mut self, actor: ActorId, entry: TrackEntry) -> ScriptResult {
        if !self.content.waypoints.contains(entry.waypoint) {
            return Err(ScriptError::UnknownWaypoint(entry.waypoint));
        }
        debug!(target: TARGET, %actor, waypoint = %entry.waypoint, delay_ms = entry.delay_ms, run = entry.run, "movement track append");
        if !self.world.actor_mut(actor)?.track.append(entry) {
            warn!(target: TARGET, %actor, waypoint = %entry.waypoint, "movement track full, entry dropped");
        }
        Ok(())
    }

    /// Rewinds the track and sets the actor walking on the next tick.
    pub fn track_repeat(&mut self, actor: ActorId) -> ScriptResult {
        debug!(target: TARGET, %actor, "movement track repeat");
        self.world.actor_mut(actor)?.track.repeat();
        Ok(())
    }

    pub fn track_pause(&mut self, actor: ActorId) -> ScriptResult {
        debug!(target: TARGET, %actor, "movement track pause");
        self.world.actor_mut(actor)?.track.pause();
        Ok(())
    }

    pub fn track_unpause(&mut self, actor: ActorId) -> ScriptResult {
        debug!(target: TARGET, %actor, "movement track unpause");
        self.world.actor_mut(actor)?.track.unpause();
        Ok(())
    }

    pub fn track_is_active(&self, actor: ActorId) -> ScriptResult<bool> {
        let actor = self.world.actor(actor)?;
        Ok(actor.track.is_active() || actor.motion.is_walking())
    }

    // -- timers --------------------------------------------------------------

    pub fn timer_start(&mut self, actor: ActorId, timer: CustomTimer, duration_ms: u32) -> ScriptResult {
        debug!(target: TARGET, %actor, ?timer, duration_ms, "countdown timer start");
        self.world.actor_mut(actor)?.timers[timer.slot()] = Some(duration_ms);
        Ok(())
    }

    pub fn timer_reset(&mut self, actor: ActorId, timer: CustomTimer) -> ScriptResult {
        debug!(target: TARGET, %actor, ?timer, "countdown timer reset");
        self.world.actor_mut(actor)?.timers[timer.slot()] = None;
        Ok(())
    }

    pub fn timer_remaining(&self, actor: ActorId, timer: CustomTimer) -> ScriptResult<Option<u32>> {
        Ok(self.world.actor(actor)?.timer(timer))
    }

    // -- clues and friendliness ------------------------------------------------

    /// Returns whether the clue was new to the actor.
    pub fn clue_acquire(
        &mut self,
        actor: ActorId,
        clue: ClueId,
        from: Option<ActorId>,
    ) -> ScriptResult<bool> {
        debug!(target: TARGET, %actor, %clue, ?from, "clue acquire");
        self.world.acquire_clue(actor, clue, from)
    }

    pub fn clue_query(&self, actor: ActorId, clue: ClueId) -> ScriptResult<bool> {
        Ok(self.world.actor(actor)?.clues.contains(&clue))
    }

    pub fn clues_to_mainframe(&mut self, actor: ActorId) -> ScriptResult<usize> {
        let count = self.world.transfer_new_clues_to_mainframe(actor)?;
        debug!(target: TARGET, %actor, count, "clues uploaded to mainframe");
        Ok(count)
    }

    pub fn clues_from_mainframe(&mut self, actor: ActorId) -> ScriptResult<usize> {
        let count = self.world.transfer_new_clues_from_mainframe(actor)?;
        debug!(target: TARGET, %actor, count, "clues downloaded from mainframe");
        Ok(count)
    }

    pub fn friendliness(&self, actor: ActorId, toward: ActorId) -> ScriptResult<i32> {
        Ok(self.world.actor(actor)?.friendliness_to(toward))
    }

    pub fn modify_friendliness(&mut self, actor: ActorId, toward: ActorId, delta: i32) -> ScriptResult<i32> {
        debug!(target: TARGET, %actor, %toward, delta, "modify friendliness");
        self.world.modify_friendliness(actor, toward, delta)
    }

    pub fn set_friendliness(&mut self, actor: ActorId, toward: ActorId, value: i32) -> ScriptResult {
        debug!(target: TARGET, %actor, %toward, value, "set friendliness");
        self.world.set_friendliness(actor, toward, value)
    }

    // -- combat, health, score -------------------------------------------------

    pub fn combat_on(&mut self, actor: ActorId, target: Option<ActorId>) -> ScriptResult {
        debug!(target: TARGET, %actor, ?target, "combat mode on");
        self.world.combat_on(actor, target)
    }

    pub fn combat_off(&mut self, actor: ActorId) -> ScriptResult {
        debug!(target: TARGET, %actor, "combat mode off");
        self.world.combat_off(actor)
    }

    pub fn in_combat(&self, actor: ActorId) -> ScriptResult<bool> {
        Ok(self.world.actor(actor)?.in_combat())
    }

    pub fn is_retired(&self, actor: ActorId) -> ScriptResult<bool> {
        Ok(self.world.actor(actor)?.retired)
    }

    pub fn hp(&self, actor: ActorId) -> ScriptResult<i32> {
        Ok(self.world.actor(actor)?.hp)
    }

    pub fn retire(&mut self, actor: ActorId, by: Option<ActorId>) -> ScriptResult {
        debug!(target: TARGET, %actor, ?by, "retire");
        self.world.retire(actor, by)
    }

    pub fn score(&self, actor: ActorId) -> ScriptResult<i32> {
        Ok(self.world.actor(actor)?.score)
    }

    pub fn set_score(&mut self, actor: ActorId, score: i32) -> ScriptResult {
        debug!(target: TARGET, %actor, score, "set score");
        self.world.actor_mut(actor)?.score = score;
        self.world.push_log(LogEvent::ScoreChanged { actor, score });
        Ok(())
    }

    // -- animation -------------------------------------------------------------

    pub fn animation_mode(&self, actor: ActorId) -> ScriptResult<Option<AnimationMode>> {
        Ok(self.world.actor(actor)?.animation_mode)
    }

    pub fn change_animation_mode(&mut self, actor: ActorId, mode: AnimationMode) -> ScriptResult {
        debug!(target: TARGET, %actor, %mode, "change animation mode");
        self.world.change_animation_mode(actor, mode, false)
    }

    /// Re-dispatches the mode even when the actor is already in it.
    pub fn force_animation_mode(&mut self, actor: ActorId, mode: AnimationMode) -> ScriptResult {
        debug!(target: TARGET, %actor, %mode, "force animation mode");
        self.world.change_animation_mode(actor, mode, true)
    }
}
