//! Dispatch of world events to per-actor scripts.
//!
//! The [`Director`] owns the world, the content pack and one script per
//! actor. Every callback runs against a [`ScriptContext`]; the
//! notifications it queues are delivered in FIFO order once it returns.

use std::collections::BTreeMap;

use tracing::{debug, info, trace, warn};

use crate::animation::AnimationState;
use crate::content::ContentPack;
use crate::context::ScriptContext;
use crate::error::ScriptError;
use crate::journal::HostInput;
use crate::movement::{Motion, RUN_SPEED, TrackEntry, WALK_SPEED, locomotion_mode, standing_mode};
use crate::script::{AiScript, ScriptResult};
use crate::scripts;
use crate::state::{Actor, Notice, WorldState};
use crate::types::*;

mod hash;

/// Notifications one drain may deliver before the run is aborted.
pub const NOTICE_LIMIT: usize = 512;

pub struct Director {
    world: WorldState,
    content: ContentPack,
    scripts: BTreeMap<ActorId, Box<dyn AiScript>>,
    seed: u64,
    tick: u64,
}

impl Director {
    /// Builds the world from the content roster. Scripts are registered separately.
    pub fn new(seed: u64, content: ContentPack) -> Self {
        let mut world = WorldState::new(seed, content.player);
        for spec in &content.roster {
            world
                .actors
                .insert(spec.id, Actor::new(spec.id, spec.name, spec.set, spec.position, spec.max_hp));
        }
        Self { world, content, scripts: BTreeMap::new(), seed, tick: 0 }
    }

    /// Default content with the stock script for every actor, already initialized.
    pub fn with_default_scripts(seed: u64) -> ScriptResult<Self> {
        let mut director = Self::new(seed, ContentPack::build_default());
        for script in scripts::default_roster() {
            director.register(script)?;
        }
        director.initialize()?;
        Ok(director)
    }

    pub fn register(&mut self, script: Box<dyn AiScript>) -> ScriptResult {
        let id = script.actor();
        self.world.actor(id)?;
        if self.scripts.contains_key(&id) {
            return Err(ScriptError::DuplicateScript(id));
        }
        script.animator().profile().validate(id, &self.content.animations)?;
        self.scripts.insert(id, script);
        Ok(())
    }

    /// Runs every script's `Initialize` in actor order.
    pub fn initialize(&mut self) -> ScriptResult {
        if let Some(missing) = self.world.actor_ids().into_iter().find(|id| !self.scripts.contains_key(id)) {
            return Err(ScriptError::MissingScript(missing));
        }
        self.world.player_scene = self.player_scene_guess();
        for id in self.world.actor_ids() {
            self.call(id, |script, ctx| script.initialize(ctx))?;
        }
        Ok(())
    }

    fn player_scene_guess(&self) -> SceneId {
        self.world.player_set().map_or(SceneId(0), |set| SceneId(set.0.saturating_mul(10)))
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn content(&self) -> &ContentPack {
        &self.content
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn log(&self) -> &[LogEvent] {
        self.world.log()
    }

    pub fn query_animation_state(&self, id: ActorId) -> ScriptResult<AnimationState> {
        let script = self.scripts.get(&id).ok_or(ScriptError::MissingScript(id))?;
        Ok(script.query_animation_state())
    }

    /// Restores a previously queried animation quad.
    pub fn set_animation_state(&mut self, id: ActorId, state: AnimationState) -> ScriptResult {
        let script = self.scripts.get_mut(&id).ok_or(ScriptError::MissingScript(id))?;
        script.set_animation_state(state);
        Ok(())
    }

    // -- dispatch ----------------------------------------------------------------

    fn call_one<T>(
        &mut self,
        id: ActorId,
        f: impl FnOnce(&mut dyn AiScript, &mut ScriptContext<'_>) -> ScriptResult<T>,
    ) -> ScriptResult<T> {
        let Self { world, content, scripts, .. } = self;
        let script = scripts.get_mut(&id).ok_or(ScriptError::MissingScript(id))?;
        let mut ctx = ScriptContext::new(world, content, id);
        f(script.as_mut(), &mut ctx)
    }

    fn call<T>(
        &mut self,
        id: ActorId,
        f: impl FnOnce(&mut dyn AiScript, &mut ScriptContext<'_>) -> ScriptResult<T>,
    ) -> ScriptResult<T> {
        let value = self.call_one(id, f)?;
        self.drain()?;
        Ok(value)
    }

    fn drain(&mut self) -> ScriptResult {
        let mut delivered = 0;
        while let Some(notice) = self.world.notices.pop_front() {
            delivered += 1;
            if delivered > NOTICE_LIMIT {
                self.world.notices.clear();
                warn!(limit = NOTICE_LIMIT, "notification storm, aborting drain");
                return Err(ScriptError::NotificationStorm { limit: NOTICE_LIMIT });
            }
            if let Err(err) = self.deliver(notice) {
                self.world.notices.clear();
                return Err(err);
            }
        }
        Ok(())
    }

    fn deliver(&mut self, notice: Notice) -> ScriptResult {
        let id = notice.actor();
        if !self.scripts.contains_key(&id) {
            trace!(actor = %id, ?notice, "no script registered, notification dropped");
            return Ok(());
        }
        match notice {
            Notice::GoalChanged { actor, from, to } => {
                let handled = self.call_one(actor, |s, ctx| s.goal_changed(ctx, from, to))?;
                info!(%actor, %from, %to, handled, "goal changed");
                self.world.push_log(LogEvent::GoalChanged { actor, from, to, handled });
            }
            Notice::AnimationMode { actor, mode } => {
                let accepted = self.call_one(actor, |s, ctx| s.change_animation_mode(ctx, mode))?;
                if !accepted {
                    warn!(%actor, %mode, "animation mode not handled");
                }
                self.world.push_log(LogEvent::AnimationModeChanged { actor, mode, accepted });
            }
            Notice::EnteredSet { actor, set } => {
                self.call_one(actor, |s, ctx| s.entered_set(ctx, set))?;
            }
            Notice::OtherEnteredSet { actor, other } => {
                self.call_one(actor, |s, ctx| s.other_agent_entered_this_set(ctx, other))?;
            }
            Notice::OtherExitedSet { actor, other } => {
                self.call_one(actor, |s, ctx| s.other_agent_exited_this_set(ctx, other))?;
            }
            Notice::OtherCombat { actor, other, toggle } => {
                self.call_one(actor, |s, ctx| s.other_agent_entered_combat_mode(ctx, other, toggle))?;
            }
            Notice::ClueReceived { actor, clue, from } => {
                let about = from.unwrap_or(self.world.player);
                let delta = self
                    .scripts
                    .get(&actor)
                    .map_or(0, |s| s.friendliness_modifier_if_gets_clue(about, clue));
                if delta != 0 && about != actor {
                    self.world.modify_friendliness(actor, about, delta)?;
                }
                self.call_one(actor, |s, ctx| s.received_clue(ctx, clue, from))?;
            }
            Notice::Retired { actor, by } => {
                self.call_one(actor, |s, ctx| s.retired(ctx, by))?;
            }
        }
        Ok(())
    }

    // -- ticking -------------------------------------------------------------------

    /// Advances the world by `dt_ms`, visiting actors in id order.
    pub fn tick(&mut self, dt_ms: u32) -> ScriptResult {
        self.tick += 1;
        self.world.time_ms += u64::from(dt_ms);
        for id in self.world.actor_ids() {
            self.tick_actor(id, dt_ms)?;
        }
        Ok(())
    }

    fn tick_actor(&mut self, id: ActorId, dt_ms: u32) -> ScriptResult {
        if !self.world.actor(id)?.retired {
            self.call(id, |script, ctx| script.update(ctx))?;
        }

        let expired = self.advance_timers(id, dt_ms)?;
        for timer in &expired {
            match *timer {
                TimerId::Custom(timer) => {
                    debug!(actor = %id, ?timer, "timer expired");
                    self.world.push_log(LogEvent::TimerExpired { actor: id, timer });
                    self.call(id, |script, ctx| script.timer_expired(ctx, timer))?;
                }
                TimerId::MovementTrack => trace!(actor = %id, "waypoint delay over"),
                TimerId::AnimationFrame => {}
            }
        }

        self.step_movement(id, dt_ms)?;

        if expired.contains(&TimerId::AnimationFrame) {
            let frame = self.call(id, |script, ctx| script.update_animation(ctx))?;
            self.world.actor_mut(id)?.frame = frame;
        }
        Ok(())
    }

    /// Counts every timer down and reports the ones that ran out.
    fn advance_timers(&mut self, id: ActorId, dt_ms: u32) -> ScriptResult<Vec<TimerId>> {
        let animation = self.world.actor(id)?.frame.animation;
        let interval = self.content.animations.frame_interval_ms(animation);
        let actor = self.world.actor_mut(id)?;
        let mut expired = Vec::new();

        for timer in CustomTimer::ALL {
            let slot = &mut actor.timers[timer.slot()];
            if let Some(remaining) = *slot {
                if remaining <= dt_ms {
                    *slot = None;
                    expired.push(TimerId::Custom(timer));
                } else {
                    *slot = Some(remaining - dt_ms);
                }
            }
        }

        if let Motion::Waiting { remaining_ms } = actor.motion {
            if remaining_ms <= dt_ms {
                actor.motion = Motion::Still;
                expired.push(TimerId::MovementTrack);
            } else {
                actor.motion = Motion::Waiting { remaining_ms: remaining_ms - dt_ms };
            }
        }

        actor.frame_timer_ms = actor.frame_timer_ms.saturating_add(dt_ms);
        if actor.frame_timer_ms >= interval {
            actor.frame_timer_ms = (actor.frame_timer_ms - interval).min(interval);
            expired.push(TimerId::AnimationFrame);
        }
        Ok(expired)
    }

    fn step_movement(&mut self, id: ActorId, dt_ms: u32) -> ScriptResult {
        let actor = self.world.actor(id)?;
        if actor.retired || actor.track.is_paused() {
            return Ok(());
        }
        let (motion, following) = (actor.motion, actor.track.is_active());
        match motion {
            Motion::Waiting { .. } => Ok(()),
            Motion::Still if following => self.start_next_entry(id),
            Motion::Still => Ok(()),
            Motion::Walking { entry, target } => {
                let speed = if entry.run { RUN_SPEED } else { WALK_SPEED };
                let actor = self.world.actor_mut(id)?;
                let (position, arrived) =
                    actor.position.step_toward(target, speed * dt_ms as f32 / 1000.0);
                if !arrived {
                    actor.heading = actor.position.heading_to(target);
                }
                actor.position = position;
                if arrived { self.arrive(id, entry) } else { Ok(()) }
            }
        }
    }

    fn start_next_entry(&mut self, id: ActorId) -> ScriptResult {
        let next = self.world.actor_mut(id)?.track.next();
        let Some(entry) = next else {
            let actor = self.world.actor(id)?;
            let mode = standing_mode(actor.in_combat());
            debug!(actor = %id, "movement track completed");
            self.world.change_animation_mode(id, mode, false)?;
            self.world.push_log(LogEvent::CompletedMovementTrack { actor: id });
            self.drain()?;
            return self.call(id, |script, ctx| script.completed_movement_track(ctx));
        };

        let waypoint = self.content.waypoints.get(entry.waypoint)?;
        if waypoint.set != self.world.actor(id)?.set {
            debug!(actor = %id, waypoint = %entry.waypoint, set = %waypoint.set, "walking off set");
            self.world.put_in_set(id, waypoint.set)?;
            self.world.actor_mut(id)?.position = waypoint.position;
            self.drain()?;
            return self.arrive(id, entry);
        }

        let actor = self.world.actor_mut(id)?;
        actor.motion = Motion::Walking { entry, target: waypoint.position };
        let mode = locomotion_mode(entry.run, actor.in_combat());
        self.world.change_animation_mode(id, mode, false)?;
        self.drain()
    }

    fn arrive(&mut self, id: ActorId, entry: TrackEntry) -> ScriptResult {
        let actor = self.world.actor_mut(id)?;
        actor.motion = Motion::Still;
        if let Some(heading) = entry.heading {
            actor.heading = heading;
        }

        let proceed =
            self.call_one(id, |script, ctx| script.reached_movement_track_waypoint(ctx, entry.waypoint))?;
        self.world.push_log(LogEvent::ReachedWaypoint { actor: id, waypoint: entry.waypoint, proceed });

        let actor = self.world.actor_mut(id)?;
        if !proceed {
            actor.track.halt();
            let mode = standing_mode(actor.in_combat());
            self.world.change_animation_mode(id, mode, false)?;
        } else if entry.delay_ms > 0 && !actor.retired {
            actor.motion = Motion::Waiting { remaining_ms: entry.delay_ms };
            let mode = standing_mode(actor.in_combat());
            self.world.change_animation_mode(id, mode, false)?;
        }
        self.drain()
    }

    // -- host entry points -----------------------------------------------------------

    pub fn apply(&mut self, input: &HostInput) -> ScriptResult {
        match *input {
            HostInput::ClickActor { actor } => self.click_actor(actor).map(|_| ()),
            HostInput::Shoot { target, shooter, hit, damage } => self.shoot(target, shooter, hit, damage),
            HostInput::Retire { actor, by } => self.retire(actor, by),
            HostInput::GiveClue { actor, clue, from } => self.give_clue(actor, clue, from).map(|_| ()),
            HostInput::MovePlayer { set, scene } => self.move_player_to_set(set, scene),
            HostInput::PlayerCombat { on } => self.set_player_combat(on),
            HostInput::SetFlag { flag, on } => {
                self.set_flag(flag, on);
                Ok(())
            }
            HostInput::SetGlobal { var, value } => {
                self.set_global(var, value);
                Ok(())
            }
            HostInput::SetGoal { actor, goal } => self.set_goal(actor, goal),
        }
    }

    /// Returns whether the script handled the click.
    pub fn click_actor(&mut self, id: ActorId) -> ScriptResult<bool> {
        let handled = self.call(id, |script, ctx| script.clicked_by_player(ctx))?;
        self.world.push_log(LogEvent::ClickedByPlayer { actor: id, handled });
        Ok(handled)
    }

    pub fn shoot(&mut self, target: ActorId, shooter: ActorId, hit: bool, damage: i32) -> ScriptResult {
        if self.world.actor(target)?.retired {
            return Err(ScriptError::ActorRetired(target));
        }
        if !hit {
            self.world.push_log(LogEvent::Shot { actor: target, hit: false, damage: 0 });
            return self.call(target, |script, ctx| script.shot_at_and_missed(ctx));
        }

        let absorbed = self.call(target, |script, ctx| script.shot_at_and_hit(ctx))?;
        let damage = if absorbed { 0 } else { damage.max(0) };
        let actor = self.world.actor_mut(target)?;
        if actor.retired {
            return Ok(());
        }
        actor.hp -= damage;
        let (hp, max_hp, in_combat) = (actor.hp, actor.max_hp, actor.in_combat());
        self.world.push_log(LogEvent::Shot { actor: target, hit: true, damage });
        if damage == 0 {
            return Ok(());
        }

        if hp <= 0 {
            return self.retire(target, Some(shooter));
        }
        if in_combat && hp * 4 <= max_hp {
            debug!(actor = %target, hp, "fleeing combat");
            self.world.combat_off(target)?;
            self.world.push_log(LogEvent::FledCombat { actor: target });
            self.drain()?;
            return self.call(target, |script, ctx| script.fled_combat(ctx));
        }
        let mode = if in_combat { AnimationMode::COMBAT_HIT } else { AnimationMode::HIT };
        self.world.change_animation_mode(target, mode, true)?;
        self.drain()
    }

    pub fn retire(&mut self, id: ActorId, by: Option<ActorId>) -> ScriptResult {
        self.world.retire(id, by)?;
        self.drain()
    }

    /// Returns whether the clue was new to the actor.
    pub fn give_clue(&mut self, id: ActorId, clue: ClueId, from: Option<ActorId>) -> ScriptResult<bool> {
        let fresh = self.world.acquire_clue(id, clue, from)?;
        self.drain()?;
        Ok(fresh)
    }

    pub fn move_player_to_set(&mut self, set: SetId, scene: SceneId) -> ScriptResult {
        self.world.player_scene = scene;
        let player = self.world.player;
        self.world.put_in_set(player, set)?;
        self.drain()
    }

    pub fn set_player_combat(&mut self, on: bool) -> ScriptResult {
        let player = self.world.player;
        if on {
            self.world.combat_on(player, None)?;
        } else {
            self.world.combat_off(player)?;
        }
        self.drain()
    }

    pub fn set_goal(&mut self, id: ActorId, goal: Goal) -> ScriptResult {
        self.world.set_goal(id, goal)?;
        self.drain()
    }

    pub fn set_flag(&mut self, flag: FlagId, on: bool) {
        if on {
            self.world.set_flag(flag);
        } else {
            self.world.reset_flag(flag);
        }
    }

    pub fn set_global(&mut self, var: VariableId, value: i32) {
        self.world.set_global(var, value);
    }
}
