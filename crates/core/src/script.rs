//! The callback interface every per-actor behaviour implements.
//!
//! All callbacks have no-op defaults except the animation ones, which
//! delegate to the script's [`Animator`]. Callbacks run with a
//! [`ScriptContext`] scoped to the script's own actor; effects on other
//! actors are delivered after the callback returns.

use crate::animation::{AnimationState, Animator};
use crate::context::ScriptContext;
use crate::error::ScriptError;
use crate::types::*;

pub type ScriptResult<T = ()> = Result<T, ScriptError>;

pub trait AiScript {
    fn actor(&self) -> ActorId;
    fn animator(&self) -> &Animator;
    fn animator_mut(&mut self) -> &mut Animator;

    fn initialize(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
        Ok(())
    }

    /// Runs once per tick while the actor is alive.
    fn update(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
        Ok(())
    }

    fn timer_expired(&mut self, _ctx: &mut ScriptContext<'_>, _timer: CustomTimer) -> ScriptResult {
        Ok(())
    }

    fn completed_movement_track(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
        Ok(())
    }

    fn received_clue(
        &mut self,
        _ctx: &mut ScriptContext<'_>,
        _clue: ClueId,
        _from: Option<ActorId>,
    ) -> ScriptResult {
        Ok(())
    }

    /// Returns `true` when the script handled the click itself.
    fn clicked_by_player(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult<bool> {
        Ok(false)
    }

    fn entered_set(&mut self, _ctx: &mut ScriptContext<'_>, _set: SetId) -> ScriptResult {
        Ok(())
    }

    fn other_agent_entered_this_set(
        &mut self,
        _ctx: &mut ScriptContext<'_>,
        _other: ActorId,
    ) -> ScriptResult {
        Ok(())
    }

    fn other_agent_exited_this_set(
        &mut self,
        _ctx: &mut ScriptContext<'_>,
        _other: ActorId,
    ) -> ScriptResult {
        Ok(())
    }

    fn other_agent_entered_combat_mode(
        &mut self,
        _ctx: &mut ScriptContext<'_>,
        _other: ActorId,
        _toggle: CombatToggle,
    ) -> ScriptResult {
        Ok(())
    }

    fn shot_at_and_missed(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
        Ok(())
    }

    /// Returns `true` to absorb the hit: no damage is applied.
    fn shot_at_and_hit(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult<bool> {
        Ok(false)
    }

    fn retired(&mut self, _ctx: &mut ScriptContext<'_>, _by: Option<ActorId>) -> ScriptResult {
        Ok(())
    }

    /// Friendliness delta toward `other` when this actor gets `clue` from them.
    fn friendliness_modifier_if_gets_clue(&self, _other: ActorId, _clue: ClueId) -> i32 {
        0
    }

    /// Returns whether the script recognised the new goal.
    fn goal_changed(
        &mut self,
        _ctx: &mut ScriptContext<'_>,
        _current: Goal,
        _new: Goal,
    ) -> ScriptResult<bool> {
        Ok(false)
    }

    /// Called when an animation state with a `Then`/`ThenMode` end rule runs out.
    fn animation_finished(&mut self, _ctx: &mut ScriptContext<'_>, _state: StateId) -> ScriptResult {
        Ok(())
    }

    fn update_animation(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult<AnimationFrame> {
        let step = self.animator_mut().update(ctx.animations());
        if let Some(state) = step.finished {
            self.animation_finished(ctx, state)?;
        }
        if let Some(mode) = step.request_mode {
            let me = ctx.me();
            ctx.force_animation_mode(me, mode)?;
        }
        Ok(step.frame)
    }

    /// Returns `false` for modes this actor has no animation for.
    fn change_animation_mode(
        &mut self,
        _ctx: &mut ScriptContext<'_>,
        mode: AnimationMode,
    ) -> ScriptResult<bool> {
        Ok(self.animator_mut().change_mode(mode))
    }

    fn query_animation_state(&self) -> AnimationState {
        self.animator().state()
    }

    fn set_animation_state(&mut self, state: AnimationState) {
        self.animator_mut().set_state(state);
    }

    /// Returns `true` to continue along the track, `false` to halt there.
    fn reached_movement_track_waypoint(
        &mut self,
        _ctx: &mut ScriptContext<'_>,
        _waypoint: WaypointId,
    ) -> ScriptResult<bool> {
        Ok(true)
    }

    fn fled_combat(&mut self, _ctx: &mut ScriptContext<'_>) -> ScriptResult {
        Ok(())
    }
}
