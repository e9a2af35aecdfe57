//! A nervous regular perched at the bar.
//!
//! Unlike the other actors the informant rests sitting down, so the profile
//! is built from scratch rather than from the humanoid set. Standing up is
//! a one-frame hand-off in front of any walk.

use super::{Humanoid, anim};
use crate::animation::{AnimationLibrary, AnimationProfile, Animator, EndRule, ModeRule};
use crate::content::keys;
use crate::context::ScriptContext;
use crate::script::{AiScript, ScriptResult};
use crate::types::*;

const ANIMATIONS: Humanoid = Humanoid::new(500);
const SIT: AnimationId = ANIMATIONS.id(20);
const FIDGET: AnimationId = ANIMATIONS.id(21);
const STAND_UP: AnimationId = ANIMATIONS.id(22);
const SEATED_TALK: AnimationId = ANIMATIONS.id(23);

pub const S_SIT: StateId = 0;
pub const S_FIDGET: StateId = 1;
pub const S_STAND: StateId = 2;
pub const S_WALK: StateId = 3;
pub const S_RUN: StateId = 4;
pub const S_TALK: StateId = 5;
pub const S_DODGE: StateId = 6;
pub const S_DIE: StateId = 7;

pub const MODE_FIDGET: AnimationMode = AnimationMode(70);

pub const GOAL_SEATED: Goal = Goal(0);
pub const GOAL_TIPPED: Goal = Goal(1);
pub const GOAL_LEAVE: Goal = Goal(2);
pub const GOAL_GONE: Goal = Goal(3);
pub const GOAL_DEAD: Goal = Goal(99);

pub const LINE_HELLO: LineId = LineId(500);
pub const LINE_TIP: LineId = LineId(510);
pub const LINE_BRUSH_OFF: LineId = LineId(520);
pub const LINE_THANKS: LineId = LineId(530);

/// Friendliness toward the detective needed before the tip is shared.
pub const TIP_THRESHOLD: i32 = 60;
const FIDGET_MS: u32 = 5000;

pub(crate) fn register_animations(library: &mut AnimationLibrary) {
    ANIMATIONS.register(library);
    library.insert(SIT, 40, 12);
    library.insert(FIDGET, 18, 15);
    library.insert(STAND_UP, 10, 15);
    library.insert(SEATED_TALK, 24, 15);
}

fn profile() -> AnimationProfile {
    let mut profile = AnimationProfile::new(S_SIT, SIT)
        .state(S_FIDGET, FIDGET, EndRule::Then(S_SIT))
        .state(S_STAND, ANIMATIONS.id(anim::IDLE), EndRule::Loop)
        .state(S_WALK, ANIMATIONS.id(anim::WALK), EndRule::Loop)
        .state(S_RUN, ANIMATIONS.id(anim::RUN), EndRule::Loop)
        .state(S_TALK, SEATED_TALK, EndRule::Then(S_SIT))
        .state(S_DODGE, ANIMATIONS.id(anim::DODGE), EndRule::Then(S_STAND))
        .state(S_DIE, ANIMATIONS.id(anim::DIE), EndRule::Hold)
        .mode_rule(AnimationMode::SIT, ModeRule::to(S_SIT).keep_in(&[S_SIT, S_FIDGET, S_TALK]))
        .mode_rule(MODE_FIDGET, ModeRule::to(S_FIDGET).keep_in(&[S_FIDGET, S_TALK]))
        .mode_rule(AnimationMode::WALK, ModeRule::to(S_WALK).with_handoff(STAND_UP))
        .mode_rule(AnimationMode::RUN, ModeRule::to(S_RUN).with_handoff(STAND_UP))
        .mode(AnimationMode::DODGE, S_DODGE)
        .mode(AnimationMode::HIT, S_DODGE)
        .mode(AnimationMode::DIE, S_DIE)
        .mode(AnimationMode::COMBAT_DIE, S_DIE);
    for mode in [AnimationMode::TALK, AnimationMode::talk_variant(0), AnimationMode::talk_variant(1)] {
        profile = profile.mode_rule(mode, ModeRule::to(S_TALK).keep_in(&[S_TALK]));
    }
    profile
}

pub struct Informant {
    animator: Animator,
}

impl Informant {
    pub fn new() -> Self {
        Self { animator: Animator::new(profile()) }
    }

    fn at_bar(goal: Goal) -> bool {
        goal == GOAL_SEATED || goal == GOAL_TIPPED
    }
}

impl Default for Informant {
    fn default() -> Self {
        Self::new()
    }
}

impl AiScript for Informant {
    fn actor(&self) -> ActorId {
        keys::ACTOR_INFORMANT
    }

    fn animator(&self) -> &Animator {
        &self.animator
    }

    fn animator_mut(&mut self) -> &mut Animator {
        &mut self.animator
    }

    fn initialize(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        let me = ctx.me();
        ctx.set_at_waypoint(me, keys::WP_BAR_STOOL_B, 768)?;
        ctx.change_animation_mode(me, AnimationMode::SIT)?;
        ctx.timer_start(me, CustomTimer::Task2, FIDGET_MS)
    }

    fn timer_expired(&mut self, ctx: &mut ScriptContext<'_>, timer: CustomTimer) -> ScriptResult {
        let me = ctx.me();
        if timer == CustomTimer::Task2 && Self::at_bar(ctx.my_goal()?) {
            // Fidgeting always ends back in the sitting loop, so the mode is resent.
            ctx.force_animation_mode(me, MODE_FIDGET)?;
            ctx.timer_start(me, CustomTimer::Task2, FIDGET_MS)?;
        }
        Ok(())
    }

    fn other_agent_entered_this_set(
        &mut self,
        ctx: &mut ScriptContext<'_>,
        other: ActorId,
    ) -> ScriptResult {
        let me = ctx.me();
        if other == ctx.player()
            && !ctx.flag(keys::FLAG_INFORMANT_GREETED)
            && Self::at_bar(ctx.my_goal()?)
        {
            ctx.set_flag(keys::FLAG_INFORMANT_GREETED);
            ctx.face_actor(me, other)?;
            ctx.says(me, LINE_HELLO)?;
        }
        Ok(())
    }

    fn other_agent_exited_this_set(
        &mut self,
        ctx: &mut ScriptContext<'_>,
        other: ActorId,
    ) -> ScriptResult {
        if other == ctx.player() && ctx.my_goal()? == GOAL_TIPPED {
            ctx.set_my_goal(GOAL_LEAVE)?;
        }
        Ok(())
    }

    fn clicked_by_player(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult<bool> {
        let (me, player) = (ctx.me(), ctx.player());
        if !Self::at_bar(ctx.my_goal()?) {
            return Ok(false);
        }
        ctx.face_actor(me, player)?;
        ctx.force_animation_mode(me, AnimationMode::TALK)?;
        if ctx.friendliness(me, player)? >= TIP_THRESHOLD && !ctx.flag(keys::FLAG_INFORMANT_TIPPED) {
            ctx.says(me, LINE_TIP)?;
            ctx.set_flag(keys::FLAG_INFORMANT_TIPPED);
            ctx.clue_acquire(player, keys::CLUE_INFORMANT_TIP, Some(me))?;
            ctx.set_my_goal(GOAL_TIPPED)?;
        } else {
            ctx.says(me, LINE_BRUSH_OFF)?;
        }
        Ok(true)
    }

    fn received_clue(
        &mut self,
        ctx: &mut ScriptContext<'_>,
        _clue: ClueId,
        from: Option<ActorId>,
    ) -> ScriptResult {
        if from == Some(ctx.player()) {
            ctx.says(ctx.me(), LINE_THANKS)?;
        }
        Ok(())
    }

    fn friendliness_modifier_if_gets_clue(&self, other: ActorId, clue: ClueId) -> i32 {
        if other != keys::ACTOR_PLAYER {
            return 0;
        }
        match clue {
            keys::CLUE_MATCHBOOK => 15,
            keys::CLUE_TORN_RECEIPT => 10,
            _ => 0,
        }
    }

    fn goal_changed(
        &mut self,
        ctx: &mut ScriptContext<'_>,
        _current: Goal,
        new: Goal,
    ) -> ScriptResult<bool> {
        let me = ctx.me();
        match new {
            GOAL_TIPPED | GOAL_GONE => {}
            GOAL_LEAVE => {
                ctx.timer_reset(me, CustomTimer::Task2)?;
                ctx.track_flush(me)?;
                ctx.track_append(me, keys::WP_BAR_BACK_DOOR, 0)?;
                ctx.track_append(me, keys::WP_OFFSTAGE_B, 0)?;
                ctx.track_repeat(me)?;
            }
            GOAL_DEAD => ctx.timer_reset(me, CustomTimer::Task2)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn completed_movement_track(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        if ctx.my_goal()? == GOAL_LEAVE {
            ctx.set_my_goal(GOAL_GONE)?;
        }
        Ok(())
    }

    fn other_agent_entered_combat_mode(
        &mut self,
        ctx: &mut ScriptContext<'_>,
        _other: ActorId,
        toggle: CombatToggle,
    ) -> ScriptResult {
        if toggle == CombatToggle::On && Self::at_bar(ctx.my_goal()?) {
            let me = ctx.me();
            ctx.change_animation_mode(me, AnimationMode::DODGE)?;
            ctx.set_my_goal(GOAL_LEAVE)?;
        }
        Ok(())
    }

    fn retired(&mut self, ctx: &mut ScriptContext<'_>, _by: Option<ActorId>) -> ScriptResult {
        ctx.set_my_goal(GOAL_DEAD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> AnimationLibrary {
        let mut library = AnimationLibrary::new();
        register_animations(&mut library);
        library
    }

    #[test]
    fn walking_from_the_stool_stands_up_first() {
        let library = library();
        let mut informant = Informant::new();
        assert!(informant.animator.change_mode(AnimationMode::WALK));
        let step = informant.animator.update(&library);
        assert_eq!(step.frame.animation, STAND_UP);
        assert_eq!(informant.animator.current_state(), S_WALK);
    }

    #[test]
    fn fidget_returns_to_the_sitting_loop() {
        let library = library();
        let mut informant = Informant::new();
        assert!(informant.animator.change_mode(MODE_FIDGET));
        let mut finished = None;
        for _ in 0..18 {
            finished = finished.or(informant.animator.update(&library).finished);
        }
        assert_eq!(finished, Some(S_FIDGET));
        assert_eq!(informant.animator.current_state(), S_SIT);
    }

    #[test]
    fn combat_modes_are_not_handled() {
        let mut informant = Informant::new();
        assert!(!informant.animator.change_mode(AnimationMode::COMBAT_IDLE));
        assert!(informant.animator.is_resting());
    }
}
