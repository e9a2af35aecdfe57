//! A uniformed officer walking a fixed beat on the street.

use super::{EXTRA, Humanoid};
use crate::animation::{AnimationLibrary, AnimationProfile, Animator, EndRule};
use crate::content::keys;
use crate::context::ScriptContext;
use crate::script::{AiScript, ScriptResult};
use crate::types::*;

const ANIMATIONS: Humanoid = Humanoid::new(300);
const RADIO: AnimationId = ANIMATIONS.id(EXTRA);

pub const S_RADIO: StateId = 20;
pub const MODE_RADIO: AnimationMode = AnimationMode(60);

pub const GOAL_PATROL: Goal = Goal(1);
pub const GOAL_RESPOND: Goal = Goal(2);
pub const GOAL_RETREAT: Goal = Goal(3);
pub const GOAL_RECOVER: Goal = Goal(4);
pub const GOAL_DEAD: Goal = Goal(99);

pub const LINE_MOVE_ALONG: LineId = LineId(300);
pub const LINE_FREEZE: LineId = LineId(310);

const RECOVER_MS: u32 = 10_000;
/// How long a response lasts once the detective has holstered.
const STAND_DOWN_MS: u32 = 20_000;

pub(crate) fn register_animations(library: &mut AnimationLibrary) {
    ANIMATIONS.register(library);
    library.insert(RADIO, 20, 15);
}

fn profile() -> AnimationProfile {
    ANIMATIONS
        .profile()
        .state(S_RADIO, RADIO, EndRule::ThenMode(AnimationMode::IDLE))
        .mode(MODE_RADIO, S_RADIO)
}

pub struct PatrolOfficer {
    animator: Animator,
}

impl PatrolOfficer {
    pub fn new() -> Self {
        Self { animator: Animator::new(profile()) }
    }

    fn alerted_by(ctx: &mut ScriptContext<'_>, culprit: ActorId) -> ScriptResult {
        ctx.set_flag(keys::FLAG_PATROL_ALERTED);
        if ctx.my_goal()? != GOAL_RESPOND {
            ctx.face_actor(ctx.me(), culprit)?;
            ctx.set_my_goal(GOAL_RESPOND)?;
        }
        Ok(())
    }
}

impl Default for PatrolOfficer {
    fn default() -> Self {
        Self::new()
    }
}

impl AiScript for PatrolOfficer {
    fn actor(&self) -> ActorId {
        keys::ACTOR_OFFICER
    }

    fn animator(&self) -> &Animator {
        &self.animator
    }

    fn animator_mut(&mut self) -> &mut Animator {
        &mut self.animator
    }

    fn initialize(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        ctx.set_my_goal(GOAL_PATROL)
    }

    fn goal_changed(
        &mut self,
        ctx: &mut ScriptContext<'_>,
        _current: Goal,
        new: Goal,
    ) -> ScriptResult<bool> {
        let me = ctx.me();
        match new {
            GOAL_PATROL => {
                ctx.track_flush(me)?;
                ctx.track_append(me, keys::WP_STREET_NORTH, 0)?;
                ctx.track_append_with_facing(me, keys::WP_STREET_SOUTH, 2000, 512)?;
                ctx.track_append(me, keys::WP_STREET_KIOSK, 0)?;
                ctx.track_append(me, keys::WP_STREET_CROSSING, 1000)?;
                ctx.track_repeat(me)?;
            }
            GOAL_RESPOND => {
                ctx.track_flush(me)?;
                ctx.says(me, LINE_FREEZE)?;
                ctx.combat_on(me, Some(ctx.player()))?;
                ctx.timer_start(me, CustomTimer::Task2, STAND_DOWN_MS)?;
            }
            GOAL_RETREAT => {
                ctx.timer_reset(me, CustomTimer::Task2)?;
                ctx.combat_off(me)?;
                ctx.track_flush(me)?;
                ctx.track_append_run(me, keys::WP_PRECINCT_DOOR, 0)?;
                ctx.track_repeat(me)?;
            }
            GOAL_RECOVER => {
                ctx.change_animation_mode(me, MODE_RADIO)?;
                ctx.timer_start(me, CustomTimer::Task1, RECOVER_MS)?;
            }
            GOAL_DEAD => ctx.track_flush(me)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn completed_movement_track(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        match ctx.my_goal()? {
            GOAL_PATROL => ctx.track_repeat(ctx.me()),
            GOAL_RETREAT => ctx.set_my_goal(GOAL_RECOVER),
            _ => Ok(()),
        }
    }

    fn timer_expired(&mut self, ctx: &mut ScriptContext<'_>, timer: CustomTimer) -> ScriptResult {
        let (me, player) = (ctx.me(), ctx.player());
        match (timer, ctx.my_goal()?) {
            (CustomTimer::Task1, GOAL_RECOVER) => {
                ctx.reset_flag(keys::FLAG_PATROL_ALERTED);
                ctx.set_at_waypoint(me, keys::WP_STREET_NORTH, 0)?;
                ctx.set_my_goal(GOAL_PATROL)
            }
            (CustomTimer::Task2, GOAL_RESPOND) if ctx.in_combat(player)? => {
                ctx.timer_start(me, CustomTimer::Task2, STAND_DOWN_MS)
            }
            (CustomTimer::Task2, GOAL_RESPOND) => {
                ctx.combat_off(me)?;
                ctx.reset_flag(keys::FLAG_PATROL_ALERTED);
                ctx.set_my_goal(GOAL_PATROL)
            }
            _ => Ok(()),
        }
    }

    fn reached_movement_track_waypoint(
        &mut self,
        ctx: &mut ScriptContext<'_>,
        _waypoint: WaypointId,
    ) -> ScriptResult<bool> {
        let (me, player) = (ctx.me(), ctx.player());
        if ctx.my_goal()? == GOAL_PATROL
            && ctx.flag(keys::FLAG_PATROL_ALERTED)
            && ctx.same_set(me, player)?
        {
            ctx.set_my_goal(GOAL_RESPOND)?;
            return Ok(false);
        }
        Ok(true)
    }

    fn other_agent_entered_combat_mode(
        &mut self,
        ctx: &mut ScriptContext<'_>,
        other: ActorId,
        toggle: CombatToggle,
    ) -> ScriptResult {
        let goal = ctx.my_goal()?;
        match toggle {
            CombatToggle::On if goal == GOAL_PATROL || goal == GOAL_RESPOND => {
                Self::alerted_by(ctx, other)
            }
            CombatToggle::Off if goal == GOAL_RESPOND && other == ctx.player() => {
                let me = ctx.me();
                ctx.timer_reset(me, CustomTimer::Task2)?;
                ctx.combat_off(me)?;
                ctx.reset_flag(keys::FLAG_PATROL_ALERTED);
                ctx.set_my_goal(GOAL_PATROL)
            }
            _ => Ok(()),
        }
    }

    fn clicked_by_player(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult<bool> {
        let me = ctx.me();
        if ctx.is_retired(me)? {
            return Ok(false);
        }
        ctx.face_actor(me, ctx.player())?;
        ctx.says(me, LINE_MOVE_ALONG)?;
        Ok(true)
    }

    fn shot_at_and_missed(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        super::heard_gunshot(ctx);
        let player = ctx.player();
        Self::alerted_by(ctx, player)
    }

    fn shot_at_and_hit(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult<bool> {
        super::heard_gunshot(ctx);
        let player = ctx.player();
        Self::alerted_by(ctx, player)?;
        Ok(false)
    }

    fn fled_combat(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        ctx.set_my_goal(GOAL_RETREAT)
    }

    fn retired(&mut self, ctx: &mut ScriptContext<'_>, _by: Option<ActorId>) -> ScriptResult {
        ctx.set_my_goal(GOAL_DEAD)
    }

    fn friendliness_modifier_if_gets_clue(&self, other: ActorId, clue: ClueId) -> i32 {
        match clue {
            keys::CLUE_PLAYER_SHOT_BYSTANDER if other == keys::ACTOR_PLAYER => -10,
            _ => 0,
        }
    }
}
