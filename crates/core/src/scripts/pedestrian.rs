//! A passer-by on the street. Wanders random routes between pauses and runs
//! off to hide when shots are fired.

use super::{EXTRA, Humanoid, state};
use crate::animation::{AnimationLibrary, AnimationProfile, Animator, EndRule, ModeRule};
use crate::content::keys;
use crate::context::ScriptContext;
use crate::script::{AiScript, ScriptResult};
use crate::types::*;

const ANIMATIONS: Humanoid = Humanoid::new(400);
const COWER: AnimationId = ANIMATIONS.id(EXTRA);

pub const S_COWER: StateId = 20;
pub const MODE_COWER: AnimationMode = AnimationMode(70);

pub const GOAL_WANDER: Goal = Goal(1);
pub const GOAL_PAUSE: Goal = Goal(2);
pub const GOAL_HIDE: Goal = Goal(3);
pub const GOAL_HIDDEN: Goal = Goal(4);
pub const GOAL_DEAD: Goal = Goal(99);

pub const LINE_SCREAM: LineId = LineId(400);

const HIDDEN_MS: u32 = 15_000;

const ROUTES: [[WaypointId; 3]; 3] = [
    [keys::WP_STREET_BUS_STOP, keys::WP_STREET_KIOSK, keys::WP_STREET_CROSSING],
    [keys::WP_STREET_CROSSING, keys::WP_STREET_NORTH, keys::WP_STREET_SOUTH],
    [keys::WP_STREET_SOUTH, keys::WP_STREET_BUS_STOP, keys::WP_STREET_KIOSK],
];

pub(crate) fn register_animations(library: &mut AnimationLibrary) {
    ANIMATIONS.register(library);
    library.insert(COWER, 14, 12);
}

fn profile() -> AnimationProfile {
    ANIMATIONS
        .profile()
        .state(S_COWER, COWER, EndRule::Loop)
        .mode_rule(MODE_COWER, ModeRule::to(S_COWER).keep_in(&[S_COWER, state::DODGE]))
}

pub struct Pedestrian {
    animator: Animator,
    /// Gunshot count already reacted to.
    gunshots_seen: i32,
}

impl Pedestrian {
    pub fn new() -> Self {
        Self { animator: Animator::new(profile()), gunshots_seen: 0 }
    }

    fn is_calm(goal: Goal) -> bool {
        goal == GOAL_WANDER || goal == GOAL_PAUSE
    }

    fn panic(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        self.gunshots_seen = ctx.global(keys::VAR_GUNSHOTS);
        if Self::is_calm(ctx.my_goal()?) {
            ctx.says(ctx.me(), LINE_SCREAM)?;
            ctx.set_my_goal(GOAL_HIDE)?;
        }
        Ok(())
    }
}

impl Default for Pedestrian {
    fn default() -> Self {
        Self::new()
    }
}

impl AiScript for Pedestrian {
    fn actor(&self) -> ActorId {
        keys::ACTOR_PEDESTRIAN
    }

    fn animator(&self) -> &Animator {
        &self.animator
    }

    fn animator_mut(&mut self) -> &mut Animator {
        &mut self.animator
    }

    fn initialize(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        ctx.set_my_goal(GOAL_WANDER)
    }

    fn update(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        if ctx.global(keys::VAR_GUNSHOTS) > self.gunshots_seen {
            self.panic(ctx)?;
        }
        Ok(())
    }

    fn goal_changed(
        &mut self,
        ctx: &mut ScriptContext<'_>,
        _current: Goal,
        new: Goal,
    ) -> ScriptResult<bool> {
        let me = ctx.me();
        match new {
            GOAL_WANDER => {
                let route = ROUTES[ctx.random(0, ROUTES.len() as i32 - 1) as usize];
                ctx.track_flush(me)?;
                for waypoint in route {
                    ctx.track_append(me, waypoint, 0)?;
                }
                ctx.track_repeat(me)?;
            }
            GOAL_PAUSE => {
                let wait = ctx.random(1000, 3000) as u32;
                ctx.timer_start(me, CustomTimer::Task0, wait)?;
            }
            GOAL_HIDE => {
                ctx.timer_reset(me, CustomTimer::Task0)?;
                ctx.track_flush(me)?;
                ctx.track_append_run(me, keys::WP_STREET_BUS_STOP, 0)?;
                ctx.track_append(me, keys::WP_OFFSTAGE_A, 0)?;
                ctx.track_repeat(me)?;
            }
            GOAL_HIDDEN => {
                ctx.change_animation_mode(me, MODE_COWER)?;
                ctx.timer_start(me, CustomTimer::Task1, HIDDEN_MS)?;
            }
            GOAL_DEAD => {
                ctx.timer_reset(me, CustomTimer::Task0)?;
                ctx.timer_reset(me, CustomTimer::Task1)?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn completed_movement_track(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        match ctx.my_goal()? {
            GOAL_WANDER => ctx.set_my_goal(GOAL_PAUSE),
            GOAL_HIDE => ctx.set_my_goal(GOAL_HIDDEN),
            _ => Ok(()),
        }
    }

    fn timer_expired(&mut self, ctx: &mut ScriptContext<'_>, timer: CustomTimer) -> ScriptResult {
        match (timer, ctx.my_goal()?) {
            (CustomTimer::Task0, GOAL_PAUSE) => ctx.set_my_goal(GOAL_WANDER),
            (CustomTimer::Task1, GOAL_HIDDEN) => {
                self.gunshots_seen = ctx.global(keys::VAR_GUNSHOTS);
                let me = ctx.me();
                ctx.set_at_waypoint(me, keys::WP_STREET_BUS_STOP, 0)?;
                ctx.change_animation_mode(me, AnimationMode::IDLE)?;
                ctx.set_my_goal(GOAL_WANDER)
            }
            _ => Ok(()),
        }
    }

    fn other_agent_entered_combat_mode(
        &mut self,
        ctx: &mut ScriptContext<'_>,
        _other: ActorId,
        toggle: CombatToggle,
    ) -> ScriptResult {
        if toggle == CombatToggle::On {
            self.panic(ctx)?;
        }
        Ok(())
    }

    fn shot_at_and_missed(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        super::heard_gunshot(ctx);
        self.panic(ctx)
    }

    fn shot_at_and_hit(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult<bool> {
        super::heard_gunshot(ctx);
        self.panic(ctx)?;
        Ok(false)
    }

    fn retired(&mut self, ctx: &mut ScriptContext<'_>, by: Option<ActorId>) -> ScriptResult {
        ctx.set_my_goal(GOAL_DEAD)?;
        if by == Some(ctx.player()) {
            // Word gets around: both officers of the law hear about it.
            for witness in [keys::ACTOR_PARTNER, keys::ACTOR_OFFICER] {
                if !ctx.is_retired(witness)? {
                    ctx.clue_acquire(witness, keys::CLUE_PLAYER_SHOT_BYSTANDER, None)?;
                }
            }
        }
        Ok(())
    }
}
