//! The detective's partner.
//!
//! Chapter 1 is a loop through the city: walk to the market, search it
//! (sometimes turning up evidence), sweep the alley, head back to the
//! precinct and file a report at the desk. From chapter 2 on the partner
//! stakes out the bar and reacts to the detective drawing a gun there.
//!
//! The animation profile is the shared humanoid set plus sitting down,
//! sitting, standing up and a pointing gesture. Standing up from the desk
//! is what sends the partner back out on the next circuit.

use tracing::debug;

use super::{EXTRA, Humanoid, is_combat_state, state};
use crate::animation::{AnimationLibrary, AnimationProfile, Animator, EndRule, ModeRule};
use crate::content::keys;
use crate::context::ScriptContext;
use crate::script::{AiScript, ScriptResult};
use crate::types::*;

const ANIMATIONS: Humanoid = Humanoid::new(200);

const SIT_DOWN: AnimationId = ANIMATIONS.id(EXTRA);
const SIT: AnimationId = ANIMATIONS.id(EXTRA + 1);
const STAND_UP: AnimationId = ANIMATIONS.id(EXTRA + 2);
const GESTURE: AnimationId = ANIMATIONS.id(EXTRA + 3);

pub const S_SIT_DOWN: StateId = 20;
pub const S_SIT: StateId = 21;
pub const S_STAND_UP: StateId = 22;
pub const S_GESTURE: StateId = 23;

/// Points at something, then drops back to idle.
pub const MODE_GESTURE: AnimationMode = AnimationMode(30);

pub const GOAL_START: Goal = Goal(0);
pub const GOAL_GO_TO_MARKET: Goal = Goal(1);
pub const GOAL_SEARCH_MARKET: Goal = Goal(2);
pub const GOAL_GO_TO_ALLEY: Goal = Goal(3);
pub const GOAL_RETURN_TO_PRECINCT: Goal = Goal(4);
pub const GOAL_FILE_REPORT: Goal = Goal(5);
pub const GOAL_STAKEOUT_BAR: Goal = Goal(100);
pub const GOAL_CONFRONT: Goal = Goal(110);
pub const GOAL_LEAVE_BAR: Goal = Goal(120);
pub const GOAL_PATROL_STREET: Goal = Goal(130);
pub const GOAL_DEAD: Goal = Goal(599);

pub const LINE_GREETING: LineId = LineId(100);
/// Click replies are `LINE_SMALL_TALK + 1..=3`.
pub const LINE_SMALL_TALK: LineId = LineId(100);
pub const LINE_DUCK: LineId = LineId(110);
pub const LINE_THANKS: LineId = LineId(120);
/// Spoken by the detective over the partner's body.
pub const LINE_MOURN: LineId = LineId(190);

const REPORT_MS: u32 = 4000;
const RECKLESS_THRESHOLD: i32 = 5;

const MARKET_EVIDENCE: [(ClueId, FlagId); 3] = [
    (keys::CLUE_BULLET_CASING, keys::FLAG_CASING_TAKEN),
    (keys::CLUE_TORN_RECEIPT, keys::FLAG_RECEIPT_TAKEN),
    (keys::CLUE_MATCHBOOK, keys::FLAG_MATCHBOOK_TAKEN),
];

pub(crate) fn register_animations(library: &mut AnimationLibrary) {
    ANIMATIONS.register(library);
    library.insert(SIT_DOWN, 10, 15);
    library.insert(SIT, 30, 10);
    library.insert(STAND_UP, 12, 15);
    library.insert(GESTURE, 16, 15);
}

fn profile() -> AnimationProfile {
    ANIMATIONS
        .profile()
        .state(S_SIT_DOWN, SIT_DOWN, EndRule::Then(S_SIT))
        .state(S_SIT, SIT, EndRule::Loop)
        .state(S_STAND_UP, STAND_UP, EndRule::Then(state::IDLE))
        .state(S_GESTURE, GESTURE, EndRule::ThenMode(AnimationMode::IDLE))
        .mode_rule(AnimationMode::SIT, ModeRule::to(S_SIT_DOWN).keep_in(&[S_SIT_DOWN, S_SIT]))
        .mode(MODE_GESTURE, S_GESTURE)
}

pub struct Partner {
    animator: Animator,
}

impl Partner {
    pub fn new() -> Self {
        Self { animator: Animator::new(profile()) }
    }

    fn walk(ctx: &mut ScriptContext<'_>, stops: &[(WaypointId, u32)]) -> ScriptResult {
        let me = ctx.me();
        ctx.track_flush(me)?;
        for &(waypoint, delay_ms) in stops {
            ctx.track_append(me, waypoint, delay_ms)?;
        }
        ctx.track_repeat(me)
    }

    fn search_market(ctx: &mut ScriptContext<'_>) -> ScriptResult {
        let me = ctx.me();
        let roll = ctx.random(0, MARKET_EVIDENCE.len() as i32 - 1) as usize;
        let (clue, flag) = MARKET_EVIDENCE[roll];
        if ctx.flag(flag) {
            ctx.increment_global(keys::VAR_EVIDENCE_MISSED, 1);
        } else {
            ctx.set_flag(flag);
            ctx.clue_acquire(me, clue, None)?;
            ctx.change_animation_mode(me, MODE_GESTURE)?;
        }
        Self::walk(ctx, &[(keys::WP_MARKET_FOUNTAIN, 1000), (keys::WP_MARKET_GATE, 0)])
    }

    fn return_to_precinct(ctx: &mut ScriptContext<'_>) -> ScriptResult {
        let me = ctx.me();
        if ctx.random(1, 2) == 1 {
            let uploaded = ctx.clues_to_mainframe(me)?;
            if uploaded > 0 {
                let score = ctx.score(me)? + uploaded as i32;
                ctx.set_score(me, score)?;
            }
        }
        Self::walk(ctx, &[(keys::WP_STREET_NORTH, 0), (keys::WP_PRECINCT_DESK, 0)])
    }
}

impl Default for Partner {
    fn default() -> Self {
        Self::new()
    }
}

impl AiScript for Partner {
    fn actor(&self) -> ActorId {
        keys::ACTOR_PARTNER
    }

    fn animator(&self) -> &Animator {
        &self.animator
    }

    fn animator_mut(&mut self) -> &mut Animator {
        &mut self.animator
    }

    fn initialize(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        let me = ctx.me();
        ctx.set_at_waypoint(me, keys::WP_PRECINCT_BENCH, 0)?;
        ctx.change_animation_mode(me, AnimationMode::IDLE)
    }

    fn update(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        let me = ctx.me();
        let goal = ctx.my_goal()?;
        if goal == GOAL_DEAD {
            return Ok(());
        }

        if ctx.global(keys::VAR_CHAPTER) >= 2 && goal < GOAL_STAKEOUT_BAR {
            return ctx.set_my_goal(GOAL_STAKEOUT_BAR);
        }

        if ctx.global(keys::VAR_EVIDENCE_MISSED) > RECKLESS_THRESHOLD
            && !ctx.clue_query(me, keys::CLUE_PLAYER_IS_RECKLESS)?
        {
            ctx.clue_acquire(me, keys::CLUE_PLAYER_IS_RECKLESS, None)?;
        }

        if goal == GOAL_START {
            ctx.set_my_goal(GOAL_GO_TO_MARKET)?;
        }
        Ok(())
    }

    fn timer_expired(&mut self, ctx: &mut ScriptContext<'_>, timer: CustomTimer) -> ScriptResult {
        if timer == CustomTimer::Task0 && ctx.my_goal()? == GOAL_FILE_REPORT {
            let me = ctx.me();
            let downloaded = ctx.clues_from_mainframe(me)?;
            debug!(downloaded, "partner finished report");
            ctx.change_animation_mode(me, AnimationMode::IDLE)?;
        }
        Ok(())
    }

    fn completed_movement_track(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        let next = match ctx.my_goal()? {
            GOAL_GO_TO_MARKET => GOAL_SEARCH_MARKET,
            GOAL_SEARCH_MARKET => GOAL_GO_TO_ALLEY,
            GOAL_GO_TO_ALLEY => GOAL_RETURN_TO_PRECINCT,
            GOAL_RETURN_TO_PRECINCT => GOAL_FILE_REPORT,
            GOAL_LEAVE_BAR => GOAL_PATROL_STREET,
            GOAL_PATROL_STREET => return ctx.track_repeat(ctx.me()),
            _ => return Ok(()),
        };
        ctx.set_my_goal(next)
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

    fn clicked_by_player(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult<bool> {
        let (me, player) = (ctx.me(), ctx.player());
        if ctx.is_retired(me)? {
            ctx.says(player, LINE_MOURN)?;
            return Ok(true);
        }

        ctx.track_pause(me)?;
        ctx.face_actor(me, player)?;
        ctx.face_actor(player, me)?;
        if ctx.flag(keys::FLAG_PARTNER_MET_PLAYER) {
            let roll = ctx.random(1, 3) as u32;
            ctx.says(me, LineId(LINE_SMALL_TALK.0 + roll))?;
        } else {
            ctx.set_flag(keys::FLAG_PARTNER_MET_PLAYER);
            ctx.says(me, LINE_GREETING)?;
            ctx.modify_friendliness(me, player, 2)?;
        }
        ctx.track_unpause(me)?;
        Ok(true)
    }

    fn other_agent_entered_combat_mode(
        &mut self,
        ctx: &mut ScriptContext<'_>,
        other: ActorId,
        toggle: CombatToggle,
    ) -> ScriptResult {
        if other != ctx.player() {
            return Ok(());
        }
        match (toggle, ctx.my_goal()?) {
            (CombatToggle::On, GOAL_STAKEOUT_BAR) => ctx.set_my_goal(GOAL_CONFRONT),
            (CombatToggle::Off, GOAL_CONFRONT) => ctx.set_my_goal(GOAL_LEAVE_BAR),
            _ => Ok(()),
        }
    }

    fn shot_at_and_missed(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        super::heard_gunshot(ctx);
        ctx.says(ctx.me(), LINE_DUCK)
    }

    fn shot_at_and_hit(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult<bool> {
        super::heard_gunshot(ctx);
        let me = ctx.me();
        if !ctx.in_combat(me)? {
            ctx.combat_on(me, Some(ctx.player()))?;
        }
        Ok(false)
    }

    fn retired(&mut self, ctx: &mut ScriptContext<'_>, _by: Option<ActorId>) -> ScriptResult {
        ctx.set_flag(keys::FLAG_PARTNER_DOWN);
        ctx.set_my_goal(GOAL_DEAD)
    }

    fn friendliness_modifier_if_gets_clue(&self, other: ActorId, clue: ClueId) -> i32 {
        if other != keys::ACTOR_PLAYER {
            return 0;
        }
        match clue {
            keys::CLUE_PLAYER_HELPED_SUSPECT => -5,
            keys::CLUE_PLAYER_SHOT_BYSTANDER => -8,
            keys::CLUE_PLAYER_IS_RECKLESS => -3,
            keys::CLUE_PLAYER_CLOSED_CASE => 5,
            keys::CLUE_INFORMANT_TIP => 2,
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
            GOAL_GO_TO_MARKET => {
                Self::walk(ctx, &[(keys::WP_STREET_CROSSING, 0), (keys::WP_MARKET_STALL, 2000)])?;
            }
            GOAL_SEARCH_MARKET => Self::search_market(ctx)?,
            GOAL_GO_TO_ALLEY => {
                Self::walk(ctx, &[(keys::WP_ALLEY_DUMPSTER, 1500), (keys::WP_ALLEY_FIRE_ESCAPE, 0)])?;
            }
            GOAL_RETURN_TO_PRECINCT => Self::return_to_precinct(ctx)?,
            GOAL_FILE_REPORT => {
                ctx.track_flush(me)?;
                ctx.change_animation_mode(me, AnimationMode::SIT)?;
                ctx.timer_start(me, CustomTimer::Task0, REPORT_MS)?;
            }
            GOAL_STAKEOUT_BAR => {
                ctx.timer_reset(me, CustomTimer::Task0)?;
                ctx.track_flush(me)?;
                ctx.set_at_waypoint(me, keys::WP_BAR_STOOL_A, 256)?;
                ctx.change_animation_mode(me, AnimationMode::SIT)?;
            }
            GOAL_CONFRONT => {
                ctx.face_actor(me, ctx.player())?;
                ctx.combat_on(me, None)?;
            }
            GOAL_LEAVE_BAR => {
                ctx.combat_off(me)?;
                ctx.track_flush(me)?;
                ctx.track_append_run(me, keys::WP_BAR_BACK_DOOR, 0)?;
                ctx.track_append(me, keys::WP_STREET_KIOSK, 0)?;
                ctx.track_repeat(me)?;
            }
            GOAL_PATROL_STREET => {
                Self::walk(
                    ctx,
                    &[
                        (keys::WP_STREET_NORTH, 0),
                        (keys::WP_STREET_SOUTH, 1000),
                        (keys::WP_STREET_KIOSK, 0),
                    ],
                )?;
            }
            GOAL_DEAD => ctx.track_flush(me)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn animation_finished(&mut self, ctx: &mut ScriptContext<'_>, finished: StateId) -> ScriptResult {
        if finished == S_STAND_UP && ctx.my_goal()? == GOAL_FILE_REPORT {
            ctx.set_my_goal(GOAL_GO_TO_MARKET)?;
        }
        Ok(())
    }

    fn change_animation_mode(
        &mut self,
        _ctx: &mut ScriptContext<'_>,
        mode: AnimationMode,
    ) -> ScriptResult<bool> {
        let current = self.animator.current_state();
        if mode == AnimationMode::IDLE {
            if current == S_SIT || current == S_SIT_DOWN {
                self.animator.enter(S_STAND_UP);
                return Ok(true);
            }
            if is_combat_state(current) {
                self.animator.enter(state::HOLSTER);
                return Ok(true);
            }
            if current == S_STAND_UP {
                return Ok(true);
            }
        }
        Ok(self.animator.change_mode(mode))
    }

    fn fled_combat(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        ctx.set_my_goal(GOAL_LEAVE_BAR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripts::anim;

    fn library() -> AnimationLibrary {
        let mut library = AnimationLibrary::new();
        register_animations(&mut library);
        library
    }

    #[test]
    fn profile_is_complete() {
        profile().validate(keys::ACTOR_PARTNER, &library()).unwrap();
    }

    #[test]
    fn idle_from_seat_stands_up_first() {
        let library = library();
        let mut partner = Partner::new();
        assert!(partner.animator.change_mode(AnimationMode::SIT));
        for _ in 0..12 {
            partner.animator.update(&library);
        }
        assert_eq!(partner.animator.current_state(), S_SIT);

        partner.animator.enter(S_STAND_UP);
        let mut finished = None;
        for _ in 0..12 {
            finished = finished.or(partner.animator.update(&library).finished);
        }
        assert_eq!(finished, Some(S_STAND_UP));
        assert_eq!(partner.animator.current_state(), state::IDLE);
    }

    #[test]
    fn drawing_from_rest_shows_one_handoff_frame() {
        let library = library();
        let mut partner = Partner::new();
        assert!(partner.animator.change_mode(AnimationMode::COMBAT_IDLE));
        let first = partner.animator.update(&library);
        assert_eq!(first.frame.animation, ANIMATIONS.id(anim::DRAW));
        assert_eq!(partner.animator.current_state(), state::COMBAT_IDLE);
        let second = partner.animator.update(&library);
        assert_eq!(second.frame.animation, ANIMATIONS.id(anim::COMBAT_IDLE));
    }

    #[test]
    fn clue_table_only_concerns_the_detective() {
        let partner = Partner::new();
        assert_eq!(
            partner.friendliness_modifier_if_gets_clue(keys::ACTOR_PLAYER, keys::CLUE_PLAYER_SHOT_BYSTANDER),
            -8
        );
        assert_eq!(
            partner.friendliness_modifier_if_gets_clue(keys::ACTOR_OFFICER, keys::CLUE_PLAYER_SHOT_BYSTANDER),
            0
        );
        assert_eq!(partner.friendliness_modifier_if_gets_clue(keys::ACTOR_PLAYER, keys::CLUE_MATCHBOOK), 0);
    }
}
