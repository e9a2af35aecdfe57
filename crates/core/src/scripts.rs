//! Stock behaviours for the demonstration roster.
//!
//! Each module owns one actor's script plus the animations it plays. The
//! humanoid locomotion and combat set is shared; actors add their own
//! states on top of it.

use crate::animation::{AnimationLibrary, AnimationProfile, EndRule, ModeRule};
use crate::context::ScriptContext;
use crate::content::keys;
use crate::script::AiScript;
use crate::types::{AnimationId, AnimationMode, StateId};

pub mod informant;
pub mod partner;
pub mod patrol_officer;
pub mod pedestrian;
pub mod player;

pub use informant::Informant;
pub use partner::Partner;
pub use patrol_officer::PatrolOfficer;
pub use pedestrian::Pedestrian;
pub use player::Player;

/// Animation offsets inside a humanoid's block of ids.
pub mod anim {
    pub const IDLE: u32 = 0;
    pub const WALK: u32 = 1;
    pub const RUN: u32 = 2;
    pub const TALK: u32 = 3;
    pub const COMBAT_IDLE: u32 = 4;
    pub const COMBAT_WALK: u32 = 5;
    pub const COMBAT_RUN: u32 = 6;
    pub const DRAW: u32 = 7;
    pub const HOLSTER: u32 = 8;
    pub const HIT: u32 = 9;
    pub const COMBAT_HIT: u32 = 10;
    pub const DIE: u32 = 11;
    pub const COMBAT_DIE: u32 = 12;
    pub const DODGE: u32 = 13;
}

/// State numbers shared by every humanoid profile.
pub mod state {
    use crate::types::StateId;

    pub const IDLE: StateId = 0;
    pub const WALK: StateId = 1;
    pub const RUN: StateId = 2;
    pub const TALK: StateId = 3;
    pub const COMBAT_IDLE: StateId = 4;
    pub const COMBAT_WALK: StateId = 5;
    pub const COMBAT_RUN: StateId = 6;
    pub const HIT: StateId = 7;
    pub const COMBAT_HIT: StateId = 8;
    pub const DIE: StateId = 9;
    pub const COMBAT_DIE: StateId = 10;
    pub const DODGE: StateId = 11;
    pub const HOLSTER: StateId = 12;

    pub const COMBAT: [StateId; 4] = [COMBAT_IDLE, COMBAT_WALK, COMBAT_RUN, COMBAT_HIT];
}

/// `(offset, frame count)` of the shared humanoid animations, all at 15 fps.
const HUMANOID_FRAMES: [(u32, u32); 14] = [
    (anim::IDLE, 24),
    (anim::WALK, 16),
    (anim::RUN, 12),
    (anim::TALK, 20),
    (anim::COMBAT_IDLE, 18),
    (anim::COMBAT_WALK, 16),
    (anim::COMBAT_RUN, 12),
    (anim::DRAW, 9),
    (anim::HOLSTER, 9),
    (anim::HIT, 7),
    (anim::COMBAT_HIT, 7),
    (anim::DIE, 22),
    (anim::COMBAT_DIE, 20),
    (anim::DODGE, 8),
];

pub const HUMANOID_FPS: u32 = 15;

/// A block of animation ids laid out like [`anim`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Humanoid {
    base: u32,
}

impl Humanoid {
    pub const fn new(base: u32) -> Self {
        Self { base }
    }

    pub const fn id(self, offset: u32) -> AnimationId {
        AnimationId(self.base + offset)
    }

    pub fn register(self, library: &mut AnimationLibrary) {
        for (offset, frames) in HUMANOID_FRAMES {
            library.insert(self.id(offset), frames, HUMANOID_FPS);
        }
    }

    /// Standing, walking, talking, combat and death states.
    pub fn profile(self) -> AnimationProfile {
        let mut profile = AnimationProfile::new(state::IDLE, self.id(anim::IDLE))
            .state(state::WALK, self.id(anim::WALK), EndRule::Loop)
            .state(state::RUN, self.id(anim::RUN), EndRule::Loop)
            .state(state::TALK, self.id(anim::TALK), EndRule::Loop)
            .state(state::COMBAT_IDLE, self.id(anim::COMBAT_IDLE), EndRule::Loop)
            .state(state::COMBAT_WALK, self.id(anim::COMBAT_WALK), EndRule::Loop)
            .state(state::COMBAT_RUN, self.id(anim::COMBAT_RUN), EndRule::Loop)
            .state(state::HIT, self.id(anim::HIT), EndRule::Then(state::IDLE))
            .state(state::COMBAT_HIT, self.id(anim::COMBAT_HIT), EndRule::Then(state::COMBAT_IDLE))
            .state(state::DIE, self.id(anim::DIE), EndRule::Hold)
            .state(state::COMBAT_DIE, self.id(anim::COMBAT_DIE), EndRule::Hold)
            .state(state::DODGE, self.id(anim::DODGE), EndRule::Then(state::IDLE))
            .state(state::HOLSTER, self.id(anim::HOLSTER), EndRule::Then(state::IDLE))
            .mode_rule(AnimationMode::IDLE, ModeRule::to(state::IDLE).keep_in(&[state::IDLE, state::HOLSTER]))
            .mode(AnimationMode::WALK, state::WALK)
            .mode(AnimationMode::RUN, state::RUN)
            .mode_rule(AnimationMode::TALK, ModeRule::to(state::TALK).keep_in(&[state::TALK]))
            .mode_rule(
                AnimationMode::COMBAT_IDLE,
                ModeRule::to(state::COMBAT_IDLE)
                    .keep_in(&[state::COMBAT_IDLE])
                    .with_handoff(self.id(anim::DRAW)),
            )
            .mode(AnimationMode::COMBAT_AIM, state::COMBAT_IDLE)
            .mode(AnimationMode::COMBAT_WALK, state::COMBAT_WALK)
            .mode(AnimationMode::COMBAT_RUN, state::COMBAT_RUN)
            .mode(AnimationMode::HIT, state::HIT)
            .mode(AnimationMode::COMBAT_HIT, state::COMBAT_HIT)
            .mode(AnimationMode::DIE, state::DIE)
            .mode(AnimationMode::COMBAT_DIE, state::COMBAT_DIE)
            .mode(AnimationMode::DODGE, state::DODGE);
        for variant in 0..=10 {
            profile = profile.mode_rule(
                AnimationMode::talk_variant(variant),
                ModeRule::to(state::TALK).keep_in(&[state::TALK]),
            );
        }
        profile
    }
}

/// Ids at or above this are actor specific extras.
pub(crate) const EXTRA: u32 = 20;

pub(crate) fn is_combat_state(current: StateId) -> bool {
    state::COMBAT.contains(&current)
}

/// Any shot fired near an actor counts toward the street's alarm level.
pub(crate) fn heard_gunshot(ctx: &mut ScriptContext<'_>) -> i32 {
    ctx.increment_global(keys::VAR_GUNSHOTS, 1)
}

pub fn register_animations(library: &mut AnimationLibrary) {
    player::register_animations(library);
    partner::register_animations(library);
    patrol_officer::register_animations(library);
    pedestrian::register_animations(library);
    informant::register_animations(library);
}

/// One stock script per roster actor, in actor order.
pub fn default_roster() -> Vec<Box<dyn AiScript>> {
    vec![
        Box::new(Player::new()),
        Box::new(Partner::new()),
        Box::new(PatrolOfficer::new()),
        Box::new(Pedestrian::new()),
        Box::new(Informant::new()),
    ]
}
