use std::f32::consts::TAU;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($($(#[$meta:meta])* $name:ident($inner:ty);)+) => {
        $(
            $(#[$meta])*
            #[derive(
                Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
            )]
            #[serde(transparent)]
            pub struct $name(pub $inner);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )+
    };
}

id_type! {
    ActorId(u16);
    SetId(u16);
    SceneId(u16);
    WaypointId(u16);
    ClueId(u16);
    FlagId(u16);
    VariableId(u16);
    AnimationId(u32);
    /// Index into an actor's dialogue lines.
    LineId(u32);
    /// High-level scripted task of an actor.
    Goal(i32);
}

/// Identifier of a row in an [`crate::animation::AnimationProfile`].
pub type StateId = u32;

/// Abstract animation request understood by every animator.
///
/// The code space is open: values without a named constant (talk variants,
/// character specific gestures) are still valid modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimationMode(pub u8);

impl AnimationMode {
    pub const IDLE: Self = Self(0);
    pub const WALK: Self = Self(1);
    pub const RUN: Self = Self(2);
    pub const TALK: Self = Self(3);
    pub const COMBAT_IDLE: Self = Self(4);
    pub const COMBAT_AIM: Self = Self(5);
    pub const COMBAT_ATTACK: Self = Self(6);
    pub const COMBAT_WALK: Self = Self(7);
    pub const COMBAT_RUN: Self = Self(8);
    pub const DODGE: Self = Self(20);
    pub const HIT: Self = Self(21);
    pub const COMBAT_HIT: Self = Self(22);
    pub const WALK_UP: Self = Self(44);
    pub const WALK_DOWN: Self = Self(45);
    pub const DIE: Self = Self(48);
    pub const COMBAT_DIE: Self = Self(49);
    pub const SIT: Self = Self(53);
    pub const CLIMB_UP: Self = Self(64);
    pub const CLIMB_DOWN: Self = Self(65);

    /// Talk variant `n` (0..=10), mapped onto codes 9..=19.
    pub const fn talk_variant(n: u8) -> Self {
        Self(9 + if n > 10 { 10 } else { n })
    }

    pub fn is_talk(self) -> bool {
        self == Self::TALK || (9..=19).contains(&self.0)
    }
}

impl fmt::Display for AnimationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mode#{}", self.0)
    }
}

/// Timers a script may start for itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CustomTimer {
    Task0,
    Task1,
    Task2,
}

impl CustomTimer {
    pub const ALL: [Self; 3] = [Self::Task0, Self::Task1, Self::Task2];

    pub(crate) fn slot(self) -> usize {
        match self {
            Self::Task0 => 0,
            Self::Task1 => 1,
            Self::Task2 => 2,
        }
    }
}

/// Every countdown an actor carries; the last two are owned by the runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerId {
    Custom(CustomTimer),
    MovementTrack,
    AnimationFrame,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(self, other: Self) -> f32 {
        let (dx, dy, dz) = (other.x - self.x, other.y - self.y, other.z - self.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Moves toward `target` by at most `step` units. Returns the new point and
    /// whether the target was reached.
    pub fn step_toward(self, target: Self, step: f32) -> (Self, bool) {
        let dist = self.distance(target);
        if dist <= step || dist <= f32::EPSILON {
            return (target, true);
        }
        let t = step / dist;
        let next = Self {
            x: self.x + (target.x - self.x) * t,
            y: self.y + (target.y - self.y) * t,
            z: self.z + (target.z - self.z) * t,
        };
        (next, false)
    }

    /// Heading in 0..1024 units, 0 facing +z, growing clockwise.
    pub fn heading_to(self, target: Self) -> u16 {
        let angle = (target.x - self.x).atan2(target.z - self.z);
        let turns = angle / TAU;
        let units = (turns * 1024.0).round() as i32;
        units.rem_euclid(1024) as u16
    }
}

/// One frame produced by `UpdateAnimation`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationFrame {
    pub animation: AnimationId,
    pub frame: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatToggle {
    On,
    Off,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogEvent {
    GoalChanged { actor: ActorId, from: Goal, to: Goal, handled: bool },
    AnimationModeChanged { actor: ActorId, mode: AnimationMode, accepted: bool },
    Said { actor: ActorId, line: LineId },
    ClueAcquired { actor: ActorId, clue: ClueId, from: Option<ActorId> },
    FriendlinessChanged { actor: ActorId, toward: ActorId, value: i32 },
    EnteredSet { actor: ActorId, set: SetId },
    ReachedWaypoint { actor: ActorId, waypoint: WaypointId, proceed: bool },
    CompletedMovementTrack { actor: ActorId },
    TimerExpired { actor: ActorId, timer: CustomTimer },
    Combat { actor: ActorId, toggle: CombatToggle, target: Option<ActorId> },
    Shot { actor: ActorId, hit: bool, damage: i32 },
    FledCombat { actor: ActorId },
    Retired { actor: ActorId, by: Option<ActorId> },
    ClickedByPlayer { actor: ActorId, handled: bool },
    ScoreChanged { actor: ActorId, score: i32 },
}
