//! Data-driven animation state machines.
//!
//! Every actor owns an [`Animator`]: an [`AnimationProfile`] (the table of
//! states and mode rules) plus the mutable [`AnimationState`] quad that the
//! runtime saves and restores. Scripts with special cases wrap the animator
//! and react to the [`AnimationStep`] it reports.

use std::collections::BTreeMap;
use std::iter;

use serde::{Deserialize, Serialize};

use crate::error::ScriptError;
use crate::types::{ActorId, AnimationFrame, AnimationId, AnimationMode, StateId};

const DEFAULT_FPS: u32 = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationInfo {
    pub frame_count: u32,
    pub fps: u32,
}

/// Frame counts and playback rates of every known animation.
#[derive(Clone, Debug, Default)]
pub struct AnimationLibrary {
    entries: BTreeMap<AnimationId, AnimationInfo>,
}

impl AnimationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, animation: AnimationId, frame_count: u32, fps: u32) {
        self.entries
            .insert(animation, AnimationInfo { frame_count: frame_count.max(1), fps: fps.max(1) });
    }

    pub fn contains(&self, animation: AnimationId) -> bool {
        self.entries.contains_key(&animation)
    }

    pub fn info(&self, animation: AnimationId) -> Option<AnimationInfo> {
        self.entries.get(&animation).copied()
    }

    /// Unknown animations count as a single frame.
    pub fn frame_count(&self, animation: AnimationId) -> u32 {
        self.entries.get(&animation).map_or(1, |info| info.frame_count)
    }

    pub fn frame_interval_ms(&self, animation: AnimationId) -> u32 {
        let fps = self.entries.get(&animation).map_or(DEFAULT_FPS, |info| info.fps);
        1000 / fps
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The `(state, frame, state_next, animation_next)` quad exposed through
/// `QueryAnimationState` / `SetAnimationState`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationState {
    pub state: StateId,
    pub frame: u32,
    pub state_next: StateId,
    /// Set while a hand-off frame is pending.
    pub animation_next: Option<AnimationId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndRule {
    Loop,
    /// Stay on the last frame.
    Hold,
    Then(StateId),
    /// Hold the last frame and ask the runtime to switch the actor's mode.
    ThenMode(AnimationMode),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateRule {
    pub animation: AnimationId,
    pub end: EndRule,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeRule {
    pub target: StateId,
    /// States that already satisfy the mode; requesting it there changes nothing.
    pub keep_in: Vec<StateId>,
    /// Frame shown for one update when entering from the rest state.
    pub handoff: Option<AnimationId>,
}

impl ModeRule {
    pub fn to(target: StateId) -> Self {
        Self { target, keep_in: Vec::new(), handoff: None }
    }

    pub fn keep_in(mut self, states: &[StateId]) -> Self {
        self.keep_in.extend_from_slice(states);
        self
    }

    pub fn with_handoff(mut self, animation: AnimationId) -> Self {
        self.handoff = Some(animation);
        self
    }
}

#[derive(Clone, Debug)]
pub struct AnimationProfile {
    rest: StateId,
    rest_rule: StateRule,
    states: BTreeMap<StateId, StateRule>,
    modes: BTreeMap<AnimationMode, ModeRule>,
}

impl AnimationProfile {
    /// Creates a profile whose rest state loops `idle`.
    pub fn new(rest: StateId, idle: AnimationId) -> Self {
        let rest_rule = StateRule { animation: idle, end: EndRule::Loop };
        let mut modes = BTreeMap::new();
        modes.insert(AnimationMode::IDLE, ModeRule::to(rest).keep_in(&[rest]));
        Self { rest, rest_rule, states: BTreeMap::new(), modes }
    }

    pub fn state(mut self, id: StateId, animation: AnimationId, end: EndRule) -> Self {
        let rule = StateRule { animation, end };
        if id == self.rest {
            self.rest_rule = rule;
        } else {
            self.states.insert(id, rule);
        }
        self
    }

    pub fn mode(self, mode: AnimationMode, target: StateId) -> Self {
        self.mode_rule(mode, ModeRule::to(target))
    }

    pub fn mode_rule(mut self, mode: AnimationMode, rule: ModeRule) -> Self {
        self.modes.insert(mode, rule);
        self
    }

    pub fn rest(&self) -> StateId {
        self.rest
    }

    pub fn has_state(&self, state: StateId) -> bool {
        state == self.rest || self.states.contains_key(&state)
    }

    /// Undefined states fall back to the rest rule.
    pub fn rule(&self, state: StateId) -> &StateRule {
        if state == self.rest {
            return &self.rest_rule;
        }
        self.states.get(&state).unwrap_or(&self.rest_rule)
    }

    pub fn mode_rule_for(&self, mode: AnimationMode) -> Option<&ModeRule> {
        self.modes.get(&mode)
    }

    pub fn modes(&self) -> impl Iterator<Item = AnimationMode> + '_ {
        self.modes.keys().copied()
    }

    fn animations(&self) -> impl Iterator<Item = AnimationId> + '_ {
        iter::once(self.rest_rule.animation)
            .chain(self.states.values().map(|rule| rule.animation))
            .chain(self.modes.values().filter_map(|rule| rule.handoff))
    }

    /// Checks that every referenced state and animation exists.
    pub fn validate(&self, actor: ActorId, library: &AnimationLibrary) -> Result<(), ScriptError> {
        if let Some(animation) = self.animations().find(|a| !library.contains(*a)) {
            return Err(ScriptError::UnknownAnimation { actor, animation });
        }
        if let Some(rule) = self.modes.values().find(|rule| !self.has_state(rule.target)) {
            return Err(ScriptError::UndefinedState { actor, state: rule.target });
        }
        for rule in iter::once(&self.rest_rule).chain(self.states.values()) {
            if let EndRule::Then(next) = rule.end
                && !self.has_state(next)
            {
                return Err(ScriptError::UndefinedState { actor, state: next });
            }
        }
        Ok(())
    }
}

/// Result of one `UpdateAnimation` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationStep {
    pub frame: AnimationFrame,
    /// State whose animation just ran out, if any.
    pub finished: Option<StateId>,
    /// Mode the actor should switch to, from an [`EndRule::ThenMode`].
    pub request_mode: Option<AnimationMode>,
}

#[derive(Clone, Debug)]
pub struct Animator {
    profile: AnimationProfile,
    state: AnimationState,
}

impl Animator {
    pub fn new(profile: AnimationProfile) -> Self {
        let rest = profile.rest();
        Self {
            profile,
            state: AnimationState { state: rest, frame: 0, state_next: rest, animation_next: None },
        }
    }

    pub fn profile(&self) -> &AnimationProfile {
        &self.profile
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn set_state(&mut self, state: AnimationState) {
        self.state = state;
    }

    pub fn current_state(&self) -> StateId {
        self.state.state
    }

    pub fn is_resting(&self) -> bool {
        self.state.state == self.profile.rest() && self.state.animation_next.is_none()
    }

    /// Jumps straight to `state` at frame 0, dropping any pending hand-off.
    pub fn enter(&mut self, state: StateId) {
        self.state.state = state;
        self.state.frame = 0;
        self.state.animation_next = None;
    }

    /// Shows `animation` for one update, then continues in `state`.
    pub fn enter_via(&mut self, animation: AnimationId, state: StateId) {
        self.state.frame = 0;
        self.state.state_next = state;
        self.state.animation_next = Some(animation);
    }

    pub fn update(&mut self, library: &AnimationLibrary) -> AnimationStep {
        if let Some(animation) = self.state.animation_next.take() {
            self.state.frame = 0;
            self.state.state = self.state.state_next;
            return AnimationStep {
                frame: AnimationFrame { animation, frame: 0 },
                finished: None,
                request_mode: None,
            };
        }

        let current = self.state.state;
        let rule = *self.profile.rule(current);
        let count = library.frame_count(rule.animation);
        let mut animation = rule.animation;
        let mut finished = None;
        let mut request_mode = None;

        self.state.frame = self.state.frame.saturating_add(1);
        if self.state.frame >= count {
            match rule.end {
                EndRule::Loop => self.state.frame = 0,
                EndRule::Hold => self.state.frame = count - 1,
                EndRule::Then(next) => {
                    finished = Some(current);
                    self.state.state = next;
                    self.state.frame = 0;
                    animation = self.profile.rule(next).animation;
                }
                EndRule::ThenMode(mode) => {
                    finished = Some(current);
                    self.state.frame = count - 1;
                    request_mode = Some(mode);
                }
            }
        }

        AnimationStep {
            frame: AnimationFrame { animation, frame: self.state.frame },
            finished,
            request_mode,
        }
    }

    /// Applies the profile's rule for `mode`. Returns `false` for modes the
    /// profile does not know.
    pub fn change_mode(&mut self, mode: AnimationMode) -> bool {
        let Some(rule) = self.profile.mode_rule_for(mode) else {
            return false;
        };
        if rule.keep_in.contains(&self.state.state) {
            return true;
        }
        let (target, handoff) = (rule.target, rule.handoff);
        match handoff {
            Some(animation) if self.is_resting() => self.enter_via(animation, target),
            _ => self.enter(target),
        }
        true
    }
}
