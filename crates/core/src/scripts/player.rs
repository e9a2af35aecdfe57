//! The detective under player control. The host drives movement; the
//! script only animates and files what the detective learns.

use tracing::debug;

use super::Humanoid;
use crate::animation::{AnimationLibrary, Animator};
use crate::content::keys;
use crate::context::ScriptContext;
use crate::script::{AiScript, ScriptResult};
use crate::types::*;

const ANIMATIONS: Humanoid = Humanoid::new(100);

pub const LINE_DOWN: LineId = LineId(90);

pub(crate) fn register_animations(library: &mut AnimationLibrary) {
    ANIMATIONS.register(library);
}

pub struct Player {
    animator: Animator,
}

impl Player {
    pub fn new() -> Self {
        Self { animator: Animator::new(ANIMATIONS.profile()) }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl AiScript for Player {
    fn actor(&self) -> ActorId {
        keys::ACTOR_PLAYER
    }

    fn animator(&self) -> &Animator {
        &self.animator
    }

    fn animator_mut(&mut self) -> &mut Animator {
        &mut self.animator
    }

    fn initialize(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        ctx.change_animation_mode(ctx.me(), AnimationMode::IDLE)
    }

    fn received_clue(
        &mut self,
        ctx: &mut ScriptContext<'_>,
        clue: ClueId,
        from: Option<ActorId>,
    ) -> ScriptResult {
        // Anything handed over in person goes straight into the case file.
        if from.is_some() {
            let uploaded = ctx.clues_to_mainframe(ctx.me())?;
            debug!(%clue, uploaded, "detective filed clue");
        }
        Ok(())
    }

    fn shot_at_and_missed(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptResult {
        super::heard_gunshot(ctx);
        ctx.change_animation_mode(ctx.me(), AnimationMode::DODGE)
    }

    fn retired(&mut self, ctx: &mut ScriptContext<'_>, _by: Option<ActorId>) -> ScriptResult {
        ctx.says(ctx.me(), LINE_DOWN)
    }
}
