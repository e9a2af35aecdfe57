pub mod animation;
pub mod content;
pub mod context;
pub mod director;
pub mod error;
pub mod journal;
pub mod journal_file;
pub mod movement;
pub mod replay;
pub mod script;
pub mod scripts;
pub mod state;
pub mod types;
pub mod waypoints;

pub use animation::{AnimationLibrary, AnimationProfile, AnimationState, Animator};
pub use content::{ContentPack, keys};
pub use context::ScriptContext;
pub use director::Director;
pub use error::ScriptError;
pub use journal::{HostInput, InputJournal, InputRecord};
pub use replay::*;
pub use script::{AiScript, ScriptResult};
pub use state::WorldState;
pub use types::*;
