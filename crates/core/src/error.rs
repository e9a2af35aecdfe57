use thiserror::Error;

use crate::types::{ActorId, AnimationId, StateId, WaypointId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("actor {0} is not part of the roster")]
    UnknownActor(ActorId),
    #[error("actor {0} already has a script")]
    DuplicateScript(ActorId),
    #[error("actor {0} has no script")]
    MissingScript(ActorId),
    #[error("waypoint {0} is not defined")]
    UnknownWaypoint(WaypointId),
    #[error("animation {animation} used by actor {actor} is missing from the library")]
    UnknownAnimation { actor: ActorId, animation: AnimationId },
    #[error("actor {actor}: animation profile references undefined state {state}")]
    UndefinedState { actor: ActorId, state: StateId },
    #[error("notification storm: more than {limit} notifications queued by one callback")]
    NotificationStorm { limit: usize },
    #[error("actor {0} is retired")]
    ActorRetired(ActorId),
}
