use std::collections::BTreeMap;

use crate::error::ScriptError;
use crate::types::{SetId, Vec3, WaypointId};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Waypoint {
    pub set: SetId,
    pub position: Vec3,
}

#[derive(Clone, Debug, Default)]
pub struct WaypointTable {
    waypoints: BTreeMap<WaypointId, Waypoint>,
}

impl WaypointTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: WaypointId, set: SetId, position: Vec3) {
        self.waypoints.insert(id, Waypoint { set, position });
    }

    pub fn get(&self, id: WaypointId) -> Result<Waypoint, ScriptError> {
        self.waypoints.get(&id).copied().ok_or(ScriptError::UnknownWaypoint(id))
    }

    pub fn contains(&self, id: WaypointId) -> bool {
        self.waypoints.contains_key(&id)
    }

    pub fn in_set(&self, set: SetId) -> impl Iterator<Item = (WaypointId, &Waypoint)> + '_ {
        self.waypoints.iter().filter(move |(_, wp)| wp.set == set).map(|(id, wp)| (*id, wp))
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}
