use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use crate::animation::AnimationLibrary;
use crate::scripts;
use crate::types::{ActorId, SetId, Vec3, WaypointId};
use crate::waypoints::WaypointTable;

pub mod keys {
    use crate::types::{ActorId, ClueId, FlagId, SceneId, SetId, VariableId, WaypointId};

    pub const ACTOR_PLAYER: ActorId = ActorId(0);
    pub const ACTOR_PARTNER: ActorId = ActorId(1);
    pub const ACTOR_OFFICER: ActorId = ActorId(2);
    pub const ACTOR_PEDESTRIAN: ActorId = ActorId(3);
    pub const ACTOR_INFORMANT: ActorId = ActorId(4);

    pub const SET_PRECINCT: SetId = SetId(1);
    pub const SET_STREET: SetId = SetId(2);
    pub const SET_MARKET: SetId = SetId(3);
    pub const SET_BAR: SetId = SetId(4);
    pub const SET_ALLEY: SetId = SetId(5);
    /// Holding area for actors that are not on screen anywhere.
    pub const SET_OFFSTAGE: SetId = SetId(99);

    pub const SCENE_PRECINCT: SceneId = SceneId(10);
    pub const SCENE_STREET: SceneId = SceneId(20);
    pub const SCENE_MARKET: SceneId = SceneId(30);
    pub const SCENE_BAR: SceneId = SceneId(40);
    pub const SCENE_ALLEY: SceneId = SceneId(50);

    pub const WP_PRECINCT_DESK: WaypointId = WaypointId(1);
    pub const WP_PRECINCT_DOOR: WaypointId = WaypointId(2);
    pub const WP_PRECINCT_BENCH: WaypointId = WaypointId(3);
    pub const WP_STREET_NORTH: WaypointId = WaypointId(10);
    pub const WP_STREET_SOUTH: WaypointId = WaypointId(11);
    pub const WP_STREET_KIOSK: WaypointId = WaypointId(12);
    pub const WP_STREET_CROSSING: WaypointId = WaypointId(13);
    pub const WP_STREET_BUS_STOP: WaypointId = WaypointId(14);
    pub const WP_MARKET_STALL: WaypointId = WaypointId(20);
    pub const WP_MARKET_FOUNTAIN: WaypointId = WaypointId(21);
    pub const WP_MARKET_GATE: WaypointId = WaypointId(22);
    pub const WP_BAR_STOOL_A: WaypointId = WaypointId(30);
    pub const WP_BAR_STOOL_B: WaypointId = WaypointId(31);
    pub const WP_BAR_BACK_DOOR: WaypointId = WaypointId(32);
    pub const WP_ALLEY_DUMPSTER: WaypointId = WaypointId(40);
    pub const WP_ALLEY_FIRE_ESCAPE: WaypointId = WaypointId(41);
    pub const WP_OFFSTAGE_A: WaypointId = WaypointId(90);
    pub const WP_OFFSTAGE_B: WaypointId = WaypointId(91);

    pub const CLUE_BULLET_CASING: ClueId = ClueId(1);
    pub const CLUE_TORN_RECEIPT: ClueId = ClueId(2);
    pub const CLUE_MATCHBOOK: ClueId = ClueId(3);
    pub const CLUE_PLAYER_HELPED_SUSPECT: ClueId = ClueId(10);
    pub const CLUE_PLAYER_SHOT_BYSTANDER: ClueId = ClueId(11);
    pub const CLUE_PLAYER_IS_RECKLESS: ClueId = ClueId(12);
    pub const CLUE_PLAYER_CLOSED_CASE: ClueId = ClueId(13);
    pub const CLUE_INFORMANT_TIP: ClueId = ClueId(20);

    pub const FLAG_CASING_TAKEN: FlagId = FlagId(1);
    pub const FLAG_RECEIPT_TAKEN: FlagId = FlagId(2);
    pub const FLAG_MATCHBOOK_TAKEN: FlagId = FlagId(3);
    pub const FLAG_PARTNER_MET_PLAYER: FlagId = FlagId(4);
    pub const FLAG_PATROL_ALERTED: FlagId = FlagId(5);
    pub const FLAG_INFORMANT_GREETED: FlagId = FlagId(6);
    pub const FLAG_INFORMANT_TIPPED: FlagId = FlagId(7);
    pub const FLAG_PARTNER_DOWN: FlagId = FlagId(8);

    pub const VAR_CHAPTER: VariableId = VariableId(1);
    pub const VAR_EVIDENCE_MISSED: VariableId = VariableId(2);
    pub const VAR_GUNSHOTS: VariableId = VariableId(3);
}

#[derive(Clone, Debug)]
pub struct ActorSpec {
    pub id: ActorId,
    pub name: &'static str,
    pub set: SetId,
    pub position: Vec3,
    pub max_hp: i32,
}

pub struct ContentPack {
    pub player: ActorId,
    pub roster: Vec<ActorSpec>,
    pub waypoints: WaypointTable,
    pub animations: AnimationLibrary,
}

impl ContentPack {
    pub fn build_default() -> Self {
        let mut waypoints = WaypointTable::new();
        let points: [(WaypointId, SetId, Vec3); 18] = [
            (keys::WP_PRECINCT_DESK, keys::SET_PRECINCT, Vec3::new(-40.0, 0.0, 12.0)),
            (keys::WP_PRECINCT_DOOR, keys::SET_PRECINCT, Vec3::new(60.0, 0.0, -30.0)),
            (keys::WP_STREET_NORTH, keys::SET_STREET, Vec3::new(0.0, 0.0, 180.0)),
            (keys::WP_STREET_SOUTH, keys::SET_STREET, Vec3::new(0.0, 0.0, -180.0)),
            (keys::WP_STREET_KIOSK, keys::SET_STREET, Vec3::new(75.0, 0.0, 20.0)),
            (keys::WP_STREET_CROSSING, keys::SET_STREET, Vec3::new(-60.0, 0.0, 0.0)),
            (keys::WP_MARKET_STALL, keys::SET_MARKET, Vec3::new(25.0, 0.0, 90.0)),
            (keys::WP_MARKET_FOUNTAIN, keys::SET_MARKET, Vec3::new(0.0, 0.0, 0.0)),
            (keys::WP_MARKET_GATE, keys::SET_MARKET, Vec3::new(-110.0, 0.0, -40.0)),
            (keys::WP_BAR_STOOL_A, keys::SET_BAR, Vec3::new(-12.0, 0.0, 30.0)),
            (keys::WP_BAR_STOOL_B, keys::SET_BAR, Vec3::new(12.0, 0.0, 30.0)),
            (keys::WP_BAR_BACK_DOOR, keys::SET_BAR, Vec3::new(90.0, 0.0, 95.0)),
            (keys::WP_ALLEY_DUMPSTER, keys::SET_ALLEY, Vec3::new(30.0, 0.0, -20.0)),
            (keys::WP_ALLEY_FIRE_ESCAPE, keys::SET_ALLEY, Vec3::new(-30.0, 24.0, 60.0)),
            (keys::WP_OFFSTAGE_A, keys::SET_OFFSTAGE, Vec3::default()),
            (keys::WP_OFFSTAGE_B, keys::SET_OFFSTAGE, Vec3::new(10.0, 0.0, 0.0)),
            (keys::WP_PRECINCT_BENCH, keys::SET_PRECINCT, Vec3::new(-40.0, 0.0, 60.0)),
            (keys::WP_STREET_BUS_STOP, keys::SET_STREET, Vec3::new(120.0, 0.0, -90.0)),
        ];
        for (id, set, position) in points {
            waypoints.insert(id, set, position);
        }

        let mut animations = AnimationLibrary::new();
        scripts::register_animations(&mut animations);

        Self {
            player: keys::ACTOR_PLAYER,
            roster: vec![
                ActorSpec {
                    id: keys::ACTOR_PLAYER,
                    name: "Detective",
                    set: keys::SET_PRECINCT,
                    position: Vec3::new(-40.0, 0.0, 12.0),
                    max_hp: 50,
                },
                ActorSpec {
                    id: keys::ACTOR_PARTNER,
                    name: "Partner",
                    set: keys::SET_OFFSTAGE,
                    position: Vec3::default(),
                    max_hp: 40,
                },
                ActorSpec {
                    id: keys::ACTOR_OFFICER,
                    name: "Patrol Officer",
                    set: keys::SET_STREET,
                    position: Vec3::new(0.0, 0.0, 180.0),
                    max_hp: 40,
                },
                ActorSpec {
                    id: keys::ACTOR_PEDESTRIAN,
                    name: "Pedestrian",
                    set: keys::SET_STREET,
                    position: Vec3::new(120.0, 0.0, -90.0),
                    max_hp: 12,
                },
                ActorSpec {
                    id: keys::ACTOR_INFORMANT,
                    name: "Informant",
                    set: keys::SET_BAR,
                    position: Vec3::new(12.0, 0.0, 30.0),
                    max_hp: 20,
                },
            ],
            waypoints,
            animations,
        }
    }

    /// Stable fingerprint of the roster and waypoint layout, stamped into journals.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        for spec in &self.roster {
            hasher.write_u16(spec.id.0);
            hasher.write(spec.name.as_bytes());
            hasher.write_u16(spec.set.0);
            hasher.write_i32(spec.max_hp);
        }
        for set in [
            keys::SET_PRECINCT,
            keys::SET_STREET,
            keys::SET_MARKET,
            keys::SET_BAR,
            keys::SET_ALLEY,
            keys::SET_OFFSTAGE,
        ] {
            for (id, waypoint) in self.waypoints.in_set(set) {
                hasher.write_u16(id.0);
                hasher.write_u32(waypoint.position.x.to_bits());
                hasher.write_u32(waypoint.position.y.to_bits());
                hasher.write_u32(waypoint.position.z.to_bits());
            }
        }
        hasher.write_usize(self.animations.len());
        hasher.finish()
    }
}

impl Default for ContentPack {
    fn default() -> Self {
        Self::build_default()
    }
}
