//! Stable snapshot hashing for deterministic verification.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use super::*;

impl Director {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u64(self.tick);
        hasher.write_u64(self.world.time_ms());
        hasher.write_u16(self.world.player_scene.0);
        for flag in self.world.flags() {
            hasher.write_u16(flag.0);
        }
        for (var, value) in self.world.globals() {
            hasher.write_u16(var.0);
            hasher.write_i32(value);
        }
        for clue in self.world.mainframe() {
            hasher.write_u16(clue.0);
        }
        hasher.write_usize(self.world.log().len());
        hasher.write_u64(self.world.rng_fingerprint());

        for (id, actor) in &self.world.actors {
            hasher.write_u16(id.0);
            hasher.write_u16(actor.set.0);
            write_vec3(&mut hasher, actor.position);
            hasher.write_u16(actor.heading);
            hasher.write_i32(actor.goal.0);
            hasher.write_u8(actor.animation_mode.map_or(u8::MAX, |mode| mode.0));
            hasher.write_u32(actor.frame.animation.0);
            hasher.write_u32(actor.frame.frame);
            hasher.write_u32(actor.frame_timer_ms);
            hasher.write_i32(actor.hp);
            hasher.write_i32(actor.score);
            hasher.write_u8(u8::from(actor.retired));
            match &actor.combat {
                None => hasher.write_u8(0),
                Some(combat) => {
                    hasher.write_u8(1);
                    hasher.write_u16(combat.target.map_or(u16::MAX, |target| target.0));
                }
            }
            for (other, value) in &actor.friendliness {
                hasher.write_u16(other.0);
                hasher.write_i32(*value);
            }
            for clue in &actor.clues {
                hasher.write_u16(clue.0);
            }
            for clue in &actor.new_clues {
                hasher.write_u16(clue.0);
            }
            for timer in actor.timers {
                hasher.write_u32(timer.unwrap_or(u32::MAX));
            }
            hasher.write_usize(actor.track.len());
            hasher.write_usize(actor.track.cursor());
            hasher.write_u8(u8::from(actor.track.is_active()));
            hasher.write_u8(u8::from(actor.track.is_paused()));
            for entry in actor.track.entries() {
                write_entry(&mut hasher, entry);
            }
            match actor.motion {
                Motion::Still => hasher.write_u8(0),
                Motion::Walking { entry, target } => {
                    hasher.write_u8(1);
                    write_entry(&mut hasher, &entry);
                    write_vec3(&mut hasher, target);
                }
                Motion::Waiting { remaining_ms } => {
                    hasher.write_u8(2);
                    hasher.write_u32(remaining_ms);
                }
            }

            if let Some(script) = self.scripts.get(id) {
                let quad = script.query_animation_state();
                hasher.write_u32(quad.state);
                hasher.write_u32(quad.frame);
                hasher.write_u32(quad.state_next);
                hasher.write_u32(quad.animation_next.map_or(u32::MAX, |a| a.0));
            }
        }
        hasher.finish()
    }
}

fn write_vec3(hasher: &mut Xxh3, point: Vec3) {
    hasher.write_u32(point.x.to_bits());
    hasher.write_u32(point.y.to_bits());
    hasher.write_u32(point.z.to_bits());
}

fn write_entry(hasher: &mut Xxh3, entry: &TrackEntry) {
    hasher.write_u16(entry.waypoint.0);
    hasher.write_u32(entry.delay_ms);
    hasher.write_u16(entry.heading.unwrap_or(u16::MAX));
    hasher.write_u8(u8::from(entry.run));
}
