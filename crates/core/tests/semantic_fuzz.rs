use actor_ai::movement::MAX_TRACK_ENTRIES;
use actor_ai::replay::replay_to_end;
use actor_ai::state::MAX_FRIENDLINESS;
use actor_ai::{ActorId, ClueId, Director, HostInput, InputJournal, SceneId, SetId, keys};
use proptest::{
    arbitrary::any,
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

const TICK_MS: u32 = 50;

const ACTORS: [ActorId; 5] = [
    keys::ACTOR_PLAYER,
    keys::ACTOR_PARTNER,
    keys::ACTOR_OFFICER,
    keys::ACTOR_PEDESTRIAN,
    keys::ACTOR_INFORMANT,
];
const NPCS: [ActorId; 4] =
    [keys::ACTOR_PARTNER, keys::ACTOR_OFFICER, keys::ACTOR_PEDESTRIAN, keys::ACTOR_INFORMANT];
const SETS: [SetId; 5] =
    [keys::SET_PRECINCT, keys::SET_STREET, keys::SET_MARKET, keys::SET_BAR, keys::SET_ALLEY];
const CLUES: [ClueId; 6] = [
    keys::CLUE_BULLET_CASING,
    keys::CLUE_TORN_RECEIPT,
    keys::CLUE_MATCHBOOK,
    keys::CLUE_PLAYER_HELPED_SUSPECT,
    keys::CLUE_PLAYER_SHOT_BYSTANDER,
    keys::CLUE_PLAYER_CLOSED_CASE,
];

fn choose<T: Copy>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p]
}

fn roll(rng: &mut ChaCha8Rng, sides: u64) -> u64 {
    rng.next_u64() % sides
}

/// Picks a host input that is valid in the current world, if any.
fn random_input(rng: &mut ChaCha8Rng, director: &Director) -> Option<HostInput> {
    let alive: Vec<ActorId> = NPCS
        .iter()
        .copied()
        .filter(|id| director.world().actor(*id).is_ok_and(|actor| !actor.retired))
        .collect();
    let input = match roll(rng, 9) {
        0 => HostInput::ClickActor { actor: choose(rng, &ACTORS) },
        1 if !alive.is_empty() => HostInput::Shoot {
            target: choose(rng, &alive),
            shooter: keys::ACTOR_PLAYER,
            hit: roll(rng, 2) == 0,
            damage: 1 + roll(rng, 15) as i32,
        },
        2 => HostInput::GiveClue {
            actor: choose(rng, &NPCS),
            clue: choose(rng, &CLUES),
            from: if roll(rng, 2) == 0 { Some(keys::ACTOR_PLAYER) } else { None },
        },
        3 | 4 => {
            let set = choose(rng, &SETS);
            HostInput::MovePlayer { set, scene: SceneId(set.0 * 10) }
        }
        5 => HostInput::PlayerCombat { on: roll(rng, 2) == 0 },
        6 => HostInput::SetGlobal { var: keys::VAR_CHAPTER, value: 1 + roll(rng, 2) as i32 },
        7 => HostInput::SetFlag { flag: keys::FLAG_PATROL_ALERTED, on: roll(rng, 2) == 0 },
        8 if !alive.is_empty() && roll(rng, 4) == 0 => {
            HostInput::Retire { actor: choose(rng, &alive), by: Some(keys::ACTOR_PLAYER) }
        }
        _ => return None,
    };
    Some(input)
}

fn check_invariants(director: &Director, seed: u64) -> Result<(), String> {
    for actor in director.world().actors.values() {
        if actor.hp > actor.max_hp {
            return Err(format!("Invariant failed: HP > Max HP for {} on seed {}", actor.id, seed));
        }
        if actor.retired && (actor.in_combat() || actor.hp > 0) {
            return Err(format!("Invariant failed: retired actor {} still fighting on seed {}", actor.id, seed));
        }
        if actor.track.len() > MAX_TRACK_ENTRIES {
            return Err(format!("Invariant failed: track overflow for {} on seed {}", actor.id, seed));
        }
        if actor.friendliness.values().any(|v| !(0..=MAX_FRIENDLINESS).contains(v)) {
            return Err(format!("Invariant failed: friendliness out of range for {} on seed {}", actor.id, seed));
        }
    }
    Ok(())
}

fn run_fuzz_simulation(seed: u64, input_seed: u64, max_ticks: u64) -> Result<(), String> {
    let mut director = Director::with_default_scripts(seed).map_err(|e| e.to_string())?;
    let mut journal = InputJournal::new(seed, TICK_MS);
    let mut rng = ChaCha8Rng::seed_from_u64(input_seed);

    while director.current_tick() < max_ticks {
        let tick = director.current_tick();
        if roll(&mut rng, 6) == 0
            && let Some(input) = random_input(&mut rng, &director)
        {
            director
                .apply(&input)
                .map_err(|e| format!("input {input:?} failed at tick {tick} on seed {seed}: {e}"))?;
            journal.append(tick, input);
        }
        director
            .tick(TICK_MS)
            .map_err(|e| format!("tick {tick} failed on seed {seed}: {e}"))?;
        check_invariants(&director, seed)?;
    }

    journal.run_ticks = max_ticks;
    let replayed = replay_to_end(&journal).map_err(|e| format!("replay failed on seed {seed}: {e}"))?;
    if replayed.final_snapshot_hash != director.snapshot_hash() {
        return Err(format!("Replay diverged from live run on seed {seed}"));
    }
    Ok(())
}

#[test]
fn test_fuzz_director_simulation() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(16));
    let seeds = (any::<u64>(), any::<u64>());

    runner
        .run(&seeds, |(seed, input_seed)| {
            run_fuzz_simulation(seed, input_seed, 1500).map_err(TestCaseError::fail)?;
            Ok(())
        })
        .expect("semantic fuzz simulation should preserve invariants");
}
