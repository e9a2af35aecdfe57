use std::path::PathBuf;

use actor_ai::journal_file::save_journal_to_file;
use actor_ai::movement::MAX_TRACK_ENTRIES;
use actor_ai::replay::replay_to_end;
use actor_ai::state::MAX_FRIENDLINESS;
use actor_ai::{ActorId, ClueId, Director, HostInput, InputJournal, SceneId, SetId, keys};
use anyhow::{Context, Result, bail};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 5000)]
    ticks: u64,
    #[arg(long, default_value_t = 50)]
    tick_ms: u32,
    /// Write the generated inputs as a JSONL journal
    #[arg(short, long)]
    journal: Option<PathBuf>,
}

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
const CLUES: [ClueId; 4] = [
    keys::CLUE_BULLET_CASING,
    keys::CLUE_TORN_RECEIPT,
    keys::CLUE_MATCHBOOK,
    keys::CLUE_PLAYER_SHOT_BYSTANDER,
];

fn choose<T: Copy>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p]
}

fn roll(rng: &mut ChaCha8Rng, sides: u64) -> u64 {
    rng.next_u64() % sides
}

fn random_input(rng: &mut ChaCha8Rng, director: &Director) -> Option<HostInput> {
    let alive: Vec<ActorId> = NPCS
        .iter()
        .copied()
        .filter(|id| director.world().actor(*id).is_ok_and(|actor| !actor.retired))
        .collect();
    let input = match roll(rng, 8) {
        0 => HostInput::ClickActor { actor: choose(rng, &ACTORS) },
        // Bias towards misses so the roster survives long enough to wander
        1 if !alive.is_empty() => HostInput::Shoot {
            target: choose(rng, &alive),
            shooter: keys::ACTOR_PLAYER,
            hit: roll(rng, 3) == 0,
            damage: 1 + roll(rng, 20) as i32,
        },
        2 => HostInput::GiveClue {
            actor: choose(rng, &NPCS),
            clue: choose(rng, &CLUES),
            from: Some(keys::ACTOR_PLAYER),
        },
        3 | 4 => {
            let set = choose(rng, &SETS);
            HostInput::MovePlayer { set, scene: SceneId(set.0.saturating_mul(10)) }
        }
        5 => HostInput::PlayerCombat { on: roll(rng, 2) == 0 },
        6 => HostInput::SetGlobal { var: keys::VAR_CHAPTER, value: 1 + roll(rng, 2) as i32 },
        _ => return None,
    };
    Some(input)
}

fn check_invariants(director: &Director) -> Result<()> {
    let tick = director.current_tick();
    for actor in director.world().actors.values() {
        if actor.hp > actor.max_hp {
            bail!("Invariant failed at tick {tick}: HP > Max HP for {}", actor.name);
        }
        if actor.retired && (actor.in_combat() || actor.hp > 0) {
            bail!("Invariant failed at tick {tick}: retired {} is still fighting", actor.name);
        }
        if actor.track.len() > MAX_TRACK_ENTRIES {
            bail!("Invariant failed at tick {tick}: track overflow for {}", actor.name);
        }
        if actor.friendliness.values().any(|v| !(0..=MAX_FRIENDLINESS).contains(v)) {
            bail!("Invariant failed at tick {tick}: friendliness out of range for {}", actor.name);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Starting Fuzz harness on seed {} for {} ticks...", args.seed, args.ticks);
    let mut director = Director::with_default_scripts(args.seed).context("roster failed to initialize")?;
    let mut journal = InputJournal::new(args.seed, args.tick_ms);
    journal.content_hash = director.content().content_hash();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    while director.current_tick() < args.ticks {
        let tick = director.current_tick();
        if roll(&mut rng, 5) == 0
            && let Some(input) = random_input(&mut rng, &director)
        {
            director.apply(&input).with_context(|| format!("input {input:?} failed at tick {tick}"))?;
            journal.append(tick, input);
        }
        director.tick(args.tick_ms).with_context(|| format!("tick {tick} failed"))?;
        check_invariants(&director)?;
    }
    journal.run_ticks = args.ticks;

    let retired = director.world().actors.values().filter(|actor| actor.retired).count();
    println!(
        "Simulated {} ticks with {} inputs; {} events, {} retired.",
        args.ticks,
        journal.inputs.len(),
        director.log().len(),
        retired
    );

    let replayed = replay_to_end(&journal).context("replay of generated journal failed")?;
    if replayed.final_snapshot_hash != director.snapshot_hash() {
        bail!(
            "Replay diverged: live {:016x}, replay {:016x}",
            director.snapshot_hash(),
            replayed.final_snapshot_hash
        );
    }

    if let Some(path) = args.journal {
        save_journal_to_file(&path, &journal)
            .with_context(|| format!("Failed to write journal: {}", path.display()))?;
        println!("Journal written to {}", path.display());
    }

    println!("Fuzzing completed successfully.");
    Ok(())
}
