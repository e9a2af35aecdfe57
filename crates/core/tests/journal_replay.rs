use actor_ai::journal_file::{JournalWriter, load_journal_from_file};
use actor_ai::replay::{replay_director, replay_to_end};
use actor_ai::{ContentPack, Director, HostInput, keys};

const TICK_MS: u32 = 50;

/// Plays a street scene while writing every input to a JSONL journal, then
/// loads the file and replays it. The snapshot hash must match.
#[test]
fn test_file_journal_replay_equivalence() {
    let dir = tempfile::tempdir().unwrap();
    let journal_path = dir.path().join("street.jsonl");
    let seed = 12345u64;
    let content_hash = ContentPack::default().content_hash();

    let schedule: Vec<(u64, HostInput)> = vec![
        (10, HostInput::ClickActor { actor: keys::ACTOR_PARTNER }),
        (40, HostInput::MovePlayer { set: keys::SET_STREET, scene: keys::SCENE_STREET }),
        (60, HostInput::PlayerCombat { on: true }),
        (
            65,
            HostInput::Shoot {
                target: keys::ACTOR_PEDESTRIAN,
                shooter: keys::ACTOR_PLAYER,
                hit: true,
                damage: 20,
            },
        ),
        (90, HostInput::PlayerCombat { on: false }),
        (200, HostInput::MovePlayer { set: keys::SET_BAR, scene: keys::SCENE_BAR }),
        (
            210,
            HostInput::GiveClue {
                actor: keys::ACTOR_INFORMANT,
                clue: keys::CLUE_MATCHBOOK,
                from: Some(keys::ACTOR_PLAYER),
            },
        ),
        (220, HostInput::ClickActor { actor: keys::ACTOR_INFORMANT }),
    ];
    let run_ticks = 600;

    let mut director = Director::with_default_scripts(seed).unwrap();
    let mut writer = JournalWriter::create(&journal_path, seed, TICK_MS, "test", content_hash).unwrap();
    let mut pending = schedule.iter().peekable();
    while director.current_tick() < run_ticks {
        let tick = director.current_tick();
        while let Some((_, input)) = pending.next_if(|(at, _)| *at == tick) {
            writer.append(tick, input).unwrap();
            director.apply(input).unwrap();
        }
        director.tick(TICK_MS).unwrap();
    }
    writer.finish(run_ticks).unwrap();
    let original_hash = director.snapshot_hash();

    let loaded = load_journal_from_file(&journal_path).unwrap();
    assert!(loaded.sealed);
    assert_eq!(loaded.journal.inputs.len(), schedule.len());

    let replayed = replay_to_end(&loaded.journal).unwrap();
    assert_eq!(replayed.final_tick, run_ticks);
    assert_eq!(
        replayed.final_snapshot_hash, original_hash,
        "replay from file must reproduce the recorded run"
    );

    let replayed = replay_director(&loaded.journal).unwrap();
    let pedestrian = replayed.world().actor(keys::ACTOR_PEDESTRIAN).unwrap();
    assert!(pedestrian.retired);
    assert!(replayed.world().mainframe().contains(&keys::CLUE_INFORMANT_TIP));
}

/// A run that crashed before sealing still replays up to its last input.
#[test]
fn test_unsealed_journal_replays_to_last_input() {
    let dir = tempfile::tempdir().unwrap();
    let journal_path = dir.path().join("crashed.jsonl");

    let mut writer = JournalWriter::create(&journal_path, 7, TICK_MS, "test", 0).unwrap();
    writer.append(5, &HostInput::SetGlobal { var: keys::VAR_CHAPTER, value: 2 }).unwrap();
    writer.append(30, &HostInput::MovePlayer { set: keys::SET_BAR, scene: keys::SCENE_BAR }).unwrap();
    drop(writer);

    let loaded = load_journal_from_file(&journal_path).unwrap();
    assert!(!loaded.sealed);
    let director = replay_director(&loaded.journal).unwrap();
    assert_eq!(director.current_tick(), 30);
    assert_eq!(director.world().player_set(), Some(keys::SET_BAR));
    let partner = director.world().actor(keys::ACTOR_PARTNER).unwrap();
    assert_eq!(partner.set, keys::SET_BAR);
}
