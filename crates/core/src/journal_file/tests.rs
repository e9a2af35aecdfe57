use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::tempdir;

use super::*;
use crate::content::keys;

fn sample_journal() -> InputJournal {
    let mut journal = InputJournal::new(42, 50);
    journal.build_id = "test-build".to_string();
    journal.content_hash = 99;
    journal.append(3, HostInput::ClickActor { actor: keys::ACTOR_PARTNER });
    journal.append(
        10,
        HostInput::GiveClue {
            actor: keys::ACTOR_INFORMANT,
            clue: keys::CLUE_MATCHBOOK,
            from: Some(keys::ACTOR_PLAYER),
        },
    );
    journal.append(10, HostInput::PlayerCombat { on: true });
    journal.run_ticks = 40;
    journal
}

fn rewrite_line(path: &Path, index: usize, edit: impl FnOnce(&str) -> String) {
    let content = fs::read_to_string(path).unwrap();
    let mut lines: Vec<String> = content.lines().map(String::from).collect();
    lines[index] = edit(&lines[index]);
    fs::write(path, lines.join("\n") + "\n").unwrap();
}

#[test]
fn saved_journal_loads_back_sealed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.jsonl");
    let journal = sample_journal();
    save_journal_to_file(&path, &journal).unwrap();

    let loaded = load_journal_from_file(&path).unwrap();
    assert!(loaded.sealed);
    assert_eq!(loaded.next_seq, 3);
    assert_ne!(loaded.last_sha256_hex, INITIAL_HASH);
    assert_eq!(loaded.journal, journal);
}

#[test]
fn unsealed_journal_takes_run_length_from_last_input() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("crashed.jsonl");
    let mut writer = JournalWriter::create(&path, 7, 50, "dev", 0).unwrap();
    writer.append(2, &HostInput::SetFlag { flag: keys::FLAG_PATROL_ALERTED, on: true }).unwrap();
    writer.append(9, &HostInput::ClickActor { actor: keys::ACTOR_OFFICER }).unwrap();
    drop(writer);

    let loaded = load_journal_from_file(&path).unwrap();
    assert!(!loaded.sealed);
    assert_eq!(loaded.journal.run_ticks, 9);
    assert_eq!(loaded.journal.inputs.len(), 2);
}

#[test]
fn resumed_writer_continues_the_chain() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("resume.jsonl");
    let mut writer = JournalWriter::create(&path, 1, 50, "dev", 0).unwrap();
    writer.append(0, &HostInput::ClickActor { actor: keys::ACTOR_PARTNER }).unwrap();
    drop(writer);

    let loaded = load_journal_from_file(&path).unwrap();
    let mut writer = JournalWriter::resume(&path, loaded.last_sha256_hex, loaded.next_seq).unwrap();
    writer.append(5, &HostInput::SetGlobal { var: keys::VAR_CHAPTER, value: 2 }).unwrap();
    writer.finish(20).unwrap();

    let reloaded = load_journal_from_file(&path).unwrap();
    assert!(reloaded.sealed);
    assert_eq!(reloaded.journal.inputs.len(), 2);
    assert_eq!(reloaded.journal.inputs[1].seq, 1);
    assert_eq!(reloaded.journal.run_ticks, 20);
}

#[test]
fn tampered_input_breaks_the_chain() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tampered.jsonl");
    save_journal_to_file(&path, &sample_journal()).unwrap();

    rewrite_line(&path, 2, |line| line.replace("\"clue\":3", "\"clue\":2"));

    let err = load_journal_from_file(&path).unwrap_err();
    assert!(matches!(err, JournalError::HashChainBroken { line: 3 }), "{err}");
}

#[test]
fn tampered_run_length_breaks_the_chain() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("footer.jsonl");
    save_journal_to_file(&path, &sample_journal()).unwrap();

    rewrite_line(&path, 4, |line| line.replace("\"run_ticks\":40", "\"run_ticks\":41"));

    let err = load_journal_from_file(&path).unwrap_err();
    assert!(matches!(err, JournalError::HashChainBroken { line: 5 }), "{err}");
}

#[test]
fn missing_trailing_newline_is_incomplete() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partial.jsonl");
    save_journal_to_file(&path, &sample_journal()).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    fs::write(&path, content.trim_end()).unwrap();

    let err = load_journal_from_file(&path).unwrap_err();
    assert!(matches!(err, JournalError::IncompleteLine { line: 5 }), "{err}");
}

#[test]
fn garbage_record_is_reported_with_its_line() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("garbage.jsonl");
    let writer = JournalWriter::create(&path, 1, 50, "dev", 0).unwrap();
    drop(writer);
    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file, "{{not json").unwrap();

    let err = load_journal_from_file(&path).unwrap_err();
    assert!(matches!(err, JournalError::InvalidRecord { line: 2, .. }), "{err}");
}

#[test]
fn records_after_the_footer_are_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trailing.jsonl");
    save_journal_to_file(&path, &sample_journal()).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    let first_record = content.lines().nth(1).unwrap().to_string();
    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file, "{first_record}").unwrap();

    let err = load_journal_from_file(&path).unwrap_err();
    assert!(matches!(err, JournalError::TrailingRecord { line: 6 }), "{err}");
}

#[test]
fn empty_file_and_wrong_version_are_rejected() {
    let dir = tempdir().unwrap();
    let empty = dir.path().join("empty.jsonl");
    fs::write(&empty, "").unwrap();
    assert!(matches!(load_journal_from_file(&empty), Err(JournalError::EmptyFile)));

    let future = dir.path().join("future.jsonl");
    fs::write(
        &future,
        "{\"format_version\":9,\"build_id\":\"x\",\"content_hash\":0,\"seed\":1,\"tick_ms\":50}\n",
    )
    .unwrap();
    assert!(matches!(load_journal_from_file(&future), Err(JournalError::UnsupportedVersion(9))));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = load_journal_from_file(&dir.path().join("nope.jsonl")).unwrap_err();
    assert!(matches!(err, JournalError::Io(_)));
}
