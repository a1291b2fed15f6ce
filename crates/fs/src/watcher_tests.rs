use super::*;
use explite_protocol::WatchKind;
use notify::event::{CreateKind, DataChange, RemoveKind};

fn event(kind: EventKind, paths: &[&str]) -> Event {
    paths
        .iter()
        .fold(Event::new(kind), |ev, p| ev.add_path(PathBuf::from(p)))
}

fn rename(mode: RenameMode) -> EventKind {
    EventKind::Modify(ModifyKind::Name(mode))
}

#[test]
fn create_and_remove_pass_through() {
    let mut tr = EventTranslator::default();

    let out = tr.on_event(event(EventKind::Create(CreateKind::File), &["/w/a"]));
    assert_eq!(out, vec![WatchEvent::create(vec!["/w/a".into()])]);

    let out = tr.on_event(event(EventKind::Remove(RemoveKind::Any), &["/w/a"]));
    assert_eq!(out, vec![WatchEvent::remove(vec!["/w/a".into()])]);
}

#[test]
fn rename_halves_pair_and_trailing_both_is_ignored() {
    let mut tr = EventTranslator::default();

    assert!(tr.on_event(event(rename(RenameMode::From), &["/w/old"])).is_empty());
    let out = tr.on_event(event(rename(RenameMode::To), &["/w/new"]));
    assert_eq!(out, vec![WatchEvent::rename("/w/old".into(), "/w/new".into())]);

    let out = tr.on_event(event(rename(RenameMode::Both), &["/w/old", "/w/new"]));
    assert!(out.is_empty(), "combined notice duplicates the pair");
}

#[test]
fn combined_rename_alone_is_reported() {
    let mut tr = EventTranslator::default();
    let out = tr.on_event(event(rename(RenameMode::Both), &["/w/x", "/w/y"]));

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].operation, WatchKind::Rename);
    assert_eq!(out[0].from_paths, vec!["/w/x"]);
    assert_eq!(out[0].to_paths, vec!["/w/y"]);
}

#[test]
fn unpaired_halves_become_remove_and_create() {
    let mut tr = EventTranslator::default();

    tr.on_event(event(rename(RenameMode::From), &["/w/moved-out"]));
    assert_eq!(tr.flush(), vec![WatchEvent::remove(vec!["/w/moved-out".into()])]);
    assert!(tr.flush().is_empty());

    let out = tr.on_event(event(rename(RenameMode::To), &["/w/moved-in"]));
    assert_eq!(out, vec![WatchEvent::create(vec!["/w/moved-in".into()])]);
}

#[test]
fn new_source_flushes_previous_unpaired_source() {
    let mut tr = EventTranslator::default();

    tr.on_event(event(rename(RenameMode::From), &["/w/a"]));
    let out = tr.on_event(event(rename(RenameMode::From), &["/w/b"]));

    assert_eq!(out, vec![WatchEvent::remove(vec!["/w/a".into()])]);
}

#[test]
fn expired_source_is_flushed_before_next_event() {
    let mut tr = EventTranslator::default();

    tr.on_event(event(rename(RenameMode::From), &["/w/a"]));
    std::thread::sleep(RENAME_PAIR_WINDOW * 2);
    let out = tr.on_event(event(EventKind::Create(CreateKind::File), &["/w/c"]));

    assert_eq!(
        out,
        vec![
            WatchEvent::remove(vec!["/w/a".into()]),
            WatchEvent::create(vec!["/w/c".into()]),
        ]
    );
}

#[test]
fn content_changes_are_ignored() {
    let mut tr = EventTranslator::default();
    let kind = EventKind::Modify(ModifyKind::Data(DataChange::Content));

    assert!(tr.on_event(event(kind, &["/w/a"])).is_empty());
}

#[test]
fn unwatch_of_other_path_keeps_active_target() {
    let (tx, _rx) = channel::unbounded();
    let tmp = tempfile::tempdir().expect("create temp dir");
    let dir = tmp.path().to_str().unwrap();
    let watcher = DirWatcher::new(tx);

    watcher.watch(dir, false).expect("watch temp dir");
    watcher.unwatch("/somewhere/else");
    assert_eq!(watcher.target().as_deref(), Some(dir));

    watcher.unwatch(dir);
    assert_eq!(watcher.target(), None);
}
