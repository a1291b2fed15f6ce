use super::*;
use explite_protocol::WatchKind;

fn tree() -> MemoryProvider {
    let p = MemoryProvider::new();
    p.add_dir("/home/me/docs")
        .add_file("/home/me/docs/a.txt", 10)
        .add_file("/home/me/docs/sub/b.md", 20)
        .add_dir("/home/me/dst");
    p
}

fn names(entries: &[Dirent]) -> Vec<&str> {
    entries.iter().map(|d| d.name.as_str()).collect()
}

#[test]
fn readdir_flat_and_recursive() {
    let p = tree();

    let flat = p.readdir("/home/me/docs", false).unwrap();
    assert_eq!(names(&flat), vec!["a.txt", "sub"]);
    assert_eq!(flat[0].parent_path, "/home/me/docs");
    assert_eq!(flat[0].mime_type, "text/plain");
    assert!(flat[1].attributes.is_directory);

    let deep = p.readdir("/home/me/docs", true).unwrap();
    assert_eq!(names(&deep), vec!["a.txt", "sub", "b.md"]);
    assert_eq!(p.count("readdir", Some("/home/me/docs")), 2);
}

#[test]
fn injected_failures_are_recorded_calls() {
    let p = tree();
    p.fail("trash");

    let err = p.trash(&["/home/me/docs/a.txt".to_string()]).unwrap_err();
    assert!(matches!(err, ProviderError::Failed { op: "trash", .. }));
    assert!(p.exists("/home/me/docs/a.txt"));
    assert_eq!(p.count("trash", None), 1);

    p.clear_failures();
    p.trash(&["/home/me/docs/a.txt".to_string()]).unwrap();
    assert!(!p.exists("/home/me/docs/a.txt"));
}

#[test]
fn mutations_under_watched_dir_queue_events() {
    let p = tree();
    p.watch("/home/me/docs", false).unwrap();

    p.create("/home/me/docs/new.txt").unwrap();
    p.rename("/home/me/docs/new.txt", "/home/me/docs/renamed.txt").unwrap();
    p.move_items(&["/home/me/docs/renamed.txt".to_string()], "/home/me/dst").unwrap();
    // Outside the watched directory: silent.
    p.create("/home/me/dst/other.txt").unwrap();

    let events = p.take_events();
    let kinds: Vec<WatchKind> = events.iter().map(|e| e.operation).collect();
    assert_eq!(kinds, vec![WatchKind::Create, WatchKind::Rename, WatchKind::Remove]);
    assert_eq!(events[2].to_paths, vec!["/home/me/docs/renamed.txt"]);
    assert!(p.take_events().is_empty());
}

#[test]
fn recursive_watch_sees_nested_changes() {
    let p = tree();
    p.watch("/home/me", true).unwrap();
    p.create("/home/me/docs/sub/deep.txt").unwrap();

    assert_eq!(
        p.take_events(),
        vec![WatchEvent::create(vec!["/home/me/docs/sub/deep.txt".into()])]
    );

    p.unwatch("/home/other").unwrap();
    assert_eq!(p.watched(), Some(("/home/me".to_string(), true)));
    p.unwatch("/home/me").unwrap();
    assert_eq!(p.watched(), None);
}

#[test]
fn copy_duplicates_subtree() {
    let p = tree();
    p.copy(&["/home/me/docs".to_string()], "/home/me/dst").unwrap();

    assert!(p.exists("/home/me/dst/docs/sub/b.md"));
    assert!(p.exists("/home/me/docs/sub/b.md"));
    assert!(p.copy(&["/home/me/docs".to_string()], "/home/me/docs/sub").is_err());
}

#[test]
fn recycle_bin_round_trip_picks_latest_deletion() {
    let p = tree();
    let a = "/home/me/docs/a.txt".to_string();

    p.trash(&[a.clone()]).unwrap();
    p.add_file(&a, 99);
    p.trash(&[a.clone()]).unwrap();

    let bin = p.read_recycle_bin().unwrap();
    assert_eq!(bin.len(), 2);
    assert!(bin[0].deleted_date_ms < bin[1].deleted_date_ms);

    p.undelete(&[a.clone()]).unwrap();
    assert_eq!(p.stat(&a).unwrap().size, 99);

    let rest = p.read_recycle_bin().unwrap();
    let item = UndeleteItem {
        original_path: a.clone(),
        deleted_time_ms: rest[0].deleted_date_ms,
    };
    assert!(matches!(
        p.undelete_by_time(&[item.clone()]),
        Err(ProviderError::AlreadyExists(_))
    ));

    p.delete_from_recycle_bin(&[item]).unwrap();
    assert!(p.read_recycle_bin().unwrap().is_empty());
}

#[test]
fn symlink_attributes_follow_target() {
    let p = tree();
    p.add_symlink("/home/me/link", "/home/me/docs/a.txt");
    p.add_symlink("/home/me/dangling", "/nowhere");

    let link = p.stat("/home/me/link").unwrap();
    assert!(link.is_symbolic_link);
    assert!(link.is_file);
    assert_eq!(link.size, 10);
    assert_eq!(link.link_path, "/home/me/docs/a.txt");

    let dangling = p.stat("/home/me/dangling").unwrap();
    assert!(!dangling.is_file && !dangling.is_directory);
}
