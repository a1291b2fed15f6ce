use explite_fs::{FileSystemProvider, MemoryProvider, Volume};
use explite_protocol::{ColumnLabel, Navigation, SortKey, SortType};
use explite_runtime::{HOME, RECYCLE_BIN, default_labels, recycle_bin_labels};

use crate::session::fixture::{names, owned, session};

fn desc(key: SortKey) -> SortType {
    SortType { asc: false, key }
}

fn listing() -> MemoryProvider {
    let fs = MemoryProvider::new();
    fs.add_file("/a/b.txt", 10)
        .add_file("/a/A.txt", 2048)
        .add_dir("/a/sub")
        .add_system_file("/a/socket")
        .add_file("/b/other.txt", 1);
    fs
}

#[test]
fn open_lists_sorts_and_watches() {
    let mut s = session(listing());

    let ev = s.open("/a", Navigation::Direct).expect("open /a");

    assert!(!ev.failed);
    assert_eq!(ev.directory, "/a");
    assert_eq!(ev.sort_type, SortType::default());
    assert_eq!(ev.headers, default_labels());
    assert_eq!(names(&ev.files), vec!["sub", "A.txt", "b.txt"]);
    assert_eq!(s.current_dir(), "/a");
    assert_eq!(s.provider().watched(), Some(("/a".to_string(), false)));
}

#[test]
fn open_missing_path_reports_not_found() {
    let mut s = session(listing());

    assert!(s.open("/nope", Navigation::Direct).is_none());

    assert_eq!(s.dialog().take_messages(), vec!["\"/nope\" does not exist"]);
    assert_eq!(s.current_dir(), HOME);
    assert_eq!(s.provider().count("readdir", None), 0);
}

#[test]
fn switching_directories_moves_the_watch() {
    let mut s = session(listing());
    s.open("/a", Navigation::Direct).expect("open /a");
    s.open("/b", Navigation::Direct).expect("open /b");

    assert_eq!(s.provider().count("unwatch", Some("/a")), 1);
    assert_eq!(s.provider().watched(), Some(("/b".to_string(), false)));
    assert_eq!(s.watch_target(), "/b");
}

#[test]
fn home_clears_the_view_without_listing() {
    let mut s = session(listing());
    s.open("/a", Navigation::Direct).expect("open /a");
    s.provider().clear_calls();

    let ev = s.open(HOME, Navigation::Direct).expect("open home");

    assert!(ev.files.is_empty());
    assert!(s.files().is_empty());
    assert_eq!(ev.sort_type, SortType::default());
    assert_eq!(s.provider().count("readdir", None), 0);
    assert_eq!(s.provider().count("watch", None), 0);
    assert_eq!(s.provider().watched(), None);
}

#[test]
fn listing_failure_keeps_previous_view() {
    let fs = listing();
    let mut s = session(fs);
    s.open("/a", Navigation::Direct).expect("open /a");
    s.provider().fail("readdir");

    let ev = s.open("/b", Navigation::Direct).expect("path exists");

    assert!(ev.failed);
    assert!(ev.files.is_empty());
    assert_eq!(ev.sort_type, SortType::default());
    assert_eq!(s.current_dir(), "/a");
    assert_eq!(s.files().len(), 3);
    assert_eq!(s.dialog().take_messages().len(), 1);
}

#[test]
fn explicit_sort_is_remembered_per_directory() {
    let mut s = session(listing());
    s.open("/a", Navigation::Direct).expect("open /a");

    let sorted = s.sort("/a", Some(desc(SortKey::Size)));
    assert_eq!(sorted.sort_type, desc(SortKey::Size));
    // Descending flips the folder group to the end.
    assert_eq!(names(&sorted.files), vec!["A.txt", "b.txt", "sub"]);

    s.open("/b", Navigation::Direct).expect("open /b");
    assert_eq!(s.sort("/b", None).sort_type, SortType::default());

    let back = s.open("/a", Navigation::Back).expect("back to /a");
    assert_eq!(back.navigation, Navigation::Back);
    assert_eq!(back.sort_type, desc(SortKey::Size));
    assert_eq!(
        s.settings().header_history.sort_type("/a"),
        Some(desc(SortKey::Size))
    );
}

#[test]
fn recycle_bin_lists_trashed_items_without_watching() {
    let mut s = session(listing());
    s.provider()
        .trash(&owned(&["/a/b.txt"]))
        .expect("trash b.txt");

    let ev = s.open(RECYCLE_BIN, Navigation::Direct).expect("open bin");

    assert_eq!(names(&ev.files), vec!["b.txt"]);
    assert_eq!(ev.files[0].original_path, "/a/b.txt");
    assert!(ev.files[0].ddate > 0);
    assert_eq!(ev.headers, recycle_bin_labels());
    assert_eq!(s.provider().count("watch", None), 0);
}

#[test]
fn reload_picks_up_unobserved_changes() {
    let mut s = session(listing());
    s.open("/a", Navigation::Direct).expect("open /a");
    s.provider().add_file("/a/late.txt", 1);

    let ev = s.reload();

    assert_eq!(ev.navigation, Navigation::Reload);
    assert!(names(&ev.files).contains(&"late.txt"));
}

#[test]
fn changed_columns_become_the_directory_headers() {
    let mut s = session(listing());
    s.open("/a", Navigation::Direct).expect("open /a");
    let labels = vec![ColumnLabel {
        label: "Name".into(),
        width: 120,
        sort_key: SortKey::Name,
    }];

    s.change_columns(labels.clone());

    assert_eq!(s.headers("/a"), labels);
    assert_eq!(s.headers("/b"), default_labels());
}

#[test]
fn favorites_are_kept_once() {
    let mut s = session(listing());
    assert!(s.add_favorite("/a"));
    assert!(!s.add_favorite("/a"));
    assert_eq!(s.favorites(), ["/a".to_string()]);
    assert!(s.remove_favorite("/a"));
    assert!(s.favorites().is_empty());
}

#[test]
fn volumes_are_sorted_by_label() {
    let fs = listing();
    fs.set_volumes(vec![
        Volume {
            mount_point: "/mnt/data".into(),
            volume_label: "Data".into(),
            available_units: 5,
            total_units: 10,
        },
        Volume {
            mount_point: "/".into(),
            volume_label: String::new(),
            available_units: 1,
            total_units: 2,
        },
    ]);
    let s = session(fs);

    let drives = s.list_volumes();

    let labels: Vec<&str> = drives.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["/", "Data"]);
    assert_eq!(drives[1].name, "data");
    assert_eq!(drives[1].path, "/mnt/data");
    assert_eq!(drives[1].available, 5);
}

#[test]
fn volume_listing_failure_is_reported() {
    let fs = listing();
    fs.fail("list_volumes");
    let s = session(fs);

    assert!(s.list_volumes().is_empty());
    assert_eq!(s.dialog().take_messages().len(), 1);
}

#[test]
fn home_ignores_a_remembered_sort() {
    let mut s = session(listing());
    let by_size = desc(SortKey::Size);
    s.sort(HOME, Some(by_size));

    let ev = s.open(HOME, Navigation::Direct).expect("open home");

    assert_eq!(ev.sort_type, SortType::default());
}

#[test]
fn reading_another_directory_drops_the_search_cache() {
    let mut s = session(listing());
    s.open("/a", Navigation::Direct).expect("open /a");
    s.search("/a", "x");
    s.end_search(false);
    assert!(s.cached_paths("/a").is_some());

    s.read_files("/b", Navigation::Direct);

    assert!(s.cached_paths("/a").is_none());
}
