use std::collections::BTreeSet;

use explite_fs::{FileSystemProvider, MemoryProvider};
use explite_protocol::Navigation;
use explite_runtime::{RECYCLE_BIN, SEARCH_CACHE_CAP};

use super::SearchCache;
use crate::session::fixture::{names, owned, session};

fn photos() -> MemoryProvider {
    let fs = MemoryProvider::new();
    fs.add_file("/photos/vacation.jpg", 1)
        .add_file("/photos/2019/Vacation-beach.png", 1)
        .add_file("/photos/2019/work.png", 1)
        .add_dir("/photos/holiday")
        .add_system_file("/photos/vac.sock");
    fs
}

fn recursive_listings(fs: &MemoryProvider) -> usize {
    fs.calls()
        .iter()
        .filter(|c| c.op == "readdir" && c.args.get(1).map(String::as_str) == Some("recursive"))
        .count()
}

#[test]
fn first_search_lists_recursively_once_and_caches_paths() {
    let mut s = session(photos());
    s.open("/photos", Navigation::Direct).expect("open");
    s.provider().clear_calls();

    let result = s.search("/photos", "vac");

    assert_eq!(recursive_listings(s.provider()), 1);
    assert_eq!(names(&result.files), vec!["vacation.jpg", "Vacation-beach.png"]);

    let cached: BTreeSet<&str> = s
        .cached_paths("/photos")
        .expect("cache populated")
        .iter()
        .map(String::as_str)
        .collect();
    let expected: BTreeSet<&str> = [
        "/photos/2019",
        "/photos/2019/Vacation-beach.png",
        "/photos/2019/work.png",
        "/photos/holiday",
        "/photos/vacation.jpg",
    ]
    .into_iter()
    .collect();
    assert_eq!(cached, expected);

    assert!(s.is_searching());
    assert_eq!(s.search_keyword(), "vac");
    assert_eq!(
        names(s.search_backup().expect("snapshot")),
        vec!["2019", "holiday", "vacation.jpg"]
    );
    assert_eq!(s.provider().watched(), Some(("/photos".to_string(), true)));
}

#[test]
fn repeated_search_reuses_cache_and_snapshot() {
    let mut s = session(photos());
    s.open("/photos", Navigation::Direct).expect("open");
    s.search("/photos", "vac");
    s.provider().clear_calls();

    let result = s.search("/photos", "work");

    assert_eq!(recursive_listings(s.provider()), 0);
    assert_eq!(s.provider().count("watch", None), 0);
    assert_eq!(names(&result.files), vec!["work.png"]);
    assert_eq!(s.search_backup().map(<[_]>::len), Some(3));
}

#[test]
fn ending_search_restores_listing_and_watch() {
    let mut s = session(photos());
    s.open("/photos", Navigation::Direct).expect("open");
    s.search("/photos", "vac");

    let restored = s.end_search(false);

    assert_eq!(names(&restored.files), vec!["2019", "holiday", "vacation.jpg"]);
    assert!(!s.is_searching());
    assert_eq!(s.search_keyword(), "");
    assert_eq!(s.provider().watched(), Some(("/photos".to_string(), false)));
}

#[test]
fn temporary_end_keeps_recursive_watch() {
    let mut s = session(photos());
    s.open("/photos", Navigation::Direct).expect("open");
    s.search("/photos", "vac");

    s.end_search(true);

    assert!(!s.is_searching());
    assert_eq!(s.provider().watched(), Some(("/photos".to_string(), true)));
}

#[test]
fn recycle_bin_search_filters_display_names() {
    let fs = MemoryProvider::new();
    fs.add_file("/a/report.txt", 1).add_file("/a/notes.txt", 1);
    fs.trash(&owned(&["/a/report.txt", "/a/notes.txt"]))
        .expect("trash");
    let mut s = session(fs);
    s.open(RECYCLE_BIN, Navigation::Direct).expect("open bin");
    s.provider().clear_calls();

    let result = s.search(RECYCLE_BIN, "rep");

    assert_eq!(names(&result.files), vec!["report.txt"]);
    assert!(s.provider().calls().is_empty());
}

#[test]
fn searching_an_empty_directory_still_snapshots() {
    let fs = MemoryProvider::new();
    fs.add_dir("/empty");
    let mut s = session(fs);
    s.open("/empty", Navigation::Direct).expect("open");

    assert!(s.search("/empty", "x").files.is_empty());
    assert_eq!(s.search_backup().map(<[_]>::len), Some(0));
    assert!(s.is_searching());
}

#[test]
fn listing_failure_during_search_is_reported() {
    let mut s = session(photos());
    s.open("/photos", Navigation::Direct).expect("open");
    s.provider().fail("readdir");

    assert!(s.search("/photos", "vac").files.is_empty());
    assert_eq!(s.dialog().take_messages().len(), 1);
    assert!(s.cached_paths("/photos").is_none());
}

#[test]
fn changing_directory_drops_search_state() {
    let fs = photos();
    fs.add_dir("/other");
    let mut s = session(fs);
    s.open("/photos", Navigation::Direct).expect("open");
    s.search("/photos", "vac");

    s.open("/other", Navigation::Direct).expect("open other");

    assert!(!s.is_searching());
    assert_eq!(s.search_keyword(), "");
    assert!(s.cached_paths("/photos").is_none());
}

#[test]
fn cache_evicts_oldest_root_past_capacity() {
    let mut cache = SearchCache::default();
    for i in 0..=SEARCH_CACHE_CAP {
        cache.insert(&format!("/dir/{i}"), vec![format!("/dir/{i}/f")]);
    }

    assert_eq!(cache.len(), SEARCH_CACHE_CAP);
    assert!(cache.get("/dir/0").is_none());
    assert!(cache.get(&format!("/dir/{SEARCH_CACHE_CAP}")).is_some());

    // Refreshing a root does not reorder or evict.
    cache.insert("/dir/1", Vec::new());
    assert_eq!(cache.len(), SEARCH_CACHE_CAP);
    assert_eq!(cache.get("/dir/1"), Some(&[][..]));
}

#[test]
fn failed_navigation_during_search_restores_the_listing() {
    let fs = photos();
    fs.add_dir("/other");
    let mut s = session(fs);
    s.open("/photos", Navigation::Direct).expect("open");
    s.search("/photos", "vac");
    s.provider().fail("readdir");

    let ev = s.open("/other", Navigation::Direct).expect("path exists");

    assert!(ev.failed);
    assert_eq!(s.current_dir(), "/photos");
    assert!(!s.is_searching());
    assert_eq!(names(s.files()), vec!["2019", "holiday", "vacation.jpg"]);
    assert_eq!(s.provider().watched(), Some(("/photos".to_string(), false)));
    assert!(s.cached_paths("/photos").is_some());
}
