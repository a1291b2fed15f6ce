use super::*;
use explite_protocol::SortKey;
use serial_test::serial;
use tempfile::tempdir;

fn desc(key: SortKey) -> SortType {
    SortType { asc: false, key }
}

#[test]
fn history_evicts_single_oldest_entry_past_cap() {
    let mut history = SortHistory::default();

    for i in 0..=SORT_HISTORY_CAP {
        // Visit order is deliberately not the timestamp order: the entry
        // written first carries the newest timestamp.
        let time_ms = if i == 0 { 10_000 } else { i as i64 };
        history.record_sort(&format!("/dir/{i}"), desc(SortKey::Size), time_ms);
    }

    assert_eq!(history.len(), SORT_HISTORY_CAP);
    assert!(history.contains("/dir/0"), "newest by timestamp survives");
    assert!(!history.contains("/dir/1"), "oldest by timestamp is evicted");
    assert!(history.contains(&format!("/dir/{SORT_HISTORY_CAP}")));
}

#[test]
fn updating_existing_directory_never_evicts() {
    let mut history = SortHistory::default();
    for i in 0..SORT_HISTORY_CAP {
        history.record_sort(&format!("/dir/{i}"), SortType::default(), i as i64);
    }

    history.record_sort("/dir/0", desc(SortKey::Mdate), 5_000);

    assert_eq!(history.len(), SORT_HISTORY_CAP);
    assert_eq!(history.sort_type("/dir/0"), Some(desc(SortKey::Mdate)));
    assert_eq!(history.get("/dir/0").map(|e| e.time_ms), Some(5_000));
}

#[test]
fn labels_and_sort_are_recorded_independently() {
    let mut history = SortHistory::default();
    let labels = vec![ColumnLabel {
        label: "Name".into(),
        width: 320,
        sort_key: SortKey::Name,
    }];

    history.record_labels("/a", labels.clone(), 1);
    assert_eq!(history.sort_type("/a"), Some(SortType::default()));

    history.record_sort("/a", desc(SortKey::Cdate), 2);
    assert_eq!(history.labels("/a"), Some(labels.as_slice()));
    assert_eq!(history.sort_type("/a"), Some(desc(SortKey::Cdate)));
    assert_eq!(history.labels("/b"), None);
}

#[test]
fn save_then_load_preserves_settings() {
    let dir = tempdir().expect("create temp dir");
    let store = SettingsStore::with_path(dir.path().join("nested").join(SETTINGS_FILE));

    let mut settings = Settings::default();
    settings.header_history.record_sort("/home/me", desc(SortKey::Size), 42);
    settings.add_favorite("/home/me/Music");
    settings.theme = Theme::Dark;

    store.save(&settings).expect("save settings");
    let loaded = store.load();

    assert_eq!(loaded, settings);
}

const SETTINGS_FILE: &str = "settings.json";

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().expect("create temp dir");
    let store = SettingsStore::with_path(dir.path().join(SETTINGS_FILE));

    assert_eq!(store.load(), Settings::default());
}

#[test]
fn malformed_file_yields_defaults() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join(SETTINGS_FILE);
    fs::write(&path, "{ not json").unwrap();

    assert_eq!(SettingsStore::with_path(path).load(), Settings::default());
}

#[test]
fn partial_file_fills_missing_fields_with_defaults() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join(SETTINGS_FILE);
    fs::write(&path, r#"{ "theme": "light", "favorites": ["/tmp"] }"#).unwrap();

    let loaded = SettingsStore::with_path(path).load();
    assert_eq!(loaded.theme, Theme::Light);
    assert_eq!(loaded.favorites, vec!["/tmp"]);
    assert_eq!(loaded.bounds, Bounds::default());
    assert!(loaded.remember_columns);
}

#[test]
fn favorites_are_deduplicated() {
    let mut settings = Settings::default();
    assert!(settings.add_favorite("/a"));
    assert!(!settings.add_favorite("/a"));
    assert!(settings.remove_favorite("/a"));
    assert!(!settings.remove_favorite("/a"));
    assert!(settings.favorites.is_empty());
}

#[test]
fn in_memory_store_never_touches_disk() {
    let store = SettingsStore::in_memory();
    assert!(store.path().is_none());
    store.save(&Settings::default()).expect("noop save");
    assert_eq!(store.load(), Settings::default());
}

#[test]
#[serial]
fn new_respects_settings_disabled_env() {
    unsafe { std::env::set_var(SETTINGS_DISABLED_ENV, "false") };
    assert!(SettingsStore::new().path().is_none());

    unsafe { std::env::set_var(SETTINGS_DISABLED_ENV, "1") };
    assert!(SettingsStore::new().path().is_some());

    unsafe { std::env::remove_var(SETTINGS_DISABLED_ENV) };
    assert!(SettingsStore::new().path().is_some());
}
