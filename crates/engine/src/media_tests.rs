use super::*;
use explite_fs::MemoryProvider;

fn attr() -> FileAttribute {
    FileAttribute {
        is_file: true,
        mtime_ms: 1_700_000_000_000,
        birthtime_ms: 1_600_000_000_000,
        size: 2049,
        ..FileAttribute::default()
    }
}

fn dirent(full_path: &str, attributes: FileAttribute, mime: &str) -> Dirent {
    Dirent {
        name: basename(full_path),
        parent_path: dirname(full_path),
        full_path: full_path.to_string(),
        mime_type: mime.to_string(),
        attributes,
    }
}

fn dir_attr() -> FileAttribute {
    FileAttribute {
        is_directory: true,
        is_file: false,
        size: 0,
        ..attr()
    }
}

#[test]
fn regular_file_fields() {
    let m = Materializer::default();
    let f = m.from_dirent(&dirent("/home/me/Report Final.PDF", attr(), "application/pdf"));

    assert_eq!(f.id, "%2Fhome%2Fme%2FReport%20Final.PDF");
    assert_eq!(f.name, "Report Final.PDF");
    assert_eq!(f.dir, "/home/me");
    assert_eq!(f.extension, ".pdf");
    assert_eq!(f.actual_extension, ".pdf");
    assert_eq!(f.size, 3, "2049 bytes round up to 3 KB");
    assert_eq!(f.size_string, "3 KB");
    assert_eq!(f.entity_type, EntityType::File);
    assert!(f.is_file);
    assert_eq!(f.file_type, FileType::App);
    assert!(!f.mdate_string.is_empty());
    assert_eq!(f.ddate_string, "");
}

#[test]
fn file_type_precedence() {
    let m = Materializer::new(Labels::default(), Platform::Posix);
    let cases: &[(&str, &str, FileType)] = &[
        ("/x/a.mp3", "audio/mpeg", FileType::Audio),
        ("/x/a.mkv", "video/x-matroska", FileType::Video),
        ("/x/a.png", "image/png", FileType::Image),
        ("/x/a.zip", "application/zip", FileType::Zip),
        ("/x/a.exe", "application/x-msdownload", FileType::App),
        // Allow-listed extensions win over a misleading mime.
        ("/x/a.ts", "video/mp2t", FileType::Normal),
        ("/x/a.json", "application/json", FileType::Normal),
        ("/x/a.txt", "text/plain", FileType::Normal),
        ("/x/a", "", FileType::Normal),
    ];

    for (path, mime, expected) in cases {
        let f = m.from_dirent(&dirent(path, attr(), mime));
        assert_eq!(f.file_type, *expected, "{path} ({mime})");
    }
}

#[test]
fn folders_and_special_folders() {
    let posix = Materializer::new(Labels::default(), Platform::Posix);

    let f = posix.from_dirent(&dirent("/home/me/Desktop", dir_attr(), ""));
    assert_eq!(f.file_type, FileType::Desktop);
    assert_eq!(f.extension, "FileFolder");
    assert_eq!(f.actual_extension, "");
    assert_eq!(f.size_string, "");
    assert!(!f.is_file);

    let nested = posix.from_dirent(&dirent("/home/me/work/Music", dir_attr(), ""));
    assert_eq!(nested.file_type, FileType::Folder);

    let outside = posix.from_dirent(&dirent("/srv/me/Videos", dir_attr(), ""));
    assert_eq!(outside.file_type, FileType::Folder);

    let hidden = FileAttribute {
        is_hidden: true,
        ..dir_attr()
    };
    let f = posix.from_dirent(&dirent("/home/me/.config", hidden, ""));
    assert_eq!(f.file_type, FileType::HiddenFolder);

    let windows = Materializer::new(Labels::default(), Platform::Windows);
    let f = windows.from_dirent(&dirent("C:\\Users\\me\\Downloads", dir_attr(), ""));
    assert_eq!(f.file_type, FileType::Downloads);
    let f = windows.from_dirent(&dirent("/home/me/Downloads", dir_attr(), ""));
    assert_eq!(f.file_type, FileType::Folder, "POSIX layout ignored on Windows");
}

#[test]
fn symlinks_are_shortcuts_and_group_with_files() {
    let m = Materializer::default();
    let to_dir = FileAttribute {
        is_symbolic_link: true,
        link_path: "/data".to_string(),
        ..dir_attr()
    };
    let f = m.from_dirent(&dirent("/home/me/data", to_dir, ""));
    assert_eq!(f.entity_type, EntityType::SymlinkFolder);
    assert_eq!(f.extension, "Shortcut");
    assert!(!f.is_file);
    assert_eq!(f.link_path, "/data");

    let to_file = FileAttribute {
        is_symbolic_link: true,
        ..attr()
    };
    let f = m.from_dirent(&dirent("/home/me/Game.lnk", to_file, ""));
    assert_eq!(f.entity_type, EntityType::SymlinkFile);
    assert_eq!(f.name, "Game");
    assert_eq!(f.extension, "Shortcut");
    assert_eq!(f.actual_extension, ".lnk");
    assert!(f.is_file);
}

#[test]
fn custom_labels_are_used() {
    let labels = Labels {
        folder: "Dossier".into(),
        shortcut: "Raccourci".into(),
    };
    let m = Materializer::new(labels, Platform::Posix);
    let f = m.from_dirent(&dirent("/tmp/x", dir_attr(), ""));
    assert_eq!(f.extension, "Dossier");
}

#[test]
fn from_path_stats_and_resolves_mime_through_links() {
    let p = MemoryProvider::new();
    p.add_file("/m/song.mp3", 5000).add_symlink("/m/link", "/m/song.mp3").add_dir("/m/sub");

    let m = Materializer::default();
    let link = m.from_path(&p, "/m/link").expect("materialize link");
    assert_eq!(link.file_type, FileType::Audio);
    assert_eq!(link.entity_type, EntityType::SymlinkFile);
    assert_eq!(p.count("mime_type", Some("/m/song.mp3")), 1);

    m.from_path(&p, "/m/sub").expect("materialize dir");
    assert_eq!(p.count("mime_type", Some("/m/sub")), 0, "no mime lookup for directories");

    let err = m.from_path(&p, "/m/missing").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn recycle_items_carry_origin_and_deletion_time() {
    let m = Materializer::default();
    let item = RecycleBinItem {
        name: "old.txt".into(),
        full_path: "/trash/files/old.txt.2".into(),
        original_path: "/home/me/old.txt".into(),
        deleted_date_ms: 1_700_000_000_000,
        mime_type: "text/plain".into(),
        attributes: attr(),
    };

    let f = m.from_recycle_item(&item);
    assert_eq!(f.name, "old.txt");
    assert_eq!(f.full_path, "/trash/files/old.txt.2");
    assert_eq!(f.original_path, "/home/me/old.txt");
    assert_eq!(f.ddate, 1_700_000_000_000);
    assert!(!f.ddate_string.is_empty());
    assert_eq!(f.mime_type, "text/plain");
}

#[test]
fn size_string_groups_thousands() {
    assert_eq!(size_string(0), "0 KB");
    assert_eq!(size_string(999), "999 KB");
    assert_eq!(size_string(1000), "1,000 KB");
    assert_eq!(size_string(1_234_567), "1,234,567 KB");
}

#[test]
fn display_name_strips_shortcut_suffix_only() {
    assert_eq!(display_name("C:/x/App.LNK"), "App");
    assert_eq!(display_name("/x/notes.lnk.txt"), "notes.lnk.txt");
    assert_eq!(display_name(""), "");
}
