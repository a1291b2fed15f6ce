use explite_protocol::{EntityType, FileType, MoveResult, Navigation, SortType};

use super::*;

fn file(name: &str, is_file: bool) -> MediaFile {
    MediaFile {
        id: format!("%2Fa%2F{name}"),
        full_path: format!("/a/{name}"),
        dir: "/a".into(),
        name: name.into(),
        mdate: 0,
        mdate_string: "2026/01/02 03:04:05".into(),
        cdate: 0,
        cdate_string: String::new(),
        ddate: 0,
        ddate_string: String::new(),
        size: 2,
        size_string: if is_file { "2 KB".into() } else { String::new() },
        extension: String::new(),
        actual_extension: String::new(),
        is_file,
        entity_type: if is_file {
            EntityType::File
        } else {
            EntityType::Folder
        },
        file_type: if is_file {
            FileType::Normal
        } else {
            FileType::Folder
        },
        link_path: String::new(),
        original_path: String::new(),
        mime_type: String::new(),
    }
}

fn loaded(files: Vec<MediaFile>) -> DaemonReply {
    DaemonReply {
        response: DaemonResponse::Loaded(LoadEvent {
            files,
            directory: "/a".into(),
            navigation: Navigation::Direct,
            sort_type: SortType::default(),
            failed: false,
            headers: Vec::new(),
        }),
        messages: Vec::new(),
    }
}

fn human(reply: &DaemonReply, color: ColorChoice) -> (String, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    {
        let cfg = PrinterConfig {
            format: OutputFormat::Human,
            color,
        };
        let mut printer = HumanPrinter::new(&mut out, &mut err, cfg);
        printer.print_reply(reply).expect("print");
    }
    (
        String::from_utf8(out).expect("utf-8"),
        String::from_utf8(err).expect("utf-8"),
    )
}

#[test]
fn human_listing_marks_folders() {
    let reply = loaded(vec![file("docs", false), file("x.txt", true)]);

    let (out, err) = human(&reply, ColorChoice::Never);

    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("  docs/"));
    assert!(lines[1].starts_with("2026/01/02 03:04:05"));
    assert!(lines[1].ends_with("2 KB  x.txt"));
    assert_eq!(err, "/a (2 items)\n");
}

#[test]
fn color_only_when_forced() {
    let reply = loaded(vec![file("docs", false)]);

    let (plain, _) = human(&reply, ColorChoice::Auto);
    let (colored, _) = human(&reply, ColorChoice::Always);

    assert!(!plain.contains('\x1b'));
    assert!(colored.contains("\x1b[34mdocs/\x1b[0m"));
}

#[test]
fn recycle_rows_print_restore_selector() {
    let mut item = file("x.txt", true);
    item.original_path = "/a/x.txt".into();
    item.ddate = 1_700_000_000_000;
    item.ddate_string = "2023/11/14 22:13:20".into();

    let (out, _) = human(&loaded(vec![item]), ColorChoice::Never);

    assert!(out.trim_end().ends_with("/a/x.txt@1700000000000"), "{out}");
}

#[test]
fn messages_go_to_stderr() {
    let reply = DaemonReply {
        response: DaemonResponse::Done(false),
        messages: vec!["\"/a/x\" already exists".into()],
    };

    let (out, err) = human(&reply, ColorChoice::Never);

    assert!(out.is_empty());
    assert_eq!(err, "[error] \"/a/x\" already exists\n");
}

#[test]
fn created_item_prints_decoded_path() {
    let reply = DaemonReply {
        response: DaemonResponse::Created(explite_protocol::CreateResult {
            new_item_id: "%2Fa%2Fnew%20folder".into(),
            success: true,
        }),
        messages: Vec::new(),
    };

    let (out, _) = human(&reply, ColorChoice::Never);

    assert_eq!(out, "/a/new folder\n");
}

#[test]
fn json_emits_one_object_per_line() {
    let reply = loaded(vec![file("x.txt", true), file("y.txt", true)]);
    let mut out = Vec::new();
    let mut err = Vec::new();
    JsonPrinter::new(&mut out, &mut err)
        .print_reply(&reply)
        .expect("print");

    let values: Vec<serde_json::Value> = String::from_utf8(out)
        .expect("utf-8")
        .lines()
        .map(|l| serde_json::from_str(l).expect("json line"))
        .collect();

    assert_eq!(values.len(), 4);
    assert_eq!(values[0]["type"], "file");
    assert_eq!(values[0]["file"]["name"], "x.txt");
    assert_eq!(values[2]["type"], "summary");
    assert_eq!(values[2]["total"], 2);
    assert_eq!(values[3]["directory"], "/a");
    assert!(err.is_empty());
}

#[test]
fn json_wraps_other_responses() {
    let reply = DaemonReply {
        response: DaemonResponse::Moved(MoveResult {
            full_paths: vec!["/b/x.txt".into()],
            done: true,
        }),
        messages: vec!["oops".into()],
    };
    let mut out = Vec::new();
    let mut err = Vec::new();
    JsonPrinter::new(&mut out, &mut err)
        .print_reply(&reply)
        .expect("print");

    let value: serde_json::Value =
        serde_json::from_slice(&out).expect("single json object");
    assert_eq!(value["response"]["Moved"]["full_paths"][0], "/b/x.txt");
    let msg: serde_json::Value = serde_json::from_slice(&err).expect("message");
    assert_eq!(msg["text"], "oops");
}

#[test]
fn byte_sizes_scale() {
    assert_eq!(human_bytes(512), "512 B");
    assert_eq!(human_bytes(1536), "1.5 KB");
    assert_eq!(human_bytes(5 * 1024 * 1024 * 1024), "5.0 GB");
}
