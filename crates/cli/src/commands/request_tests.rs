use std::path::PathBuf;

use clap::Parser;
use explite_protocol::SortKey;

use super::*;
use crate::commands::Cli;

fn parse(args: &[&str]) -> DaemonRequest {
    let cli = Cli::try_parse_from(std::iter::once("explite").chain(args.iter().copied()))
        .expect("valid command line");
    build(cli.command).expect("request")
}

#[test]
fn ls_with_and_without_path() {
    match parse(&["ls", "/tmp/x/"]) {
        DaemonRequest::Open { path, navigation } => {
            assert_eq!(path, "/tmp/x");
            assert_eq!(navigation, Navigation::Direct);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(parse(&["ls"]), DaemonRequest::Reload));
}

#[test]
fn sort_key_and_direction() {
    match parse(&["sort", "mdate", "--desc"]) {
        DaemonRequest::Sort(st) => {
            assert_eq!(st.key, SortKey::Mdate);
            assert!(!st.asc);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn search_defaults_to_current_directory() {
    match parse(&["search", "vac"]) {
        DaemonRequest::Search { dir, key } => {
            assert_eq!(dir, "");
            assert_eq!(key, "vac");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn touch_splits_directory_and_name() {
    match parse(&["touch", "/tmp/notes.txt"]) {
        DaemonRequest::CreateItem { dir, name, is_file } => {
            assert_eq!(dir, "/tmp");
            assert_eq!(name, "notes.txt");
            assert!(is_file);
        }
        other => panic!("unexpected {other:?}"),
    }
    match parse(&["mkdir", "/top"]) {
        DaemonRequest::CreateItem { dir, name, is_file } => {
            assert_eq!(dir, "/");
            assert_eq!(name, "top");
            assert!(!is_file);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn transfer_kinds() {
    let kinds: Vec<Option<bool>> = ["mv", "cp", "drop"]
        .into_iter()
        .map(|cmd| match parse(&[cmd, "/a/x", "/b", "--overwrite"]) {
            DaemonRequest::MoveItems {
                paths,
                dir,
                copy,
                overwrite,
            } => {
                assert_eq!(paths, vec!["/a/x"]);
                assert_eq!(dir, "/b");
                assert!(overwrite);
                copy
            }
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(kinds, vec![Some(false), Some(true), None]);
}

#[test]
fn restore_items_parse_path_and_time() {
    match parse(&["restore", "/a/x@1700000000000", "/a/b@c@5"]) {
        DaemonRequest::Undelete(items) => {
            assert_eq!(items.len(), 2);
            assert_eq!(items[0].original_path, "/a/x");
            assert_eq!(items[0].deleted_time_ms, 1_700_000_000_000);
            assert_eq!(items[1].original_path, "/a/b@c");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(parse(&["restore"]), DaemonRequest::Undelete(ref v) if v.is_empty()));
}

#[test]
fn malformed_restore_item_is_rejected() {
    assert!(parse_items(&["/a/x".to_string()]).is_err());
    assert!(parse_items(&["/a/x@soon".to_string()]).is_err());
}

#[test]
fn relative_paths_resolve_against_cwd() {
    let cwd = std::env::current_dir().expect("cwd");
    let expected = cwd.join("rel.txt");
    assert_eq!(
        absolute(&PathBuf::from("rel.txt")).expect("absolute"),
        expected.to_str().expect("utf-8")
    );
}

#[test]
fn favorites_subcommands() {
    assert!(matches!(parse(&["fav"]), DaemonRequest::ListFavorites));
    assert!(matches!(
        parse(&["fav", "add", "/music"]),
        DaemonRequest::AddFavorite(ref p) if p == "/music"
    ));
}
