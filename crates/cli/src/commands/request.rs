use std::path::{self, Path};

use anyhow::{Context, Result, anyhow, bail};
use explite_protocol::{DaemonRequest, Navigation, SortType, UndeleteItem};
use explite_runtime::RECYCLE_BIN;

use crate::commands::{Command, FavAction, TransferArgs};

/// Translate a parsed command into the request the daemon understands.
///
/// Relative paths are resolved against the working directory.
pub fn build(command: Command) -> Result<DaemonRequest> {
    let request = match command {
        Command::Ls { path: Some(path) } => DaemonRequest::Open {
            path: absolute(&path)?,
            navigation: Navigation::Direct,
        },
        Command::Ls { path: None } | Command::Reload => DaemonRequest::Reload,
        Command::Sort { key, desc } => DaemonRequest::Sort(SortType { asc: !desc, key }),
        Command::Search { key, dir } => DaemonRequest::Search {
            dir: dir.as_deref().map(absolute).transpose()?.unwrap_or_default(),
            key,
        },
        Command::EndSearch => DaemonRequest::EndSearch,
        Command::Mkdir { path } => create(&path, false)?,
        Command::Touch { path } => create(&path, true)?,
        Command::Rename { path, new_name } => DaemonRequest::Rename {
            path: absolute(&path)?,
            new_name,
        },
        Command::Trash { paths } => DaemonRequest::Trash(absolute_all(&paths)?),
        Command::Rm { paths } => DaemonRequest::Delete(absolute_all(&paths)?),
        Command::Restore { items } => DaemonRequest::Undelete(parse_items(&items)?),
        Command::Purge { items } => DaemonRequest::DeleteFromRecycleBin(parse_items(&items)?),
        Command::Mv(args) => transfer(args, Some(false))?,
        Command::Cp(args) => transfer(args, Some(true))?,
        Command::Drop(args) => transfer(args, None)?,
        Command::Undo => DaemonRequest::Undo,
        Command::Redo => DaemonRequest::Redo,
        Command::Bin => DaemonRequest::Open {
            path: RECYCLE_BIN.to_string(),
            navigation: Navigation::Direct,
        },
        Command::EmptyBin => DaemonRequest::EmptyRecycleBin,
        Command::Volumes => DaemonRequest::ListVolumes,
        Command::Fav { action: None } => DaemonRequest::ListFavorites,
        Command::Fav {
            action: Some(FavAction::Add { path }),
        } => DaemonRequest::AddFavorite(absolute(&path)?),
        Command::Fav {
            action: Some(FavAction::Remove { path }),
        } => DaemonRequest::RemoveFavorite(absolute(&path)?),
        Command::Status => DaemonRequest::Status,
    };
    Ok(request)
}

fn absolute(path: &Path) -> Result<String> {
    let abs = path::absolute(path)
        .with_context(|| format!("cannot resolve {}", path.display()))?;
    abs.to_str()
        .map(|s| s.trim_end_matches(path::MAIN_SEPARATOR).to_string())
        .map(|s| if s.is_empty() { path::MAIN_SEPARATOR.to_string() } else { s })
        .ok_or_else(|| anyhow!("{} is not valid UTF-8", abs.display()))
}

fn absolute_all(paths: &[impl AsRef<Path>]) -> Result<Vec<String>> {
    paths.iter().map(|p| absolute(p.as_ref())).collect()
}

fn create(path: &Path, is_file: bool) -> Result<DaemonRequest> {
    let full = absolute(path)?;
    let (dir, name) = match full.rsplit_once(path::MAIN_SEPARATOR) {
        Some((dir, name)) if !name.is_empty() => (dir, name),
        _ => bail!("{} has no file name", path.display()),
    };
    let dir = if dir.is_empty() {
        path::MAIN_SEPARATOR.to_string()
    } else {
        dir.to_string()
    };

    Ok(DaemonRequest::CreateItem {
        dir,
        name: name.to_string(),
        is_file,
    })
}

fn transfer(args: TransferArgs, copy: Option<bool>) -> Result<DaemonRequest> {
    Ok(DaemonRequest::MoveItems {
        paths: absolute_all(&args.paths)?,
        dir: absolute(&args.dir)?,
        copy,
        overwrite: args.overwrite,
    })
}

/// `ORIGINAL_PATH@DELETED_MS`, as printed by `explite bin`.
fn parse_items(items: &[String]) -> Result<Vec<UndeleteItem>> {
    items
        .iter()
        .map(|item| {
            let (path, ms) = item
                .rsplit_once('@')
                .ok_or_else(|| anyhow!("expected ORIGINAL_PATH@DELETED_MS, got {item:?}"))?;
            let deleted_time_ms = ms
                .parse()
                .with_context(|| format!("bad deletion time in {item:?}"))?;
            Ok(UndeleteItem {
                original_path: path.to_string(),
                deleted_time_ms,
            })
        })
        .collect()
}

#[cfg(all(test, not(windows)))]
#[path = "request_tests.rs"]
mod tests;
