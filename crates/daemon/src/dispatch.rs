use explite_engine::{DirectorySession, PolicyDialog};
use explite_fs::FileSystemProvider;
use explite_protocol::{DaemonReply, DaemonRequest, DaemonResponse};

/// Apply one client request to the session.
///
/// Every message the session raised while handling it travels back with
/// the response.
pub fn dispatch<P: FileSystemProvider>(
    session: &mut DirectorySession<P, PolicyDialog>,
    request: DaemonRequest,
) -> DaemonReply {
    let response = match request {
        DaemonRequest::Ping => DaemonResponse::Pong,
        DaemonRequest::Status => DaemonResponse::Status(session.status()),
        DaemonRequest::Open { path, navigation } => match session.open(&path, navigation) {
            Some(loaded) => DaemonResponse::Loaded(loaded),
            None => DaemonResponse::Done(false),
        },
        DaemonRequest::Reload => DaemonResponse::Loaded(session.reload()),
        DaemonRequest::Sort(sort_type) => {
            let dir = session.current_dir().to_string();
            DaemonResponse::Sorted(session.sort(&dir, Some(sort_type)))
        }
        DaemonRequest::Search { dir, key } => {
            let dir = if dir.is_empty() {
                session.current_dir().to_string()
            } else {
                dir
            };
            DaemonResponse::Searched(session.search(&dir, &key))
        }
        DaemonRequest::EndSearch => DaemonResponse::Searched(session.end_search(false)),
        DaemonRequest::CreateItem { dir, name, is_file } => {
            DaemonResponse::Created(session.create_item(&dir, &name, is_file))
        }
        DaemonRequest::Rename { path, new_name } => {
            DaemonResponse::Renamed(session.rename_item(&path, &new_name))
        }
        DaemonRequest::Trash(paths) => DaemonResponse::Done(session.trash_items(&paths)),
        DaemonRequest::Delete(paths) => DaemonResponse::Done(session.delete_items(&paths)),
        DaemonRequest::Undelete(items) => DaemonResponse::Done(session.undelete_items(&items)),
        DaemonRequest::DeleteFromRecycleBin(items) => {
            DaemonResponse::Done(session.delete_from_recycle_bin(&items))
        }
        DaemonRequest::EmptyRecycleBin => DaemonResponse::Done(session.empty_recycle_bin()),
        DaemonRequest::MoveItems {
            paths,
            dir,
            copy,
            overwrite,
        } => {
            session.dialog().set_overwrite(overwrite);
            DaemonResponse::Moved(session.move_items(&paths, &dir, copy))
        }
        DaemonRequest::Undo => DaemonResponse::Done(session.undo()),
        DaemonRequest::Redo => DaemonResponse::Done(session.redo()),
        DaemonRequest::ListVolumes => DaemonResponse::Volumes(session.list_volumes()),
        DaemonRequest::ChangeColumns(labels) => {
            session.change_columns(labels);
            DaemonResponse::Done(true)
        }
        DaemonRequest::AddFavorite(path) => DaemonResponse::Done(session.add_favorite(&path)),
        DaemonRequest::RemoveFavorite(path) => {
            DaemonResponse::Done(session.remove_favorite(&path))
        }
        DaemonRequest::ListFavorites => DaemonResponse::Favorites(session.favorites().to_vec()),
    };

    DaemonReply {
        response,
        messages: session.dialog().take_messages(),
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
