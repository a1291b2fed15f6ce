use explite_fs::{
    FileSystemProvider, ProviderError,
    path::{basename, dirname, is_within, join, root},
};
use explite_protocol::{CreateResult, MoveResult, Navigation, RenameResult, UndeleteItem};
use explite_runtime::RECYCLE_BIN;
use log::{debug, info, warn};

use super::{Dialog, DirectorySession};
use crate::{
    error::SessionError,
    history::FileOperation,
    media::{Platform, id_for},
};

impl<P: FileSystemProvider, D: Dialog> DirectorySession<P, D> {
    /// Create an empty file or a directory named `name` inside `dir`.
    pub fn create_item(&mut self, dir: &str, name: &str, is_file: bool) -> CreateResult {
        let target = join(&[dir, name]);
        let created = self.try_create(&target, is_file);

        match created {
            Ok(()) => {
                self.history.push(FileOperation::Create {
                    target: target.clone(),
                    is_file,
                });
                self.after_mutation();
                CreateResult {
                    new_item_id: id_for(&target),
                    success: true,
                }
            }
            Err(e) => {
                self.dialog.show_error(&e.to_string());
                CreateResult {
                    new_item_id: String::new(),
                    success: false,
                }
            }
        }
    }

    fn try_create(&self, target: &str, is_file: bool) -> Result<(), SessionError> {
        if self.provider.exists(target) {
            return Err(SessionError::Collision(target.to_string()));
        }
        info!("create {} {target}", if is_file { "file" } else { "folder" });
        if is_file {
            self.provider.create(target)?;
        } else {
            self.provider.mkdir(target)?;
        }
        Ok(())
    }

    /// Rename `path` to `new_name` within its directory.
    pub fn rename_item(&mut self, path: &str, new_name: &str) -> RenameResult {
        let new_path = join(&[dirname(path).as_str(), new_name]);
        if new_path == path {
            return RenameResult {
                done: true,
                new_id: id_for(path),
            };
        }

        match self.try_rename(path, &new_path) {
            Ok(()) => {
                self.history.push(FileOperation::Rename {
                    from: path.to_string(),
                    to: new_path.clone(),
                });
                self.after_mutation();
                RenameResult {
                    done: true,
                    new_id: id_for(&new_path),
                }
            }
            Err(e) => {
                self.dialog.show_error(&e.to_string());
                RenameResult {
                    done: false,
                    new_id: String::new(),
                }
            }
        }
    }

    fn try_rename(&self, path: &str, new_path: &str) -> Result<(), SessionError> {
        if !self.provider.exists(path) {
            return Err(SessionError::NotFound(path.to_string()));
        }
        if self.provider.exists(new_path) {
            return Err(SessionError::Collision(new_path.to_string()));
        }
        info!("rename {path} -> {new_path}");
        self.provider.rename(path, new_path)?;
        Ok(())
    }

    /// Move `paths` to the recycle bin.
    pub fn trash_items(&mut self, paths: &[String]) -> bool {
        if paths.is_empty() {
            return false;
        }
        info!("trash {} item(s)", paths.len());
        match self.provider.trash(paths) {
            Ok(()) => {
                self.history.push(FileOperation::Trash {
                    targets: paths.to_vec(),
                });
                self.after_mutation();
                true
            }
            Err(e) => self.fail(e),
        }
    }

    /// Remove `paths` permanently, once confirmed. Not undoable.
    pub fn delete_items(&mut self, paths: &[String]) -> bool {
        if paths.is_empty() || !self.dialog.confirm_delete(paths) {
            return false;
        }
        info!("delete {} item(s)", paths.len());
        match self.provider.delete(paths) {
            Ok(()) => {
                self.after_mutation();
                true
            }
            Err(e) => self.fail(e),
        }
    }

    /// Restore recycle-bin entries; an empty `items` restores everything in
    /// the bin. Not undoable.
    pub fn undelete_items(&mut self, items: &[UndeleteItem]) -> bool {
        let items = match self.bin_selection(items) {
            Ok(items) if !items.is_empty() => items,
            Ok(_) => return false,
            Err(e) => return self.fail(e),
        };
        info!("undelete {} item(s)", items.len());
        let restored = self.provider.undelete_by_time(&items);
        self.after_bin_mutation(restored)
    }

    pub fn delete_from_recycle_bin(&mut self, items: &[UndeleteItem]) -> bool {
        if items.is_empty() {
            return false;
        }
        let paths: Vec<String> = items.iter().map(|i| i.original_path.clone()).collect();
        if !self.dialog.confirm_delete(&paths) {
            return false;
        }
        info!("purge {} item(s) from the recycle bin", items.len());
        let purged = self.provider.delete_from_recycle_bin(items);
        self.after_bin_mutation(purged)
    }

    pub fn empty_recycle_bin(&mut self) -> bool {
        if !self.dialog.confirm_delete(&[]) {
            return false;
        }
        info!("empty recycle bin");
        let emptied = self.provider.empty_recycle_bin();
        self.after_bin_mutation(emptied)
    }

    fn bin_selection(&self, items: &[UndeleteItem]) -> Result<Vec<UndeleteItem>, ProviderError> {
        if !items.is_empty() {
            return Ok(items.to_vec());
        }
        Ok(self
            .provider
            .read_recycle_bin()?
            .into_iter()
            .map(|item| UndeleteItem {
                original_path: item.original_path,
                deleted_time_ms: item.deleted_date_ms,
            })
            .collect())
    }

    /// The bin is never watched, so its view is re-read after every change.
    fn after_bin_mutation(&mut self, outcome: Result<(), ProviderError>) -> bool {
        let done = match outcome {
            Ok(()) => true,
            Err(e) => self.fail(e),
        };
        if self.current_dir == RECYCLE_BIN && !self.is_searching() {
            self.read_files(RECYCLE_BIN, Navigation::Reload);
        } else if done {
            self.after_mutation();
        }
        done
    }

    /// Copy or move `paths` into `dir`.
    ///
    /// Sources already in `dir` are skipped. With `copy` unset, items stay
    /// on their volume by moving and cross volumes by copying. On POSIX each
    /// name already taken at the destination is confirmed first; declining
    /// one cancels it and every source after it.
    pub fn move_items(&mut self, paths: &[String], dir: &str, copy: Option<bool>) -> MoveResult {
        let sources: Vec<String> = paths
            .iter()
            .filter(|p| dirname(p) != dir)
            .cloned()
            .collect();
        if sources.is_empty() {
            debug!("nothing to move into {dir}");
            return MoveResult {
                full_paths: Vec::new(),
                done: false,
            };
        }

        if let Some(src) = sources.iter().find(|p| is_within(dir, p)) {
            self.dialog.show_error(&format!("cannot place \"{src}\" inside itself"));
            return MoveResult {
                full_paths: Vec::new(),
                done: false,
            };
        }

        let copy = copy.unwrap_or_else(|| self.volume_token(&sources[0]) != self.volume_token(dir));

        let sources = match self.materializer.platform() {
            Platform::Posix => self.screen_collisions(sources, dir),
            Platform::Windows => sources,
        };
        if sources.is_empty() {
            return MoveResult {
                full_paths: Vec::new(),
                done: false,
            };
        }

        info!(
            "{} {} item(s) into {dir}",
            if copy { "copy" } else { "move" },
            sources.len()
        );
        let outcome = if copy {
            self.provider.copy(&sources, dir)
        } else {
            self.provider.move_items(&sources, dir)
        };
        if let Err(e) = outcome {
            self.dialog.show_error(&e.to_string());
            return MoveResult {
                full_paths: Vec::new(),
                done: false,
            };
        }

        let full_paths = sources
            .iter()
            .map(|s| join(&[dir, basename(s).as_str()]))
            .collect();
        let op = if copy {
            FileOperation::Copy {
                from: sources,
                to: dir.to_string(),
            }
        } else {
            FileOperation::Move {
                from: sources,
                to: dir.to_string(),
            }
        };
        self.history.push(op);
        self.after_mutation();

        MoveResult {
            full_paths,
            done: true,
        }
    }

    /// Keep sources until the user declines overwriting one.
    fn screen_collisions(&self, sources: Vec<String>, dir: &str) -> Vec<String> {
        let mut kept = Vec::with_capacity(sources.len());
        for src in sources {
            let name = basename(&src);
            let dest = join(&[dir, name.as_str()]);
            if self.provider.exists(&dest) && !self.dialog.confirm_overwrite(&name) {
                debug!("overwrite of {dest} declined, skipping the rest");
                break;
            }
            kept.push(src);
        }
        kept
    }

    /// Mount point holding `path`, or its root when no volume claims it.
    fn volume_token(&self, path: &str) -> String {
        let volumes = self.provider.list_volumes().unwrap_or_else(|e| {
            warn!("Failed to list volumes: {e}");
            Vec::new()
        });
        volumes
            .into_iter()
            .map(|v| v.mount_point)
            .filter(|m| is_within(path, m))
            .max_by_key(|m| m.len())
            .unwrap_or_else(|| root(path))
    }

    /// Reverse the most recent operation. Returns whether anything changed.
    pub fn undo(&mut self) -> bool {
        let provider = &self.provider;
        let Some(op) = self.history.undo(|p| provider.exists(p)) else {
            return false;
        };
        // `op` is the compensating operation; report the one being undone.
        let undone = self
            .history
            .redo_stack()
            .last()
            .map_or(op.kind(), FileOperation::kind);

        info!("undo: {undone}");
        match self.replay(&op) {
            Ok(()) => {
                self.after_mutation();
                true
            }
            Err(e) if matches!(op, FileOperation::Undelete { .. }) => {
                debug!("undelete during undo failed, ignoring: {e}");
                false
            }
            Err(source) => {
                self.history.rollback();
                let err = SessionError::Reversal {
                    step: "undo",
                    kind: undone,
                    source,
                };
                self.dialog.show_error(&err.to_string());
                false
            }
        }
    }

    /// Replay the most recently undone operation.
    pub fn redo(&mut self) -> bool {
        let provider = &self.provider;
        let Some(op) = self.history.redo(|p| provider.exists(p)) else {
            return false;
        };

        info!("redo: {}", op.kind());
        match self.replay(&op) {
            Ok(()) => {
                self.after_mutation();
                true
            }
            Err(source) => {
                self.history.rollback();
                let err = SessionError::Reversal {
                    step: "redo",
                    kind: op.kind(),
                    source,
                };
                self.dialog.show_error(&err.to_string());
                false
            }
        }
    }

    /// Run a history step. Providers replace whatever sits at a transfer
    /// destination, so an occupied destination fails the step instead.
    fn replay(&self, op: &FileOperation) -> Result<(), ProviderError> {
        if let FileOperation::Copy { from, to } | FileOperation::Move { from, to } = op {
            if let Some(taken) = from
                .iter()
                .map(|f| join(&[to.as_str(), basename(f).as_str()]))
                .find(|dest| self.provider.exists(dest))
            {
                return Err(ProviderError::AlreadyExists(taken));
            }
        }
        self.execute(op)
    }

    /// Run `op` against the provider without recording it.
    pub fn execute(&self, op: &FileOperation) -> Result<(), ProviderError> {
        match op {
            FileOperation::Copy { from, to } => self.provider.copy(from, to),
            FileOperation::Move { from, to } => self.provider.move_items(from, to),
            FileOperation::Trash { targets } => self.provider.trash(targets),
            FileOperation::Create { target, is_file: true } => self.provider.create(target),
            FileOperation::Create { target, is_file: false } => self.provider.mkdir(target),
            FileOperation::Rename { from, to } => self.provider.rename(from, to),
            FileOperation::Delete { targets } => self.provider.delete(targets),
            FileOperation::Undelete { targets } => self.provider.undelete(targets),
        }
    }

    fn fail(&self, e: ProviderError) -> bool {
        self.dialog.show_error(&e.to_string());
        false
    }
}

#[cfg(all(test, not(windows)))]
#[path = "ops_tests.rs"]
mod tests;
