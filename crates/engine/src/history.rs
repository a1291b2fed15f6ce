use explite_fs::path::{basename, dirname, join};
use log::debug;

/// One reversible (or explicitly non-reversible) file mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOperation {
    Copy { from: Vec<String>, to: String },
    Move { from: Vec<String>, to: String },
    Trash { targets: Vec<String> },
    Create { target: String, is_file: bool },
    Rename { from: String, to: String },
    Delete { targets: Vec<String> },
    Undelete { targets: Vec<String> },
}

impl FileOperation {
    pub fn kind(&self) -> &'static str {
        match self {
            FileOperation::Copy { .. } => "copy",
            FileOperation::Move { .. } => "move",
            FileOperation::Trash { .. } => "trash",
            FileOperation::Create { .. } => "create",
            FileOperation::Rename { .. } => "rename",
            FileOperation::Delete { .. } => "delete",
            FileOperation::Undelete { .. } => "undelete",
        }
    }

    /// The operation that reverses this one; `None` for Delete and Undelete.
    pub fn compensate(&self) -> Option<FileOperation> {
        let placed = |from: &[String], to: &str| -> Vec<String> {
            from.iter()
                .map(|f| join(&[to, basename(f).as_str()]))
                .collect()
        };

        match self {
            FileOperation::Copy { from, to } => Some(FileOperation::Delete {
                targets: placed(from, to),
            }),
            FileOperation::Move { from, to } => Some(FileOperation::Move {
                from: placed(from, to),
                to: from.first().map(|f| dirname(f)).unwrap_or_default(),
            }),
            FileOperation::Trash { targets } => Some(FileOperation::Undelete {
                targets: targets.clone(),
            }),
            FileOperation::Create { target, .. } => Some(FileOperation::Delete {
                targets: vec![target.clone()],
            }),
            FileOperation::Rename { from, to } => Some(FileOperation::Rename {
                from: to.clone(),
                to: from.clone(),
            }),
            FileOperation::Delete { .. } | FileOperation::Undelete { .. } => None,
        }
    }

    /// Paths of which at least one must exist for this operation to run.
    /// `None` means the operation is never considered stale.
    fn subjects(&self) -> Option<Vec<&str>> {
        match self {
            FileOperation::Copy { from, .. } | FileOperation::Move { from, .. } => {
                Some(from.iter().map(String::as_str).collect())
            }
            FileOperation::Rename { from, .. } => Some(vec![from.as_str()]),
            FileOperation::Trash { targets } | FileOperation::Delete { targets } => {
                Some(targets.iter().map(String::as_str).collect())
            }
            FileOperation::Create { .. } | FileOperation::Undelete { .. } => None,
        }
    }

    /// All-or-nothing: one surviving subject is enough to replay the whole op.
    pub fn is_valid(&self, exists: impl Fn(&str) -> bool) -> bool {
        match self.subjects() {
            Some(paths) => paths.into_iter().any(exists),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryOptions {
    /// Drop redo entries when a new forward operation is pushed.
    pub clear_redo_on_push: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    #[default]
    None,
    Undo,
    Redo,
}

/// Undo/redo stacks of [`FileOperation`]s.
///
/// `undo` returns the compensating operation for the caller to execute,
/// `redo` returns the original. If executing it fails the caller calls
/// [`OperationHistory::rollback`] to put the entry back where it came from.
#[derive(Debug, Default)]
pub struct OperationHistory {
    undo_stack: Vec<FileOperation>,
    redo_stack: Vec<FileOperation>,
    mode: Mode,
    options: HistoryOptions,
}

impl OperationHistory {
    pub fn new(options: HistoryOptions) -> Self {
        OperationHistory {
            options,
            ..Self::default()
        }
    }

    pub fn push(&mut self, op: FileOperation) {
        debug!("history push {}", op.kind());
        self.undo_stack.push(op);
        if self.options.clear_redo_on_push {
            self.redo_stack.clear();
        }
    }

    pub fn undo(&mut self, exists: impl Fn(&str) -> bool) -> Option<FileOperation> {
        let op = self.undo_stack.pop()?;

        let Some(compensating) = op.compensate() else {
            debug!("dropping non-reversible {} from undo stack", op.kind());
            return None;
        };
        if !compensating.is_valid(exists) {
            debug!("dropping stale {} from undo stack", op.kind());
            return None;
        }

        self.redo_stack.push(op);
        self.mode = Mode::Undo;
        Some(compensating)
    }

    pub fn redo(&mut self, exists: impl Fn(&str) -> bool) -> Option<FileOperation> {
        let op = self.redo_stack.pop()?;

        if !op.is_valid(exists) {
            debug!("dropping stale {} from redo stack", op.kind());
            return None;
        }

        self.undo_stack.push(op.clone());
        self.mode = Mode::Redo;
        Some(op)
    }

    /// Return the entry moved by the last undo/redo to its stack of origin.
    pub fn rollback(&mut self) {
        match self.mode {
            Mode::Undo => {
                if let Some(op) = self.redo_stack.pop() {
                    self.undo_stack.push(op);
                }
            }
            Mode::Redo => {
                if let Some(op) = self.undo_stack.pop() {
                    self.redo_stack.push(op);
                }
            }
            Mode::None => {}
        }
        self.mode = Mode::None;
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_stack(&self) -> &[FileOperation] {
        &self.undo_stack
    }

    pub fn redo_stack(&self) -> &[FileOperation] {
        &self.redo_stack
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
