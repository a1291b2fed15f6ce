use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
};

use log::debug;

/// User-facing prompts the session raises while executing an operation.
pub trait Dialog {
    fn show_error(&self, message: &str);
    /// `true` overwrites `name` at the destination, `false` skips it.
    fn confirm_overwrite(&self, name: &str) -> bool;
    /// Asked before anything is removed permanently. An empty slice means
    /// the whole recycle bin.
    fn confirm_delete(&self, paths: &[String]) -> bool;
}

/// Non-interactive [`Dialog`] answering from preset policy and collecting
/// every message it is shown.
#[derive(Debug)]
pub struct PolicyDialog {
    messages: RefCell<Vec<String>>,
    overwrite_answers: RefCell<VecDeque<bool>>,
    overwrite_default: Cell<bool>,
    delete_confirmed: Cell<bool>,
}

impl Default for PolicyDialog {
    fn default() -> Self {
        PolicyDialog {
            messages: RefCell::new(Vec::new()),
            overwrite_answers: RefCell::new(VecDeque::new()),
            overwrite_default: Cell::new(false),
            delete_confirmed: Cell::new(true),
        }
    }
}

impl PolicyDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer used once the queued answers run out.
    pub fn set_overwrite(&self, overwrite: bool) {
        self.overwrite_default.set(overwrite);
    }

    /// Queue answers for the next overwrite prompts, in order.
    pub fn queue_overwrite_answers(&self, answers: impl IntoIterator<Item = bool>) {
        self.overwrite_answers.borrow_mut().extend(answers);
    }

    pub fn set_delete_confirmed(&self, confirmed: bool) {
        self.delete_confirmed.set(confirmed);
    }

    pub fn take_messages(&self) -> Vec<String> {
        self.messages.take()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl Dialog for PolicyDialog {
    fn show_error(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }

    fn confirm_overwrite(&self, name: &str) -> bool {
        let answer = self
            .overwrite_answers
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| self.overwrite_default.get());
        debug!("overwrite {name}: {answer}");
        answer
    }

    fn confirm_delete(&self, paths: &[String]) -> bool {
        debug!("confirm delete of {} item(s)", paths.len());
        self.delete_confirmed.get()
    }
}
