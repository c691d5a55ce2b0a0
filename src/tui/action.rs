// File: ./src/tui/action.rs
use crate::model::Child;

/// Work handed from the UI loop to the async worker.
///
/// Everything that only touches dialog state is done inline by the key
/// handler; only calls that reach the store travel through here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Toggle(Child),
    ConfirmRemove,
    ConfirmReset,
}
