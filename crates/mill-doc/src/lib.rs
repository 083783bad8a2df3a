//! Document model for mill.
//!
//! A [`Document`] is the shared mutable structure every command operates on:
//! a map of named [`Module`]s, a stack of [`Selection`]s scoping which
//! modules a command should act on, and an active-target marker. The
//! dispatch layer owns the push/pop discipline on the selection stack; the
//! document only provides the storage and the consistency checker.

mod document;
mod selection;

pub use document::{Document, Module};
pub use selection::Selection;
