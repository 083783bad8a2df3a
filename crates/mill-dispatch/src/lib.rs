//! Command kernel for mill.
//!
//! The kernel is a registry-based dispatch system. Commands implement the
//! [`Command`], [`Frontend`] or [`Backend`] trait and register by name; the
//! interpreter parses text command lines, resolves the head token against
//! the registry, and invokes the command against a shared mutable
//! [`mill_doc::Document`]. Frontends and backends are additionally indexed
//! by format name and get their input/output resolved by the I/O adapters,
//! including here-document sourcing and multi-file continuation for reads.

mod backend;
mod builtins;
mod frontend;
mod interpreter;
mod registry;
mod report;
#[cfg(test)]
mod testutil;

/// Output sink resolution for write commands.
pub use backend::{BackendIo, Sink};
/// Registration of the layer's own `help` and `echo` commands.
pub use builtins::register_core;
/// Input source resolution, script sources and here-documents.
pub use frontend::{FrontendIo, ScriptSource, Source};
/// Command traits, the registry, and command-name derivation.
pub use registry::{
    backend_command_name, frontend_command_name, Backend, Command, CommandEntry, CommandKind,
    CommandRegistry, Frontend,
};
/// Caret-pointer syntax errors and leftover-argument validation.
pub use report::{check_extra_args, syntax_error};
