//! Command traits and the registry.
//!
//! Three command kinds share one dispatch surface: generic transformation
//! commands, frontends (read a document in) and backends (write a document
//! out). All three register into a single name-keyed table; frontends and
//! backends are additionally indexed by their format name so other commands
//! can invoke them by format.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use mill_doc::Document;
use mill_types::error::Result;

use crate::backend::BackendIo;
use crate::frontend::{FrontendIo, ScriptSource};

/// A generic transformation command.
pub trait Command {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// One-line description for `help`.
    fn short_help(&self) -> &str;

    /// Detailed help text for `help <command>`.
    fn help(&self) -> String {
        format!("\nNo help message for command `{}'.\n", self.name())
    }

    /// Execute the command against the document.
    ///
    /// `args[0]` is always the resolved command name. Commands may dispatch
    /// sub-commands through `reg`; the dispatch engine restores the
    /// selection-stack depth around every invocation.
    fn execute(&self, args: &[String], doc: &mut Document, reg: &CommandRegistry) -> Result<()>;
}

/// An input-reading command, additionally addressable by format name.
///
/// The command name derives from the format name: `read_<format>`, or the
/// format name itself when it carries the `=` escape prefix.
pub trait Frontend {
    /// The format name, possibly `=`-prefixed.
    fn format_name(&self) -> &str;

    /// One-line description for `help`.
    fn short_help(&self) -> &str;

    /// Detailed help text for `help <command>`.
    fn help(&self) -> String {
        format!(
            "\nNo help message for command `{}'.\n",
            frontend_command_name(self.format_name())
        )
    }

    /// Read input into the document.
    ///
    /// Implementations parse their options from `args`, then call
    /// [`FrontendIo::open`] with the index of the first positional argument
    /// to resolve the input source.
    fn read(
        &self,
        io: &mut FrontendIo<'_, '_>,
        args: &mut Vec<String>,
        doc: &mut Document,
        reg: &CommandRegistry,
    ) -> Result<()>;
}

/// An output-writing command, additionally addressable by format name.
pub trait Backend {
    /// The format name, possibly `=`-prefixed.
    fn format_name(&self) -> &str;

    /// One-line description for `help`.
    fn short_help(&self) -> &str;

    /// Detailed help text for `help <command>`.
    fn help(&self) -> String {
        format!(
            "\nNo help message for command `{}'.\n",
            backend_command_name(self.format_name())
        )
    }

    /// Write output from the document.
    ///
    /// Implementations parse their options from `args`, then call
    /// [`BackendIo::open`] to resolve the output sink (standard output when
    /// none is named).
    fn write(
        &self,
        io: &mut BackendIo<'_>,
        args: &mut Vec<String>,
        doc: &mut Document,
        reg: &CommandRegistry,
    ) -> Result<()>;
}

/// Derive the command name of a frontend from its format name.
pub fn frontend_command_name(format: &str) -> String {
    match format.strip_prefix('=') {
        Some(verbatim) => verbatim.to_string(),
        None => format!("read_{format}"),
    }
}

/// Derive the command name of a backend from its format name.
pub fn backend_command_name(format: &str) -> String {
    match format.strip_prefix('=') {
        Some(verbatim) => verbatim.to_string(),
        None => format!("write_{format}"),
    }
}

/// Strip the `=` escape prefix from a format name.
fn canonical_format(format: &str) -> &str {
    format.strip_prefix('=').unwrap_or(format)
}

/// The three command capabilities held in the shared table.
pub enum CommandKind {
    Generic(Box<dyn Command>),
    Frontend(Box<dyn Frontend>),
    Backend(Box<dyn Backend>),
}

/// A registered command with its identity and invocation counter.
pub struct CommandEntry {
    pub(crate) name: String,
    pub(crate) kind: CommandKind,
    call_counter: Cell<u64>,
}

impl CommandEntry {
    /// The canonical command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One-line description.
    pub fn short_help(&self) -> &str {
        match &self.kind {
            CommandKind::Generic(c) => c.short_help(),
            CommandKind::Frontend(f) => f.short_help(),
            CommandKind::Backend(b) => b.short_help(),
        }
    }

    /// Detailed help text.
    pub fn help_text(&self) -> String {
        match &self.kind {
            CommandKind::Generic(c) => c.help(),
            CommandKind::Frontend(f) => f.help(),
            CommandKind::Backend(b) => b.help(),
        }
    }

    /// How many times this command has been invoked.
    pub fn call_count(&self) -> u64 {
        self.call_counter.get()
    }

    pub(crate) fn bump(&self) {
        self.call_counter.set(self.call_counter.get() + 1);
    }

    pub(crate) fn as_frontend(&self) -> Option<&dyn Frontend> {
        match &self.kind {
            CommandKind::Frontend(f) => Some(f.as_ref()),
            _ => None,
        }
    }

    pub(crate) fn as_backend(&self) -> Option<&dyn Backend> {
        match &self.kind {
            CommandKind::Backend(b) => Some(b.as_ref()),
            _ => None,
        }
    }
}

/// Registry of available commands with dispatch.
///
/// Also holds the transient interpreter state: the echo toggle, the frontend
/// continuation vector, the current script source and the last captured
/// here-document. All of it is interior-mutable because commands receive the
/// registry by shared reference; the tool is single-threaded and at most one
/// command line evaluates at a time.
pub struct CommandRegistry {
    commands: BTreeMap<String, CommandEntry>,
    frontends: BTreeMap<String, String>,
    backends: BTreeMap<String, String>,
    echo: Cell<bool>,
    pub(crate) next_args: RefCell<Vec<String>>,
    pub(crate) script_source: RefCell<Option<ScriptSource>>,
    pub(crate) last_here_document: RefCell<String>,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self {
            commands: BTreeMap::new(),
            frontends: BTreeMap::new(),
            backends: BTreeMap::new(),
            echo: Cell::new(false),
            next_args: RefCell::new(Vec::new()),
            script_source: RefCell::new(None),
            last_here_document: RefCell::new(String::new()),
        }
    }

    /// Register a generic command.
    ///
    /// Panics if the command name is already taken: two statically linked
    /// commands claiming the same identity is a programming error.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        let name = cmd.name().to_string();
        self.insert_entry(name, CommandKind::Generic(cmd));
    }

    /// Register a frontend under both its command name and its format name.
    ///
    /// Panics on a command-name or format-name collision.
    pub fn register_frontend(&mut self, frontend: Box<dyn Frontend>) {
        let format = canonical_format(frontend.format_name()).to_string();
        let name = frontend_command_name(frontend.format_name());
        if self.frontends.contains_key(&format) {
            panic!("two frontends registered under the format name `{format}'");
        }
        self.frontends.insert(format, name.clone());
        self.insert_entry(name, CommandKind::Frontend(frontend));
    }

    /// Register a backend under both its command name and its format name.
    ///
    /// Panics on a command-name or format-name collision.
    pub fn register_backend(&mut self, backend: Box<dyn Backend>) {
        let format = canonical_format(backend.format_name()).to_string();
        let name = backend_command_name(backend.format_name());
        if self.backends.contains_key(&format) {
            panic!("two backends registered under the format name `{format}'");
        }
        self.backends.insert(format, name.clone());
        self.insert_entry(name, CommandKind::Backend(backend));
    }

    fn insert_entry(&mut self, name: String, kind: CommandKind) {
        if self.commands.contains_key(&name) {
            panic!("two commands registered under the name `{name}'");
        }
        self.commands.insert(
            name.clone(),
            CommandEntry {
                name,
                kind,
                call_counter: Cell::new(0),
            },
        );
    }

    /// Look up a command by its canonical name.
    pub fn lookup(&self, name: &str) -> Option<&CommandEntry> {
        self.commands.get(name)
    }

    /// Look up a frontend by its format name.
    pub fn lookup_frontend(&self, format: &str) -> Option<&CommandEntry> {
        self.frontends
            .get(format)
            .and_then(|name| self.commands.get(name))
    }

    /// Look up a backend by its format name.
    pub fn lookup_backend(&self, format: &str) -> Option<&CommandEntry> {
        self.backends
            .get(format)
            .and_then(|name| self.commands.get(name))
    }

    /// All registered commands as `(name, short_help)`, sorted by name.
    pub fn list_commands(&self) -> Vec<(&str, &str)> {
        self.commands
            .values()
            .map(|entry| (entry.name(), entry.short_help()))
            .collect()
    }

    /// Whether commands are echoed to the log before execution.
    pub fn echo(&self) -> bool {
        self.echo.get()
    }

    /// Toggle command echoing.
    pub fn set_echo(&self, on: bool) {
        self.echo.set(on);
    }

    /// Install a script source for here-document reads, returning the
    /// previous one so callers can restore it.
    pub fn swap_script_source(&self, source: Option<ScriptSource>) -> Option<ScriptSource> {
        self.script_source.replace(source)
    }

    /// Read the next line from the current script source, if any.
    pub fn next_script_line(&self) -> Result<Option<String>> {
        let mut slot = self.script_source.borrow_mut();
        match slot.as_mut() {
            Some(source) => Ok(source.read_line()?),
            None => Ok(None),
        }
    }

    /// The most recently captured here-document text.
    pub fn last_here_document(&self) -> String {
        self.last_here_document.borrow().clone()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{NullCmd, RecordingFrontend, SinkBackend};

    #[test]
    fn register_and_lookup() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(NullCmd::new("noop")));
        let entry = reg.lookup("noop").unwrap();
        assert_eq!(entry.name(), "noop");
        assert_eq!(entry.call_count(), 0);
    }

    #[test]
    fn lookup_unknown_returns_none() {
        let reg = CommandRegistry::new();
        assert!(reg.lookup("missing").is_none());
    }

    #[test]
    fn frontend_registers_in_both_tables() {
        let mut reg = CommandRegistry::new();
        reg.register_frontend(Box::new(RecordingFrontend::new("rec")));
        assert!(reg.lookup("read_rec").is_some());
        assert_eq!(reg.lookup_frontend("rec").unwrap().name(), "read_rec");
        assert!(reg.lookup("rec").is_none());
    }

    #[test]
    fn backend_registers_in_both_tables() {
        let mut reg = CommandRegistry::new();
        reg.register_backend(Box::new(SinkBackend::new("rec")));
        assert!(reg.lookup("write_rec").is_some());
        assert_eq!(reg.lookup_backend("rec").unwrap().name(), "write_rec");
    }

    #[test]
    fn escape_prefix_keeps_format_name_verbatim() {
        let mut reg = CommandRegistry::new();
        reg.register_frontend(Box::new(RecordingFrontend::new("=slurp")));
        assert!(reg.lookup("slurp").is_some());
        assert!(reg.lookup("read_slurp").is_none());
        assert_eq!(reg.lookup_frontend("slurp").unwrap().name(), "slurp");
    }

    #[test]
    fn command_name_derivation() {
        assert_eq!(frontend_command_name("text"), "read_text");
        assert_eq!(frontend_command_name("=raw"), "raw");
        assert_eq!(backend_command_name("text"), "write_text");
        assert_eq!(backend_command_name("=dump"), "dump");
    }

    #[test]
    #[should_panic(expected = "two commands registered under the name")]
    fn duplicate_command_name_is_fatal() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(NullCmd::new("dup")));
        reg.register(Box::new(NullCmd::new("dup")));
    }

    #[test]
    #[should_panic(expected = "two commands registered under the name")]
    fn frontend_backend_command_name_collision_is_fatal() {
        let mut reg = CommandRegistry::new();
        // "=clash" on both sides lands on the same command name in the
        // shared table even though the kind-specific tables differ.
        reg.register_frontend(Box::new(RecordingFrontend::new("=clash")));
        reg.register_backend(Box::new(SinkBackend::new("=clash")));
    }

    #[test]
    #[should_panic(expected = "two frontends registered under the format name")]
    fn duplicate_format_name_is_fatal() {
        let mut reg = CommandRegistry::new();
        reg.register_frontend(Box::new(RecordingFrontend::new("rec")));
        reg.register_frontend(Box::new(RecordingFrontend::new("rec")));
    }

    #[test]
    fn list_commands_sorted() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(NullCmd::new("zebra")));
        reg.register(Box::new(NullCmd::new("alpha")));
        let names: Vec<&str> = reg.list_commands().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["alpha", "zebra"]);
    }

    #[test]
    fn echo_defaults_off() {
        let reg = CommandRegistry::new();
        assert!(!reg.echo());
        reg.set_echo(true);
        assert!(reg.echo());
    }
}
