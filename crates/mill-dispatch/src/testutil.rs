//! Shared test doubles for the dispatch crate's unit tests.

use std::cell::RefCell;
use std::io::Read;
use std::io::Write as _;
use std::rc::Rc;

use mill_doc::{Document, Selection};
use mill_types::error::{MillError, Result};

use crate::backend::BackendIo;
use crate::frontend::FrontendIo;
use crate::registry::{Backend, Command, CommandRegistry, Frontend};

/// Shared invocation log for recording test commands.
#[derive(Clone, Default)]
pub struct RecordLog(Rc<RefCell<Vec<String>>>);

impl RecordLog {
    pub fn push(&self, entry: String) {
        self.0.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

/// A command that does nothing.
pub struct NullCmd {
    name: String,
}

impl NullCmd {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Command for NullCmd {
    fn name(&self) -> &str {
        &self.name
    }
    fn short_help(&self) -> &str {
        "do nothing"
    }
    fn execute(&self, _args: &[String], _doc: &mut Document, _reg: &CommandRegistry) -> Result<()> {
        Ok(())
    }
}

/// A command that records its full argument vector.
pub struct RecordingCmd {
    name: String,
    log: RecordLog,
}

impl RecordingCmd {
    pub fn new(name: &str, log: &RecordLog) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
        }
    }
}

impl Command for RecordingCmd {
    fn name(&self) -> &str {
        &self.name
    }
    fn short_help(&self) -> &str {
        "record invocations"
    }
    fn execute(&self, args: &[String], _doc: &mut Document, _reg: &CommandRegistry) -> Result<()> {
        self.log.push(args.join(" "));
        Ok(())
    }
}

/// A command that always fails with a command error.
pub struct FailingCmd {
    name: String,
}

impl FailingCmd {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Command for FailingCmd {
    fn name(&self) -> &str {
        &self.name
    }
    fn short_help(&self) -> &str {
        "always fail"
    }
    fn execute(&self, _args: &[String], _doc: &mut Document, _reg: &CommandRegistry) -> Result<()> {
        Err(MillError::Command(format!("{} failed", self.name)))
    }
}

/// A command that leaves extra selection frames on the stack.
pub struct PushingCmd {
    name: String,
    frames: usize,
    fail: bool,
}

impl PushingCmd {
    pub fn new(name: &str, frames: usize, fail: bool) -> Self {
        Self {
            name: name.to_string(),
            frames,
            fail,
        }
    }
}

impl Command for PushingCmd {
    fn name(&self) -> &str {
        &self.name
    }
    fn short_help(&self) -> &str {
        "push selection frames"
    }
    fn execute(&self, _args: &[String], doc: &mut Document, _reg: &CommandRegistry) -> Result<()> {
        for _ in 0..self.frames {
            doc.selection_stack.push(Selection::Full);
        }
        if self.fail {
            return Err(MillError::Command(format!("{} failed", self.name)));
        }
        Ok(())
    }
}

/// A command that records which modules the active selection covers.
pub struct SelectionProbe {
    name: String,
    log: RecordLog,
}

impl SelectionProbe {
    pub fn new(name: &str, log: &RecordLog) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
        }
    }
}

impl Command for SelectionProbe {
    fn name(&self) -> &str {
        &self.name
    }
    fn short_help(&self) -> &str {
        "record the active selection"
    }
    fn execute(&self, _args: &[String], doc: &mut Document, _reg: &CommandRegistry) -> Result<()> {
        self.log.push(doc.selected_names().join(","));
        Ok(())
    }
}

#[derive(Default)]
struct FrontendState {
    contents: Vec<String>,
    filenames: Vec<String>,
    heads: Vec<String>,
}

/// A frontend that slurps its input and records what it saw.
#[derive(Clone)]
pub struct RecordingFrontend {
    format: String,
    state: Rc<RefCell<FrontendState>>,
}

impl RecordingFrontend {
    pub fn new(format: &str) -> Self {
        Self {
            format: format.to_string(),
            state: Rc::default(),
        }
    }

    pub fn contents(&self) -> Vec<String> {
        self.state.borrow().contents.clone()
    }

    pub fn filenames(&self) -> Vec<String> {
        self.state.borrow().filenames.clone()
    }

    pub fn heads(&self) -> Vec<String> {
        self.state.borrow().heads.clone()
    }
}

impl Frontend for RecordingFrontend {
    fn format_name(&self) -> &str {
        &self.format
    }
    fn short_help(&self) -> &str {
        "record input"
    }
    fn read(
        &self,
        io: &mut FrontendIo<'_, '_>,
        args: &mut Vec<String>,
        _doc: &mut Document,
        _reg: &CommandRegistry,
    ) -> Result<()> {
        io.open(args, 1)?;
        let mut text = String::new();
        io.reader()?.read_to_string(&mut text)?;
        let mut state = self.state.borrow_mut();
        state.contents.push(text);
        state.filenames.push(io.filename().to_string());
        state.heads.push(args[0].clone());
        Ok(())
    }
}

#[derive(Default)]
struct BackendState {
    filenames: Vec<String>,
    heads: Vec<String>,
}

/// A backend that writes the selected module names, one per line.
#[derive(Clone)]
pub struct SinkBackend {
    format: String,
    state: Rc<RefCell<BackendState>>,
}

impl SinkBackend {
    pub fn new(format: &str) -> Self {
        Self {
            format: format.to_string(),
            state: Rc::default(),
        }
    }

    pub fn filenames(&self) -> Vec<String> {
        self.state.borrow().filenames.clone()
    }

    pub fn heads(&self) -> Vec<String> {
        self.state.borrow().heads.clone()
    }
}

impl Backend for SinkBackend {
    fn format_name(&self) -> &str {
        &self.format
    }
    fn short_help(&self) -> &str {
        "write module names"
    }
    fn write(
        &self,
        io: &mut BackendIo<'_>,
        args: &mut Vec<String>,
        doc: &mut Document,
        _reg: &CommandRegistry,
    ) -> Result<()> {
        io.open(args, 1)?;
        for name in doc.selected_names() {
            writeln!(io.writer(), "{name}")?;
        }
        io.writer().flush()?;
        let mut state = self.state.borrow_mut();
        state.filenames.push(io.filename().to_string());
        state.heads.push(args[0].clone());
        Ok(())
    }
}
