//! Frontend I/O adapter: input-source resolution and repeat invocation.
//!
//! A frontend's input can come from a caller-supplied stream, a named file,
//! a here-document read out of the current script source, or standard input.
//! Extra positional filenames are spliced into a continuation vector so one
//! command line can read several files through repeated invocations.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};

use mill_doc::Document;
use mill_types::error::{MillError, Result};

use crate::registry::{CommandEntry, CommandRegistry, Frontend};
use crate::report::syntax_error;

/// An input stream with explicit ownership.
///
/// Owned variants (files, here-document buffers) close on drop; the borrowed
/// variant belongs to the caller and is never closed here.
pub enum Source<'a> {
    Borrowed(&'a mut dyn BufRead),
    File(BufReader<File>),
    HereDoc(Cursor<Vec<u8>>),
    Stdin(io::StdinLock<'a>),
}

impl Read for Source<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Borrowed(r) => r.read(buf),
            Self::File(r) => r.read(buf),
            Self::HereDoc(r) => r.read(buf),
            Self::Stdin(r) => r.read(buf),
        }
    }
}

impl BufRead for Source<'_> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            Self::Borrowed(r) => r.fill_buf(),
            Self::File(r) => r.fill_buf(),
            Self::HereDoc(r) => r.fill_buf(),
            Self::Stdin(r) => r.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            Self::Borrowed(r) => r.consume(amt),
            Self::File(r) => r.consume(amt),
            Self::HereDoc(r) => r.consume(amt),
            Self::Stdin(r) => r.consume(amt),
        }
    }
}

/// The stream here-documents are read from, installed while a script runs.
pub struct ScriptSource {
    name: String,
    reader: Box<dyn BufRead>,
}

impl ScriptSource {
    /// Wrap a reader as the current script source.
    pub fn new(name: impl Into<String>, reader: Box<dyn BufRead>) -> Self {
        Self {
            name: name.into(),
            reader,
        }
    }

    /// Display name of the script.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read one line including its terminator; `None` at end of stream.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Resolved input for one frontend invocation.
///
/// Constructed by the dispatch layer; the frontend's business logic calls
/// [`FrontendIo::open`] after parsing its options, then reads from
/// [`FrontendIo::reader`].
pub struct FrontendIo<'a, 'r> {
    reg: &'r CommandRegistry,
    canonical: String,
    supplied: bool,
    source: Option<Source<'a>>,
    filename: String,
}

impl<'a, 'r> FrontendIo<'a, 'r> {
    pub(crate) fn new(
        reg: &'r CommandRegistry,
        canonical: &str,
        source: Option<Source<'a>>,
        filename: String,
    ) -> Self {
        let supplied = source.is_some();
        Self {
            reg,
            canonical: canonical.to_string(),
            supplied,
            source,
            filename,
        }
    }

    /// Resolve the input source from the positional arguments at `argidx`.
    ///
    /// An option-like token at the scan position is a syntax error, as is a
    /// filename when the caller already supplied a stream. A `<<MARK` token
    /// captures a here-document from the current script source. Remaining
    /// positional arguments are spliced into the continuation vector (headed
    /// by the canonical command name) so the top-level loop re-invokes the
    /// frontend once per file. `args[0]` is rewritten to the canonical
    /// command name; in direct-stream mode the display filename is appended
    /// to `args`.
    pub fn open(&mut self, args: &mut Vec<String>, argidx: usize) -> Result<()> {
        self.reg.next_args.borrow_mut().clear();
        let mut idx = argidx;
        while idx < args.len() {
            let arg = args[idx].clone();

            if arg.starts_with('-') {
                return Err(syntax_error(
                    args,
                    idx,
                    "Unknown option or option in arguments.",
                ));
            }
            if self.source.is_some() {
                return Err(syntax_error(
                    args,
                    idx,
                    "Extra filename argument in direct stream mode.",
                ));
            }

            let mut filename = arg;
            if filename == "<<" && idx + 1 < args.len() {
                idx += 1;
                filename.push_str(&args[idx]);
            }
            if let Some(marker) = filename.strip_prefix("<<") {
                if marker.is_empty() {
                    return Err(MillError::MissingMarker);
                }
                let body = self.reg.read_here_document(marker)?;
                self.source = Some(Source::HereDoc(Cursor::new(body.into_bytes())));
            } else {
                let file = File::open(&filename).map_err(|source| MillError::OpenInput {
                    filename: filename.clone(),
                    source,
                })?;
                self.source = Some(Source::File(BufReader::new(file)));
            }
            self.filename = filename;

            for i in idx + 1..args.len() {
                if args[i].starts_with('-') {
                    return Err(syntax_error(args, i, "Found option, expected arguments."));
                }
            }
            if idx + 1 < args.len() {
                let mut next: Vec<String> = args[..idx].to_vec();
                next[0] = self.canonical.clone();
                next.extend(args[idx + 1..].iter().cloned());
                args.truncate(idx + 1);
                *self.reg.next_args.borrow_mut() = next;
            }
            break;
        }

        if self.source.is_none() {
            return Err(syntax_error(args, args.len(), "No filename given."));
        }
        if self.supplied {
            args.push(self.filename.clone());
        }
        args[0] = self.canonical.clone();
        Ok(())
    }

    /// The resolved input stream.
    pub fn reader(&mut self) -> Result<&mut Source<'a>> {
        self.source
            .as_mut()
            .ok_or_else(|| MillError::Command("frontend input source not resolved".to_string()))
    }

    /// Display name of the resolved input.
    pub fn filename(&self) -> &str {
        &self.filename
    }
}

impl CommandRegistry {
    /// Capture a here-document from the current script source.
    ///
    /// Reads lines until one whose content, ignoring leading whitespace,
    /// starts with `marker`; the lines before it form the captured buffer.
    pub(crate) fn read_here_document(&self, marker: &str) -> Result<String> {
        let mut slot = self.script_source.borrow_mut();
        let Some(source) = slot.as_mut() else {
            return Err(MillError::Command(format!(
                "unexpected here document `<<{marker}' outside of script"
            )));
        };

        let mut body = String::new();
        loop {
            match source.read_line()? {
                None => return Err(MillError::UnexpectedEof(marker.to_string())),
                Some(line) => {
                    if line.trim_start().starts_with(marker) {
                        break;
                    }
                    body.push_str(&line);
                }
            }
        }
        drop(slot);

        *self.last_here_document.borrow_mut() = body.clone();
        Ok(body)
    }

    /// Top-level frontend invocation: loop while the continuation vector is
    /// refilled, consuming one input file per round.
    pub(crate) fn run_frontend(
        &self,
        entry: &CommandEntry,
        frontend: &dyn Frontend,
        args: &[String],
        doc: &mut Document,
    ) -> Result<()> {
        assert!(
            self.next_args.borrow().is_empty(),
            "nested top-level frontend invocation"
        );

        let mut args = args.to_vec();
        loop {
            self.next_args.borrow_mut().clear();
            let mut io = FrontendIo::new(self, entry.name(), None, String::new());
            if let Err(err) = frontend.read(&mut io, &mut args, doc, self) {
                self.next_args.borrow_mut().clear();
                return Err(err);
            }
            args = std::mem::take(&mut *self.next_args.borrow_mut());
            if args.is_empty() {
                return Ok(());
            }
            entry.bump();
        }
    }

    /// Invoke a frontend by format name with an explicit source.
    ///
    /// `command` splits on whitespace; its head token resolves in the
    /// frontend table. With `stream` supplied the frontend reads from it
    /// directly; a `filename` of `-` reads standard input; otherwise the
    /// filename (when non-empty) joins the arguments and the normal
    /// file-resolution loop runs.
    pub fn call_frontend(
        &self,
        doc: &mut Document,
        stream: Option<&mut dyn BufRead>,
        filename: &str,
        command: &str,
    ) -> Result<()> {
        let args: Vec<String> = command.split_whitespace().map(str::to_string).collect();
        self.call_frontend_args(doc, stream, filename, args)
    }

    /// Argument-vector form of [`CommandRegistry::call_frontend`].
    pub fn call_frontend_args(
        &self,
        doc: &mut Document,
        stream: Option<&mut dyn BufRead>,
        filename: &str,
        mut args: Vec<String>,
    ) -> Result<()> {
        if args.is_empty() {
            return Ok(());
        }
        let entry = self
            .lookup_frontend(&args[0])
            .ok_or_else(|| MillError::UnknownFrontend(args[0].clone()))?;
        let Some(frontend) = entry.as_frontend() else {
            return Err(MillError::UnknownFrontend(args[0].clone()));
        };

        entry.bump();
        match stream {
            Some(reader) => {
                let mut io = FrontendIo::new(
                    self,
                    entry.name(),
                    Some(Source::Borrowed(reader)),
                    filename.to_string(),
                );
                frontend.read(&mut io, &mut args, doc, self)?;
            }
            None if filename == "-" => {
                let mut io = FrontendIo::new(
                    self,
                    entry.name(),
                    Some(Source::Stdin(io::stdin().lock())),
                    "<stdin>".to_string(),
                );
                frontend.read(&mut io, &mut args, doc, self)?;
            }
            None => {
                if !filename.is_empty() {
                    args.push(filename.to_string());
                }
                self.run_frontend(entry, frontend, &args, doc)?;
            }
        }

        doc.check();
        Ok(())
    }
}
