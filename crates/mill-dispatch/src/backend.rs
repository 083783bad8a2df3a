//! Backend I/O adapter: output-sink resolution.
//!
//! Symmetric to the frontend adapter but simpler: a bare `-` names standard
//! output, any other non-option token is a file opened for writing, and
//! standard output is the default when no sink is named. Files the adapter
//! opened itself close on drop; caller-supplied streams are never closed.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use mill_doc::Document;
use mill_types::error::{MillError, Result};

use crate::registry::{Backend, CommandRegistry};
use crate::report::syntax_error;

/// An output stream with explicit ownership.
pub enum Sink<'a> {
    Borrowed(&'a mut dyn Write),
    File(BufWriter<File>),
    Stdout(io::Stdout),
}

impl Write for Sink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Borrowed(w) => w.write(buf),
            Self::File(w) => w.write(buf),
            Self::Stdout(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Borrowed(w) => w.flush(),
            Self::File(w) => w.flush(),
            Self::Stdout(w) => w.flush(),
        }
    }
}

/// Resolved output for one backend invocation.
///
/// Constructed by the dispatch layer; the backend's business logic calls
/// [`BackendIo::open`] after parsing its options, then writes through
/// [`BackendIo::writer`].
pub struct BackendIo<'a> {
    canonical: String,
    supplied: bool,
    sink: Option<Sink<'a>>,
    filename: String,
}

impl<'a> BackendIo<'a> {
    pub(crate) fn new(canonical: &str, sink: Option<Sink<'a>>, filename: String) -> Self {
        let supplied = sink.is_some();
        Self {
            canonical: canonical.to_string(),
            supplied,
            sink,
            filename,
        }
    }

    /// Resolve the output sink from the positional arguments at `argidx`.
    ///
    /// A bare `-` is standard output; any other option-like token is a
    /// syntax error, as is a second filename or a filename when the caller
    /// already supplied a stream. With no sink named at all, standard output
    /// is the default. `args[0]` is rewritten to the canonical command name;
    /// in direct-stream mode the display filename is appended to `args`.
    pub fn open(&mut self, args: &mut Vec<String>, argidx: usize) -> Result<()> {
        for idx in argidx..args.len() {
            let arg = args[idx].clone();

            if arg.starts_with('-') && arg != "-" {
                return Err(syntax_error(
                    args,
                    idx,
                    "Unknown option or option in arguments.",
                ));
            }
            if self.sink.is_some() {
                return Err(syntax_error(
                    args,
                    idx,
                    "Extra filename argument in direct stream mode.",
                ));
            }

            if arg == "-" {
                self.filename = "<stdout>".to_string();
                self.sink = Some(Sink::Stdout(io::stdout()));
                continue;
            }

            let file = File::create(&arg).map_err(|source| MillError::OpenOutput {
                filename: arg.clone(),
                source,
            })?;
            self.filename = arg;
            self.sink = Some(Sink::File(BufWriter::new(file)));
        }

        if self.supplied {
            args.push(self.filename.clone());
        }
        args[0] = self.canonical.clone();

        if self.sink.is_none() {
            self.filename = "<stdout>".to_string();
            self.sink = Some(Sink::Stdout(io::stdout()));
        }
        Ok(())
    }

    /// The resolved output stream, defaulting to standard output.
    pub fn writer(&mut self) -> &mut Sink<'a> {
        if self.sink.is_none() {
            self.filename = "<stdout>".to_string();
        }
        self.sink.get_or_insert_with(|| Sink::Stdout(io::stdout()))
    }

    /// Display name of the resolved output.
    pub fn filename(&self) -> &str {
        &self.filename
    }
}

impl CommandRegistry {
    /// Invoke a backend by format name with an explicit sink.
    ///
    /// `command` splits on whitespace; its head token resolves in the
    /// backend table. With `stream` supplied the backend writes to it
    /// directly; a `filename` of `-` writes standard output; otherwise the
    /// filename (when non-empty) joins the arguments and the normal sink
    /// resolution runs. The selection stack is restored to its entry depth
    /// around the call.
    pub fn call_backend(
        &self,
        doc: &mut Document,
        stream: Option<&mut dyn Write>,
        filename: &str,
        command: &str,
    ) -> Result<()> {
        let args: Vec<String> = command.split_whitespace().map(str::to_string).collect();
        self.call_backend_args(doc, stream, filename, args)
    }

    /// Argument-vector form of [`CommandRegistry::call_backend`].
    pub fn call_backend_args(
        &self,
        doc: &mut Document,
        stream: Option<&mut dyn Write>,
        filename: &str,
        mut args: Vec<String>,
    ) -> Result<()> {
        if args.is_empty() {
            return Ok(());
        }
        let entry = self
            .lookup_backend(&args[0])
            .ok_or_else(|| MillError::UnknownBackend(args[0].clone()))?;
        let Some(backend) = entry.as_backend() else {
            return Err(MillError::UnknownBackend(args[0].clone()));
        };

        let depth = doc.selection_stack.len();
        entry.bump();
        let result = match stream {
            Some(writer) => {
                let mut io = BackendIo::new(
                    entry.name(),
                    Some(Sink::Borrowed(writer)),
                    filename.to_string(),
                );
                backend.write(&mut io, &mut args, doc, self)
            }
            None if filename == "-" => {
                let mut io = BackendIo::new(
                    entry.name(),
                    Some(Sink::Stdout(io::stdout())),
                    "<stdout>".to_string(),
                );
                backend.write(&mut io, &mut args, doc, self)
            }
            None => {
                if !filename.is_empty() {
                    args.push(filename.to_string());
                }
                let mut io = BackendIo::new(entry.name(), None, String::new());
                backend.write(&mut io, &mut args, doc, self)
            }
        };
        doc.selection_stack.truncate(depth);
        result?;

        doc.check();
        Ok(())
    }
}
