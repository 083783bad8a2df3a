//! Command-line interpretation, dispatch, and selection scoping.
//!
//! The interpreter turns a raw text line into dispatch invocations, executed
//! left to right as they are parsed. The dispatch engine resolves the head
//! token against the registry, invokes the command, restores the selection
//! stack to its entry depth on every exit path, and runs the document's
//! consistency check after each successful invocation.

use mill_doc::{Document, Selection};
use mill_types::error::{MillError, Result};

use crate::registry::{CommandKind, CommandRegistry};
use crate::backend::BackendIo;

impl CommandRegistry {
    /// Parse and execute a raw command line.
    ///
    /// An empty line or one starting with `#` is a no-op. A line starting
    /// with `!` runs the remainder as an external shell command and reports
    /// a non-zero exit status as a command error. Otherwise tokens split on
    /// whitespace; a `#` token ends the line, and a token with one to three
    /// trailing semicolons dispatches the accumulated argument vector
    /// immediately (`;;` chains `clean`, `;;;` chains `clean -purge`;
    /// anything past three chains nothing further).
    pub fn execute_line(&self, doc: &mut Document, line: &str) -> Result<()> {
        let line = line.trim_start();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        if let Some(rest) = line.strip_prefix('!') {
            let shell_cmd = rest
                .trim_start_matches([' ', '\t'])
                .trim_end_matches(['\r', '\n']);
            log::info!("Shell command: {shell_cmd}");
            let status = std::process::Command::new("sh")
                .arg("-c")
                .arg(shell_cmd)
                .status()?;
            if !status.success() {
                return Err(MillError::Command(format!(
                    "shell command returned error code {}",
                    status.code().unwrap_or(-1)
                )));
            }
            return Ok(());
        }

        let mut args: Vec<String> = Vec::new();
        for token in line.split_whitespace() {
            if token == "#" {
                break;
            }
            if token.ends_with(';') {
                let body = token.trim_end_matches(';');
                let semicolons = token.len() - body.len();
                if !body.is_empty() {
                    args.push(body.to_string());
                }
                self.dispatch(doc, &std::mem::take(&mut args))?;
                if semicolons == 2 {
                    self.execute_line(doc, "clean")?;
                }
                if semicolons == 3 {
                    self.execute_line(doc, "clean -purge")?;
                }
            } else {
                args.push(token.to_string());
            }
        }
        self.dispatch(doc, &args)
    }

    /// Resolve and invoke a single argument vector.
    ///
    /// No-op for an empty vector or a `#`-prefixed head token. The resolved
    /// command's invocation counter is incremented, the selection stack is
    /// popped back to its entry depth whether the command succeeds or fails,
    /// and the document's consistency check runs after every success.
    pub fn dispatch(&self, doc: &mut Document, args: &[String]) -> Result<()> {
        if args.is_empty() || args[0].starts_with('#') {
            return Ok(());
        }

        if self.echo() {
            log::info!("mill> {}", args.join(" "));
        }

        let entry = self
            .lookup(&args[0])
            .ok_or_else(|| MillError::UnknownCommand(args[0].clone()))?;

        let depth = doc.selection_stack.len();
        entry.bump();
        let result = match &entry.kind {
            CommandKind::Generic(cmd) => cmd.execute(args, doc, self),
            CommandKind::Frontend(frontend) => {
                self.run_frontend(entry, frontend.as_ref(), args, doc)
            }
            CommandKind::Backend(backend) => {
                let mut args = args.to_vec();
                let mut io = BackendIo::new(entry.name(), None, String::new());
                backend.write(&mut io, &mut args, doc, self)
            }
        };
        doc.selection_stack.truncate(depth);
        result?;

        doc.check();
        Ok(())
    }

    /// Run a command line against a narrowed view of the document.
    ///
    /// The active-target marker is cleared and `selection` pushed for the
    /// duration of the call; both are restored on every exit path, so the
    /// callee can neither observe nor corrupt the caller's scope.
    pub fn call_on_selection(
        &self,
        doc: &mut Document,
        selection: Selection,
        line: &str,
    ) -> Result<()> {
        let saved_target = doc.active_target.take();
        doc.selection_stack.push(selection);

        let result = self.execute_line(doc, line);

        doc.selection_stack.pop();
        doc.active_target = saved_target;
        result
    }

    /// Run a command line against exactly one module.
    ///
    /// Sets the active-target marker to `target` and pushes a selection of
    /// that module alone; both are restored on every exit path.
    pub fn call_on_target(&self, doc: &mut Document, target: &str, line: &str) -> Result<()> {
        let saved_target = doc.active_target.replace(target.to_string());
        doc.selection_stack.push(Selection::of([target]));

        let result = self.execute_line(doc, line);

        doc.selection_stack.pop();
        doc.active_target = saved_target;
        result
    }
}
