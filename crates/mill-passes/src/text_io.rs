//! Plain-text frontend and backend.
//!
//! The text format is line oriented: a `.module <name>` header starts a new
//! module and every following line belongs to it until the next header.

use std::io::{BufRead, Write};

use mill_dispatch::{Backend, BackendIo, CommandRegistry, Frontend, FrontendIo};
use mill_doc::{Document, Module};
use mill_types::error::{MillError, Result};

/// Validate parsed modules and install them into the document.
///
/// Checks every module before inserting any, so a bad input file leaves the
/// document untouched.
pub(crate) fn install_modules(
    doc: &mut Document,
    source: &str,
    modules: Vec<Module>,
) -> Result<usize> {
    for module in &modules {
        if module.name.is_empty() || module.name.chars().any(char::is_whitespace) {
            return Err(MillError::Command(format!(
                "{source}: invalid module name `{}'",
                module.name
            )));
        }
        if doc.modules.contains_key(&module.name) {
            return Err(MillError::Command(format!(
                "{source}: module already exists: {}",
                module.name
            )));
        }
    }
    let count = modules.len();
    for module in modules {
        doc.modules.insert(module.name.clone(), module);
    }
    Ok(count)
}

// ---------------------------------------------------------------------------
// read_text
// ---------------------------------------------------------------------------

pub struct TextFrontend;

impl Frontend for TextFrontend {
    fn format_name(&self) -> &str {
        "text"
    }
    fn short_help(&self) -> &str {
        "read modules from a plain text file"
    }
    fn help(&self) -> String {
        "\n    read_text [-lenient] <filename>\n\nRead modules from a text file. A line \
         `.module <name>` starts a module;\nevery following line belongs to it. Without \
         -lenient, a content line before\nthe first header is an error.\n"
            .to_string()
    }
    fn read(
        &self,
        io: &mut FrontendIo<'_, '_>,
        args: &mut Vec<String>,
        doc: &mut Document,
        _reg: &CommandRegistry,
    ) -> Result<()> {
        let mut lenient = false;
        let mut argidx = 1;
        while argidx < args.len() {
            match args[argidx].as_str() {
                "-lenient" => {
                    lenient = true;
                    argidx += 1;
                }
                _ => break,
            }
        }
        io.open(args, argidx)?;

        let filename = io.filename().to_string();
        let reader = io.reader()?;
        let mut parsed: Vec<Module> = Vec::new();
        let mut line = String::new();
        let mut lineno = 0usize;
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            lineno += 1;
            let text = line.trim_end_matches(['\r', '\n']);
            if let Some(rest) = text.strip_prefix(".module")
                && (rest.is_empty() || rest.starts_with([' ', '\t']))
            {
                let name = rest.trim();
                if name.is_empty() {
                    return Err(MillError::Command(format!(
                        "{filename}:{lineno}: missing module name"
                    )));
                }
                parsed.push(Module::new(name));
            } else if text.trim().is_empty() && parsed.is_empty() {
                // Blank preamble before the first header is fine.
            } else {
                match parsed.last_mut() {
                    Some(module) => module.lines.push(text.to_string()),
                    None if lenient => {}
                    None => {
                        return Err(MillError::Command(format!(
                            "{filename}:{lineno}: content line outside of module"
                        )));
                    }
                }
            }
        }

        let count = install_modules(doc, &filename, parsed)?;
        log::info!("Read {count} modules from {filename}");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// write_text
// ---------------------------------------------------------------------------

pub struct TextBackend;

impl Backend for TextBackend {
    fn format_name(&self) -> &str {
        "text"
    }
    fn short_help(&self) -> &str {
        "write selected modules as plain text"
    }
    fn help(&self) -> String {
        "\n    write_text [-compact] [filename]\n\nWrite the selected modules as text. \
         With -compact, blank lines are\nskipped. Without a filename the output goes to \
         stdout; `-` names stdout\nexplicitly.\n"
            .to_string()
    }
    fn write(
        &self,
        io: &mut BackendIo<'_>,
        args: &mut Vec<String>,
        doc: &mut Document,
        _reg: &CommandRegistry,
    ) -> Result<()> {
        let mut compact = false;
        let mut argidx = 1;
        while argidx < args.len() {
            match args[argidx].as_str() {
                "-compact" => {
                    compact = true;
                    argidx += 1;
                }
                _ => break,
            }
        }
        io.open(args, argidx)?;

        let sel = doc.selection().clone();
        let mut count = 0usize;
        let writer = io.writer();
        for (name, module) in &doc.modules {
            if !sel.selects(name) {
                continue;
            }
            writeln!(writer, ".module {name}")?;
            for text in &module.lines {
                if compact && text.trim().is_empty() {
                    continue;
                }
                writeln!(writer, "{text}")?;
            }
            count += 1;
        }
        writer.flush()?;
        log::info!("Wrote {count} modules to {}", io.filename());
        Ok(())
    }
}
