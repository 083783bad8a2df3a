//! JSON frontend and backend.
//!
//! The JSON shape is `{"modules": {"<name>": ["<line>", ...]}}`.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use mill_dispatch::{Backend, BackendIo, CommandRegistry, Frontend, FrontendIo};
use mill_doc::{Document, Module};
use mill_types::error::Result;

use crate::text_io::install_modules;

#[derive(Debug, Serialize, Deserialize)]
struct JsonDocument {
    modules: BTreeMap<String, Vec<String>>,
}

// ---------------------------------------------------------------------------
// read_json
// ---------------------------------------------------------------------------

pub struct JsonFrontend;

impl Frontend for JsonFrontend {
    fn format_name(&self) -> &str {
        "json"
    }
    fn short_help(&self) -> &str {
        "read modules from a JSON file"
    }
    fn read(
        &self,
        io: &mut FrontendIo<'_, '_>,
        args: &mut Vec<String>,
        doc: &mut Document,
        _reg: &CommandRegistry,
    ) -> Result<()> {
        io.open(args, 1)?;

        let filename = io.filename().to_string();
        let mut text = String::new();
        io.reader()?.read_to_string(&mut text)?;
        let parsed: JsonDocument = serde_json::from_str(&text)?;

        let modules: Vec<Module> = parsed
            .modules
            .into_iter()
            .map(|(name, lines)| Module { name, lines })
            .collect();
        let count = install_modules(doc, &filename, modules)?;
        log::info!("Read {count} modules from {filename}");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// write_json
// ---------------------------------------------------------------------------

pub struct JsonBackend;

impl Backend for JsonBackend {
    fn format_name(&self) -> &str {
        "json"
    }
    fn short_help(&self) -> &str {
        "write selected modules as JSON"
    }
    fn write(
        &self,
        io: &mut BackendIo<'_>,
        args: &mut Vec<String>,
        doc: &mut Document,
        _reg: &CommandRegistry,
    ) -> Result<()> {
        io.open(args, 1)?;

        let sel = doc.selection().clone();
        let out = JsonDocument {
            modules: doc
                .modules
                .iter()
                .filter(|(name, _)| sel.selects(name))
                .map(|(name, module)| (name.clone(), module.lines.clone()))
                .collect(),
        };
        let text = serde_json::to_string_pretty(&out)?;

        let writer = io.writer();
        writer.write_all(text.as_bytes())?;
        writeln!(writer)?;
        writer.flush()?;
        log::info!("Wrote {} modules to {}", out.modules.len(), io.filename());
        Ok(())
    }
}
