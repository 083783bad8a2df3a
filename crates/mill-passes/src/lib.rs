//! Built-in commands for mill.
//!
//! Commands implement the traits from `mill-dispatch` and are registered by
//! name. This crate provides the document passes (`ls`, `stat`, `rename`,
//! `delete`, `select`, `clean`), script execution (`script`), and the text
//! and JSON frontend/backend pairs.

mod doc_commands;
mod json_io;
mod script_commands;
mod text_io;

use mill_dispatch::CommandRegistry;

/// Register all built-in commands into a registry.
///
/// The dispatch layer's own `help` and `echo` commands are registered
/// separately by `mill_dispatch::register_core`.
pub fn register_builtins(reg: &mut CommandRegistry) {
    reg.register(Box::new(doc_commands::LsCmd));
    reg.register(Box::new(doc_commands::StatCmd));
    reg.register(Box::new(doc_commands::RenameCmd));
    reg.register(Box::new(doc_commands::DeleteCmd));
    reg.register(Box::new(doc_commands::SelectCmd));
    reg.register(Box::new(doc_commands::CleanCmd));
    reg.register(Box::new(script_commands::ScriptCmd));
    reg.register_frontend(Box::new(text_io::TextFrontend));
    reg.register_backend(Box::new(text_io::TextBackend));
    reg.register_frontend(Box::new(json_io::JsonFrontend));
    reg.register_backend(Box::new(json_io::JsonBackend));
}

#[cfg(test)]
mod tests {
    use super::*;
    use mill_dispatch::register_core;
    use mill_doc::Document;

    #[test]
    fn all_builtins_registered() {
        let mut reg = CommandRegistry::new();
        register_core(&mut reg);
        register_builtins(&mut reg);
        for name in [
            "help",
            "echo",
            "ls",
            "stat",
            "rename",
            "delete",
            "select",
            "clean",
            "script",
            "read_text",
            "write_text",
            "read_json",
            "write_json",
        ] {
            assert!(reg.lookup(name).is_some(), "missing command {name}");
        }
        assert!(reg.lookup_frontend("text").is_some());
        assert!(reg.lookup_backend("json").is_some());
    }

    #[test]
    fn double_semicolon_chains_the_real_clean() {
        let mut reg = CommandRegistry::new();
        register_core(&mut reg);
        register_builtins(&mut reg);
        let mut doc = Document::new();
        doc.add_module("empty").unwrap();
        doc.add_module("full").unwrap();
        doc.modules.get_mut("full").unwrap().lines.push("x".into());

        reg.execute_line(&mut doc, "ls;;").unwrap();

        assert!(!doc.modules.contains_key("empty"));
        assert!(doc.modules.contains_key("full"));
    }

    #[test]
    fn triple_semicolon_chains_clean_purge() {
        let mut reg = CommandRegistry::new();
        register_core(&mut reg);
        register_builtins(&mut reg);
        let mut doc = Document::new();
        doc.add_module("blank").unwrap();
        doc.modules.get_mut("blank").unwrap().lines.push("   ".into());

        reg.execute_line(&mut doc, "ls;;;").unwrap();

        assert!(!doc.modules.contains_key("blank"));
    }
}
