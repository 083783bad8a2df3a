//! The document: a map of named modules plus selection state.

use std::collections::BTreeMap;

use mill_types::error::{MillError, Result};

use crate::Selection;

/// A named section of the document holding text records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub lines: Vec<String>,
}

impl Module {
    /// Create an empty module with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: Vec::new(),
        }
    }
}

/// The shared mutable document every command operates on.
///
/// The selection stack and the active-target marker are mutated only by the
/// dispatch layer, which guarantees restoration to pre-call state around
/// every command invocation.
#[derive(Debug)]
pub struct Document {
    /// Modules keyed by name. Invariant: key equals `Module::name`.
    pub modules: BTreeMap<String, Module>,
    /// Scoping stack; the top entry is the active selection. A new document
    /// carries a single full-selection frame that commands like `select`
    /// mutate in place; scoped invocations push and pop above it.
    pub selection_stack: Vec<Selection>,
    /// Name of the module a scoped invocation is targeting, if any.
    pub active_target: Option<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with a full base selection.
    pub fn new() -> Self {
        Self {
            modules: BTreeMap::new(),
            selection_stack: vec![Selection::Full],
            active_target: None,
        }
    }

    /// Insert a new empty module. Fails if a module with that name exists.
    pub fn add_module(&mut self, name: &str) -> Result<&mut Module> {
        if self.modules.contains_key(name) {
            return Err(MillError::Command(format!(
                "module already exists: {name}"
            )));
        }
        Ok(self
            .modules
            .entry(name.to_string())
            .or_insert_with(|| Module::new(name)))
    }

    /// The active selection: top of the stack, or the full document.
    pub fn selection(&self) -> &Selection {
        static FULL: Selection = Selection::Full;
        self.selection_stack.last().unwrap_or(&FULL)
    }

    /// Names of the modules covered by the active selection, sorted.
    pub fn selected_names(&self) -> Vec<String> {
        let sel = self.selection();
        self.modules
            .keys()
            .filter(|name| sel.selects(name))
            .cloned()
            .collect()
    }

    /// Validate internal invariants, panicking on violation.
    ///
    /// This is an internal contract check, not user input validation: the
    /// dispatch engine runs it after every successful command, and a failure
    /// means a command corrupted the document.
    pub fn check(&self) {
        for (key, module) in &self.modules {
            assert!(
                *key == module.name,
                "document check failed: module stored under key `{key}` is named `{}`",
                module.name
            );
            assert!(
                !module.name.is_empty(),
                "document check failed: module with empty name"
            );
            assert!(
                !module.name.chars().any(char::is_whitespace),
                "document check failed: module name `{}` contains whitespace",
                module.name
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_lookup_module() {
        let mut doc = Document::new();
        doc.add_module("top").unwrap();
        assert!(doc.modules.contains_key("top"));
        assert_eq!(doc.modules["top"].name, "top");
    }

    #[test]
    fn duplicate_module_rejected() {
        let mut doc = Document::new();
        doc.add_module("top").unwrap();
        assert!(doc.add_module("top").is_err());
    }

    #[test]
    fn new_document_selects_everything() {
        let mut doc = Document::new();
        doc.add_module("a").unwrap();
        doc.add_module("b").unwrap();
        assert_eq!(doc.selection_stack.len(), 1);
        assert_eq!(doc.selected_names(), vec!["a", "b"]);
    }

    #[test]
    fn top_of_stack_wins() {
        let mut doc = Document::new();
        doc.add_module("a").unwrap();
        doc.add_module("b").unwrap();
        doc.selection_stack.push(Selection::Full);
        doc.selection_stack.push(Selection::of(["b"]));
        assert_eq!(doc.selected_names(), vec!["b"]);
    }

    #[test]
    fn check_passes_on_consistent_document() {
        let mut doc = Document::new();
        doc.add_module("a").unwrap();
        doc.modules.get_mut("a").unwrap().lines.push("x".into());
        doc.check();
    }

    #[test]
    #[should_panic(expected = "document check failed")]
    fn check_panics_on_key_name_mismatch() {
        let mut doc = Document::new();
        doc.modules
            .insert("a".to_string(), Module::new("mismatch"));
        doc.check();
    }

    #[test]
    #[should_panic(expected = "document check failed")]
    fn check_panics_on_whitespace_name() {
        let mut doc = Document::new();
        doc.modules
            .insert("bad name".to_string(), Module::new("bad name"));
        doc.check();
    }
}
