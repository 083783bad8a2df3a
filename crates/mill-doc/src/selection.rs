//! Module selections.

use std::collections::BTreeSet;

/// A filter describing which modules of a document a command should act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every module in the document.
    Full,
    /// Exactly the named modules.
    Modules(BTreeSet<String>),
}

impl Selection {
    /// Build a selection of exactly the given module names.
    pub fn of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Modules(names.into_iter().map(Into::into).collect())
    }

    /// Whether the named module is covered by this selection.
    pub fn selects(&self, name: &str) -> bool {
        match self {
            Self::Full => true,
            Self::Modules(set) => set.contains(name),
        }
    }

    /// Whether this selection covers nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Full => false,
            Self::Modules(set) => set.is_empty(),
        }
    }
}
