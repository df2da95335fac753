//! Symbol table data structure

use crate::{SymbolError, SymbolId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Append-only string interner scoped to one summary store
///
/// Serializes as the list of names in ID order; the reverse index is rebuilt
/// on deserialization.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SymbolTable {
    /// Names indexed by `id - 1`
    names: Vec<String>,

    /// Name to ID mapping for interning
    by_name: HashMap<String, SymbolId>,
}

impl SymbolTable {
    /// Create a new empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a name, returning the existing ID if it was seen before
    pub fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }

        let id = SymbolId(self.names.len() as u32 + 1);
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Get the name for an ID
    pub fn resolve(&self, id: SymbolId) -> Result<&str, SymbolError> {
        self.get(id).ok_or(SymbolError::UnknownSymbol { id })
    }

    /// Get the name for an ID, if it was interned
    pub fn get(&self, id: SymbolId) -> Option<&str> {
        if id.is_none() {
            return None;
        }
        self.names.get(id.index()).map(String::as_str)
    }

    /// Look up the ID of a name without interning it
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }

    /// Whether the ID was handed out by this table
    pub fn contains(&self, id: SymbolId) -> bool {
        self.get(id).is_some()
    }

    /// Iterate over `(id, name)` pairs in ID order
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(index, name)| (SymbolId(index as u32 + 1), name.as_str()))
    }

    /// Number of interned symbols
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl PartialEq for SymbolTable {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

impl Eq for SymbolTable {}

impl From<Vec<String>> for SymbolTable {
    fn from(names: Vec<String>) -> Self {
        let mut table = SymbolTable::new();
        for name in &names {
            table.intern(name);
        }
        table
    }
}

impl From<SymbolTable> for Vec<String> {
    fn from(table: SymbolTable) -> Self {
        table.names
    }
}
