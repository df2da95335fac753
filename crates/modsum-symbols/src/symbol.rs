//! Symbol identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense identifier for an interned name
///
/// Only meaningful together with the [`SymbolTable`](crate::SymbolTable)
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

impl SymbolId {
    /// Reserved ID, never assigned to a real symbol
    pub const NONE: SymbolId = SymbolId(0);

    /// Whether this is the reserved absent marker
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Convert the on-disk form (0 = absent) into an optional ID
    pub fn from_raw(raw: u32) -> Option<SymbolId> {
        if raw == 0 {
            None
        } else {
            Some(SymbolId(raw))
        }
    }

    /// Convert an optional ID into the on-disk form (0 = absent)
    pub fn to_raw(id: Option<SymbolId>) -> u32 {
        id.map_or(0, |id| id.0)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_zero_is_absent() {
        assert_eq!(SymbolId::from_raw(0), None);
        assert_eq!(SymbolId::from_raw(7), Some(SymbolId(7)));
        assert_eq!(SymbolId::to_raw(None), 0);
        assert_eq!(SymbolId::to_raw(Some(SymbolId(3))), 3);
    }
}
