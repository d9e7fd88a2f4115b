//! Stable ID newtypes for IR values and basic blocks.
//!
//! Mirrors the `NodeId`/`ExprId` discipline of `owly_core::id`: a distinct
//! newtype per arena so a temp-value counter and a block-label counter can
//! never be confused, even though both are plain `u32`s under the hood.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies an SSA value produced within one [`crate::function::IRFunction`]
/// (`temp_counter`, §4.4). Not unique across functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueId(pub u32);

/// Identifies a basic block within one [`crate::function::IRFunction`]
/// (`label_counter`, §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_id_display() {
        assert_eq!(format!("{}", ValueId(3)), "%3");
    }

    #[test]
    fn block_id_display() {
        assert_eq!(format!("{}", BlockId(2)), "bb2");
    }
}
