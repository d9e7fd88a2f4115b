//! Stable ID newtypes for the AST and expression arenas.
//!
//! `NodeId` and `ExprId` are distinct newtype wrappers over `u32` so that a
//! statement-arena index can never be accidentally used where an
//! expression-arena index is expected. Both are plain indices into a `Vec`
//! owned by [`crate::ast::Ast`] / [`crate::expr::ExprPool`] -- there is no
//! petgraph here, since the AST is a tree, not a graph.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a [`crate::ast::Node`] in an [`crate::ast::Ast`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Index of an [`crate::expr::Expr`] in an [`crate::expr::ExprPool`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExprId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_display() {
        assert_eq!(format!("{}", NodeId(3)), "Node(3)");
    }

    #[test]
    fn expr_id_display() {
        assert_eq!(format!("{}", ExprId(9)), "Expr(9)");
    }

    #[test]
    fn id_types_are_distinct() {
        let node = NodeId(1);
        let expr = ExprId(1);
        assert_eq!(node.0, expr.0);
    }

    #[test]
    fn serde_roundtrip() {
        let node = NodeId(42);
        let json = serde_json::to_string(&node).unwrap();
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }
}
