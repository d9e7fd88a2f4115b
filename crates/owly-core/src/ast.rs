//! The AST node arena (§3 "AST nodes").
//!
//! [`Ast`] is an arena of [`Node`]s addressed by [`NodeId`]; every statement,
//! declaration, and type specifier the parser produces lives here rather
//! than behind a `Box`, matching the arena-ownership design note of §9 for
//! the AST-vs-symbol-table cyclic data graph. Expressions live in the
//! sibling [`crate::expr::ExprPool`] arena and are referenced by
//! [`crate::id::ExprId`].

use serde::{Deserialize, Serialize};

use crate::id::{ExprId, NodeId};
use crate::type_id::TypeId;

/// `storage`: at most one of `auto`/`register`/`static`/`extern` may be set
/// (parse-time error otherwise, §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageClass {
    None,
    Auto,
    Register,
    Static,
    Extern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signedness {
    None,
    Signed,
    Unsigned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthModifier {
    None,
    Short,
    Long,
    LongLong,
}

/// Accumulated type specifier, built up token-by-token during parsing
/// (§4.1). Invalid combinations (mixed signed/unsigned, short+long, three+
/// longs, multiple storage classes) are rejected before a `TypeSpec` is
/// ever completed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeSpec {
    pub storage: Option<StorageClass>,
    pub sign: Option<Signedness>,
    pub length: Option<LengthModifier>,
    pub is_const: bool,
    pub is_volatile: bool,
    pub is_inline: bool,
    pub is_restrict: bool,
    pub pointer_depth: u32,
}

impl TypeSpec {
    pub fn new() -> Self {
        TypeSpec {
            storage: None,
            sign: None,
            length: None,
            is_const: false,
            is_volatile: false,
            is_inline: false,
            is_restrict: false,
            pointer_depth: 0,
        }
    }
}

/// Either a builtin/typedef base name, or a nested struct/union/enum
/// declaration (§3 "Type node").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeBase {
    Name(String),
    Decl(NodeId),
}

/// One `name` or `name = value` entry inside an `enum { ... }` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub value: Option<ExprId>,
}

/// One `(cond, body)` pair of an `elif` chain inside an `if` statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElifClause {
    pub cond: ExprId,
    pub body: Vec<NodeId>,
}

/// One `case expr: body` arm of a `switch` statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchCase {
    pub value: ExprId,
    pub body: Vec<NodeId>,
}

/// `break` or `continue` (§3 "Misc").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MiscKind {
    Break,
    Continue,
}

/// One tagged AST construct. Every variant maps 1:1 to a grammar
/// production in §3/§4.1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeKind {
    Program {
        stmts: Vec<NodeId>,
    },
    VarDecl {
        ty: NodeId,
        name: String,
        init: Option<ExprId>,
    },
    FuncDecl {
        return_ty: NodeId,
        name: String,
        params: Vec<NodeId>,
        is_prototype: bool,
        body: Vec<NodeId>,
    },
    Return {
        value: Option<ExprId>,
    },
    ExprStmt {
        expr: ExprId,
    },
    EnumDecl {
        tag: Option<String>,
        members: Vec<EnumMember>,
    },
    StructDecl {
        tag: Option<String>,
        members: Vec<NodeId>,
    },
    UnionDecl {
        tag: Option<String>,
        members: Vec<NodeId>,
    },
    While {
        cond: ExprId,
        body: Vec<NodeId>,
    },
    DoWhile {
        body: Vec<NodeId>,
        cond: ExprId,
    },
    For {
        init: Option<NodeId>,
        cond: Option<NodeId>,
        inc: Option<ExprId>,
        body: Vec<NodeId>,
    },
    If {
        cond: ExprId,
        body: Vec<NodeId>,
        elifs: Vec<ElifClause>,
        else_body: Option<Vec<NodeId>>,
    },
    Switch {
        scrutinee: ExprId,
        cases: Vec<SwitchCase>,
        default_body: Option<Vec<NodeId>>,
    },
    /// A type specifier record: `spec` plus either a `base` name/typedef
    /// reference or a nested declaration.
    TypeNode {
        spec: TypeSpec,
        base: TypeBase,
    },
    Typedef {
        name: String,
        underlying: NodeId,
    },
    Array {
        elem_ty: NodeId,
        name: String,
        dimensions: Vec<u64>,
        init: Option<ExprId>,
    },
    Misc {
        kind: MiscKind,
    },
}

/// A single AST node: its tagged payload plus the resolved type attached
/// during pass 2 (§3: "Every AST node carries an optional resolved-type
/// pointer").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub resolved_type: Option<TypeId>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            resolved_type: None,
        }
    }
}

/// Arena of AST nodes, addressed by [`NodeId`]. `root` is the top-level
/// `Program` node once parsing completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ast {
    nodes: Vec<Node>,
    pub root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Ast {
            nodes: Vec::new(),
            root: None,
        }
    }

    pub fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind));
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The top-level statement list of the `Program` node at `root`.
    pub fn program_stmts(&self) -> &[NodeId] {
        match self.root.map(|r| &self.get(r).kind) {
            Some(NodeKind::Program { stmts }) => stmts,
            _ => &[],
        }
    }
}

impl Default for Ast {
    fn default() -> Self {
        Ast::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_get_roundtrip() {
        let mut ast = Ast::new();
        let id = ast.push(NodeKind::Misc {
            kind: MiscKind::Break,
        });
        assert!(matches!(ast.get(id).kind, NodeKind::Misc { kind: MiscKind::Break }));
        assert!(ast.get(id).resolved_type.is_none());
    }

    #[test]
    fn empty_program_has_no_statements() {
        let mut ast = Ast::new();
        let root = ast.push(NodeKind::Program { stmts: vec![] });
        ast.root = Some(root);
        assert_eq!(ast.program_stmts().len(), 0);
    }

    #[test]
    fn program_stmts_reflects_root() {
        let mut ast = Ast::new();
        let brk = ast.push(NodeKind::Misc {
            kind: MiscKind::Break,
        });
        let root = ast.push(NodeKind::Program { stmts: vec![brk] });
        ast.root = Some(root);
        assert_eq!(ast.program_stmts(), &[brk]);
    }

    #[test]
    fn resolved_type_is_settable() {
        let mut ast = Ast::new();
        let id = ast.push(NodeKind::Misc {
            kind: MiscKind::Continue,
        });
        ast.get_mut(id).resolved_type = Some(TypeId::INT);
        assert_eq!(ast.get(id).resolved_type, Some(TypeId::INT));
    }
}
