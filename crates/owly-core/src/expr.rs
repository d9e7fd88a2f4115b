//! The expression arena (§3 "Expressions").
//!
//! Mirrors [`crate::ast::Ast`]: an arena of [`Expr`]s addressed by
//! [`ExprId`], each carrying the `inferred_type` attached during pass 3.

use serde::{Deserialize, Serialize};

use crate::id::{ExprId, NodeId};
use crate::type_id::TypeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiteralKind {
    Int,
    Float,
    Char,
    String,
    Bool,
}

/// A literal's parsed value, kept alongside its `raw` source text. Integer
/// suffixes (`u`/`l`/`ll`/`f`) are preserved in `raw` but never influence
/// `kind` or the inferred type (§11 of SPEC_FULL.md / §9 Open Question 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Literal {
    pub kind: LiteralKind,
    pub raw: String,
    pub value: LiteralValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LiteralValue {
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
    Bool(bool),
}

/// Unary operator spelling; `order` distinguishes prefix (`++x`) from
/// postfix (`x++`) for the increment/decrement operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    Deref,
    AddrOf,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
}

impl BinaryOp {
    /// Compound assignment operators desugar to `load, compute, store`
    /// during lowering (§4.5); this returns the arithmetic/bitwise
    /// operator each one desugars to.
    pub fn underlying_op(self) -> Option<BinaryOp> {
        use BinaryOp::*;
        match self {
            AddAssign => Some(Add),
            SubAssign => Some(Sub),
            MulAssign => Some(Mul),
            DivAssign => Some(Div),
            ModAssign => Some(Mod),
            AndAssign => Some(BitAnd),
            OrAssign => Some(BitOr),
            XorAssign => Some(BitXor),
            ShlAssign => Some(Shl),
            ShrAssign => Some(Shr),
            _ => None,
        }
    }

    pub fn is_assignment(self) -> bool {
        use BinaryOp::*;
        matches!(
            self,
            Assign
                | AddAssign
                | SubAssign
                | MulAssign
                | DivAssign
                | ModAssign
                | AndAssign
                | OrAssign
                | XorAssign
                | ShlAssign
                | ShrAssign
        )
    }
}

/// One tagged expression variant (§3 "Expressions").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExprKind {
    Literal(Literal),
    Identifier(String),
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Grouping {
        inner: ExprId,
    },
    Call {
        callee: String,
        args: Vec<ExprId>,
    },
    Ternary {
        cond: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
    },
    Member {
        object: ExprId,
        member: String,
        is_arrow: bool,
        /// Byte offset of `member`, computed during pass 3.
        offset: u64,
    },
    Sizeof {
        /// Exactly one of `type_operand`/`expr_operand` is set.
        type_operand: Option<NodeId>,
        expr_operand: Option<ExprId>,
        /// Computed during pass 3; `0` until then.
        computed_size: u64,
    },
    Cast {
        target_type: NodeId,
        expr: ExprId,
    },
    /// Brace-enclosed element list, also used as an array initializer.
    Set {
        elements: Vec<ExprId>,
    },
    Index {
        array: ExprId,
        index: ExprId,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub inferred_type: Option<TypeId>,
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Expr {
            kind,
            inferred_type: None,
        }
    }
}

/// Arena of expressions, addressed by [`ExprId`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExprPool {
    exprs: Vec<Expr>,
}

impl ExprPool {
    pub fn new() -> Self {
        ExprPool { exprs: Vec::new() }
    }

    pub fn push(&mut self, kind: ExprKind) -> ExprId {
        let id = ExprId(self.exprs.len() as u32);
        self.exprs.push(Expr::new(kind));
        id
    }

    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: ExprId) -> &mut Expr {
        &mut self.exprs[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}

impl Default for ExprPool {
    fn default() -> Self {
        ExprPool::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_get_roundtrip() {
        let mut pool = ExprPool::new();
        let id = pool.push(ExprKind::Identifier("x".into()));
        assert!(matches!(&pool.get(id).kind, ExprKind::Identifier(n) if n == "x"));
        assert!(pool.get(id).inferred_type.is_none());
    }

    #[test]
    fn compound_assign_underlying_op() {
        assert_eq!(BinaryOp::AddAssign.underlying_op(), Some(BinaryOp::Add));
        assert_eq!(BinaryOp::Add.underlying_op(), None);
    }

    #[test]
    fn is_assignment_detection() {
        assert!(BinaryOp::Assign.is_assignment());
        assert!(BinaryOp::ShlAssign.is_assignment());
        assert!(!BinaryOp::Add.is_assignment());
    }

    #[test]
    fn member_offset_defaults_zero() {
        let mut pool = ExprPool::new();
        let obj = pool.push(ExprKind::Identifier("p".into()));
        let id = pool.push(ExprKind::Member {
            object: obj,
            member: "x".into(),
            is_arrow: false,
            offset: 0,
        });
        match &pool.get(id).kind {
            ExprKind::Member { offset, .. } => assert_eq!(*offset, 0),
            _ => panic!("expected member"),
        }
    }
}
