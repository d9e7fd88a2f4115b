pub mod ast;
pub mod error;
pub mod expr;
pub mod id;
pub mod token;
pub mod type_id;
pub mod types;

pub use ast::{
    Ast, ElifClause, EnumMember, LengthModifier, MiscKind, Node, NodeKind, Signedness,
    StorageClass, SwitchCase, TypeBase, TypeSpec,
};
pub use error::CoreError;
pub use expr::{BinaryOp, Expr, ExprKind, ExprPool, Literal, LiteralKind, LiteralValue, UnaryOp};
pub use id::{ExprId, NodeId};
pub use token::{parse_token_list, Token, TokenKind, TokenStream, VecTokenStream};
pub use type_id::{TypeId, TypeRegistry};
pub use types::{BuiltinKind, FieldInfo, ResolvedType, TypeKind};
