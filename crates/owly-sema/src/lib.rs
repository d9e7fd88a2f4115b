//! Semantic analyzer: three-pass symbol collection, type resolution, and
//! semantic checking over an `owly-parser` AST (§4.3).
//!
//! ```ignore
//! let (ast, exprs) = owly_parser::parse(tokens)?;
//! let mut ast = ast;
//! let mut exprs = exprs;
//! let ctx = owly_sema::analyze(&mut ast, &mut exprs);
//! if ctx.has_errors() {
//!     // diagnostics are in ctx.diagnostics
//! }
//! ```

pub mod check;
pub mod common;
pub mod context;
pub mod diagnostics;
pub mod pass1;
pub mod resolve;
pub mod scope;

pub use context::SemanticContext;
pub use diagnostics::{Diagnostic, SemaError, SemaWarning, Severity};
pub use scope::{Scope, ScopeId, ScopeKind, Symbol, SymbolId, SymbolKind};

use owly_core::{Ast, ExprPool};

/// Runs pass 1 (collect), pass 2 (resolve), and pass 3 (check) over
/// `ast`/`exprs` in order, returning the populated [`SemanticContext`].
/// Diagnostics accumulate on `ctx.diagnostics`; check `ctx.has_errors()`
/// before trusting the annotated types for lowering (§7).
pub fn analyze(ast: &mut Ast, exprs: &mut ExprPool) -> SemanticContext {
    let mut ctx = SemanticContext::new();
    pass1::pass1(&mut ctx, ast);
    resolve::pass2(&mut ctx, ast);
    check::pass3(&mut ctx, ast, exprs);
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;
    use owly_core::{ExprKind, Literal, LiteralKind, LiteralValue, NodeKind, Signedness, TypeBase, TypeSpec};

    fn int_type_node(ast: &mut Ast) -> owly_core::NodeId {
        ast.push(NodeKind::TypeNode {
            spec: TypeSpec::new(),
            base: TypeBase::Name("int".to_string()),
        })
    }

    #[test]
    fn trivial_function_resolves_return_type() {
        let mut ast = Ast::new();
        let mut exprs = ExprPool::new();

        let ret_ty = int_type_node(&mut ast);
        let lit = exprs.push(ExprKind::Literal(Literal {
            kind: LiteralKind::Int,
            raw: "42".to_string(),
            value: LiteralValue::Int(42),
        }));
        let ret_stmt = ast.push(NodeKind::Return { value: Some(lit) });
        let func = ast.push(NodeKind::FuncDecl {
            return_ty: ret_ty,
            name: "main".to_string(),
            params: vec![],
            is_prototype: false,
            body: vec![ret_stmt],
        });
        let root = ast.push(NodeKind::Program { stmts: vec![func] });
        ast.root = Some(root);

        let ctx = analyze(&mut ast, &mut exprs);
        assert!(!ctx.has_errors(), "diagnostics: {:?}", ctx.diagnostics);

        let sym = ctx
            .lookup_recursive(ctx.global_scope(), "main")
            .expect("main symbol");
        let func_ty = ctx.symbol(sym).resolved_type.expect("resolved function type");
        match &ctx.types.get(func_ty).unwrap().kind {
            owly_core::TypeKind::Function { return_type, .. } => {
                assert_eq!(*return_type, owly_core::TypeId::INT);
            }
            other => panic!("expected function type, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_variable_in_same_scope_is_one_error() {
        let mut ast = Ast::new();
        let mut exprs = ExprPool::new();

        let ty1 = int_type_node(&mut ast);
        let ty2 = int_type_node(&mut ast);
        let v1 = ast.push(NodeKind::VarDecl {
            ty: ty1,
            name: "x".to_string(),
            init: None,
        });
        let v2 = ast.push(NodeKind::VarDecl {
            ty: ty2,
            name: "x".to_string(),
            init: None,
        });
        let root = ast.push(NodeKind::Program { stmts: vec![v1, v2] });
        ast.root = Some(root);

        let ctx = analyze(&mut ast, &mut exprs);
        assert_eq!(ctx.error_count, 1);
        assert_eq!(ctx.scope(ctx.global_scope()).symbols.len(), 1);
    }

    #[test]
    fn narrowing_initializer_is_a_warning_not_an_error() {
        let mut ast = Ast::new();
        let mut exprs = ExprPool::new();

        let ty = int_type_node(&mut ast);
        let lit = exprs.push(ExprKind::Literal(Literal {
            kind: LiteralKind::Float,
            raw: "3.5".to_string(),
            value: LiteralValue::Float(3.5),
        }));
        let v = ast.push(NodeKind::VarDecl {
            ty,
            name: "x".to_string(),
            init: Some(lit),
        });
        let root = ast.push(NodeKind::Program { stmts: vec![v] });
        ast.root = Some(root);

        let ctx = analyze(&mut ast, &mut exprs);
        assert_eq!(ctx.error_count, 0);
        assert_eq!(ctx.warning_count, 1);
        assert!(matches!(
            ctx.diagnostics[0].severity,
            Severity::Warning
        ));
    }

    #[test]
    fn unsigned_spec_resolves_to_unsigned_builtin() {
        let mut ast = Ast::new();
        let mut exprs = ExprPool::new();

        let mut spec = TypeSpec::new();
        spec.sign = Some(Signedness::Unsigned);
        let ty = ast.push(NodeKind::TypeNode {
            spec,
            base: TypeBase::Name("int".to_string()),
        });
        let v = ast.push(NodeKind::VarDecl {
            ty,
            name: "u".to_string(),
            init: None,
        });
        let root = ast.push(NodeKind::Program { stmts: vec![v] });
        ast.root = Some(root);

        let ctx = analyze(&mut ast, &mut exprs);
        assert!(!ctx.has_errors());
        let sym = ctx.lookup_recursive(ctx.global_scope(), "u").unwrap();
        assert_eq!(ctx.symbol(sym).resolved_type, Some(owly_core::TypeId::UINT));
    }
}
