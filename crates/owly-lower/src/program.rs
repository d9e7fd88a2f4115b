//! Top-level lowering entry point (§4.5 "Program top-level"): each
//! top-level variable declaration becomes a module global, each
//! non-prototype function declaration becomes an [`IRFunction`].

use owly_core::{Ast, ExprPool, NodeId, NodeKind, TypeId};
use owly_ir::{IRFunction, IRModule, IRValue};
use owly_sema::SemanticContext;
use tracing::{debug, instrument};

use crate::context::FunctionLowerer;
use crate::error::LowerError;

/// Lowers an already-analyzed program into an [`IRModule`].
///
/// Returns [`LowerError::UnresolvedSemanticErrors`] rather than lowering a
/// program pass 3 rejected; lowering never re-checks what semantic
/// analysis already decided (§4.5's precondition that analysis ran first).
#[instrument(skip_all, fields(source_file))]
pub fn lower_program(
    ast: &Ast,
    exprs: &ExprPool,
    sema: &SemanticContext,
    source_file: impl Into<String>,
) -> Result<IRModule, LowerError> {
    if sema.has_errors() {
        return Err(LowerError::UnresolvedSemanticErrors {
            error_count: sema.error_count,
        });
    }

    let mut module = IRModule::new(source_file.into());
    debug!(count = ast.program_stmts().len(), "lowering top-level statements");

    for &id in ast.program_stmts() {
        let node = ast.get(id);
        match &node.kind {
            NodeKind::VarDecl { name, .. } => {
                let global = IRValue::global(name.clone(), node.resolved_type);
                module.add_global(global);
            }
            NodeKind::FuncDecl {
                return_ty,
                name,
                params,
                is_prototype,
                body,
            } => {
                if *is_prototype {
                    continue;
                }
                lower_function(ast, exprs, sema, &mut module, *return_ty, name, params, body)?;
            }
            NodeKind::EnumDecl { .. }
            | NodeKind::StructDecl { .. }
            | NodeKind::UnionDecl { .. }
            | NodeKind::Typedef { .. }
            | NodeKind::TypeNode { .. } => {}
            other => {
                return Err(LowerError::Internal(format!(
                    "unexpected top-level node kind {other:?}"
                )));
            }
        }
    }

    Ok(module)
}

#[instrument(skip_all, fields(name))]
fn lower_function(
    ast: &Ast,
    exprs: &ExprPool,
    sema: &SemanticContext,
    module: &mut IRModule,
    return_ty_node: NodeId,
    name: &str,
    params: &[NodeId],
    body: &[NodeId],
) -> Result<(), LowerError> {
    let return_type = ast.get(return_ty_node).resolved_type.unwrap_or(TypeId::VOID);

    let mut param_types = Vec::with_capacity(params.len());
    for &p in params {
        let pnode = ast.get(p);
        let pname = match &pnode.kind {
            NodeKind::VarDecl { name, .. } => name.clone(),
            other => {
                return Err(LowerError::Internal(format!(
                    "function parameter is not a VarDecl node: {other:?}"
                )));
            }
        };
        let pty = pnode.resolved_type.unwrap_or(TypeId::INVALID);
        param_types.push((pname, pty));
    }

    let func = IRFunction::new(name, return_type, param_types.clone());
    let mut lowerer = FunctionLowerer::new(ast, exprs, sema, module, func);
    let entry = lowerer.func.entry;

    // Parameters arrive as the function's first SSA values by calling
    // convention; each gets spilled to a stack slot so the body can take
    // its address and assign through it like any other local.
    for (pname, pty) in &param_types {
        let param_val = lowerer.func.create_temp(Some(*pty));
        let rt = lowerer.resolved(*pty)?;
        let (size, align) = (rt.size(), rt.align());
        let ptr = lowerer.func.emit_alloca(entry, Some(*pty), size, align);
        lowerer.func.emit_store(entry, param_val, ptr.clone());
        lowerer.func.bind_var(pname.clone(), ptr);
    }

    for &stmt in body {
        lowerer.lower_stmt(stmt)?;
    }
    if !lowerer.is_current_block_terminated() {
        let end = lowerer.cur_block;
        lowerer.func.emit_return(end, None);
    }

    debug!(blocks = lowerer.func.blocks.len(), "function lowered");
    module.add_function(lowerer.func);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use owly_core::ExprKind;

    fn int_literal(exprs: &mut ExprPool, value: i64) -> owly_core::ExprId {
        exprs.push(ExprKind::Literal(owly_core::Literal {
            kind: owly_core::LiteralKind::Int,
            raw: value.to_string(),
            value: owly_core::LiteralValue::Int(value),
        }))
    }

    fn int_type_node(ast: &mut Ast) -> NodeId {
        let ty = ast.push(NodeKind::TypeNode {
            spec: owly_core::TypeSpec::default(),
            base: owly_core::TypeBase::Name("int".into()),
        });
        ast.get_mut(ty).resolved_type = Some(TypeId::INT);
        ty
    }

    fn empty_ast_with_main() -> (Ast, ExprPool) {
        let mut ast = Ast::new();
        let mut exprs = ExprPool::new();
        let ret_ty = int_type_node(&mut ast);
        let ret_expr = int_literal(&mut exprs, 0);
        exprs.get_mut(ret_expr).inferred_type = Some(TypeId::INT);
        let ret_stmt = ast.push(NodeKind::Return { value: Some(ret_expr) });
        let func = ast.push(NodeKind::FuncDecl {
            return_ty: ret_ty,
            name: "main".into(),
            params: Vec::new(),
            is_prototype: false,
            body: vec![ret_stmt],
        });
        let program = ast.push(NodeKind::Program { stmts: vec![func] });
        ast.root = Some(program);
        (ast, exprs)
    }

    #[test]
    fn prototype_only_function_is_skipped() {
        let mut ast = Ast::new();
        let exprs = ExprPool::new();
        let ret_ty = int_type_node(&mut ast);
        let func = ast.push(NodeKind::FuncDecl {
            return_ty: ret_ty,
            name: "decl_only".into(),
            params: Vec::new(),
            is_prototype: true,
            body: Vec::new(),
        });
        let program = ast.push(NodeKind::Program { stmts: vec![func] });
        ast.root = Some(program);

        let sema = SemanticContext::default();
        let module = lower_program(&ast, &exprs, &sema, "t.owly").unwrap();
        assert!(module.function("decl_only").is_none());
    }

    #[test]
    fn function_with_terminated_body_lowers_one_function() {
        let (ast, exprs) = empty_ast_with_main();
        let sema = SemanticContext::default();
        let module = lower_program(&ast, &exprs, &sema, "t.owly").unwrap();
        let f = module.function("main").expect("main lowered");
        assert!(f.block(f.entry).is_terminated());
    }

    #[test]
    fn unresolved_semantic_errors_reject_lowering() {
        let ast = Ast::new();
        let exprs = ExprPool::new();
        let mut sema = SemanticContext::default();
        sema.error_count = 2;
        let err = lower_program(&ast, &exprs, &sema, "t.owly").unwrap_err();
        assert_eq!(err, LowerError::UnresolvedSemanticErrors { error_count: 2 });
    }
}
