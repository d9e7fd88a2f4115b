//! PASS 3 -- check semantics (§4.3 PASS 3).
//!
//! Walks the program a third time, entering the same scopes passes 1/2
//! created. For every expression it computes a resolved type, an
//! lvalue-ness flag, and an addressability flag via [`infer_expr_type`],
//! annotating the expression's `inferred_type` as it goes, then runs the
//! compatibility/arity/member/cast checks §4.3 lists.

use owly_core::{
    Ast, BuiltinKind, ExprId, ExprKind, ExprPool, NodeId, NodeKind, ResolvedType, TypeId, TypeKind,
};

use crate::context::SemanticContext;
use crate::diagnostics::{SemaError, SemaWarning};
use crate::scope::SymbolKind;

pub fn pass3(ctx: &mut SemanticContext, ast: &mut Ast, exprs: &mut ExprPool) {
    let stmts = ast.program_stmts().to_vec();
    for stmt in stmts {
        pass3_stmt(ctx, ast, exprs, stmt);
    }
}

/// An expression's pass-3 type info: resolved type, whether it denotes a
/// storage location (`is_lvalue`), and whether `&` may be applied to it
/// (`is_addressable` -- every lvalue this analyzer produces is also
/// addressable, but the two are tracked separately per §4.3 so a future
/// lvalue kind that isn't addressable, e.g. a bitfield, has somewhere to
/// plug in).
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExprInfo {
    pub ty: TypeId,
    pub is_lvalue: bool,
    pub is_addressable: bool,
}

impl ExprInfo {
    fn value(ty: TypeId) -> Self {
        ExprInfo {
            ty,
            is_lvalue: false,
            is_addressable: false,
        }
    }

    fn lvalue(ty: TypeId) -> Self {
        ExprInfo {
            ty,
            is_lvalue: true,
            is_addressable: true,
        }
    }

    fn invalid() -> Self {
        ExprInfo::value(TypeId::INVALID)
    }
}

fn pass3_stmt(ctx: &mut SemanticContext, ast: &mut Ast, exprs: &mut ExprPool, node: NodeId) {
    match ast.get(node).kind.clone() {
        NodeKind::VarDecl { init, name, .. } => {
            let declared = ast.get(node).resolved_type.unwrap_or(TypeId::INVALID);
            if let Some(init) = init {
                let info = infer_expr_type(ctx, ast, exprs, init);
                check_assignable(
                    ctx,
                    declared,
                    info.ty,
                    "variable initializer",
                    Some(&name),
                    None,
                );
            }
        }

        NodeKind::Array {
            init, dimensions, ..
        } => {
            let arr_ty = ast.get(node).resolved_type.unwrap_or(TypeId::INVALID);
            let elem_ty = match ctx.types.get(arr_ty).map(|t| &t.kind) {
                Some(TypeKind::Array { element, .. }) => *element,
                _ => TypeId::INVALID,
            };
            if let Some(init) = init {
                infer_expr_type(ctx, ast, exprs, init);
                match exprs.get(init).kind.clone() {
                    ExprKind::Set { elements } => {
                        let limit = dimensions.first().copied().unwrap_or(0);
                        if elements.len() as u64 > limit {
                            ctx.error(SemaError::TooManyInitializers, Some(node), Some(init));
                        }
                        for &el in &elements {
                            let el_info = infer_expr_type(ctx, ast, exprs, el);
                            if !types_compatible(ctx, elem_ty, el_info.ty) {
                                ctx.error(
                                    SemaError::IncompatibleTypes {
                                        context: "array initializer element".to_string(),
                                    },
                                    Some(node),
                                    Some(el),
                                );
                            }
                        }
                    }
                    _ => {
                        ctx.error(SemaError::InitializerNotASet, Some(node), Some(init));
                    }
                }
            }
        }

        NodeKind::FuncDecl {
            return_ty: _,
            params,
            body,
            ..
        } => {
            let enclosing = ctx.current_scope();
            let prev_return_type = ctx.current_return_type;
            let func_ty = ast.get(node).resolved_type;
            ctx.current_return_type = func_ty.and_then(|id| match ctx.types.get(id).map(|t| &t.kind) {
                Some(TypeKind::Function { return_type, .. }) => Some(*return_type),
                _ => None,
            });

            if let Some(&func_scope) = ctx.scopes_of(node).first() {
                ctx.enter_scope(func_scope);
                for &p in &params {
                    pass3_stmt(ctx, ast, exprs, p);
                }
                for &s in &body {
                    pass3_stmt(ctx, ast, exprs, s);
                }
            }

            ctx.current_return_type = prev_return_type;
            ctx.enter_scope(enclosing);
        }

        NodeKind::Return { value } => {
            let expected = ctx.current_return_type;
            match value {
                Some(v) => {
                    let info = infer_expr_type(ctx, ast, exprs, v);
                    if let Some(expected) = expected {
                        if expected != TypeId::INVALID && !types_compatible(ctx, expected, info.ty) {
                            ctx.error(
                                SemaError::IncompatibleTypes {
                                    context: "return value".to_string(),
                                },
                                Some(node),
                                Some(v),
                            );
                        }
                    }
                }
                None => {
                    // §11: only a non-void *builtin* return type triggers this
                    // check; an unresolved/invalid return type was already
                    // diagnosed in pass 2 and doesn't get a second error here.
                    let is_non_void_builtin = expected
                        .and_then(|id| ctx.types.get(id))
                        .map(|t| matches!(&t.kind, TypeKind::Builtin(b) if *b != BuiltinKind::Void))
                        .unwrap_or(false);
                    if is_non_void_builtin {
                        ctx.error(SemaError::MissingReturnValue, Some(node), None);
                    }
                }
            }
        }

        NodeKind::ExprStmt { expr } => {
            infer_expr_type(ctx, ast, exprs, expr);
        }

        NodeKind::If {
            cond,
            body,
            elifs,
            else_body,
        } => {
            let enclosing = ctx.current_scope();
            infer_expr_type(ctx, ast, exprs, cond);
            let scopes = ctx.scopes_of(node).to_vec();
            let mut idx = 0;

            if let Some(&s) = scopes.get(idx) {
                idx += 1;
                ctx.enter_scope(s);
                for &st in &body {
                    pass3_stmt(ctx, ast, exprs, st);
                }
            }
            for elif in &elifs {
                infer_expr_type(ctx, ast, exprs, elif.cond);
                if let Some(&s) = scopes.get(idx) {
                    idx += 1;
                    ctx.enter_scope(s);
                    for &st in &elif.body {
                        pass3_stmt(ctx, ast, exprs, st);
                    }
                }
            }
            if let Some(else_body) = &else_body {
                if let Some(&s) = scopes.get(idx) {
                    ctx.enter_scope(s);
                    for &st in else_body {
                        pass3_stmt(ctx, ast, exprs, st);
                    }
                }
            }
            ctx.enter_scope(enclosing);
        }

        NodeKind::While { cond, body } | NodeKind::DoWhile { body, cond } => {
            let enclosing = ctx.current_scope();
            infer_expr_type(ctx, ast, exprs, cond);
            if let Some(&s) = ctx.scopes_of(node).first() {
                ctx.enter_scope(s);
                for &st in &body {
                    pass3_stmt(ctx, ast, exprs, st);
                }
            }
            ctx.enter_scope(enclosing);
        }

        NodeKind::For {
            init, cond, inc, body,
        } => {
            let enclosing = ctx.current_scope();
            if let Some(&s) = ctx.scopes_of(node).first() {
                ctx.enter_scope(s);
                if let Some(init) = init {
                    pass3_stmt(ctx, ast, exprs, init);
                }
                if let Some(cond) = cond {
                    infer_expr_type(ctx, ast, exprs, cond);
                }
                for &st in &body {
                    pass3_stmt(ctx, ast, exprs, st);
                }
                if let Some(inc) = inc {
                    infer_expr_type(ctx, ast, exprs, inc);
                }
            }
            ctx.enter_scope(enclosing);
        }

        NodeKind::Switch {
            scrutinee,
            cases,
            default_body,
        } => {
            let enclosing = ctx.current_scope();
            infer_expr_type(ctx, ast, exprs, scrutinee);
            let scopes = ctx.scopes_of(node).to_vec();
            let mut idx = 0;

            if let Some(&outer) = scopes.get(idx) {
                idx += 1;
                ctx.enter_scope(outer);
                for case in &cases {
                    infer_expr_type(ctx, ast, exprs, case.value);
                    if let Some(&s) = scopes.get(idx) {
                        idx += 1;
                        ctx.enter_scope(s);
                        for &st in &case.body {
                            pass3_stmt(ctx, ast, exprs, st);
                        }
                    }
                }
                if let Some(default_body) = &default_body {
                    if let Some(&s) = scopes.get(idx) {
                        ctx.enter_scope(s);
                        for &st in default_body {
                            pass3_stmt(ctx, ast, exprs, st);
                        }
                    }
                }
            }
            ctx.enter_scope(enclosing);
        }

        NodeKind::Program { .. }
        | NodeKind::EnumDecl { .. }
        | NodeKind::StructDecl { .. }
        | NodeKind::UnionDecl { .. }
        | NodeKind::Typedef { .. }
        | NodeKind::TypeNode { .. }
        | NodeKind::Misc { .. } => {}
    }
}

/// Checks that a value of type `from` may initialize/be assigned into a
/// location of type `to`, recording an error on incompatibility or a
/// warning on narrowing. `name` is the variable name for initializer
/// warnings; `arg` is `Some((callee, index))` for call-argument warnings.
fn check_assignable(
    ctx: &mut SemanticContext,
    to: TypeId,
    from: TypeId,
    context: &str,
    name: Option<&str>,
    arg: Option<(&str, usize)>,
) {
    if !types_compatible(ctx, to, from) {
        ctx.error(
            SemaError::IncompatibleTypes {
                context: context.to_string(),
            },
            None,
            None,
        );
        return;
    }
    if is_narrowing_conversion(ctx, from, to) {
        let from_s = describe_type(ctx, from);
        let to_s = describe_type(ctx, to);
        let warning = if let Some((callee, index)) = arg {
            SemaWarning::NarrowingArgument {
                name: callee.to_string(),
                index,
                from: from_s,
                to: to_s,
            }
        } else if let Some(name) = name {
            SemaWarning::NarrowingInitializer {
                name: name.to_string(),
                from: from_s,
                to: to_s,
            }
        } else {
            SemaWarning::NarrowingAssignment { from: from_s, to: to_s }
        };
        ctx.warning(warning, None, None);
    }
}

/// §4.3's type-compatibility relation: identical `TypeId` is always
/// compatible (pointer identity); otherwise compatibility is structural.
pub(crate) fn types_compatible(ctx: &SemanticContext, a: TypeId, b: TypeId) -> bool {
    if a == b {
        return true;
    }
    let (ra, rb) = match (ctx.types.get(a), ctx.types.get(b)) {
        (Some(ra), Some(rb)) => (ra, rb),
        _ => return false,
    };
    match (&ra.kind, &rb.kind) {
        (TypeKind::Builtin(_), TypeKind::Builtin(_)) => true,
        (TypeKind::Builtin(_), TypeKind::Enum { .. }) | (TypeKind::Enum { .. }, TypeKind::Builtin(_)) => true,
        (TypeKind::Pointer { base: ba }, TypeKind::Pointer { base: bb }) => {
            is_void_ptr(ctx, *ba) || is_void_ptr(ctx, *bb) || types_compatible(ctx, *ba, *bb)
        }
        (TypeKind::Struct { .. }, TypeKind::Struct { .. })
        | (TypeKind::Union { .. }, TypeKind::Union { .. })
        | (TypeKind::Enum { .. }, TypeKind::Enum { .. }) => ra.same_declaration(rb),
        (
            TypeKind::Function {
                return_type: ra_ret,
                params: pa,
                ..
            },
            TypeKind::Function {
                return_type: rb_ret,
                params: pb,
                ..
            },
        ) => {
            pa.len() == pb.len()
                && types_compatible(ctx, *ra_ret, *rb_ret)
                && pa.iter().zip(pb).all(|(&x, &y)| types_compatible(ctx, x, y))
        }
        _ => false,
    }
}

fn is_void_ptr(ctx: &SemanticContext, base: TypeId) -> bool {
    matches!(
        ctx.types.get(base).map(|t| &t.kind),
        Some(TypeKind::Builtin(BuiltinKind::Void))
    )
}

/// §4.3's narrowing rule: float→int, or a larger integer into a smaller
/// one. Only meaningful between two builtin scalars.
pub(crate) fn is_narrowing_conversion(ctx: &SemanticContext, from: TypeId, to: TypeId) -> bool {
    let (from_b, to_b) = match (
        ctx.types.get(from).map(|t| &t.kind),
        ctx.types.get(to).map(|t| &t.kind),
    ) {
        (Some(TypeKind::Builtin(f)), Some(TypeKind::Builtin(t))) => (*f, *t),
        _ => return false,
    };
    if from_b.is_floating() && !to_b.is_floating() {
        return true;
    }
    if from_b.is_integer() && to_b.is_integer() && from_b.size() > to_b.size() {
        return true;
    }
    false
}

fn describe_type(ctx: &SemanticContext, id: TypeId) -> String {
    match ctx.types.get(id).map(|t| &t.kind) {
        Some(TypeKind::Invalid) | None => "<invalid>".to_string(),
        Some(TypeKind::Builtin(b)) => format!("{b:?}").to_lowercase(),
        Some(TypeKind::Pointer { base }) => format!("{}*", describe_type(ctx, *base)),
        Some(TypeKind::Array { element, .. }) => format!("{}[]", describe_type(ctx, *element)),
        Some(TypeKind::Struct { name, .. }) => format!("struct {}", name.clone().unwrap_or_default()),
        Some(TypeKind::Union { name, .. }) => format!("union {}", name.clone().unwrap_or_default()),
        Some(TypeKind::Enum { name, .. }) => format!("enum {}", name.clone().unwrap_or_default()),
        Some(TypeKind::Function { .. }) => "function".to_string(),
    }
}

/// §4.3 `infer_expr_type`: computes and caches the resolved type, lvalue-
/// ness, and addressability of `expr`, annotating `exprs` as it recurses.
pub(crate) fn infer_expr_type(
    ctx: &mut SemanticContext,
    ast: &mut Ast,
    exprs: &mut ExprPool,
    expr: ExprId,
) -> ExprInfo {
    let info = infer_expr_type_inner(ctx, ast, exprs, expr);
    exprs.get_mut(expr).inferred_type = Some(info.ty);
    info
}

fn infer_expr_type_inner(
    ctx: &mut SemanticContext,
    ast: &mut Ast,
    exprs: &mut ExprPool,
    expr: ExprId,
) -> ExprInfo {
    match exprs.get(expr).kind.clone() {
        ExprKind::Literal(lit) => ExprInfo::value(match lit.kind {
            owly_core::LiteralKind::Int => TypeId::INT,
            owly_core::LiteralKind::Float => TypeId::DOUBLE,
            owly_core::LiteralKind::Char => TypeId::CHAR,
            owly_core::LiteralKind::Bool => TypeId::BOOL,
            owly_core::LiteralKind::String => ctx.types.wrap_pointers(TypeId::CHAR, 1),
        }),

        ExprKind::Identifier(name) => {
            match ctx.lookup_recursive(ctx.current_scope(), &name) {
                Some(sym_id) => {
                    let sym = ctx.symbol(sym_id);
                    match sym.kind {
                        SymbolKind::Variable => {
                            let ty = sym.resolved_type.unwrap_or(TypeId::INVALID);
                            ExprInfo::lvalue(ty)
                        }
                        SymbolKind::Function => {
                            ExprInfo::value(sym.resolved_type.unwrap_or(TypeId::INVALID))
                        }
                        SymbolKind::EnumMember => {
                            let decl = sym.decl;
                            let ty = ast.get(decl).resolved_type.unwrap_or(TypeId::INVALID);
                            ExprInfo::value(ty)
                        }
                        _ => {
                            ctx.error(SemaError::NotATypeName { name: name.clone() }, None, Some(expr));
                            ExprInfo::invalid()
                        }
                    }
                }
                None => {
                    ctx.error(SemaError::UndefinedIdentifier { name }, None, Some(expr));
                    ExprInfo::invalid()
                }
            }
        }

        ExprKind::Grouping { inner } => infer_expr_type(ctx, ast, exprs, inner),

        ExprKind::Unary { op, operand } => infer_unary(ctx, ast, exprs, op, operand, expr),

        ExprKind::Binary { op, left, right } => infer_binary(ctx, ast, exprs, op, left, right),

        ExprKind::Ternary {
            cond,
            then_expr,
            else_expr,
        } => {
            infer_expr_type(ctx, ast, exprs, cond);
            let then_info = infer_expr_type(ctx, ast, exprs, then_expr);
            let else_info = infer_expr_type(ctx, ast, exprs, else_expr);
            if !types_compatible(ctx, then_info.ty, else_info.ty) {
                ctx.error(
                    SemaError::IncompatibleTypes {
                        context: "ternary branches".to_string(),
                    },
                    None,
                    Some(expr),
                );
            }
            ExprInfo::value(then_info.ty)
        }

        ExprKind::Call { callee, args } => infer_call(ctx, ast, exprs, &callee, &args, expr),

        ExprKind::Member {
            object,
            member,
            is_arrow,
            ..
        } => infer_member(ctx, ast, exprs, object, &member, is_arrow, expr),

        ExprKind::Sizeof {
            type_operand,
            expr_operand,
            ..
        } => infer_sizeof(ctx, ast, exprs, type_operand, expr_operand, expr),

        ExprKind::Cast { target_type, expr: inner } => {
            let target = crate::resolve::resolve_type(ctx, ast, target_type);
            let inner_info = infer_expr_type(ctx, ast, exprs, inner);
            let bad_side = |t: &TypeId| -> bool {
                matches!(
                    ctx.types.get(*t).map(|r| &r.kind),
                    Some(TypeKind::Struct { .. }) | Some(TypeKind::Union { .. }) | Some(TypeKind::Function { .. })
                )
            };
            if bad_side(&target) || bad_side(&inner_info.ty) {
                ctx.error(SemaError::InvalidCast, None, Some(expr));
            }
            ExprInfo::value(target)
        }

        ExprKind::Set { elements } => {
            if elements.is_empty() {
                ctx.error(SemaError::EmptySetLiteral, None, Some(expr));
                return ExprInfo::invalid();
            }
            let first_info = infer_expr_type(ctx, ast, exprs, elements[0]);
            for &el in &elements[1..] {
                let el_info = infer_expr_type(ctx, ast, exprs, el);
                if !types_compatible(ctx, first_info.ty, el_info.ty) {
                    ctx.error(
                        SemaError::IncompatibleTypes {
                            context: "set literal element".to_string(),
                        },
                        None,
                        Some(el),
                    );
                }
            }
            ExprInfo::value(first_info.ty)
        }

        ExprKind::Index { array, index } => infer_index(ctx, ast, exprs, array, index, expr),
    }
}

fn infer_unary(
    ctx: &mut SemanticContext,
    ast: &mut Ast,
    exprs: &mut ExprPool,
    op: owly_core::UnaryOp,
    operand: ExprId,
    expr: ExprId,
) -> ExprInfo {
    use owly_core::UnaryOp::*;
    let info = infer_expr_type(ctx, ast, exprs, operand);
    match op {
        Neg | Plus | BitNot => ExprInfo::value(info.ty),
        Not => ExprInfo::value(TypeId::BOOL),
        Deref => match ctx.types.get(info.ty).map(|t| &t.kind) {
            Some(TypeKind::Pointer { base }) => ExprInfo::lvalue(*base),
            _ => {
                ctx.error(SemaError::NotAPointer, None, Some(expr));
                ExprInfo::invalid()
            }
        },
        AddrOf => {
            if !info.is_addressable {
                ctx.error(SemaError::NotAddressable, None, Some(expr));
                return ExprInfo::invalid();
            }
            ExprInfo::value(ctx.types.wrap_pointers(info.ty, 1))
        }
        PreInc | PreDec | PostInc | PostDec => {
            if !info.is_lvalue {
                ctx.error(SemaError::NotAssignableForIncDec, None, Some(expr));
                return ExprInfo::invalid();
            }
            ExprInfo::value(info.ty)
        }
    }
}

fn infer_binary(
    ctx: &mut SemanticContext,
    ast: &mut Ast,
    exprs: &mut ExprPool,
    op: owly_core::BinaryOp,
    left: ExprId,
    right: ExprId,
) -> ExprInfo {
    use owly_core::BinaryOp::*;

    let left_info = infer_expr_type(ctx, ast, exprs, left);
    let right_info = infer_expr_type(ctx, ast, exprs, right);

    if op.is_assignment() {
        if !left_info.is_lvalue {
            ctx.error(SemaError::NotAnLvalue, None, Some(left));
            return ExprInfo::invalid();
        }
        check_assignable(ctx, left_info.ty, right_info.ty, "assignment", None, None);
        return ExprInfo::value(left_info.ty);
    }

    match op {
        Eq | Ne | Lt | Le | Gt | Ge | And | Or => ExprInfo::value(TypeId::BOOL),
        _ => {
            if !types_compatible(ctx, left_info.ty, right_info.ty) {
                ctx.error(
                    SemaError::IncompatibleTypes {
                        context: "binary operand".to_string(),
                    },
                    None,
                    None,
                );
            }
            let left_is_ptr = matches!(ctx.types.get(left_info.ty).map(|t| &t.kind), Some(TypeKind::Pointer { .. }));
            let right_is_ptr = matches!(ctx.types.get(right_info.ty).map(|t| &t.kind), Some(TypeKind::Pointer { .. }));
            if (op == Add || op == Sub) && (left_is_ptr || right_is_ptr) {
                ExprInfo::value(if left_is_ptr { left_info.ty } else { right_info.ty })
            } else {
                ExprInfo::value(wider_builtin(ctx, left_info.ty, right_info.ty))
            }
        }
    }
}

/// Picks the "wider" of two builtin arithmetic types for a binary result:
/// floating beats integer, and otherwise the larger size wins (ties keep
/// the left operand's type).
fn wider_builtin(ctx: &SemanticContext, a: TypeId, b: TypeId) -> TypeId {
    let (ka, kb) = match (ctx.types.get(a).map(|t| &t.kind), ctx.types.get(b).map(|t| &t.kind)) {
        (Some(TypeKind::Builtin(x)), Some(TypeKind::Builtin(y))) => (*x, *y),
        _ => return a,
    };
    if ka.is_floating() != kb.is_floating() {
        return if ka.is_floating() { a } else { b };
    }
    if kb.size() > ka.size() {
        b
    } else {
        a
    }
}

fn infer_call(
    ctx: &mut SemanticContext,
    ast: &mut Ast,
    exprs: &mut ExprPool,
    callee: &str,
    args: &[ExprId],
    expr: ExprId,
) -> ExprInfo {
    let arg_infos: Vec<ExprInfo> = args.iter().map(|&a| infer_expr_type(ctx, ast, exprs, a)).collect();

    let sym_id = match ctx.lookup_recursive(ctx.current_scope(), callee) {
        Some(s) if ctx.symbol(s).kind == SymbolKind::Function => s,
        _ => {
            ctx.error(
                SemaError::UndefinedFunction {
                    name: callee.to_string(),
                },
                None,
                Some(expr),
            );
            return ExprInfo::invalid();
        }
    };
    let func_ty = ctx.symbol(sym_id).resolved_type.unwrap_or(TypeId::INVALID);
    let (return_type, params) = match ctx.types.get(func_ty).map(|t| &t.kind) {
        Some(TypeKind::Function { return_type, params, .. }) => (*return_type, params.clone()),
        _ => (TypeId::INVALID, Vec::new()),
    };

    if params.len() != args.len() {
        ctx.error(
            SemaError::ArityMismatch {
                name: callee.to_string(),
                expected: params.len(),
                found: args.len(),
            },
            None,
            Some(expr),
        );
        return ExprInfo::value(return_type);
    }

    for (i, (&param_ty, arg_info)) in params.iter().zip(arg_infos.iter()).enumerate() {
        check_assignable(
            ctx,
            param_ty,
            arg_info.ty,
            "call argument",
            None,
            Some((callee, i)),
        );
    }

    ExprInfo::value(return_type)
}

fn infer_member(
    ctx: &mut SemanticContext,
    ast: &mut Ast,
    exprs: &mut ExprPool,
    object: ExprId,
    member: &str,
    is_arrow: bool,
    expr: ExprId,
) -> ExprInfo {
    let object_info = infer_expr_type(ctx, ast, exprs, object);

    let agg_ty = if is_arrow {
        match ctx.types.get(object_info.ty).map(|t| &t.kind) {
            Some(TypeKind::Pointer { base }) => *base,
            _ => {
                ctx.error(SemaError::NotAPointer, None, Some(object));
                return ExprInfo::invalid();
            }
        }
    } else {
        if !object_info.is_lvalue {
            ctx.error(SemaError::NotAnLvalue, None, Some(object));
        }
        object_info.ty
    };

    let fields = match ctx.types.get(agg_ty).map(|t| &t.kind) {
        Some(TypeKind::Struct { fields, .. }) | Some(TypeKind::Union { fields, .. }) => fields.clone(),
        _ => {
            ctx.error(SemaError::NotAStructOrUnion, None, Some(expr));
            return ExprInfo::invalid();
        }
    };

    match fields.iter().find(|f| f.name == member) {
        Some(field) => {
            if let ExprKind::Member { offset, .. } = &mut exprs.get_mut(expr).kind {
                *offset = field.offset;
            }
            ExprInfo::lvalue(field.ty)
        }
        None => {
            ctx.error(
                SemaError::UnknownMember {
                    member: member.to_string(),
                },
                None,
                Some(expr),
            );
            ExprInfo::invalid()
        }
    }
}

fn infer_sizeof(
    ctx: &mut SemanticContext,
    ast: &mut Ast,
    exprs: &mut ExprPool,
    type_operand: Option<NodeId>,
    expr_operand: Option<ExprId>,
    expr: ExprId,
) -> ExprInfo {
    let operand_ty = if let Some(ty_node) = type_operand {
        crate::resolve::resolve_type(ctx, ast, ty_node)
    } else if let Some(e) = expr_operand {
        infer_expr_type(ctx, ast, exprs, e).ty
    } else {
        TypeId::INVALID
    };

    let size = match ctx.types.get(operand_ty) {
        Some(rt) if rt.is_complete() => rt.size(),
        Some(_) => {
            ctx.error(SemaError::IncompleteType, None, Some(expr));
            0
        }
        None => 0,
    };

    if let ExprKind::Sizeof { computed_size, .. } = &mut exprs.get_mut(expr).kind {
        *computed_size = size;
    }
    ExprInfo::value(TypeId::ULONG)
}

fn infer_index(
    ctx: &mut SemanticContext,
    ast: &mut Ast,
    exprs: &mut ExprPool,
    array: ExprId,
    index: ExprId,
    expr: ExprId,
) -> ExprInfo {
    let array_info = infer_expr_type(ctx, ast, exprs, array);
    let index_info = infer_expr_type(ctx, ast, exprs, index);

    if matches!(
        ctx.types.get(index_info.ty).map(|t| t.is_floating()),
        Some(true)
    ) {
        ctx.error(SemaError::NonIntegralIndex, None, Some(index));
    }

    let (element, dimensions, elem_align) = match ctx.types.get(array_info.ty).map(|t| &t.kind) {
        Some(TypeKind::Array {
            element,
            dimensions,
            align,
            ..
        }) => (*element, dimensions.clone(), *align),
        _ => {
            ctx.error(SemaError::NotAnArray, None, Some(array));
            return ExprInfo::invalid();
        }
    };

    if dimensions.len() <= 1 {
        return ExprInfo::lvalue(element);
    }

    let rest = dimensions[1..].to_vec();
    let total: u64 = rest.iter().product();
    let elem_size = ctx.types.get(element).map(|t| t.size()).unwrap_or(0);
    let sub = ResolvedType::unqualified(TypeKind::Array {
        element,
        dimensions: rest,
        total_elements: total,
        size: elem_size * total,
        align: elem_align,
    });
    ExprInfo::lvalue(ctx.types.register(sub))
}
