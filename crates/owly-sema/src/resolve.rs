//! PASS 2 -- resolve types (§4.2 "Type registry and resolver", §4.3 PASS 2).
//!
//! Walks the program a second time, entering the same scopes pass 1
//! created (via [`SemanticContext::scopes_of`], see `context.rs`). For each
//! variable, function,
//! typedef, struct, union, enum, or array declaration it computes the
//! resolved type and attaches it to both the declaration node and the
//! matching symbol; struct/union/array layout is computed here, at
//! resolution time.

use owly_core::{
    Ast, FieldInfo, NodeId, NodeKind, ResolvedType, Signedness, TypeBase, TypeId, TypeKind,
    TypeSpec,
};

use crate::common::align_up;
use crate::context::SemanticContext;
use crate::diagnostics::SemaError;
use crate::scope::{ScopeKind, SymbolKind};

pub fn pass2(ctx: &mut SemanticContext, ast: &mut Ast) {
    let stmts = ast.program_stmts().to_vec();
    for stmt in stmts {
        pass2_stmt(ctx, ast, stmt);
    }
}

fn pass2_stmt(ctx: &mut SemanticContext, ast: &mut Ast, node: NodeId) {
    match ast.get(node).kind.clone() {
        NodeKind::VarDecl { .. } => {
            resolve_var_type(ctx, ast, node);
        }

        NodeKind::Array { .. } => {
            resolve_array(ctx, ast, node);
        }

        NodeKind::FuncDecl { params, body, .. } => {
            let enclosing = ctx.current_scope();
            if let Some(&func_scope) = ctx.scopes_of(node).first() {
                ctx.enter_scope(func_scope);
                for &p in &params {
                    pass2_stmt(ctx, ast, p);
                }
                resolve_func_type(ctx, ast, node);
                for &s in &body {
                    pass2_stmt(ctx, ast, s);
                }
            }
            ctx.enter_scope(enclosing);
        }

        NodeKind::Typedef { .. } => {
            resolve_typedef(ctx, ast, node);
        }

        NodeKind::EnumDecl { .. } => {
            resolve_enum(ctx, ast, node);
        }

        NodeKind::StructDecl { .. } => {
            resolve_struct(ctx, ast, node);
        }

        NodeKind::UnionDecl { .. } => {
            resolve_union(ctx, ast, node);
        }

        NodeKind::If {
            body,
            elifs,
            else_body,
            ..
        } => {
            let enclosing = ctx.current_scope();
            let scopes = ctx.scopes_of(node).to_vec();
            let mut idx = 0;

            if let Some(&s) = scopes.get(idx) {
                idx += 1;
                ctx.enter_scope(s);
                for &st in &body {
                    pass2_stmt(ctx, ast, st);
                }
            }
            for elif in &elifs {
                if let Some(&s) = scopes.get(idx) {
                    idx += 1;
                    ctx.enter_scope(s);
                    for &st in &elif.body {
                        pass2_stmt(ctx, ast, st);
                    }
                }
            }
            if let Some(else_body) = &else_body {
                if let Some(&s) = scopes.get(idx) {
                    ctx.enter_scope(s);
                    for &st in else_body {
                        pass2_stmt(ctx, ast, st);
                    }
                }
            }
            ctx.enter_scope(enclosing);
        }

        NodeKind::While { body, .. } | NodeKind::DoWhile { body, .. } => {
            let enclosing = ctx.current_scope();
            if let Some(&s) = ctx.scopes_of(node).first() {
                ctx.enter_scope(s);
                for &st in &body {
                    pass2_stmt(ctx, ast, st);
                }
            }
            ctx.enter_scope(enclosing);
        }

        NodeKind::For { init, body, .. } => {
            let enclosing = ctx.current_scope();
            if let Some(&s) = ctx.scopes_of(node).first() {
                ctx.enter_scope(s);
                if let Some(init) = init {
                    pass2_stmt(ctx, ast, init);
                }
                for &st in &body {
                    pass2_stmt(ctx, ast, st);
                }
            }
            ctx.enter_scope(enclosing);
        }

        NodeKind::Switch {
            cases,
            default_body,
            ..
        } => {
            let enclosing = ctx.current_scope();
            let scopes = ctx.scopes_of(node).to_vec();
            let mut idx = 0;

            if let Some(&outer) = scopes.get(idx) {
                idx += 1;
                ctx.enter_scope(outer);
                for case in &cases {
                    if let Some(&s) = scopes.get(idx) {
                        idx += 1;
                        ctx.enter_scope(s);
                        for &st in &case.body {
                            pass2_stmt(ctx, ast, st);
                        }
                    }
                }
                if let Some(default_body) = &default_body {
                    if let Some(&s) = scopes.get(idx) {
                        ctx.enter_scope(s);
                        for &st in default_body {
                            pass2_stmt(ctx, ast, st);
                        }
                    }
                }
            }
            ctx.enter_scope(enclosing);
        }

        NodeKind::Program { .. }
        | NodeKind::Return { .. }
        | NodeKind::ExprStmt { .. }
        | NodeKind::TypeNode { .. }
        | NodeKind::Misc { .. } => {}
    }
}

/// §4.2 `resolve_type`: materialize a base type, wrap it in `pointer_depth`
/// levels of pointer, then OR the declaration's const/volatile qualifiers
/// onto the outermost result.
pub(crate) fn resolve_type(ctx: &mut SemanticContext, ast: &mut Ast, type_node: NodeId) -> TypeId {
    let (spec, base) = match &ast.get(type_node).kind {
        NodeKind::TypeNode { spec, base } => (spec.clone(), base.clone()),
        _ => {
            ctx.error(
                SemaError::Internal("expected a type node".to_string()),
                Some(type_node),
                None,
            );
            return TypeId::INVALID;
        }
    };

    let base_id = match base {
        TypeBase::Decl(decl) => match &ast.get(decl).kind {
            NodeKind::StructDecl { .. } => resolve_struct(ctx, ast, decl),
            NodeKind::EnumDecl { .. } => resolve_enum(ctx, ast, decl),
            NodeKind::UnionDecl { .. } => resolve_union(ctx, ast, decl),
            _ => {
                ctx.error(
                    SemaError::Internal("invalid type declaration".to_string()),
                    Some(decl),
                    None,
                );
                TypeId::INVALID
            }
        },
        TypeBase::Name(name) => resolve_named_or_builtin(ctx, ast, &name, &spec),
    };

    let result = ctx.types.wrap_pointers(base_id, spec.pointer_depth);
    if spec.is_const || spec.is_volatile {
        if let Some(t) = ctx.types.get_mut(result) {
            t.is_const |= spec.is_const;
            t.is_volatile |= spec.is_volatile;
        }
    }
    result
}

/// Looks `name` up in the scope chain: a typedef/struct/union/enum
/// duplicates its canonical resolved type (§4.2 step 1, §5's "resolving a
/// name duplicates that type"); anything else is treated as a builtin.
fn resolve_named_or_builtin(
    ctx: &mut SemanticContext,
    ast: &mut Ast,
    name: &str,
    spec: &TypeSpec,
) -> TypeId {
    if let Some(sym_id) = ctx.lookup_recursive(ctx.current_scope(), name) {
        let kind = ctx.symbol(sym_id).kind;
        let decl = ctx.symbol(sym_id).decl;
        // Each resolver is idempotent (returns the cached `TypeId` on a
        // repeat call), so a forward reference -- a typedef naming a struct
        // declared later in the same scope -- resolves the same way a
        // reference to an already-visited declaration does.
        let canonical = match kind {
            SymbolKind::Typedef => resolve_typedef(ctx, ast, decl),
            SymbolKind::Struct => resolve_struct(ctx, ast, decl),
            SymbolKind::Union => resolve_union(ctx, ast, decl),
            SymbolKind::Enum => resolve_enum(ctx, ast, decl),
            _ => {
                ctx.error(
                    SemaError::NotATypeName {
                        name: name.to_string(),
                    },
                    None,
                    None,
                );
                return TypeId::INVALID;
            }
        };
        ctx.types.duplicate(canonical).unwrap_or(TypeId::INVALID)
    } else {
        resolve_builtin(ctx, name, spec)
    }
}

pub(crate) fn resolve_var_type(ctx: &mut SemanticContext, ast: &mut Ast, node: NodeId) -> TypeId {
    let (ty_node, name) = match &ast.get(node).kind {
        NodeKind::VarDecl { ty, name, .. } => (*ty, name.clone()),
        _ => return TypeId::INVALID,
    };
    let sym_id = match ctx.lookup_recursive(ctx.current_scope(), &name) {
        Some(s) => s,
        None => {
            ctx.error(
                SemaError::VariableNotFound { name },
                Some(node),
                None,
            );
            return TypeId::INVALID;
        }
    };
    let rt = resolve_type(ctx, ast, ty_node);
    ast.get_mut(node).resolved_type = Some(rt);
    ctx.symbol_mut(sym_id).resolved_type = Some(rt);
    rt
}

pub(crate) fn resolve_func_type(ctx: &mut SemanticContext, ast: &mut Ast, node: NodeId) -> TypeId {
    let (return_ty, name, params) = match &ast.get(node).kind {
        NodeKind::FuncDecl {
            return_ty,
            name,
            params,
            ..
        } => (*return_ty, name.clone(), params.clone()),
        _ => return TypeId::INVALID,
    };

    let return_type = resolve_type(ctx, ast, return_ty);
    let param_types: Vec<TypeId> = params
        .iter()
        .map(|&p| ast.get(p).resolved_type.unwrap_or(TypeId::INVALID))
        .collect();

    let func_rt = ResolvedType::unqualified(TypeKind::Function {
        return_type,
        params: param_types,
        is_variadic: false,
    });
    let id = ctx.types.register(func_rt);

    if let Some(sym) = ctx.lookup_recursive(ctx.current_scope(), &name) {
        ctx.symbol_mut(sym).resolved_type = Some(id);
    } else {
        ctx.error(
            SemaError::Internal(format!("function '{name}' not found in current scope")),
            Some(node),
            None,
        );
    }
    ast.get_mut(node).resolved_type = Some(id);
    id
}

pub(crate) fn resolve_typedef(ctx: &mut SemanticContext, ast: &mut Ast, node: NodeId) -> TypeId {
    let (name, underlying) = match &ast.get(node).kind {
        NodeKind::Typedef { name, underlying } => (name.clone(), *underlying),
        _ => return TypeId::INVALID,
    };
    let sym_id = match ctx.lookup_recursive(ctx.current_scope(), &name) {
        Some(s) => s,
        None => {
            ctx.error(
                SemaError::Internal(format!("typedef '{name}' not found in current scope")),
                Some(node),
                None,
            );
            return TypeId::INVALID;
        }
    };
    if let Some(existing) = ctx.symbol(sym_id).resolved_type {
        return existing;
    }

    let rt = match &ast.get(underlying).kind {
        NodeKind::StructDecl { .. } => resolve_struct(ctx, ast, underlying),
        NodeKind::UnionDecl { .. } => resolve_union(ctx, ast, underlying),
        NodeKind::EnumDecl { .. } => resolve_enum(ctx, ast, underlying),
        NodeKind::TypeNode { .. } => resolve_type(ctx, ast, underlying),
        _ => {
            ctx.error(
                SemaError::Internal("invalid typedef structure".to_string()),
                Some(node),
                None,
            );
            TypeId::INVALID
        }
    };
    ctx.symbol_mut(sym_id).resolved_type = Some(rt);
    ast.get_mut(node).resolved_type = Some(rt);
    rt
}

/// §4.2 enum base type: always a 4-byte signed integer.
pub(crate) fn resolve_enum(ctx: &mut SemanticContext, ast: &mut Ast, node: NodeId) -> TypeId {
    let tag = match &ast.get(node).kind {
        NodeKind::EnumDecl { tag, .. } => tag.clone().unwrap_or_else(|| format!("<anon@{}>", node.0)),
        _ => return TypeId::INVALID,
    };
    let sym_id = match ctx.lookup_recursive(ctx.current_scope(), &tag) {
        Some(s) => s,
        None => {
            ctx.error(
                SemaError::Internal(format!("enum '{tag}' not found in current scope")),
                Some(node),
                None,
            );
            return TypeId::INVALID;
        }
    };
    if let Some(existing) = ctx.symbol(sym_id).resolved_type {
        return existing;
    }
    if ctx
        .find_child_scope(ctx.symbol(sym_id).scope, ScopeKind::Enum, &tag)
        .is_none()
    {
        ctx.error(
            SemaError::Internal("enum scope not found".to_string()),
            Some(node),
            None,
        );
        return TypeId::INVALID;
    }

    let rt = ResolvedType::unqualified(TypeKind::Enum {
        name: Some(tag),
        decl: Some(node),
        base: TypeId::INT,
    });
    let id = ctx.types.register(rt);
    ctx.symbol_mut(sym_id).resolved_type = Some(id);
    ast.get_mut(node).resolved_type = Some(id);
    id
}

/// §4.2 struct layout rule / P4: offsets align up to each member's
/// alignment in declaration order; final size aligns up to the struct's
/// own alignment (the max member alignment). A zero-member struct lands
/// on size 0, align 1 with no special case, since `align_up(0, 1) == 0`.
pub(crate) fn resolve_struct(ctx: &mut SemanticContext, ast: &mut Ast, node: NodeId) -> TypeId {
    let (tag, members) = match &ast.get(node).kind {
        NodeKind::StructDecl { tag, members } => {
            (tag.clone().unwrap_or_else(|| format!("<anon@{}>", node.0)), members.clone())
        }
        _ => return TypeId::INVALID,
    };
    let sym_id = match ctx.lookup_recursive(ctx.current_scope(), &tag) {
        Some(s) => s,
        None => {
            ctx.error(
                SemaError::Internal(format!("struct '{tag}' not found in current scope")),
                Some(node),
                None,
            );
            return TypeId::INVALID;
        }
    };
    if let Some(existing) = ctx.symbol(sym_id).resolved_type {
        return existing;
    }
    let struct_scope = match ctx.find_child_scope(ctx.symbol(sym_id).scope, ScopeKind::Struct, &tag) {
        Some(s) => s,
        None => {
            ctx.error(
                SemaError::Internal("struct scope not found".to_string()),
                Some(node),
                None,
            );
            return TypeId::INVALID;
        }
    };

    let enclosing = ctx.current_scope();
    ctx.enter_scope(struct_scope);

    let mut fields = Vec::with_capacity(members.len());
    let mut offset: u64 = 0;
    let mut max_align: u64 = 1;
    for &member in &members {
        let (ty_node, mname) = match &ast.get(member).kind {
            NodeKind::VarDecl { ty, name, .. } => (*ty, name.clone()),
            _ => continue,
        };
        let mt = resolve_type(ctx, ast, ty_node);
        ast.get_mut(member).resolved_type = Some(mt);
        if let Some(sid) = ctx.lookup_in(struct_scope, &mname) {
            ctx.symbol_mut(sid).resolved_type = Some(mt);
        }
        let (msize, malign) = ctx
            .types
            .get(mt)
            .map(|t| (t.size(), t.align()))
            .unwrap_or((0, 1));
        max_align = max_align.max(malign);
        offset = align_up(offset, malign);
        fields.push(FieldInfo {
            name: mname,
            ty: mt,
            offset,
        });
        offset += msize;
    }
    ctx.enter_scope(enclosing);

    let size = align_up(offset, max_align);
    let rt = ResolvedType::unqualified(TypeKind::Struct {
        name: Some(tag),
        decl: Some(node),
        fields,
        size,
        align: max_align,
        complete: true,
    });
    let id = ctx.types.register(rt);
    ctx.symbol_mut(sym_id).resolved_type = Some(id);
    ast.get_mut(node).resolved_type = Some(id);
    id
}

/// §4.2 union layout rule / P5: size is the max member size, alignment the
/// max member alignment (floor 1).
pub(crate) fn resolve_union(ctx: &mut SemanticContext, ast: &mut Ast, node: NodeId) -> TypeId {
    let (tag, members) = match &ast.get(node).kind {
        NodeKind::UnionDecl { tag, members } => {
            (tag.clone().unwrap_or_else(|| format!("<anon@{}>", node.0)), members.clone())
        }
        _ => return TypeId::INVALID,
    };
    let sym_id = match ctx.lookup_recursive(ctx.current_scope(), &tag) {
        Some(s) => s,
        None => {
            ctx.error(
                SemaError::Internal(format!("union '{tag}' not found in current scope")),
                Some(node),
                None,
            );
            return TypeId::INVALID;
        }
    };
    if let Some(existing) = ctx.symbol(sym_id).resolved_type {
        return existing;
    }
    let union_scope = ctx.find_child_scope(ctx.symbol(sym_id).scope, ScopeKind::Union, &tag);

    let enclosing = ctx.current_scope();
    if let Some(s) = union_scope {
        ctx.enter_scope(s);
    }

    let mut fields = Vec::with_capacity(members.len());
    let mut max_size: u64 = 0;
    let mut max_align: u64 = 1;
    for &member in &members {
        let (ty_node, mname) = match &ast.get(member).kind {
            NodeKind::VarDecl { ty, name, .. } => (*ty, name.clone()),
            _ => continue,
        };
        let mt = resolve_type(ctx, ast, ty_node);
        ast.get_mut(member).resolved_type = Some(mt);
        if let Some(s) = union_scope {
            if let Some(sid) = ctx.lookup_in(s, &mname) {
                ctx.symbol_mut(sid).resolved_type = Some(mt);
            }
        }
        let (msize, malign) = ctx
            .types
            .get(mt)
            .map(|t| (t.size(), t.align()))
            .unwrap_or((0, 1));
        max_size = max_size.max(msize);
        max_align = max_align.max(malign);
        fields.push(FieldInfo {
            name: mname,
            ty: mt,
            offset: 0,
        });
    }
    ctx.enter_scope(enclosing);

    let rt = ResolvedType::unqualified(TypeKind::Union {
        name: Some(tag),
        decl: Some(node),
        fields,
        size: max_size,
        align: max_align,
        complete: true,
    });
    let id = ctx.types.register(rt);
    ctx.symbol_mut(sym_id).resolved_type = Some(id);
    ast.get_mut(node).resolved_type = Some(id);
    id
}

/// §4.2 array layout rule / P6: size is element size times the product of
/// all dimensions; alignment is the element's alignment.
pub(crate) fn resolve_array(ctx: &mut SemanticContext, ast: &mut Ast, node: NodeId) -> TypeId {
    let (elem_ty_node, name, dimensions) = match &ast.get(node).kind {
        NodeKind::Array {
            elem_ty,
            name,
            dimensions,
            ..
        } => (*elem_ty, name.clone(), dimensions.clone()),
        _ => return TypeId::INVALID,
    };

    let elem_id = resolve_type(ctx, ast, elem_ty_node);
    let (elem_size, elem_align) = ctx
        .types
        .get(elem_id)
        .map(|t| (t.size(), t.align()))
        .unwrap_or((0, 1));

    let total_elements: u64 = dimensions.iter().product();
    let rt = ResolvedType::unqualified(TypeKind::Array {
        element: elem_id,
        dimensions,
        total_elements,
        size: elem_size * total_elements,
        align: elem_align,
    });
    let id = ctx.types.register(rt);

    if let Some(sym_id) = ctx.lookup_in(ctx.current_scope(), &name) {
        ctx.symbol_mut(sym_id).resolved_type = Some(id);
    }
    ast.get_mut(node).resolved_type = Some(id);
    id
}

/// §4.2/§11: builtin sizes/alignments at native host widths; enum base is
/// always 4-byte signed int (handled in [`resolve_enum`], not here).
/// Integer-literal suffixes never reach this function -- only the type
/// specifier's `sign`/`length` fields do.
fn resolve_builtin(ctx: &mut SemanticContext, name: &str, spec: &TypeSpec) -> TypeId {
    use owly_core::BuiltinKind::*;

    let unsigned = spec.sign == Some(Signedness::Unsigned);
    let builtin = match name {
        "void" => Void,
        "bool" => Bool,
        "char" => {
            if unsigned {
                UChar
            } else if spec.sign == Some(Signedness::Signed) {
                SChar
            } else {
                Char
            }
        }
        "short" => {
            if unsigned {
                UShort
            } else {
                Short
            }
        }
        "int" => match spec.length {
            Some(owly_core::LengthModifier::Short) => {
                if unsigned {
                    UShort
                } else {
                    Short
                }
            }
            Some(owly_core::LengthModifier::Long) => {
                if unsigned {
                    ULong
                } else {
                    Long
                }
            }
            Some(owly_core::LengthModifier::LongLong) => {
                if unsigned {
                    ULongLong
                } else {
                    LongLong
                }
            }
            _ => {
                if unsigned {
                    UInt
                } else {
                    Int
                }
            }
        },
        "long" => {
            if spec.length == Some(owly_core::LengthModifier::LongLong) {
                if unsigned {
                    ULongLong
                } else {
                    LongLong
                }
            } else if unsigned {
                ULong
            } else {
                Long
            }
        }
        "float" => Float,
        "double" => Double,
        _ => {
            ctx.error(
                SemaError::UnknownTypeName {
                    name: name.to_string(),
                },
                None,
                None,
            );
            return TypeId::INVALID;
        }
    };

    match builtin {
        Void => TypeId::VOID,
        Bool => TypeId::BOOL,
        Char => TypeId::CHAR,
        SChar => TypeId::SCHAR,
        UChar => TypeId::UCHAR,
        Short => TypeId::SHORT,
        UShort => TypeId::USHORT,
        Int => TypeId::INT,
        UInt => TypeId::UINT,
        Long => TypeId::LONG,
        ULong => TypeId::ULONG,
        LongLong => TypeId::LONGLONG,
        ULongLong => TypeId::ULONGLONG,
        Float => TypeId::FLOAT,
        Double => TypeId::DOUBLE,
    }
}
