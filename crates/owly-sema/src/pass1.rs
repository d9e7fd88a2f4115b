//! PASS 1 -- collect declarations (§4.3 PASS 1).
//!
//! Walks the program once, creating a symbol for every declaration and
//! pushing/popping scopes exactly as each construct demands, recording
//! every scope it creates against the owning node via
//! [`SemanticContext::record_scope`] so passes 2 and 3 can re-enter the
//! same scopes directly rather than through a fragile per-call
//! running-children-index (see the note on `node_scopes` in `context.rs`).

use owly_core::{Ast, NodeId, NodeKind, TypeBase};

use crate::context::SemanticContext;
use crate::diagnostics::SemaError;
use crate::scope::{ScopeKind, SymbolKind};

pub fn pass1(ctx: &mut SemanticContext, ast: &Ast) {
    for &stmt in ast.program_stmts() {
        pass1_stmt(ctx, ast, stmt);
    }
}

/// If `ty` wraps a nested struct/union/enum declaration (`struct Point {
/// ... } p;`), collects that declaration too, so its symbol and scope
/// exist by the time pass 2 resolves the type. A plain builtin/typedef
/// base name needs no further collection work here.
fn collect_nested_type_decl(ctx: &mut SemanticContext, ast: &Ast, ty: NodeId) {
    if let NodeKind::TypeNode {
        base: TypeBase::Decl(decl),
        ..
    } = &ast.get(ty).kind
    {
        pass1_stmt(ctx, ast, *decl);
    }
}

fn pass1_stmt(ctx: &mut SemanticContext, ast: &Ast, node: NodeId) {
    match &ast.get(node).kind {
        NodeKind::VarDecl { ty, name, .. } => {
            let ty = *ty;
            ctx.add_symbol(name, SymbolKind::Variable, node);
            collect_nested_type_decl(ctx, ast, ty);
        }

        NodeKind::Array { elem_ty, name, .. } => {
            let elem_ty = *elem_ty;
            ctx.add_symbol(name, SymbolKind::Variable, node);
            collect_nested_type_decl(ctx, ast, elem_ty);
        }

        NodeKind::FuncDecl {
            return_ty,
            name,
            params,
            body,
            ..
        } => {
            let return_ty = *return_ty;
            let name = name.clone();
            let params = params.clone();
            let body = body.clone();

            // Added to the enclosing scope before the function scope is
            // pushed, so a call to itself inside the body resolves.
            ctx.add_symbol(&name, SymbolKind::Function, node);
            collect_nested_type_decl(ctx, ast, return_ty);

            let scope = ctx.push_scope(ScopeKind::Function, Some(name));
            ctx.record_scope(node, scope);
            for param in params {
                pass1_stmt(ctx, ast, param);
            }
            for stmt in body {
                pass1_stmt(ctx, ast, stmt);
            }
            ctx.pop_scope();
        }

        NodeKind::EnumDecl { tag, members } => {
            let tag_name = tag.clone().unwrap_or_else(|| anon_tag(node));
            ctx.add_symbol(&tag_name, SymbolKind::Enum, node);
            let enclosing = ctx.current_scope();

            let scope = ctx.push_scope(ScopeKind::Enum, Some(tag_name));
            ctx.record_scope(node, scope);
            for member in members {
                // Visible both inside the enum scope and in its enclosing
                // scope (P2); both declarations back-reference the enum
                // node itself since an enum member has no AST node of its
                // own.
                ctx.declare(scope, &member.name, SymbolKind::EnumMember, node);
                ctx.declare(enclosing, &member.name, SymbolKind::EnumMember, node);
            }
            ctx.pop_scope();
        }

        NodeKind::StructDecl { tag, members } => {
            let tag_name = tag.clone().unwrap_or_else(|| anon_tag(node));
            let members = members.clone();
            ctx.add_symbol(&tag_name, SymbolKind::Struct, node);

            let scope = ctx.push_scope(ScopeKind::Struct, Some(tag_name));
            ctx.record_scope(node, scope);
            collect_members(ctx, ast, &members);
            ctx.pop_scope();
        }

        NodeKind::UnionDecl { tag, members } => {
            let tag_name = tag.clone().unwrap_or_else(|| anon_tag(node));
            let members = members.clone();
            ctx.add_symbol(&tag_name, SymbolKind::Union, node);

            let scope = ctx.push_scope(ScopeKind::Union, Some(tag_name));
            ctx.record_scope(node, scope);
            collect_members(ctx, ast, &members);
            ctx.pop_scope();
        }

        NodeKind::Typedef { name, underlying } => {
            let underlying = *underlying;
            ctx.add_symbol(name, SymbolKind::Typedef, node);
            match &ast.get(underlying).kind {
                NodeKind::StructDecl { .. } | NodeKind::UnionDecl { .. } | NodeKind::EnumDecl { .. } => {
                    pass1_stmt(ctx, ast, underlying);
                }
                NodeKind::TypeNode { .. } => collect_nested_type_decl(ctx, ast, underlying),
                _ => {}
            }
        }

        NodeKind::If {
            body,
            elifs,
            else_body,
            ..
        } => {
            let body = body.clone();
            let elifs = elifs.clone();
            let else_body = else_body.clone();

            let outer = ctx.push_scope(ScopeKind::Block, None);
            ctx.record_scope(node, outer);
            for stmt in body {
                pass1_stmt(ctx, ast, stmt);
            }

            for elif in &elifs {
                let scope = ctx.push_scope(ScopeKind::Block, None);
                ctx.record_scope(node, scope);
                for &stmt in &elif.body {
                    pass1_stmt(ctx, ast, stmt);
                }
                ctx.pop_scope();
            }

            if let Some(else_body) = else_body {
                let scope = ctx.push_scope(ScopeKind::Block, None);
                ctx.record_scope(node, scope);
                for stmt in else_body {
                    pass1_stmt(ctx, ast, stmt);
                }
                ctx.pop_scope();
            }

            ctx.pop_scope();
        }

        NodeKind::While { body, .. } => {
            let body = body.clone();
            let scope = ctx.push_scope(ScopeKind::Block, None);
            ctx.record_scope(node, scope);
            for stmt in body {
                pass1_stmt(ctx, ast, stmt);
            }
            ctx.pop_scope();
        }

        NodeKind::DoWhile { body, .. } => {
            let body = body.clone();
            let scope = ctx.push_scope(ScopeKind::Block, None);
            ctx.record_scope(node, scope);
            for stmt in body {
                pass1_stmt(ctx, ast, stmt);
            }
            ctx.pop_scope();
        }

        NodeKind::For { init, body, .. } => {
            let init = *init;
            let body = body.clone();
            let scope = ctx.push_scope(ScopeKind::Block, None);
            ctx.record_scope(node, scope);
            if let Some(init) = init {
                pass1_stmt(ctx, ast, init);
            }
            for stmt in body {
                pass1_stmt(ctx, ast, stmt);
            }
            ctx.pop_scope();
        }

        NodeKind::Switch {
            cases,
            default_body,
            ..
        } => {
            let cases = cases.clone();
            let default_body = default_body.clone();

            let outer = ctx.push_scope(ScopeKind::Block, None);
            ctx.record_scope(node, outer);

            for case in &cases {
                let scope = ctx.push_scope(ScopeKind::Block, None);
                ctx.record_scope(node, scope);
                for &stmt in &case.body {
                    pass1_stmt(ctx, ast, stmt);
                }
                ctx.pop_scope();
            }

            if let Some(default_body) = default_body {
                let scope = ctx.push_scope(ScopeKind::Block, None);
                ctx.record_scope(node, scope);
                for stmt in default_body {
                    pass1_stmt(ctx, ast, stmt);
                }
                ctx.pop_scope();
            }

            ctx.pop_scope();
        }

        // Not declarations and don't introduce scopes.
        NodeKind::Program { .. }
        | NodeKind::Return { .. }
        | NodeKind::ExprStmt { .. }
        | NodeKind::TypeNode { .. }
        | NodeKind::Misc { .. } => {}
    }
}

fn collect_members(ctx: &mut SemanticContext, ast: &Ast, members: &[NodeId]) {
    for &member in members {
        match &ast.get(member).kind {
            NodeKind::VarDecl { .. } => pass1_stmt(ctx, ast, member),
            _ => ctx.error(SemaError::InvalidMemberDeclaration, Some(member), None),
        }
    }
}

fn anon_tag(node: NodeId) -> String {
    format!("<anon@{}>", node.0)
}
