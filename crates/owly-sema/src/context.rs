//! The semantic analyzer's ambient state: scope tree, symbol table, type
//! registry, and accumulated diagnostics (§3 "Symbol table", §7).

use std::collections::HashMap;

use owly_core::{ExprId, NodeId, TypeId, TypeRegistry};

use crate::diagnostics::{Diagnostic, SemaError, SemaWarning, Severity};
use crate::scope::{Scope, ScopeId, ScopeKind, Symbol, SymbolId, SymbolKind};

/// Owns every arena the three passes read and write: the scope tree, the
/// symbol table, the type registry, and the diagnostic log. One
/// `SemanticContext` is created per compilation and threaded through
/// [`crate::pass1::pass1`], [`crate::resolve::pass2`], and
/// [`crate::check::pass3`] in order.
pub struct SemanticContext {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    global_scope: ScopeId,
    current_scope: ScopeId,
    /// Scopes created while visiting a given AST node, in creation order.
    /// Passes 2 and 3 replay this list (by index) instead of re-deriving
    /// position from a running cursor over the parent's children, which
    /// avoids misattributing a scope to the wrong sibling when a scope is
    /// itself nested inside another scope pushed by the same node (see
    /// DESIGN.md). This is option (a) of the §9 design note.
    node_scopes: HashMap<NodeId, Vec<ScopeId>>,
    /// Return type of the function pass 3 is currently walking, used to
    /// check `return` statements (§4.3 PASS 3). `None` outside any
    /// function body.
    pub current_return_type: Option<TypeId>,
    pub types: TypeRegistry,
    pub diagnostics: Vec<Diagnostic>,
    pub error_count: u32,
    pub warning_count: u32,
}

impl SemanticContext {
    pub fn new() -> Self {
        let global = Scope {
            kind: ScopeKind::Global,
            name: None,
            parent: None,
            children: Vec::new(),
            symbols: Vec::new(),
        };
        SemanticContext {
            scopes: vec![global],
            symbols: Vec::new(),
            global_scope: ScopeId(0),
            current_scope: ScopeId(0),
            node_scopes: HashMap::new(),
            current_return_type: None,
            types: TypeRegistry::new(),
            diagnostics: Vec::new(),
            error_count: 0,
            warning_count: 0,
        }
    }

    pub fn global_scope(&self) -> ScopeId {
        self.global_scope
    }

    pub fn current_scope(&self) -> ScopeId {
        self.current_scope
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0 as usize]
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.0 as usize]
    }

    /// Pushes a fresh child scope of the current scope and makes it
    /// current. Pass 1 only (passes 2/3 re-enter via [`Self::enter_scope`]).
    pub fn push_scope(&mut self, kind: ScopeKind, name: Option<String>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            kind,
            name,
            parent: Some(self.current_scope),
            children: Vec::new(),
            symbols: Vec::new(),
        });
        self.scope_mut(self.current_scope).children.push(id);
        self.current_scope = id;
        id
    }

    /// Returns to the current scope's parent. Panics at the global scope,
    /// which a balanced pass never pops.
    pub fn pop_scope(&mut self) {
        let parent = self
            .scope(self.current_scope)
            .parent
            .expect("pop_scope called on the global scope");
        self.current_scope = parent;
    }

    /// Makes `id` current without altering the tree; used by passes 2/3 to
    /// revisit a scope pass 1 already created.
    pub fn enter_scope(&mut self, id: ScopeId) {
        self.current_scope = id;
    }

    /// Leaves a scope entered via [`Self::enter_scope`], restoring its
    /// parent as current.
    pub fn leave_scope(&mut self) {
        self.pop_scope();
    }

    /// Records that `scope` was created while pass 1 was visiting `node`,
    /// in creation order. See [`Self::node_scopes`]'s replay contract.
    pub fn record_scope(&mut self, node: NodeId, scope: ScopeId) {
        self.node_scopes.entry(node).or_default().push(scope);
    }

    /// The scopes recorded against `node` during pass 1, in creation
    /// order. Passes 2/3 index into this slice instead of the scope
    /// tree's `children` to re-enter the same scopes pass 1 did (§9).
    pub fn scopes_of(&self, node: NodeId) -> &[ScopeId] {
        self.node_scopes.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Declares `name` in `scope`, recording a duplicate-declaration
    /// diagnostic and returning `None` if the scope already has a symbol
    /// with that name (P1: at most one symbol per name per scope).
    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: &str,
        kind: SymbolKind,
        decl: NodeId,
    ) -> Option<SymbolId> {
        if self.lookup_in(scope, name).is_some() {
            self.error(
                SemaError::DuplicateDeclaration {
                    name: name.to_string(),
                },
                Some(decl),
                None,
            );
            return None;
        }
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            name: name.to_string(),
            kind,
            decl,
            scope,
            resolved_type: None,
        });
        self.scope_mut(scope).symbols.push(id);
        Some(id)
    }

    /// Declares `name` in the current scope. Shorthand for
    /// `declare(current_scope(), ...)`.
    pub fn add_symbol(&mut self, name: &str, kind: SymbolKind, decl: NodeId) -> Option<SymbolId> {
        self.declare(self.current_scope, name, kind, decl)
    }

    /// Looks up `name` directly in `scope`, without consulting ancestors.
    pub fn lookup_in(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scope(scope)
            .symbols
            .iter()
            .copied()
            .find(|&sid| self.symbol(sid).name == name)
    }

    /// Looks up `name` in `scope`, then its ancestors, then the global
    /// scope.
    pub fn lookup_recursive(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(s) = current {
            if let Some(sym) = self.lookup_in(s, name) {
                return Some(sym);
            }
            current = self.scope(s).parent;
        }
        None
    }

    /// Finds the direct child scope of `scope` with the given `kind` and
    /// tag `name`, used by `resolve_struct`/`resolve_union`/`resolve_enum`
    /// to re-enter the scope a tagged declaration pushed in pass 1.
    pub fn find_child_scope(&self, scope: ScopeId, kind: ScopeKind, name: &str) -> Option<ScopeId> {
        self.scope(scope).children.iter().copied().find(|&c| {
            let child = self.scope(c);
            child.kind == kind && child.name.as_deref() == Some(name)
        })
    }

    pub fn error(&mut self, err: SemaError, node: Option<NodeId>, expr: Option<ExprId>) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            message: err.to_string(),
            node,
            expr,
        });
        self.error_count += 1;
    }

    pub fn warning(&mut self, warn: SemaWarning, node: Option<NodeId>, expr: Option<ExprId>) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            message: warn.to_string(),
            node,
            expr,
        });
        self.warning_count += 1;
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

impl Default for SemanticContext {
    fn default() -> Self {
        SemanticContext::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_has_global_scope_current() {
        let ctx = SemanticContext::new();
        assert_eq!(ctx.current_scope(), ctx.global_scope());
        assert_eq!(ctx.scope(ctx.global_scope()).kind, ScopeKind::Global);
    }

    #[test]
    fn push_and_pop_scope_restores_parent() {
        let mut ctx = SemanticContext::new();
        let global = ctx.current_scope();
        let block = ctx.push_scope(ScopeKind::Block, None);
        assert_eq!(ctx.current_scope(), block);
        assert_eq!(ctx.scope(block).parent, Some(global));
        ctx.pop_scope();
        assert_eq!(ctx.current_scope(), global);
    }

    #[test]
    fn duplicate_declaration_is_rejected() {
        let mut ctx = SemanticContext::new();
        let first = ctx.add_symbol("x", SymbolKind::Variable, NodeId(0));
        assert!(first.is_some());
        let second = ctx.add_symbol("x", SymbolKind::Variable, NodeId(1));
        assert!(second.is_none());
        assert_eq!(ctx.error_count, 1);
    }

    #[test]
    fn lookup_recursive_walks_ancestors() {
        let mut ctx = SemanticContext::new();
        ctx.add_symbol("g", SymbolKind::Variable, NodeId(0));
        let block = ctx.push_scope(ScopeKind::Block, None);
        assert!(ctx.lookup_recursive(block, "g").is_some());
        assert!(ctx.lookup_in(block, "g").is_none());
    }

    #[test]
    fn scopes_of_replays_in_creation_order() {
        let mut ctx = SemanticContext::new();
        let node = NodeId(42);
        let a = ctx.push_scope(ScopeKind::Block, None);
        ctx.record_scope(node, a);
        ctx.pop_scope();
        let b = ctx.push_scope(ScopeKind::Block, None);
        ctx.record_scope(node, b);
        ctx.pop_scope();
        assert_eq!(ctx.scopes_of(node), &[a, b]);
    }
}
