//! Scope tree and symbol table (§3 "Symbol table").
//!
//! A [`Scope`] tree is rooted at a single global scope; each scope carries
//! an ordered list of child scopes and an ordered list of symbols. Both
//! arenas live in [`crate::context::SemanticContext`], addressed by
//! [`ScopeId`]/[`SymbolId`] rather than owned pointers, mirroring the
//! arena-with-non-owning-index discipline `owly-core` uses for the AST
//! (§9's cyclic-data-graph design note).

use std::fmt;

use owly_core::{NodeId, TypeId};
use serde::{Deserialize, Serialize};

/// Index into [`crate::context::SemanticContext`]'s scope arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeId(pub u32);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scope({})", self.0)
    }
}

/// Index into [`crate::context::SemanticContext`]'s symbol arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
    Struct,
    Union,
    Enum,
}

/// A node in the scope tree. `name` is set for scopes that carry a tag
/// (function name, struct/union/enum tag) so later passes can find the
/// scope a given declaration pushed; see `same_declaration`-style lookups
/// in [`crate::resolve`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scope {
    pub kind: ScopeKind,
    pub name: Option<String>,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub symbols: Vec<SymbolId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Variable,
    Function,
    Typedef,
    Struct,
    Union,
    Enum,
    EnumMember,
}

/// One declared name. `decl` is a non-owning back-reference to the AST
/// declaration node (§3: "back-reference to declaration AST node");
/// `resolved_type` is populated during pass 2 (§4.3 PASS 2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub decl: NodeId,
    pub scope: ScopeId,
    pub resolved_type: Option<TypeId>,
}
