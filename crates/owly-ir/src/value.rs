//! IR values (§3 "IR entities"): temps, globals, constants, labels, undef.
//!
//! Unlike `owly-core`'s AST/expression arenas, `IRValue`s are cheap, ordinary
//! Rust values passed and cloned by instructions that reference them, rather
//! than indices into a pool -- an `IRValue` is small (an enum discriminant
//! plus an optional id/name/type) and values never need identity beyond
//! `==`, so the arena-and-index discipline used elsewhere in this workspace
//! would be needless indirection here.

use owly_core::TypeId;
use serde::{Deserialize, Serialize};

use crate::id::{BlockId, ValueId};

/// The kind of an [`IRValue`] (§3: "temp (SSA id, function-local), global
/// (name), integer constant, float constant, string constant (promoted to a
/// module global), label (block id), undef").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IRValueKind {
    /// An SSA temporary produced by some instruction in the owning function.
    Temp,
    /// A named module-level value (a top-level variable, or a reference to a
    /// callee by name).
    Global,
    ConstInt(i64),
    ConstFloat(f64),
    /// Always paired with a `name` identifying the module global it is
    /// promoted to (§4.5 "Literal" contract).
    ConstString(String),
    Label(BlockId),
    Undef,
}

/// One IR value: a tagged kind plus the identity/type metadata that kind
/// needs. `id` is set for [`IRValueKind::Temp`]; `name` is set for
/// [`IRValueKind::Global`] and [`IRValueKind::ConstString`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IRValue {
    pub kind: IRValueKind,
    pub id: Option<ValueId>,
    pub name: Option<String>,
    pub ty: Option<TypeId>,
}

impl IRValue {
    pub fn temp(id: ValueId, ty: Option<TypeId>) -> Self {
        IRValue {
            kind: IRValueKind::Temp,
            id: Some(id),
            name: None,
            ty,
        }
    }

    pub fn global(name: impl Into<String>, ty: Option<TypeId>) -> Self {
        IRValue {
            kind: IRValueKind::Global,
            id: None,
            name: Some(name.into()),
            ty,
        }
    }

    pub fn const_int(value: i64, ty: Option<TypeId>) -> Self {
        IRValue {
            kind: IRValueKind::ConstInt(value),
            id: None,
            name: None,
            ty,
        }
    }

    pub fn const_float(value: f64, ty: Option<TypeId>) -> Self {
        IRValue {
            kind: IRValueKind::ConstFloat(value),
            id: None,
            name: None,
            ty,
        }
    }

    /// A string constant, promoted to the module global named `name`
    /// (§4.5's "strings become pointers to module global bytes").
    pub fn const_string(name: impl Into<String>, value: impl Into<String>) -> Self {
        IRValue {
            kind: IRValueKind::ConstString(value.into()),
            id: None,
            name: Some(name.into()),
            ty: None,
        }
    }

    pub fn label(block: BlockId) -> Self {
        IRValue {
            kind: IRValueKind::Label(block),
            id: None,
            name: None,
            ty: None,
        }
    }

    pub fn undef(ty: Option<TypeId>) -> Self {
        IRValue {
            kind: IRValueKind::Undef,
            id: None,
            name: None,
            ty,
        }
    }

    pub fn is_temp(&self) -> bool {
        matches!(self.kind, IRValueKind::Temp)
    }

    pub fn is_constant(&self) -> bool {
        matches!(
            self.kind,
            IRValueKind::ConstInt(_) | IRValueKind::ConstFloat(_) | IRValueKind::ConstString(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_carries_its_id() {
        let v = IRValue::temp(ValueId(4), Some(TypeId::INT));
        assert!(v.is_temp());
        assert_eq!(v.id, Some(ValueId(4)));
    }

    #[test]
    fn const_string_names_its_global() {
        let v = IRValue::const_string(".str.0", "hello");
        assert!(v.is_constant());
        assert_eq!(v.name.as_deref(), Some(".str.0"));
        assert!(matches!(&v.kind, IRValueKind::ConstString(s) if s == "hello"));
    }

    #[test]
    fn global_has_no_id() {
        let v = IRValue::global("counter", Some(TypeId::INT));
        assert!(v.id.is_none());
        assert_eq!(v.name.as_deref(), Some("counter"));
    }
}
