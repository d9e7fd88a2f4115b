//! `TypeId` and `TypeRegistry`: nominal identity for resolved types.
//!
//! Every [`crate::types::ResolvedType`] produced by the semantic analyzer
//! lives in a `TypeRegistry`, addressed by a `TypeId`. Builtins are
//! pre-registered on construction with fixed IDs (native host widths, §4.2);
//! everything else -- pointers, arrays, duplicated typedef/struct/union/enum
//! references, function signatures -- is registered as it is resolved.
//!
//! Per §4.2/§5, resolving a name that denotes a typedef/struct/union/enum
//! *duplicates* that type's `ResolvedType` rather than aliasing its
//! `TypeId`, so qualifiers (`const`/`volatile`) and pointer wrapping applied
//! at a use site never mutate the declaration's canonical entry. Structural
//! identity for struct/union/enum is therefore tracked separately via the
//! declaration back-reference on [`crate::types::TypeKind::Struct`] /
//! `Union` / `Enum`, not via `TypeId` equality -- see
//! [`crate::types::ResolvedType::same_declaration`].

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{BuiltinKind, ResolvedType, TypeKind};

/// Unique identifier for an entry in a [`TypeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeId(pub u32);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Pre-registered `TypeId` constants for built-in (unqualified) types.
impl TypeId {
    pub const VOID: TypeId = TypeId(0);
    pub const BOOL: TypeId = TypeId(1);
    pub const CHAR: TypeId = TypeId(2);
    pub const SCHAR: TypeId = TypeId(3);
    pub const UCHAR: TypeId = TypeId(4);
    pub const SHORT: TypeId = TypeId(5);
    pub const USHORT: TypeId = TypeId(6);
    pub const INT: TypeId = TypeId(7);
    pub const UINT: TypeId = TypeId(8);
    pub const LONG: TypeId = TypeId(9);
    pub const ULONG: TypeId = TypeId(10);
    pub const LONGLONG: TypeId = TypeId(11);
    pub const ULONGLONG: TypeId = TypeId(12);
    pub const FLOAT: TypeId = TypeId(13);
    pub const DOUBLE: TypeId = TypeId(14);
    pub const INVALID: TypeId = TypeId(15);
}

/// Registry of all resolved types in a compilation, providing nominal
/// identity via [`TypeId`] and name lookup for struct/union/enum/typedef
/// tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeRegistry {
    types: Vec<ResolvedType>,
    /// Tag-name lookup for struct/union/enum declarations registered with
    /// [`TypeRegistry::register_named`].
    names: HashMap<String, TypeId>,
    next_id: u32,
}

impl TypeRegistry {
    const BUILTIN_COUNT: u32 = 16;

    /// Creates a registry with the builtin scalar types and `Invalid`
    /// pre-registered at the fixed IDs in `impl TypeId`.
    pub fn new() -> Self {
        use BuiltinKind::*;
        let builtins = [
            Void, Bool, Char, SChar, UChar, Short, UShort, Int, UInt, Long, ULong, LongLong,
            ULongLong, Float, Double,
        ];
        let mut types: Vec<ResolvedType> = builtins
            .iter()
            .map(|b| ResolvedType::unqualified(TypeKind::Builtin(*b)))
            .collect();
        types.push(ResolvedType::unqualified(TypeKind::Invalid));

        TypeRegistry {
            types,
            names: HashMap::new(),
            next_id: Self::BUILTIN_COUNT,
        }
    }

    /// Registers a type without a name, returning its fresh `TypeId`.
    pub fn register(&mut self, ty: ResolvedType) -> TypeId {
        let id = TypeId(self.next_id);
        self.types.push(ty);
        self.next_id += 1;
        id
    }

    /// Registers a named (struct/union/enum) type's canonical declaration
    /// entry. Returns [`CoreError::DuplicateTypeName`] if the tag already
    /// exists.
    pub fn register_named(&mut self, name: &str, ty: ResolvedType) -> Result<TypeId, CoreError> {
        if self.names.contains_key(name) {
            return Err(CoreError::DuplicateTypeName {
                name: name.to_string(),
            });
        }
        let id = self.register(ty);
        self.names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Looks up a previously registered named type by tag.
    pub fn lookup_named(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    pub fn get(&self, id: TypeId) -> Option<&ResolvedType> {
        self.types.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: TypeId) -> Option<&mut ResolvedType> {
        self.types.get_mut(id.0 as usize)
    }

    pub fn try_get(&self, id: TypeId) -> Result<&ResolvedType, CoreError> {
        self.get(id).ok_or(CoreError::TypeNotFound { id })
    }

    /// Duplicates the type at `id` into a fresh registry entry, per the
    /// deep-copy-on-reference rule of §4.2/§5. Returns a new `TypeId`
    /// whose `ResolvedType` is a clone of the source, safe to mutate
    /// (e.g. apply qualifiers or pointer wrapping) without affecting the
    /// original declaration.
    pub fn duplicate(&mut self, id: TypeId) -> Result<TypeId, CoreError> {
        let ty = self.try_get(id)?.clone();
        Ok(self.register(ty))
    }

    /// Wraps `base` in `depth` levels of pointer, per §4.2 step 2.
    /// Pointer size/alignment are fixed at the native pointer width (8
    /// bytes on the LP64 host this specification targets).
    pub fn wrap_pointers(&mut self, base: TypeId, depth: u32) -> TypeId {
        let mut current = base;
        for _ in 0..depth {
            current = self.register(ResolvedType::unqualified(TypeKind::Pointer { base: current }));
        }
        current
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        TypeRegistry::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_preregistered() {
        let reg = TypeRegistry::new();
        assert!(matches!(
            reg.get(TypeId::INT).unwrap().kind,
            TypeKind::Builtin(BuiltinKind::Int)
        ));
        assert!(matches!(
            reg.get(TypeId::DOUBLE).unwrap().kind,
            TypeKind::Builtin(BuiltinKind::Double)
        ));
    }

    #[test]
    fn register_named_rejects_duplicate() {
        let mut reg = TypeRegistry::new();
        let ty = ResolvedType::unqualified(TypeKind::Enum {
            name: Some("Color".into()),
            decl: None,
            base: TypeId::INT,
        });
        reg.register_named("Color", ty.clone()).unwrap();
        let err = reg.register_named("Color", ty).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateTypeName { .. }));
    }

    #[test]
    fn duplicate_creates_independent_entry() {
        let mut reg = TypeRegistry::new();
        let dup = reg.duplicate(TypeId::INT).unwrap();
        assert_ne!(dup, TypeId::INT);
        reg.get_mut(dup).unwrap().is_const = true;
        assert!(!reg.get(TypeId::INT).unwrap().is_const);
        assert!(reg.get(dup).unwrap().is_const);
    }

    #[test]
    fn wrap_pointers_depth() {
        let mut reg = TypeRegistry::new();
        // int** : two levels of pointer wrapping around TypeId::INT.
        let outer = reg.wrap_pointers(TypeId::INT, 2);
        let inner = match reg.get(outer).unwrap().kind {
            TypeKind::Pointer { base } => base,
            _ => panic!("expected pointer"),
        };
        assert!(matches!(
            reg.get(inner).unwrap().kind,
            TypeKind::Pointer { base } if base == TypeId::INT
        ));
    }

    #[test]
    fn type_not_found_error() {
        let reg = TypeRegistry::new();
        let err = reg.try_get(TypeId(9999)).unwrap_err();
        assert!(matches!(err, CoreError::TypeNotFound { .. }));
    }
}
