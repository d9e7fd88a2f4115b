//! The Owly resolved-type system (§3 "Resolved types", §4.2).
//!
//! A [`ResolvedType`] is a tagged value with a common const/volatile
//! qualifier header and a [`TypeKind`] payload. Builtin sizes/alignments use
//! the native widths of an LP64 host (pointers are 8 bytes, per §4.2's fixed
//! native-pointer-width rule); a cross-compiling implementation would make
//! these parameters of the registry instead, per §9's design note.

use serde::{Deserialize, Serialize};

use crate::id::NodeId;
use crate::type_id::TypeId;

/// Builtin scalar categories, each with a fixed size/alignment/signedness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuiltinKind {
    Void,
    Bool,
    Char,
    SChar,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Float,
    Double,
}

impl BuiltinKind {
    /// Size in bytes on the LP64 host this specification targets.
    pub fn size(self) -> u64 {
        use BuiltinKind::*;
        match self {
            Void => 0,
            Bool | Char | SChar | UChar => 1,
            Short | UShort => 2,
            Int | UInt | Float => 4,
            Long | ULong | LongLong | ULongLong | Double => 8,
        }
    }

    /// Alignment in bytes; for scalars this equals the size (minimum 1).
    pub fn align(self) -> u64 {
        self.size().max(1)
    }

    pub fn is_signed(self) -> bool {
        use BuiltinKind::*;
        matches!(
            self,
            Char | SChar | Short | Int | Long | LongLong | Float | Double
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, BuiltinKind::Float | BuiltinKind::Double)
    }

    pub fn is_integer(self) -> bool {
        !self.is_floating() && !matches!(self, BuiltinKind::Void)
    }
}

/// A single struct/union member: name, type, and (for structs) byte offset
/// from the start of the aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    pub ty: TypeId,
    pub offset: u64,
}

/// The payload of a [`ResolvedType`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeKind {
    /// Failed or not-yet-resolved type.
    Invalid,
    Builtin(BuiltinKind),
    /// Pointer to `base`. Size/alignment are always 8 bytes (native pointer
    /// width).
    Pointer { base: TypeId },
    /// Fixed-size, possibly multi-dimensional array.
    Array {
        element: TypeId,
        dimensions: Vec<u64>,
        total_elements: u64,
        size: u64,
        align: u64,
    },
    /// Named struct. `decl` is a non-owning back-reference to the AST
    /// declaration node; struct/struct compatibility is judged by `decl`
    /// (or `name` when `decl` is absent, e.g. after a cross-compilation
    /// round-trip), never by `TypeId` equality -- see
    /// [`ResolvedType::same_declaration`].
    Struct {
        name: Option<String>,
        decl: Option<NodeId>,
        fields: Vec<FieldInfo>,
        size: u64,
        align: u64,
        complete: bool,
    },
    /// Named union. Layout differs from struct (max, not sum, of members);
    /// see §4.2's union layout rule.
    Union {
        name: Option<String>,
        decl: Option<NodeId>,
        fields: Vec<FieldInfo>,
        size: u64,
        align: u64,
        complete: bool,
    },
    /// Named enum. `base` is always a 4-byte signed integer type, per §3.
    Enum {
        name: Option<String>,
        decl: Option<NodeId>,
        base: TypeId,
    },
    Function {
        return_type: TypeId,
        params: Vec<TypeId>,
        is_variadic: bool,
    },
}

/// A fully constructed type descriptor: size, alignment, structural detail,
/// plus const/volatile qualifiers (§3 "Resolved types").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedType {
    pub kind: TypeKind,
    pub is_const: bool,
    pub is_volatile: bool,
}

impl ResolvedType {
    pub fn unqualified(kind: TypeKind) -> Self {
        ResolvedType {
            kind,
            is_const: false,
            is_volatile: false,
        }
    }

    /// Byte size of this type. `0` for `Invalid`/`void`/incomplete
    /// struct-or-union, per §4.2's "zero-member structs have size 0".
    pub fn size(&self) -> u64 {
        match &self.kind {
            TypeKind::Invalid => 0,
            TypeKind::Builtin(b) => b.size(),
            TypeKind::Pointer { .. } => 8,
            TypeKind::Array { size, .. } => *size,
            TypeKind::Struct { size, .. } => *size,
            TypeKind::Union { size, .. } => *size,
            TypeKind::Enum { .. } => 4,
            TypeKind::Function { .. } => 0,
        }
    }

    /// Byte alignment of this type. Minimum 1, per §4.2's union/struct
    /// alignment floor.
    pub fn align(&self) -> u64 {
        match &self.kind {
            TypeKind::Invalid => 1,
            TypeKind::Builtin(b) => b.align(),
            TypeKind::Pointer { .. } => 8,
            TypeKind::Array { align, .. } => (*align).max(1),
            TypeKind::Struct { align, .. } => (*align).max(1),
            TypeKind::Union { align, .. } => (*align).max(1),
            TypeKind::Enum { .. } => 4,
            TypeKind::Function { .. } => 1,
        }
    }

    pub fn is_complete(&self) -> bool {
        match &self.kind {
            TypeKind::Invalid => false,
            TypeKind::Struct { complete, .. } => *complete,
            TypeKind::Union { complete, .. } => *complete,
            TypeKind::Function { .. } => false,
            _ => true,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(&self.kind, TypeKind::Builtin(b) if b.is_signed())
    }

    pub fn is_floating(&self) -> bool {
        matches!(&self.kind, TypeKind::Builtin(b) if b.is_floating())
    }

    pub fn is_integer(&self) -> bool {
        matches!(&self.kind, TypeKind::Builtin(b) if b.is_integer()) || matches!(&self.kind, TypeKind::Enum { .. })
    }

    pub fn is_pointer(&self) -> bool {
        matches!(&self.kind, TypeKind::Pointer { .. })
    }

    pub fn is_array(&self) -> bool {
        matches!(&self.kind, TypeKind::Array { .. })
    }

    pub fn is_struct_or_union(&self) -> bool {
        matches!(&self.kind, TypeKind::Struct { .. } | TypeKind::Union { .. })
    }

    pub fn is_void(&self) -> bool {
        matches!(&self.kind, TypeKind::Builtin(BuiltinKind::Void))
    }

    /// Two struct/union/enum types are the "same declaration" (§4.3
    /// compatibility rule) if they share an AST declaration back-reference,
    /// or, failing that, the same tag name. Only meaningful when both
    /// sides are the same `TypeKind` variant.
    pub fn same_declaration(&self, other: &ResolvedType) -> bool {
        match (&self.kind, &other.kind) {
            (
                TypeKind::Struct { decl: d1, name: n1, .. },
                TypeKind::Struct { decl: d2, name: n2, .. },
            )
            | (
                TypeKind::Union { decl: d1, name: n1, .. },
                TypeKind::Union { decl: d2, name: n2, .. },
            )
            | (
                TypeKind::Enum { decl: d1, name: n1, .. },
                TypeKind::Enum { decl: d2, name: n2, .. },
            ) => match (d1, d2) {
                (Some(a), Some(b)) => a == b,
                _ => n1.is_some() && n1 == n2,
            },
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_sizes() {
        assert_eq!(BuiltinKind::Char.size(), 1);
        assert_eq!(BuiltinKind::Int.size(), 4);
        assert_eq!(BuiltinKind::Double.size(), 8);
        assert_eq!(BuiltinKind::Void.size(), 0);
    }

    #[test]
    fn pointer_size_is_native_width() {
        let rt = ResolvedType::unqualified(TypeKind::Pointer { base: TypeId::INT });
        assert_eq!(rt.size(), 8);
        assert_eq!(rt.align(), 8);
    }

    #[test]
    fn invalid_type_has_zero_size() {
        let rt = ResolvedType::unqualified(TypeKind::Invalid);
        assert_eq!(rt.size(), 0);
        assert!(!rt.is_complete());
    }

    #[test]
    fn same_declaration_by_node() {
        let decl = NodeId(7);
        let a = ResolvedType::unqualified(TypeKind::Struct {
            name: Some("Point".into()),
            decl: Some(decl),
            fields: vec![],
            size: 0,
            align: 1,
            complete: true,
        });
        let b = ResolvedType::unqualified(TypeKind::Struct {
            name: Some("Point".into()),
            decl: Some(decl),
            fields: vec![],
            size: 0,
            align: 1,
            complete: true,
        });
        assert!(a.same_declaration(&b));
    }

    #[test]
    fn different_declaration_not_same() {
        let a = ResolvedType::unqualified(TypeKind::Struct {
            name: Some("Point".into()),
            decl: Some(NodeId(1)),
            fields: vec![],
            size: 0,
            align: 1,
            complete: true,
        });
        let b = ResolvedType::unqualified(TypeKind::Struct {
            name: Some("Other".into()),
            decl: Some(NodeId(2)),
            fields: vec![],
            size: 0,
            align: 1,
            complete: true,
        });
        assert!(!a.same_declaration(&b));
    }

    #[test]
    fn enum_base_is_four_byte_int() {
        let rt = ResolvedType::unqualified(TypeKind::Enum {
            name: Some("Color".into()),
            decl: None,
            base: TypeId::INT,
        });
        assert_eq!(rt.size(), 4);
        assert_eq!(rt.align(), 4);
    }
}
