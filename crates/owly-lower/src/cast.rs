//! Cast opcode selection (§4.5 "Cast").

use owly_core::{ResolvedType, TypeKind};
use owly_ir::IROp;

/// Chooses the conversion opcode for casting a value of type `source` to
/// type `target`: identical kind+size is a no-op, then pointer involvement,
/// then enum involvement, then the builtin int/float matrix, defaulting to
/// `bitcast`.
pub fn determine_cast_op(source: &ResolvedType, target: &ResolvedType) -> IROp {
    if same_kind_and_size(source, target) {
        return IROp::Nop;
    }
    if source.is_pointer() || target.is_pointer() {
        return IROp::Bitcast;
    }
    if is_enum(source) || is_enum(target) {
        return IROp::Bitcast;
    }
    match (&source.kind, &target.kind) {
        (TypeKind::Builtin(s), TypeKind::Builtin(t)) => {
            match (s.is_floating(), t.is_floating()) {
                (false, true) => {
                    if s.is_signed() {
                        IROp::Sitofp
                    } else {
                        IROp::Uitofp
                    }
                }
                (true, false) => {
                    if t.is_signed() {
                        IROp::Fptosi
                    } else {
                        IROp::Fptoui
                    }
                }
                (false, false) => match source.size().cmp(&target.size()) {
                    std::cmp::Ordering::Less => {
                        if s.is_signed() {
                            IROp::Sext
                        } else {
                            IROp::Zext
                        }
                    }
                    std::cmp::Ordering::Greater => IROp::Trunc,
                    std::cmp::Ordering::Equal => IROp::Bitcast,
                },
                (true, true) => IROp::Bitcast,
            }
        }
        _ => IROp::Bitcast,
    }
}

fn same_kind_and_size(source: &ResolvedType, target: &ResolvedType) -> bool {
    std::mem::discriminant(&source.kind) == std::mem::discriminant(&target.kind)
        && source.size() == target.size()
}

fn is_enum(ty: &ResolvedType) -> bool {
    matches!(ty.kind, TypeKind::Enum { .. })
}

#[cfg(test)]
mod tests {
    use super::*;
    use owly_core::BuiltinKind;

    fn builtin(kind: BuiltinKind) -> ResolvedType {
        ResolvedType::unqualified(TypeKind::Builtin(kind))
    }

    #[test]
    fn identical_builtin_is_nop() {
        let int_ty = builtin(BuiltinKind::Int);
        assert_eq!(determine_cast_op(&int_ty, &int_ty), IROp::Nop);
    }

    #[test]
    fn widening_signed_int_is_sext() {
        let short_ty = builtin(BuiltinKind::Short);
        let long_ty = builtin(BuiltinKind::Long);
        assert_eq!(determine_cast_op(&short_ty, &long_ty), IROp::Sext);
    }

    #[test]
    fn widening_unsigned_int_is_zext() {
        let ushort_ty = builtin(BuiltinKind::UShort);
        let ulong_ty = builtin(BuiltinKind::ULong);
        assert_eq!(determine_cast_op(&ushort_ty, &ulong_ty), IROp::Zext);
    }

    #[test]
    fn narrowing_int_is_trunc() {
        let long_ty = builtin(BuiltinKind::Long);
        let int_ty = builtin(BuiltinKind::Int);
        assert_eq!(determine_cast_op(&long_ty, &int_ty), IROp::Trunc);
    }

    #[test]
    fn signed_int_to_float_is_sitofp() {
        let int_ty = builtin(BuiltinKind::Int);
        let double_ty = builtin(BuiltinKind::Double);
        assert_eq!(determine_cast_op(&int_ty, &double_ty), IROp::Sitofp);
    }

    #[test]
    fn unsigned_int_to_float_is_uitofp() {
        let uint_ty = builtin(BuiltinKind::UInt);
        let float_ty = builtin(BuiltinKind::Float);
        assert_eq!(determine_cast_op(&uint_ty, &float_ty), IROp::Uitofp);
    }

    #[test]
    fn float_to_signed_int_is_fptosi() {
        let double_ty = builtin(BuiltinKind::Double);
        let int_ty = builtin(BuiltinKind::Int);
        assert_eq!(determine_cast_op(&double_ty, &int_ty), IROp::Fptosi);
    }

    #[test]
    fn float_to_unsigned_int_is_fptoui() {
        let double_ty = builtin(BuiltinKind::Double);
        let uint_ty = builtin(BuiltinKind::UInt);
        assert_eq!(determine_cast_op(&double_ty, &uint_ty), IROp::Fptoui);
    }

    #[test]
    fn pointer_cast_is_bitcast() {
        let ptr_a = ResolvedType::unqualified(TypeKind::Pointer { base: owly_core::TypeId::INT });
        let ptr_b = ResolvedType::unqualified(TypeKind::Pointer { base: owly_core::TypeId::CHAR });
        assert_eq!(determine_cast_op(&ptr_a, &ptr_b), IROp::Bitcast);
    }

    #[test]
    fn different_size_float_is_bitcast() {
        let float_ty = builtin(BuiltinKind::Float);
        let double_ty = builtin(BuiltinKind::Double);
        assert_eq!(determine_cast_op(&float_ty, &double_ty), IROp::Bitcast);
    }
}
