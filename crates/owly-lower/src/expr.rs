//! Expression lowering (§4.5 "Expression lowering contracts").

use owly_core::{BinaryOp, ExprId, ExprKind, LiteralValue, TypeId, TypeKind, UnaryOp};
use owly_ir::{IROp, IRValue, PhiIncoming};

use crate::cast::determine_cast_op;
use crate::context::FunctionLowerer;
use crate::error::LowerError;

impl<'a, 'b> FunctionLowerer<'a, 'b> {
    /// Lowers `id`. When `is_lvalue` is set, an addressable expression
    /// (identifier, `*p`, member, index) yields its address rather than a
    /// loaded value.
    pub(crate) fn lower_expr(&mut self, id: ExprId, is_lvalue: bool) -> Result<IRValue, LowerError> {
        let expr = self.exprs.get(id);
        let ty = expr.inferred_type;
        match expr.kind.clone() {
            ExprKind::Literal(lit) => Ok(match lit.value {
                LiteralValue::Int(v) => self.module.const_int(v, ty),
                LiteralValue::Float(v) => self.module.const_float(v, ty),
                LiteralValue::Char(c) => self.module.const_int(c as i64, ty),
                LiteralValue::Bool(b) => self.module.const_int(b as i64, ty),
                LiteralValue::Str(s) => {
                    let mut v = self.module.const_string(s);
                    v.ty = ty;
                    v
                }
            }),

            ExprKind::Identifier(name) => {
                if let Some(ptr) = self.func.lookup_var(&name).cloned() {
                    if is_lvalue {
                        Ok(ptr)
                    } else {
                        Ok(self.func.emit_load(self.cur_block, ptr, ty))
                    }
                } else {
                    // §4.5: "Unknown names are lowered as globals." In
                    // practice `owly-sema`'s pass 3 rejects undefined
                    // identifiers before lowering ever runs (§11), so this
                    // branch only fires for genuine module-level globals.
                    Ok(IRValue::global(name, ty))
                }
            }

            ExprKind::Grouping { inner } => self.lower_expr(inner, is_lvalue),

            ExprKind::Unary { op, operand } => self.lower_unary(op, operand, ty, is_lvalue),

            ExprKind::Binary { op, left, right } => self.lower_binary(op, left, right, ty),

            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => self.lower_ternary(cond, then_expr, else_expr, ty),

            ExprKind::Member {
                object,
                member: _,
                is_arrow,
                offset,
            } => self.lower_member(object, is_arrow, offset, ty, is_lvalue),

            ExprKind::Sizeof { computed_size, .. } => {
                Ok(self.module.const_int(computed_size as i64, Some(TypeId::ULONG)))
            }

            ExprKind::Cast { target_type, expr: inner } => {
                let source_ty = self
                    .exprs
                    .get(inner)
                    .inferred_type
                    .ok_or_else(|| LowerError::Internal("cast operand has no inferred type".into()))?;
                let target_ty = self
                    .ast
                    .get(target_type)
                    .resolved_type
                    .ok_or_else(|| LowerError::Internal("cast target has no resolved type".into()))?;
                let source_rt = self.resolved(source_ty)?.clone();
                let target_rt = self.resolved(target_ty)?.clone();
                let value = self.lower_expr(inner, false)?;
                let op = determine_cast_op(&source_rt, &target_rt);
                if op == IROp::Nop {
                    Ok(value)
                } else {
                    Ok(self.func.emit_convert(self.cur_block, op, value, Some(target_ty)))
                }
            }

            ExprKind::Set { .. } => Err(LowerError::Internal(
                "set literals are only lowered as array initializers, never as a bare expression".into(),
            )),

            ExprKind::Index { array, index } => self.lower_index(array, index, ty, is_lvalue),

            ExprKind::Call { callee, args } => self.lower_call(&callee, &args, ty),
        }
    }

    fn lower_unary(
        &mut self,
        op: UnaryOp,
        operand: ExprId,
        ty: Option<TypeId>,
        is_lvalue: bool,
    ) -> Result<IRValue, LowerError> {
        match op {
            UnaryOp::AddrOf => self.lower_expr(operand, true),

            UnaryOp::Deref => {
                let ptr = self.lower_expr(operand, false)?;
                if is_lvalue {
                    Ok(ptr)
                } else {
                    Ok(self.func.emit_load(self.cur_block, ptr, ty))
                }
            }

            UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec => {
                let operand_ty = self.exprs.get(operand).inferred_type;
                let ptr = self.lower_expr(operand, true)?;
                let old = self.func.emit_load(self.cur_block, ptr.clone(), operand_ty);
                let one = self.module.const_int(1, operand_ty);
                let arith = if matches!(op, UnaryOp::PreInc | UnaryOp::PostInc) {
                    IROp::Add
                } else {
                    IROp::Sub
                };
                let new_val = self
                    .func
                    .emit_binary(self.cur_block, arith, old.clone(), one, operand_ty);
                self.func.emit_store(self.cur_block, new_val.clone(), ptr);
                Ok(if matches!(op, UnaryOp::PreInc | UnaryOp::PreDec) {
                    new_val
                } else {
                    old
                })
            }

            UnaryOp::Not => {
                let operand_ty = self.exprs.get(operand).inferred_type;
                let v = self.lower_expr(operand, false)?;
                let zero = self.module.const_int(0, operand_ty);
                Ok(self.func.emit_binary(self.cur_block, IROp::Eq, v, zero, ty))
            }

            UnaryOp::Plus => self.lower_expr(operand, false),

            UnaryOp::Neg => {
                let v = self.lower_expr(operand, false)?;
                Ok(self.func.emit_unary(self.cur_block, IROp::Neg, v, ty))
            }

            UnaryOp::BitNot => {
                let v = self.lower_expr(operand, false)?;
                Ok(self.func.emit_unary(self.cur_block, IROp::Not, v, ty))
            }
        }
    }

    fn lower_binary(
        &mut self,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
        ty: Option<TypeId>,
    ) -> Result<IRValue, LowerError> {
        if op == BinaryOp::Assign {
            let rhs = self.lower_expr(right, false)?;
            let ptr = self.lower_expr(left, true)?;
            self.func.emit_store(self.cur_block, rhs.clone(), ptr);
            return Ok(rhs);
        }

        if let Some(underlying) = op.underlying_op() {
            let lhs_ty = self.exprs.get(left).inferred_type;
            let ptr = self.lower_expr(left, true)?;
            let old = self.func.emit_load(self.cur_block, ptr.clone(), lhs_ty);
            let rhs = self.lower_expr(right, false)?;
            let (lhs_val, rhs_val) = self.scale_pointer_operands(underlying, old, rhs, left, right)?;
            let irop = self.binary_op_to_irop(underlying, left)?;
            let result = self.func.emit_binary(self.cur_block, irop, lhs_val, rhs_val, ty);
            self.func.emit_store(self.cur_block, result.clone(), ptr);
            return Ok(result);
        }

        if matches!(op, BinaryOp::And | BinaryOp::Or) {
            return self.lower_logical(op, left, right, ty);
        }

        let lhs = self.lower_expr(left, false)?;
        let rhs = self.lower_expr(right, false)?;
        let (lhs, rhs) = self.scale_pointer_operands(op, lhs, rhs, left, right)?;
        let irop = self.binary_op_to_irop(op, left)?;
        Ok(self.func.emit_binary(self.cur_block, irop, lhs, rhs, ty))
    }

    /// §4.5 "Pointer arithmetic": when one operand of `+`/`-` is a pointer
    /// and the other an integer, the integer is scaled by the pointee
    /// size first, covering both `ptr +/- int` and `int + ptr`.
    fn scale_pointer_operands(
        &mut self,
        op: BinaryOp,
        lhs: IRValue,
        rhs: IRValue,
        left: ExprId,
        right: ExprId,
    ) -> Result<(IRValue, IRValue), LowerError> {
        if !matches!(op, BinaryOp::Add | BinaryOp::Sub) {
            return Ok((lhs, rhs));
        }
        let left_ty = self.exprs.get(left).inferred_type;
        let right_ty = self.exprs.get(right).inferred_type;
        let left_is_ptr = left_ty.map(|t| self.resolved(t).map(|rt| rt.is_pointer())).transpose()?.unwrap_or(false);
        let right_is_ptr = right_ty
            .map(|t| self.resolved(t).map(|rt| rt.is_pointer()))
            .transpose()?
            .unwrap_or(false);

        if left_is_ptr && !right_is_ptr {
            let elem_size = self.pointee_size(left_ty.unwrap())?;
            if elem_size != 1 {
                let scale = self.module.const_int(elem_size as i64, right_ty);
                let scaled = self.func.emit_binary(self.cur_block, IROp::Mul, rhs, scale, right_ty);
                return Ok((lhs, scaled));
            }
        } else if right_is_ptr && !left_is_ptr && op == BinaryOp::Add {
            let elem_size = self.pointee_size(right_ty.unwrap())?;
            if elem_size != 1 {
                let scale = self.module.const_int(elem_size as i64, left_ty);
                let scaled = self.func.emit_binary(self.cur_block, IROp::Mul, lhs, scale, left_ty);
                return Ok((scaled, rhs));
            }
        }
        Ok((lhs, rhs))
    }

    fn pointee_size(&self, ptr_ty: TypeId) -> Result<u64, LowerError> {
        match &self.resolved(ptr_ty)?.kind {
            TypeKind::Pointer { base } => Ok(self.resolved(*base)?.size()),
            _ => Err(LowerError::Internal("pointer arithmetic on a non-pointer type".into())),
        }
    }

    /// Maps a non-assignment, non-logical [`BinaryOp`] to its opcode.
    /// Comparisons are always lowered to their signed form (§4.5:
    /// "comparisons always signed"); `/`, `%`, and `>>` pick the
    /// signed/unsigned variant from the left operand's signedness.
    fn binary_op_to_irop(&self, op: BinaryOp, left: ExprId) -> Result<IROp, LowerError> {
        use BinaryOp::*;
        let signed = match self.exprs.get(left).inferred_type {
            Some(t) => self.resolved(t)?.is_signed(),
            None => true,
        };
        Ok(match op {
            Add => IROp::Add,
            Sub => IROp::Sub,
            Mul => IROp::Mul,
            Div => {
                if signed {
                    IROp::SDiv
                } else {
                    IROp::UDiv
                }
            }
            Mod => {
                if signed {
                    IROp::SMod
                } else {
                    IROp::UMod
                }
            }
            Eq => IROp::Eq,
            Ne => IROp::Ne,
            Lt => IROp::Slt,
            Le => IROp::Sle,
            Gt => IROp::Sgt,
            Ge => IROp::Sge,
            BitAnd => IROp::And,
            BitOr => IROp::Or,
            BitXor => IROp::Xor,
            Shl => IROp::Shl,
            Shr => {
                if signed {
                    IROp::Sar
                } else {
                    IROp::Shr
                }
            }
            And | Or => {
                return Err(LowerError::Internal("logical operators are lowered separately".into()));
            }
            _ if op.is_assignment() => {
                return Err(LowerError::Internal("assignment operators are lowered separately".into()));
            }
            _ => unreachable!("all BinaryOp variants are covered above"),
        })
    }

    /// §4.5/§9: short-circuit `&&`/`||` via a right-hand evaluation block
    /// and a merge block, selecting 0/1 from the original block or the
    /// right operand's value from the right block via a 2-incoming phi.
    fn lower_logical(
        &mut self,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
        ty: Option<TypeId>,
    ) -> Result<IRValue, LowerError> {
        let left_val = self.lower_expr(left, false)?;
        let origin = self.cur_block;
        let right_block = self.func.create_block(Some("logical.rhs"));
        let merge_block = self.func.create_block(Some("logical.merge"));

        let short_circuit_ty = self.exprs.get(left).inferred_type;
        let short_circuit_value = if op == BinaryOp::And {
            self.module.const_int(0, short_circuit_ty)
        } else {
            self.module.const_int(1, short_circuit_ty)
        };

        if op == BinaryOp::And {
            self.func.emit_branch(origin, left_val, right_block, merge_block);
        } else {
            self.func.emit_branch(origin, left_val, merge_block, right_block);
        }

        self.cur_block = right_block;
        let right_val = self.lower_expr(right, false)?;
        let right_end = self.cur_block;
        if !self.is_current_block_terminated() {
            self.func.emit_jump(right_end, merge_block);
        }

        self.cur_block = merge_block;
        Ok(self.func.emit_phi(
            merge_block,
            vec![
                PhiIncoming {
                    value: short_circuit_value,
                    block: origin,
                },
                PhiIncoming {
                    value: right_val,
                    block: right_end,
                },
            ],
            ty,
        ))
    }

    fn lower_ternary(
        &mut self,
        cond: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
        ty: Option<TypeId>,
    ) -> Result<IRValue, LowerError> {
        let cond_val = self.lower_expr(cond, false)?;
        let origin = self.cur_block;
        let then_block = self.func.create_block(Some("ternary.then"));
        let else_block = self.func.create_block(Some("ternary.else"));
        let merge_block = self.func.create_block(Some("ternary.merge"));
        self.func.emit_branch(origin, cond_val, then_block, else_block);

        self.cur_block = then_block;
        let then_val = self.lower_expr(then_expr, false)?;
        let then_end = self.cur_block;
        if !self.is_current_block_terminated() {
            self.func.emit_jump(then_end, merge_block);
        }

        self.cur_block = else_block;
        let else_val = self.lower_expr(else_expr, false)?;
        let else_end = self.cur_block;
        if !self.is_current_block_terminated() {
            self.func.emit_jump(else_end, merge_block);
        }

        self.cur_block = merge_block;
        Ok(self.func.emit_phi(
            merge_block,
            vec![
                PhiIncoming {
                    value: then_val,
                    block: then_end,
                },
                PhiIncoming {
                    value: else_val,
                    block: else_end,
                },
            ],
            ty,
        ))
    }

    /// §4.5 "Member access": `offset == 0` reuses the base pointer directly
    /// rather than emitting a trivial `+ 0` (§11 Open Question decision).
    fn lower_member(
        &mut self,
        object: ExprId,
        is_arrow: bool,
        offset: u64,
        ty: Option<TypeId>,
        is_lvalue: bool,
    ) -> Result<IRValue, LowerError> {
        let base_ptr = self.lower_expr(object, !is_arrow)?;
        let field_ptr = if offset > 0 {
            let off_const = self.module.const_int(offset as i64, Some(TypeId::ULONG));
            self.func.emit_binary(self.cur_block, IROp::Add, base_ptr, off_const, None)
        } else {
            base_ptr
        };
        if is_lvalue {
            Ok(field_ptr)
        } else {
            Ok(self.func.emit_load(self.cur_block, field_ptr, ty))
        }
    }

    fn lower_index(
        &mut self,
        array: ExprId,
        index: ExprId,
        ty: Option<TypeId>,
        is_lvalue: bool,
    ) -> Result<IRValue, LowerError> {
        let base_ptr = self.lower_expr(array, true)?;
        let idx_val = self.lower_expr(index, false)?;
        let elem_size = self.resolved(ty.ok_or_else(|| LowerError::Internal("index expr has no inferred type".into()))?)?.size();
        let size_const = self.module.const_int(elem_size as i64, Some(TypeId::ULONG));
        let byte_offset = self
            .func
            .emit_binary(self.cur_block, IROp::Mul, idx_val, size_const, Some(TypeId::ULONG));
        let elem_ptr = self.func.emit_binary(self.cur_block, IROp::Add, base_ptr, byte_offset, None);
        if is_lvalue {
            Ok(elem_ptr)
        } else {
            Ok(self.func.emit_load(self.cur_block, elem_ptr, ty))
        }
    }

    fn lower_call(&mut self, callee: &str, args: &[ExprId], ty: Option<TypeId>) -> Result<IRValue, LowerError> {
        let mut arg_vals = Vec::with_capacity(args.len());
        for &a in args {
            arg_vals.push(self.lower_expr(a, false)?);
        }
        // §4.5: "produce a global reference for the callee name". This
        // value is not registered into any module list at all (see
        // DESIGN.md); only top-level variable declarations become module
        // globals.
        let callee_val = IRValue::global(callee, None);
        Ok(self.func.emit_call(self.cur_block, callee_val, arg_vals, ty))
    }
}
