//! Statement lowering (§4.5 "Statement lowering contracts").

use owly_core::{ElifClause, ExprId, ExprKind, NodeId, NodeKind, SwitchCase, TypeId, TypeKind};
use owly_ir::IROp;

use crate::context::FunctionLowerer;
use crate::error::LowerError;

impl<'a, 'b> FunctionLowerer<'a, 'b> {
    pub(crate) fn lower_stmt(&mut self, id: NodeId) -> Result<(), LowerError> {
        let kind = self.ast.get(id).kind.clone();
        match kind {
            NodeKind::VarDecl { init, .. } => self.lower_var_decl(id, init),

            NodeKind::Array { name, init, .. } => self.lower_array_decl(id, &name, init),

            NodeKind::Return { value } => {
                let v = match value {
                    Some(e) => Some(self.lower_expr(e, false)?),
                    None => None,
                };
                self.func.emit_return(self.cur_block, v);
                Ok(())
            }

            NodeKind::ExprStmt { expr } => {
                self.lower_expr(expr, false)?;
                Ok(())
            }

            NodeKind::If {
                cond,
                body,
                elifs,
                else_body,
            } => self.lower_if(cond, &body, &elifs, else_body.as_deref()),

            NodeKind::While { cond, body } => self.lower_while(cond, &body),

            NodeKind::DoWhile { body, cond } => self.lower_do_while(&body, cond),

            NodeKind::For { init, cond, inc, body } => self.lower_for(init, cond, inc, &body),

            NodeKind::Switch {
                scrutinee,
                cases,
                default_body,
            } => self.lower_switch(scrutinee, &cases, default_body.as_deref()),

            NodeKind::Misc { kind } => self.lower_misc(kind),

            // Local type declarations affect only the type system; they
            // produce no IR of their own.
            NodeKind::EnumDecl { .. }
            | NodeKind::StructDecl { .. }
            | NodeKind::UnionDecl { .. }
            | NodeKind::Typedef { .. }
            | NodeKind::TypeNode { .. } => Ok(()),

            NodeKind::Program { .. } | NodeKind::FuncDecl { .. } => Err(LowerError::Internal(
                "a Program or FuncDecl node cannot appear inside a function body".into(),
            )),
        }
    }

    fn lower_var_decl(&mut self, node: NodeId, init: Option<ExprId>) -> Result<(), LowerError> {
        let name = match &self.ast.get(node).kind {
            NodeKind::VarDecl { name, .. } => name.clone(),
            _ => unreachable!(),
        };
        let resolved_ty = self
            .ast
            .get(node)
            .resolved_type
            .ok_or_else(|| LowerError::Internal("var decl has no resolved type".into()))?;
        let rt = self.resolved(resolved_ty)?;
        let (size, align) = (rt.size(), rt.align());
        let ptr = self.func.emit_alloca(self.cur_block, Some(resolved_ty), size, align);
        self.func.bind_var(name, ptr.clone());
        if let Some(init_expr) = init {
            let val = self.lower_expr(init_expr, false)?;
            self.func.emit_store(self.cur_block, val, ptr);
        }
        Ok(())
    }

    fn lower_array_decl(&mut self, node: NodeId, name: &str, init: Option<ExprId>) -> Result<(), LowerError> {
        let resolved_ty = self
            .ast
            .get(node)
            .resolved_type
            .ok_or_else(|| LowerError::Internal("array decl has no resolved type".into()))?;
        let rt = self.resolved(resolved_ty)?;
        let (elem_size, size, align) = match &rt.kind {
            TypeKind::Array { element, size, align, .. } => (self.resolved(*element)?.size(), *size, *align),
            _ => return Err(LowerError::Internal("array decl did not resolve to an array type".into())),
        };
        let base = self.func.emit_alloca(self.cur_block, Some(resolved_ty), size, align);
        self.func.bind_var(name.to_string(), base.clone());
        if let Some(init_expr) = init {
            let elements = self.flatten_set(init_expr)?;
            for (i, elem_expr) in elements.into_iter().enumerate() {
                let val = self.lower_expr(elem_expr, false)?;
                let elem_ptr = if i == 0 {
                    base.clone()
                } else {
                    let off = self.module.const_int((i as u64 * elem_size) as i64, Some(TypeId::ULONG));
                    self.func.emit_binary(self.cur_block, IROp::Add, base.clone(), off, None)
                };
                self.func.emit_store(self.cur_block, val, elem_ptr);
            }
        }
        Ok(())
    }

    /// Recursively flattens nested `{ ... }` set literals into a linear
    /// element sequence.
    fn flatten_set(&self, id: ExprId) -> Result<Vec<ExprId>, LowerError> {
        match &self.exprs.get(id).kind {
            ExprKind::Set { elements } => {
                let mut out = Vec::new();
                for &e in elements {
                    match &self.exprs.get(e).kind {
                        ExprKind::Set { .. } => out.extend(self.flatten_set(e)?),
                        _ => out.push(e),
                    }
                }
                Ok(out)
            }
            _ => Err(LowerError::Internal("array initializer must be a set expression".into())),
        }
    }

    fn lower_if(
        &mut self,
        cond: ExprId,
        body: &[NodeId],
        elifs: &[ElifClause],
        else_body: Option<&[NodeId]>,
    ) -> Result<(), LowerError> {
        let cond_val = self.lower_expr(cond, false)?;
        let origin = self.cur_block;
        let then_block = self.func.create_block(Some("if.then"));
        let merge_block = self.func.create_block(Some("if.merge"));
        let has_else = !elifs.is_empty() || else_body.is_some();
        let else_block = if has_else {
            Some(self.func.create_block(Some("if.else")))
        } else {
            None
        };
        self.func
            .emit_branch(origin, cond_val, then_block, else_block.unwrap_or(merge_block));

        self.cur_block = then_block;
        for &s in body {
            self.lower_stmt(s)?;
        }
        if !self.is_current_block_terminated() {
            let end = self.cur_block;
            self.func.emit_jump(end, merge_block);
        }

        if let Some(else_blk) = else_block {
            self.cur_block = else_blk;
            if let Some((first_elif, rest_elifs)) = elifs.split_first() {
                self.lower_if(first_elif.cond, &first_elif.body, rest_elifs, else_body)?;
            } else if let Some(else_stmts) = else_body {
                for &s in else_stmts {
                    self.lower_stmt(s)?;
                }
            }
            if !self.is_current_block_terminated() {
                let end = self.cur_block;
                self.func.emit_jump(end, merge_block);
            }
        }

        self.cur_block = merge_block;
        Ok(())
    }

    fn lower_while(&mut self, cond: ExprId, body: &[NodeId]) -> Result<(), LowerError> {
        let origin = self.cur_block;
        let cond_block = self.func.create_block(Some("while.cond"));
        let body_block = self.func.create_block(Some("while.body"));
        let exit_block = self.func.create_block(Some("while.exit"));
        self.func.emit_jump(origin, cond_block);

        self.cur_block = cond_block;
        let cond_val = self.lower_expr(cond, false)?;
        self.func.emit_branch(self.cur_block, cond_val, body_block, exit_block);

        self.cur_block = body_block;
        self.push_loop(cond_block, exit_block);
        for &s in body {
            self.lower_stmt(s)?;
        }
        self.pop_loop();
        if !self.is_current_block_terminated() {
            let end = self.cur_block;
            self.func.emit_jump(end, cond_block);
        }

        self.cur_block = exit_block;
        Ok(())
    }

    fn lower_do_while(&mut self, body: &[NodeId], cond: ExprId) -> Result<(), LowerError> {
        let origin = self.cur_block;
        let body_block = self.func.create_block(Some("dowhile.body"));
        let cond_block = self.func.create_block(Some("dowhile.cond"));
        let exit_block = self.func.create_block(Some("dowhile.exit"));
        self.func.emit_jump(origin, body_block);

        self.cur_block = body_block;
        self.push_loop(cond_block, exit_block);
        for &s in body {
            self.lower_stmt(s)?;
        }
        self.pop_loop();
        if !self.is_current_block_terminated() {
            let end = self.cur_block;
            self.func.emit_jump(end, cond_block);
        }

        self.cur_block = cond_block;
        let cond_val = self.lower_expr(cond, false)?;
        self.func.emit_branch(self.cur_block, cond_val, body_block, exit_block);

        self.cur_block = exit_block;
        Ok(())
    }

    fn lower_for(
        &mut self,
        init: Option<NodeId>,
        cond: Option<NodeId>,
        inc: Option<ExprId>,
        body: &[NodeId],
    ) -> Result<(), LowerError> {
        if let Some(init_node) = init {
            self.lower_stmt(init_node)?;
        }
        let origin = self.cur_block;
        let cond_block = self.func.create_block(Some("for.cond"));
        let body_block = self.func.create_block(Some("for.body"));
        let inc_block = self.func.create_block(Some("for.inc"));
        let exit_block = self.func.create_block(Some("for.exit"));
        self.func.emit_jump(origin, cond_block);

        self.cur_block = cond_block;
        match cond {
            Some(cond_node) => {
                let cond_expr = match &self.ast.get(cond_node).kind {
                    NodeKind::ExprStmt { expr } => *expr,
                    _ => return Err(LowerError::Internal("for-loop condition is not an expression statement".into())),
                };
                let cond_val = self.lower_expr(cond_expr, false)?;
                self.func.emit_branch(self.cur_block, cond_val, body_block, exit_block);
            }
            None => {
                self.func.emit_jump(self.cur_block, body_block);
            }
        }

        self.cur_block = body_block;
        self.push_loop(inc_block, exit_block);
        for &s in body {
            self.lower_stmt(s)?;
        }
        self.pop_loop();
        if !self.is_current_block_terminated() {
            let end = self.cur_block;
            self.func.emit_jump(end, inc_block);
        }

        self.cur_block = inc_block;
        if let Some(inc_expr) = inc {
            self.lower_expr(inc_expr, false)?;
        }
        if !self.is_current_block_terminated() {
            let end = self.cur_block;
            self.func.emit_jump(end, cond_block);
        }

        self.cur_block = exit_block;
        Ok(())
    }

    /// §4.5 "Switch": chained equality comparisons, no C fall-through --
    /// each case implicitly jumps to the exit block (documented deviation).
    fn lower_switch(
        &mut self,
        scrutinee: ExprId,
        cases: &[SwitchCase],
        default_body: Option<&[NodeId]>,
    ) -> Result<(), LowerError> {
        let scrutinee_val = self.lower_expr(scrutinee, false)?;
        let exit_block = self.func.create_block(Some("switch.exit"));
        let default_block = default_body.map(|_| self.func.create_block(Some("switch.default")));
        let case_blocks: Vec<_> = cases
            .iter()
            .map(|_| self.func.create_block(Some("switch.case")))
            .collect();

        if cases.is_empty() {
            let end = self.cur_block;
            self.func.emit_jump(end, default_block.unwrap_or(exit_block));
        }

        for (i, case) in cases.iter().enumerate() {
            let case_val = self.lower_expr(case.value, false)?;
            let cmp = self
                .func
                .emit_binary(self.cur_block, IROp::Eq, scrutinee_val.clone(), case_val, Some(TypeId::BOOL));
            let next_check = if i + 1 < cases.len() {
                self.func.create_block(Some("switch.check"))
            } else {
                default_block.unwrap_or(exit_block)
            };
            self.func.emit_branch(self.cur_block, cmp, case_blocks[i], next_check);
            self.cur_block = next_check;
        }

        let continue_target = self
            .innermost_loop()
            .map(|l| l.continue_target)
            .unwrap_or(exit_block);
        self.push_loop(continue_target, exit_block);

        for (i, case) in cases.iter().enumerate() {
            self.cur_block = case_blocks[i];
            for &s in &case.body {
                self.lower_stmt(s)?;
            }
            if !self.is_current_block_terminated() {
                let end = self.cur_block;
                self.func.emit_jump(end, exit_block);
            }
        }
        if let Some(default_blk) = default_block {
            self.cur_block = default_blk;
            for &s in default_body.unwrap() {
                self.lower_stmt(s)?;
            }
            if !self.is_current_block_terminated() {
                let end = self.cur_block;
                self.func.emit_jump(end, exit_block);
            }
        }
        self.pop_loop();

        self.cur_block = exit_block;
        Ok(())
    }

    fn lower_misc(&mut self, kind: owly_core::MiscKind) -> Result<(), LowerError> {
        use owly_core::MiscKind;
        match kind {
            MiscKind::Break => {
                let target = self
                    .innermost_loop()
                    .ok_or(LowerError::BreakOutsideLoop)?
                    .break_target;
                self.func.emit_jump(self.cur_block, target);
            }
            MiscKind::Continue => {
                let target = self
                    .innermost_loop()
                    .ok_or(LowerError::ContinueOutsideLoop)?
                    .continue_target;
                self.func.emit_jump(self.cur_block, target);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use owly_core::{Ast, ExprKind, ExprPool, Literal, LiteralKind, LiteralValue, MiscKind, TypeSpec};
    use owly_ir::{BlockId, IRFunction, IRInstrKind, IRModule};
    use owly_sema::SemanticContext;
    use pretty_assertions::assert_eq;

    fn int_literal(exprs: &mut ExprPool, value: i64) -> ExprId {
        let id = exprs.push(ExprKind::Literal(Literal {
            kind: LiteralKind::Int,
            raw: value.to_string(),
            value: LiteralValue::Int(value),
        }));
        exprs.get_mut(id).inferred_type = Some(TypeId::INT);
        id
    }

    fn int_type_node(ast: &mut Ast) -> NodeId {
        let ty = ast.push(NodeKind::TypeNode {
            spec: TypeSpec::default(),
            base: owly_core::TypeBase::Name("int".into()),
        });
        ast.get_mut(ty).resolved_type = Some(TypeId::INT);
        ty
    }

    fn fixture() -> (Ast, ExprPool, SemanticContext, IRModule, IRFunction) {
        let ast = Ast::new();
        let exprs = ExprPool::new();
        let sema = SemanticContext::default();
        let module = IRModule::new("t.owly");
        let func = IRFunction::new("f", TypeId::INT, Vec::new());
        (ast, exprs, sema, module, func)
    }

    #[test]
    fn var_decl_with_initializer_allocas_and_stores() {
        let (mut ast, mut exprs, sema, mut module, func) = fixture();
        let init = int_literal(&mut exprs, 5);
        let decl = ast.push(NodeKind::VarDecl {
            ty: int_type_node(&mut ast),
            name: "x".into(),
            init: Some(init),
        });
        ast.get_mut(decl).resolved_type = Some(TypeId::INT);

        let mut lowerer = FunctionLowerer::new(&ast, &exprs, &sema, &mut module, func);
        let entry = lowerer.cur_block;
        lowerer.lower_stmt(decl).unwrap();

        assert!(lowerer.func.lookup_var("x").is_some());
        let instrs = &lowerer.func.block(entry).instrs;
        assert!(matches!(instrs[0].kind, IRInstrKind::Alloca { .. }));
        assert!(matches!(instrs[1].kind, IRInstrKind::Store { .. }));
    }

    /// S7: a `for` loop's `break` jumps straight to the exit block, never
    /// through the increment block.
    #[test]
    fn for_loop_break_targets_exit_not_increment() {
        let (mut ast, exprs, sema, mut module, func) = fixture();
        let brk = ast.push(NodeKind::Misc { kind: MiscKind::Break });

        let mut lowerer = FunctionLowerer::new(&ast, &exprs, &sema, &mut module, func);
        lowerer.lower_for(None, None, None, &[brk]).unwrap();

        // Blocks created, in order: cond(1), body(2), inc(3), exit(4).
        let body = BlockId(2);
        let exit = BlockId(4);
        assert!(matches!(
            lowerer.func.block(body).instrs.last().unwrap().kind,
            IRInstrKind::Jump { target } if target == exit
        ));
    }

    #[test]
    fn while_loop_wires_cond_body_and_exit_blocks() {
        let (ast, mut exprs, sema, mut module, func) = fixture();
        let cond = int_literal(&mut exprs, 1);

        let mut lowerer = FunctionLowerer::new(&ast, &exprs, &sema, &mut module, func);
        let entry = lowerer.cur_block;
        lowerer.lower_while(cond, &[]).unwrap();

        assert!(matches!(
            lowerer.func.block(entry).instrs.last().unwrap().kind,
            IRInstrKind::Jump { .. }
        ));
        let cond_block = BlockId(1);
        assert!(matches!(
            lowerer.func.block(cond_block).instrs.last().unwrap().kind,
            IRInstrKind::Branch { .. }
        ));
        // cur_block is left on the exit block once the loop is lowered.
        assert_eq!(lowerer.cur_block, BlockId(3));
    }

    #[test]
    fn break_outside_any_loop_is_an_error() {
        let (ast, exprs, sema, mut module, func) = fixture();
        let mut lowerer = FunctionLowerer::new(&ast, &exprs, &sema, &mut module, func);
        let err = lowerer.lower_misc(MiscKind::Break).unwrap_err();
        assert!(matches!(err, LowerError::BreakOutsideLoop));
    }

    #[test]
    fn switch_with_two_cases_and_a_default_chains_equality_checks() {
        let (mut ast, mut exprs, sema, mut module, func) = fixture();
        let scrutinee = int_literal(&mut exprs, 0);
        let case_a_val = int_literal(&mut exprs, 1);
        let case_b_val = int_literal(&mut exprs, 2);
        let case_a_body = ast.push(NodeKind::Misc { kind: MiscKind::Break });
        let case_b_body = ast.push(NodeKind::Misc { kind: MiscKind::Break });
        let cases = vec![
            SwitchCase {
                value: case_a_val,
                body: vec![case_a_body],
            },
            SwitchCase {
                value: case_b_val,
                body: vec![case_b_body],
            },
        ];
        let default_body = vec![ast.push(NodeKind::Misc { kind: MiscKind::Break })];

        let mut lowerer = FunctionLowerer::new(&ast, &exprs, &sema, &mut module, func);
        lowerer
            .lower_switch(scrutinee, &cases, Some(&default_body))
            .unwrap();

        // check(0), check(1)-unreachable-skip since only 1 intermediate
        // check block is created between two cases, default, case x2, exit:
        // the function must at least have produced the case/default/exit
        // blocks plus the one intermediate check block.
        assert!(lowerer.func.blocks.len() >= 6);
        assert!(matches!(
            lowerer.func.block(lowerer.func.entry).instrs.last().unwrap().kind,
            IRInstrKind::Branch { .. }
        ));
    }

    #[test]
    fn switch_break_inside_a_case_jumps_to_switch_exit_not_an_enclosing_loop() {
        let (mut ast, mut exprs, sema, mut module, func) = fixture();
        let outer_cond = int_literal(&mut exprs, 1);
        let scrutinee = int_literal(&mut exprs, 0);
        let case_val = int_literal(&mut exprs, 1);
        let case_break = ast.push(NodeKind::Misc { kind: MiscKind::Break });
        let cases = vec![SwitchCase {
            value: case_val,
            body: vec![case_break],
        }];
        let switch_stmt = ast.push(NodeKind::Switch {
            scrutinee,
            cases: cases.clone(),
            default_body: None,
        });

        let mut lowerer = FunctionLowerer::new(&ast, &exprs, &sema, &mut module, func);
        lowerer.lower_while(outer_cond, &[switch_stmt]).unwrap();

        // Blocks, in creation order: entry(0), while.cond(1), while.body(2),
        // while.exit(3), switch.exit(4), switch.case(5). The case's break
        // must jump to the switch's own exit(4), not the while's cond(1) or
        // its exit(3).
        let case_block = BlockId(5);
        let switch_exit = BlockId(4);
        assert!(matches!(
            lowerer.func.block(case_block).instrs.last().unwrap().kind,
            IRInstrKind::Jump { target } if target == switch_exit
        ));
    }
}
