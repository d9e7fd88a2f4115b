//! IR functions and the construction primitives of §4.4.
//!
//! An [`IRFunction`] is constructed and lowered standalone, then handed to
//! [`crate::module::IRModule::add_function`] once complete, rather than
//! living mutably inside the module's function list while being built --
//! that would force the lowerer to hold two live mutable borrows (the
//! in-progress function plus the module, for globals/string constants) at
//! once.

use std::collections::HashMap;

use owly_core::TypeId;
use serde::{Deserialize, Serialize};

use crate::block::IRBasicBlock;
use crate::id::{BlockId, ValueId};
use crate::instr::{IRInstr, IRInstrKind, IROp, PhiIncoming};
use crate::value::IRValue;

/// A function: its signature, basic blocks, and the bookkeeping lowering
/// needs -- the variable map and the temp/label counters (§3 "IRFunction").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IRFunction {
    pub name: String,
    pub return_type: TypeId,
    pub params: Vec<(String, TypeId)>,
    pub entry: BlockId,
    pub blocks: Vec<IRBasicBlock>,
    /// Source identifier -> alloca'd stack pointer value (§4.5).
    pub var_map: HashMap<String, IRValue>,
    /// Every temp value created in this function, owned here so the
    /// function (not a borrowed arena) is the resource owner.
    pub values: Vec<IRValue>,
    temp_counter: u32,
    label_counter: u32,
}

impl IRFunction {
    /// Creates a function with a single empty `entry` block already attached.
    pub fn new(name: impl Into<String>, return_type: TypeId, params: Vec<(String, TypeId)>) -> Self {
        let mut func = IRFunction {
            name: name.into(),
            return_type,
            params,
            entry: BlockId(0),
            blocks: Vec::new(),
            var_map: HashMap::new(),
            values: Vec::new(),
            temp_counter: 0,
            label_counter: 0,
        };
        func.entry = func.create_block(Some("entry"));
        func
    }

    pub fn create_block(&mut self, name: Option<&str>) -> BlockId {
        let id = BlockId(self.label_counter);
        self.label_counter += 1;
        self.blocks.push(IRBasicBlock::new(id, name.map(str::to_string)));
        id
    }

    pub fn create_temp(&mut self, ty: Option<TypeId>) -> IRValue {
        let id = ValueId(self.temp_counter);
        self.temp_counter += 1;
        let value = IRValue::temp(id, ty);
        self.values.push(value.clone());
        value
    }

    pub fn block(&self, id: BlockId) -> &IRBasicBlock {
        &self.blocks[id.0 as usize]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut IRBasicBlock {
        &mut self.blocks[id.0 as usize]
    }

    pub fn bind_var(&mut self, name: impl Into<String>, ptr: IRValue) {
        self.var_map.insert(name.into(), ptr);
    }

    pub fn lookup_var(&self, name: &str) -> Option<&IRValue> {
        self.var_map.get(name)
    }

    fn emit(&mut self, block: BlockId, kind: IRInstrKind, dest: Option<ValueId>) {
        self.block_mut(block).push(IRInstr { kind, dest });
    }

    pub fn emit_alloca(&mut self, block: BlockId, ty: Option<TypeId>, size: u64, align: u64) -> IRValue {
        let ptr = self.create_temp(ty);
        self.emit(block, IRInstrKind::Alloca { size, align }, ptr.id);
        ptr
    }

    pub fn emit_load(&mut self, block: BlockId, ptr: IRValue, ty: Option<TypeId>) -> IRValue {
        let dest = self.create_temp(ty);
        self.emit(block, IRInstrKind::Load { ptr }, dest.id);
        dest
    }

    pub fn emit_store(&mut self, block: BlockId, value: IRValue, ptr: IRValue) {
        self.emit(block, IRInstrKind::Store { value, ptr }, None);
    }

    pub fn emit_binary(&mut self, block: BlockId, op: IROp, lhs: IRValue, rhs: IRValue, ty: Option<TypeId>) -> IRValue {
        let dest = self.create_temp(ty);
        self.emit(block, IRInstrKind::Binary { op, lhs, rhs }, dest.id);
        dest
    }

    pub fn emit_unary(&mut self, block: BlockId, op: IROp, operand: IRValue, ty: Option<TypeId>) -> IRValue {
        let dest = self.create_temp(ty);
        self.emit(block, IRInstrKind::Unary { op, operand }, dest.id);
        dest
    }

    pub fn emit_convert(&mut self, block: BlockId, op: IROp, source: IRValue, ty: Option<TypeId>) -> IRValue {
        let dest = self.create_temp(ty);
        self.emit(block, IRInstrKind::Convert { op, source }, dest.id);
        dest
    }

    pub fn emit_jump(&mut self, block: BlockId, target: BlockId) {
        self.emit(block, IRInstrKind::Jump { target }, None);
    }

    pub fn emit_branch(&mut self, block: BlockId, cond: IRValue, then_block: BlockId, else_block: BlockId) {
        self.emit(
            block,
            IRInstrKind::Branch {
                cond,
                then_block,
                else_block,
            },
            None,
        );
    }

    pub fn emit_return(&mut self, block: BlockId, value: Option<IRValue>) {
        self.emit(block, IRInstrKind::Return { value }, None);
    }

    pub fn emit_call(&mut self, block: BlockId, callee: IRValue, args: Vec<IRValue>, ty: Option<TypeId>) -> IRValue {
        let dest = self.create_temp(ty);
        self.emit(block, IRInstrKind::Call { callee, args }, dest.id);
        dest
    }

    pub fn emit_phi(&mut self, block: BlockId, incoming: Vec<PhiIncoming>, ty: Option<TypeId>) -> IRValue {
        let dest = self.create_temp(ty);
        self.emit(block, IRInstrKind::Phi { incoming }, dest.id);
        dest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_function_has_an_entry_block() {
        let func = IRFunction::new("main", TypeId::INT, vec![]);
        assert_eq!(func.blocks.len(), 1);
        assert_eq!(func.entry, BlockId(0));
        assert_eq!(func.block(func.entry).name.as_deref(), Some("entry"));
    }

    #[test]
    fn create_block_assigns_sequential_ids() {
        let mut func = IRFunction::new("f", TypeId::VOID, vec![]);
        let a = func.create_block(Some("a"));
        let b = func.create_block(Some("b"));
        assert_eq!(a, BlockId(1));
        assert_eq!(b, BlockId(2));
    }

    #[test]
    fn create_temp_assigns_sequential_ids_and_is_owned() {
        let mut func = IRFunction::new("f", TypeId::VOID, vec![]);
        let t0 = func.create_temp(Some(TypeId::INT));
        let t1 = func.create_temp(Some(TypeId::INT));
        assert_eq!(t0.id, Some(ValueId(0)));
        assert_eq!(t1.id, Some(ValueId(1)));
        assert_eq!(func.values.len(), 2);
    }

    #[test]
    fn emit_alloca_produces_a_pointer_and_an_instruction() {
        let mut func = IRFunction::new("f", TypeId::VOID, vec![]);
        let entry = func.entry;
        let ptr = func.emit_alloca(entry, Some(TypeId::INT), 4, 4);
        assert!(ptr.is_temp());
        assert_eq!(func.block(entry).instrs.len(), 1);
        assert!(matches!(
            func.block(entry).instrs[0].kind,
            IRInstrKind::Alloca { size: 4, align: 4 }
        ));
    }

    #[test]
    fn bind_and_lookup_var() {
        let mut func = IRFunction::new("f", TypeId::VOID, vec![]);
        let entry = func.entry;
        let ptr = func.emit_alloca(entry, Some(TypeId::INT), 4, 4);
        func.bind_var("x", ptr.clone());
        assert_eq!(func.lookup_var("x"), Some(&ptr));
        assert!(func.lookup_var("y").is_none());
    }

    #[test]
    fn emit_return_terminates_the_block() {
        let mut func = IRFunction::new("f", TypeId::INT, vec![]);
        let entry = func.entry;
        func.emit_return(entry, None);
        assert!(func.block(entry).is_terminated());
    }
}
