//! Basic blocks (§3 "IRBasicBlock").

use serde::{Deserialize, Serialize};

use crate::id::BlockId;
use crate::instr::{IRInstr, IRInstrKind};

/// A straight-line instruction sequence, stored as a plain `Vec`. Successor
/// and predecessor lists are not stored at all -- they are derived on
/// demand from the terminator, per §3's "may be built lazily", via
/// [`IRBasicBlock::successors`] and [`crate::cfg::control_flow_graph`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IRBasicBlock {
    pub id: BlockId,
    pub name: Option<String>,
    pub instrs: Vec<IRInstr>,
}

impl IRBasicBlock {
    pub fn new(id: BlockId, name: Option<String>) -> Self {
        IRBasicBlock {
            id,
            name,
            instrs: Vec::new(),
        }
    }

    pub fn push(&mut self, instr: IRInstr) {
        self.instrs.push(instr);
    }

    pub fn last(&self) -> Option<&IRInstr> {
        self.instrs.last()
    }

    /// P7: a well-formed block's last instruction is its sole terminator.
    pub fn is_terminated(&self) -> bool {
        self.last().is_some_and(IRInstr::is_terminator)
    }

    /// The block ids this block jumps/branches/returns to, read off the
    /// terminator. Empty for an untermined block or a `return`.
    pub fn successors(&self) -> Vec<BlockId> {
        match self.last().map(|instr| &instr.kind) {
            Some(IRInstrKind::Jump { target }) => vec![*target],
            Some(IRInstrKind::Branch {
                then_block,
                else_block,
                ..
            }) => vec![*then_block, *else_block],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::IRValue;

    #[test]
    fn empty_block_is_not_terminated() {
        let block = IRBasicBlock::new(BlockId(0), Some("entry".into()));
        assert!(!block.is_terminated());
        assert!(block.successors().is_empty());
    }

    #[test]
    fn jump_successor() {
        let mut block = IRBasicBlock::new(BlockId(0), None);
        block.push(IRInstr {
            kind: IRInstrKind::Jump { target: BlockId(2) },
            dest: None,
        });
        assert!(block.is_terminated());
        assert_eq!(block.successors(), vec![BlockId(2)]);
    }

    #[test]
    fn branch_successors_in_then_else_order() {
        let mut block = IRBasicBlock::new(BlockId(0), None);
        block.push(IRInstr {
            kind: IRInstrKind::Branch {
                cond: IRValue::undef(None),
                then_block: BlockId(1),
                else_block: BlockId(2),
            },
            dest: None,
        });
        assert_eq!(block.successors(), vec![BlockId(1), BlockId(2)]);
    }

    #[test]
    fn return_has_no_successors() {
        let mut block = IRBasicBlock::new(BlockId(0), None);
        block.push(IRInstr {
            kind: IRInstrKind::Return { value: None },
            dest: None,
        });
        assert!(block.is_terminated());
        assert!(block.successors().is_empty());
    }
}
