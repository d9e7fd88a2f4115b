//! Shared lowering state (§4.5): the per-function variable map and the
//! loop-context stack recording the innermost loop's (continue, break)
//! block pair as a `Vec`-based stack, one frame pushed per nested loop.

use owly_core::{Ast, ExprPool, ResolvedType, TypeId};
use owly_ir::{BlockId, IRFunction, IRModule};
use owly_sema::SemanticContext;

use crate::error::LowerError;

/// One nesting level of loop, recording where `continue`/`break` jump to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LoopContext {
    pub continue_target: BlockId,
    pub break_target: BlockId,
}

/// Per-function lowering state: the function under construction, the
/// current insertion block, the variable map, and the loop stack. A fresh
/// `FunctionLowerer` is created per `FuncDecl` body and discarded once the
/// finished [`IRFunction`] is handed to the enclosing [`IRModule`] (see
/// `function.rs`'s module doc for why functions aren't built in place
/// inside the module).
pub(crate) struct FunctionLowerer<'a, 'b> {
    pub ast: &'a Ast,
    pub exprs: &'a ExprPool,
    pub sema: &'a SemanticContext,
    pub module: &'b mut IRModule,
    pub func: IRFunction,
    pub cur_block: BlockId,
    pub loops: Vec<LoopContext>,
}

impl<'a, 'b> FunctionLowerer<'a, 'b> {
    pub fn new(
        ast: &'a Ast,
        exprs: &'a ExprPool,
        sema: &'a SemanticContext,
        module: &'b mut IRModule,
        func: IRFunction,
    ) -> Self {
        let entry = func.entry;
        FunctionLowerer {
            ast,
            exprs,
            sema,
            module,
            func,
            cur_block: entry,
            loops: Vec::new(),
        }
    }

    pub fn resolved(&self, ty: TypeId) -> Result<&ResolvedType, LowerError> {
        self.sema
            .types
            .get(ty)
            .ok_or_else(|| LowerError::Internal(format!("unresolved TypeId {ty}")))
    }

    pub fn push_loop(&mut self, continue_target: BlockId, break_target: BlockId) {
        self.loops.push(LoopContext {
            continue_target,
            break_target,
        });
    }

    pub fn pop_loop(&mut self) {
        self.loops.pop();
    }

    pub fn innermost_loop(&self) -> Option<LoopContext> {
        self.loops.last().copied()
    }

    /// True when `self.cur_block` already ends in a terminator, i.e. a
    /// trailing jump to the next block would be unreachable (§4.5's
    /// recurring "if not already terminated" guard on every block-closing
    /// statement).
    pub fn is_current_block_terminated(&self) -> bool {
        self.func.block(self.cur_block).is_terminated()
    }
}
