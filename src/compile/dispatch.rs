// This module implements the dispatch-table synthesizer. From the compiled
// instruction catalog it builds the three pieces of the threaded dispatch loop:
// the ordered label catalog with the trailing end-of-block sentinel, the jump
// table mapping every instruction-type ordinal to its handler label (exactly
// N + 1 slots, sentinel last, so indexing by type never escapes the table) and
// one handler body per instruction that invokes the executor, advances to the
// next decoded instruction and re-enters the table. The sentinel handler
// returns to the caller, which is what terminates straight-line execution of a
// block.

//! Jump-table dispatch loop synthesis.

use crate::compile::instructions::InstructionPlan;

/// Label of the catalog sentinel terminating a basic block.
pub const BLOCK_END_LABEL: &str = "BASIC_BLOCK_END";

/// One threaded-dispatch handler: a label and the executor it invokes before
/// re-entering the jump table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handler {
    pub label: String,
    pub executor: String,
}

/// Compiled dispatch loop: catalog, jump table and handler bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPlan {
    /// Instruction mnemonics in catalog order plus the trailing sentinel.
    pub catalog: Vec<String>,
    /// Jump-table labels indexed by instruction-type ordinal; the slot at
    /// index N is the sentinel.
    pub table: Vec<String>,
    /// Handler bodies in catalog order. The sentinel has no handler here; it
    /// returns instead of dispatching.
    pub handlers: Vec<Handler>,
}

/// Build the dispatch plan from the compiled catalog.
pub fn build_dispatch(instructions: &[InstructionPlan]) -> DispatchPlan {
    let mut catalog = Vec::with_capacity(instructions.len() + 1);
    let mut table = Vec::with_capacity(instructions.len() + 1);
    let mut handlers = Vec::with_capacity(instructions.len());

    for plan in instructions {
        catalog.push(plan.mnemonic.clone());
        table.push(plan.mnemonic.clone());
        handlers.push(Handler {
            label: plan.mnemonic.clone(),
            executor: plan.executor.clone(),
        });
    }
    catalog.push(BLOCK_END_LABEL.to_string());
    table.push(BLOCK_END_LABEL.to_string());

    log::debug!(
        "built dispatch plan: {} handler(s), table of {} slot(s)",
        handlers.len(),
        table.len()
    );

    DispatchPlan {
        catalog,
        table,
        handlers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(mnemonic: &str, ordinal: usize) -> InstructionPlan {
        InstructionPlan {
            mnemonic: mnemonic.to_string(),
            ordinal,
            opcode: 0,
            executor: format!("Executor{mnemonic}"),
            bindings: Vec::new(),
        }
    }

    #[test]
    fn table_has_one_slot_per_instruction_plus_sentinel() {
        let instructions = vec![plan("LUI", 0), plan("ADD", 1), plan("SUB", 2)];
        let dispatch = build_dispatch(&instructions);
        assert_eq!(dispatch.table.len(), instructions.len() + 1);
        assert_eq!(dispatch.table.last().unwrap(), BLOCK_END_LABEL);
        assert_eq!(dispatch.catalog.last().unwrap(), BLOCK_END_LABEL);
        assert_eq!(dispatch.handlers.len(), instructions.len());
    }

    #[test]
    fn handlers_follow_catalog_order() {
        let instructions = vec![plan("ADD", 0), plan("SUB", 1)];
        let dispatch = build_dispatch(&instructions);
        assert_eq!(dispatch.table[0], "ADD");
        assert_eq!(dispatch.table[1], "SUB");
        assert_eq!(dispatch.handlers[0].executor, "ExecutorADD");
        assert_eq!(dispatch.handlers[1].executor, "ExecutorSUB");
    }

    #[test]
    fn empty_catalog_still_carries_the_sentinel() {
        let dispatch = build_dispatch(&[]);
        assert_eq!(dispatch.table, vec![BLOCK_END_LABEL.to_string()]);
        assert!(dispatch.handlers.is_empty());
    }
}
