// This module is the hub for the four compiler passes and the orchestration
// that runs them in dependency order over an immutable specification: field
// extraction plans first, then the instruction decode routines that reference
// them, then the decode tree that routes words to those routines, and the
// dispatch loop built from the finished catalog. The result is a fully-built
// Compilation that the emit backend renders; no pass produces text. Building
// is deterministic and fails on the first structural error, so two runs over
// the same specification either both fail identically or hold identical plans.

//! Compiler passes and the compilation they produce.
//!
//! # Key Components
//!
//! ## Field plans (`fields`)
//! - Bit-slice masks and shifts, evaluable via [`FieldPlan::extract`]
//! - Result kinds keeping register indices distinct from immediates
//!
//! ## Instruction plans (`instructions`)
//! - Ordered field bindings with the shared `imm` slot and sign-bit copy
//! - Catalog ordinals doubling as instruction-type enum values
//!
//! ## Decode tree (`tree`)
//! - Nested mask-guarded selections, evaluable via [`Selection::route`]
//! - Duplicate sibling selector keys rejected at compile time
//!
//! ## Dispatch loop (`dispatch`)
//! - Jump table of N + 1 labels with the block-end sentinel last

pub mod dispatch;
pub mod fields;
pub mod instructions;
pub mod tree;

use crate::error::{CompileError, CompileResult};
use crate::isa::Specification;

pub use dispatch::{build_dispatch, DispatchPlan, Handler, BLOCK_END_LABEL};
pub use fields::{compile_field, FieldPlan, FieldValue, RegisterIndex, SlicePlan, ValueKind};
pub use instructions::{
    compile_instruction, DecodedInstruction, FieldBinding, FieldRegistry, InstructionPlan,
};
pub use tree::{compile_tree, Arm, ArmTarget, Selection};

/// The finished output of all four passes over one specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilation {
    pub fields: FieldRegistry,
    pub instructions: Vec<InstructionPlan>,
    pub selection: Selection,
    pub dispatch: DispatchPlan,
}

impl Compilation {
    /// Run the passes in dependency order, aborting on the first error.
    pub fn build(spec: &Specification) -> CompileResult<Self> {
        let mut fields = FieldRegistry::new();
        for field in spec.fields.values() {
            let plan = compile_field(field)?;
            fields.insert(plan.name.clone(), plan);
        }

        let mut instructions = Vec::with_capacity(spec.instructions.len());
        for (ordinal, instruction) in spec.instructions.iter().enumerate() {
            instructions.push(compile_instruction(instruction, ordinal, &fields)?);
        }

        let selection = compile_tree(&spec.tree, &instructions)?;
        let dispatch = build_dispatch(&instructions);

        Ok(Self {
            fields,
            instructions,
            selection,
            dispatch,
        })
    }

    /// Route an encoded word through the decode tree and evaluate the matched
    /// instruction's decode routine.
    pub fn decode(&self, word: u32) -> CompileResult<DecodedInstruction> {
        let ordinal = self
            .selection
            .route(word)
            .ok_or(CompileError::UnreachableEncoding { word })?;
        Ok(self.instructions[ordinal].decode(word, &self.fields))
    }
}
