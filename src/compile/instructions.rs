// This module implements the second compiler pass: turning each instruction of
// the catalog into a decode routine plan. The plan fixes the instruction's type
// ordinal, binds the executor symbol the generated code will call and resolves
// every referenced field name against the compiled field registry, in declared
// order. Immediate fields collapse onto the shared `imm` slot of the decoded
// instruction and carry the sign-bit position along; register fields bind under
// their own names. Resolution failure (an undeclared field name) aborts the
// run. Like the field plans, instruction plans are directly evaluable, which
// gives the decode-correctness tests a path that does not involve generated
// text.

//! Per-instruction decode routine plans.

use indexmap::IndexMap;

use crate::compile::fields::{FieldPlan, FieldValue};
use crate::error::{CompileError, CompileResult};
use crate::isa::Instruction;

/// Compiled field plans in declared order, keyed by field name.
pub type FieldRegistry = IndexMap<String, FieldPlan>;

/// One field assignment inside a decode routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    /// Index of the field's plan in the registry.
    pub field: usize,
    /// Extractor struct identifier (`Imm_i`, `Rd`).
    pub ident: String,
    /// Decoded-instruction member the value lands in. Immediate fields share
    /// the `imm` member.
    pub member: String,
    /// Sign-bit position copied into the decoded instruction, for immediates.
    pub sign_bit: Option<u32>,
}

/// Compiled decode routine for one instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionPlan {
    /// Normalized mnemonic, unique across the catalog.
    pub mnemonic: String,
    /// Position in the catalog; doubles as the instruction-type enum value.
    pub ordinal: usize,
    /// The instruction's fixed opcode bits.
    pub opcode: u32,
    /// Executor symbol bound by the decode routine.
    pub executor: String,
    /// Field assignments in declared order.
    pub bindings: Vec<FieldBinding>,
}

/// Result of evaluating a decode routine against an encoded word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInstruction {
    pub ordinal: usize,
    pub mnemonic: String,
    pub executor: String,
    /// Sign-bit position of the decoded immediate, when one was assigned.
    pub sign_bit: Option<u32>,
    /// Member name and value for every assigned field, in declared order.
    pub values: Vec<(String, FieldValue)>,
}

impl DecodedInstruction {
    /// Look up an assigned value by member name.
    pub fn get(&self, member: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(name, _)| name == member)
            .map(|(_, value)| value)
    }
}

/// Compile one instruction against the field registry.
pub fn compile_instruction(
    instruction: &Instruction,
    ordinal: usize,
    fields: &FieldRegistry,
) -> CompileResult<InstructionPlan> {
    let mut bindings = Vec::with_capacity(instruction.fields.len());
    for name in &instruction.fields {
        let (index, _, plan) =
            fields
                .get_full(name)
                .ok_or_else(|| CompileError::MissingField {
                    mnemonic: instruction.mnemonic.clone(),
                    field: name.clone(),
                })?;
        let member = if name.contains("imm") {
            "imm".to_string()
        } else {
            name.clone()
        };
        bindings.push(FieldBinding {
            field: index,
            ident: plan.ident.clone(),
            member,
            sign_bit: plan.sign_bit(),
        });
    }

    log::debug!(
        "compiled instruction `{}` (ordinal {}, {} field(s))",
        instruction.mnemonic,
        ordinal,
        bindings.len()
    );

    Ok(InstructionPlan {
        mnemonic: instruction.mnemonic.clone(),
        ordinal,
        opcode: instruction.fixed_value,
        executor: format!("Executor{}", instruction.mnemonic),
        bindings,
    })
}

impl InstructionPlan {
    /// Evaluate the decode routine: tag the instruction, bind the executor and
    /// assign every field in declared order.
    pub fn decode(&self, word: u32, fields: &FieldRegistry) -> DecodedInstruction {
        let mut sign_bit = None;
        let mut values = Vec::with_capacity(self.bindings.len());
        for binding in &self.bindings {
            let plan = &fields[binding.field];
            if binding.sign_bit.is_some() {
                sign_bit = binding.sign_bit;
            }
            values.push((binding.member.clone(), plan.extract_value(word)));
        }
        DecodedInstruction {
            ordinal: self.ordinal,
            mnemonic: self.mnemonic.clone(),
            executor: self.executor.clone(),
            sign_bit,
            values,
        }
    }
}
