// This module implements the first compiler pass: turning each field's bit-slice
// description into a deterministic extraction plan. For every slice the pass
// computes the source-span mask and the shift that moves the selected bits from
// their encoded-word position to their destination position (positive shifts
// move right, negative move left). Destination positions across a field's
// slices are disjoint, so the shifted contributions combine by plain addition.
// Fields carrying a signed immediate additionally record the position of the
// semantic sign bit; register-index fields are tagged with a distinct result
// type so register numbers and immediates cannot be confused downstream. The
// plan is directly evaluable in-process, which is what the round-trip tests
// exercise.

//! Field extraction plans.

use crate::error::{CompileError, CompileResult};
use crate::isa::Field;

/// Field names that decode to a register index rather than a raw value.
const REGISTER_FIELDS: [&str; 5] = ["rd", "rs1", "rs2", "rs3", "rm"];

/// Contiguous bit mask spanning `lsb..=msb` of a 32-bit word.
pub fn span_mask(lsb: u32, msb: u32) -> u32 {
    (((1u64 << (msb - lsb + 1)) - 1) << lsb) as u32
}

/// One slice of an extraction plan: mask the source span, then shift it into
/// destination position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlicePlan {
    pub src_lsb: u32,
    pub src_msb: u32,
    /// `src_lsb - dest_to`; positive shifts right, negative shifts left.
    pub shift: i32,
}

/// What an extraction plan's result means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// A register index, kept distinct from numeric values.
    Register,
    /// A signed immediate; `sign_bit` is the semantic sign-bit position used
    /// for runtime sign extension. Recorded here as metadata only.
    Immediate { sign_bit: u32 },
    /// A plain unsigned value.
    Unsigned,
}

/// An index into the register file, distinct from immediates by type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RegisterIndex(pub u8);

/// A decoded field value, tagged with the plan's result kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    Register(RegisterIndex),
    Immediate(u32),
    Unsigned(u32),
}

/// Compiled extraction plan for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPlan {
    /// Field name as declared.
    pub name: String,
    /// Capitalized identifier the generated extractor struct is named after.
    pub ident: String,
    /// Union of all source bit positions.
    pub mask: u32,
    /// Slices in declared order.
    pub slices: Vec<SlicePlan>,
    pub kind: ValueKind,
}

impl FieldPlan {
    /// Reconstruct the field value from an encoded word.
    pub fn extract(&self, word: u32) -> u32 {
        let mut value = 0u32;
        for slice in &self.slices {
            let masked = word & span_mask(slice.src_lsb, slice.src_msb);
            value += if slice.shift >= 0 {
                masked >> slice.shift
            } else {
                masked << -slice.shift
            };
        }
        value
    }

    /// Reconstruct the field value and tag it with the plan's result kind.
    pub fn extract_value(&self, word: u32) -> FieldValue {
        let raw = self.extract(word);
        match self.kind {
            ValueKind::Register => FieldValue::Register(RegisterIndex(raw as u8)),
            ValueKind::Immediate { .. } => FieldValue::Immediate(raw),
            ValueKind::Unsigned => FieldValue::Unsigned(raw),
        }
    }

    /// Sign-bit position for immediate fields, `None` otherwise.
    pub fn sign_bit(&self) -> Option<u32> {
        match self.kind {
            ValueKind::Immediate { sign_bit } => Some(sign_bit),
            _ => None,
        }
    }
}

/// Capitalize a field name the way the generated struct is named: first
/// character upper-cased, the rest lower-cased (`imm_i` becomes `Imm_i`).
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Compile a field's slice list into an extraction plan.
pub fn compile_field(field: &Field) -> CompileResult<FieldPlan> {
    if field.slices.is_empty() {
        return Err(CompileError::EmptyBitSlices {
            field: field.name.clone(),
        });
    }

    let mut mask = 0u32;
    let mut slices = Vec::with_capacity(field.slices.len());
    let mut sign_bit = 0u32;
    for slice in &field.slices {
        mask |= span_mask(slice.src_lsb, slice.src_msb);
        sign_bit = sign_bit.max(slice.dest_from);
        slices.push(SlicePlan {
            src_lsb: slice.src_lsb,
            src_msb: slice.src_msb,
            shift: slice.src_lsb as i32 - slice.dest_to as i32,
        });
    }

    let kind = if field.signed {
        ValueKind::Immediate { sign_bit }
    } else if REGISTER_FIELDS.contains(&field.name.as_str()) {
        ValueKind::Register
    } else {
        ValueKind::Unsigned
    };

    let plan = FieldPlan {
        name: field.name.clone(),
        ident: capitalize(&field.name),
        mask,
        slices,
        kind,
    };
    log::debug!(
        "compiled field `{}`: mask {:#010x}, {} slice(s)",
        plan.name,
        plan.mask,
        plan.slices.len()
    );
    Ok(plan)
}
