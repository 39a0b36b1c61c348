//! Specification data model: fields, instructions and the opcode decode tree.
//!
//! Everything here is constructed once when a document is ingested (see
//! [`document`]) and stays immutable for the lifetime of the compilation run.
//! Mnemonics are normalized exactly once, at ingestion.

pub mod document;

use indexmap::IndexMap;

pub use document::parse;

/// A contiguous source-bit range mapped to a destination position within the
/// reconstructed field value.
///
/// `src_lsb..=src_msb` addresses bits of the encoded instruction word;
/// `dest_to..=dest_from` is where the range lands in the field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitSlice {
    /// Lowest source bit position in the encoded word.
    pub src_lsb: u32,
    /// Highest source bit position in the encoded word.
    pub src_msb: u32,
    /// Destination position of the lowest bit.
    pub dest_to: u32,
    /// Destination position of the highest bit.
    pub dest_from: u32,
}

/// A named bit field assembled from one or more slices.
///
/// Slices are kept in declared order. Destination positions across a field's
/// slices are disjoint, so slice contributions combine by plain addition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub slices: Vec<BitSlice>,
    /// True for fields carrying a signed immediate (name contains `imm`).
    pub signed: bool,
}

/// One instruction encoding: a normalized mnemonic, the fixed opcode bits and
/// the fields the decode routine consumes, in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Unique identifier, punctuation stripped and upper-cased.
    pub mnemonic: String,
    /// Bit pattern of the instruction's fixed bits.
    pub fixed_value: u32,
    pub fields: Vec<String>,
}

/// Bit span an internal decode node selects on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorRange {
    pub lsb: u32,
    pub msb: u32,
}

/// An internal decode-tree node: a selector range and the children keyed by
/// selector value.
///
/// Keys hold the selected bits in their encoded-word positions, so a child
/// for `funct3 == 1` under a `12..=14` range carries the key `0x1000`. Child
/// order is the declared order of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeTree {
    pub range: SelectorRange,
    pub nodes: IndexMap<u32, DecodeNode>,
}

/// A decode-tree child: either a concrete instruction or a nested selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeNode {
    /// Routes the encoded word to the named instruction's decode routine.
    Leaf { mnemonic: String },
    /// Selects again on a narrower bit span.
    Internal(DecodeTree),
}

/// The parsed, immutable specification a compilation run operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specification {
    /// Fields in declared order, keyed by name.
    pub fields: IndexMap<String, Field>,
    /// Instruction catalog in declared order.
    pub instructions: Vec<Instruction>,
    /// Root of the opcode decode tree.
    pub tree: DecodeTree,
}

/// Normalize a raw mnemonic into its unique identifier form: punctuation
/// stripped, upper-cased. `fence.i` becomes `FENCEI`.
pub fn normalize_mnemonic(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_punctuated_mnemonics() {
        assert_eq!(normalize_mnemonic("fence.i"), "FENCEI");
        assert_eq!(normalize_mnemonic("add"), "ADD");
        assert_eq!(normalize_mnemonic("AMOADD.W"), "AMOADDW");
    }
}
