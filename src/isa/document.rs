// This module is the serde boundary between the on-disk specification document
// and the immutable data model in isa. The document is JSON with three sections:
// `fields` (name -> {location: {bits: [{from, to, lsb, msb}]}}), `instructions`
// (ordered list of {mnemonic, fixedvalue, fields}) and `decodertree` (recursive
// {range, nodes}). Leaf-versus-internal is decided here, once, by an untagged
// serde variant; past this boundary the tree is the tagged DecodeNode enum and
// no other code sniffs for attribute presence. Ingestion also performs the
// structural checks that make the model trustworthy: mnemonics normalize to
// unique identifiers, every decode-tree leaf names a declared instruction,
// fixed values and selector keys parse as 32-bit patterns and bit slices are
// well ordered.

//! Document ingestion: JSON specification text into a [`Specification`].

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{CompileError, CompileResult};
use crate::isa::{
    normalize_mnemonic, BitSlice, DecodeNode, DecodeTree, Field, Instruction, SelectorRange,
    Specification,
};

#[derive(Debug, Deserialize)]
struct SpecificationDoc {
    fields: IndexMap<String, FieldDoc>,
    instructions: Vec<InstructionDoc>,
    decodertree: TreeDoc,
}

#[derive(Debug, Deserialize)]
struct FieldDoc {
    location: LocationDoc,
}

#[derive(Debug, Deserialize)]
struct LocationDoc {
    bits: Vec<BitDoc>,
}

#[derive(Debug, Deserialize)]
struct BitDoc {
    from: u32,
    to: u32,
    lsb: u32,
    msb: u32,
}

#[derive(Debug, Deserialize)]
struct InstructionDoc {
    mnemonic: String,
    fixedvalue: WordDoc,
    fields: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TreeDoc {
    range: RangeDoc,
    nodes: IndexMap<String, NodeDoc>,
}

#[derive(Debug, Deserialize)]
struct RangeDoc {
    lsb: u32,
    msb: u32,
}

/// A decode-tree child is a leaf exactly when it carries a `mnemonic` and no
/// `range`. This is the only place that distinction is made structurally.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NodeDoc {
    Internal(TreeDoc),
    Leaf { mnemonic: String },
}

/// A 32-bit pattern written either as a JSON integer or as a `0x…` string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WordDoc {
    Int(u32),
    Text(String),
}

fn parse_word(text: &str) -> Option<u32> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

/// Parse a specification document into the immutable model.
///
/// Fails on the first structural inconsistency; a run never proceeds with a
/// partially valid specification.
pub fn parse(text: &str) -> CompileResult<Specification> {
    let doc: SpecificationDoc = serde_json::from_str(text)?;

    let mut fields = IndexMap::with_capacity(doc.fields.len());
    for (name, field_doc) in doc.fields {
        let field = convert_field(&name, field_doc)?;
        fields.insert(name, field);
    }

    let mut instructions = Vec::with_capacity(doc.instructions.len());
    for instr_doc in doc.instructions {
        let mnemonic = normalize_mnemonic(&instr_doc.mnemonic);
        if instructions.iter().any(|i: &Instruction| i.mnemonic == mnemonic) {
            return Err(CompileError::DuplicateMnemonic { mnemonic });
        }
        let fixed_value = match instr_doc.fixedvalue {
            WordDoc::Int(value) => value,
            WordDoc::Text(text) => {
                parse_word(&text).ok_or_else(|| CompileError::InvalidFixedValue {
                    mnemonic: mnemonic.clone(),
                    value: text,
                })?
            }
        };
        instructions.push(Instruction {
            mnemonic,
            fixed_value,
            fields: instr_doc.fields,
        });
    }

    let tree = convert_tree(doc.decodertree, &instructions)?;

    log::debug!(
        "ingested specification: {} fields, {} instructions",
        fields.len(),
        instructions.len()
    );

    Ok(Specification {
        fields,
        instructions,
        tree,
    })
}

fn convert_field(name: &str, doc: FieldDoc) -> CompileResult<Field> {
    let mut slices = Vec::with_capacity(doc.location.bits.len());
    for bit in doc.location.bits {
        if bit.msb < bit.lsb || bit.from < bit.to || bit.msb > 31 || bit.from > 31 {
            return Err(CompileError::MalformedBitSlice {
                field: name.to_string(),
            });
        }
        slices.push(BitSlice {
            src_lsb: bit.lsb,
            src_msb: bit.msb,
            dest_to: bit.to,
            dest_from: bit.from,
        });
    }
    Ok(Field {
        name: name.to_string(),
        slices,
        signed: name.contains("imm"),
    })
}

fn convert_tree(doc: TreeDoc, instructions: &[Instruction]) -> CompileResult<DecodeTree> {
    if doc.range.msb < doc.range.lsb || doc.range.msb > 31 {
        return Err(CompileError::MalformedSelectorRange {
            lsb: doc.range.lsb,
            msb: doc.range.msb,
        });
    }
    let mut nodes = IndexMap::with_capacity(doc.nodes.len());
    for (key_text, node_doc) in doc.nodes {
        let key = parse_word(&key_text).ok_or(CompileError::InvalidSelectorKey { key: key_text })?;
        let node = match node_doc {
            NodeDoc::Leaf { mnemonic } => {
                let mnemonic = normalize_mnemonic(&mnemonic);
                if !instructions.iter().any(|i| i.mnemonic == mnemonic) {
                    return Err(CompileError::UnknownMnemonic { mnemonic });
                }
                DecodeNode::Leaf { mnemonic }
            }
            NodeDoc::Internal(subtree) => {
                DecodeNode::Internal(convert_tree(subtree, instructions)?)
            }
        };
        if nodes.insert(key, node).is_some() {
            return Err(CompileError::AmbiguousSelector {
                key,
                lsb: doc.range.lsb,
                msb: doc.range.msb,
            });
        }
    }
    Ok(DecodeTree {
        range: SelectorRange {
            lsb: doc.range.lsb,
            msb: doc.range.msb,
        },
        nodes,
    })
}
