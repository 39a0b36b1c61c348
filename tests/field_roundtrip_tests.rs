//! Property tests for extraction plans and decode-tree routing.
//!
//! The round-trip property: scattering a field value into its source bit
//! positions and running the extraction plan gets the exact value back,
//! whatever else the word carries.

use proptest::prelude::*;

use decodegen::compile::{compile_field, compile_tree, InstructionPlan};
use decodegen::isa::{BitSlice, DecodeNode, DecodeTree, Field, SelectorRange};
use indexmap::IndexMap;

fn field(name: &str, slices: Vec<BitSlice>) -> Field {
    Field {
        name: name.to_string(),
        signed: name.contains("imm"),
        slices,
    }
}

/// B-type branch offset: four slices, permuted and split.
fn imm_b_slices() -> Vec<BitSlice> {
    vec![
        BitSlice { src_lsb: 31, src_msb: 31, dest_to: 12, dest_from: 12 },
        BitSlice { src_lsb: 25, src_msb: 30, dest_to: 5, dest_from: 10 },
        BitSlice { src_lsb: 8, src_msb: 11, dest_to: 1, dest_from: 4 },
        BitSlice { src_lsb: 7, src_msb: 7, dest_to: 11, dest_from: 11 },
    ]
}

/// Scatter `value` into the source positions the slices pull from.
fn encode(slices: &[BitSlice], value: u32) -> u32 {
    let mut word = 0u32;
    for slice in slices {
        let width = slice.src_msb - slice.src_lsb + 1;
        let part = (value >> slice.dest_to) & (((1u64 << width) - 1) as u32);
        word |= part << slice.src_lsb;
    }
    word
}

/// Union of the destination positions the slices can populate.
fn dest_mask(slices: &[BitSlice]) -> u32 {
    let mut mask = 0u32;
    for slice in slices {
        let width = slice.src_msb - slice.src_lsb + 1;
        mask |= (((1u64 << width) - 1) as u32) << slice.dest_to;
    }
    mask
}

proptest! {
    #[test]
    fn split_immediate_round_trips(raw in any::<u32>(), noise in any::<u32>()) {
        let slices = imm_b_slices();
        let plan = compile_field(&field("imm_b", slices.clone())).unwrap();

        let value = raw & dest_mask(&slices);
        let word = encode(&slices, value) | (noise & !plan.mask);
        prop_assert_eq!(plan.extract(word), value);
    }

    #[test]
    fn register_field_round_trips(value in 0u32..32, noise in any::<u32>()) {
        let slices = vec![BitSlice { src_lsb: 7, src_msb: 11, dest_to: 0, dest_from: 4 }];
        let plan = compile_field(&field("rd", slices.clone())).unwrap();

        let word = encode(&slices, value) | (noise & !plan.mask);
        prop_assert_eq!(plan.extract(word), value);
    }

    #[test]
    fn extraction_ignores_everything_outside_the_mask(noise in any::<u32>()) {
        let plan = compile_field(&field("imm_b", imm_b_slices())).unwrap();
        prop_assert_eq!(plan.extract(noise & !plan.mask), 0);
    }
}

/// Leaf-path uniqueness over a tree with shared prefixes.
#[test]
fn every_leaf_owns_exactly_one_path() {
    let instructions: Vec<InstructionPlan> = [
        ("LUI", 0x0000_0037u32),
        ("ADD", 0x0000_0033),
        ("SUB", 0x4000_0033),
        ("SLL", 0x0000_1033),
    ]
    .iter()
    .enumerate()
    .map(|(ordinal, (mnemonic, opcode))| InstructionPlan {
        mnemonic: mnemonic.to_string(),
        ordinal,
        opcode: *opcode,
        executor: format!("Executor{mnemonic}"),
        bindings: Vec::new(),
    })
    .collect();

    let mut shifts = IndexMap::new();
    shifts.insert(
        0x0000_0000,
        DecodeNode::Internal(DecodeTree {
            range: SelectorRange { lsb: 25, msb: 31 },
            nodes: IndexMap::from_iter([
                (0x0000_0000, DecodeNode::Leaf { mnemonic: "ADD".to_string() }),
                (0x4000_0000, DecodeNode::Leaf { mnemonic: "SUB".to_string() }),
            ]),
        }),
    );
    shifts.insert(0x1000, DecodeNode::Leaf { mnemonic: "SLL".to_string() });

    let mut nodes = IndexMap::new();
    nodes.insert(0x37, DecodeNode::Leaf { mnemonic: "LUI".to_string() });
    nodes.insert(
        0x33,
        DecodeNode::Internal(DecodeTree {
            range: SelectorRange { lsb: 12, msb: 14 },
            nodes: shifts,
        }),
    );

    let selection = compile_tree(
        &DecodeTree {
            range: SelectorRange { lsb: 0, msb: 6 },
            nodes,
        },
        &instructions,
    )
    .unwrap();

    let paths = selection.leaf_paths();
    assert_eq!(paths.len(), instructions.len());

    // No two leaves share a path, and no ordinal appears twice.
    for (i, (path, ordinal)) in paths.iter().enumerate() {
        for (other_path, other_ordinal) in &paths[i + 1..] {
            assert_ne!(path, other_path);
            assert_ne!(ordinal, other_ordinal);
        }
    }

    // Routing agrees with the collected paths.
    assert_eq!(selection.route(0x0000_10b3), Some(3));
    assert_eq!(selection.route(0x4000_00b3), Some(2));
}
