// This module implements the decode-tree compiler. It recursively lowers the
// specification's opcode tree into Selection nodes: each internal node becomes
// a selection keyed on (word & mask) where the mask spans the node's selector
// range, each leaf child becomes an arm whose key is the referenced
// instruction's fixed bits under that mask, and each internal child becomes an
// arm holding a nested Selection one level deeper. Arm keys at one level must
// be pairwise distinct; a collision (declared twice, or a computed leaf key
// landing on a literal child key) rejects the specification rather than
// silently overwriting an arm. The nesting makes decode cost proportional to
// tree depth instead of catalog size.

//! Decode-tree lowering into nested, mask-guarded selection logic.

use std::collections::HashSet;

use crate::compile::fields::span_mask;
use crate::compile::instructions::InstructionPlan;
use crate::error::{CompileError, CompileResult};
use crate::isa::{DecodeNode, DecodeTree};

/// Where a matched arm leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArmTarget {
    /// Invoke the decode routine of the instruction at this catalog ordinal.
    Instruction(usize),
    /// Select again on a narrower bit span.
    Nested(Selection),
}

/// One guarded case of a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arm {
    /// Selector value, already in encoded-word bit positions.
    pub key: u32,
    pub target: ArmTarget,
}

/// A compiled selection level: `word & mask` routed through the arms, with an
/// implicit invalid-encoding default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub mask: u32,
    /// Nesting depth, zero at the root. Drives emission indentation.
    pub depth: u32,
    /// Arms in declared order.
    pub arms: Vec<Arm>,
}

impl Selection {
    /// Walk an encoded word down to the catalog ordinal of its instruction.
    ///
    /// `None` means no path matches: the invalid-encoding condition that the
    /// generated decoder turns into its fatal default arm.
    pub fn route(&self, word: u32) -> Option<usize> {
        let selector = word & self.mask;
        for arm in &self.arms {
            if arm.key == selector {
                return match &arm.target {
                    ArmTarget::Instruction(ordinal) => Some(*ordinal),
                    ArmTarget::Nested(selection) => selection.route(word),
                };
            }
        }
        None
    }

    /// Every leaf's path of selector keys from this node, in declared order.
    pub fn leaf_paths(&self) -> Vec<(Vec<u32>, usize)> {
        let mut paths = Vec::new();
        self.collect_paths(&mut Vec::new(), &mut paths);
        paths
    }

    fn collect_paths(&self, prefix: &mut Vec<u32>, paths: &mut Vec<(Vec<u32>, usize)>) {
        for arm in &self.arms {
            prefix.push(arm.key);
            match &arm.target {
                ArmTarget::Instruction(ordinal) => paths.push((prefix.clone(), *ordinal)),
                ArmTarget::Nested(selection) => selection.collect_paths(prefix, paths),
            }
            prefix.pop();
        }
    }
}

/// Compile the whole decode tree.
pub fn compile_tree(
    tree: &DecodeTree,
    instructions: &[InstructionPlan],
) -> CompileResult<Selection> {
    let selection = compile_node(tree, 0, instructions)?;
    log::debug!(
        "compiled decode tree: {} top-level arm(s), mask {:#010x}",
        selection.arms.len(),
        selection.mask
    );
    Ok(selection)
}

/// Compile one internal node at the given depth.
fn compile_node(
    tree: &DecodeTree,
    depth: u32,
    instructions: &[InstructionPlan],
) -> CompileResult<Selection> {
    let mask = span_mask(tree.range.lsb, tree.range.msb);
    let mut seen = HashSet::with_capacity(tree.nodes.len());
    let mut arms = Vec::with_capacity(tree.nodes.len());

    for (&declared_key, node) in &tree.nodes {
        let (key, target) = match node {
            DecodeNode::Leaf { mnemonic } => {
                let ordinal = instructions
                    .iter()
                    .position(|plan| plan.mnemonic == *mnemonic)
                    .ok_or_else(|| CompileError::UnknownMnemonic {
                        mnemonic: mnemonic.clone(),
                    })?;
                (instructions[ordinal].opcode & mask, ArmTarget::Instruction(ordinal))
            }
            DecodeNode::Internal(subtree) => (
                declared_key,
                ArmTarget::Nested(compile_node(subtree, depth + 1, instructions)?),
            ),
        };
        if !seen.insert(key) {
            return Err(CompileError::AmbiguousSelector {
                key,
                lsb: tree.range.lsb,
                msb: tree.range.msb,
            });
        }
        arms.push(Arm { key, target });
    }

    Ok(Selection { mask, depth, arms })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use crate::isa::SelectorRange;

    fn plan(mnemonic: &str, ordinal: usize, opcode: u32) -> InstructionPlan {
        InstructionPlan {
            mnemonic: mnemonic.to_string(),
            ordinal,
            opcode,
            executor: format!("Executor{mnemonic}"),
            bindings: Vec::new(),
        }
    }

    fn leaf(mnemonic: &str) -> DecodeNode {
        DecodeNode::Leaf {
            mnemonic: mnemonic.to_string(),
        }
    }

    /// Two-level tree: LUI is a leaf at the opcode level, ADD and SUB hang
    /// under opcode 0x33 selected by funct7.
    fn sample() -> (Vec<InstructionPlan>, DecodeTree) {
        let instructions = vec![
            plan("LUI", 0, 0x37),
            plan("ADD", 1, 0x0000_0033),
            plan("SUB", 2, 0x4000_0033),
        ];
        let mut inner = IndexMap::new();
        inner.insert(0x0000_0000, leaf("ADD"));
        inner.insert(0x4000_0000, leaf("SUB"));
        let mut nodes = IndexMap::new();
        nodes.insert(0x37, leaf("LUI"));
        nodes.insert(
            0x33,
            DecodeNode::Internal(DecodeTree {
                range: SelectorRange { lsb: 25, msb: 31 },
                nodes: inner,
            }),
        );
        let tree = DecodeTree {
            range: SelectorRange { lsb: 0, msb: 6 },
            nodes,
        };
        (instructions, tree)
    }

    #[test]
    fn routes_through_nested_levels() {
        let (instructions, tree) = sample();
        let selection = compile_tree(&tree, &instructions).unwrap();
        assert_eq!(selection.mask, 0x7f);
        assert_eq!(selection.depth, 0);

        assert_eq!(selection.route(0x37), Some(0));
        // add x1, x2, x3 and sub x1, x2, x3.
        assert_eq!(selection.route(0x0030_80b3), Some(1));
        assert_eq!(selection.route(0x4030_80b3), Some(2));
        // Opcode 0x33 with an undeclared funct7 falls off the tree.
        assert_eq!(selection.route(0x2000_0033), None);
        assert_eq!(selection.route(0x7f), None);
    }

    #[test]
    fn nested_levels_increase_depth() {
        let (instructions, tree) = sample();
        let selection = compile_tree(&tree, &instructions).unwrap();
        let nested = selection
            .arms
            .iter()
            .find_map(|arm| match &arm.target {
                ArmTarget::Nested(selection) => Some(selection),
                ArmTarget::Instruction(_) => None,
            })
            .unwrap();
        assert_eq!(nested.depth, 1);
        assert_eq!(nested.mask, 0xfe00_0000);
    }

    #[test]
    fn leaf_keys_come_from_fixed_bits() {
        let (instructions, tree) = sample();
        let selection = compile_tree(&tree, &instructions).unwrap();
        assert_eq!(selection.arms[0].key, 0x37);
        let paths = selection.leaf_paths();
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[1], (vec![0x33, 0x0000_0000], 1));
        assert_eq!(paths[2], (vec![0x33, 0x4000_0000], 2));
    }

    #[test]
    fn rejects_computed_key_colliding_with_literal_key() {
        let (mut instructions, tree) = sample();
        // AND's fixed bits share opcode 0x33 with the nested node, so its
        // computed top-level key lands on the literal 0x33 arm.
        instructions.push(plan("AND", 3, 0x7000_0033));
        let mut nodes = tree.nodes;
        nodes.insert(0x55, leaf("AND"));
        let tree = DecodeTree {
            range: SelectorRange { lsb: 0, msb: 6 },
            nodes,
        };
        let err = compile_tree(&tree, &instructions).unwrap_err();
        assert!(matches!(
            err,
            CompileError::AmbiguousSelector { key: 0x33, lsb: 0, msb: 6 }
        ));
    }
}
