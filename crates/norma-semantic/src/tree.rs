//! Tree assembly over classified blocks.
//!
//! Blocks arrive in index order, which is document order. A block's parent
//! is the nearest preceding block with a strictly smaller level; a block at
//! the minimum level seen so far has no parent. The root candidate is the
//! shallowest node whose entire ancestor chain is made of `Header` blocks
//! (it may itself be a `UnitRoot` or, degenerate, the whole document may
//! have no root).

use crate::classify::ClassifiedBlock;
use norma_core::enums::BlockKind;

/// A classified block positioned in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub block: ClassifiedBlock,
    /// Index into the node list, or `None` at the root of the forest.
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

/// Build parent/child links for an ordered list of classified blocks.
///
/// Noise blocks are excluded entirely — they never parent anything and are
/// never parented.
#[must_use]
pub fn build_tree(blocks: Vec<ClassifiedBlock>) -> Vec<TreeNode> {
    let kept: Vec<ClassifiedBlock> = blocks.into_iter().filter(|b| b.kind != BlockKind::Noise).collect();

    let mut nodes: Vec<TreeNode> = kept
        .into_iter()
        .map(|block| TreeNode { block, parent: None, children: Vec::new() })
        .collect();

    let mut stack: Vec<usize> = Vec::new();
    for i in 0..nodes.len() {
        let level = nodes[i].block.level;
        while let Some(&top) = stack.last() {
            if nodes[top].block.level < level {
                break;
            }
            stack.pop();
        }
        if let Some(&parent_idx) = stack.last() {
            nodes[i].parent = Some(parent_idx);
            nodes[parent_idx].children.push(i);
        }
        stack.push(i);
    }

    nodes
}

/// Unit-root nodes whose entire ancestor chain (if any) is composed of
/// `Header` blocks — the candidates from which anchors and versions are
/// computed, one retrieval unit per candidate.
#[must_use]
pub fn unit_root_candidates(nodes: &[TreeNode]) -> Vec<usize> {
    nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.block.kind == BlockKind::UnitRoot)
        .filter(|(_, node)| ancestors_are_all_headers(nodes, node.parent))
        .map(|(i, _)| i)
        .collect()
}

fn ancestors_are_all_headers(nodes: &[TreeNode], mut parent: Option<usize>) -> bool {
    while let Some(idx) = parent {
        if nodes[idx].block.kind != BlockKind::Header {
            return false;
        }
        parent = nodes[idx].parent;
    }
    true
}
