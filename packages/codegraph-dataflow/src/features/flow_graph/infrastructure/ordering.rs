/*
 * Block ordering
 *
 * Reverse-postorder over blocks reachable from entry. In RPO every block
 * appears before its successors except along back-edges, so a worklist
 * ordered by RPO rank visits loop headers before their bodies.
 */

use crate::features::flow_graph::domain::cfg::{BasicBlock, BlockId};

/// Iterative DFS postorder, reversed. Unreachable blocks are omitted.
pub fn reverse_postorder(blocks: &[BasicBlock], entry: BlockId) -> Vec<BlockId> {
    if blocks.get(entry.index()).is_none() {
        return Vec::new();
    }

    let mut visited = vec![false; blocks.len()];
    let mut postorder = Vec::with_capacity(blocks.len());
    // (block, next successor position)
    let mut stack: Vec<(BlockId, usize)> = vec![(entry, 0)];
    visited[entry.index()] = true;

    while let Some((block, next)) = stack.pop() {
        let successors = &blocks[block.index()].successors;
        if let Some(edge) = successors.get(next) {
            stack.push((block, next + 1));
            let target = edge.target;
            if !visited[target.index()] {
                visited[target.index()] = true;
                stack.push((target, 0));
            }
        } else {
            postorder.push(block);
        }
    }

    postorder.reverse();
    postorder
}

/// Position of each block in `order`; `usize::MAX` for blocks not in it
pub fn rank_of(order: &[BlockId], block_count: usize) -> Vec<usize> {
    let mut rank = vec![usize::MAX; block_count];
    for (position, block) in order.iter().enumerate() {
        rank[block.index()] = position;
    }
    rank
}
