//! On-demand control-flow graph construction (§3 "may be built lazily"): a
//! `petgraph::stable_graph::StableGraph` view built fresh from each block's
//! terminator, rather than maintaining predecessor/successor lists that
//! lowering would need to keep in sync on every block split.

use petgraph::stable_graph::StableDiGraph;

use crate::function::IRFunction;
use crate::id::BlockId;

/// Builds the control-flow graph of `function` from each block's terminator,
/// via [`crate::block::IRBasicBlock::successors`]. Edge weights are unused
/// (`()`); only reachability/dominance-style structure is needed here.
pub fn control_flow_graph(function: &IRFunction) -> StableDiGraph<BlockId, (), u32> {
    let mut graph = StableDiGraph::<BlockId, (), u32>::default();
    let mut nodes = Vec::with_capacity(function.blocks.len());
    for block in &function.blocks {
        nodes.push(graph.add_node(block.id));
    }
    for (i, block) in function.blocks.iter().enumerate() {
        for succ in block.successors() {
            if let Some(j) = function.blocks.iter().position(|b| b.id == succ) {
                graph.add_edge(nodes[i], nodes[j], ());
            }
        }
    }
    graph
}
