use std::collections::HashSet;

use crate::flow::FlowGraph;

use super::interaction::Selection;

/// Nodes and edges emphasised for the current selection. A selected node
/// lights up its incident edges and their far endpoints; a selected edge
/// lights up itself and both endpoints.
#[derive(Debug, Default, PartialEq)]
pub(super) struct HighlightState {
    pub(super) nodes: HashSet<usize>,
    pub(super) edges: HashSet<usize>,
}

impl HighlightState {
    pub(super) fn is_active(&self) -> bool {
        !self.nodes.is_empty() || !self.edges.is_empty()
    }
}

pub(super) fn build_highlight_state(
    graph: &FlowGraph,
    selection: &Selection,
) -> Option<HighlightState> {
    let mut state = HighlightState::default();

    match selection {
        Selection::None => return None,
        Selection::Node(id) => {
            let index = graph.node_index(id)?;
            state.nodes.insert(index);
            for (edge_index, edge) in graph.incident_edges(index) {
                state.edges.insert(edge_index);
                state.nodes.insert(edge.from);
                state.nodes.insert(edge.to);
            }
        }
        Selection::Edge(key) => {
            let edge_index = graph.edge_index(key)?;
            let edge = &graph.edges[edge_index];
            state.edges.insert(edge_index);
            state.nodes.insert(edge.from);
            state.nodes.insert(edge.to);
        }
    }

    Some(state)
}
