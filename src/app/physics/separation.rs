use eframe::egui::Vec2;

use crate::flow::{FlowGraph, NodeKind};

use super::PhysicsParams;

fn is_movable(graph: &FlowGraph, index: usize, dragged: Option<usize>) -> bool {
    Some(index) != dragged && graph.nodes[index].kind != NodeKind::Central
}

/// Pushes overlapping discs apart, half the overlap each. All pushes are
/// computed from the positions at the start of the pass, so the result does
/// not depend on node order. Coincident centres are skipped since they have
/// no separating direction.
pub(in crate::app) fn separate_nodes(
    graph: &mut FlowGraph,
    params: &PhysicsParams,
    dragged: Option<usize>,
) {
    let node_count = graph.nodes.len();
    let mut pushes = vec![Vec2::ZERO; node_count];

    for i in 0..node_count {
        for j in (i + 1)..node_count {
            let delta = graph.nodes[j].position - graph.nodes[i].position;
            let distance = delta.length();
            let min_distance =
                graph.nodes[i].radius + graph.nodes[j].radius + params.separation_padding;
            if distance <= 0.0 || distance >= min_distance {
                continue;
            }

            let push = delta / distance * ((min_distance - distance) * 0.5);
            pushes[i] -= push;
            pushes[j] += push;
        }
    }

    for (index, push) in pushes.into_iter().enumerate() {
        if push != Vec2::ZERO && is_movable(graph, index, dragged) {
            nudge(graph, index, push, params.separation_nudge);
        }
    }
}

/// Velocity is only nudged on nodes that already drift; the first physics
/// tick still gives fresh nodes their random start.
fn nudge(graph: &mut FlowGraph, index: usize, push: Vec2, factor: f32) {
    let node = &mut graph.nodes[index];
    node.position += push;
    if let Some(velocity) = node.velocity.as_mut() {
        *velocity += push * factor;
    }
}
