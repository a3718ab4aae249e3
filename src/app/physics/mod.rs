mod separation;

use eframe::egui::{Vec2, vec2};
use rand::Rng;

use crate::flow::{FlowGraph, NodeKind};

pub(in crate::app) use separation::separate_nodes;

/// Tuning for the ambient drift simulation. Defaults reproduce the
/// free-floating look of the graph; every value is per tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PhysicsParams {
    pub(crate) initial_velocity: f32,
    pub(crate) oscillation: f32,
    pub(crate) oscillation_frequency: f32,
    pub(crate) boundary_margin: f32,
    pub(crate) restitution: f32,
    pub(crate) damping: f32,
    pub(crate) impulse_probability: f64,
    pub(crate) impulse: f32,
    pub(crate) max_speed: f32,
    pub(crate) separation_padding: f32,
    pub(crate) separation_nudge: f32,
    pub(crate) clock_step: f64,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            initial_velocity: 0.5,
            oscillation: 0.15,
            oscillation_frequency: 0.01,
            boundary_margin: 20.0,
            restitution: 0.7,
            damping: 0.995,
            impulse_probability: 0.01,
            impulse: 0.5,
            max_speed: 2.0,
            separation_padding: 10.0,
            separation_nudge: 0.05,
            clock_step: 0.016,
        }
    }
}

fn random_vector<R: Rng>(rng: &mut R, half_extent: f32) -> Vec2 {
    if half_extent <= 0.0 {
        return Vec2::ZERO;
    }
    vec2(
        rng.gen_range(-half_extent..=half_extent),
        rng.gen_range(-half_extent..=half_extent),
    )
}

/// Reflects `position` back inside `[margin, extent - margin]`, flipping and
/// damping `velocity` when it crossed.
fn reflect_axis(position: &mut f32, velocity: &mut f32, margin: f32, extent: f32, restitution: f32) {
    let (low, high) = if extent > margin * 2.0 {
        (margin, extent - margin)
    } else {
        (extent * 0.5, extent * 0.5)
    };

    if *position < low {
        *position = low;
        *velocity = -*velocity * restitution;
    } else if *position > high {
        *position = high;
        *velocity = -*velocity * restitution;
    }
}

/// Advances every free node by one tick. The focal node and the node under
/// the pointer are left alone.
pub(in crate::app) fn step_physics<R: Rng>(
    graph: &mut FlowGraph,
    params: &PhysicsParams,
    clock: f64,
    canvas: Vec2,
    dragged: Option<usize>,
    rng: &mut R,
) {
    let clock = clock as f32;
    let max_speed_sq = params.max_speed * params.max_speed;

    for index in 0..graph.nodes.len() {
        if Some(index) == dragged || graph.nodes[index].kind == NodeKind::Central {
            continue;
        }

        let node = &mut graph.nodes[index];
        let mut velocity = match node.velocity {
            Some(velocity) => velocity,
            None => random_vector(rng, params.initial_velocity),
        };

        let oscillation = vec2(
            (clock + node.position.y * params.oscillation_frequency).sin(),
            (clock + node.position.x * params.oscillation_frequency).cos(),
        ) * params.oscillation;
        node.position += velocity + oscillation;

        let margin = node.radius + params.boundary_margin;
        reflect_axis(
            &mut node.position.x,
            &mut velocity.x,
            margin,
            canvas.x,
            params.restitution,
        );
        reflect_axis(
            &mut node.position.y,
            &mut velocity.y,
            margin,
            canvas.y,
            params.restitution,
        );

        velocity *= params.damping;

        if params.impulse_probability > 0.0
            && rng.gen_bool(params.impulse_probability.clamp(0.0, 1.0))
        {
            velocity += random_vector(rng, params.impulse);
        }

        let speed_sq = velocity.length_sq();
        if speed_sq > max_speed_sq {
            velocity *= params.max_speed / speed_sq.sqrt();
        }

        node.velocity = Some(velocity);
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::chain::{NativeTransfer, Transaction};
    use crate::flow::{BuildConfig, build_flow_graph};

    use super::*;

    const CANVAS: Vec2 = vec2(800.0, 600.0);

    fn graph_with(count: usize) -> FlowGraph {
        let transaction = Transaction {
            signature: "sig".into(),
            timestamp: Some(1),
            fee: None,
            native_transfers: (0..count)
                .map(|index| NativeTransfer {
                    from: format!("Peer{index}"),
                    to: "Focal".into(),
                    amount: 500_000_000.0,
                })
                .collect(),
            token_transfers: Vec::new(),
        };
        build_flow_graph("Focal", &[transaction], None, &BuildConfig::default())
    }

    #[test]
    fn first_tick_initializes_velocity_except_for_focal_node() {
        let mut graph = graph_with(3);
        let mut rng = StdRng::seed_from_u64(7);
        step_physics(&mut graph, &PhysicsParams::default(), 0.0, CANVAS, None, &mut rng);

        assert!(graph.nodes[0].velocity.is_none());
        assert_eq!(graph.nodes[0].position, CANVAS * 0.5);
        for node in graph.nodes.iter().skip(1) {
            assert!(node.velocity.is_some());
        }
    }

    #[test]
    fn same_seed_gives_same_drift() {
        let run = |seed: u64| {
            let mut graph = graph_with(5);
            let params = PhysicsParams::default();
            let mut rng = StdRng::seed_from_u64(seed);
            for tick in 0..200 {
                step_physics(
                    &mut graph,
                    &params,
                    tick as f64 * params.clock_step,
                    CANVAS,
                    None,
                    &mut rng,
                );
            }
            graph.nodes.iter().map(|node| node.position).collect::<Vec<_>>()
        };

        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }

    #[test]
    fn dragged_node_is_not_moved() {
        let mut graph = graph_with(2);
        let before = graph.nodes[1].position;
        let mut rng = StdRng::seed_from_u64(1);
        step_physics(&mut graph, &PhysicsParams::default(), 0.0, CANVAS, Some(1), &mut rng);
        assert_eq!(graph.nodes[1].position, before);
        assert!(graph.nodes[1].velocity.is_none());
    }

    #[test]
    fn boundary_reflects_and_dampens_velocity() {
        let mut graph = graph_with(1);
        let radius = graph.nodes[1].radius;
        graph.nodes[1].position = vec2(radius + 21.0, 300.0);
        graph.nodes[1].velocity = Some(vec2(-1.5, 0.0));
        let params = PhysicsParams {
            oscillation: 0.0,
            impulse_probability: 0.0,
            ..PhysicsParams::default()
        };

        let mut rng = StdRng::seed_from_u64(3);
        step_physics(&mut graph, &params, 0.0, CANVAS, None, &mut rng);

        let node = &graph.nodes[1];
        assert_eq!(node.position.x, radius + 20.0);
        let velocity = node.velocity.unwrap();
        assert!((velocity.x - 1.5 * 0.7 * 0.995).abs() < 1e-5);
    }

    #[test]
    fn speed_is_clamped() {
        let mut graph = graph_with(1);
        graph.nodes[1].velocity = Some(vec2(30.0, -40.0));
        let params = PhysicsParams {
            impulse_probability: 0.0,
            ..PhysicsParams::default()
        };

        let mut rng = StdRng::seed_from_u64(5);
        step_physics(&mut graph, &params, 0.0, vec2(10_000.0, 10_000.0), None, &mut rng);

        let velocity = graph.nodes[1].velocity.unwrap();
        assert!(velocity.length() <= 2.0 + 1e-4);
        assert!(velocity.x > 0.0 && velocity.y < 0.0);
    }

    #[test]
    fn nodes_stay_inside_canvas_over_many_ticks() {
        let mut graph = graph_with(20);
        let params = PhysicsParams::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut clock = 0.0;
        for _ in 0..2_000 {
            step_physics(&mut graph, &params, clock, CANVAS, None, &mut rng);
            clock += params.clock_step;
        }

        for node in graph.nodes.iter().skip(1) {
            let margin = node.radius + params.boundary_margin;
            assert!(node.position.x >= margin - 1e-3 && node.position.x <= CANVAS.x - margin + 1e-3);
            assert!(node.position.y >= margin - 1e-3 && node.position.y <= CANVAS.y - margin + 1e-3);
            assert!(node.velocity.unwrap().length() <= params.max_speed + 1e-4);
        }
    }
}
