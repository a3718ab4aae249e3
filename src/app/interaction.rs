use eframe::egui::Vec2;

use crate::flow::FlowGraph;

use super::viewport::Viewport;

/// Screen-space distance a pressed pointer may travel before the gesture
/// counts as a drag instead of a click.
const CLICK_TOLERANCE: f32 = 3.0;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum Selection {
    #[default]
    None,
    Node(String),
    Edge(String),
}

impl Selection {
    pub(crate) fn node_id(&self) -> Option<&str> {
        match self {
            Self::Node(id) => Some(id.as_str()),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) enum Gesture {
    #[default]
    Idle,
    PanningViewport {
        last: Vec2,
    },
    DraggingNode {
        index: usize,
        grab_offset: Vec2,
    },
}

/// Single-pointer state machine over the graph canvas. All positions are
/// canvas-local screen coordinates.
#[derive(Debug, Default)]
pub(crate) struct InteractionController {
    gesture: Gesture,
    press: Option<Vec2>,
    moved: bool,
    suppress_click: bool,
    hovered: Option<usize>,
    tooltip_anchor: Option<Vec2>,
    selection: Selection,
}

/// Index of the first node (in array order) whose disc contains `screen`.
pub(crate) fn hit_test(graph: &FlowGraph, viewport: &Viewport, screen: Vec2) -> Option<usize> {
    let world = viewport.screen_to_world(screen);
    graph
        .nodes
        .iter()
        .position(|node| (node.position - world).length() <= node.radius)
}

fn clamp_axis(value: f32, radius: f32, extent: f32) -> f32 {
    if extent <= radius * 2.0 {
        extent * 0.5
    } else {
        value.clamp(radius, extent - radius)
    }
}

impl InteractionController {
    pub(crate) fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub(crate) fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub(crate) fn tooltip_anchor(&self) -> Option<Vec2> {
        self.tooltip_anchor
    }

    pub(crate) fn selection(&self) -> &Selection {
        &self.selection
    }

    pub(crate) fn dragged_index(&self) -> Option<usize> {
        match self.gesture {
            Gesture::DraggingNode { index, .. } => Some(index),
            _ => None,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    pub(crate) fn pointer_down(&mut self, graph: &FlowGraph, viewport: &Viewport, screen: Vec2) {
        self.press = Some(screen);
        self.moved = false;
        self.suppress_click = false;
        self.tooltip_anchor = None;

        self.gesture = match hit_test(graph, viewport, screen) {
            Some(index) => Gesture::DraggingNode {
                index,
                grab_offset: viewport.screen_to_world(screen) - graph.nodes[index].position,
            },
            None => Gesture::PanningViewport { last: screen },
        };
    }

    pub(crate) fn pointer_move(
        &mut self,
        graph: &mut FlowGraph,
        viewport: &mut Viewport,
        canvas: Vec2,
        screen: Vec2,
    ) {
        if self.is_active()
            && self
                .press
                .is_some_and(|press| (screen - press).length() > CLICK_TOLERANCE)
        {
            self.moved = true;
        }

        match self.gesture {
            Gesture::DraggingNode { index, grab_offset } => {
                let world = viewport.screen_to_world(screen);
                let Some(node) = graph.nodes.get_mut(index) else {
                    self.gesture = Gesture::Idle;
                    return;
                };
                let target = world - grab_offset;
                node.position.x = clamp_axis(target.x, node.radius, canvas.x);
                node.position.y = clamp_axis(target.y, node.radius, canvas.y);
                node.velocity = Some(Vec2::ZERO);
            }
            Gesture::PanningViewport { last } => {
                viewport.pan_by(screen - last);
                self.gesture = Gesture::PanningViewport { last: screen };
            }
            Gesture::Idle => {
                self.hovered = hit_test(graph, viewport, screen);
                self.tooltip_anchor = self.hovered.map(|_| screen);
            }
        }
    }

    pub(crate) fn pointer_up(&mut self) {
        if self.is_active() && self.moved {
            self.suppress_click = true;
        }
        self.gesture = Gesture::Idle;
        self.press = None;
        self.moved = false;
    }

    pub(crate) fn click(&mut self, graph: &FlowGraph, viewport: &Viewport, screen: Vec2) {
        if std::mem::take(&mut self.suppress_click) {
            return;
        }

        self.selection = match hit_test(graph, viewport, screen) {
            Some(index) => Selection::Node(graph.nodes[index].id.clone()),
            None => Selection::None,
        };
    }

    pub(crate) fn wheel(&mut self, viewport: &mut Viewport, delta_y: f32) {
        viewport.wheel(delta_y);
    }

    pub(crate) fn pointer_leave(&mut self) {
        self.gesture = Gesture::Idle;
        self.press = None;
        self.moved = false;
        self.hovered = None;
        self.tooltip_anchor = None;
    }

    pub(crate) fn select_node(&mut self, id: &str) {
        self.selection = Selection::Node(id.to_string());
    }

    pub(crate) fn select_edge(&mut self, key: &str) {
        self.selection = Selection::Edge(key.to_string());
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selection = Selection::None;
    }

    /// Forgets everything tied to the previous graph's indices.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use crate::chain::{NativeTransfer, Transaction};
    use crate::flow::{BuildConfig, build_flow_graph};

    use super::*;

    const CANVAS: Vec2 = vec2(800.0, 600.0);

    fn sample_graph() -> FlowGraph {
        let transaction = Transaction {
            signature: "sig".into(),
            timestamp: Some(1),
            fee: None,
            native_transfers: vec![NativeTransfer {
                from: "Sender".into(),
                to: "Focal".into(),
                amount: 2_000_000_000.0,
            }],
            token_transfers: Vec::new(),
        };
        build_flow_graph("Focal", &[transaction], None, &BuildConfig::default())
    }

    #[test]
    fn click_on_node_selects_it_and_empty_space_clears() {
        let graph = sample_graph();
        let viewport = Viewport::default();
        let mut controller = InteractionController::default();
        let center = graph.nodes[0].position;

        controller.pointer_down(&graph, &viewport, center);
        controller.pointer_up();
        controller.click(&graph, &viewport, center);
        assert_eq!(controller.selection(), &Selection::Node("Focal".into()));

        controller.pointer_down(&graph, &viewport, vec2(5.0, 5.0));
        controller.pointer_up();
        controller.click(&graph, &viewport, vec2(5.0, 5.0));
        assert_eq!(controller.selection(), &Selection::None);
    }

    #[test]
    fn drag_then_release_moves_node_and_suppresses_click() {
        let mut graph = sample_graph();
        let mut viewport = Viewport::default();
        let mut controller = InteractionController::default();
        let start = graph.nodes[1].position;

        controller.pointer_down(&graph, &viewport, start);
        assert_eq!(controller.dragged_index(), Some(1));

        controller.pointer_move(&mut graph, &mut viewport, CANVAS, start + vec2(40.0, 25.0));
        assert!((graph.nodes[1].position - (start + vec2(40.0, 25.0))).length() < 1e-3);
        assert_eq!(graph.nodes[1].velocity, Some(Vec2::ZERO));

        controller.pointer_up();
        assert_eq!(controller.gesture(), Gesture::Idle);

        let released_at = graph.nodes[1].position;
        controller.click(&graph, &viewport, released_at);
        assert_eq!(controller.selection(), &Selection::None);

        controller.click(&graph, &viewport, released_at);
        assert_eq!(controller.selection(), &Selection::Node("Sender".into()));
    }

    #[test]
    fn drag_released_off_canvas_does_not_swallow_next_click() {
        let mut graph = sample_graph();
        let mut viewport = Viewport::default();
        let mut controller = InteractionController::default();
        let start = graph.nodes[1].position;

        controller.pointer_down(&graph, &viewport, start);
        controller.pointer_move(&mut graph, &mut viewport, CANVAS, start + vec2(50.0, 0.0));
        // Released over another panel: no click reaches the canvas.
        controller.pointer_up();

        let focal = graph.nodes[0].position;
        controller.pointer_down(&graph, &viewport, focal);
        controller.pointer_up();
        controller.click(&graph, &viewport, focal);
        assert_eq!(controller.selection(), &Selection::Node("Focal".into()));
    }

    #[test]
    fn pan_released_off_canvas_does_not_swallow_next_click() {
        let mut graph = sample_graph();
        let mut viewport = Viewport::default();
        let mut controller = InteractionController::default();

        controller.pointer_down(&graph, &viewport, vec2(10.0, 10.0));
        controller.pointer_move(&mut graph, &mut viewport, CANVAS, vec2(-90.0, 10.0));
        assert_eq!(viewport.pan(), vec2(-100.0, 0.0));
        controller.pointer_up();

        let sender = viewport.world_to_screen(graph.nodes[1].position);
        controller.pointer_down(&graph, &viewport, sender);
        controller.pointer_up();
        controller.click(&graph, &viewport, sender);
        assert_eq!(controller.selection(), &Selection::Node("Sender".into()));
    }

    #[test]
    fn drag_is_clamped_to_canvas() {
        let mut graph = sample_graph();
        let mut viewport = Viewport::default();
        let mut controller = InteractionController::default();
        let start = graph.nodes[1].position;
        let radius = graph.nodes[1].radius;

        controller.pointer_down(&graph, &viewport, start);
        controller.pointer_move(&mut graph, &mut viewport, CANVAS, vec2(-500.0, 5_000.0));
        assert_eq!(graph.nodes[1].position, vec2(radius, CANVAS.y - radius));
    }

    #[test]
    fn panning_follows_pointer() {
        let mut graph = sample_graph();
        let mut viewport = Viewport::default();
        let mut controller = InteractionController::default();

        controller.pointer_down(&graph, &viewport, vec2(10.0, 10.0));
        assert!(matches!(controller.gesture(), Gesture::PanningViewport { .. }));
        controller.pointer_move(&mut graph, &mut viewport, CANVAS, vec2(60.0, 30.0));
        assert_eq!(viewport.pan(), vec2(50.0, 20.0));

        controller.pointer_up();
        controller.click(&graph, &viewport, vec2(60.0, 30.0));
        assert_eq!(controller.selection(), &Selection::None);
    }

    #[test]
    fn hover_is_tracked_only_while_idle() {
        let mut graph = sample_graph();
        let mut viewport = Viewport::default();
        let mut controller = InteractionController::default();
        let center = graph.nodes[0].position;

        controller.pointer_move(&mut graph, &mut viewport, CANVAS, center);
        assert_eq!(controller.hovered(), Some(0));
        assert_eq!(controller.tooltip_anchor(), Some(center));

        controller.pointer_leave();
        assert_eq!(controller.hovered(), None);
        assert_eq!(controller.tooltip_anchor(), None);
    }

    #[test]
    fn hit_test_prefers_array_order() {
        let mut graph = sample_graph();
        let shared = graph.nodes[0].position;
        graph.nodes[1].position = shared;
        let viewport = Viewport::default();
        assert_eq!(hit_test(&graph, &viewport, shared), Some(0));
    }

    #[test]
    fn edge_selection_replaces_node_selection() {
        let graph = sample_graph();
        let mut controller = InteractionController::default();
        controller.select_node("Focal");
        controller.select_edge(&graph.edges[0].key);
        assert_eq!(controller.selection().node_id(), None);
        assert_eq!(
            controller.selection(),
            &Selection::Edge(graph.edges[0].key.clone())
        );
    }
}
