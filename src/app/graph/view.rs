use std::f32::consts::TAU;

use eframe::egui::{
    self, Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Shape, Stroke, Ui, Vec2, vec2,
};

use crate::flow::{FlowEdge, FlowNode, NodeKind};
use crate::util::{format_amount, stable_pair};

use super::super::ViewModel;
use super::super::highlight::{HighlightState, build_highlight_state};
use super::super::physics::{separate_nodes, step_physics};
use super::super::render_utils::{
    SEARCH_COLOR, SELECTED_COLOR, blend_color, circle_visible, dim_color, draw_background,
    edge_color, node_color, segment_visible, with_alpha,
};

const PARTICLE_PERIOD: f64 = 2.0;
const TRAIL_SAMPLES: usize = 4;
const TRAIL_SPACING: f32 = 0.035;
const ARROW_GAP: f32 = 4.0;
const ARROW_LENGTH: f32 = 9.0;
const DASH_LENGTH: f32 = 6.0;
const DASH_GAP: f32 = 4.0;
const DASH_SPEED: f64 = 18.0;

struct FrameStyle<'a> {
    rect: Rect,
    time: f64,
    zoom: f32,
    highlight: Option<&'a HighlightState>,
}

impl FrameStyle<'_> {
    fn edge_emphasis(&self, index: usize) -> Option<bool> {
        self.highlight
            .filter(|state| state.is_active())
            .map(|state| state.edges.contains(&index))
    }

    fn node_emphasis(&self, index: usize) -> Option<bool> {
        self.highlight
            .filter(|state| state.is_active())
            .map(|state| state.nodes.contains(&index))
    }
}

impl ViewModel {
    fn to_screen(&self, rect: Rect, world: Vec2) -> Pos2 {
        rect.min + self.viewport.world_to_screen(world)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let time = ui.input(|input| input.time);
        let tick = self.frame_loop.begin_frame(time);

        draw_background(&painter, rect, self.viewport.pan(), self.viewport.zoom());

        if self.graph.is_empty() {
            let message = if self.loading {
                "Loading..."
            } else {
                "No data available"
            };
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                message,
                FontId::proportional(16.0),
                Color32::from_gray(160),
            );
            return;
        }

        self.handle_canvas_input(ui, rect, &response);

        let search_matches = self.cached_search_matches();
        let highlight = build_highlight_state(&self.graph, self.interaction.selection());
        let style = FrameStyle {
            rect,
            time,
            zoom: self.viewport.zoom(),
            highlight: highlight.as_ref(),
        };

        for (index, edge) in self.graph.edges.iter().enumerate() {
            self.draw_edge(&painter, &style, index, edge);
        }

        let dragged = self.interaction.dragged_index();
        if self.live_physics
            && let Some(tick) = tick
        {
            step_physics(
                &mut self.graph,
                &self.physics,
                tick.clock,
                self.config.canvas,
                dragged,
                &mut self.rng,
            );
            separate_nodes(&mut self.graph, &self.physics, dragged);
        }

        let selected_id = self.interaction.selection().node_id();
        let hovered = self.interaction.hovered();
        for (index, node) in self.graph.nodes.iter().enumerate() {
            let state = NodeState {
                selected: selected_id == Some(node.id.as_str()),
                dragged: dragged == Some(index),
                hovered: hovered == Some(index),
                search_match: search_matches
                    .as_ref()
                    .is_some_and(|matches| matches.contains(&index)),
                emphasis: style.node_emphasis(index),
            };
            self.draw_node(&painter, &style, node, state);
        }

        if let Some(index) = hovered
            && let Some(anchor) = self.interaction.tooltip_anchor()
            && let Some(node) = self.graph.nodes.get(index)
        {
            draw_tooltip(&painter, rect, rect.min + anchor, node);
        }
    }

    fn draw_edge(&self, painter: &Painter, style: &FrameStyle<'_>, index: usize, edge: &FlowEdge) {
        let (Some(from), Some(to)) = (self.graph.nodes.get(edge.from), self.graph.nodes.get(edge.to))
        else {
            return;
        };

        let start = self.to_screen(style.rect, from.position);
        let end = self.to_screen(style.rect, to.position);
        let delta = end - start;
        let length = delta.length();
        if length <= f32::EPSILON || !segment_visible(style.rect, start, end) {
            return;
        }
        let direction = delta / length;

        let base = edge_color(edge.kind, edge.direction);
        let color = match style.edge_emphasis(index) {
            Some(true) => blend_color(base, SELECTED_COLOR, 0.35),
            Some(false) => dim_color(base, 0.3),
            None => with_alpha(base, 0.7),
        };
        let width = (edge.stroke_width * style.zoom.sqrt()).clamp(0.6, 10.0);

        let dash_offset = ((style.time * DASH_SPEED) as f32).rem_euclid(DASH_LENGTH + DASH_GAP);
        painter.extend(Shape::dashed_line_with_offset(
            &[start, end],
            Stroke::new(width, color),
            &[DASH_LENGTH],
            &[DASH_GAP],
            dash_offset,
        ));

        let progress = ((style.time / PARTICLE_PERIOD).fract()) as f32;
        for sample in 0..TRAIL_SAMPLES {
            let t = progress - sample as f32 * TRAIL_SPACING;
            if t < 0.0 {
                break;
            }
            let fade = 1.0 - sample as f32 / TRAIL_SAMPLES as f32;
            let radius = (2.0 + width * 0.6) * fade * style.zoom.sqrt().clamp(0.5, 1.6);
            painter.circle_filled(start + delta * t, radius, with_alpha(base, 0.9 * fade));
        }

        let target_radius = to.radius * style.zoom;
        let tip = end - direction * (target_radius + ARROW_GAP);
        let arrow = ARROW_LENGTH * style.zoom.sqrt().clamp(0.6, 1.8);
        let normal = vec2(-direction.y, direction.x);
        let back = tip - direction * arrow;
        painter.add(Shape::convex_polygon(
            vec![tip, back + normal * arrow * 0.5, back - normal * arrow * 0.5],
            color,
            Stroke::NONE,
        ));
    }

    fn draw_node(&self, painter: &Painter, style: &FrameStyle<'_>, node: &FlowNode, state: NodeState) {
        let mut center = self.to_screen(style.rect, node.position);
        let radius = node.radius * style.zoom;
        if !circle_visible(style.rect, center, radius * 2.0 + 20.0) {
            return;
        }

        let (phase, _) = stable_pair(&node.id);
        let time = style.time as f32;
        let breathing = 1.0 + 0.05 * (time * 2.0 + phase * TAU).sin();
        let drawn_radius = radius * breathing;

        let base = node_color(node.kind, node.risk_level);
        if node.kind == NodeKind::Central {
            center += vec2(0.0, (time * 1.3).sin() * 3.0 * style.zoom);
            for ring in 0..3 {
                let cycle = (time * 0.5 + ring as f32 / 3.0).fract();
                painter.circle_stroke(
                    center,
                    radius * (1.0 + cycle * 0.9),
                    Stroke::new(2.0, with_alpha(base, 0.45 * (1.0 - cycle))),
                );
            }
        }

        painter.circle_filled(
            center + vec2(2.0, 3.0),
            drawn_radius,
            Color32::from_rgba_unmultiplied(0, 0, 0, 90),
        );

        let fill = if state.hovered {
            blend_color(base, Color32::WHITE, 0.25)
        } else if state.search_match {
            blend_color(base, SEARCH_COLOR, 0.6)
        } else if state.emphasis == Some(false) {
            dim_color(base, 0.45)
        } else {
            base
        };
        painter.circle_filled(center, drawn_radius, fill);

        if state.selected {
            painter.circle_stroke(
                center,
                drawn_radius + 6.0,
                Stroke::new(4.0, with_alpha(SELECTED_COLOR, 0.4)),
            );
        }
        let border = if state.selected || state.dragged {
            Stroke::new(3.0, SELECTED_COLOR)
        } else if state.search_match {
            Stroke::new(2.0, SEARCH_COLOR)
        } else {
            Stroke::new(1.5, Color32::from_rgba_unmultiplied(230, 230, 240, 150))
        };
        painter.circle_stroke(center, drawn_radius, border);

        let label_color = if state.emphasis == Some(false) {
            Color32::from_gray(110)
        } else {
            Color32::from_gray(225)
        };
        painter.text(
            center + vec2(0.0, drawn_radius + 4.0),
            Align2::CENTER_TOP,
            node.label.as_str(),
            FontId::proportional((11.0 * style.zoom.sqrt()).clamp(9.0, 16.0)),
            label_color,
        );
    }
}

#[derive(Clone, Copy)]
struct NodeState {
    selected: bool,
    dragged: bool,
    hovered: bool,
    search_match: bool,
    emphasis: Option<bool>,
}

fn draw_tooltip(painter: &Painter, rect: Rect, anchor: Pos2, node: &FlowNode) {
    let text = format!(
        "{}\n{}\namount: {}\ntransfers: {}\nrisk: {}",
        node.label,
        node.kind.label(),
        format_amount(node.amount),
        node.transaction_count,
        node.risk_level.label(),
    );
    let galley = painter.layout_no_wrap(text, FontId::proportional(12.0), Color32::from_gray(235));
    let padding = vec2(8.0, 6.0);
    let size = galley.size() + padding * 2.0;

    let mut origin = anchor + vec2(14.0, 14.0);
    if origin.x + size.x > rect.right() {
        origin.x = anchor.x - size.x - 14.0;
    }
    if origin.y + size.y > rect.bottom() {
        origin.y = anchor.y - size.y - 14.0;
    }

    let frame = Rect::from_min_size(origin, size);
    painter.rect_filled(frame, 6.0, Color32::from_rgba_unmultiplied(17, 24, 39, 235));
    painter.rect_stroke(
        frame,
        6.0,
        Stroke::new(1.0, Color32::from_gray(80)),
        egui::StrokeKind::Inside,
    );
    painter.galley(origin + padding, galley, Color32::from_gray(235));
}
