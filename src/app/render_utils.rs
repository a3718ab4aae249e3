use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::flow::{Direction, EdgeKind, NodeKind, RiskLevel};

pub(super) const SELECTED_COLOR: Color32 = Color32::from_rgb(96, 165, 250);
pub(super) const SEARCH_COLOR: Color32 = Color32::from_rgb(103, 196, 255);

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| ((a as f32 * (1.0 - amount)) + (b as f32 * amount)) as u8;

    Color32::from_rgba_unmultiplied(
        mix(base.r(), overlay.r()),
        mix(base.g(), overlay.g()),
        mix(base.b(), overlay.b()),
        mix(base.a(), overlay.a()),
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (alpha.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// Grid that follows the viewport so panning reads as camera motion.
pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(11, 14, 22));

    let step = (48.0 * zoom.clamp(0.5, 2.0)).max(16.0);
    let origin = rect.min + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(56, 66, 92, 60));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn segment_visible(rect: Rect, start: Pos2, end: Pos2) -> bool {
    let bounds = Rect::from_two_pos(start, end);
    bounds.intersects(rect)
}

pub(super) fn risk_color(level: RiskLevel) -> Color32 {
    match level {
        RiskLevel::Low => Color32::from_rgb(52, 211, 153),
        RiskLevel::Medium => Color32::from_rgb(251, 191, 36),
        RiskLevel::High => Color32::from_rgb(249, 115, 22),
        RiskLevel::Critical => Color32::from_rgb(239, 68, 68),
    }
}

pub(super) fn node_color(kind: NodeKind, risk: RiskLevel) -> Color32 {
    match kind {
        NodeKind::Central => Color32::from_rgb(139, 92, 246),
        NodeKind::Token => Color32::from_rgb(236, 72, 153),
        NodeKind::Inflow => blend_color(Color32::from_rgb(34, 197, 94), risk_color(risk), 0.35),
        NodeKind::Outflow => blend_color(Color32::from_rgb(248, 113, 113), risk_color(risk), 0.35),
    }
}

pub(super) fn edge_color(kind: EdgeKind, direction: Direction) -> Color32 {
    match (kind, direction) {
        (EdgeKind::Token, _) => Color32::from_rgb(236, 72, 153),
        (EdgeKind::Native, Direction::In) => Color32::from_rgb(34, 197, 94),
        (EdgeKind::Native, Direction::Out) => Color32::from_rgb(248, 113, 113),
    }
}

/// Colour for the 0-100 address risk score.
pub(super) fn risk_score_color(score: f64) -> Color32 {
    if score >= 70.0 {
        risk_color(RiskLevel::Critical)
    } else if score >= 40.0 {
        risk_color(RiskLevel::High)
    } else if score >= 20.0 {
        risk_color(RiskLevel::Medium)
    } else {
        risk_color(RiskLevel::Low)
    }
}
