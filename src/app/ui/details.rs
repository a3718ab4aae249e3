use eframe::egui::{self, RichText, Ui};

use crate::flow::{Direction, EdgeKind, FlowEdge, FlowGraph, LAMPORTS_PER_NATIVE};
use crate::util::{format_amount, truncate_address};

use super::super::interaction::Selection;
use super::super::render_utils::risk_color;
use super::super::{VisualizerEvent, ViewModel};

fn edge_amount_text(edge: &FlowEdge) -> String {
    match edge.kind {
        EdgeKind::Native => format!("{} native", format_amount(edge.amount / LAMPORTS_PER_NATIVE)),
        EdgeKind::Token => format!("{} tokens", format_amount(edge.amount)),
    }
}

fn direction_arrow(direction: Direction) -> &'static str {
    match direction {
        Direction::In => "in",
        Direction::Out => "out",
    }
}

/// Incident edges of `index`, largest flow first within each kind.
fn connected_flows(graph: &FlowGraph, index: usize) -> Vec<usize> {
    let mut flows = graph
        .incident_edges(index)
        .map(|(edge_index, _)| edge_index)
        .collect::<Vec<_>>();
    flows.sort_by(|a, b| {
        let (a, b) = (&graph.edges[*a], &graph.edges[*b]);
        (a.kind == EdgeKind::Token)
            .cmp(&(b.kind == EdgeKind::Token))
            .then_with(|| b.amount.total_cmp(&a.amount))
    });
    flows
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        match self.interaction.selection().clone() {
            Selection::None => {
                ui.label("Click a node to inspect it.");
            }
            Selection::Node(id) => self.draw_node_details(ui, &id),
            Selection::Edge(key) => self.draw_edge_details(ui, &key),
        }
    }

    fn draw_node_details(&mut self, ui: &mut Ui, id: &str) {
        let Some(index) = self.graph.node_index(id) else {
            ui.label("Selected node no longer exists in the graph.");
            return;
        };
        let node = &self.graph.nodes[index];

        ui.label(RichText::new(node.label.as_str()).strong());
        ui.small(node.id.as_str());
        ui.add_space(6.0);

        ui.label(format!("Kind: {}", node.kind.label()));
        ui.label(format!("Amount: {}", format_amount(node.amount)));
        ui.label(format!("Transfers: {}", node.transaction_count));
        ui.label(
            RichText::new(format!("Risk: {}", node.risk_level.label()))
                .color(risk_color(node.risk_level)),
        );

        let address = node.id.rsplit(':').next().unwrap_or(node.id.as_str()).to_string();
        let can_analyze = address != self.graph.focal && !self.loading;
        if ui
            .add_enabled(can_analyze, egui::Button::new("Analyze address"))
            .on_hover_text("Load this address as the new focal point.")
            .clicked()
        {
            let _ = self.events.send(VisualizerEvent::AnalyzeAddress(address));
        }

        ui.separator();
        ui.label(RichText::new("Connected flows").strong());

        let flows = connected_flows(&self.graph, index);
        if flows.is_empty() {
            ui.label("No flows recorded for this node.");
            return;
        }

        let row_count = flows.len().min(self.related_rows_visible);
        let mut should_load_more = false;
        let mut clicked_edge = None;

        egui::ScrollArea::vertical()
            .id_salt("connected_flows_scroll")
            .max_height(360.0)
            .auto_shrink([false, false])
            .show_rows(ui, 22.0, row_count, |ui, row_range| {
                if row_range.end + Self::RELATED_PREFETCH_MARGIN >= row_count {
                    should_load_more = true;
                }

                for row in row_range {
                    let Some(edge) = flows.get(row).and_then(|&edge| self.graph.edges.get(edge))
                    else {
                        continue;
                    };
                    let other = if edge.from == index { edge.to } else { edge.from };
                    let other_label = self
                        .graph
                        .nodes
                        .get(other)
                        .map(|node| node.label.as_str())
                        .unwrap_or("?");

                    let label = format!(
                        "{}  {}  [{}]",
                        other_label,
                        edge_amount_text(edge),
                        direction_arrow(edge.direction)
                    );
                    if ui.link(label).on_hover_text(edge.signature.as_str()).clicked() {
                        clicked_edge = Some(edge.key.clone());
                    }
                }
            });

        if let Some(key) = clicked_edge {
            self.interaction.select_edge(&key);
        }
        if should_load_more && row_count < flows.len() {
            self.related_rows_visible = (row_count + Self::RELATED_PAGE_ROWS).min(flows.len());
        }
    }

    fn draw_edge_details(&mut self, ui: &mut Ui, key: &str) {
        let Some(edge) = self.graph.edge(key) else {
            ui.label("Selected flow no longer exists in the graph.");
            return;
        };
        let (Some(from), Some(to)) = (self.graph.nodes.get(edge.from), self.graph.nodes.get(edge.to))
        else {
            return;
        };

        ui.label(RichText::new(format!("{} flow", edge.kind.label())).strong());
        ui.add_space(6.0);
        ui.label(format!("From: {}", from.label)).on_hover_text(from.id.as_str());
        ui.label(format!("To: {}", to.label)).on_hover_text(to.id.as_str());
        ui.label(format!("Amount: {}", edge_amount_text(edge)));
        ui.label(format!("Direction: {}", direction_arrow(edge.direction)));
        if let Some(mint) = &edge.mint {
            ui.label(format!("Mint: {}", truncate_address(mint)))
                .on_hover_text(mint.as_str());
        }
        ui.label(format!("Signature: {}", truncate_address(&edge.signature)))
            .on_hover_text(edge.signature.as_str());
        match edge.timestamp {
            Some(timestamp) => ui.label(format!("Timestamp: {timestamp}")),
            None => ui.label("Timestamp: unknown"),
        };

        let (from_id, to_id) = (from.id.clone(), to.id.clone());
        ui.add_space(6.0);
        ui.horizontal(|ui| {
            if ui.button("Select sender").clicked() {
                self.interaction.select_node(&from_id);
            }
            if ui.button("Select receiver").clicked() {
                self.interaction.select_node(&to_id);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::chain::{NativeTransfer, Transaction};
    use crate::flow::{BuildConfig, build_flow_graph};

    use super::*;

    #[test]
    fn connected_flows_sort_largest_first() {
        let transfer = |from: &str, to: &str, amount: f64| NativeTransfer {
            from: from.into(),
            to: to.into(),
            amount,
        };
        let transaction = Transaction {
            signature: "sig".into(),
            timestamp: None,
            fee: None,
            native_transfers: vec![
                transfer("Small", "Focal", 10.0),
                transfer("Focal", "Large", 5_000.0),
                transfer("Medium", "Focal", 800.0),
            ],
            token_transfers: Vec::new(),
        };
        let graph = build_flow_graph("Focal", &[transaction], None, &BuildConfig::default());
        let focal = graph.node_index("Focal").unwrap();

        let amounts = connected_flows(&graph, focal)
            .into_iter()
            .map(|edge| graph.edges[edge].amount)
            .collect::<Vec<_>>();
        assert_eq!(amounts, vec![5_000.0, 800.0, 10.0]);
    }

    #[test]
    fn native_amounts_are_shown_in_native_units() {
        let transaction = Transaction {
            signature: "sig".into(),
            timestamp: None,
            fee: None,
            native_transfers: vec![NativeTransfer {
                from: "A".into(),
                to: "Focal".into(),
                amount: 2_500_000_000.0,
            }],
            token_transfers: Vec::new(),
        };
        let graph = build_flow_graph("Focal", &[transaction], None, &BuildConfig::default());
        assert_eq!(edge_amount_text(&graph.edges[0]), "2.5000 native");
    }
}
