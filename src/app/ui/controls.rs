use eframe::egui::{self, Color32, RichText, Ui};

use crate::flow::{NodeKind, RiskLevel};

use super::super::ViewModel;
use super::super::interaction::Selection;
use super::super::render_utils::{node_color, risk_color};

fn legend_entry(ui: &mut Ui, color: Color32, label: &str) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
        ui.painter().circle_filled(rect.center(), 6.0, color);
        ui.label(label);
    });
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search address")
            .on_hover_text("Fuzzy-highlight matching nodes without changing the graph.");
        let search_response = ui.text_edit_singleline(&mut self.search);
        let submitted = search_response.lost_focus()
            && ui.input(|input| input.key_pressed(egui::Key::Enter));
        search_response.on_hover_text("Press Enter to select the best match.");
        if submitted && let Some(index) = self.best_search_match() {
            let id = self.graph.nodes[index].id.clone();
            self.interaction.select_node(&id);
            self.related_rows_visible = Self::INITIAL_RELATED_ROWS;
        }

        ui.separator();
        ui.label(RichText::new("View").strong());
        ui.horizontal(|ui| {
            if ui.button("−").on_hover_text("Zoom out").clicked() {
                self.viewport.zoom_out_button();
            }
            ui.label(format!("{:.0}%", self.viewport.zoom() * 100.0));
            if ui.button("+").on_hover_text("Zoom in").clicked() {
                self.viewport.zoom_in_button();
            }
            if ui.button("Reset view").clicked() {
                self.viewport.reset();
            }
        });

        ui.checkbox(&mut self.live_physics, "Live physics")
            .on_hover_text("Let counterparties drift and push each other apart.");

        if ui
            .add_enabled(
                *self.interaction.selection() != Selection::None,
                egui::Button::new("Clear selection"),
            )
            .clicked()
        {
            self.interaction.clear_selection();
        }

        ui.separator();
        ui.label(RichText::new("Legend").strong());
        for kind in [
            NodeKind::Central,
            NodeKind::Inflow,
            NodeKind::Outflow,
            NodeKind::Token,
        ] {
            legend_entry(ui, node_color(kind, RiskLevel::Low), kind.label());
        }
        ui.add_space(4.0);
        for level in [
            RiskLevel::Low,
            RiskLevel::Medium,
            RiskLevel::High,
            RiskLevel::Critical,
        ] {
            legend_entry(ui, risk_color(level), &format!("{} risk", level.label()));
        }

        ui.add_space(6.0);
        ui.small("Drag nodes to move them, drag the background to pan, scroll to zoom.");
    }
}
