use eframe::egui::{self, Align, Context, Layout, RichText};

use crate::util::{format_amount, truncate_address};

use super::super::ViewModel;
use super::super::render_utils::risk_score_color;

impl ViewModel {
    pub(in crate::app) const INITIAL_RELATED_ROWS: usize = 24;
    pub(in crate::app) const RELATED_PAGE_ROWS: usize = 24;
    pub(in crate::app) const RELATED_PREFETCH_MARGIN: usize = 4;

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        address: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("txflow");
                    ui.separator();
                    ui.label(format!("address: {}", truncate_address(address)))
                        .on_hover_text(address);

                    let stats = &self.graph.stats;
                    ui.label(format!("transactions: {}", stats.total_transactions));
                    ui.label(format!("volume: {}", format_amount(stats.total_volume)));
                    ui.label(format!("counterparties: {}", stats.unique_counterparty_count));
                    ui.label(format!("span: {}d", stats.time_span_days));
                    ui.label(
                        RichText::new(format!("risk: {:.0}", stats.risk_score))
                            .color(risk_score_color(stats.risk_score)),
                    );

                    let reload_button = ui.add_enabled(!is_loading, egui::Button::new("Reload"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if is_loading {
                            ui.spinner();
                        }
                        ui.label(format!(
                            "nodes: {}  edges: {}",
                            self.graph.nodes.len(),
                            self.graph.edges.len()
                        ));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }
}
