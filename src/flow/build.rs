use std::collections::HashSet;

use eframe::egui::{Vec2, vec2};
use tracing::debug;

use crate::chain::{NativeTransfer, TokenTransfer, Transaction};
use crate::util::{stable_pair, truncate_address};

use super::model::{
    Direction, EdgeKind, FlowEdge, FlowGraph, FlowNode, GraphStats, LAMPORTS_PER_NATIVE,
    NodeKind, RiskLevel, edge_key,
};
use super::risk::{calculate_risk_level, heuristic_risk_score};

const CENTRAL_RADIUS: f32 = 30.0;
const TOKEN_RADIUS: f32 = 8.0;
const MIN_NODE_RADIUS: f32 = 12.0;
const RADIUS_SCALE: f32 = 8.0;
const ORBIT_SLOTS: usize = 12;
const BASE_ORBIT: f32 = 150.0;
const ORBIT_RING_STEP: f32 = 40.0;
const ORBIT_JITTER: f32 = 40.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Clone, Copy, Debug)]
pub struct BuildConfig {
    /// Logical canvas size; the focal node starts at its centre.
    pub canvas: Vec2,
    /// Token transfers at or below this amount are not drawn.
    pub token_threshold: f64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            canvas: vec2(800.0, 600.0),
            token_threshold: 1_000.0,
        }
    }
}

pub fn native_node_radius(amount: f64) -> f32 {
    ((amount.max(0.0) + 1.0).log10() as f32) * RADIUS_SCALE + MIN_NODE_RADIUS
}

fn native_stroke_width(amount: f64) -> f32 {
    (1.0 + ((amount.max(0.0) + 1.0).log10() as f32) * 2.0).min(8.0)
}

fn token_stroke_width(token_amount: f64) -> f32 {
    (1.0 + ((token_amount.max(0.0) + 1.0).log10() as f32) * 0.5).min(4.0)
}

struct FlowGraphBuilder<'a> {
    focal: &'a str,
    config: &'a BuildConfig,
    graph: FlowGraph,
    placed: usize,
}

impl<'a> FlowGraphBuilder<'a> {
    fn new(focal: &'a str, config: &'a BuildConfig) -> Self {
        Self {
            focal,
            config,
            graph: FlowGraph::new(focal),
            placed: 0,
        }
    }

    fn center(&self) -> Vec2 {
        self.config.canvas * 0.5
    }

    fn add_central(&mut self) {
        self.graph.insert_node(FlowNode {
            id: self.focal.to_string(),
            kind: NodeKind::Central,
            amount: 0.0,
            transaction_count: 0,
            risk_level: RiskLevel::Low,
            position: self.center(),
            velocity: None,
            radius: CENTRAL_RADIUS,
            label: truncate_address(self.focal),
        });
    }

    /// Spreads counterparties evenly around the focal node, one ring per
    /// `ORBIT_SLOTS` counterparties, with a per-id jitter on the distance.
    fn orbit_position(&mut self, id: &str) -> Vec2 {
        let slot = self.placed;
        self.placed += 1;

        let angle = ((slot % ORBIT_SLOTS) as f32 / ORBIT_SLOTS as f32) * std::f32::consts::TAU;
        let ring = (slot / ORBIT_SLOTS) as f32;
        let (jitter, _) = stable_pair(id);
        let distance = BASE_ORBIT + ring * ORBIT_RING_STEP + (jitter + 1.0) * 0.5 * ORBIT_JITTER;
        self.center() + vec2(angle.cos(), angle.sin()) * distance
    }

    fn touch_node(&mut self, id: &str, amount: f64) -> bool {
        let Some(node) = self.graph.node_mut(id) else {
            return false;
        };
        node.amount += amount;
        node.transaction_count += 1;
        true
    }

    fn add_native(&mut self, transfer: &NativeTransfer, transaction: &Transaction) {
        let is_incoming = transfer.to == self.focal;
        let counterparty = if is_incoming {
            transfer.from.as_str()
        } else {
            transfer.to.as_str()
        };
        if counterparty.is_empty() || counterparty == self.focal {
            return;
        }

        let amount = transfer.amount / LAMPORTS_PER_NATIVE;
        if !self.touch_node(counterparty, amount) {
            let position = self.orbit_position(counterparty);
            self.graph.insert_node(FlowNode {
                id: counterparty.to_string(),
                kind: if is_incoming {
                    NodeKind::Inflow
                } else {
                    NodeKind::Outflow
                },
                amount,
                transaction_count: 1,
                risk_level: calculate_risk_level(amount),
                position,
                velocity: None,
                radius: native_node_radius(amount),
                label: truncate_address(counterparty),
            });
        }

        let (Some(from), Some(to)) = (
            self.graph.node_index(&transfer.from),
            self.graph.node_index(&transfer.to),
        ) else {
            return;
        };

        self.graph.upsert_edge(FlowEdge {
            key: edge_key(&transfer.from, &transfer.to, EdgeKind::Native, None),
            from,
            to,
            amount: transfer.amount,
            kind: EdgeKind::Native,
            mint: None,
            timestamp: transaction.timestamp,
            signature: transaction.signature.clone(),
            direction: if is_incoming {
                Direction::In
            } else {
                Direction::Out
            },
            stroke_width: native_stroke_width(amount),
        });
    }

    fn token_endpoint_id(&self, address: &str, mint: &str) -> String {
        if address == self.focal {
            address.to_string()
        } else {
            format!("{mint}:{address}")
        }
    }

    fn add_token(&mut self, transfer: &TokenTransfer, transaction: &Transaction) {
        if transfer.token_amount <= self.config.token_threshold {
            return;
        }

        let is_incoming = transfer.to == self.focal;
        let counterparty = if is_incoming {
            transfer.from.as_str()
        } else {
            transfer.to.as_str()
        };
        if counterparty.is_empty() || counterparty == self.focal {
            return;
        }

        let node_id = format!("{}:{counterparty}", transfer.mint);
        if !self.touch_node(&node_id, transfer.token_amount) {
            let position = self.orbit_position(&node_id);
            self.graph.insert_node(FlowNode {
                label: truncate_address(counterparty),
                id: node_id,
                kind: NodeKind::Token,
                amount: transfer.token_amount,
                transaction_count: 1,
                risk_level: RiskLevel::Low,
                position,
                velocity: None,
                radius: TOKEN_RADIUS,
            });
        }

        let from_id = self.token_endpoint_id(&transfer.from, &transfer.mint);
        let to_id = self.token_endpoint_id(&transfer.to, &transfer.mint);
        let (Some(from), Some(to)) = (
            self.graph.node_index(&from_id),
            self.graph.node_index(&to_id),
        ) else {
            return;
        };

        self.graph.upsert_edge(FlowEdge {
            key: edge_key(&from_id, &to_id, EdgeKind::Token, Some(&transfer.mint)),
            from,
            to,
            amount: transfer.token_amount,
            kind: EdgeKind::Token,
            mint: Some(transfer.mint.clone()),
            timestamp: transaction.timestamp,
            signature: transaction.signature.clone(),
            direction: if is_incoming {
                Direction::In
            } else {
                Direction::Out
            },
            stroke_width: token_stroke_width(transfer.token_amount),
        });
    }
}

fn compute_stats(transactions: &[Transaction], external_risk: Option<f64>) -> GraphStats {
    if transactions.is_empty() {
        return GraphStats::default();
    }

    let mut endpoints = HashSet::new();
    let mut total_volume = 0.0;
    for transaction in transactions {
        for transfer in &transaction.native_transfers {
            total_volume += transfer.amount / LAMPORTS_PER_NATIVE;
            endpoints.insert(transfer.from.as_str());
            endpoints.insert(transfer.to.as_str());
        }
        for transfer in &transaction.token_transfers {
            endpoints.insert(transfer.from.as_str());
            endpoints.insert(transfer.to.as_str());
        }
    }
    endpoints.remove("");

    let mut timestamps = transactions.iter().filter_map(|transaction| transaction.timestamp);
    let time_span_days = match timestamps.next() {
        Some(first) => {
            let (min, max, count) = timestamps.fold((first, first, 1usize), |(min, max, count), ts| {
                (min.min(ts), max.max(ts), count + 1)
            });
            if count >= 2 {
                ((max - min) as f64 / SECONDS_PER_DAY).ceil() as u32
            } else {
                1
            }
        }
        None => 1,
    };

    let max_fee = transactions
        .iter()
        .filter_map(|transaction| transaction.fee)
        .fold(0.0, f64::max);
    let risk_score = external_risk
        .filter(|score| score.is_finite())
        .unwrap_or_else(|| heuristic_risk_score(transactions.len(), total_volume, max_fee));

    GraphStats {
        total_transactions: transactions.len(),
        total_volume,
        unique_counterparty_count: endpoints.len(),
        time_span_days,
        risk_score,
    }
}

/// Builds the value-flow graph around `focal`.
///
/// Counterparties become nodes in the order they are first seen; transfers
/// between the same pair of endpoints with the same kind and mint are merged
/// into one edge regardless of direction. Never fails: unusable transfers
/// are skipped.
pub fn build_flow_graph(
    focal: &str,
    transactions: &[Transaction],
    external_risk: Option<f64>,
    config: &BuildConfig,
) -> FlowGraph {
    let stats = compute_stats(transactions, external_risk);
    if transactions.is_empty() || focal.is_empty() {
        let mut graph = FlowGraph::new(focal);
        graph.stats = stats;
        return graph;
    }

    let mut builder = FlowGraphBuilder::new(focal, config);
    builder.add_central();

    for transaction in transactions {
        for transfer in &transaction.native_transfers {
            builder.add_native(transfer, transaction);
        }
        for transfer in &transaction.token_transfers {
            builder.add_token(transfer, transaction);
        }
    }

    let mut graph = builder.graph;
    if let Some(central) = graph.node_mut(focal) {
        central.amount = stats.total_volume;
        central.transaction_count = stats.total_transactions as u32;
        central.risk_level = calculate_risk_level(stats.total_volume);
    }
    graph.stats = stats;

    debug!(
        focal,
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "built flow graph"
    );
    graph
}
