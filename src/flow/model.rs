use std::collections::HashMap;

use eframe::egui::Vec2;

pub const LAMPORTS_PER_NATIVE: f64 = 1_000_000_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Central,
    Inflow,
    Outflow,
    Token,
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Central => "focal address",
            Self::Inflow => "inflow",
            Self::Outflow => "outflow",
            Self::Token => "token",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Native,
    Token,
}

impl EdgeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Token => "token",
        }
    }
}

/// Flow direction relative to the focal address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

#[derive(Clone, Debug)]
pub struct FlowNode {
    pub id: String,
    pub kind: NodeKind,
    /// Native units for wallet nodes, token units for token nodes.
    pub amount: f64,
    pub transaction_count: u32,
    pub risk_level: RiskLevel,
    pub position: Vec2,
    pub velocity: Option<Vec2>,
    pub radius: f32,
    pub label: String,
}

#[derive(Clone, Debug)]
pub struct FlowEdge {
    pub key: String,
    pub from: usize,
    pub to: usize,
    /// Raw transfer units, summed over every merged transfer.
    pub amount: f64,
    pub kind: EdgeKind,
    pub mint: Option<String>,
    pub timestamp: Option<i64>,
    pub signature: String,
    pub direction: Direction,
    pub stroke_width: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphStats {
    pub total_transactions: usize,
    /// Native units.
    pub total_volume: f64,
    pub unique_counterparty_count: usize,
    pub time_span_days: u32,
    pub risk_score: f64,
}

/// Node/edge arena for one focal address. Nodes and edges are addressed by
/// their index, which stays stable because nothing is ever removed.
#[derive(Clone, Debug, Default)]
pub struct FlowGraph {
    pub focal: String,
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
    pub stats: GraphStats,
    index_by_id: HashMap<String, usize>,
    edge_index_by_key: HashMap<String, usize>,
}

pub fn edge_key(a: &str, b: &str, kind: EdgeKind, mint: Option<&str>) -> String {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    format!("{low}|{high}|{}|{}", kind.label(), mint.unwrap_or(""))
}

impl FlowGraph {
    pub fn new(focal: &str) -> Self {
        Self {
            focal: focal.to_string(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.node_index(id).and_then(|index| self.nodes.get(index))
    }

    pub fn edge_index(&self, key: &str) -> Option<usize> {
        self.edge_index_by_key.get(key).copied()
    }

    pub fn edge(&self, key: &str) -> Option<&FlowEdge> {
        self.edge_index(key).and_then(|index| self.edges.get(index))
    }

    pub fn incident_edges(&self, index: usize) -> impl Iterator<Item = (usize, &FlowEdge)> {
        self.edges
            .iter()
            .enumerate()
            .filter(move |(_, edge)| edge.from == index || edge.to == index)
    }

    /// Inserts `node` unless its id is already present; returns the index of
    /// the node carrying that id either way.
    pub(super) fn insert_node(&mut self, node: FlowNode) -> usize {
        if let Some(index) = self.node_index(&node.id) {
            return index;
        }

        let index = self.nodes.len();
        self.index_by_id.insert(node.id.clone(), index);
        self.nodes.push(node);
        index
    }

    pub(super) fn node_mut(&mut self, id: &str) -> Option<&mut FlowNode> {
        let index = self.node_index(id)?;
        self.nodes.get_mut(index)
    }

    /// Adds `edge`, or folds it into the edge already stored under the same
    /// key: amounts add up, stroke width keeps its maximum, endpoints and
    /// direction stay as first seen, signature and timestamp follow the
    /// latest transfer.
    pub(super) fn upsert_edge(&mut self, edge: FlowEdge) -> usize {
        if let Some(index) = self.edge_index(&edge.key) {
            let existing = &mut self.edges[index];
            existing.amount += edge.amount;
            existing.stroke_width = existing.stroke_width.max(edge.stroke_width);
            existing.signature = edge.signature;
            if edge.timestamp.is_some() {
                existing.timestamp = edge.timestamp;
            }
            return index;
        }

        let index = self.edges.len();
        self.edge_index_by_key.insert(edge.key.clone(), index);
        self.edges.push(edge);
        index
    }
}
