mod build;
mod model;
mod risk;

pub use build::{BuildConfig, build_flow_graph};
pub use model::{
    Direction, EdgeKind, FlowEdge, FlowGraph, FlowNode, LAMPORTS_PER_NATIVE, NodeKind, RiskLevel,
};
