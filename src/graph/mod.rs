//! Pipeline graph model.
//!
//! One [`Graph`] is built per pipeline declaration. Node identifiers are
//! stable (`"00:ingress"`, declaration index plus lower-cased step
//! kind) and unique within a graph; edges reference only existing node
//! identifiers. Whether the edges came from explicit edge statements or
//! were synthesized as a linear chain is decided once at build time and
//! recorded as [`EdgeMode`], so downstream consumers never re-derive it.

pub mod algo;
pub mod build;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// How a graph's edges were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeMode {
    /// Built from explicit edge statements.
    Explicit,
    /// Synthesized as a linear chain in declaration order.
    Chained,
}

/// A pipeline graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    /// Stable identifier, e.g. `"02:collect"`.
    pub id: String,
    /// Lower-cased step category.
    pub kind: String,
    /// Display label, annotated with the declared element type when one
    /// is present.
    pub label: String,
}

/// A directed edge with derived attribute map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    /// Derived semantics: `bounded`, `delivery`, `type`, `multipath`.
    /// BTreeMap keeps key order deterministic.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, Value>,
}

/// The graph for one declared pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Graph {
    /// Originating package name.
    pub package: String,
    /// Originating source unit (file name).
    pub unit: String,
    /// Pipeline name.
    pub name: String,
    pub mode: EdgeMode,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    /// A copy with nodes sorted by id and edges by (from, to), for
    /// deterministic emission regardless of build order.
    pub fn canonicalized(&self) -> Graph {
        let mut g = self.clone();
        g.nodes.sort_by(|a, b| a.id.cmp(&b.id));
        g.edges
            .sort_by(|a, b| a.from.cmp(&b.from).then_with(|| a.to.cmp(&b.to)));
        g
    }

    /// Find a node by kind (first declared wins).
    pub fn node_by_kind(&self, kind: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.kind == kind)
    }
}
