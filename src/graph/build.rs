//! Pipeline graph construction.
//!
//! Converts one pipeline declaration into a [`Graph`]: step statements
//! become nodes in declaration order; explicit edge statements (when any
//! exist) become edges with endpoints resolved through a first-wins
//! name-to-id map, otherwise a linear chain is synthesized.
//! Edge attributes are derived from the source step's declared
//! attributes. Malformed or absent attributes never raise errors;
//! omission is always an acceptable derived state.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::frontend::ast::{PipelineDecl, StepStmt};

use super::{Edge, EdgeMode, Graph, Node};

/// Build the graph for one pipeline declaration.
pub fn build_graph(package: &str, unit: &str, decl: &PipelineDecl) -> Graph {
    let mut nodes = Vec::new();
    let mut id_by_name: HashMap<&str, String> = HashMap::new();
    let mut step_ids = Vec::new();

    for (index, step) in decl.steps().enumerate() {
        let id = format!("{index:02}:{kind}", kind = step.kind);
        let label = match step.attr("type") {
            Some(ty) if !ty.is_empty() => format!("{}<{ty}>", step.kind),
            _ => step.kind.clone(),
        };
        nodes.push(Node {
            id: id.clone(),
            kind: step.kind.clone(),
            label,
        });
        id_by_name.entry(step.name.as_str()).or_insert(id.clone());
        step_ids.push(id);
    }

    let steps: Vec<&StepStmt> = decl.steps().collect();
    let has_explicit = decl.edges().next().is_some();
    let mut edges = Vec::new();

    if has_explicit {
        for edge in decl.edges() {
            let (Some(from), Some(to)) = (
                id_by_name.get(edge.from.as_str()),
                id_by_name.get(edge.to.as_str()),
            ) else {
                // Unresolvable endpoints are silently skipped.
                continue;
            };
            let attrs = steps
                .iter()
                .find(|s| s.name == edge.from)
                .map(|s| derive_edge_attrs(s))
                .unwrap_or_default();
            edges.push(Edge {
                from: from.clone(),
                to: to.clone(),
                attrs,
            });
        }
    } else {
        for window in 0..step_ids.len().saturating_sub(1) {
            edges.push(Edge {
                from: step_ids[window].clone(),
                to: step_ids[window + 1].clone(),
                attrs: derive_edge_attrs(steps[window]),
            });
        }
    }

    Graph {
        package: package.to_string(),
        unit: unit.to_string(),
        name: decl.name.clone(),
        mode: if has_explicit {
            EdgeMode::Explicit
        } else {
            EdgeMode::Chained
        },
        nodes,
        edges,
    }
}

/// Fold a step's declared attributes into derived edge semantics.
pub fn derive_edge_attrs(step: &StepStmt) -> BTreeMap<String, Value> {
    let mut attrs = BTreeMap::new();

    if let Some(buffer) = step.attr("buffer") {
        let mut parts = buffer.split(',');
        let capacity = parts.next().unwrap_or("").trim();
        if !capacity.is_empty() && capacity != "0" {
            attrs.insert("bounded".into(), Value::Bool(true));
        }
        match parts.next().map(str::trim) {
            Some("dropOldest") | Some("dropNewest") => {
                attrs.insert("delivery".into(), "bestEffort".into());
            }
            Some("block") => {
                attrs.insert("delivery".into(), "atLeastOnce".into());
            }
            _ => {}
        }
    }

    if let Some(shunt) = step.attr("shunt") {
        match shunt.trim() {
            "newest" => {
                attrs.insert("delivery".into(), "shuntNewest".into());
            }
            "oldest" => {
                attrs.insert("delivery".into(), "shuntOldest".into());
            }
            _ => {}
        }
    }

    if let Some(ty) = step.attr("type") {
        if !ty.is_empty() {
            attrs.insert("type".into(), ty.into());
        }
    }

    if let Some(multipath) = step.attr("multipath") {
        let joined = multipath
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("|");
        if !joined.is_empty() {
            attrs.insert("multipath".into(), joined.into());
        }
    }

    attrs
}
