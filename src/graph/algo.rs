//! Graph algorithms: cycle membership and reachability classification.

use std::collections::{HashMap, HashSet, VecDeque};

use super::Graph;

/// Detect cycle membership via topological reduction (Kahn's algorithm):
/// repeatedly remove zero-in-degree nodes; whatever survives sits on or
/// behind a cycle. Returns the surviving node ids, sorted for
/// deterministic reporting; empty means the graph is acyclic.
pub fn cycle_members(graph: &Graph) -> Vec<String> {
    let mut indegree: HashMap<&str, usize> =
        graph.nodes.iter().map(|n| (n.id.as_str(), 0)).collect();
    let mut forward: HashMap<&str, Vec<&str>> = HashMap::new();
    for e in &graph.edges {
        forward.entry(e.from.as_str()).or_default().push(e.to.as_str());
        if let Some(d) = indegree.get_mut(e.to.as_str()) {
            *d += 1;
        }
    }

    let mut queue: VecDeque<&str> = indegree
        .iter()
        .filter(|(_, d)| **d == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut removed = HashSet::new();
    while let Some(id) = queue.pop_front() {
        if !removed.insert(id) {
            continue;
        }
        for next in forward.get(id).into_iter().flatten() {
            if let Some(d) = indegree.get_mut(next) {
                *d = d.saturating_sub(1);
                if *d == 0 {
                    queue.push_back(next);
                }
            }
        }
    }

    let mut rest: Vec<String> = graph
        .nodes
        .iter()
        .filter(|n| !removed.contains(n.id.as_str()))
        .map(|n| n.id.clone())
        .collect();
    rest.sort();
    rest
}

/// Dual-direction reachability classification for a pipeline graph with
/// a designated entry (`ingress`) and exit (`egress`) node.
///
/// The three per-node classes are mutually exclusive for a given degree
/// state: a node with zero incident edges is only ever `disconnected`;
/// the other two classes require at least one incident edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reachability {
    /// Nodes with edges that the forward traversal from entry never
    /// visits. Entry and exit are excluded: a missing entry-to-exit
    /// path is the `no_path` flag's report, not a per-node one.
    pub unreachable: Vec<String>,
    /// Nodes with edges that the backward traversal from exit never
    /// visits (entry and exit excluded, as above).
    pub nonterminating: Vec<String>,
    /// Nodes with zero incident edges, excluding entry and exit.
    pub disconnected: Vec<String>,
    /// True when both entry and exit are declared but the forward
    /// traversal never reaches the exit.
    pub no_path: bool,
}

impl Reachability {
    /// Classify the nodes of `graph`. Output vectors keep node
    /// declaration order, which is already deterministic.
    pub fn classify(graph: &Graph) -> Self {
        let entry = graph.node_by_kind("ingress").map(|n| n.id.clone());
        let exit = graph.node_by_kind("egress").map(|n| n.id.clone());

        let mut forward: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut backward: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut degree: HashMap<&str, usize> = HashMap::new();
        for e in &graph.edges {
            forward.entry(e.from.as_str()).or_default().push(e.to.as_str());
            backward.entry(e.to.as_str()).or_default().push(e.from.as_str());
            *degree.entry(e.from.as_str()).or_default() += 1;
            *degree.entry(e.to.as_str()).or_default() += 1;
        }

        let from_entry = bfs(entry.as_deref(), &forward);
        let to_exit = bfs(exit.as_deref(), &backward);

        let mut out = Reachability::default();
        for node in &graph.nodes {
            let id = node.id.as_str();
            let incident = degree.get(id).copied().unwrap_or(0);
            if Some(id) == entry.as_deref() || Some(id) == exit.as_deref() {
                continue;
            }
            if incident == 0 {
                out.disconnected.push(node.id.clone());
                continue;
            }
            if entry.is_some() && !from_entry.contains(id) {
                out.unreachable.push(node.id.clone());
            }
            if exit.is_some() && !to_exit.contains(id) {
                out.nonterminating.push(node.id.clone());
            }
        }
        out.no_path = match (&entry, &exit) {
            (Some(_), Some(exit)) => !from_entry.contains(exit.as_str()),
            _ => false,
        };
        out
    }
}

fn bfs<'a>(start: Option<&'a str>, adjacency: &HashMap<&'a str, Vec<&'a str>>) -> HashSet<&'a str> {
    let mut visited = HashSet::new();
    let Some(start) = start else {
        return visited;
    };
    let mut queue = VecDeque::from([start]);
    while let Some(id) = queue.pop_front() {
        if !visited.insert(id) {
            continue;
        }
        for next in adjacency.get(id).into_iter().flatten() {
            if !visited.contains(next) {
                queue.push_back(next);
            }
        }
    }
    visited
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, EdgeMode, Node};
    use std::collections::BTreeMap;

    fn node(id: &str, kind: &str) -> Node {
        Node {
            id: id.into(),
            kind: kind.into(),
            label: kind.into(),
        }
    }

    fn edge(from: &str, to: &str) -> Edge {
        Edge {
            from: from.into(),
            to: to.into(),
            attrs: BTreeMap::new(),
        }
    }

    fn graph(nodes: Vec<Node>, edges: Vec<Edge>) -> Graph {
        Graph {
            package: "App".into(),
            unit: "u.rill".into(),
            name: "P".into(),
            mode: EdgeMode::Explicit,
            nodes,
            edges,
        }
    }

    #[test]
    fn acyclic_graph_has_no_members() {
        let g = graph(
            vec![node("a", "ingress"), node("b", "transform"), node("c", "egress")],
            vec![edge("a", "b"), edge("b", "c")],
        );
        assert!(cycle_members(&g).is_empty());
    }

    #[test]
    fn cycle_members_are_sorted() {
        let g = graph(
            vec![node("c", "x"), node("b", "x"), node("a", "ingress")],
            vec![edge("a", "b"), edge("b", "c"), edge("c", "b")],
        );
        assert_eq!(cycle_members(&g), vec!["b", "c"]);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let g = graph(vec![node("a", "x")], vec![edge("a", "a")]);
        assert_eq!(cycle_members(&g), vec!["a"]);
    }

    #[test]
    fn classifies_unreachable_and_nonterminating() {
        // entry -> a; b -> exit; a cannot reach exit, b unreachable
        let g = graph(
            vec![
                node("in", "ingress"),
                node("a", "transform"),
                node("b", "transform"),
                node("out", "egress"),
            ],
            vec![edge("in", "a"), edge("b", "out")],
        );
        let r = Reachability::classify(&g);
        assert_eq!(r.unreachable, vec!["b"]);
        assert_eq!(r.nonterminating, vec!["a"]);
        assert!(r.disconnected.is_empty());
        assert!(r.no_path);
    }

    #[test]
    fn zero_degree_node_is_only_disconnected() {
        let g = graph(
            vec![
                node("in", "ingress"),
                node("a", "transform"),
                node("b", "transform"),
                node("out", "egress"),
            ],
            vec![edge("in", "a"), edge("a", "out")],
        );
        let r = Reachability::classify(&g);
        assert_eq!(r.disconnected, vec!["b"]);
        assert!(!r.unreachable.contains(&"b".to_string()));
        assert!(!r.nonterminating.contains(&"b".to_string()));
        assert!(!r.no_path);
    }

    #[test]
    fn no_path_requires_both_endpoints_declared() {
        let g = graph(
            vec![node("in", "ingress"), node("a", "transform")],
            vec![edge("in", "a")],
        );
        let r = Reachability::classify(&g);
        assert!(!r.no_path);
    }

    #[test]
    fn entry_and_exit_are_not_self_reported() {
        // only the backward edge exists: the endpoint failure is the
        // no_path flag's report, never a per-node class
        let g = graph(
            vec![node("in", "ingress"), node("out", "egress")],
            vec![edge("out", "in")],
        );
        let r = Reachability::classify(&g);
        assert!(r.unreachable.is_empty());
        assert!(r.nonterminating.is_empty());
        assert!(r.disconnected.is_empty());
        assert!(r.no_path);
    }
}
