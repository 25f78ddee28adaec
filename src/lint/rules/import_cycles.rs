//! Import cycle detection over declared package roots.
//!
//! The adjacency relation is restricted to local imports (`./`, never
//! `../`) that resolve to a declared package root; registry imports
//! cannot close a workspace cycle. Detection is an iterative three-color
//! depth-first search: hitting a gray node means the stack suffix from
//! that node is a cycle. Each cycle is canonicalized by rotating it to
//! its lexicographically smallest root, so the same cycle found from
//! different entry points reports identically and deduplicates cleanly.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::diag::{Diagnostic, Level};
use crate::workspace::{is_local_import, split_import_constraint, Workspace, MANIFEST_NAME};

use super::codes;

#[derive(Clone, Copy, PartialEq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Detect and report all distinct import cycles.
pub fn check(ws: &Workspace) -> Vec<Diagnostic> {
    let adjacency = adjacency(ws);
    let mut color: HashMap<&str, Color> =
        adjacency.keys().map(|r| (*r, Color::White)).collect();
    let mut cycles: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for &root in adjacency.keys() {
        if color[root] != Color::White {
            continue;
        }
        // stack of (node, next-neighbor index)
        let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
        color.insert(root, Color::Gray);
        while let Some((node, idx)) = stack.last().copied() {
            let neighbors = &adjacency[node];
            if idx >= neighbors.len() {
                color.insert(node, Color::Black);
                stack.pop();
                continue;
            }
            stack.last_mut().expect("non-empty stack").1 += 1;
            let next = neighbors[idx];
            match color.get(next).copied() {
                Some(Color::White) => {
                    color.insert(next, Color::Gray);
                    stack.push((next, 0));
                }
                Some(Color::Gray) => {
                    let start = stack
                        .iter()
                        .position(|(n, _)| *n == next)
                        .expect("gray node is on the stack");
                    let cycle: Vec<String> = stack[start..]
                        .iter()
                        .map(|(n, _)| n.to_string())
                        .collect();
                    let canonical = canonicalize(cycle);
                    cycles.entry(canonical.join(" -> ")).or_insert(canonical);
                }
                _ => {}
            }
        }
    }

    cycles
        .into_values()
        .map(|cycle| {
            let display = {
                let mut path = cycle.clone();
                path.push(cycle[0].clone());
                path.join(" -> ")
            };
            Diagnostic::new(
                codes::E_IMPORT_CYCLE,
                Level::Error,
                format!("import cycle: {display}"),
                MANIFEST_NAME,
            )
            .with_data("cycle", cycle)
        })
        .collect()
}

fn adjacency(ws: &Workspace) -> BTreeMap<&str, Vec<&str>> {
    let declared: HashSet<&str> = ws.packages.iter().map(|p| p.root.as_str()).collect();
    let mut adjacency: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for pkg in &ws.packages {
        let edges = adjacency.entry(pkg.root.as_str()).or_default();
        for entry in &pkg.import {
            let (path, _) = split_import_constraint(entry);
            if is_local_import(path) {
                if let Some(target) = declared.get(path) {
                    edges.push(target);
                }
            }
        }
    }
    adjacency
}

// Rotate so the lexicographically smallest root comes first.
fn canonicalize(cycle: Vec<String>) -> Vec<String> {
    let pivot = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, r)| r.as_str())
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut rotated = cycle[pivot..].to_vec();
    rotated.extend_from_slice(&cycle[..pivot]);
    rotated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::Package;

    fn ws(edges: &[(&str, &[&str])]) -> Workspace {
        let packages = edges
            .iter()
            .map(|(root, imports)| Package {
                key: root.trim_start_matches("./").to_string(),
                name: "Pkg".into(),
                version: "0.1.0".into(),
                root: root.to_string(),
                import: imports.iter().map(|s| s.to_string()).collect(),
            })
            .collect();
        Workspace {
            version: "1.0.0".into(),
            packages,
            ..Default::default()
        }
    }

    fn cycle_of(d: &Diagnostic) -> Vec<String> {
        serde_json::from_value(d.data.as_ref().unwrap()["cycle"].clone()).unwrap()
    }

    #[test]
    fn acyclic_workspace_is_clean() {
        let w = ws(&[("./a", &["./b"]), ("./b", &["./c"]), ("./c", &[])]);
        assert!(check(&w).is_empty());
    }

    #[test]
    fn two_node_cycle_is_reported_once() {
        let w = ws(&[("./a", &["./b"]), ("./b", &["./a"])]);
        let diags = check(&w);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, "E_IMPORT_CYCLE");
        assert_eq!(cycle_of(&diags[0]), vec!["./a", "./b"]);
        assert!(diags[0].message.contains("./a -> ./b -> ./a"));
    }

    #[test]
    fn cycle_rotates_to_smallest_root() {
        // discovered from ./z, still reported starting at ./a
        let w = ws(&[("./z", &["./a"]), ("./a", &["./m"]), ("./m", &["./z"])]);
        let diags = check(&w);
        assert_eq!(cycle_of(&diags[0]), vec!["./a", "./m", "./z"]);
    }

    #[test]
    fn self_import_is_a_cycle() {
        let w = ws(&[("./a", &["./a"])]);
        let diags = check(&w);
        assert_eq!(cycle_of(&diags[0]), vec!["./a"]);
    }

    #[test]
    fn registry_imports_never_close_cycles() {
        let w = ws(&[("./a", &["registry/b"]), ("./b", &["./a"])]);
        assert!(check(&w).is_empty());
    }

    #[test]
    fn undeclared_local_imports_are_ignored() {
        let w = ws(&[("./a", &["./ghost"])]);
        assert!(check(&w).is_empty());
    }

    #[test]
    fn separate_cycles_both_report() {
        let w = ws(&[
            ("./a", &["./b"]),
            ("./b", &["./a"]),
            ("./x", &["./y"]),
            ("./y", &["./x"]),
        ]);
        let diags = check(&w);
        assert_eq!(diags.len(), 2);
        assert_eq!(cycle_of(&diags[0]), vec!["./a", "./b"]);
        assert_eq!(cycle_of(&diags[1]), vec!["./x", "./y"]);
    }
}
