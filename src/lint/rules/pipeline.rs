//! Pipeline rules: graph structure, buffer/sort attribute hygiene,
//! decorator policy, and capability/trust hints.
//!
//! All findings are filtered through the unit's pragma table before they
//! leave this module, because only the producer knows which file and
//! line a finding belongs to.

use crate::diag::{Diagnostic, Level};
use crate::frontend::ast::{PipelineDecl, SourceAst, StepStmt};
use crate::graph::algo::{cycle_members, Reachability};
use crate::graph::build::build_graph;
use crate::lint::pragma::PragmaTable;
use crate::workspace::LinterConfig;

use super::codes;

/// Run every pipeline rule over one parsed source unit.
pub fn check(file: &str, ast: &SourceAst, config: &LinterConfig) -> Vec<Diagnostic> {
    let pragmas = PragmaTable::from_directives(&ast.directives);
    let package = ast.package.as_deref().unwrap_or("");
    let mut out = Vec::new();

    for decl in &ast.pipelines {
        check_structure(file, package, decl, &mut out);
        for step in decl.steps() {
            check_buffer(file, step, &mut out);
            check_sort(file, step, &mut out);
            check_decorators(file, step, config, &mut out);
        }
        check_io(file, decl, &pragmas, &mut out);
    }

    out.retain(|d| !pragmas.is_disabled(&d.code, d.pos.map(|p| p.line)));
    out
}

fn check_structure(file: &str, package: &str, decl: &PipelineDecl, out: &mut Vec<Diagnostic>) {
    // ids are index-prefixed, so canonical order is declaration order
    let graph = build_graph(package, file, decl).canonicalized();

    let members = cycle_members(&graph);
    if !members.is_empty() {
        out.push(
            Diagnostic::new(
                codes::E_PIPELINE_CYCLE,
                Level::Error,
                format!("pipeline {:?} contains a cycle", decl.name),
                file,
            )
            .with_pos(decl.pos)
            .with_data("pipeline", decl.name.as_str())
            .with_data("members", members),
        );
        // reachability over a cyclic graph would double-report
        return;
    }

    // node id -> declaring step position
    let pos_by_id: std::collections::HashMap<String, _> = decl
        .steps()
        .enumerate()
        .map(|(index, step)| (format!("{index:02}:{kind}", kind = step.kind), step.pos))
        .collect();
    let node_diag = |code: &str, what: &str, id: &String| {
        let mut d = Diagnostic::new(
            code,
            Level::Warn,
            format!("node {id:?} in pipeline {:?} {what}", decl.name),
            file,
        )
        .with_data("pipeline", decl.name.as_str())
        .with_data("node", id.as_str());
        if let Some(pos) = pos_by_id.get(id) {
            d = d.with_pos(*pos);
        }
        d
    };

    let r = Reachability::classify(&graph);
    for id in &r.unreachable {
        out.push(node_diag(
            codes::W_PIPELINE_UNREACHABLE_NODE,
            "is unreachable from ingress",
            id,
        ));
    }
    for id in &r.nonterminating {
        out.push(node_diag(
            codes::W_PIPELINE_NONTERMINATING_NODE,
            "cannot reach egress",
            id,
        ));
    }
    for id in &r.disconnected {
        out.push(node_diag(
            codes::W_PIPELINE_DISCONNECTED_NODE,
            "has no edges",
            id,
        ));
    }
    if r.no_path {
        out.push(
            Diagnostic::new(
                codes::W_PIPELINE_NO_PATH_INGRESS_EGRESS,
                Level::Warn,
                format!("pipeline {:?} has no path from ingress to egress", decl.name),
                file,
            )
            .with_pos(decl.pos)
            .with_data("pipeline", decl.name.as_str()),
        );
    }
}

fn check_buffer(file: &str, step: &StepStmt, out: &mut Vec<Diagnostic>) {
    let Some(buffer) = step.attr("buffer") else {
        return;
    };
    let mut parts = buffer.split(',');
    let capacity: Option<i64> = parts.next().and_then(|c| c.trim().parse().ok());
    let policy = parts.next().map(str::trim).unwrap_or("");

    if policy == "drop" {
        out.push(
            Diagnostic::new(
                codes::W_BUFFER_DROP_ALIAS,
                Level::Warn,
                "ambiguous buffer policy \"drop\"; use dropOldest or dropNewest",
                file,
            )
            .with_pos(step.pos)
            .with_data("step", step.name.as_str()),
        );
    }
    let drops = matches!(policy, "drop" | "dropOldest" | "dropNewest");
    if drops && capacity.is_some_and(|c| c <= 1) {
        out.push(
            Diagnostic::new(
                codes::W_BUFFER_POLICY_SMELL,
                Level::Warn,
                format!(
                    "drop policy on a buffer of capacity {} drops nearly everything",
                    capacity.unwrap_or(0)
                ),
                file,
            )
            .with_pos(step.pos)
            .with_data("step", step.name.as_str()),
        );
    }
}

fn check_sort(file: &str, step: &StepStmt, out: &mut Vec<Diagnostic>) {
    let Some(sort) = step.attr("sort") else {
        return;
    };
    let mut parts = sort.split(',');
    let field = parts.next().map(str::trim).unwrap_or("");
    let order = parts.next().map(str::trim);

    if field.is_empty() {
        out.push(
            Diagnostic::new(
                codes::W_SORT_NO_FIELD,
                Level::Warn,
                "sort attribute declares no field",
                file,
            )
            .with_pos(step.pos)
            .with_data("step", step.name.as_str()),
        );
    }
    if let Some(order) = order {
        if order != "asc" && order != "desc" {
            out.push(
                Diagnostic::new(
                    codes::E_SORT_ORDER_INVALID,
                    Level::Error,
                    format!("sort order {order:?} is not asc or desc"),
                    file,
                )
                .with_pos(step.pos)
                .with_data("step", step.name.as_str()),
            );
        }
    }
}

fn check_decorators(
    file: &str,
    step: &StepStmt,
    config: &LinterConfig,
    out: &mut Vec<Diagnostic>,
) {
    for dec in &step.decorators {
        if config.disabled_decorators.iter().any(|d| d == dec) {
            out.push(
                Diagnostic::new(
                    codes::W_DECORATOR_DISABLED,
                    Level::Warn,
                    format!("decorator @{dec} is disabled in this workspace"),
                    file,
                )
                .with_pos(step.pos)
                .with_data("decorator", dec.as_str())
                .with_data("step", step.name.as_str()),
            );
        }
    }
}

fn check_io(file: &str, decl: &PipelineDecl, pragmas: &PragmaTable, out: &mut Vec<Diagnostic>) {
    let steps: Vec<&StepStmt> = decl.steps().collect();
    let io_steps: Vec<(usize, &StepStmt)> = steps
        .iter()
        .enumerate()
        .filter(|(_, s)| s.name.starts_with("io."))
        .map(|(i, s)| (i, *s))
        .collect();
    if io_steps.is_empty() {
        return;
    }

    let untrusted = pragmas.trust_level.as_deref() == Some("untrusted");
    if pragmas.trust_level.is_none() {
        out.push(
            Diagnostic::new(
                codes::W_TRUST_UNSPECIFIED,
                Level::Warn,
                format!(
                    "pipeline {:?} performs io but the unit declares no trust level",
                    decl.name
                ),
                file,
            )
            .with_pos(decl.pos)
            .with_data("pipeline", decl.name.as_str()),
        );
    }

    for (index, step) in io_steps {
        // io is an edge concern: only the boundary steps may touch it
        if index != 0 && index != steps.len() - 1 {
            out.push(
                Diagnostic::new(
                    codes::E_IO_PERMISSION,
                    Level::Error,
                    format!("io step {:?} is only permitted at a pipeline boundary", step.name),
                    file,
                )
                .with_pos(step.pos)
                .with_data("step", step.name.as_str()),
            );
        }

        let capability = step.name.strip_prefix("io.").unwrap_or(&step.name);
        let declared = pragmas.capabilities.contains("io")
            || pragmas.capabilities.contains(&format!("io.{capability}"));
        if pragmas.capabilities.is_empty() {
            out.push(
                Diagnostic::new(
                    codes::E_CAPABILITY_REQUIRED,
                    Level::Error,
                    format!("io step {:?} requires a capabilities pragma", step.name),
                    file,
                )
                .with_pos(step.pos)
                .with_data("step", step.name.as_str()),
            );
        } else if !declared {
            out.push(
                Diagnostic::new(
                    codes::W_CAPABILITY_UNDECLARED,
                    Level::Warn,
                    format!("capability io.{capability} is not declared"),
                    file,
                )
                .with_pos(step.pos)
                .with_data("capability", format!("io.{capability}")),
            );
        }

        if untrusted {
            if step.name.starts_with("io.net") {
                out.push(
                    Diagnostic::new(
                        codes::E_TRUST_VIOLATION,
                        Level::Error,
                        format!("untrusted unit may not use network step {:?}", step.name),
                        file,
                    )
                    .with_pos(step.pos)
                    .with_data("step", step.name.as_str()),
                );
            } else {
                out.push(
                    Diagnostic::new(
                        codes::W_TRUST_UNTRUSTED_IO,
                        Level::Warn,
                        format!("untrusted unit performs io via {:?}", step.name),
                        file,
                    )
                    .with_pos(step.pos)
                    .with_data("step", step.name.as_str()),
                );
            }
        }
    }
}
