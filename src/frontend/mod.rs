//! Tolerant line-oriented reader for rill source units.
//!
//! The full lexer/parser lives outside this crate; lint only needs the
//! shapes in [`ast`] plus enough scanning to recover them from text. The
//! reader is deliberately forgiving: anything it does not recognize is
//! skipped, and only structural breakage (an unclosed pipeline block, a
//! malformed edge) is reported as a value, never a panic or abort.
//!
//! Surface recovered per unit:
//!
//! ```text
//! package App
//! #pragma lint:disable W_SORT_NO_FIELD
//! pipeline Main {
//!   ingress
//!   Transform type=Event @audited
//!   Collect buffer=4,dropOldest sort=ts,asc
//!   egress
//!   ingress -> Transform
//! }
//! ```

pub mod ast;

use crate::diag::Position;
use ast::{Attr, Directive, EdgeStmt, PipelineDecl, PipelineStmt, SourceAst, StepStmt};

/// A recoverable parse failure for one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub message: String,
    pub pos: Position,
}

/// Compute the 1-based line/column of a byte offset in `text`.
pub fn locate(text: &str, offset: usize) -> Position {
    let offset = offset.min(text.len());
    let mut line = 1;
    let mut column = 1;
    for b in text.as_bytes()[..offset].iter() {
        if *b == b'\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    Position::new(line, column, offset)
}

/// Parse one source unit.
pub fn parse_source(text: &str) -> Result<SourceAst, ParseFailure> {
    let mut out = SourceAst::default();
    let mut open: Option<PipelineDecl> = None;
    let mut offset = 0usize;
    let mut line_no = 0usize;

    for raw in text.split('\n') {
        line_no += 1;
        let line_start = offset;
        offset += raw.len() + 1;

        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        let indent = raw.len() - raw.trim_start().len();
        let pos = Position::new(line_no, indent + 1, line_start + indent);

        if let Some(payload) = trimmed.strip_prefix("#pragma") {
            let payload = payload.trim();
            let (name, rest) = match payload.split_once(char::is_whitespace) {
                Some((n, r)) => (n, r.trim()),
                None => (payload, ""),
            };
            if !name.is_empty() {
                out.directives.push(Directive {
                    name: name.to_string(),
                    payload: rest.to_string(),
                    line: line_no,
                });
            }
            continue;
        }

        if let Some(decl) = &mut open {
            if trimmed == "}" {
                out.pipelines.push(open.take().expect("open block"));
                continue;
            }
            decl.stmts.push(parse_stmt(trimmed, pos)?);
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("package ") {
            out.package = Some(rest.trim().to_string());
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("pipeline ") {
            let header = rest.trim();
            let name = match header.strip_suffix('{') {
                Some(n) => n.trim(),
                None => {
                    return Err(ParseFailure {
                        message: format!("pipeline header missing '{{': {trimmed}"),
                        pos,
                    })
                }
            };
            if name.is_empty() {
                return Err(ParseFailure {
                    message: "pipeline declaration missing a name".into(),
                    pos,
                });
            }
            open = Some(PipelineDecl {
                name: name.to_string(),
                pos,
                stmts: Vec::new(),
            });
            continue;
        }
        // Unrecognized top-level text is tolerated.
    }

    if let Some(decl) = open {
        return Err(ParseFailure {
            message: format!("unclosed pipeline block: {}", decl.name),
            pos: decl.pos,
        });
    }
    Ok(out)
}

fn parse_stmt(line: &str, pos: Position) -> Result<PipelineStmt, ParseFailure> {
    if line.contains("->") {
        let (from, to) = line.split_once("->").expect("checked arrow");
        let (from, to) = (from.trim(), to.trim());
        if from.is_empty() || to.is_empty() {
            return Err(ParseFailure {
                message: format!("malformed edge statement: {line}"),
                pos,
            });
        }
        return Ok(PipelineStmt::Edge(EdgeStmt {
            from: from.to_string(),
            to: to.to_string(),
            pos,
        }));
    }

    let mut tokens = line.split_whitespace();
    let name = tokens.next().expect("non-empty line").to_string();
    let kind = name
        .rsplit('.')
        .next()
        .unwrap_or(&name)
        .to_ascii_lowercase();
    let mut attrs = Vec::new();
    let mut decorators = Vec::new();
    for tok in tokens {
        if let Some(dec) = tok.strip_prefix('@') {
            if !dec.is_empty() {
                decorators.push(dec.to_string());
            }
        } else if let Some((k, v)) = tok.split_once('=') {
            attrs.push(Attr {
                name: k.to_string(),
                value: v.to_string(),
            });
        }
        // Bare tokens carry no lint-relevant structure; skip them.
    }
    Ok(PipelineStmt::Step(StepStmt {
        name,
        kind,
        attrs,
        decorators,
        pos,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT: &str = "package App\n\
        // comment\n\
        #pragma lint:disable W_SORT_NO_FIELD,W_BUFFER_POLICY_SMELL\n\
        pipeline Main {\n\
        \x20 ingress\n\
        \x20 Transform type=Event @audited\n\
        \x20 io.read buffer=4,dropOldest\n\
        \x20 egress\n\
        \x20 ingress -> Transform\n\
        }\n";

    #[test]
    fn parses_package_and_directives() {
        let ast = parse_source(UNIT).unwrap();
        assert_eq!(ast.package.as_deref(), Some("App"));
        assert_eq!(ast.directives.len(), 1);
        assert_eq!(ast.directives[0].name, "lint:disable");
        assert_eq!(ast.directives[0].line, 3);
    }

    #[test]
    fn parses_steps_and_edges() {
        let ast = parse_source(UNIT).unwrap();
        let pd = &ast.pipelines[0];
        assert_eq!(pd.name, "Main");
        let steps: Vec<_> = pd.steps().collect();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[1].name, "Transform");
        assert_eq!(steps[1].kind, "transform");
        assert_eq!(steps[1].attr("type"), Some("Event"));
        assert_eq!(steps[1].decorators, vec!["audited"]);
        assert_eq!(steps[2].kind, "read");
        let edges: Vec<_> = pd.edges().collect();
        assert_eq!(edges[0].from, "ingress");
        assert_eq!(edges[0].to, "Transform");
    }

    #[test]
    fn step_positions_are_line_accurate() {
        let ast = parse_source(UNIT).unwrap();
        let steps: Vec<_> = ast.pipelines[0].steps().collect();
        assert_eq!(steps[0].pos.line, 5);
        assert_eq!(steps[0].pos.column, 3);
    }

    #[test]
    fn unclosed_pipeline_is_a_failure_value() {
        let err = parse_source("pipeline Broken {\n  ingress\n").unwrap_err();
        assert!(err.message.contains("Broken"));
        assert_eq!(err.pos.line, 1);
    }

    #[test]
    fn malformed_edge_is_a_failure_value() {
        let err = parse_source("pipeline P {\n  a ->\n}\n").unwrap_err();
        assert!(err.message.contains("edge"));
        assert_eq!(err.pos.line, 2);
    }

    #[test]
    fn header_without_brace_is_a_failure_value() {
        let err = parse_source("pipeline P\n").unwrap_err();
        assert!(err.message.contains('{'));
    }

    #[test]
    fn unknown_top_level_text_is_tolerated() {
        let ast = parse_source("something unrecognized\npackage X\n").unwrap();
        assert_eq!(ast.package.as_deref(), Some("X"));
    }

    #[test]
    fn locate_maps_offsets() {
        let text = "ab\ncd\n";
        assert_eq!(locate(text, 0), Position::new(1, 1, 0));
        assert_eq!(locate(text, 4), Position::new(2, 2, 4));
        // past-the-end clamps
        assert_eq!(locate(text, 100).offset, 6);
    }
}
