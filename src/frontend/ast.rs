//! Syntax-tree value types consumed by the lint rules.
//!
//! These mirror the surface the full parser presents: a source unit is a
//! package header, a set of `#pragma` directives, and pipeline blocks
//! made of step and edge statements.

use crate::diag::Position;

/// A `#pragma NAME PAYLOAD` directive with its source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Directive name, e.g. `lint:disable`, `capabilities`, `trust`.
    pub name: String,
    /// Remainder of the line after the name.
    pub payload: String,
    /// Line the directive appears on (1-based).
    pub line: usize,
}

/// A `key=value` attribute on a step statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

/// One pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepStmt {
    /// Step name as written, e.g. `ingress`, `Transform`, `io.read`.
    pub name: String,
    /// Lower-cased category: the last dot-segment of the name.
    pub kind: String,
    /// `key=value` attributes.
    pub attrs: Vec<Attr>,
    /// `@name` decorators.
    pub decorators: Vec<String>,
    pub pos: Position,
}

impl StepStmt {
    /// Look up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// An explicit `from -> to` edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeStmt {
    pub from: String,
    pub to: String,
    pub pos: Position,
}

/// A statement inside a pipeline block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStmt {
    Step(StepStmt),
    Edge(EdgeStmt),
}

/// One `pipeline NAME { ... }` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineDecl {
    pub name: String,
    pub pos: Position,
    pub stmts: Vec<PipelineStmt>,
}

impl PipelineDecl {
    /// Iterate step statements in declaration order.
    pub fn steps(&self) -> impl Iterator<Item = &StepStmt> {
        self.stmts.iter().filter_map(|s| match s {
            PipelineStmt::Step(st) => Some(st),
            PipelineStmt::Edge(_) => None,
        })
    }

    /// Iterate explicit edge statements in declaration order.
    pub fn edges(&self) -> impl Iterator<Item = &EdgeStmt> {
        self.stmts.iter().filter_map(|s| match s {
            PipelineStmt::Edge(e) => Some(e),
            PipelineStmt::Step(_) => None,
        })
    }
}

/// A parsed source unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceAst {
    /// Declared package name, when present.
    pub package: Option<String>,
    pub directives: Vec<Directive>,
    pub pipelines: Vec<PipelineDecl>,
}
