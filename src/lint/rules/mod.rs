//! Built-in lint rules.
//!
//! Each submodule is one producer family: it takes its inputs (manifest,
//! syntax tree, raw source text) and returns zero-or-more diagnostics.
//! Producers never fail; everything they find is a diagnostic, and the
//! severity policy decides what survives.

pub mod import_cycles;
pub mod pipeline;
pub mod source;
pub mod version_conflicts;
pub mod workspace;

/// Rule codes, grouped by producer family.
pub mod codes {
    // Manifest load failures (emitted by the orchestrator).
    pub const E_WS_MISSING: &str = "E_WS_MISSING";
    pub const E_WS_PARSE: &str = "E_WS_PARSE";
    pub const E_WS_SCHEMA: &str = "E_WS_SCHEMA";

    // Workspace rules.
    pub const W_PKG_NAME_STYLE: &str = "W_PKG_NAME_STYLE";
    pub const W_IMPORT_SYNTAX: &str = "W_IMPORT_SYNTAX";
    pub const W_IMPORT_DUPLICATE: &str = "W_IMPORT_DUPLICATE";
    pub const W_IMPORT_ORDER: &str = "W_IMPORT_ORDER";
    pub const W_IMPORT_CONSTRAINT_INVALID: &str = "W_IMPORT_CONSTRAINT_INVALID";
    pub const W_IMPORT_RELATIVE: &str = "W_IMPORT_RELATIVE";
    pub const W_IMPORT_LOCAL_MISSING: &str = "W_IMPORT_LOCAL_MISSING";
    pub const W_IMPORT_LOCAL_UNDECLARED: &str = "W_IMPORT_LOCAL_UNDECLARED";
    pub const E_WS_PKG_VERSION: &str = "E_WS_PKG_VERSION";

    // Cross-package analysis.
    pub const E_IMPORT_CONSTRAINT: &str = "E_IMPORT_CONSTRAINT";
    pub const E_IMPORT_CONSTRAINT_MULTI: &str = "E_IMPORT_CONSTRAINT_MULTI";
    pub const W_IMPORT_SINGLE_VERSION: &str = "W_IMPORT_SINGLE_VERSION";
    pub const E_IMPORT_PRERELEASE_FORBIDDEN: &str = "E_IMPORT_PRERELEASE_FORBIDDEN";
    pub const E_IMPORT_CYCLE: &str = "E_IMPORT_CYCLE";

    // Pipeline rules.
    pub const E_PIPELINE_CYCLE: &str = "E_PIPELINE_CYCLE";
    pub const W_PIPELINE_UNREACHABLE_NODE: &str = "W_PIPELINE_UNREACHABLE_NODE";
    pub const W_PIPELINE_NONTERMINATING_NODE: &str = "W_PIPELINE_NONTERMINATING_NODE";
    pub const W_PIPELINE_DISCONNECTED_NODE: &str = "W_PIPELINE_DISCONNECTED_NODE";
    pub const W_PIPELINE_NO_PATH_INGRESS_EGRESS: &str = "W_PIPELINE_NO_PATH_INGRESS_EGRESS";
    pub const W_BUFFER_DROP_ALIAS: &str = "W_BUFFER_DROP_ALIAS";
    pub const W_BUFFER_POLICY_SMELL: &str = "W_BUFFER_POLICY_SMELL";
    pub const W_SORT_NO_FIELD: &str = "W_SORT_NO_FIELD";
    pub const E_SORT_ORDER_INVALID: &str = "E_SORT_ORDER_INVALID";
    pub const W_DECORATOR_DISABLED: &str = "W_DECORATOR_DISABLED";
    pub const E_IO_PERMISSION: &str = "E_IO_PERMISSION";
    pub const E_CAPABILITY_REQUIRED: &str = "E_CAPABILITY_REQUIRED";
    pub const E_TRUST_VIOLATION: &str = "E_TRUST_VIOLATION";
    pub const W_CAPABILITY_UNDECLARED: &str = "W_CAPABILITY_UNDECLARED";
    pub const W_TRUST_UNSPECIFIED: &str = "W_TRUST_UNSPECIFIED";
    pub const W_TRUST_UNTRUSTED_IO: &str = "W_TRUST_UNTRUSTED_IO";

    // Source scans.
    pub const W_RAW_POINTER: &str = "W_RAW_POINTER";
    pub const W_RAII_RELEASE_WITHOUT_OWN: &str = "W_RAII_RELEASE_WITHOUT_OWN";
    pub const W_IMPORT_UNUSED: &str = "W_IMPORT_UNUSED";
    pub const W_PARSE_FAILED: &str = "W_PARSE_FAILED";

    // Synthesized by the orchestrator.
    pub const E_MAX_WARN_EXCEEDED: &str = "E_MAX_WARN_EXCEEDED";
    pub const SUMMARY: &str = "SUMMARY";
}

/// Every built-in rule code; used to validate severity override keys.
pub const KNOWN_CODES: &[&str] = &[
    codes::E_WS_MISSING,
    codes::E_WS_PARSE,
    codes::E_WS_SCHEMA,
    codes::W_PKG_NAME_STYLE,
    codes::W_IMPORT_SYNTAX,
    codes::W_IMPORT_DUPLICATE,
    codes::W_IMPORT_ORDER,
    codes::W_IMPORT_CONSTRAINT_INVALID,
    codes::W_IMPORT_RELATIVE,
    codes::W_IMPORT_LOCAL_MISSING,
    codes::W_IMPORT_LOCAL_UNDECLARED,
    codes::E_WS_PKG_VERSION,
    codes::E_IMPORT_CONSTRAINT,
    codes::E_IMPORT_CONSTRAINT_MULTI,
    codes::W_IMPORT_SINGLE_VERSION,
    codes::E_IMPORT_PRERELEASE_FORBIDDEN,
    codes::E_IMPORT_CYCLE,
    codes::E_PIPELINE_CYCLE,
    codes::W_PIPELINE_UNREACHABLE_NODE,
    codes::W_PIPELINE_NONTERMINATING_NODE,
    codes::W_PIPELINE_DISCONNECTED_NODE,
    codes::W_PIPELINE_NO_PATH_INGRESS_EGRESS,
    codes::W_BUFFER_DROP_ALIAS,
    codes::W_BUFFER_POLICY_SMELL,
    codes::W_SORT_NO_FIELD,
    codes::E_SORT_ORDER_INVALID,
    codes::W_DECORATOR_DISABLED,
    codes::E_IO_PERMISSION,
    codes::E_CAPABILITY_REQUIRED,
    codes::E_TRUST_VIOLATION,
    codes::W_CAPABILITY_UNDECLARED,
    codes::W_TRUST_UNSPECIFIED,
    codes::W_TRUST_UNTRUSTED_IO,
    codes::W_RAW_POINTER,
    codes::W_RAII_RELEASE_WITHOUT_OWN,
    codes::W_IMPORT_UNUSED,
    codes::W_PARSE_FAILED,
    codes::E_MAX_WARN_EXCEEDED,
];

/// Whether `code` names a built-in rule.
pub fn is_known_code(code: &str) -> bool {
    KNOWN_CODES.contains(&code)
}
