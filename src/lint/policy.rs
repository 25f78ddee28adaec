//! Severity policy: the fixed post-producer transform chain.
//!
//! Order never varies: rule-pattern filter, then severity overrides
//! (`off` drops, any other recognized value rewrites the level), then
//! path-prefix suppression, then strict promotion (warn to error, info
//! untouched). Pragma filtering happens earlier, inside the producers,
//! because only they know the file a finding belongs to line-by-line.
//!
//! Every stage is a pure function over the diagnostic list; the
//! max-warning threshold is the orchestrator's business because it
//! synthesizes a new record instead of transforming existing ones.

use std::collections::BTreeMap;

use crate::diag::{Diagnostic, Level};
use crate::workspace::{LinterConfig, SuppressEntry};

use super::pattern::{matches_any, RulePattern};
use super::rules::is_known_code;

/// The resolved policy for one lint run.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    /// `--rules` patterns; empty keeps everything.
    pub patterns: Vec<RulePattern>,
    /// Per-code severity overrides from the manifest.
    pub overrides: BTreeMap<String, String>,
    /// Path-prefix suppression entries from the manifest.
    pub suppress: Vec<SuppressEntry>,
    /// Promote warnings to errors.
    pub strict: bool,
}

impl Policy {
    /// Resolve the policy from manifest configuration plus CLI inputs.
    /// Strict is an OR of the flag and the manifest option token.
    pub fn resolve(
        config: &LinterConfig,
        patterns: Vec<RulePattern>,
        manifest_strict: bool,
        cli_strict: bool,
    ) -> Self {
        let policy = Self {
            patterns,
            overrides: config.rules.clone(),
            suppress: config.suppress.clone(),
            strict: cli_strict || manifest_strict,
        };
        policy.validate_override_codes();
        policy
    }

    /// Unknown override keys are tolerated but logged.
    fn validate_override_codes(&self) {
        for code in self.overrides.keys() {
            if !is_known_code(code) {
                tracing::warn!("severity override for unknown rule code {code:?}");
            }
        }
    }

    /// Run the transform chain over a diagnostic list.
    pub fn apply(&self, diags: Vec<Diagnostic>) -> Vec<Diagnostic> {
        diags
            .into_iter()
            .filter(|d| matches_any(&self.patterns, &d.code))
            .filter_map(|d| self.override_level(d))
            .filter(|d| !self.suppressed(d))
            .map(|d| self.promote(d))
            .collect()
    }

    fn override_level(&self, diag: Diagnostic) -> Option<Diagnostic> {
        let Some(value) = self.overrides.get(&diag.code) else {
            return Some(diag);
        };
        match value.to_ascii_lowercase().as_str() {
            "off" => None,
            "info" => Some(diag.at_level(Level::Info)),
            "warn" | "warning" => Some(diag.at_level(Level::Warn)),
            "error" => Some(diag.at_level(Level::Error)),
            other => {
                tracing::warn!(
                    "unrecognized severity {other:?} for rule {code}, keeping level",
                    code = diag.code
                );
                Some(diag)
            }
        }
    }

    fn suppressed(&self, diag: &Diagnostic) -> bool {
        let file = normalize_path(&diag.file);
        self.suppress.iter().any(|entry| {
            file.starts_with(&normalize_path(&entry.path))
                && (entry.codes.is_empty() || entry.codes.iter().any(|c| c == &diag.code))
        })
    }

    fn promote(&self, diag: Diagnostic) -> Diagnostic {
        if self.strict && diag.level == Level::Warn {
            diag.at_level(Level::Error)
        } else {
            diag
        }
    }
}

fn normalize_path(path: &str) -> String {
    path.strip_prefix("./").unwrap_or(path).to_string()
}

/// Compat-code form: `LINT_` plus the code without its severity prefix.
pub fn compat_code(code: &str) -> String {
    let stripped = code
        .strip_prefix("E_")
        .or_else(|| code.strip_prefix("W_"))
        .unwrap_or(code);
    format!("LINT_{stripped}")
}
