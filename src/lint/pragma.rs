//! In-source pragma handling.
//!
//! `#pragma lint:disable C1[,C2...]` disables the listed rule codes for
//! the remainder of the file; `#pragma lint:enable ...` re-enables them
//! from that line on. Scope is strictly per-file and line-aware: a
//! disable only covers findings positioned after its own line, so a
//! pragma below the only trigger has no effect.
//!
//! The table also collects the `capabilities` and `trust` pragmas the
//! capability/trust rule family consumes.

use std::collections::{HashMap, HashSet};

use crate::frontend::ast::Directive;

/// Parsed per-file pragma state.
#[derive(Debug, Clone, Default)]
pub struct PragmaTable {
    /// code -> disabled line intervals: (disable line, enable line).
    /// An open interval (no enable) runs to end of file.
    intervals: HashMap<String, Vec<(usize, Option<usize>)>>,
    /// Capabilities declared via `#pragma capabilities ...`.
    pub capabilities: HashSet<String>,
    /// Trust level declared via `#pragma trust level=...`.
    pub trust_level: Option<String>,
}

impl PragmaTable {
    /// Build the table from a unit's directives.
    pub fn from_directives(directives: &[Directive]) -> Self {
        let mut table = Self::default();
        // code -> currently open disable line
        let mut open: HashMap<String, usize> = HashMap::new();
        for d in directives {
            match d.name.as_str() {
                "lint:disable" => {
                    for code in split_codes(&d.payload) {
                        open.entry(code).or_insert(d.line);
                    }
                }
                "lint:enable" => {
                    for code in split_codes(&d.payload) {
                        if let Some(start) = open.remove(&code) {
                            table
                                .intervals
                                .entry(code)
                                .or_default()
                                .push((start, Some(d.line)));
                        }
                    }
                }
                "capabilities" => {
                    for tok in d.payload.split_whitespace() {
                        let tok = tok.strip_prefix("list=").unwrap_or(tok);
                        for cap in tok.split(',') {
                            let cap = cap.trim().trim_matches(['"', '\'']);
                            if !cap.is_empty() {
                                table.capabilities.insert(cap.to_ascii_lowercase());
                            }
                        }
                    }
                }
                "trust" => {
                    for tok in d.payload.split_whitespace() {
                        if let Some(level) = tok.strip_prefix("level=") {
                            table.trust_level = Some(level.to_ascii_lowercase());
                        }
                    }
                }
                _ => {}
            }
        }
        for (code, start) in open {
            table.intervals.entry(code).or_default().push((start, None));
        }
        table
    }

    /// Scan raw text for pragma lines; used by textual rules that never
    /// build a syntax tree.
    pub fn from_source(text: &str) -> Self {
        let mut directives = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let Some(payload) = raw.trim().strip_prefix("#pragma") else {
                continue;
            };
            let payload = payload.trim();
            let (name, rest) = match payload.split_once(char::is_whitespace) {
                Some((n, r)) => (n, r.trim()),
                None => (payload, ""),
            };
            if !name.is_empty() {
                directives.push(Directive {
                    name: name.to_string(),
                    payload: rest.to_string(),
                    line: idx + 1,
                });
            }
        }
        Self::from_directives(&directives)
    }

    /// Whether `code` is disabled at the given line. Positionless
    /// findings (`None`) are covered only by a disable still active at
    /// end of file.
    pub fn is_disabled(&self, code: &str, line: Option<usize>) -> bool {
        let Some(intervals) = self.intervals.get(code) else {
            return false;
        };
        match line {
            Some(line) => intervals.iter().any(|(start, end)| {
                line > *start && end.map_or(true, |e| line < e)
            }),
            None => intervals.iter().any(|(_, end)| end.is_none()),
        }
    }
}

fn split_codes(payload: &str) -> Vec<String> {
    payload
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}
