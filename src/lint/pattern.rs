//! Rule-identifier pattern matching.
//!
//! Used by the `--rules` filter and by suppression configuration. Three
//! forms, selected per pattern:
//!
//! - `re:EXPR` or `/EXPR/`: regular expression
//! - any of `*?[` present: glob (translated to an anchored regex)
//! - otherwise: case-insensitive substring (the default)

use regex::Regex;

/// One parsed rule pattern.
#[derive(Debug, Clone)]
pub enum RulePattern {
    /// Case-insensitive substring match.
    Substring(String),
    /// Glob over the whole code.
    Glob(Regex),
    /// Regular expression search.
    Regex(Regex),
}

impl RulePattern {
    /// Parse a pattern string into its matching form.
    pub fn parse(pattern: &str) -> Result<Self, regex::Error> {
        if let Some(expr) = pattern.strip_prefix("re:") {
            return Ok(Self::Regex(Regex::new(expr)?));
        }
        if pattern.len() >= 2 && pattern.starts_with('/') && pattern.ends_with('/') {
            return Ok(Self::Regex(Regex::new(&pattern[1..pattern.len() - 1])?));
        }
        if pattern.contains(['*', '?', '[']) {
            return Ok(Self::Glob(Regex::new(&glob_to_regex(pattern))?));
        }
        Ok(Self::Substring(pattern.to_ascii_lowercase()))
    }

    /// Whether this pattern matches a rule code.
    pub fn matches(&self, code: &str) -> bool {
        match self {
            Self::Substring(needle) => code.to_ascii_lowercase().contains(needle),
            Self::Glob(re) | Self::Regex(re) => re.is_match(code),
        }
    }
}

/// Whether any pattern in the list matches; an empty list matches all.
pub fn matches_any(patterns: &[RulePattern], code: &str) -> bool {
    patterns.is_empty() || patterns.iter().any(|p| p.matches(code))
}

/// Parse a comma-separated pattern list, dropping (and logging) invalid
/// entries rather than failing the run.
pub fn parse_list(raw: &str) -> Vec<RulePattern> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter_map(|p| match RulePattern::parse(p) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::warn!("ignoring invalid rule pattern {p:?}: {err}");
                None
            }
        })
        .collect()
}

// Translate a glob to an anchored regex: `*` becomes `.*`, `?` becomes `.`,
// character classes pass through, everything else is escaped.
fn glob_to_regex(glob: &str) -> String {
    let mut out = String::from("^");
    let mut chars = glob.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                out.push('[');
                for c in chars.by_ref() {
                    out.push(c);
                    if c == ']' {
                        break;
                    }
                }
            }
            _ => out.push_str(&regex::escape(&c.to_string())),
        }
    }
    out.push('$');
    out
}
