//! Semantic-version constraints for package imports.
//!
//! An import entry may carry a constraint expression: an exact version
//! (`1.2.3` / `v1.2.3`), a caret range (`^1.2.3`), a tilde range
//! (`~1.2.3`), a comparison (`>= 1.2.3`, `> 1.2.3`), or the sentinel
//! `==latest`. Ranges are modeled as half-open intervals so the
//! cross-package conflict analyzer can intersect them.

use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Minimal semantic version: MAJOR.MINOR.PATCH with an optional
/// pre-release suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Pre-release suffix without the leading `-`, when present.
    pub pre: Option<String>,
}

/// Constraint parse failure.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid version constraint: {input}")]
pub struct InvalidConstraint {
    pub input: String,
}

/// A version constraint operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Exact,
    Caret,
    Tilde,
    Gt,
    Gte,
    Latest,
}

/// A parsed constraint. `Op::Latest` carries no version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub op: Op,
    pub version: Option<Version>,
}

/// A half-open version interval `[lo, hi)` (or `(lo, hi)` when the lower
/// bound is exclusive). `hi == None` means unbounded above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub lo: Version,
    pub lo_inclusive: bool,
    pub hi: Option<Version>,
}

fn constraint_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(==latest|\^|~|>=|>)?\s*(v?\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?)?\s*$")
            .expect("constraint regex")
    })
}

impl Version {
    /// Parse `MAJOR.MINOR.PATCH[-PRE]`, tolerating a leading `v`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().strip_prefix('v').unwrap_or(s.trim());
        let (nums, pre) = match s.split_once('-') {
            Some((n, p)) => (n, Some(p.to_string())),
            None => (s, None),
        };
        let mut it = nums.split('.');
        let major = it.next()?.parse().ok()?;
        let minor = it.next()?.parse().ok()?;
        let patch = it.next()?.parse().ok()?;
        if it.next().is_some() {
            return None;
        }
        Some(Self {
            major,
            minor,
            patch,
            pre,
        })
    }

    /// Whether this version carries a pre-release suffix.
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some()
    }

    fn key(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key()).then_with(|| {
            // A release sorts above any pre-release of the same triple.
            match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            }
        })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl Constraint {
    /// Parse a constraint expression like `^1.2.3`, `>= 1.2.3`, `v1.2.3`,
    /// or `==latest`.
    pub fn parse(s: &str) -> Result<Self, InvalidConstraint> {
        let invalid = || InvalidConstraint {
            input: s.to_string(),
        };
        let caps = constraint_re().captures(s).ok_or_else(invalid)?;
        let op = match caps.get(1).map(|m| m.as_str()) {
            Some("==latest") => {
                return Ok(Self {
                    op: Op::Latest,
                    version: None,
                })
            }
            Some("^") => Op::Caret,
            Some("~") => Op::Tilde,
            Some(">=") => Op::Gte,
            Some(">") => Op::Gt,
            None => Op::Exact,
            Some(_) => return Err(invalid()),
        };
        let raw = caps.get(2).ok_or_else(invalid)?.as_str();
        let version = Version::parse(raw).ok_or_else(invalid)?;
        Ok(Self {
            op,
            version: Some(version),
        })
    }

    /// Whether `v` satisfies this constraint.
    pub fn satisfies(&self, v: &Version) -> bool {
        let anchor = match (&self.op, &self.version) {
            (Op::Latest, _) => return true,
            (_, Some(a)) => a,
            (_, None) => return false,
        };
        match self.op {
            Op::Exact => v == anchor,
            Op::Gt => v > anchor,
            Op::Gte => v >= anchor,
            _ => match self.bound() {
                Some(b) => b.contains(v),
                None => false,
            },
        }
    }

    /// The interval covered by this constraint, or `None` for `==latest`.
    pub fn bound(&self) -> Option<Bound> {
        let anchor = self.version.as_ref()?;
        let b = match self.op {
            Op::Latest => return None,
            Op::Exact => Bound {
                lo: anchor.clone(),
                lo_inclusive: true,
                hi: Some(bump_patch(anchor)),
            },
            Op::Caret => Bound {
                lo: anchor.clone(),
                lo_inclusive: true,
                hi: Some(caret_upper(anchor)),
            },
            Op::Tilde => Bound {
                lo: anchor.clone(),
                lo_inclusive: true,
                hi: Some(release(anchor.major, anchor.minor + 1, 0)),
            },
            Op::Gte => Bound {
                lo: anchor.clone(),
                lo_inclusive: true,
                hi: None,
            },
            Op::Gt => Bound {
                lo: anchor.clone(),
                lo_inclusive: false,
                hi: None,
            },
        };
        Some(b)
    }

    /// The anchor version's pre-release flag (false for `==latest`).
    pub fn is_prerelease(&self) -> bool {
        self.version.as_ref().is_some_and(Version::is_prerelease)
    }
}

impl Bound {
    /// Whether the interval contains `v`.
    pub fn contains(&self, v: &Version) -> bool {
        let above_lo = if self.lo_inclusive {
            v >= &self.lo
        } else {
            v > &self.lo
        };
        let below_hi = match &self.hi {
            Some(h) => v < h,
            None => true,
        };
        above_lo && below_hi
    }

    /// Intersect two intervals; `None` when the intersection is empty.
    pub fn intersect(&self, other: &Bound) -> Option<Bound> {
        let (lo, lo_inclusive) = match self.lo.cmp(&other.lo) {
            Ordering::Greater => (self.lo.clone(), self.lo_inclusive),
            Ordering::Less => (other.lo.clone(), other.lo_inclusive),
            Ordering::Equal => (self.lo.clone(), self.lo_inclusive && other.lo_inclusive),
        };
        let hi = match (&self.hi, &other.hi) {
            (Some(a), Some(b)) => Some(a.min(b).clone()),
            (Some(a), None) => Some(a.clone()),
            (None, Some(b)) => Some(b.clone()),
            (None, None) => None,
        };
        if let Some(h) = &hi {
            if &lo >= h {
                return None;
            }
        }
        Some(Bound {
            lo,
            lo_inclusive,
            hi,
        })
    }
}

fn release(major: u64, minor: u64, patch: u64) -> Version {
    Version {
        major,
        minor,
        patch,
        pre: None,
    }
}

fn bump_patch(v: &Version) -> Version {
    release(v.major, v.minor, v.patch + 1)
}

// Caret semantics: lock the leftmost non-zero component.
fn caret_upper(v: &Version) -> Version {
    if v.major > 0 {
        release(v.major + 1, 0, 0)
    } else if v.minor > 0 {
        release(0, v.minor + 1, 0)
    } else {
        release(0, 0, v.patch + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn c(s: &str) -> Constraint {
        Constraint::parse(s).unwrap()
    }

    #[test]
    fn parses_versions() {
        assert_eq!(v("1.2.3").key(), (1, 2, 3));
        assert_eq!(v("v1.2.3").key(), (1, 2, 3));
        assert_eq!(v("1.2.3-rc.1").pre.as_deref(), Some("rc.1"));
        assert!(Version::parse("1.2").is_none());
        assert!(Version::parse("1.2.3.4").is_none());
    }

    #[test]
    fn release_sorts_above_prerelease() {
        assert!(v("1.2.3") > v("1.2.3-rc.1"));
        assert!(v("1.2.3-alpha") < v("1.2.3-beta"));
        assert!(v("1.2.4-alpha") > v("1.2.3"));
    }

    #[test]
    fn parses_constraints() {
        assert_eq!(c("^1.2.3").op, Op::Caret);
        assert_eq!(c("~1.2.3").op, Op::Tilde);
        assert_eq!(c(">= 1.2.3").op, Op::Gte);
        assert_eq!(c("> 1.2.3").op, Op::Gt);
        assert_eq!(c("v1.2.3").op, Op::Exact);
        assert_eq!(c("1.2.3").op, Op::Exact);
        assert_eq!(c("==latest").op, Op::Latest);
        assert!(Constraint::parse("<= 1.2.3").is_err());
        assert!(Constraint::parse("^").is_err());
    }

    #[test]
    fn satisfies_exact_and_comparisons() {
        assert!(c("1.2.3").satisfies(&v("1.2.3")));
        assert!(!c("1.2.3").satisfies(&v("1.2.4")));
        assert!(c("> 1.2.3").satisfies(&v("1.2.4")));
        assert!(!c("> 1.2.3").satisfies(&v("1.2.3")));
        assert!(c(">= 1.2.3").satisfies(&v("1.2.3")));
        assert!(c("==latest").satisfies(&v("0.0.1")));
    }

    #[test]
    fn caret_locks_leftmost_nonzero() {
        assert!(c("^1.2.3").satisfies(&v("1.9.0")));
        assert!(!c("^1.2.3").satisfies(&v("2.0.0")));
        assert!(c("^0.2.3").satisfies(&v("0.2.9")));
        assert!(!c("^0.2.3").satisfies(&v("0.3.0")));
        assert!(!c("^0.0.3").satisfies(&v("0.0.4")));
    }

    #[test]
    fn tilde_locks_minor() {
        assert!(c("~1.2.3").satisfies(&v("1.2.9")));
        assert!(!c("~1.2.3").satisfies(&v("1.3.0")));
    }

    #[test]
    fn disjoint_ranges_intersect_empty() {
        // [1.2.3, 2.0.0) vs [2.0.0, +inf): empty at the exclusive boundary
        let a = c("^1.2.3").bound().unwrap();
        let b = c(">= 2.0.0").bound().unwrap();
        assert!(a.intersect(&b).is_none());
    }

    #[test]
    fn overlapping_ranges_intersect() {
        // [1.2.3, 1.3.0) vs [1.2.5, +inf) gives [1.2.5, 1.3.0)
        let a = c("~1.2.3").bound().unwrap();
        let b = c(">= 1.2.5").bound().unwrap();
        let i = a.intersect(&b).unwrap();
        assert_eq!(i.lo, v("1.2.5"));
        assert_eq!(i.hi, Some(v("1.3.0")));
    }

    #[test]
    fn exclusive_lower_bound_wins_on_tie() {
        let a = c("> 1.2.3").bound().unwrap();
        let b = c(">= 1.2.3").bound().unwrap();
        let i = a.intersect(&b).unwrap();
        assert!(!i.lo_inclusive);
    }

    #[test]
    fn latest_has_no_bound() {
        assert!(c("==latest").bound().is_none());
    }
}
