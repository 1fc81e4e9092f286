use once_cell::sync::Lazy;
use regex::Regex;
use semver::Version;
use std::cmp::Ordering;

/// Ordering strategy for version tokens. Index data is not guaranteed
/// to be semver-conformant, so the comparison is pluggable.
pub trait VersionOrder: Send + Sync {
    fn compare(&self, a: &str, b: &str) -> Ordering;
    fn is_prerelease(&self, token: &str) -> bool;
}

/// Default strategy: semver precedence for conforming tokens, lexical
/// order as a fallback. Conforming tokens sort above non-conforming
/// ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemverFirst;

impl VersionOrder for SemverFirst {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        match (parse_lenient(a), parse_lenient(b)) {
            (Some(va), Some(vb)) => va.cmp(&vb),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => a.trim().cmp(b.trim()),
        }
    }

    fn is_prerelease(&self, token: &str) -> bool {
        if let Some(v) = parse_lenient(token) {
            return !v.pre.is_empty();
        }
        PRERELEASE_RE.is_match(token.trim())
    }
}

/// PEP 440 style pre-release markers ("5.0a1", "2.0.0rc1", "1.0.dev3")
/// that semver cannot parse.
static PRERELEASE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(a|b|c|rc|alpha|beta|dev|pre|preview)\.?\d*$").unwrap());

/// Parses a version token as semver, tolerating a leading `v` and
/// padding one- or two-component numeric versions ("2.28" -> "2.28.0").
pub fn parse_lenient(token: &str) -> Option<Version> {
    let s = token.trim();
    let s = s.strip_prefix('v').unwrap_or(s);

    if let Ok(v) = Version::parse(s) {
        return Some(v);
    }

    let numeric = s.split(['-', '+']).next().unwrap_or(s);
    let parts: Vec<&str> = numeric.split('.').collect();
    if parts.len() < 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
    {
        let mut padded = parts;
        while padded.len() < 3 {
            padded.push("0");
        }
        let rest = &s[numeric.len()..];
        return Version::parse(&format!("{}{}", padded.join("."), rest)).ok();
    }

    None
}
