use nodemend_core::parse_version;
use semver::Version;

/// One side of a version range. `Unbounded` covers both "no clause present"
/// and "clause present but malformed": a bound that fails to parse never
/// rejects a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    Unbounded,
    Value { version: Version, inclusive: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    pub lower: Bound,
    pub upper: Bound,
}

impl VersionRange {
    pub fn unbounded() -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }

    pub fn contains(&self, candidate: &Version) -> bool {
        if let Bound::Value { version, inclusive } = &self.lower {
            let admitted = if *inclusive {
                candidate >= version
            } else {
                candidate > version
            };
            if !admitted {
                return false;
            }
        }
        if let Bound::Value { version, inclusive } = &self.upper {
            let admitted = if *inclusive {
                candidate <= version
            } else {
                candidate < version
            };
            if !admitted {
                return false;
            }
        }
        true
    }
}

/// Extracts a version range from a free-form engine constraint such as
/// `">=18.17 <21"` or `">=16 <=18.x"`. Total: any side that fails to match
/// comes back `Unbounded`.
pub fn parse_constraint(raw: &str) -> VersionRange {
    VersionRange {
        lower: scan_lower_bound(raw),
        upper: scan_upper_bound(raw),
    }
}

fn scan_lower_bound(raw: &str) -> Bound {
    for (index, _) in raw.char_indices() {
        let rest = &raw[index..];
        let (inclusive, after) = if let Some(after) = rest.strip_prefix(">=") {
            (true, after)
        } else if let Some(after) = rest.strip_prefix('>') {
            (false, after)
        } else {
            continue;
        };
        let after = after.trim_start();
        let Some(token) = leading_version_token(after) else {
            continue;
        };
        let Ok(version) = parse_version(token) else {
            continue;
        };
        return Bound::Value { version, inclusive };
    }
    Bound::Unbounded
}

fn scan_upper_bound(raw: &str) -> Bound {
    for (index, _) in raw.char_indices() {
        let rest = &raw[index..];
        let (op_inclusive, after) = if let Some(after) = rest.strip_prefix("<=") {
            (true, after)
        } else if let Some(after) = rest.strip_prefix('<') {
            (false, after)
        } else {
            continue;
        };
        let after = after.trim_start();
        let Some(token) = leading_version_token(after) else {
            continue;
        };

        let remainder = &after[token.len()..];
        let wildcard = token.ends_with('.')
            && (remainder.starts_with('x') || remainder.starts_with('X'));
        if wildcard {
            let head = &token[..token.len() - 1];
            let Ok(version) = parse_version(&pad_wildcard_ceiling(head)) else {
                continue;
            };
            // A `.x` ceiling is always inclusive, whatever the operator was.
            return Bound::Value {
                version,
                inclusive: true,
            };
        }

        let Ok(version) = parse_version(token) else {
            continue;
        };
        return Bound::Value {
            version,
            inclusive: op_inclusive,
        };
    }
    Bound::Unbounded
}

fn leading_version_token(input: &str) -> Option<&str> {
    let end = input
        .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
        .unwrap_or(input.len());
    let token = &input[..end];
    if token.starts_with(|ch: char| ch.is_ascii_digit()) {
        Some(token)
    } else {
        None
    }
}

fn pad_wildcard_ceiling(head: &str) -> String {
    match head.matches('.').count() {
        0 => format!("{head}.99.99"),
        1 => format!("{head}.99"),
        _ => head.to_string(),
    }
}
