use std::cmp::Ordering;
use std::fmt;

use semver::Version;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid module version '{raw}': {reason}")]
pub struct VersionError {
    pub raw: String,
    pub reason: &'static str,
}

/// A module version as written in `go.mod` and reported by the module proxy.
///
/// The `v` prefix is mandatory. `v1` and `v1.2` are accepted as shorthands for
/// `v1.0.0` and `v1.2.0`. [`ModuleVersion::as_str`] returns the text as written;
/// `Display` prints the canonical form, which keeps `+incompatible` and drops
/// any other build metadata. Build metadata never takes part in ordering.
#[derive(Debug, Clone)]
pub struct ModuleVersion {
    raw: String,
    semver: Version,
}

impl ModuleVersion {
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        let semver = parse_semver(raw)?;
        Ok(Self {
            raw: raw.to_string(),
            semver,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = &self.semver;
        write!(f, "v{}.{}.{}", version.major, version.minor, version.patch)?;
        if !version.pre.is_empty() {
            write!(f, "-{}", version.pre)?;
        }
        if version.build.as_str() == "incompatible" {
            f.write_str("+incompatible")?;
        }
        Ok(())
    }
}

impl PartialEq for ModuleVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ModuleVersion {}

impl PartialOrd for ModuleVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ModuleVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.semver.cmp_precedence(&other.semver)
    }
}

/// Orders two raw version strings. Invalid strings sort below every valid one
/// and compare equal to each other.
pub fn compare_module_versions(left: &str, right: &str) -> Ordering {
    match (ModuleVersion::parse(left), ModuleVersion::parse(right)) {
        (Ok(left), Ok(right)) => left.cmp(&right),
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        (Err(_), Err(_)) => Ordering::Equal,
    }
}

fn parse_semver(raw: &str) -> Result<Version, VersionError> {
    let invalid = |reason| VersionError {
        raw: raw.to_string(),
        reason,
    };

    let Some(rest) = raw.strip_prefix('v') else {
        return Err(invalid("missing 'v' prefix"));
    };
    if rest.is_empty() {
        return Err(invalid("empty version"));
    }

    if let Ok(version) = Version::parse(rest) {
        return Ok(version);
    }

    if rest.contains(['-', '+']) {
        return Err(invalid("not a semantic version"));
    }
    let expanded = match rest.split('.').count() {
        1 => format!("{rest}.0.0"),
        2 => format!("{rest}.0"),
        _ => return Err(invalid("not a semantic version")),
    };
    Version::parse(&expanded).map_err(|_| invalid("not a semantic version"))
}
