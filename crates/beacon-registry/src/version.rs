//! Semantic version range matching
//!
//! Thin wrapper over `semver::VersionReq`. Existing clients send ranges
//! in the space-separated comparator form (`>=1.0.0 <2.0.0`), which the
//! `semver` crate only accepts with comma separators, so parsing retries
//! with a normalized form before giving up.

use crate::error::{RegistryError, Result};
use semver::{Version, VersionReq};

/// A parsed version range expression
#[derive(Debug, Clone)]
pub struct VersionRange {
    req: VersionReq,
    raw: String,
}

impl VersionRange {
    /// Parse a range expression
    ///
    /// Accepts everything `semver::VersionReq` accepts (comparators,
    /// tilde/caret ranges, wildcards) plus space-separated comparator
    /// lists. A malformed expression is a request-level error.
    pub fn parse(range: &str) -> Result<Self> {
        let req = match VersionReq::parse(range) {
            Ok(req) => req,
            Err(err) => {
                let normalized = range.split_whitespace().collect::<Vec<_>>().join(", ");
                VersionReq::parse(&normalized).map_err(|_| RegistryError::InvalidVersionRange {
                    range: range.to_string(),
                    source: err,
                })?
            }
        };

        Ok(Self {
            req,
            raw: range.to_string(),
        })
    }

    /// Whether an instance's exact version satisfies this range
    ///
    /// A version string that is not valid semver never matches; that is
    /// a property of the stored instance, not a failure of the request.
    pub fn matches(&self, version: &str) -> bool {
        Version::parse(version)
            .map(|v| self.req.matches(&v))
            .unwrap_or(false)
    }

    /// The expression as the caller supplied it
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl std::fmt::Display for VersionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}
