use semver::Version;
use tracing::debug;

use crate::registry::search::SearchPackage;

/// Parse a version string into a semver::Version, normalizing partial versions.
///
/// Handles partial versions like "1" or "1.2" by padding with zeros.
///
/// Examples:
/// - "1" -> Version(1, 0, 0)
/// - "1.2" -> Version(1, 2, 0)
/// - "1.2.3" -> Version(1, 2, 3)
pub fn parse_version(version: &str) -> Option<Version> {
    let parts: Vec<&str> = version.split('.').collect();
    let normalized = match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        2 => format!("{}.{}.0", parts[0], parts[1]),
        _ => version.to_string(),
    };
    Version::parse(&normalized).ok()
}

/// One published version of the requested package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersionCandidate {
    pub package_id: String,
    pub version: Version,
    pub downloads: u64,
}

/// Narrowing applied to the candidate list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VersionFilter {
    pub major: Option<u64>,
    pub minor: Option<u64>,
    pub include_prerelease: bool,
}

impl VersionFilter {
    /// Keeps candidates matching the major, then the minor component
    ///
    /// Each step only removes candidates. A minor without a major is ignored.
    pub fn apply(&self, candidates: Vec<PackageVersionCandidate>) -> Vec<PackageVersionCandidate> {
        candidates
            .into_iter()
            .filter(|c| self.include_prerelease || c.version.pre.is_empty())
            .filter(|c| self.major.is_none_or(|major| c.version.major == major))
            .filter(|c| {
                self.major.is_none()
                    || self.minor.is_none_or(|minor| c.version.minor == minor)
            })
            .collect()
    }
}

/// Versions of packages whose id equals `package_name`; unparsable versions are skipped
pub fn collect_candidates(
    packages: &[SearchPackage],
    package_name: &str,
) -> Vec<PackageVersionCandidate> {
    packages
        .iter()
        .filter(|package| package.id == package_name)
        .flat_map(|package| {
            package.versions.iter().filter_map(|entry| {
                let Some(version) = parse_version(&entry.version) else {
                    debug!("Skipping unparsable version '{}' of {}", entry.version, package.id);
                    return None;
                };
                Some(PackageVersionCandidate {
                    package_id: package.id.clone(),
                    version,
                    downloads: entry.downloads,
                })
            })
        })
        .collect()
}

/// Highest candidate by semantic version precedence
pub fn latest(candidates: Vec<PackageVersionCandidate>) -> Option<PackageVersionCandidate> {
    candidates.into_iter().max_by(|a, b| a.version.cmp(&b.version))
}
