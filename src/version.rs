//! Version oracle: does an installed version satisfy a declared range?
//!
//! Thin wrapper around the semver crate. Ranges and versions that do not
//! parse are reported as not satisfied, so malformed declarations surface as
//! needs-action modules instead of aborting the run.

use semver::{Version, VersionReq};

/// Returns true if `installed` satisfies the declared `range`
pub fn satisfies(installed: &str, range: &str) -> bool {
    let installed = installed.trim();
    let installed = installed.strip_prefix('v').unwrap_or(installed);

    let version = match Version::parse(installed) {
        Ok(v) => v,
        Err(_) => return false,
    };

    // a bare version declares an exact requirement, unlike the caret
    // default VersionReq would give it
    let range = range.trim();
    if let Ok(exact) = Version::parse(range) {
        return version == exact;
    }

    let req = match VersionReq::parse(range) {
        Ok(r) => r,
        Err(_) => return false,
    };

    req.matches(&version)
}
