//! Installed-version token and the update-available decision.
//!
//! The installed version is an opaque comparison token assembled from the
//! specification and implementation identifiers embedded at build time. It is
//! compared textually against the remote release tag; no ordering is applied,
//! the remote repository's latest tag is authoritative.

use std::fmt;

/// Specification version embedded in this build.
const SPEC_VERSION: &str = match option_env!("LEAPFROG_SPEC_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};

/// Implementation version embedded in this build, if any.
const IMPL_VERSION: Option<&str> = option_env!("LEAPFROG_IMPL_VERSION");

/// Version of the running installation, recomputed on every check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledVersion(String);

impl InstalledVersion {
    /// Joins a specification and an implementation identifier.
    ///
    /// A `.` separates the two parts unless the implementation identifier
    /// starts with `b`, which marks a beta build tag that is appended directly.
    /// An absent or empty part contributes nothing.
    #[must_use]
    pub fn from_parts(specification: Option<&str>, implementation: Option<&str>) -> Self {
        let specification = specification.unwrap_or_default();
        let implementation = implementation.unwrap_or_default();

        let mut token = String::with_capacity(specification.len() + implementation.len() + 1);
        token.push_str(specification);
        if !specification.is_empty() && !implementation.is_empty() && !implementation.starts_with('b')
        {
            token.push('.');
        }
        token.push_str(implementation);
        Self(token)
    }

    /// Version of the build that is currently running.
    #[must_use]
    pub fn current() -> Self {
        Self::from_parts(Some(SPEC_VERSION), IMPL_VERSION)
    }

    /// The comparison token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstalledVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns whether `remote` names a different release than `installed`.
///
/// Fails closed: an empty token on either side never triggers an update.
#[must_use]
pub fn update_available(installed: &str, remote: &str) -> bool {
    if installed.is_empty() || remote.is_empty() {
        return false;
    }
    installed != remote
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_separator_inserted_for_release_builds() {
        let version = InstalledVersion::from_parts(Some("2.4"), Some("1"));
        assert_eq!(version.as_str(), "2.4.1");
    }

    #[test]
    fn test_beta_implementation_appended_directly() {
        let version = InstalledVersion::from_parts(Some("2.4"), Some("b12"));
        assert_eq!(version.as_str(), "2.4b12");
    }

    #[test]
    fn test_absent_parts_contribute_nothing() {
        assert_eq!(InstalledVersion::from_parts(Some("2.4"), None).as_str(), "2.4");
        assert_eq!(InstalledVersion::from_parts(None, Some("7")).as_str(), "7");
        assert_eq!(InstalledVersion::from_parts(None, None).as_str(), "");
    }

    #[test]
    fn test_current_is_not_empty() {
        assert!(!InstalledVersion::current().as_str().is_empty());
    }

    #[test]
    fn test_update_available_examples() {
        assert!(update_available("v2", "v3"));
        assert!(!update_available("v3", "v3"));
        // Older remote tags still count as different
        assert!(update_available("v3", "v2"));
        assert!(!update_available("", "v3"));
        assert!(!update_available("v2", ""));
    }

    proptest! {
        #[test]
        fn prop_update_available_is_fail_closed_inequality(a in ".{0,12}", b in ".{0,12}") {
            let expected = !a.is_empty() && !b.is_empty() && a != b;
            prop_assert_eq!(update_available(&a, &b), expected);
        }

        #[test]
        fn prop_same_token_never_updates(a in ".{0,12}") {
            prop_assert!(!update_available(&a, &a));
        }
    }
}
