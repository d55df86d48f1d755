//! Schema versions and their version-attribute policies.
//!
//! The two supported document versions disagree on how strictly the
//! `version` attribute is enforced. The rules live in one table per schema
//! so the field reader never branches on the schema itself.

use std::fmt;

/// Supported document schema versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVersion {
    /// Legacy `0.5` documents; lenient about versions.
    V0_5,
    /// Current `0.6` documents; versions are mandatory for server objects.
    V0_6,
}

impl SchemaVersion {
    /// Parse the root `version` attribute.
    ///
    /// # Examples
    /// ```
    /// use waymark_data::SchemaVersion;
    ///
    /// assert_eq!(SchemaVersion::from_token("0.6"), Some(SchemaVersion::V0_6));
    /// assert_eq!(SchemaVersion::from_token("0.4"), None);
    /// ```
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "0.5" => Some(Self::V0_5),
            "0.6" => Some(Self::V0_6),
            _ => None,
        }
    }

    /// The attribute value naming this version.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::V0_5 => "0.5",
            Self::V0_6 => "0.6",
        }
    }

    pub(crate) const fn version_policy(self) -> &'static VersionPolicy {
        match self {
            Self::V0_5 => &LEGACY_POLICY,
            Self::V0_6 => &CURRENT_POLICY,
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// What to do when a version attribute breaks a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Remedy {
    /// Abort the import.
    Reject,
    /// Substitute the value and emit a diagnostic.
    Normalise(u32),
    /// Substitute the value silently.
    Default(u32),
}

/// Version-attribute rules for one schema.
///
/// "Existing" primitives carry a positive id; "new" ones are document-local.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VersionPolicy {
    pub missing_on_existing: Remedy,
    pub missing_on_new: Remedy,
    pub non_positive_on_existing: Remedy,
    pub negative_on_new: Remedy,
}

const LEGACY_POLICY: VersionPolicy = VersionPolicy {
    missing_on_existing: Remedy::Normalise(1),
    missing_on_new: Remedy::Default(0),
    non_positive_on_existing: Remedy::Normalise(1),
    negative_on_new: Remedy::Normalise(0),
};

const CURRENT_POLICY: VersionPolicy = VersionPolicy {
    missing_on_existing: Remedy::Reject,
    missing_on_new: Remedy::Default(0),
    non_positive_on_existing: Remedy::Reject,
    negative_on_new: Remedy::Normalise(0),
};

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SchemaVersion::V0_5)]
    #[case(SchemaVersion::V0_6)]
    fn tokens_round_trip(#[case] schema: SchemaVersion) {
        assert_eq!(SchemaVersion::from_token(schema.token()), Some(schema));
    }

    #[rstest]
    #[case("")]
    #[case("0.7")]
    #[case("0.6 ")]
    fn rejects_unsupported_tokens(#[case] token: &str) {
        assert_eq!(SchemaVersion::from_token(token), None);
    }

    #[rstest]
    fn current_schema_rejects_missing_versions_on_existing_primitives() {
        let policy = SchemaVersion::V0_6.version_policy();
        assert_eq!(policy.missing_on_existing, Remedy::Reject);
        assert_eq!(
            SchemaVersion::V0_5.version_policy().missing_on_existing,
            Remedy::Normalise(1)
        );
    }

    #[rstest]
    fn new_primitives_default_to_version_zero_under_both_schemas() {
        for schema in [SchemaVersion::V0_5, SchemaVersion::V0_6] {
            assert_eq!(schema.version_policy().missing_on_new, Remedy::Default(0));
        }
    }
}
