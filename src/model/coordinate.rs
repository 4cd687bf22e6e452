use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::TrustError;

/// Identifies the Maven dependency under evaluation.
///
/// Built once from CLI input and treated as immutable afterwards.
///
/// # Example
///
/// ```
/// use mvntrust::MavenCoordinate;
///
/// let coord: MavenCoordinate = "org.example:sample-lib".parse().unwrap();
/// assert_eq!(coord.group_id, "org.example");
/// assert_eq!(coord.artifact_id, "sample-lib");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MavenCoordinate {
    pub group_id: String,
    pub artifact_id: String,
}

impl MavenCoordinate {
    /// Creates a coordinate, validating both segments.
    ///
    /// # Errors
    ///
    /// Returns [`TrustError::Input`] if either segment is empty or
    /// contains whitespace, `:` or `/`.
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Result<Self, TrustError> {
        let group_id = group_id.into();
        let artifact_id = artifact_id.into();

        for (label, value) in [("group id", &group_id), ("artifact id", &artifact_id)] {
            if value.is_empty() {
                return Err(TrustError::Input(format!("{} must not be empty", label)));
            }
            if value.chars().any(|c| c.is_whitespace() || c == ':' || c == '/') {
                return Err(TrustError::Input(format!(
                    "{} '{}' contains invalid characters",
                    label, value
                )));
            }
        }

        Ok(Self { group_id, artifact_id })
    }
}

impl FromStr for MavenCoordinate {
    type Err = TrustError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((group, artifact)) => Self::new(group, artifact),
            None => Err(TrustError::Input(format!(
                "expected 'groupId:artifactId', got '{}'",
                s
            ))),
        }
    }
}

impl std::fmt::Display for MavenCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}
