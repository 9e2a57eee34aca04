//! Landing-page slugs.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Short unique identifier embedded in a job's shareable landing-page URL
/// and in derived output filenames.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Generate a fresh `site-<12 hex>` slug.
    pub fn generate() -> Self {
        let id = Uuid::new_v4().simple().to_string();
        Self(format!("site-{}", &id[..12]))
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_format() {
        let slug = Slug::generate();
        assert!(slug.as_str().starts_with("site-"));
        assert_eq!(slug.as_str().len(), "site-".len() + 12);
    }

    #[test]
    fn test_slugs_are_unique() {
        assert_ne!(Slug::generate(), Slug::generate());
    }
}
