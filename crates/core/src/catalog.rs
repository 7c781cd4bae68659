//! Persisted-query catalog boundary.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::CollaboratorError;

/// Symbolic keys of the queries the core issues.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryKey {
    /// `[id, subject_name, secret, enabled]`, one text parameter.
    #[serde(rename = "subjects-by-name")]
    SubjectsBySubjectName,
    /// `[id, code, name, enabled, open]`, one integer parameter.
    AuthoritiesBySubjectId,
    /// Same shape as `AuthoritiesBySubjectId`, reached through group membership.
    GroupAuthoritiesBySubjectId,
}

impl QueryKey {
    pub const ALL: [QueryKey; 3] = [
        QueryKey::SubjectsBySubjectName,
        QueryKey::AuthoritiesBySubjectId,
        QueryKey::GroupAuthoritiesBySubjectId,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            QueryKey::SubjectsBySubjectName => "subjects-by-name",
            QueryKey::AuthoritiesBySubjectId => "authorities-by-subject-id",
            QueryKey::GroupAuthoritiesBySubjectId => "group-authorities-by-subject-id",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

impl core::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Looks up persisted query text by key.
pub trait QueryCatalog: Send + Sync {
    fn lookup(&self, key: &str) -> Option<&str>;

    /// Lookup that treats a missing entry as a collaborator failure.
    fn require(&self, key: QueryKey) -> Result<&str, CollaboratorError> {
        self.lookup(key.as_str())
            .ok_or_else(|| CollaboratorError::MissingQuery(key.as_str().to_string()))
    }
}

impl<C> QueryCatalog for Arc<C>
where
    C: QueryCatalog + ?Sized,
{
    fn lookup(&self, key: &str) -> Option<&str> {
        (**self).lookup(key)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    impl QueryCatalog for HashMap<String, String> {
        fn lookup(&self, key: &str) -> Option<&str> {
            self.get(key).map(String::as_str)
        }
    }

    #[test]
    fn keys_round_trip_through_strings() {
        for key in QueryKey::ALL {
            assert_eq!(QueryKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(QueryKey::parse("users-by-email"), None);
    }

    #[test]
    fn serde_names_match_catalog_keys() {
        for key in QueryKey::ALL {
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{}\"", key.as_str()));
        }
    }

    #[test]
    fn require_reports_missing_key() {
        let mut catalog = HashMap::new();
        catalog.insert("subjects-by-name".to_string(), "SELECT 1".to_string());

        assert_eq!(
            catalog.require(QueryKey::SubjectsBySubjectName).unwrap(),
            "SELECT 1"
        );
        assert_eq!(
            catalog.require(QueryKey::AuthoritiesBySubjectId).unwrap_err(),
            CollaboratorError::MissingQuery("authorities-by-subject-id".to_string())
        );
    }
}
