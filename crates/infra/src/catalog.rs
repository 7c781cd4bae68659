//! Query catalog backed by an in-process map.

use std::collections::BTreeMap;

use serde::Deserialize;

use lightsec_core::{QueryCatalog, QueryKey};

const SUBJECTS_BY_NAME: &str = "SELECT id, subject_name, password, enabled \
     FROM ls_subject WHERE subject_name = ?";

const AUTHORITIES_BY_SUBJECT_ID: &str = "SELECT r.id, r.code, r.name, r.enabled, r.open \
     FROM ls_role r JOIN ls_subject_role sr ON sr.role_id = r.id \
     WHERE sr.subject_id = ?";

const GROUP_AUTHORITIES_BY_SUBJECT_ID: &str = "SELECT r.id, r.code, r.name, r.enabled, r.open \
     FROM ls_role r JOIN ls_group_role gr ON gr.role_id = r.id \
     JOIN ls_group_member gm ON gm.group_id = gr.group_id \
     WHERE gm.subject_id = ?";

/// Catalog of named query texts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct StaticQueryCatalog {
    queries: BTreeMap<String, String>,
}

impl StaticQueryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default texts for every [`QueryKey`].
    pub fn with_defaults() -> Self {
        Self::new()
            .with_query(QueryKey::SubjectsBySubjectName, SUBJECTS_BY_NAME)
            .with_query(QueryKey::AuthoritiesBySubjectId, AUTHORITIES_BY_SUBJECT_ID)
            .with_query(
                QueryKey::GroupAuthoritiesBySubjectId,
                GROUP_AUTHORITIES_BY_SUBJECT_ID,
            )
    }

    pub fn with_query(mut self, key: QueryKey, text: impl Into<String>) -> Self {
        self.queries.insert(key.as_str().to_string(), text.into());
        self
    }

    /// Replace entries with `overrides`, keyed by catalog key string.
    pub fn merge(mut self, overrides: &BTreeMap<String, String>) -> Self {
        for (key, text) in overrides {
            self.queries.insert(key.clone(), text.clone());
        }
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

impl QueryCatalog for StaticQueryCatalog {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.queries.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_key() {
        let catalog = StaticQueryCatalog::with_defaults();
        for key in QueryKey::ALL {
            assert!(catalog.require(key).is_ok(), "missing {key}");
        }
        assert_eq!(catalog.len(), QueryKey::ALL.len());
    }

    #[test]
    fn overrides_replace_defaults() {
        let overrides = BTreeMap::from([(
            "subjects-by-name".to_string(),
            "SELECT id, login, hash, active FROM users WHERE login = $1".to_string(),
        )]);
        let catalog = StaticQueryCatalog::with_defaults().merge(&overrides);

        assert_eq!(
            catalog.lookup("subjects-by-name"),
            Some("SELECT id, login, hash, active FROM users WHERE login = $1")
        );
        assert_eq!(
            catalog.lookup("authorities-by-subject-id"),
            Some(AUTHORITIES_BY_SUBJECT_ID)
        );
    }

    #[test]
    fn loads_from_json() {
        let catalog = StaticQueryCatalog::from_json(r#"{"subjects-by-name":"SELECT 1"}"#).unwrap();
        assert_eq!(catalog.lookup("subjects-by-name"), Some("SELECT 1"));
        assert!(catalog.lookup("authorities-by-subject-id").is_none());
    }
}
