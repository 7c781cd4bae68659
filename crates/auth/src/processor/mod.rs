//! Principal resolution.
//!
//! A `PrincipalDataProcessor` turns a subject name into a fully populated
//! [`Subject`]:
//!
//! ```text
//! subject name
//!   ↓
//! 1. load base rows ("subjects-by-name"), none → SubjectNotFound(404)
//!   ↓
//! 2. take the first row
//!   ↓
//! 3. direct authorities (if enabled) + group authorities (if enabled)
//!   ↓
//! 4. additional-authorities hook (additive only)
//!   ↓
//! 5. empty set → SubjectNotFound(401)
//!   ↓
//! 6. create_subject_detail
//! ```
//!
//! Concrete processors only supply `load_subject_authorities` and the
//! `supports` predicate; the rest is provided. Data access goes through the
//! collaborators held by [`ProcessorContext`], never through inherited state.

pub mod group;
pub mod hooks;
pub mod simple;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use lightsec_core::{
    CollaboratorError, QueryCatalog, QueryKey, Row, RowSource, SecurityError, SecurityResult,
    SubjectId, Value, query_map,
};

use crate::auth_type::AuthType;
use crate::authority::{AuthorityAppender, AuthoritySet, GrantedRole};
use crate::subject::{AccountFlags, Subject, SubjectRow};

pub use group::GroupJdbcProcessor;
pub use hooks::{AdditionalAuthorities, FnAuthorities, NoAdditionalAuthorities, StaticAuthorities};
pub use simple::SimpleJdbcProcessor;

/// Toggles consumed by the resolution algorithm.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    pub authorities_enabled: bool,
    pub groups_enabled: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            authorities_enabled: true,
            groups_enabled: false,
        }
    }
}

/// Collaborators and settings shared by a processor instance.
#[derive(Clone)]
pub struct ProcessorContext {
    rows: Arc<dyn RowSource>,
    catalog: Arc<dyn QueryCatalog>,
    config: ProcessorConfig,
    additional: Arc<dyn AdditionalAuthorities>,
}

impl ProcessorContext {
    pub fn new(rows: Arc<dyn RowSource>, catalog: Arc<dyn QueryCatalog>) -> Self {
        Self {
            rows,
            catalog,
            config: ProcessorConfig::default(),
            additional: Arc::new(NoAdditionalAuthorities),
        }
    }

    pub fn with_config(mut self, config: ProcessorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_additional_authorities(mut self, hook: Arc<dyn AdditionalAuthorities>) -> Self {
        self.additional = hook;
        self
    }

    pub fn rows(&self) -> &dyn RowSource {
        self.rows.as_ref()
    }

    pub fn catalog(&self) -> &dyn QueryCatalog {
        self.catalog.as_ref()
    }

    pub fn config(&self) -> ProcessorConfig {
        self.config
    }

    pub fn additional_authorities(&self) -> &dyn AdditionalAuthorities {
        self.additional.as_ref()
    }

    /// Run the catalog query `key` for `subject_id` and map authority rows.
    pub fn load_authorities(
        &self,
        key: QueryKey,
        subject_id: SubjectId,
    ) -> Result<Vec<GrantedRole>, CollaboratorError> {
        let query = self.catalog.require(key)?;
        query_map(
            self.rows.as_ref(),
            query,
            &[Value::Int(subject_id.get())],
            authority_from_row,
        )
    }
}

impl core::fmt::Debug for ProcessorContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProcessorContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Maps `[id, code, name, enabled, open]` into a granted role.
pub fn authority_from_row(row: &Row, _row_num: usize) -> Result<GrantedRole, CollaboratorError> {
    Ok(GrantedRole::new(row.get_str(1)?.to_string())
        .with_id(row.get_i64(0)?)
        .with_name(row.get_str(2)?)
        .with_enabled(row.get_bool(3)?)
        .with_open(row.get_bool(4)?))
}

/// Strategy that resolves principals for one or more authentication modes.
pub trait PrincipalDataProcessor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn supports(&self, auth_type: &AuthType) -> bool;

    fn context(&self) -> &ProcessorContext;

    /// Authorities granted directly to the subject.
    fn load_subject_authorities(&self, subject_id: SubjectId) -> SecurityResult<Vec<GrantedRole>>;

    /// Authorities inherited through group membership.
    ///
    /// Unsupported unless overridden; enabling groups against a processor
    /// that keeps this default fails every resolution with code 500.
    fn load_group_authorities(&self, subject_id: SubjectId) -> SecurityResult<Vec<GrantedRole>> {
        tracing::debug!(
            processor = self.name(),
            subject_id = %subject_id,
            "group authorities are not supported"
        );
        Err(SecurityError::unsupported("group-authorities"))
    }

    /// Base rows matching `subject_name`, in row-source order.
    fn load_subjects_by_subject_name(&self, subject_name: &str) -> SecurityResult<Vec<SubjectRow>> {
        let ctx = self.context();
        let query = ctx.catalog().require(QueryKey::SubjectsBySubjectName)?;
        let rows = query_map(
            ctx.rows(),
            query,
            &[Value::from(subject_name)],
            SubjectRow::from_row,
        )?;
        Ok(rows)
    }

    /// Final assembly step. Override to derive account flags from richer rows.
    fn create_subject_detail(
        &self,
        _subject_name: &str,
        base: SubjectRow,
        authorities: AuthoritySet,
    ) -> Subject {
        Subject::new(
            base.id,
            base.subject_name,
            base.secret,
            AccountFlags::active(base.enabled),
            authorities,
        )
    }

    /// Resolve `subject_name` into an immutable principal record.
    fn resolve_principal(&self, subject_name: &str) -> SecurityResult<Subject> {
        let span = tracing::debug_span!(
            "resolve_principal",
            subject = subject_name,
            processor = self.name()
        );
        let _entered = span.enter();

        let mut candidates = self.load_subjects_by_subject_name(subject_name)?;
        if candidates.is_empty() {
            tracing::debug!("subject not found");
            return Err(SecurityError::unknown_subject(subject_name));
        }
        if candidates.len() > 1 {
            tracing::debug!(matches = candidates.len(), "multiple subjects matched, using the first");
        }
        let base = candidates.swap_remove(0);

        let config = self.context().config();
        let mut authorities = AuthoritySet::new();
        if config.authorities_enabled {
            authorities.extend(self.load_subject_authorities(base.id)?);
        }
        if config.groups_enabled {
            authorities.extend(self.load_group_authorities(base.id)?);
        }

        self.context()
            .additional_authorities()
            .add_additional_authorities(
                &base.subject_name,
                &mut AuthorityAppender::new(&mut authorities),
            )?;

        if authorities.is_empty() {
            tracing::debug!("subject has no authorities, treating as not found");
            return Err(SecurityError::no_authorities(subject_name));
        }

        tracing::debug!(authorities = authorities.len(), "subject resolved");
        Ok(self.create_subject_detail(subject_name, base, authorities))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixture collaborators for processor tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use lightsec_core::{CollaboratorError, QueryCatalog, QueryKey, Row, RowSource, Value};

    pub const SUBJECTS: &str = "select subjects";
    pub const AUTHORITIES: &str = "select authorities";
    pub const GROUP_AUTHORITIES: &str = "select group authorities";

    pub struct Catalog(pub HashMap<&'static str, &'static str>);

    impl Catalog {
        pub fn full() -> Self {
            Self(HashMap::from([
                (QueryKey::SubjectsBySubjectName.as_str(), SUBJECTS),
                (QueryKey::AuthoritiesBySubjectId.as_str(), AUTHORITIES),
                (QueryKey::GroupAuthoritiesBySubjectId.as_str(), GROUP_AUTHORITIES),
            ]))
        }
    }

    impl QueryCatalog for Catalog {
        fn lookup(&self, key: &str) -> Option<&str> {
            self.0.get(key).copied()
        }
    }

    /// Rows keyed by (query, first parameter); records every call.
    #[derive(Default)]
    pub struct Rows {
        pub rows: HashMap<(&'static str, Value), Vec<Row>>,
        pub calls: Mutex<Vec<(String, Vec<Value>)>>,
        pub fail: Option<&'static str>,
    }

    impl Rows {
        pub fn with(mut self, query: &'static str, param: impl Into<Value>, rows: Vec<Row>) -> Self {
            self.rows.insert((query, param.into()), rows);
            self
        }

        pub fn call_count(&self, query: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|(q, _)| q == query).count()
        }
    }

    impl RowSource for Rows {
        fn query(&self, query: &str, params: &[Value]) -> Result<Vec<Row>, CollaboratorError> {
            self.calls
                .lock()
                .unwrap()
                .push((query.to_string(), params.to_vec()));
            if self.fail == Some(query) {
                return Err(CollaboratorError::row_source("connection reset"));
            }
            let Some(first) = params.first() else {
                return Ok(vec![]);
            };
            Ok(self
                .rows
                .iter()
                .find(|((q, p), _)| *q == query && p == first)
                .map(|(_, rows)| rows.clone())
                .unwrap_or_default())
        }
    }

    pub fn subject_row(id: i64, name: &str, enabled: bool) -> Row {
        Row::new(vec![
            Value::Int(id),
            Value::from(name),
            Value::from("secret"),
            Value::Bool(enabled),
        ])
    }

    pub fn authority_row(id: i64, code: &str) -> Row {
        Row::new(vec![
            Value::Int(id),
            Value::from(code),
            Value::from(code.to_lowercase()),
            Value::Bool(true),
            Value::Bool(false),
        ])
    }
}
