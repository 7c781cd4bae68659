//! Additional-authority hooks.
//!
//! A hook runs after stored authorities are loaded and may merge in
//! authorities from elsewhere (configuration files, feature flags, ...). It
//! only sees an [`AuthorityAppender`], which cannot drop entries.

use std::collections::HashMap;

use serde::Deserialize;

use lightsec_core::SecurityResult;

use crate::authority::{AuthorityAppender, GrantedRole};

pub trait AdditionalAuthorities: Send + Sync {
    fn add_additional_authorities(
        &self,
        subject_name: &str,
        authorities: &mut AuthorityAppender<'_>,
    ) -> SecurityResult<()>;
}

/// Contributes nothing.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoAdditionalAuthorities;

impl AdditionalAuthorities for NoAdditionalAuthorities {
    fn add_additional_authorities(
        &self,
        _: &str,
        _: &mut AuthorityAppender<'_>,
    ) -> SecurityResult<()> {
        Ok(())
    }
}

/// Fixed per-subject grants, typically loaded from a configuration file:
///
/// ```json
/// { "alice": [{ "code": "ROLE_AUDITOR" }] }
/// ```
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(transparent)]
pub struct StaticAuthorities {
    by_subject: HashMap<String, Vec<GrantedRole>>,
}

impl StaticAuthorities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, subject_name: impl Into<String>, role: GrantedRole) -> Self {
        self.by_subject
            .entry(subject_name.into())
            .or_default()
            .push(role);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_empty(&self) -> bool {
        self.by_subject.is_empty()
    }
}

impl AdditionalAuthorities for StaticAuthorities {
    fn add_additional_authorities(
        &self,
        subject_name: &str,
        authorities: &mut AuthorityAppender<'_>,
    ) -> SecurityResult<()> {
        if let Some(roles) = self.by_subject.get(subject_name) {
            authorities.extend(roles.iter().cloned());
        }
        Ok(())
    }
}

/// Adapts a closure into a hook.
pub struct FnAuthorities<F>(F);

impl<F> FnAuthorities<F>
where
    F: Fn(&str, &mut AuthorityAppender<'_>) -> SecurityResult<()> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> AdditionalAuthorities for FnAuthorities<F>
where
    F: Fn(&str, &mut AuthorityAppender<'_>) -> SecurityResult<()> + Send + Sync,
{
    fn add_additional_authorities(
        &self,
        subject_name: &str,
        authorities: &mut AuthorityAppender<'_>,
    ) -> SecurityResult<()> {
        (self.0)(subject_name, authorities)
    }
}
