use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// A permission unit.
///
/// `open` marks a public resource that needs no authorization check.
pub trait Authority {
    fn is_enabled(&self) -> bool;

    fn is_open(&self) -> bool;
}

/// An authority granted to one subject.
///
/// Owned by the aggregation result of a single resolution; never shared
/// across subjects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrantedRole {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    code: Cow<'static, str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default = "enabled_by_default")]
    enabled: bool,
    #[serde(default)]
    open: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl GrantedRole {
    /// An enabled, non-open role with the given code.
    pub fn new(code: impl Into<Cow<'static, str>>) -> Self {
        Self {
            id: None,
            code: code.into(),
            name: None,
            enabled: true,
            open: false,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_open(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Authority for GrantedRole {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

impl core::fmt::Display for GrantedRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.code)
    }
}

/// Authorities collected while resolving one subject.
///
/// Duplicates are kept as loaded. Hooks never see the set itself, only an
/// [`AuthorityAppender`] over it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthoritySet {
    roles: Vec<GrantedRole>,
}

impl AuthoritySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: GrantedRole) {
        self.roles.push(role);
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GrantedRole> {
        self.roles.iter()
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.roles.iter().any(|r| r.code() == code)
    }

    pub fn into_vec(self) -> Vec<GrantedRole> {
        self.roles
    }
}

impl Extend<GrantedRole> for AuthoritySet {
    fn extend<I: IntoIterator<Item = GrantedRole>>(&mut self, iter: I) {
        self.roles.extend(iter);
    }
}

impl FromIterator<GrantedRole> for AuthoritySet {
    fn from_iter<I: IntoIterator<Item = GrantedRole>>(iter: I) -> Self {
        Self {
            roles: iter.into_iter().collect(),
        }
    }
}

/// Append-only view of an [`AuthoritySet`] handed to additional-authority
/// hooks.
///
/// Entries loaded before the hook ran can be read but not removed, and the
/// underlying set cannot be swapped out: there is no public constructor and
/// no `Default`.
///
/// ```compile_fail
/// use lightsec_auth::{AuthorityAppender, AuthoritySet};
///
/// fn wipe(authorities: &mut AuthorityAppender<'_>) {
///     *authorities = AuthorityAppender::new(&mut AuthoritySet::new());
/// }
/// ```
#[derive(Debug)]
pub struct AuthorityAppender<'a> {
    set: &'a mut AuthoritySet,
}

impl<'a> AuthorityAppender<'a> {
    pub(crate) fn new(set: &'a mut AuthoritySet) -> Self {
        Self { set }
    }

    pub fn push(&mut self, role: GrantedRole) {
        self.set.push(role);
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GrantedRole> {
        self.set.iter()
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.set.contains_code(code)
    }
}

impl Extend<GrantedRole> for AuthorityAppender<'_> {
    fn extend<I: IntoIterator<Item = GrantedRole>>(&mut self, iter: I) {
        self.set.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_role_is_enabled_and_closed() {
        let role = GrantedRole::new("ROLE_ADMIN");
        assert!(role.is_enabled());
        assert!(!role.is_open());
        assert_eq!(role.to_string(), "ROLE_ADMIN");
    }

    #[test]
    fn deserializes_with_defaults() {
        let role: GrantedRole = serde_json::from_str(r#"{"code":"report.view"}"#).unwrap();
        assert_eq!(role, GrantedRole::new("report.view"));

        let role: GrantedRole =
            serde_json::from_str(r#"{"code":"home","enabled":false,"open":true}"#).unwrap();
        assert!(!role.is_enabled());
        assert!(role.is_open());
    }

    #[test]
    fn set_keeps_duplicates_in_order() {
        let mut set = AuthoritySet::new();
        set.push(GrantedRole::new("a"));
        set.extend([GrantedRole::new("b"), GrantedRole::new("a")]);

        let codes: Vec<_> = set.iter().map(GrantedRole::code).collect();
        assert_eq!(codes, vec!["a", "b", "a"]);
        assert!(set.contains_code("b"));
    }

    #[test]
    fn appender_only_adds() {
        let mut set: AuthoritySet = [GrantedRole::new("ROLE_USER")].into_iter().collect();
        {
            let mut appender = AuthorityAppender::new(&mut set);
            assert!(appender.contains_code("ROLE_USER"));
            appender.push(GrantedRole::new("ROLE_AUDITOR"));
            appender.extend([GrantedRole::new("ROLE_USER")]);
            assert_eq!(appender.len(), 3);
        }

        let codes: Vec<_> = set.iter().map(GrantedRole::code).collect();
        assert_eq!(codes, vec!["ROLE_USER", "ROLE_AUDITOR", "ROLE_USER"]);
    }
}
