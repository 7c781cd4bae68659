use serde::Serialize;

use lightsec_core::{CollaboratorError, Row, SubjectId};

use crate::authority::{AuthoritySet, GrantedRole};

/// Base record of a subject as stored, before authorities are attached.
#[derive(Clone, PartialEq, Eq)]
pub struct SubjectRow {
    pub id: SubjectId,
    pub subject_name: String,
    pub secret: String,
    pub enabled: bool,
}

impl SubjectRow {
    /// Maps `[id, subject_name, secret, enabled]`.
    pub fn from_row(row: &Row, _row_num: usize) -> Result<Self, CollaboratorError> {
        Ok(Self {
            id: SubjectId::new(row.get_i64(0)?),
            subject_name: row.get_str(1)?.to_string(),
            secret: row.get_str(2)?.to_string(),
            enabled: row.get_bool(3)?,
        })
    }
}

impl core::fmt::Debug for SubjectRow {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SubjectRow")
            .field("id", &self.id)
            .field("subject_name", &self.subject_name)
            .field("secret", &"<redacted>")
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Account state flags carried by a resolved subject.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct AccountFlags {
    pub enabled: bool,
    pub account_non_expired: bool,
    pub credentials_non_expired: bool,
    pub account_non_locked: bool,
}

impl AccountFlags {
    /// `enabled` as given, every other flag true.
    pub fn active(enabled: bool) -> Self {
        Self {
            enabled,
            account_non_expired: true,
            credentials_non_expired: true,
            account_non_locked: true,
        }
    }
}

/// A fully resolved, immutable principal record.
///
/// Built fresh per resolution call and handed to the caller by value.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Subject {
    key: SubjectId,
    subject_name: String,
    #[serde(skip)]
    secret: String,
    #[serde(flatten)]
    flags: AccountFlags,
    authorities: Vec<GrantedRole>,
}

impl Subject {
    pub fn new(
        key: SubjectId,
        subject_name: impl Into<String>,
        secret: impl Into<String>,
        flags: AccountFlags,
        authorities: AuthoritySet,
    ) -> Self {
        Self {
            key,
            subject_name: subject_name.into(),
            secret: secret.into(),
            flags,
            authorities: authorities.into_vec(),
        }
    }

    pub fn key(&self) -> SubjectId {
        self.key
    }

    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn flags(&self) -> AccountFlags {
        self.flags
    }

    pub fn is_enabled(&self) -> bool {
        self.flags.enabled
    }

    pub fn is_account_non_expired(&self) -> bool {
        self.flags.account_non_expired
    }

    pub fn is_credentials_non_expired(&self) -> bool {
        self.flags.credentials_non_expired
    }

    pub fn is_account_non_locked(&self) -> bool {
        self.flags.account_non_locked
    }

    pub fn authorities(&self) -> &[GrantedRole] {
        &self.authorities
    }
}

impl core::fmt::Debug for Subject {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subject")
            .field("key", &self.key)
            .field("subject_name", &self.subject_name)
            .field("secret", &"<redacted>")
            .field("flags", &self.flags)
            .field("authorities", &self.authorities)
            .finish()
    }
}
