use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Authentication-mode tag used to pick a principal processor.
///
/// An open set: new modes are new values, not new variants. The tag is a
/// dispatch key only and carries no business data.
///
/// Parsed tags (`FromStr` and serde) are trimmed and uppercased, so
/// `"group"` in a config file and `GROUP` in the environment name the same
/// mode. [`AuthType::new`] takes the tag verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AuthType(Cow<'static, str>);

impl AuthType {
    /// Subject rows plus directly granted authorities.
    pub const SIMPLE: AuthType = AuthType(Cow::Borrowed("SIMPLE"));

    /// Direct authorities plus authorities inherited through groups.
    pub const GROUP: AuthType = AuthType(Cow::Borrowed("GROUP"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AuthType {
    fn default() -> Self {
        Self::SIMPLE
    }
}

impl core::fmt::Display for AuthType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("authentication type must not be blank")]
pub struct BlankAuthType;

impl core::str::FromStr for AuthType {
    type Err = BlankAuthType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        if tag.is_empty() {
            return Err(BlankAuthType);
        }
        Ok(Self::new(tag.to_ascii_uppercase()))
    }
}

impl<'de> Deserialize<'de> for AuthType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
