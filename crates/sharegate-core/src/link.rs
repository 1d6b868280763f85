use crate::error::{CoreError, Result};
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use subtle::ConstantTimeEq;

const LINK_ID_MIN_LENGTH: usize = 3;
const LINK_ID_MAX_LENGTH: usize = 64;
const IDENTIFIER_MAX_LENGTH: usize = 128;

/// The public handle of a share link, used as the `/shared/{id}` path segment.
///
/// Ids are not secret: they can end up in logs and browser history. Valid ids
/// are 3-64 characters of `[a-zA-Z0-9_-]`, which covers base58 output.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LinkId(String);

impl LinkId {
    /// Parses a link id, rejecting anything a generator could never produce.
    pub fn parse(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.len() < LINK_ID_MIN_LENGTH || id.len() > LINK_ID_MAX_LENGTH {
            return Err(CoreError::InvalidLinkId(format!(
                "length must be between {} and {}, got {}",
                LINK_ID_MIN_LENGTH,
                LINK_ID_MAX_LENGTH,
                id.len()
            )));
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(CoreError::InvalidLinkId(format!(
                "must contain only alphanumeric characters, hyphens, or underscores: '{}'",
                id
            )));
        }

        Ok(Self(id))
    }

    /// Creates a `LinkId` by base58-encoding the given bytes.
    pub fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Self {
        Self(bs58::encode(bytes).into_string())
    }

    /// Creates a `LinkId` without validation.
    ///
    /// Use this only for ids produced by trusted internal sources.
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for LinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LinkId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<LinkId> for String {
    fn from(value: LinkId) -> Self {
        value.0
    }
}

fn validate_identifier(value: &str) -> std::result::Result<(), String> {
    if value.is_empty() {
        return Err("must not be empty".to_string());
    }
    if value.chars().count() > IDENTIFIER_MAX_LENGTH {
        return Err(format!(
            "must be at most {} characters",
            IDENTIFIER_MAX_LENGTH
        ));
    }
    if value.chars().any(|c| c.is_control()) {
        return Err("must not contain control characters".to_string());
    }
    Ok(())
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $variant:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Result<Self> {
                let value = value.into();
                validate_identifier(&value)
                    .map_err(|reason| CoreError::$variant(format!("{reason}: '{}'", value.escape_debug())))?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = CoreError;

            fn try_from(value: String) -> Result<Self> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

identifier!(
    /// Identity of the person who created a link, as stamped by the identity provider.
    OwnerId,
    InvalidOwnerId
);

identifier!(
    /// Identifier of an assessment record exposed through a link.
    SubjectId,
    InvalidSubjectId
);

/// The secret half of a share link.
///
/// Possession of the token is the only proof of authorization, so it is never
/// printed by `Debug` and is only ever compared in constant time.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareToken(String);

impl ShareToken {
    /// Creates a token by base58-encoding the given secret bytes.
    pub fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Self {
        Self(bs58::encode(bytes).into_string())
    }

    pub fn new_unchecked(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// A fixed token that matches nothing a generator produces.
    ///
    /// Compared against when the requested id does not exist, so that the
    /// missing-id path does the same work as the wrong-token path.
    pub fn placeholder() -> Self {
        Self("0".repeat(44))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compares `candidate` against this token in constant time.
    pub fn matches(&self, candidate: &str) -> bool {
        self.0.as_bytes().ct_eq(candidate.as_bytes()).into()
    }
}

impl PartialEq for ShareToken {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other.as_str())
    }
}

impl Eq for ShareToken {}

impl std::fmt::Debug for ShareToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ShareToken(<redacted>)")
    }
}

/// Lifecycle state of a link as seen at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Active,
    Expired,
    Revoked,
}

/// A time-limited, revocable grant of read access to assessment results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareLink {
    pub id: LinkId,
    pub token: ShareToken,
    pub owner_id: OwnerId,
    /// Assessment records exposed by this link, in the order they were shared.
    pub subject_ids: Vec<SubjectId>,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    /// Successful resolutions so far. Never decreases.
    pub access_count: u64,
    /// Cleared by revocation, independently of expiry.
    pub is_active: bool,
}

impl ShareLink {
    /// Whether the link can be resolved at `now`.
    ///
    /// Depends only on `is_active` and `expires_at`.
    pub fn is_resolvable(&self, now: Timestamp) -> bool {
        self.is_active && now < self.expires_at
    }

    /// Revocation is reported ahead of expiry.
    pub fn status(&self, now: Timestamp) -> LinkStatus {
        if !self.is_active {
            LinkStatus::Revoked
        } else if now >= self.expires_at {
            LinkStatus::Expired
        } else {
            LinkStatus::Active
        }
    }

    /// The validity window requested at creation.
    pub fn ttl(&self) -> SignedDuration {
        self.expires_at.duration_since(self.created_at)
    }

    /// Composes the public capability URL for this link.
    pub fn to_url(&self, origin: &str) -> String {
        format!(
            "{}/shared/{}?token={}",
            origin.trim_end_matches('/'),
            self.id,
            self.token.as_str()
        )
    }
}
