use crate::error::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use sharegate_core::{CoreError, IdentityProvider, OwnerId};
use subtle::{Choice, ConstantTimeEq};
use tracing::debug;

/// Identity provider backed by a fixed set of API keys.
///
/// Every configured key is compared in constant time on each lookup, so the
/// time taken does not depend on which key (if any) matched.
#[derive(Clone, Default)]
pub struct StaticIdentityProvider {
    keys: Vec<(String, OwnerId)>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, api_key: impl Into<String>, owner: OwnerId) -> Self {
        self.keys.push((api_key.into(), owner));
        self
    }

    /// Parses `owner:key` entries.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut provider = Self::new();
        for entry in entries {
            let entry = entry.as_ref();
            let (owner, key) = entry
                .split_once(':')
                .filter(|(_, key)| !key.is_empty())
                .ok_or_else(|| {
                    CoreError::InvalidOwnerId("api key entries must look like 'owner:key'".into())
                })?;
            provider = provider.with_key(key, OwnerId::new(owner)?);
        }
        Ok(provider)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl std::fmt::Debug for StaticIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticIdentityProvider")
            .field("keys", &self.keys.len())
            .finish()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn identify(&self, credential: &str) -> Option<OwnerId> {
        let mut found = None;
        for (key, owner) in &self.keys {
            let matched: Choice = key.as_bytes().ct_eq(credential.as_bytes());
            if bool::from(matched) && found.is_none() {
                found = Some(owner.clone());
            }
        }
        found
    }
}

/// The authenticated caller of an owner endpoint.
///
/// Extracted from an `Authorization: Bearer <api key>` header.
#[derive(Debug, Clone)]
pub struct Owner(pub OwnerId);

impl FromRequestParts<AppState> for Owner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credential = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|credential| !credential.is_empty())
            .ok_or(AppError::Unauthenticated)?;

        match state.identities().identify(credential).await {
            Some(owner) => Ok(Owner(owner)),
            None => {
                debug!("rejected unknown api key");
                Err(AppError::Unauthenticated)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identifies_configured_keys_only() {
        let provider =
            StaticIdentityProvider::from_entries(["alice:k-alice-123", "bob:k-bob-456"]).unwrap();

        assert_eq!(
            provider.identify("k-alice-123").await.unwrap().as_str(),
            "alice"
        );
        assert_eq!(provider.identify("k-bob-456").await.unwrap().as_str(), "bob");
        assert!(provider.identify("k-alice-12").await.is_none());
        assert!(provider.identify("").await.is_none());
    }

    #[test]
    fn rejects_malformed_entries() {
        assert!(StaticIdentityProvider::from_entries(["no-separator"]).is_err());
        assert!(StaticIdentityProvider::from_entries(["alice:"]).is_err());
        assert!(StaticIdentityProvider::from_entries([":key"]).is_err());
    }

    #[test]
    fn debug_does_not_print_keys() {
        let provider = StaticIdentityProvider::new()
            .with_key("super-secret", OwnerId::new("alice").unwrap());
        assert!(!format!("{provider:?}").contains("super-secret"));
    }
}
