use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::{SocialError, SocialResult};
use super::provider::Provider;

/// Supplies the client registration for one provider.
///
/// Implementations are consulted on every outbound URL build and every inbound
/// redirect, so they may return values that change over the process lifetime.
/// Each request reads them once into a [`Credentials`] snapshot.
pub trait CredentialSource: Send + Sync {
    fn client_id(&self) -> String;

    /// A confidential secret switches the provider to the authorization-code grant.
    fn client_secret(&self) -> Option<String> {
        None
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
        }
    }

    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    pub fn from_source(source: &dyn CredentialSource) -> Self {
        Self {
            client_id: source.client_id(),
            client_secret: source.client_secret(),
        }
    }

    pub fn has_secret(&self) -> bool {
        self.client_secret.is_some()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl CredentialSource for Credentials {
    fn client_id(&self) -> String {
        self.client_id.clone()
    }

    fn client_secret(&self) -> Option<String> {
        self.client_secret.clone()
    }
}

/// Read-only lookup of the credential source registered per provider.
#[derive(Clone, Default)]
pub struct CredentialRegistry {
    sources: BTreeMap<Provider, Arc<dyn CredentialSource>>,
}

impl CredentialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, provider: Provider, source: Arc<dyn CredentialSource>) {
        self.sources.insert(provider, source);
    }

    pub fn contains(&self, provider: Provider) -> bool {
        self.sources.contains_key(&provider)
    }

    pub fn providers(&self) -> impl Iterator<Item = Provider> + '_ {
        self.sources.keys().copied()
    }

    /// Snapshot of the provider's credentials, if a source is registered.
    pub fn get(&self, provider: Provider) -> Option<Credentials> {
        self.sources
            .get(&provider)
            .map(|source| Credentials::from_source(source.as_ref()))
    }

    pub fn require(&self, provider: Provider) -> SocialResult<Credentials> {
        self.get(provider)
            .ok_or(SocialError::MissingCredentials { provider })
    }
}

impl fmt::Debug for CredentialRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRegistry")
            .field("providers", &self.sources.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RotatingSource {
        reads: AtomicUsize,
    }

    impl CredentialSource for RotatingSource {
        fn client_id(&self) -> String {
            let read = self.reads.fetch_add(1, Ordering::SeqCst);
            format!("client-{read}")
        }
    }

    #[test]
    fn default_secret_is_none() {
        let source = RotatingSource {
            reads: AtomicUsize::new(0),
        };
        assert!(source.client_secret().is_none());
    }

    #[test]
    fn require_reports_missing_provider() {
        let mut registry = CredentialRegistry::new();
        registry.insert(Provider::Facebook, Arc::new(Credentials::new("42")));

        assert_eq!(registry.require(Provider::Facebook).unwrap().client_id, "42");
        assert_eq!(
            registry.require(Provider::Google),
            Err(SocialError::MissingCredentials {
                provider: Provider::Google
            })
        );
    }

    #[test]
    fn snapshot_is_taken_per_lookup() {
        let mut registry = CredentialRegistry::new();
        registry.insert(
            Provider::Vkontakte,
            Arc::new(RotatingSource {
                reads: AtomicUsize::new(0),
            }),
        );

        let first = registry.get(Provider::Vkontakte).unwrap();
        let second = registry.get(Provider::Vkontakte).unwrap();
        assert_eq!(first.client_id, "client-0");
        assert_eq!(second.client_id, "client-1");
    }

    #[test]
    fn debug_redacts_secret() {
        let credentials = Credentials::new("id").with_client_secret("hunter2");
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
