use std::sync::Arc;

use url::Url;

use super::authorize::AuthorizationRequestBuilder;
use super::credentials::{CredentialRegistry, CredentialSource, Credentials};
use super::error::{SocialError, SocialResult};
use super::exchange::{CodeExchangeClient, ExchangeRequest, FormTransport, ReqwestFormTransport};
use super::notifier::{CompletionCallback, CompletionEvent, CompletionNotifier, CompletionOutcome};
use super::options::SocialOptions;
use super::provider::Provider;
use super::redirect::{NormalizedRedirect, RedirectClass, RedirectResolver};
use super::ParameterMap;
use crate::platform::runtime::spawn_detached;

/// Entry point that turns inbound redirect URLs into completion events.
///
/// Credentials, options, transport and the observer are injected through
/// [`SocialNetwork::builder`]; nothing is held in process-wide state.
#[derive(Debug)]
pub struct SocialNetwork {
    credentials: CredentialRegistry,
    options: SocialOptions,
    exchange_client: CodeExchangeClient,
    notifier: CompletionNotifier,
}

impl SocialNetwork {
    pub fn builder() -> SocialNetworkBuilder {
        SocialNetworkBuilder::new()
    }

    pub fn options(&self) -> &SocialOptions {
        &self.options
    }

    pub fn credentials(&self) -> &CredentialRegistry {
        &self.credentials
    }

    /// Browser authorization URL for `provider`.
    pub fn oauth_url(&self, provider: Provider) -> SocialResult<Url> {
        self.request_builder().oauth_url(provider)
    }

    /// Official application authorization URL for `provider`.
    pub fn app_url(&self, provider: Provider) -> SocialResult<Url> {
        self.request_builder().app_url(provider)
    }

    pub fn classify(&self, url: &str) -> RedirectClass {
        self.resolver().classify(url)
    }

    /// Classifies and normalizes `url` without dispatching anything.
    pub fn normalize(&self, url: &str) -> SocialResult<Option<NormalizedRedirect>> {
        self.resolver().resolve(url)
    }

    /// Replaces the observer that receives completion events.
    ///
    /// Registration is synchronized with delivery, but an exchange already in
    /// flight reports to whichever observer is registered when it completes.
    pub fn register_observer<F>(&self, observer: F)
    where
        F: Fn(&CompletionEvent) + Send + Sync + 'static,
    {
        self.notifier.register(observer);
    }

    pub fn unregister_observer(&self) {
        self.notifier.unregister();
    }

    /// Handles an inbound URL.
    ///
    /// Returns `Ok(false)` when the URL does not belong to this dispatcher and
    /// `Ok(true)` once exactly one completion event has been queued or a code
    /// exchange has been started that will queue it. Malformed redirects and
    /// missing credentials are returned as errors and produce no event.
    ///
    /// A code exchange runs on the caller's Tokio runtime when there is one,
    /// otherwise on a background runtime. On a `current_thread` runtime the
    /// exchange only makes progress while that runtime is polled, so do not
    /// block its thread waiting for the completion event.
    pub fn handle_url(&self, url: &str) -> SocialResult<bool> {
        let Some(redirect) = self.resolver().resolve(url)? else {
            log::debug!("ignoring unrecognized redirect");
            return Ok(false);
        };

        if let Some(code) = redirect.exchange_code().map(str::to_owned) {
            let credentials = self.credentials.require(redirect.provider)?;
            let request = ExchangeRequest::new(
                redirect.provider,
                code,
                credentials,
                self.options.redirect_uri.clone(),
            )?;
            self.spawn_exchange(request)?;
        } else {
            log::debug!("completing {} redirect without exchange", redirect.provider);
            self.notifier
                .notify(redirect.provider, CompletionOutcome::Success(redirect.parameters));
        }
        Ok(true)
    }

    /// Runs a code exchange directly, bypassing the notifier.
    pub async fn exchange(&self, request: &ExchangeRequest) -> SocialResult<ParameterMap> {
        self.exchange_client.exchange(request).await
    }

    fn spawn_exchange(&self, request: ExchangeRequest) -> SocialResult<()> {
        let client = self.exchange_client.clone();
        let notifier = self.notifier.clone();
        let spawned = spawn_detached(async move {
            let outcome = match client.exchange(&request).await {
                Ok(parameters) => CompletionOutcome::Success(parameters),
                Err(err) => {
                    log::warn!("{} code exchange failed: {err}", request.provider);
                    CompletionOutcome::Failure(err)
                }
            };
            notifier.notify(request.provider, outcome);
        });
        if spawned {
            Ok(())
        } else {
            Err(SocialError::Internal(
                "no async runtime available for code exchange".into(),
            ))
        }
    }

    fn resolver(&self) -> RedirectResolver<'_> {
        RedirectResolver::new(&self.credentials, &self.options)
    }

    fn request_builder(&self) -> AuthorizationRequestBuilder<'_> {
        AuthorizationRequestBuilder::new(&self.credentials, &self.options)
    }
}

pub struct SocialNetworkBuilder {
    options: SocialOptions,
    sources: Vec<(Provider, Arc<dyn CredentialSource>)>,
    transport: Option<Arc<dyn FormTransport>>,
    observer: Option<CompletionCallback>,
}

impl SocialNetworkBuilder {
    fn new() -> Self {
        Self {
            options: SocialOptions::default(),
            sources: Vec::new(),
            transport: None,
            observer: None,
        }
    }

    /// Starts from a complete options document, including any credentials it lists.
    pub fn with_options(mut self, options: SocialOptions) -> Self {
        self.options = options;
        self
    }

    /// Registers a credential source, taking precedence over `options.credentials`.
    pub fn with_credential_source(
        mut self,
        provider: Provider,
        source: Arc<dyn CredentialSource>,
    ) -> Self {
        self.sources.push((provider, source));
        self
    }

    pub fn with_credentials(self, provider: Provider, credentials: Credentials) -> Self {
        self.with_credential_source(provider, Arc::new(credentials))
    }

    pub fn with_transport(mut self, transport: Arc<dyn FormTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.options.redirect_uri = redirect_uri.into();
        self
    }

    pub fn with_token_endpoint(mut self, provider: Provider, endpoint: impl Into<String>) -> Self {
        self.options.token_endpoints.insert(provider, endpoint.into());
        self
    }

    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&CompletionEvent) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn build(self) -> SocialResult<SocialNetwork> {
        let mut credentials = CredentialRegistry::new();
        for (provider, configured) in &self.options.credentials {
            credentials.insert(*provider, Arc::new(configured.clone()));
        }
        for (provider, source) in self.sources {
            credentials.insert(provider, source);
        }

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestFormTransport::default()));
        let exchange_client = CodeExchangeClient::new(transport, &self.options);

        let notifier = CompletionNotifier::new()?;
        if let Some(observer) = self.observer {
            notifier.register(move |event: &CompletionEvent| observer(event));
        }

        Ok(SocialNetwork {
            credentials,
            options: self.options,
            exchange_client,
            notifier,
        })
    }
}
