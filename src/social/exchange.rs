use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use url::form_urlencoded::Serializer;

use super::credentials::Credentials;
use super::error::{SocialError, SocialResult};
use super::options::SocialOptions;
use super::provider::Provider;
use super::ParameterMap;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// One authorization code waiting to be traded for tokens.
///
/// Built from a credential snapshot taken when the redirect arrived; the
/// secret is required up front because the code grant is only requested when
/// one is configured.
#[derive(Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    pub provider: Provider,
    pub code: String,
    pub client_id: String,
    client_secret: String,
    pub redirect_uri: String,
}

impl ExchangeRequest {
    pub fn new(
        provider: Provider,
        code: impl Into<String>,
        credentials: Credentials,
        redirect_uri: impl Into<String>,
    ) -> SocialResult<Self> {
        let client_secret = credentials
            .client_secret
            .ok_or(SocialError::MissingClientSecret { provider })?;
        Ok(Self {
            provider,
            code: code.into(),
            client_id: credentials.client_id,
            client_secret,
            redirect_uri: redirect_uri.into(),
        })
    }

    /// Form body for the provider's token endpoint.
    pub fn form_body(&self) -> String {
        let profile = self.provider.profile();
        let mut serializer = Serializer::new(String::new());
        serializer.append_pair("code", &self.code);
        serializer.append_pair("client_id", &profile.wire_client_id(&self.client_id));
        serializer.append_pair("client_secret", &self.client_secret);
        serializer.append_pair("redirect_uri", &self.redirect_uri);
        if let Some(grant_type) = profile.grant_type {
            serializer.append_pair("grant_type", grant_type);
        }
        serializer.finish()
    }
}

impl std::fmt::Debug for ExchangeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeRequest")
            .field("provider", &self.provider)
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .finish_non_exhaustive()
    }
}

/// Sends a form-encoded POST and returns the raw response body.
///
/// Implementations return the body for every HTTP status; only failing to
/// reach the endpoint or to read the body is an error.
#[async_trait]
pub trait FormTransport: Send + Sync {
    async fn send_form_post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: String,
    ) -> SocialResult<Bytes>;
}

/// [`FormTransport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestFormTransport {
    client: reqwest::Client,
}

impl ReqwestFormTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FormTransport for ReqwestFormTransport {
    async fn send_form_post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: String,
    ) -> SocialResult<Bytes> {
        let mut request = self.client.post(url).body(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request
            .send()
            .await
            .map_err(|err| SocialError::ExchangeTransport {
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            log::debug!("token endpoint {url} answered with HTTP {status}");
        }

        response
            .bytes()
            .await
            .map_err(|err| SocialError::ExchangeTransport {
                message: format!("failed to read response body: {err}"),
            })
    }
}

/// Trades authorization codes for tokens at each provider's token endpoint.
#[derive(Clone)]
pub struct CodeExchangeClient {
    transport: Arc<dyn FormTransport>,
    token_endpoints: BTreeMap<Provider, String>,
}

impl CodeExchangeClient {
    pub fn new(transport: Arc<dyn FormTransport>, options: &SocialOptions) -> Self {
        let token_endpoints = Provider::ALL
            .into_iter()
            .map(|provider| (provider, options.token_endpoint(provider).to_string()))
            .collect();
        Self {
            transport,
            token_endpoints,
        }
    }

    pub fn token_endpoint(&self, provider: Provider) -> &str {
        self.token_endpoints
            .get(&provider)
            .map(String::as_str)
            .unwrap_or(provider.profile().token_endpoint)
    }

    /// Performs the exchange and flattens the JSON reply into parameters.
    pub async fn exchange(&self, request: &ExchangeRequest) -> SocialResult<ParameterMap> {
        let endpoint = self.token_endpoint(request.provider);
        log::debug!("exchanging {} authorization code at {endpoint}", request.provider);

        let body = self
            .transport
            .send_form_post(
                endpoint,
                &[("Content-Type", FORM_CONTENT_TYPE)],
                request.form_body(),
            )
            .await?;
        flatten_token_response(&body)
    }
}

impl std::fmt::Debug for CodeExchangeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeExchangeClient")
            .field("token_endpoints", &self.token_endpoints)
            .finish_non_exhaustive()
    }
}

/// Flattens a token endpoint JSON object into string parameters.
///
/// Non-string values keep their JSON text, so `3600` becomes `"3600"`.
pub fn flatten_token_response(body: &[u8]) -> SocialResult<ParameterMap> {
    let value: Value =
        serde_json::from_slice(body).map_err(|err| SocialError::InvalidExchangeResponse {
            message: err.to_string(),
        })?;

    match value {
        Value::Object(entries) => Ok(entries
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(text) => (key, text),
                other => (key, other.to_string()),
            })
            .collect()),
        other => Err(SocialError::InvalidExchangeResponse {
            message: format!("expected a JSON object, got {other}"),
        }),
    }
}
