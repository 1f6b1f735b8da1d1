use std::collections::BTreeMap;

use serde::Deserialize;

use super::credentials::Credentials;
use super::error::{SocialError, SocialResult};
use super::provider::Provider;

/// Public landing page the web flow redirects to; it forwards the browser to
/// `socialnetwork://.../simplified` with the original query string.
pub const DEFAULT_REDIRECT_URI: &str = "https://iwheelbuy.github.io/SocialNetwork/simplified.html";
pub const DEFAULT_SENTINEL_SCHEME: &str = "socialnetwork";
pub const DEFAULT_SENTINEL_SEGMENT: &str = "simplified";

/// Static configuration of a [`crate::social::SocialNetwork`] dispatcher.
///
/// Every field has a default, so a JSON document only needs to list what it
/// overrides:
///
/// ```
/// use socialnetwork::social::{Provider, SocialOptions};
///
/// let options = SocialOptions::from_json_str(
///     r#"{ "credentials": { "vkontakte": { "client_id": "5551" } } }"#,
/// )
/// .unwrap();
/// assert!(options.credentials.contains_key(&Provider::Vkontakte));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SocialOptions {
    /// `redirect_uri` sent to every web authorization and token endpoint.
    pub redirect_uri: String,
    /// Scheme of the URL the landing page forwards web redirects to.
    pub sentinel_scheme: String,
    /// Path segment that marks a forwarded web redirect.
    pub sentinel_segment: String,
    /// Replacement token endpoints, keyed by provider.
    pub token_endpoints: BTreeMap<Provider, String>,
    pub credentials: BTreeMap<Provider, Credentials>,
}

impl Default for SocialOptions {
    fn default() -> Self {
        Self {
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            sentinel_scheme: DEFAULT_SENTINEL_SCHEME.to_string(),
            sentinel_segment: DEFAULT_SENTINEL_SEGMENT.to_string(),
            token_endpoints: BTreeMap::new(),
            credentials: BTreeMap::new(),
        }
    }
}

impl SocialOptions {
    pub fn from_json_str(data: &str) -> SocialResult<Self> {
        serde_json::from_str(data)
            .map_err(|err| SocialError::Internal(format!("invalid options document: {err}")))
    }

    /// Token endpoint for `provider`, honoring overrides.
    pub fn token_endpoint(&self, provider: Provider) -> &str {
        self.token_endpoints
            .get(&provider)
            .map(String::as_str)
            .unwrap_or(provider.profile().token_endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_public_landing_page() {
        let options = SocialOptions::default();
        assert_eq!(options.redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(options.sentinel_scheme, "socialnetwork");
        assert_eq!(options.sentinel_segment, "simplified");
        assert_eq!(
            options.token_endpoint(Provider::Odnoklassniki),
            "https://api.ok.ru/oauth/token.do"
        );
    }

    #[test]
    fn json_overrides_merge_with_defaults() {
        let options = SocialOptions::from_json_str(
            r#"{
                "token_endpoints": { "google": "http://127.0.0.1:9000/token" },
                "credentials": {
                    "google": { "client_id": "abc", "client_secret": "shh" }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(options.redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(
            options.token_endpoint(Provider::Google),
            "http://127.0.0.1:9000/token"
        );
        let google = &options.credentials[&Provider::Google];
        assert_eq!(google.client_secret.as_deref(), Some("shh"));
    }

    #[test]
    fn unknown_provider_key_is_rejected() {
        let result = SocialOptions::from_json_str(r#"{ "credentials": { "myspace": { "client_id": "1" } } }"#);
        assert!(matches!(result, Err(SocialError::Internal(_))));
    }
}
