use url::Url;

use super::credentials::CredentialRegistry;
use super::error::{SocialError, SocialResult};
use super::options::SocialOptions;
use super::profile::AppRedirect;
use super::provider::Provider;
use super::redirect::StatePayload;

/// Builds the outbound URLs that start an authorization.
///
/// The grant is chosen per call from the current credentials: a configured
/// client secret asks for `response_type=code`, otherwise the implicit
/// `response_type=token` grant is used.
#[derive(Debug, Clone, Copy)]
pub struct AuthorizationRequestBuilder<'a> {
    credentials: &'a CredentialRegistry,
    options: &'a SocialOptions,
}

impl<'a> AuthorizationRequestBuilder<'a> {
    pub fn new(credentials: &'a CredentialRegistry, options: &'a SocialOptions) -> Self {
        Self {
            credentials,
            options,
        }
    }

    /// Browser authorization URL for the web redirect flow.
    ///
    /// The provider tag travels in the JSON `state` so the forwarded redirect can
    /// be attributed without relying on its scheme.
    pub fn oauth_url(&self, provider: Provider) -> SocialResult<Url> {
        let credentials = self.credentials.require(provider)?;
        let profile = provider.profile();
        let response_type = if credentials.has_secret() {
            "code"
        } else {
            "token"
        };
        let state = StatePayload::new(provider).encode()?;

        let mut url = Url::parse(profile.authorization_endpoint)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("client_id", &profile.wire_client_id(&credentials.client_id));
            pairs.append_pair("redirect_uri", &self.options.redirect_uri);
            pairs.append_pair("state", &state);
            pairs.append_pair("response_type", response_type);
            for (key, value) in profile.authorization_parameters {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Authorization URL handed to the provider's official application.
    ///
    /// The app always uses the implicit grant and returns to the provider's
    /// native scheme instead of a web page, so no `state` is attached.
    pub fn app_url(&self, provider: Provider) -> SocialResult<Url> {
        let native = provider
            .profile()
            .native
            .ok_or(SocialError::NativeAppUnsupported { provider })?;
        let credentials = self.credentials.require(provider)?;

        let mut url = Url::parse(native.app_authorization_endpoint)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("client_id", &credentials.client_id);
            match native.app_redirect {
                AppRedirect::Fixed(target) => {
                    pairs.append_pair("redirect_uri", target);
                }
                AppRedirect::NativeScheme => {
                    let target = format!("{}://authorize", native.scheme(&credentials.client_id));
                    pairs.append_pair("redirect_uri", &target);
                }
                AppRedirect::Implicit => {}
            }
            for (key, value) in native.app_parameters {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social::credentials::Credentials;
    use crate::social::ParameterMap;
    use std::sync::Arc;

    fn registry(secret: Option<&str>) -> CredentialRegistry {
        let mut registry = CredentialRegistry::new();
        for provider in Provider::ALL {
            let mut credentials = Credentials::new("1234");
            if let Some(secret) = secret {
                credentials = credentials.with_client_secret(secret);
            }
            registry.insert(provider, Arc::new(credentials));
        }
        registry
    }

    fn query(url: &Url) -> ParameterMap {
        url.query_pairs().into_owned().collect()
    }

    #[test]
    fn implicit_grant_without_secret() {
        let registry = registry(None);
        let options = SocialOptions::default();
        let builder = AuthorizationRequestBuilder::new(&registry, &options);

        for provider in Provider::ALL {
            let url = builder.oauth_url(provider).unwrap();
            assert_eq!(query(&url)["response_type"], "token", "{provider}");
        }
    }

    #[test]
    fn code_grant_with_secret() {
        let registry = registry(Some("secret"));
        let options = SocialOptions::default();
        let builder = AuthorizationRequestBuilder::new(&registry, &options);

        for provider in Provider::ALL {
            let url = builder.oauth_url(provider).unwrap();
            let parameters = query(&url);
            assert_eq!(parameters["response_type"], "code", "{provider}");
            assert!(!parameters.contains_key("client_secret"));
        }
    }

    #[test]
    fn oauth_url_carries_state_and_provider_parameters() {
        let registry = registry(None);
        let options = SocialOptions::default();
        let builder = AuthorizationRequestBuilder::new(&registry, &options);

        let url = builder.oauth_url(Provider::Odnoklassniki).unwrap();
        assert_eq!(url.host_str(), Some("connect.ok.ru"));
        let parameters = query(&url);
        assert_eq!(parameters["state"], r#"{"provider":"odnoklassniki"}"#);
        assert_eq!(parameters["scope"], "VALUABLE_ACCESS");
        assert_eq!(parameters["layout"], "m");
        assert_eq!(parameters["redirect_uri"], options.redirect_uri);

        let google = query(&builder.oauth_url(Provider::Google).unwrap());
        assert_eq!(google["client_id"], "1234.apps.googleusercontent.com");
        assert_eq!(google["scope"], "email");

        let vk = query(&builder.oauth_url(Provider::Vkontakte).unwrap());
        assert_eq!(vk["v"], "5.73");
        assert_eq!(vk["revoke"], "1");
    }

    #[test]
    fn oauth_url_requires_credentials() {
        let registry = CredentialRegistry::new();
        let options = SocialOptions::default();
        let builder = AuthorizationRequestBuilder::new(&registry, &options);

        assert_eq!(
            builder.oauth_url(Provider::Facebook).unwrap_err(),
            SocialError::MissingCredentials {
                provider: Provider::Facebook
            }
        );
    }

    #[test]
    fn app_urls_target_native_schemes() {
        let registry = registry(Some("ignored"));
        let options = SocialOptions::default();
        let builder = AuthorizationRequestBuilder::new(&registry, &options);

        let facebook = builder.app_url(Provider::Facebook).unwrap();
        assert_eq!(facebook.scheme(), "fbauth");
        let parameters = query(&facebook);
        assert_eq!(parameters["redirect_uri"], "fbconnect://success");
        assert_eq!(parameters["response_type"], "token");
        assert!(!parameters.contains_key("state"));

        let ok = query(&builder.app_url(Provider::Odnoklassniki).unwrap());
        assert_eq!(ok["redirect_uri"], "ok1234://authorize");

        let vk = query(&builder.app_url(Provider::Vkontakte).unwrap());
        assert_eq!(vk["sdk_version"], "1.4.6");
        assert!(!vk.contains_key("redirect_uri"));
    }

    #[test]
    fn google_has_no_app_url() {
        let registry = registry(None);
        let options = SocialOptions::default();
        let builder = AuthorizationRequestBuilder::new(&registry, &options);

        assert_eq!(
            builder.app_url(Provider::Google).unwrap_err(),
            SocialError::NativeAppUnsupported {
                provider: Provider::Google
            }
        );
    }
}
