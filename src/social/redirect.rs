use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;

use super::credentials::CredentialRegistry;
use super::error::{SocialError, SocialResult};
use super::options::SocialOptions;
use super::provider::Provider;
use super::ParameterMap;

/// Outcome of looking at an inbound URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectClass {
    /// The official app of `Provider` returned to its `<prefix><client id>` scheme.
    NativeRedirect(Provider),
    /// The public landing page forwarded a browser redirect; the provider is in `state`.
    WebRedirect,
    /// Not ours; the host should let something else handle it.
    Unrecognized,
}

/// Provider identity threaded through the `state` parameter of web redirects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatePayload {
    pub provider: String,
}

impl StatePayload {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider: provider.tag().to_string(),
        }
    }

    pub fn encode(&self) -> SocialResult<String> {
        serde_json::to_string(self).map_err(|err| SocialError::Internal(err.to_string()))
    }

    /// Decodes a raw `state` value into the provider it names.
    ///
    /// The value must be a JSON object whose entries are all strings.
    pub fn decode(raw: &str) -> SocialResult<Provider> {
        let mut entries: HashMap<String, String> =
            serde_json::from_str(raw).map_err(|err| SocialError::InvalidState {
                message: err.to_string(),
            })?;
        let tag = entries
            .remove("provider")
            .ok_or_else(|| SocialError::InvalidState {
                message: "missing field `provider`".into(),
            })?;
        Provider::from_tag(&tag).ok_or(SocialError::UnknownProvider { tag })
    }
}

/// A classified redirect flattened into its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRedirect {
    pub provider: Provider,
    pub class: RedirectClass,
    pub parameters: ParameterMap,
}

impl NormalizedRedirect {
    /// Authorization code that still has to be exchanged for a token.
    ///
    /// Native apps only speak the implicit grant, so a `code` on a native
    /// redirect is passed through untouched.
    pub fn exchange_code(&self) -> Option<&str> {
        match self.class {
            RedirectClass::WebRedirect => self.parameters.get("code").map(String::as_str),
            _ => None,
        }
    }
}

/// Classifies and normalizes inbound redirect URLs.
#[derive(Debug, Clone, Copy)]
pub struct RedirectResolver<'a> {
    credentials: &'a CredentialRegistry,
    options: &'a SocialOptions,
}

impl<'a> RedirectResolver<'a> {
    pub fn new(credentials: &'a CredentialRegistry, options: &'a SocialOptions) -> Self {
        Self {
            credentials,
            options,
        }
    }

    /// Classifies `url`. Native schemes are checked before the web sentinel.
    pub fn classify(&self, url: &str) -> RedirectClass {
        let Some(scheme) = raw_scheme(url) else {
            return RedirectClass::Unrecognized;
        };

        for provider in Provider::ALL {
            let Some(native) = provider.profile().native else {
                continue;
            };
            let Some(credentials) = self.credentials.get(provider) else {
                continue;
            };
            if native.scheme(&credentials.client_id) == scheme {
                return RedirectClass::NativeRedirect(provider);
            }
        }

        if !scheme.eq_ignore_ascii_case(&self.options.sentinel_scheme) {
            return RedirectClass::Unrecognized;
        }
        let Ok(parsed) = Url::parse(url) else {
            return RedirectClass::Unrecognized;
        };
        let has_sentinel = parsed
            .path_segments()
            .map(|mut segments| {
                segments.any(|segment| segment.eq_ignore_ascii_case(&self.options.sentinel_segment))
            })
            .unwrap_or(false);
        if has_sentinel {
            RedirectClass::WebRedirect
        } else {
            RedirectClass::Unrecognized
        }
    }

    /// Converts a classified URL into its provider and parameters.
    ///
    /// Returns `Ok(None)` for [`RedirectClass::Unrecognized`].
    pub fn normalize(&self, url: &str, class: RedirectClass) -> SocialResult<Option<NormalizedRedirect>> {
        match class {
            RedirectClass::NativeRedirect(provider) => {
                let parameters = normalize_native(url, provider);
                Ok(Some(NormalizedRedirect {
                    provider,
                    class,
                    parameters,
                }))
            }
            RedirectClass::WebRedirect => {
                let (provider, parameters) = normalize_web(url)?;
                Ok(Some(NormalizedRedirect {
                    provider,
                    class,
                    parameters,
                }))
            }
            RedirectClass::Unrecognized => Ok(None),
        }
    }

    pub fn resolve(&self, url: &str) -> SocialResult<Option<NormalizedRedirect>> {
        self.normalize(url, self.classify(url))
    }
}

/// Scheme exactly as written, without the lowercasing a URL parser applies.
fn raw_scheme(url: &str) -> Option<&str> {
    let (scheme, _) = url.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some(scheme)
    } else {
        None
    }
}

fn normalize_native(url: &str, provider: Provider) -> ParameterMap {
    let (Some(native), Some(scheme)) = (provider.profile().native, raw_scheme(url)) else {
        return ParameterMap::new();
    };
    let rewritten = url.replacen(
        &native.payload_prefix(scheme),
        &format!("{scheme}://authorize?"),
        1,
    );
    match Url::parse(&rewritten) {
        Ok(parsed) => {
            let mut parameters = query_parameters(&parsed);
            parameters.remove("state");
            parameters
        }
        Err(err) => {
            log::debug!("discarding unparsable {provider} native redirect: {err}");
            ParameterMap::new()
        }
    }
}

fn normalize_web(url: &str) -> SocialResult<(Provider, ParameterMap)> {
    let parsed = Url::parse(url)?;
    let mut parameters = query_parameters(&parsed);
    let state = parameters.remove("state").ok_or(SocialError::MissingState)?;
    let provider = StatePayload::decode(&state)?;
    Ok((provider, parameters))
}

/// Percent-decodes the query. `+` is kept literally.
fn query_parameters(url: &Url) -> ParameterMap {
    let Some(query) = url.query() else {
        return ParameterMap::new();
    };
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}
