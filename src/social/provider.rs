use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::SocialError;
use super::profile::ProviderProfile;
use super::ParameterMap;

/// Identity providers understood by the redirect dispatcher.
///
/// The lowercase tag returned by [`Provider::tag`] is the wire identifier carried
/// inside the JSON `state` parameter of web redirects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Facebook,
    Google,
    Odnoklassniki,
    Vkontakte,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::Facebook,
        Provider::Google,
        Provider::Odnoklassniki,
        Provider::Vkontakte,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Provider::Facebook => "facebook",
            Provider::Google => "google",
            Provider::Odnoklassniki => "odnoklassniki",
            Provider::Vkontakte => "vkontakte",
        }
    }

    /// Looks up a provider by its wire tag. Matching is exact.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|provider| provider.tag() == tag)
    }

    /// Returns the static endpoint and redirect-shape table for this provider.
    pub fn profile(&self) -> &'static ProviderProfile {
        ProviderProfile::for_provider(*self)
    }

    /// Whether an official application can authorize and redirect back natively.
    pub fn supports_native_app(&self) -> bool {
        self.profile().native.is_some()
    }

    /// Extracts the token a backend would verify from completed parameters.
    ///
    /// Google hands out an OpenID `id_token` alongside the access token and the
    /// former is preferred.
    pub fn access_token<'a>(&self, parameters: &'a ParameterMap) -> Option<&'a str> {
        let token = match self {
            Provider::Google => parameters
                .get("id_token")
                .or_else(|| parameters.get("access_token")),
            _ => parameters.get("access_token"),
        };
        token.map(String::as_str)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Provider {
    type Err = SocialError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Provider::from_tag(value).ok_or_else(|| SocialError::UnknownProvider {
            tag: value.to_string(),
        })
    }
}
