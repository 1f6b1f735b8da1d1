use super::provider::Provider;

const GOOGLE_CLIENT_ID_SUFFIX: &str = ".apps.googleusercontent.com";
const AUTHORIZATION_CODE_GRANT: &str = "authorization_code";

/// Where a native application sends the user back after authorizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppRedirect {
    /// A provider-owned URL that the official app translates back into our scheme.
    Fixed(&'static str),
    /// Our own `<prefix><client id>://authorize` scheme.
    NativeScheme,
    /// The app derives the callback from the client id on its own.
    Implicit,
}

/// Native application redirect shape of an app-capable provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeProfile {
    /// Prepended to the client id to form the scheme the app redirects to.
    pub scheme_prefix: &'static str,
    /// Separator between `://authorize` and the payload in the returned URL.
    pub payload_marker: &'static str,
    pub app_authorization_endpoint: &'static str,
    pub app_redirect: AppRedirect,
    pub app_parameters: &'static [(&'static str, &'static str)],
    /// Schemes a host may probe to find out whether the official app is installed.
    pub probe_schemes: &'static [&'static str],
}

impl NativeProfile {
    /// Scheme the official app uses to hand control back for `client_id`.
    pub fn scheme(&self, client_id: &str) -> String {
        format!("{}{client_id}", self.scheme_prefix)
    }

    /// Prefix of a native redirect up to and including the payload marker.
    pub fn payload_prefix(&self, scheme: &str) -> String {
        format!("{scheme}://authorize{}", self.payload_marker)
    }
}

/// Everything that differs between providers on the wire.
///
/// One static value exists per [`Provider`]; URL building, redirect parsing and
/// token exchange all read from it instead of branching per provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider: Provider,
    pub authorization_endpoint: &'static str,
    pub authorization_parameters: &'static [(&'static str, &'static str)],
    pub token_endpoint: &'static str,
    pub grant_type: Option<&'static str>,
    pub client_id_suffix: &'static str,
    pub native: Option<NativeProfile>,
}

static FACEBOOK: ProviderProfile = ProviderProfile {
    provider: Provider::Facebook,
    authorization_endpoint: "https://www.facebook.com/v2.12/dialog/oauth",
    authorization_parameters: &[("scope", "public_profile")],
    token_endpoint: "https://graph.facebook.com/v2.12/oauth/access_token",
    grant_type: None,
    client_id_suffix: "",
    native: Some(NativeProfile {
        scheme_prefix: "fb",
        payload_marker: "#",
        app_authorization_endpoint: "fbauth://authorize",
        app_redirect: AppRedirect::Fixed("fbconnect://success"),
        app_parameters: &[
            ("sdk", "ios"),
            ("return_scopes", "true"),
            ("scope", "public_profile"),
            ("display", "touch"),
            ("response_type", "token"),
            ("legacy_override", "v2.6"),
            ("sdk_version", "4.7"),
        ],
        probe_schemes: &["fb://", "fbapi://", "fbauth://", "fbauth2://"],
    }),
};

static GOOGLE: ProviderProfile = ProviderProfile {
    provider: Provider::Google,
    authorization_endpoint: "https://accounts.google.com/o/oauth2/v2/auth",
    authorization_parameters: &[("scope", "email")],
    token_endpoint: "https://www.googleapis.com/oauth2/v4/token",
    grant_type: Some(AUTHORIZATION_CODE_GRANT),
    client_id_suffix: GOOGLE_CLIENT_ID_SUFFIX,
    native: None,
};

static ODNOKLASSNIKI: ProviderProfile = ProviderProfile {
    provider: Provider::Odnoklassniki,
    authorization_endpoint: "https://connect.ok.ru/oauth/authorize",
    authorization_parameters: &[("scope", "VALUABLE_ACCESS"), ("layout", "m")],
    token_endpoint: "https://api.ok.ru/oauth/token.do",
    grant_type: Some(AUTHORIZATION_CODE_GRANT),
    client_id_suffix: "",
    native: Some(NativeProfile {
        scheme_prefix: "ok",
        payload_marker: "#",
        app_authorization_endpoint: "okauth://authorize",
        app_redirect: AppRedirect::NativeScheme,
        app_parameters: &[
            ("response_type", "token"),
            ("scope", "VALUABLE_ACCESS"),
            ("layout", "m"),
        ],
        probe_schemes: &["odnoklassniki://", "okauth://"],
    }),
};

static VKONTAKTE: ProviderProfile = ProviderProfile {
    provider: Provider::Vkontakte,
    authorization_endpoint: "https://oauth.vk.com/authorize",
    authorization_parameters: &[("revoke", "1"), ("v", "5.73")],
    token_endpoint: "https://oauth.vk.com/access_token",
    grant_type: None,
    client_id_suffix: "",
    native: Some(NativeProfile {
        scheme_prefix: "vk",
        payload_marker: "?#",
        app_authorization_endpoint: "vkauthorize://authorize",
        app_redirect: AppRedirect::Implicit,
        app_parameters: &[("revoke", "1"), ("v", "5.73"), ("sdk_version", "1.4.6")],
        probe_schemes: &["vk://", "vk-share://", "vkauthorize://"],
    }),
};

impl ProviderProfile {
    pub fn for_provider(provider: Provider) -> &'static ProviderProfile {
        match provider {
            Provider::Facebook => &FACEBOOK,
            Provider::Google => &GOOGLE,
            Provider::Odnoklassniki => &ODNOKLASSNIKI,
            Provider::Vkontakte => &VKONTAKTE,
        }
    }

    /// Client identifier as the provider expects it on the wire.
    pub fn wire_client_id(&self, client_id: &str) -> String {
        format!("{client_id}{}", self.client_id_suffix)
    }

    /// Schemes to probe for an installed official app; empty for web-only providers.
    pub fn app_probe_schemes(&self) -> &'static [&'static str] {
        self.native
            .as_ref()
            .map(|native| native.probe_schemes)
            .unwrap_or(&[])
    }
}
