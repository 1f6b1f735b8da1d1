//! Redirect classification, normalization and code exchange for the four
//! supported social providers.
//!
//! A host application builds one [`SocialNetwork`], sends users to
//! [`SocialNetwork::oauth_url`] or [`SocialNetwork::app_url`], and forwards
//! every inbound deep link to [`SocialNetwork::handle_url`]. Each redirect that
//! belongs to a provider produces exactly one [`CompletionEvent`].

mod api;
mod authorize;
mod credentials;
mod error;
mod exchange;
mod notifier;
mod options;
mod profile;
mod provider;
mod redirect;

use std::collections::HashMap;

/// Flat parameter name to value mapping shared by redirects and token replies.
pub type ParameterMap = HashMap<String, String>;

#[doc(inline)]
pub use api::{SocialNetwork, SocialNetworkBuilder};

#[doc(inline)]
pub use authorize::AuthorizationRequestBuilder;

#[doc(inline)]
pub use credentials::{CredentialRegistry, CredentialSource, Credentials};

#[doc(inline)]
pub use error::{SocialError, SocialResult};

#[doc(inline)]
pub use exchange::{
    flatten_token_response, CodeExchangeClient, ExchangeRequest, FormTransport,
    ReqwestFormTransport,
};

#[doc(inline)]
pub use notifier::{
    CompletionCallback, CompletionEvent, CompletionNotifier, CompletionOutcome,
    DELIVERY_THREAD_NAME,
};

#[doc(inline)]
pub use options::{
    SocialOptions, DEFAULT_REDIRECT_URI, DEFAULT_SENTINEL_SCHEME, DEFAULT_SENTINEL_SEGMENT,
};

#[doc(inline)]
pub use profile::{AppRedirect, NativeProfile, ProviderProfile};

#[doc(inline)]
pub use provider::Provider;

#[doc(inline)]
pub use redirect::{NormalizedRedirect, RedirectClass, RedirectResolver, StatePayload};
