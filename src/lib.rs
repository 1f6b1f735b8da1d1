//! OAuth2 redirect handling for Facebook, Google, Odnoklassniki and Vkontakte.
//!
//! Each provider returns from authorization differently: official apps call
//! back through a `<prefix><client id>://authorize` scheme with the payload in
//! a fragment, while browser flows land on a public page that forwards to
//! `socialnetwork://.../simplified` with the provider named in a JSON `state`.
//! [`social::SocialNetwork`] recognizes all of these shapes, exchanges
//! authorization codes when a client secret is configured, and reports a
//! single [`social::CompletionEvent`] per redirect.
//!
//! ```no_run
//! use socialnetwork::social::{Credentials, Provider, SocialNetwork};
//!
//! let network = SocialNetwork::builder()
//!     .with_credentials(Provider::Vkontakte, Credentials::new("5551"))
//!     .with_observer(|event| println!("{}: {:?}", event.provider, event.outcome))
//!     .build()?;
//!
//! let url = network.oauth_url(Provider::Vkontakte)?;
//! println!("open {url}");
//!
//! // Later, from the host's deep-link handler:
//! network.handle_url("vk5551://authorize?#access_token=abc")?;
//! # Ok::<(), socialnetwork::social::SocialError>(())
//! ```

pub mod platform;
pub mod social;

#[cfg(test)]
pub mod test_support;
