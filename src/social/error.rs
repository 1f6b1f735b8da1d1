use std::fmt;

use super::provider::Provider;

pub type SocialResult<T> = Result<T, SocialError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocialError {
    /// A web redirect arrived without a `state` parameter.
    MissingState,
    /// The `state` parameter is not a JSON object carrying a string `provider`.
    InvalidState { message: String },
    /// The decoded `state` names a provider this crate does not know.
    UnknownProvider { tag: String },
    MissingCredentials { provider: Provider },
    MissingClientSecret { provider: Provider },
    NativeAppUnsupported { provider: Provider },
    InvalidUrl { message: String },
    ExchangeTransport { message: String },
    InvalidExchangeResponse { message: String },
    Internal(String),
}

impl SocialError {
    /// Returns `true` for errors caused by a malformed inbound redirect.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SocialError::MissingState
                | SocialError::InvalidState { .. }
                | SocialError::UnknownProvider { .. }
        )
    }

    /// Returns `true` for failures of the token endpoint call.
    pub fn is_exchange_failure(&self) -> bool {
        matches!(
            self,
            SocialError::ExchangeTransport { .. } | SocialError::InvalidExchangeResponse { .. }
        )
    }
}

impl fmt::Display for SocialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocialError::MissingState => write!(f, "Redirect is missing the \"state\" parameter"),
            SocialError::InvalidState { message } => {
                write!(f, "Unable to decode redirect \"state\": {message}")
            }
            SocialError::UnknownProvider { tag } => {
                write!(f, "Redirect \"state\" names unknown provider \"{tag}\"")
            }
            SocialError::MissingCredentials { provider } => {
                write!(f, "No credential source registered for {provider}")
            }
            SocialError::MissingClientSecret { provider } => {
                write!(f, "Code exchange for {provider} requires a client secret")
            }
            SocialError::NativeAppUnsupported { provider } => {
                write!(f, "{provider} does not offer native application authorization")
            }
            SocialError::InvalidUrl { message } => write!(f, "Invalid URL: {message}"),
            SocialError::ExchangeTransport { message } => {
                write!(f, "Failed to reach token endpoint: {message}")
            }
            SocialError::InvalidExchangeResponse { message } => {
                write!(f, "Failed to parse token endpoint response: {message}")
            }
            SocialError::Internal(message) => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for SocialError {}

impl From<url::ParseError> for SocialError {
    fn from(error: url::ParseError) -> Self {
        SocialError::InvalidUrl {
            message: error.to_string(),
        }
    }
}
