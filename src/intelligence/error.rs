//! Errors surfaced by the intelligence components.

use thiserror::Error;

use crate::llm::LlmError;
use crate::spotify::CatalogError;

/// Failure of a music operation.
///
/// Every variant renders to the text shown to the caller; see
/// [`crate::render::failure`].
#[derive(Debug, Error)]
pub enum MusicError {
    #[error("{}", authentication_message(.authorize_url))]
    AuthenticationRequired { authorize_url: Option<String> },

    #[error("{0}")]
    NotFound(String),

    #[error("No active device found. Please open Spotify on a device first.")]
    NoActiveEndpoint,

    #[error("{0}")]
    ExternalService(String),

    #[error("{0}")]
    ConfigurationMissing(String),

    #[error("Malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    #[error("{0}")]
    InvalidArgument(String),
}

fn authentication_message(authorize_url: &Option<String>) -> String {
    match authorize_url {
        Some(url) => format!(
            "Spotify authentication required. Open {} in a browser to authorize this application.",
            url
        ),
        None => "Spotify authentication required. The access token is missing or expired."
            .to_string(),
    }
}

impl MusicError {
    /// Whether the message stands on its own, without an operation prefix.
    pub fn is_self_describing(&self) -> bool {
        !matches!(
            self,
            MusicError::ExternalService(_) | MusicError::MalformedUpstreamResponse(_)
        )
    }
}

impl From<CatalogError> for MusicError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::AuthenticationRequired { authorize_url } => {
                MusicError::AuthenticationRequired { authorize_url }
            }
            CatalogError::NotFound(message) => {
                MusicError::NotFound(format!("Not found: {}", message))
            }
            CatalogError::NoActiveDevice => MusicError::NoActiveEndpoint,
            CatalogError::InvalidResponse(message) => {
                MusicError::MalformedUpstreamResponse(message)
            }
            other => MusicError::ExternalService(other.to_string()),
        }
    }
}

impl From<LlmError> for MusicError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::InvalidResponse(message) => MusicError::MalformedUpstreamResponse(message),
            other => MusicError::ExternalService(other.to_string()),
        }
    }
}
