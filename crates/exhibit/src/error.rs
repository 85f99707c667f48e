use foundation::LandmarkId;
use scene::RegistryError;
use serde::{Deserialize, Serialize};

use crate::{InteractionMode, Request};

#[derive(Debug, Clone, PartialEq)]
pub enum ExhibitError {
    /// The host map engine has no usable camera or viewport. Fatal.
    EngineUnavailable(String),
    /// The request is not allowed in the current mode.
    InvalidTransition {
        from: InteractionMode,
        request: Request,
    },
    UnknownLandmark(LandmarkId),
    /// The original landmark can't be moved or removed.
    SentinelImmutable,
    Config(String),
}

impl std::fmt::Display for ExhibitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExhibitError::EngineUnavailable(msg) => write!(f, "map engine unavailable: {msg}"),
            ExhibitError::InvalidTransition { from, request } => {
                write!(f, "cannot {request} while {from}")
            }
            ExhibitError::UnknownLandmark(id) => write!(f, "no landmark {id}"),
            ExhibitError::SentinelImmutable => write!(f, "the original landmark cannot be changed"),
            ExhibitError::Config(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ExhibitError {}

impl From<RegistryError> for ExhibitError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Unknown(id) => ExhibitError::UnknownLandmark(id),
            RegistryError::Sentinel => ExhibitError::SentinelImmutable,
        }
    }
}

impl From<valuation::DataError> for ExhibitError {
    fn from(err: valuation::DataError) -> Self {
        ExhibitError::Config(err.to_string())
    }
}

/// Why a postcard could not be produced. Shown to the user, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PostcardFailure {
    /// No image generation upstream is configured.
    NotConfigured,
    Timeout,
    Upstream(String),
    /// Superseded by a newer postcard or dismissed.
    Cancelled,
}

impl std::fmt::Display for PostcardFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostcardFailure::NotConfigured => write!(f, "postcards are not configured"),
            PostcardFailure::Timeout => write!(f, "postcard generation timed out"),
            PostcardFailure::Upstream(msg) => write!(f, "postcard generation failed: {msg}"),
            PostcardFailure::Cancelled => write!(f, "postcard cancelled"),
        }
    }
}

impl std::error::Error for PostcardFailure {}
