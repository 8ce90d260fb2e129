//! Conversion identifiers and the `/convert` response body.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of a client-supplied conversion id.
pub const MAX_CONVERSION_ID_LEN: usize = 64;

/// Scope token tying progress events to one conversion.
///
/// Clients pick the id before uploading, pass it as the `conversionId` form
/// field, and listen with `?conversion=<id>` to receive only that
/// conversion's progress.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "String", into = "String")]
pub struct ConversionId(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionIdError {
    #[error("conversion id is empty")]
    Empty,

    #[error("conversion id exceeds {MAX_CONVERSION_ID_LEN} characters")]
    TooLong,

    #[error("conversion id may only contain ASCII letters, digits, '-' and '_'")]
    InvalidCharacter,
}

impl ConversionId {
    /// Validate and wrap a client-supplied id.
    pub fn parse(s: impl Into<String>) -> Result<Self, ConversionIdError> {
        let s = s.into();
        if s.is_empty() {
            return Err(ConversionIdError::Empty);
        }
        if s.len() > MAX_CONVERSION_ID_LEN {
            return Err(ConversionIdError::TooLong);
        }
        if !s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(ConversionIdError::InvalidCharacter);
        }
        Ok(Self(s))
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConversionId {
    type Err = ConversionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ConversionId {
    type Error = ConversionIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<ConversionId> for String {
    fn from(id: ConversionId) -> Self {
        id.0
    }
}

/// Successful `/convert` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConvertResponse {
    pub success: bool,
    /// Public URL path of the generated GIF
    #[serde(rename = "gifUrl")]
    pub gif_url: String,
    /// Echo of the scope the client supplied, if any
    #[serde(
        rename = "conversionId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub conversion_id: Option<ConversionId>,
}

impl ConvertResponse {
    pub fn new(gif_url: impl Into<String>, conversion_id: Option<ConversionId>) -> Self {
        Self {
            success: true,
            gif_url: gif_url.into(),
            conversion_id,
        }
    }
}
