//! Errors raised while decoding monitoring API responses

use thiserror::Error;

/// A 200 response whose body does not have the expected shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Body is not valid JSON
    #[error("invalid JSON body: {0}")]
    InvalidJson(String),

    /// Events response has no `data` key, or it is null
    #[error("response has no `data` field")]
    MissingData,

    /// An entity in `data` lacks a required field
    #[error("entity {index} has no `{field}` field")]
    MissingField { index: usize, field: &'static str },

    /// Token response has no `access_token`
    #[error("token response has no `access_token` field")]
    MissingToken,
}
