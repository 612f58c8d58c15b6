use serde::Serialize;
use thiserror::Error;

/// Failure raised by a store operation or by the RPC dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    /// Missing or empty required field, or a value that does not parse.
    #[error("{0}")]
    Validation(String),
    /// The named record does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The op name is not one the dispatcher knows.
    #[error("Unknown op")]
    UnknownOperation(String),
}

impl ConsoleError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn classification(&self) -> Classification {
        match self {
            Self::Validation(_) | Self::UnknownOperation(_) => Classification::BadRequest,
            Self::NotFound(_) => Classification::NotFound,
        }
    }
}

/// How a rejected RPC is reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    BadRequest,
    NotFound,
}

impl Classification {
    /// HTTP status code the transport answers with.
    pub fn status_code(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
        }
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_op_message() {
        let err = ConsoleError::UnknownOperation("bogus.op".to_string());
        assert_eq!(err.to_string(), "Unknown op");
        assert_eq!(err.classification(), Classification::BadRequest);
    }

    #[test]
    fn classification_status_codes() {
        assert_eq!(ConsoleError::validation("Missing domain").classification().status_code(), 400);
        assert_eq!(ConsoleError::not_found("Follower not found").classification().status_code(), 404);
    }
}
