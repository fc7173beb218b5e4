use std::fmt::{Debug, Display};
use std::io::Error as IoError;

use awc::error::{JsonPayloadError, PayloadError, SendRequestError};
use derivative::Derivative;
use serde::{Serialize, Serializer};
use serde_json::Error as JsonError;

use crate::typedid::TypedIdParseError;

#[derive(Debug, Serialize, Derivative)]
#[derivative(PartialEq, Eq)]
#[serde(untagged)]
pub enum Error {
    // local, no request was issued
    MissingCampaignId,
    InvalidIdentifier {
        kind: &'static str,
        #[derivative(PartialEq = "ignore")]
        #[serde(serialize_with = "display")]
        reason: TypedIdParseError,
    },
    MissingField {
        field: &'static str,
    },
    InvalidPage {
        page: u32,
    },
    InvalidPageSize {
        limit: u32,
    },
    InvalidConfig {
        key: &'static str,
        value: String,
    },

    // workflow
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },
    ActionPending {
        action: &'static str,
    },

    // backend
    BackendRejected {
        status: u16,
        message: String,
    },
    #[serde(serialize_with = "display")]
    FailedRequest(#[derivative(PartialEq = "ignore")] SendRequestError),
    #[serde(serialize_with = "display")]
    InvalidResponseBody(#[derivative(PartialEq = "ignore")] JsonPayloadError),
    #[serde(serialize_with = "display")]
    FailedToReadPayload(#[derivative(PartialEq = "ignore")] PayloadError),

    // local i/o
    #[serde(serialize_with = "display")]
    FailedToSerialize(#[derivative(PartialEq = "ignore")] JsonError),
    #[serde(serialize_with = "display")]
    IoError(#[derivative(PartialEq = "ignore")] IoError),
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::MissingCampaignId => "E4001000",
            Error::InvalidIdentifier { .. } => "E4001001",
            Error::MissingField { .. } => "E4001002",
            Error::InvalidPage { .. } => "E4001003",
            Error::InvalidPageSize { .. } => "E4001004",
            Error::InvalidConfig { .. } => "E4001005",
            Error::InvalidTransition { .. } => "E4091000",
            Error::ActionPending { .. } => "E4091001",
            Error::BackendRejected { .. } => "E5021000",
            Error::InvalidResponseBody(_) => "E5021001",
            Error::FailedToReadPayload(_) => "E5021002",
            Error::FailedRequest(_) => "E5031000",
            Error::FailedToSerialize(_) => "E5001000",
            Error::IoError(_) => "E5001001",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Error::MissingCampaignId => "No campaign was selected",
            Error::InvalidIdentifier { .. } => "The given identifier is not valid",
            Error::MissingField { .. } => "A required field is empty",
            Error::InvalidPage { .. } => "The requested page does not exist",
            Error::InvalidPageSize { .. } => "The requested page size is not supported",
            Error::InvalidConfig { .. } => "A configuration value could not be parsed",
            Error::InvalidTransition { .. } => "The action is not available right now",
            Error::ActionPending { .. } => "The action is already in progress",
            Error::BackendRejected { .. } => "The server rejected the request",
            Error::InvalidResponseBody(_) => "The server response could not be parsed",
            Error::FailedToReadPayload(_) => "The server response could not be read",
            Error::FailedRequest(_) => "The server could not be reached",
            Error::FailedToSerialize(_) => "An error occurred when serializing local state",
            Error::IoError(_) => "An error occurred during an I/O operation",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Error::BackendRejected { message, .. } if !message.is_empty() => message.clone(),
            Error::MissingField { field } => format!("{}: {}", self.error_message(), field),
            _ => self.error_message().to_string(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::MissingCampaignId | Error::InvalidIdentifier { .. }
        )
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl From<SendRequestError> for Error {
    fn from(error: SendRequestError) -> Error {
        Error::FailedRequest(error)
    }
}

impl From<JsonPayloadError> for Error {
    fn from(error: JsonPayloadError) -> Error {
        Error::InvalidResponseBody(error)
    }
}

impl From<PayloadError> for Error {
    fn from(error: PayloadError) -> Error {
        Error::FailedToReadPayload(error)
    }
}

impl From<JsonError> for Error {
    fn from(error: JsonError) -> Error {
        Error::FailedToSerialize(error)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FailedRequest(err) => Some(err),
            Error::InvalidResponseBody(err) => Some(err),
            Error::FailedToReadPayload(err) => Some(err),
            Error::FailedToSerialize(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

fn display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}
