//! The error envelope shared by every service and adapter.
//!
//! Status codes and redaction belong to the HTTP layer. An error captures the
//! trace identifier in scope at construction time.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::TraceId;

/// Header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Wire value of the `code` field in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication is missing, or the caller lacks the admin capability.
    Unauthorized,
    /// The requested resource does not exist.
    NotFound,
    /// A concurrent update won the race and retries were exhausted.
    Conflict,
    /// The grant status transition is not in the allowed table.
    InvalidTransition,
    /// A backing service (usually the database) could not be reached.
    ServiceUnavailable,
    /// Anything else; redacted before it reaches a client.
    InternalError,
}

/// Failure returned by every service operation.
///
/// # Examples
/// ```
/// use bloodbank::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("grant missing");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.message(), "grant missing");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Build an error stamped with the current [`TraceId`].
    ///
    /// A blank message becomes `"unspecified error"`.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let raw = message.into();
        Self {
            code,
            message: if raw.trim().is_empty() {
                "unspecified error".to_owned()
            } else {
                raw
            },
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    /// Failure category.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Text shown to the client.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Identifier of the request that raised the error.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Field-level context, e.g. which input failed validation.
    #[must_use]
    pub const fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use bloodbank::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad phone")
    ///     .with_details(json!({ "field": "phone" }));
    /// assert!(err.details().is_some());
    /// ```
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Replace the captured trace identifier.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }
}

/// One shorthand constructor per [`ErrorCode`].
macro_rules! code_constructors {
    ($($name:ident => $code:ident),+ $(,)?) => {
        impl Error {
            $(
                #[doc = concat!("Error with [`ErrorCode::", stringify!($code), "`].")]
                pub fn $name(message: impl Into<String>) -> Self {
                    Self::new(ErrorCode::$code, message)
                }
            )+
        }
    };
}

code_constructors! {
    invalid_request => InvalidRequest,
    unauthorized => Unauthorized,
    not_found => NotFound,
    conflict => Conflict,
    invalid_transition => InvalidTransition,
    service_unavailable => ServiceUnavailable,
    internal => InternalError,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}
