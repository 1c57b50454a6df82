use thiserror::Error;

use crate::common::status;
use crate::common::status::Status;

/// Error for when an HTTP request can't be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParsingError {
    /// The request line doesn't match `METHOD /path HTTP/1.x`.
    #[error("malformed request line")]
    MalformedRequestLine,
    /// The method token is well formed but not one that can be routed.
    #[error("unsupported method {0:?}")]
    UnsupportedMethod(String),
    /// A line in the header block isn't a `name: value` pair.
    #[error("malformed header line {0:?}")]
    MalformedHeaderLine(String),
    /// A pair in the `Cookie` header has no `=` or no name.
    #[error("malformed cookie pair {0:?}")]
    MalformedCookiePair(String),
    /// The multipart body can't be split into parts.
    #[error("multipart body can't be decoded: {0}")]
    MultipartDecode(&'static str),
    /// The content length header value isn't a number.
    #[error("invalid content length {0:?}")]
    InvalidContentLength(String),
    /// Header block or text body is not valid UTF8.
    #[error("request is not valid UTF-8")]
    InvalidUtf8,
    /// The header block exceeds the maximum size.
    #[error("header block too large")]
    HeadTooLarge,
    /// The body exceeds the maximum size.
    #[error("body too large")]
    BodyTooLarge,
    /// The connection ended before the whole body arrived.
    #[error("connection ended before the body was complete")]
    IncompleteBody,
}

impl ParsingError {
    /// The status of the response sent when a request is rejected with this error.
    pub fn status(&self) -> Status {
        match self {
            ParsingError::UnsupportedMethod(_) => status::METHOD_NOT_ALLOWED,
            ParsingError::HeadTooLarge => status::REQUEST_HEADER_FIELDS_TOO_LARGE,
            ParsingError::BodyTooLarge => status::PAYLOAD_TOO_LARGE,
            _ => status::BAD_REQUEST
        }
    }
}
