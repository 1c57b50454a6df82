use std::path::Path;

use serde::Serialize;

use crate::common::cookie::{CookieError, CookieMap, validate_cookie};
use crate::common::header::{CONTENT_TYPE, HeaderMap, HeaderMapOps};
use crate::common::status;
use crate::common::status::Status;
use crate::header_map;
use crate::util::get_content_type;

/// Content type every response starts with.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// An HTTP response.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Response {
    /// The status.
    pub status: Status,
    /// The headers. `Content-Length` and `Set-Cookie` are computed when the response is written.
    pub headers: HeaderMap,
    /// The body. An empty body is written as the status code and reason.
    pub body: Vec<u8>,
    /// Cookies to set on the client.
    pub cookies: CookieMap,
}

impl Response {
    /// Creates an empty response with the given status and the default headers.
    pub fn new(status: Status) -> Response {
        Response {
            status,
            headers: header_map![(CONTENT_TYPE, DEFAULT_CONTENT_TYPE)],
            body: vec![],
            cookies: CookieMap::new(),
        }
    }

    /// Creates a `200 OK` response with the given body and content type.
    pub fn with_content_type(content_type: &str, body: impl Into<Vec<u8>>) -> Response {
        Response {
            body: body.into(),
            ..Response::new(status::OK)
        }.with_header(CONTENT_TYPE, content_type)
    }

    /// Creates a `200 OK` plain text response.
    pub fn text(body: impl Into<String>) -> Response {
        Response::with_content_type(DEFAULT_CONTENT_TYPE, body.into())
    }

    /// Creates a `200 OK` HTML response.
    pub fn html(body: impl Into<String>) -> Response {
        Response::with_content_type("text/html", body.into())
    }

    /// Creates a `200 OK` JSON response by serializing the given value.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Response> {
        Ok(Response::with_content_type("application/json", serde_json::to_vec(value)?))
    }

    /// Creates a `200 OK` response with the contents of the file at the given path.
    /// The content type is guessed from the file extension.
    pub fn file(path: impl AsRef<Path>) -> std::io::Result<Response> {
        let path = path.as_ref();
        let contents = std::fs::read(path)?;
        Ok(Response::with_content_type(get_content_type(&path.to_string_lossy()), contents))
    }

    /// Replaces the status.
    pub fn with_status(mut self, status: Status) -> Response {
        self.status = status;
        self
    }

    /// Sets a header, overriding a default or earlier value.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Response {
        self.headers.set_header(name, value);
        self
    }

    /// Adds a cookie. Names and values that could not be read back unchanged from the encoded header are
    /// rejected: ones containing `;`, `=` or a control character, or with leading or trailing whitespace.
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Result<Response, CookieError> {
        let (name, value) = (name.into(), value.into());
        validate_cookie(&name, &value)?;
        self.cookies.insert(name, value);
        Ok(self)
    }
}

impl From<Status> for Response {
    /// Creates an empty response with the given status.
    fn from(status: Status) -> Self {
        Response::new(status)
    }
}

impl From<String> for Response {
    /// Creates a plain text response with the given string as its body.
    fn from(body: String) -> Self {
        Response::text(body)
    }
}

impl From<&str> for Response {
    /// Creates a plain text response with the given string as its body.
    fn from(body: &str) -> Self {
        Response::text(body)
    }
}
