use std::collections::HashMap;

use crate::common::cookie::CookieMap;
use crate::common::header::{CONTENT_TYPE, HeaderMap, HeaderMapOps};
use crate::common::method::Method;
use crate::common::version::Version;

/// An HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// The method.
    pub method: Method,
    /// The path. Query strings are not supported.
    pub path: String,
    /// The version from the request line.
    pub version: Version,
    /// The headers.
    pub headers: HeaderMap,
    /// Cookies from the `Cookie` header.
    pub cookies: CookieMap,
    /// The body.
    pub body: Body,
    /// Uploaded files by form field name. Only populated for `multipart/form-data` requests.
    pub files: HashMap<String, FilePart>,
}

impl Request {
    /// Gets the content type of the request, if it has one.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.find_header(CONTENT_TYPE).map(String::as_str)
    }
}

/// The body of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// No body was sent.
    Absent,
    /// Text that no body parser has interpreted.
    Raw(String),
    /// A parsed JSON document.
    Structured(serde_json::Value),
    /// Flat form fields, from a url-encoded body or the text fields of a multipart body.
    FormFields(HashMap<String, String>),
}

impl Body {
    /// Gets the body text if no parser has interpreted it.
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Body::Raw(text) => Some(text),
            _ => None
        }
    }
}

/// A file uploaded in one part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// The file name the client declared.
    pub filename: String,
    /// The file contents.
    pub body: Vec<u8>,
    /// The declared MIME type of the part, if any.
    pub content_type: Option<String>,
}
