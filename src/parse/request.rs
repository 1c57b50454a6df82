use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::common::cookie::{CookieError, CookieMap, parse_cookies};
use crate::common::header::{CONTENT_LENGTH, CONTENT_TYPE, COOKIE, HeaderMap, HeaderMapOps};
use crate::common::method::Method;
use crate::common::request::{Body, Request};
use crate::common::version::Version;
use crate::parse::error::ParsingError;
use crate::parse::multipart;
use crate::parse::multipart::{MULTIPART_FORM_DATA, multipart_boundary};

/// `METHOD /path HTTP/x.y`. Path segments use the unreserved, sub-delim, `:`, `@` and `%` characters,
/// so query strings and fragments don't match.
const REQUEST_LINE_PATTERN: &str = r"^([A-Z]+)[ \t]+((?:/[A-Za-z0-9\-._~%!$&'()*+,;=:@]*)+)[ \t]+(HTTP/[0-9]\.[0-9])$";

/// `name: value`, where the name is an RFC 7230 token.
const HEADER_LINE_PATTERN: &str = r"^([!#$%&'*+\-.^_`|~0-9A-Za-z]+):(.*)$";

fn request_line_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(REQUEST_LINE_PATTERN).expect("request line pattern is valid"))
}

fn header_line_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(HEADER_LINE_PATTERN).expect("header line pattern is valid"))
}

/// The request line and headers of a request, parsed before the body is read.
#[derive(Debug, PartialEq, Eq)]
pub struct RequestHead {
    pub method: Method,
    pub path: String,
    pub version: Version,
    pub headers: HeaderMap,
}

impl RequestHead {
    /// Gets the multipart boundary declared by the content type, if the body is `multipart/form-data`.
    pub fn multipart_boundary(&self) -> Option<String> {
        self.headers.find_header(CONTENT_TYPE).and_then(|value| multipart_boundary(value))
    }

    /// Gets the declared body length. A missing `Content-Length` means there is no body.
    pub fn content_length(&self) -> Result<u64, ParsingError> {
        match self.headers.find_header(CONTENT_LENGTH) {
            Some(value) => value.trim().parse()
                .map_err(|_| ParsingError::InvalidContentLength(value.to_string())),
            None => Ok(0)
        }
    }
}

/// Parses the request line and header lines of a message, ignoring anything after the first blank line.
pub fn parse_head(raw: &[u8]) -> Result<RequestHead, ParsingError> {
    let (head, _) = split_at_blank_line(raw).unwrap_or((raw, &[]));
    let head = std::str::from_utf8(head).map_err(|_| ParsingError::InvalidUtf8)?;

    let mut lines = head.lines();
    let (method, path, version) = parse_request_line(lines.next().unwrap_or(""))?;
    let headers = parse_headers(lines)?;

    Ok(RequestHead { method, path, version, headers })
}

/// Parses a whole request message: the header block, a blank line, then exactly the body bytes.
/// A message without a blank line is treated as a header block with no body.
///
/// Cookies are read from the `Cookie` header. A `multipart/form-data` body is decoded into files and
/// form fields and the stored content type loses its boundary parameter. Any other body is kept as
/// raw text.
pub fn parse_request(raw: &[u8]) -> Result<Request, ParsingError> {
    let RequestHead { method, path, version, mut headers } = parse_head(raw)?;
    let body = split_at_blank_line(raw).map(|(_, body)| body).unwrap_or(&[]);
    let cookies = parse_cookie_header(&headers)?;

    let boundary = headers.find_header(CONTENT_TYPE).and_then(|value| multipart_boundary(value));

    let (body, files) = match boundary {
        Some(boundary) => {
            set_content_type(&mut headers, MULTIPART_FORM_DATA);
            let decoded = multipart::decode(body, &boundary)?;
            let body = if decoded.fields.is_empty() { Body::Absent } else { Body::FormFields(decoded.fields) };
            (body, decoded.files)
        }
        None => (parse_text_body(body)?, HashMap::new())
    };

    Ok(Request { method, path, version, headers, cookies, body, files })
}

/// Splits the given bytes at the first empty line, which may end in CRLF or LF.
/// Returns the bytes before the empty line and the bytes after it, or None if there is no empty line.
pub(crate) fn split_at_blank_line(raw: &[u8]) -> Option<(&[u8], &[u8])> {
    let mut start = 0;

    while let Some(offset) = raw[start..].iter().position(|b| *b == b'\n') {
        let end = start + offset;
        let line = &raw[start..end];
        if line.is_empty() || line == b"\r" {
            return Some((&raw[..start], &raw[end + 1..]));
        }
        start = end + 1;
    }

    None
}

/// Parses the request line into the method, path and version.
fn parse_request_line(line: &str) -> Result<(Method, String, Version), ParsingError> {
    let captures = request_line_regex().captures(line).ok_or(ParsingError::MalformedRequestLine)?;

    let version = Version::try_from_str(&captures[3]).ok_or(ParsingError::MalformedRequestLine)?;
    let method = Method::try_from_str(&captures[1])
        .ok_or_else(|| ParsingError::UnsupportedMethod(captures[1].to_string()))?;

    Ok((method, captures[2].to_string(), version))
}

/// Parses header lines. Splits each line at the first ':' and drops a single space or tab from the start
/// of the value. A repeated header replaces the earlier value.
fn parse_headers<'a>(lines: impl Iterator<Item=&'a str>) -> Result<HeaderMap, ParsingError> {
    let mut headers = HeaderMap::new();

    for line in lines {
        let captures = header_line_regex().captures(line)
            .ok_or_else(|| ParsingError::MalformedHeaderLine(line.to_string()))?;

        let value = &captures[2];
        let value = value.strip_prefix(' ').or_else(|| value.strip_prefix('\t')).unwrap_or(value);

        headers.set_header(&captures[1], value);
    }

    Ok(headers)
}

/// Parses the cookie header, if there is one.
fn parse_cookie_header(headers: &HeaderMap) -> Result<CookieMap, ParsingError> {
    match headers.find_header(COOKIE) {
        Some(raw) => parse_cookies(raw).map_err(|err| match err {
            CookieError::MalformedPair(pair) => ParsingError::MalformedCookiePair(pair),
            other => ParsingError::MalformedCookiePair(other.to_string()),
        }),
        None => Ok(CookieMap::new())
    }
}

/// Replaces the content type value, keeping the header name spelled the way the client sent it.
fn set_content_type(headers: &mut HeaderMap, value: &str) {
    let name = if headers.contains_key(CONTENT_TYPE) {
        CONTENT_TYPE.to_string()
    } else {
        headers.keys()
            .find(|name| name.eq_ignore_ascii_case(CONTENT_TYPE))
            .cloned()
            .unwrap_or_else(|| CONTENT_TYPE.to_string())
    };
    headers.set_header(name, value);
}

/// Reads a non-multipart body as text.
fn parse_text_body(body: &[u8]) -> Result<Body, ParsingError> {
    if body.is_empty() {
        return Ok(Body::Absent);
    }
    let text = std::str::from_utf8(body).map_err(|_| ParsingError::InvalidUtf8)?;
    Ok(Body::Raw(text.to_string()))
}
