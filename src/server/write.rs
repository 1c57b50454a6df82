use std::borrow::Cow;
use std::io::Write;

use log::warn;

use crate::common::cookie::encode_cookies;
use crate::common::header::{CONTENT_LENGTH, HeaderMapOps, SET_COOKIE};
use crate::common::response::Response;
use crate::common::status::Status;

/// The version written in every status line.
const RESPONSE_VERSION: &str = "HTTP/1.0";

/// Serializes the given response to bytes.
///
/// An empty body is replaced with the status code and reason. `Content-Length` is always the length of
/// the written body, and cookies are written as one `Set-Cookie` header. Headers whose name or value
/// contains CR or LF are left out, since they would end the header line early.
pub fn serialize_response(response: &Response) -> Vec<u8> {
    let body = response_body(response);

    let mut headers = response.headers.clone();
    headers.retain(|name, _| !name.eq_ignore_ascii_case(CONTENT_LENGTH));
    headers.set_header(CONTENT_LENGTH, body.len().to_string());
    if !response.cookies.is_empty() {
        headers.set_header(SET_COOKIE, encode_cookies(&response.cookies));
    }

    let mut headers: Vec<(&String, &String)> = headers.iter()
        .filter(|(name, value)| {
            let safe = !contains_line_break(name) && !contains_line_break(value);
            if !safe {
                warn!("Leaving out response header {:?} with a line break", name);
            }
            safe
        })
        .collect();
    headers.sort();

    let mut bytes = format!("{} {}\r\n", RESPONSE_VERSION, response.status).into_bytes();
    for (name, value) in headers {
        bytes.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
    }
    bytes.extend_from_slice(b"\r\n");
    bytes.extend_from_slice(&body);
    bytes
}

/// Writes the response as bytes to the given writer.
pub fn write_response(writer: &mut impl Write, response: &Response) -> std::io::Result<()> {
    // one write, so the response isn't split across packets by the header loop
    writer.write_all(&serialize_response(response))?;
    writer.flush()
}

/// Writes an empty response with the given status, so the body is the status code and reason.
pub fn write_status(writer: &mut impl Write, status: Status) -> std::io::Result<()> {
    write_response(writer, &Response::new(status))
}

fn contains_line_break(text: &str) -> bool {
    text.contains(|c: char| c == '\r' || c == '\n')
}

/// Gets the body that will be written for the given response.
fn response_body(response: &Response) -> Cow<[u8]> {
    if response.body.is_empty() {
        Cow::Owned(response.status.to_string().into_bytes())
    } else {
        Cow::Borrowed(&response.body)
    }
}
