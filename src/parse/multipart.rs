use std::collections::HashMap;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::common::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use crate::common::request::FilePart;
use crate::parse::error::ParsingError;
use crate::parse::request::split_at_blank_line;

/// The bare MIME type of a multipart form body.
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// `multipart/form-data; boundary=<token>`, with an optionally quoted token and optional parameters after it.
const CONTENT_TYPE_PATTERN: &str = r#"(?i)^\s*multipart/form-data\s*;\s*boundary=(?:"([^"]+)"|([^\s;"]+))\s*(?:;.*)?$"#;

/// `name="..."` and `filename="..."` parameters of a content disposition.
const DISPOSITION_PARAM_PATTERN: &str = r#"(?i)\b(name|filename)="([^"]*)""#;

fn content_type_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(CONTENT_TYPE_PATTERN).expect("content type pattern is valid"))
}

fn disposition_param_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(DISPOSITION_PARAM_PATTERN).expect("disposition pattern is valid"))
}

/// The decoded parts of a multipart body.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Multipart {
    /// Parts with a file name, by field name.
    pub files: HashMap<String, FilePart>,
    /// Parts without a file name, by field name.
    pub fields: HashMap<String, String>,
}

/// Gets the boundary token from a `multipart/form-data` content type, or None for any other content type.
pub fn multipart_boundary(content_type: &str) -> Option<String> {
    let captures = content_type_regex().captures(content_type)?;
    captures.get(1).or_else(|| captures.get(2)).map(|token| token.as_str().to_string())
}

/// Gets the line that ends a multipart body with the given boundary.
pub fn terminator_line(boundary: &str) -> String {
    format!("--{}--", boundary)
}

/// Decodes a multipart body with the given boundary.
///
/// Anything before the first delimiter line and after the closing delimiter is ignored. Each part's
/// headers run until the first blank line, and its body is everything after that up to the line break
/// before the next delimiter. If two parts share a field name, the later one wins.
pub fn decode(body: &[u8], boundary: &str) -> Result<Multipart, ParsingError> {
    let delimiter = format!("--{}", boundary).into_bytes();
    let mut multipart = Multipart::default();

    let mut cursor = match find_delimiter(body, &delimiter, 0) {
        Some(position) => position,
        None => return Ok(multipart)
    };

    loop {
        let after_delimiter = cursor + delimiter.len();
        if body[after_delimiter..].starts_with(b"--") {
            break;
        }

        let part_start = match find(body, b"\n", after_delimiter) {
            Some(line_end) => line_end + 1,
            None => break
        };
        let next = find_delimiter(body, &delimiter, part_start);

        decode_part(trim_line_break(&body[part_start..next.unwrap_or(body.len())]), &mut multipart)?;

        match next {
            Some(position) => cursor = position,
            None => break
        }
    }

    Ok(multipart)
}

/// Decodes one part and adds it to the given multipart as a file or a field.
fn decode_part(part: &[u8], multipart: &mut Multipart) -> Result<(), ParsingError> {
    let (head, body) = split_at_blank_line(part)
        .ok_or(ParsingError::MultipartDecode("part headers are not terminated"))?;

    let mut name = None;
    let mut filename = None;
    let mut content_type = None;

    for line in String::from_utf8_lossy(head).lines() {
        let (header, value) = match line.split_once(':') {
            Some(pair) => pair,
            None => continue
        };

        if header.trim().eq_ignore_ascii_case(CONTENT_DISPOSITION) {
            for captures in disposition_param_regex().captures_iter(value) {
                let param = captures[2].to_string();
                if captures[1].eq_ignore_ascii_case("filename") {
                    filename = Some(param);
                } else {
                    name = Some(param);
                }
            }
        } else if header.trim().eq_ignore_ascii_case(CONTENT_TYPE) {
            content_type = Some(value.trim().to_string());
        }
    }

    match (name, filename) {
        (Some(name), Some(filename)) => {
            multipart.files.insert(name, FilePart { filename, body: body.to_vec(), content_type });
        }
        (Some(name), None) => {
            multipart.fields.insert(name, String::from_utf8_lossy(body).into_owned());
        }
        (None, Some(_)) => return Err(ParsingError::MultipartDecode("file part without a name")),
        (None, None) => debug!("Dropping multipart part without a name ({} bytes)", body.len())
    }

    Ok(())
}

/// Finds the next delimiter that starts a line, at or after `from`.
fn find_delimiter(body: &[u8], delimiter: &[u8], from: usize) -> Option<usize> {
    let mut from = from;
    while let Some(position) = find(body, delimiter, from) {
        if position == 0 || body[position - 1] == b'\n' {
            return Some(position);
        }
        from = position + 1;
    }
    None
}

/// Finds the first occurrence of `needle` in `haystack` at or after `from`.
fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    haystack[from..].windows(needle.len()).position(|window| window == needle).map(|position| position + from)
}

/// Removes the line break that belongs to the following delimiter.
fn trim_line_break(part: &[u8]) -> &[u8] {
    part.strip_suffix(b"\r\n")
        .or_else(|| part.strip_suffix(b"\n"))
        .unwrap_or(part)
}
