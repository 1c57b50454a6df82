use std::collections::BTreeMap;

use thiserror::Error;

/// Cookie names to values. Ordered so that encoded cookie headers are deterministic.
pub type CookieMap = BTreeMap<String, String>;

/// Separates cookie pairs.
const PAIR_DELIMITER: char = ';';

/// Separates a cookie name from its value.
const VALUE_DELIMITER: char = '=';

/// Error for cookies that can't be parsed or encoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CookieError {
    /// A pair in a `Cookie` header has no `=` or no name.
    #[error("malformed cookie pair {0:?}")]
    MalformedPair(String),
    /// A cookie name is empty.
    #[error("cookie name is empty")]
    EmptyName,
    /// A cookie name or value contains a delimiter or a control character such as CR or LF.
    #[error("cookie name or value {0:?} contains ';', '=' or a control character")]
    InvalidCharacter(String),
    /// A cookie name or value starts or ends with whitespace, which parsing trims away.
    #[error("cookie name or value {0:?} has leading or trailing whitespace")]
    SurroundingWhitespace(String),
}

/// Parses the value of a `Cookie` header. Pairs are separated by `;` and split at their first `=`.
/// Empty pairs are skipped.
pub fn parse_cookies(raw: &str) -> Result<CookieMap, CookieError> {
    let mut cookies = CookieMap::new();

    for pair in raw.split(PAIR_DELIMITER).map(str::trim).filter(|pair| !pair.is_empty()) {
        match pair.split_once(VALUE_DELIMITER) {
            Some((name, value)) if !name.trim().is_empty() => {
                cookies.insert(name.trim().to_string(), value.trim().to_string());
            }
            _ => return Err(CookieError::MalformedPair(pair.to_string()))
        }
    }

    Ok(cookies)
}

/// Encodes cookies as `key=value` pairs joined by `;`, without a trailing `;`.
pub fn encode_cookies(cookies: &CookieMap) -> String {
    cookies.iter()
        .map(|(name, value)| format!("{}{}{}", name, VALUE_DELIMITER, value))
        .collect::<Vec<String>>()
        .join(&PAIR_DELIMITER.to_string())
}

/// Checks that a cookie can be encoded and read back unchanged: the name must be non-empty, neither
/// part may contain a delimiter or a control character, and neither may start or end with whitespace.
pub fn validate_cookie(name: &str, value: &str) -> Result<(), CookieError> {
    if name.is_empty() {
        return Err(CookieError::EmptyName);
    }
    for part in [name, value] {
        if part.contains(|c: char| c == PAIR_DELIMITER || c == VALUE_DELIMITER || c.is_control()) {
            return Err(CookieError::InvalidCharacter(part.to_string()));
        }
        if part.trim() != part {
            return Err(CookieError::SurroundingWhitespace(part.to_string()));
        }
    }
    Ok(())
}
