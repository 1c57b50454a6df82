use std::collections::HashMap;

/// A map of header names to values. Names keep the spelling they arrived with and are compared
/// case-sensitively; a repeated header replaces the earlier value.
pub type HeaderMap = HashMap<String, String>;

macro_rules! standard_headers {
    (
        $(
            $(#[$docs:meta])*
            ($name:ident, $value:expr);
        )+
    ) => {
        $(
            $(#[$docs])*
            pub const $name: &str = $value;
        )+
    }
}

standard_headers! {
    (CONTENT_DISPOSITION, "Content-Disposition");
    (CONTENT_LENGTH, "Content-Length");
    (CONTENT_TYPE, "Content-Type");
    (COOKIE, "Cookie");
    (SET_COOKIE, "Set-Cookie");
}

/// Creates a map of headers.
/// ```
/// use minhttp::common::header::{CONTENT_TYPE, HeaderMapOps};
/// use minhttp::header_map;
///
/// let headers = header_map![
///    (CONTENT_TYPE, "text/html"),
///    ("X-Custom", "hello"),
/// ];
///
/// assert_eq!(headers.get_header(CONTENT_TYPE).unwrap(), "text/html");
/// assert_eq!(headers.get_header("X-Custom").unwrap(), "hello");
/// ```
#[macro_export]
macro_rules! header_map {
    () => { $crate::common::header::HeaderMap::new() };
    ($(($header:expr, $value:expr)),+ $(,)?) => {
        <$crate::common::header::HeaderMap as $crate::common::header::HeaderMapOps>::from_pairs(vec![
            $(($header.into(), $value.into()),)+
        ])
    }
}

/// Operations for a header map.
pub trait HeaderMapOps {
    /// Gets a header map from the given pairs. Later pairs replace earlier ones with the same name.
    fn from_pairs(header_values: Vec<(String, String)>) -> Self;
    /// Sets a header, replacing any previous value.
    fn set_header(&mut self, k: impl Into<String>, v: impl Into<String>);
    /// Gets the value of the header with exactly the given name.
    fn get_header(&self, k: &str) -> Option<&String>;
    /// Gets the value of the header with the given name, falling back to a case-insensitive match
    /// when no header is spelled exactly that way.
    fn find_header(&self, k: &str) -> Option<&String>;
}

impl HeaderMapOps for HeaderMap {
    fn from_pairs(header_values: Vec<(String, String)>) -> HeaderMap {
        header_values.into_iter().fold(HashMap::new(), |mut m, (header, value)| {
            m.set_header(header, value);
            m
        })
    }

    fn set_header(&mut self, k: impl Into<String>, v: impl Into<String>) {
        self.insert(k.into(), v.into());
    }

    fn get_header(&self, k: &str) -> Option<&String> {
        self.get(k)
    }

    fn find_header(&self, k: &str) -> Option<&String> {
        self.get(k).or_else(|| {
            self.iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(k))
                .map(|(_, value)| value)
        })
    }
}
