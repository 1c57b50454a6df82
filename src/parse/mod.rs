/// Parsing errors.
pub mod error;
/// Request message parsing.
pub mod request;
/// multipart/form-data decoding.
pub mod multipart;
/// Content type driven body parsers.
pub mod body;

/// error_take method utility.
pub(crate) mod error_take;
