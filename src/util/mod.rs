/// Worker pool over a bounded queue.
pub mod worker_pool;

/// Utility for creating mock trait implementations.
#[cfg(test)]
pub mod mock;

/// Stream trait for connections that can be read, written and shut down.
pub mod stream;

/// Guesses a content type from the extension of the given file path.
pub fn get_content_type(path: &str) -> &'static str {
    let extension = path.rsplit_once('.').map(|(_, extension)| extension).unwrap_or("");
    match extension.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        _ => "text/plain"
    }
}
