use crate::parse::body::BodyParserRegistry;
use crate::server::Router;

/// Number of workers used by `Config::new`.
pub const DEFAULT_WORKER_THREADS: usize = 1;

/// Number of parsed requests that may wait for a worker before the accept loop blocks.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// The config for an HTTP server.
pub struct Config {
    /// The address to bind the server listener to.
    pub addr: String,
    /// The number of threads to spawn for handling requests. Each thread handles one request at a time.
    pub worker_threads: usize,
    /// How many parsed requests may wait for a worker.
    pub queue_capacity: usize,
    /// The router used for handling requests.
    pub router: Router,
    /// Parsers applied to request bodies by content type before they are queued.
    pub body_parsers: BodyParserRegistry,
}

impl Config {
    /// Creates a config with one worker, the default queue capacity, and the JSON and form body parsers.
    pub fn new(addr: impl Into<String>, router: Router) -> Config {
        Config {
            addr: addr.into(),
            worker_threads: DEFAULT_WORKER_THREADS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            router,
            body_parsers: BodyParserRegistry::with_defaults(),
        }
    }
}
