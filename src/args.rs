use clap::Parser;
use log::LevelFilter;

const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

/// A minimal HTTP/1.0 server. Serves a few demo routes to show off request parsing.
#[derive(Parser, Debug)]
#[command(author = AUTHORS, version, about)]
pub struct Args {
    /// (Optional) Host name or IP address to serve from.
    #[arg(long, default_value_t = String::from("127.0.0.1"))]
    pub host: String,
    /// (Optional) Port number to open on host.
    #[arg(short, long, default_value_t = 4000)]
    pub port: u16,
    /// (Optional) Number of worker threads handling parsed requests.
    #[arg(short, long, default_value_t = 4)]
    pub workers: usize,
    /// (Optional) Number of parsed requests that may wait for a worker.
    #[arg(long, default_value_t = 32)]
    pub queue_capacity: usize,
    /// (Optional) Log level: off, error, warn, info, debug or trace.
    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,
    /// (Optional) Directory served under /static/.
    #[arg(long, default_value_t = String::from("."))]
    pub static_dir: String,
}

impl Args {
    /// The address to bind to.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
