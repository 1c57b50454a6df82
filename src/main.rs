use std::fs;
use std::io::Error;
use std::path::Path;

use clap::Parser;
use log::{info, warn};
use minhttp::args::Args;
use minhttp::common::request::{Body, Request};
use minhttp::common::response::Response;
use minhttp::common::status;
use minhttp::server;
use minhttp::server::{Config, Router};
use serde::Serialize;
use serde_json::json;
use simplelog::{ColorChoice, TermLogger, TerminalMode};

fn main() -> Result<(), Error> {
    let args = Args::parse();

    TermLogger::init(args.log_level, simplelog::Config::default(), TerminalMode::Mixed, ColorChoice::Auto)
        .unwrap_or_else(|err| eprintln!("Logger could not be installed: {}", err));

    let mut router = Router::new();

    router.get("/", |_| Response::text("Hello from minhttp!"));

    router.post("/echo/json", |request| match &request.body {
        Body::Structured(value) => json_response(value),
        _ => status::BAD_REQUEST.into()
    });

    router.post("/echo/form", |request| match &request.body {
        Body::FormFields(fields) => json_response(fields),
        _ => status::BAD_REQUEST.into()
    });

    router.post("/upload", upload_summary);

    router.get("/cookies", |request| {
        let visits = request.cookies.get("visits")
            .and_then(|visits| visits.parse::<u32>().ok())
            .unwrap_or(0) + 1;

        Response::text(format!("Visit number {}", visits))
            .with_cookie("visits", visits.to_string())
            .unwrap_or_else(|_| status::INTERNAL_SERVER_ERROR.into())
    });

    serve_static_files(&mut router, Path::new(&args.static_dir));

    let mut config = Config::new(args.addr(), router);
    config.worker_threads = args.workers;
    config.queue_capacity = args.queue_capacity;

    info!("Running on {}", args.addr());
    server::listen_http(config)
}

/// Describes the uploaded files of a multipart request.
fn upload_summary(request: &Request) -> Response {
    #[derive(Serialize)]
    struct Upload<'a> {
        field: &'a str,
        filename: &'a str,
        size: usize,
        content_type: Option<&'a str>,
    }

    let mut uploads: Vec<Upload> = request.files.iter()
        .map(|(field, file)| Upload {
            field,
            filename: &file.filename,
            size: file.body.len(),
            content_type: file.content_type.as_deref(),
        })
        .collect();
    uploads.sort_by_key(|upload| upload.field);

    let fields = match &request.body {
        Body::FormFields(fields) => json!(fields),
        _ => json!({})
    };

    json_response(&json!({ "files": uploads, "fields": fields }))
}

/// Registers a GET route under /static/ for each file directly inside the given directory.
fn serve_static_files(router: &mut Router, dir: &Path) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("Not serving static files from {}: {}", dir.display(), err);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        router.get(&format!("/static/{}", name), move |_| {
            Response::file(&path).unwrap_or_else(|_| status::NOT_FOUND.into())
        });
    }
}

fn json_response<T: Serialize + ?Sized>(value: &T) -> Response {
    Response::json(value).unwrap_or_else(|_| status::INTERNAL_SERVER_ERROR.into())
}
