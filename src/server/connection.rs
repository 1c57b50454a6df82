use std::io::{BufRead, BufReader, ErrorKind, Read, Write};
use std::net::SocketAddr;
use std::time::Duration;

use log::{debug, trace, warn};
use thiserror::Error;

use crate::common::request::Request;
use crate::common::response::Response;
use crate::parse::error::ParsingError;
use crate::parse::error_take::{is_limit_reached, ReadExt};
use crate::parse::multipart::terminator_line;
use crate::parse::request::{parse_head, parse_request, RequestHead};
use crate::server::write::{write_response, write_status};
use crate::util::stream::Stream;

/// The maximum size of a request line plus headers.
pub const MAX_HEAD_SIZE: u64 = 8 * 1024;

/// The maximum size of a body.
pub const MAX_BODY_SIZE: u64 = 3 * 1024 * 1024; // 3 megabytes

/// The most unread input discarded when a connection is closed.
pub const MAX_DRAIN_SIZE: u64 = 64 * 1024;

/// How long closing a connection waits for unread input.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Where a connection is in its life. Each connection carries exactly one request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum State {
    AwaitingRequestLine,
    ReadingHeaders,
    ReadingBody,
    Parsed,
    Enqueued,
    Dispatched,
    ResponseWritten,
    Closed,
    /// The request couldn't be read or parsed and an error response is being sent.
    Rejected,
}

/// An error that may result from trying to read a request.
#[derive(Debug, Error)]
pub enum ReadRequestError {
    /// The request is malformed or too large.
    #[error(transparent)]
    Parse(#[from] ParsingError),
    /// An unhandled IO error.
    #[error("IO error while reading request: {0}")]
    Io(#[from] std::io::Error),
    /// The client closed the connection without sending anything.
    #[error("connection closed before a request was sent")]
    Closed,
}

/// A connection to a client, from reading its request to closing it.
pub struct Connection<S: Stream> {
    /// The address of the client.
    pub addr: SocketAddr,
    reader: BufReader<S>,
    state: State,
}

impl<S: Stream> Connection<S> {
    /// Creates a new connection out of the given address and stream.
    pub fn new(addr: SocketAddr, stream: S) -> Connection<S> {
        Connection { addr, reader: BufReader::new(stream), state: State::AwaitingRequestLine }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Moves the connection to the given state.
    pub fn set_state(&mut self, state: State) {
        trace!("{} {:?} -> {:?}", self.addr, self.state, state);
        self.state = state;
    }

    /// Reads and parses the request. The header block is read until the first blank line, then the body
    /// is read until the multipart terminator, or for `Content-Length` bytes.
    pub fn read_request(&mut self) -> Result<Request, ReadRequestError> {
        let result = self.read_request_internal();
        match &result {
            Ok(_) => self.set_state(State::Parsed),
            Err(ReadRequestError::Closed) => self.set_state(State::Closed),
            Err(_) => self.set_state(State::Rejected),
        }
        result
    }

    fn read_request_internal(&mut self) -> Result<Request, ReadRequestError> {
        let mut message = self.read_head()?;

        self.set_state(State::ReadingBody);
        let head = parse_head(&message)?;
        let body = self.read_body(&head)?;
        debug!("{} sent {} {} with a {} byte body", self.addr, head.method, head.path, body.len());

        message.extend_from_slice(&body);
        Ok(parse_request(&message)?)
    }

    /// Reads lines up to and including the first empty line.
    fn read_head(&mut self) -> Result<Vec<u8>, ReadRequestError> {
        let mut head = Vec::new();
        let mut reader = (&mut self.reader).error_take(MAX_HEAD_SIZE);

        loop {
            let start = head.len();
            let read = reader.read_until(b'\n', &mut head).map_err(|err| match err {
                err if is_limit_reached(&err) => ReadRequestError::Parse(ParsingError::HeadTooLarge),
                err => ReadRequestError::Io(err)
            })?;

            if read == 0 {
                return if head.is_empty() { Err(ReadRequestError::Closed) } else { Ok(head) };
            }

            let line = &head[start..];
            if line == b"\r\n" || line == b"\n" {
                return Ok(head);
            }

            if start == 0 {
                trace!("{} {:?} -> {:?}", self.addr, self.state, State::ReadingHeaders);
                self.state = State::ReadingHeaders;
            }
        }
    }

    /// Reads the body framed by the given head.
    fn read_body(&mut self, head: &RequestHead) -> Result<Vec<u8>, ReadRequestError> {
        match head.multipart_boundary() {
            Some(boundary) => self.read_multipart_body(&terminator_line(&boundary)),
            None => self.read_sized_body(head.content_length()?)
        }
    }

    /// Reads lines until one is the given terminator.
    fn read_multipart_body(&mut self, terminator: &str) -> Result<Vec<u8>, ReadRequestError> {
        let mut body = Vec::new();
        let mut reader = (&mut self.reader).error_take(MAX_BODY_SIZE);

        loop {
            let start = body.len();
            let read = reader.read_until(b'\n', &mut body).map_err(|err| match err {
                err if is_limit_reached(&err) => ReadRequestError::Parse(ParsingError::BodyTooLarge),
                err => ReadRequestError::Io(err)
            })?;

            if read == 0 {
                return Err(ParsingError::IncompleteBody.into());
            }

            let line = &body[start..];
            let line = line.strip_suffix(b"\n").unwrap_or(line);
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line == terminator.as_bytes() {
                return Ok(body);
            }
        }
    }

    /// Reads exactly the given number of bytes.
    fn read_sized_body(&mut self, length: u64) -> Result<Vec<u8>, ReadRequestError> {
        if length > MAX_BODY_SIZE {
            return Err(ParsingError::BodyTooLarge.into());
        }

        let mut body = Vec::with_capacity(length as usize);
        (&mut self.reader).take(length).read_to_end(&mut body)?;

        if (body.len() as u64) < length {
            return Err(ParsingError::IncompleteBody.into());
        }
        Ok(body)
    }

    /// Writes the error's status with the default body, then closes the connection.
    pub fn reject(&mut self, error: &ParsingError) {
        warn!("Rejecting request from {}: {}", self.addr, error);
        self.set_state(State::Rejected);
        if let Err(err) = write_status(self, error.status()) {
            warn!("Failed to write rejection to {}: {}", self.addr, err);
        }
        self.close();
    }

    /// Writes the given response.
    pub fn respond(&mut self, response: &Response) -> std::io::Result<()> {
        write_response(self, response)?;
        self.set_state(State::ResponseWritten);
        Ok(())
    }

    /// Closes the writing side of the stream, then discards what the client sent past its request.
    /// A socket dropped with unread input is reset, which can destroy the response before the client
    /// reads it.
    pub fn close(&mut self) {
        if let Err(err) = self.reader.get_ref().close() {
            if err.kind() != ErrorKind::NotConnected {
                debug!("Failed to close connection to {}: {}", self.addr, err);
            }
        }
        self.drain();
        self.set_state(State::Closed);
    }

    /// Reads and discards input until EOF, `MAX_DRAIN_SIZE` bytes or `DRAIN_TIMEOUT`.
    fn drain(&mut self) {
        if let Err(err) = self.reader.get_ref().set_read_timeout(Some(DRAIN_TIMEOUT)) {
            debug!("Not draining connection to {}: {}", self.addr, err);
            return;
        }

        match std::io::copy(&mut (&mut self.reader).take(MAX_DRAIN_SIZE), &mut std::io::sink()) {
            Ok(0) => {}
            Ok(discarded) => debug!("Discarded {} unread bytes from {}", discarded, self.addr),
            Err(err) => debug!("Stopped draining connection to {}: {}", self.addr, err)
        }
    }
}

impl<S: Stream> Write for Connection<S> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.reader.get_mut().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.reader.get_mut().flush()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use crate::common::method::Method;
    use crate::common::request::{Body, Request};
    use crate::common::response::Response;
    use crate::parse::error::ParsingError;
    use crate::server::connection::{Connection, MAX_BODY_SIZE, MAX_DRAIN_SIZE, MAX_HEAD_SIZE, ReadRequestError, State};
    use crate::util::mock::{EndlessMockReader, MockReader, MockStream, MockWriter};

    type TestConnection<R> = Connection<MockStream<R, MockWriter>>;

    fn connection<R: std::io::Read>(reader: R) -> (TestConnection<R>, MockWriter) {
        let writer = MockWriter::new();
        let stream = MockStream::new(reader, writer.clone());
        (Connection::new("127.0.0.1:8080".parse().unwrap(), stream), writer)
    }

    fn read(input: Vec<&str>) -> Result<Request, ReadRequestError> {
        connection(MockReader::from_strs(input)).0.read_request()
    }

    fn read_parse_error(input: Vec<&str>) -> ParsingError {
        match read(input) {
            Err(ReadRequestError::Parse(err)) => err,
            other => panic!("expected a parsing error, got {:?}", other)
        }
    }

    #[test]
    fn simple_request() {
        let (mut connection, _) = connection(MockReader::from_strs(vec!["GET /hello HTTP/1.0\r\nHost: x\r\n\r\n"]));

        let request = connection.read_request().unwrap();

        assert_eq!(Method::GET, request.method);
        assert_eq!("/hello", request.path);
        assert_eq!(Body::Absent, request.body);
        assert_eq!(State::Parsed, connection.state());
    }

    #[test]
    fn fragmented_request() {
        let request = read(vec!["PO", "ST / ", "HTTP/1", ".0\r\nconte", "nt-le", "ngth: ", "5\r\n\r", "\nhe", "ll", "o"]).unwrap();
        assert_eq!(Body::Raw("hello".to_string()), request.body);
    }

    #[test]
    fn reads_only_content_length_bytes() {
        let request = read(vec!["POST / HTTP/1.0\r\nContent-Length: 3\r\n\r\nabcdef"]).unwrap();
        assert_eq!(Body::Raw("abc".to_string()), request.body);
    }

    #[test]
    fn no_content_length_means_no_body() {
        let request = read(vec!["POST / HTTP/1.0\r\n\r\nignored"]).unwrap();
        assert_eq!(Body::Absent, request.body);
    }

    #[test]
    fn body_with_blank_lines() {
        let request = read(vec!["POST / HTTP/1.0\r\nContent-Length: 9\r\n\r\na\r\n\r\n\r\nb\n"]).unwrap();
        assert_eq!(Body::Raw("a\r\n\r\n\r\nb\n".to_string()), request.body);
    }

    #[test]
    fn multipart_read_until_terminator() {
        let request = read(vec![
            "POST /upload HTTP/1.0\r\nContent-Type: multipart/form-data; boundary=zz\r\n\r\n",
            "--zz\r\nContent-Disposition: form-data; name=\"f\"; filename=\"a.txt\"\r\n\r\n",
            "contents\r\n",
            "--zz--\r\n",
            "trailing data is not read",
        ]).unwrap();

        assert_eq!(b"contents".to_vec(), request.files["f"].body);
        assert_eq!(Body::Absent, request.body);
    }

    #[test]
    fn multipart_without_terminator() {
        assert_eq!(
            ParsingError::IncompleteBody,
            read_parse_error(vec!["POST / HTTP/1.0\r\nContent-Type: multipart/form-data; boundary=zz\r\n\r\n--zz\r\n"]));
    }

    #[test]
    fn closed_before_anything_sent() {
        let (mut connection, writer) = connection(MockReader::from_strs(vec![]));

        assert!(matches!(connection.read_request(), Err(ReadRequestError::Closed)));
        assert_eq!(State::Closed, connection.state());
        assert_eq!("", writer.output());
    }

    #[test]
    fn short_body() {
        assert_eq!(ParsingError::IncompleteBody, read_parse_error(vec!["POST / HTTP/1.0\r\nContent-Length: 10\r\n\r\nabc"]));
    }

    #[test]
    fn invalid_content_length() {
        assert_eq!(
            ParsingError::InvalidContentLength("ten".to_string()),
            read_parse_error(vec!["POST / HTTP/1.0\r\nContent-Length: ten\r\n\r\n"]));
    }

    #[test]
    fn content_length_too_large() {
        let raw = format!("POST / HTTP/1.0\r\nContent-Length: {}\r\n\r\n", MAX_BODY_SIZE + 1);
        assert_eq!(ParsingError::BodyTooLarge, read_parse_error(vec![&raw]));
    }

    #[test]
    fn endless_multipart_body() {
        let reader = EndlessMockReader::from_strs(
            vec!["POST / HTTP/1.0\r\nContent-Type: multipart/form-data; boundary=b\r\n\r\n"], "more data\r\n");
        let (mut connection, _) = connection(reader);

        assert!(matches!(connection.read_request(), Err(ReadRequestError::Parse(ParsingError::BodyTooLarge))));
    }

    #[test]
    fn endless_headers() {
        let reader = EndlessMockReader::from_strs(vec!["GET / HTTP/1.0\r\n"], "X-Header: value\r\n");
        let (mut connection, _) = connection(reader);

        assert!(matches!(connection.read_request(), Err(ReadRequestError::Parse(ParsingError::HeadTooLarge))));
        assert_eq!(State::Rejected, connection.state());
    }

    #[test]
    fn endless_request_line() {
        let reader = EndlessMockReader::from_strs(vec!["GET /"], "aaaaaaaa");
        let (mut connection, _) = connection(reader);

        assert!(matches!(connection.read_request(), Err(ReadRequestError::Parse(ParsingError::HeadTooLarge))));
    }

    #[test]
    fn head_just_under_limit() {
        let padding = "a".repeat(MAX_HEAD_SIZE as usize - "GET / HTTP/1.0\r\nX: \r\n\r\n".len());
        let raw = format!("GET / HTTP/1.0\r\nX: {}\r\n\r\n", padding);

        assert_eq!(padding, read(vec![&raw]).unwrap().headers["X"]);
    }

    #[test]
    fn malformed_request_line() {
        let (mut connection, _) = connection(MockReader::from_strs(vec!["hello there\r\n\r\n"]));

        assert!(matches!(connection.read_request(), Err(ReadRequestError::Parse(ParsingError::MalformedRequestLine))));
        assert_eq!(State::Rejected, connection.state());
    }

    #[test]
    fn reject_writes_status_and_closes() {
        let stream = MockStream::new(MockReader::from_strs(vec![]), MockWriter::new());
        let closed = stream.closed.clone();
        let writer = stream.writer.clone();
        let mut connection = Connection::new("127.0.0.1:8080".parse().unwrap(), stream);

        connection.reject(&ParsingError::UnsupportedMethod("BREW".to_string()));

        assert_eq!(
            "HTTP/1.0 405 Method Not Allowed\r\nContent-Length: 22\r\nContent-Type: text/plain\r\n\r\n405 Method Not Allowed",
            writer.output());
        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(State::Closed, connection.state());
    }

    #[test]
    fn respond_writes_response() {
        let (mut connection, writer) = connection(MockReader::from_strs(vec!["GET / HTTP/1.0\r\n\r\n"]));

        connection.read_request().unwrap();
        connection.respond(&Response::text("hi")).unwrap();

        assert_eq!("HTTP/1.0 200 OK\r\nContent-Length: 2\r\nContent-Type: text/plain\r\n\r\nhi", writer.output());
        assert_eq!(State::ResponseWritten, connection.state());
    }

    #[test]
    fn close_discards_input_past_the_body() {
        let head = "POST / HTTP/1.0\r\nContent-Length: 3\r\n\r\nabc";
        let stream = MockStream::new(MockReader::from_strs(vec![head, "extra", "more extra"]), MockWriter::new());
        let bytes_read = stream.bytes_read.clone();
        let mut connection = Connection::new("127.0.0.1:8080".parse().unwrap(), stream);

        assert_eq!(Body::Raw("abc".to_string()), connection.read_request().unwrap().body);
        assert_eq!(head.len(), bytes_read.load(Ordering::SeqCst));

        connection.close();

        assert_eq!(head.len() + "extra".len() + "more extra".len(), bytes_read.load(Ordering::SeqCst));
        assert_eq!(State::Closed, connection.state());
    }

    #[test]
    fn close_stops_draining_at_limit() {
        let stream = MockStream::new(EndlessMockReader::from_strs(vec![], "junk"), MockWriter::new());
        let bytes_read = stream.bytes_read.clone();
        let mut connection = Connection::new("127.0.0.1:8080".parse().unwrap(), stream);

        connection.close();

        // the buffered reader may read ahead by up to one buffer
        let read = bytes_read.load(Ordering::SeqCst) as u64;
        assert!(read >= MAX_DRAIN_SIZE && read <= MAX_DRAIN_SIZE + 8 * 1024, "{}", read);
    }
}
