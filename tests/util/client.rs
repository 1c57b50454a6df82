use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};

/// A response as read off the socket.
#[derive(Debug)]
pub struct RawResponse {
    pub status_line: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Sends the raw bytes on a new connection, closes the writing half, and reads until the server closes it.
pub fn send_raw(addr: SocketAddr, raw: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(raw).unwrap();
    stream.shutdown(Shutdown::Write).unwrap();

    let mut response = vec![];
    stream.read_to_end(&mut response).unwrap();
    response
}

/// Sends the raw request and parses the response.
pub fn send(addr: SocketAddr, raw: &str) -> RawResponse {
    parse_response(&send_raw(addr, raw.as_bytes()))
}

/// Connects and closes without sending anything.
pub fn connect_and_close(addr: SocketAddr) {
    let stream = TcpStream::connect(addr).unwrap();
    stream.shutdown(Shutdown::Both).unwrap();
}

fn parse_response(raw: &[u8]) -> RawResponse {
    let split = raw.windows(4).position(|window| window == b"\r\n\r\n")
        .unwrap_or_else(|| panic!("no blank line in response {:?}", String::from_utf8_lossy(raw)));

    let head = String::from_utf8(raw[..split].to_vec()).unwrap();
    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap().to_string();
    let headers = lines
        .map(|line| {
            let (name, value) = line.split_once(": ").unwrap();
            (name.to_string(), value.to_string())
        })
        .collect();

    RawResponse { status_line, headers, body: raw[split + 4..].to_vec() }
}
