use std::cmp::min;
use std::io::{Read, Write};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::util::stream::Stream;

/// Reader that returns the given chunks one read at a time, then EOF.
pub struct MockReader {
    pub data: Vec<Vec<u8>>,
}

impl MockReader {
    pub fn from_strs(data: Vec<&str>) -> MockReader {
        MockReader { data: data.into_iter().map(|s| s.as_bytes().to_vec()).collect() }
    }
}

impl Read for MockReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let next = match self.data.first_mut() {
            Some(next) => next,
            None => return Ok(0)
        };

        let amount = min(buf.len(), next.len());
        buf[..amount].copy_from_slice(&next[..amount]);
        next.drain(..amount);

        if next.is_empty() {
            self.data.remove(0);
        }

        Ok(amount)
    }
}

/// Reader that returns the given chunks, then repeats a sequence forever.
pub struct EndlessMockReader {
    finite_reader: MockReader,
    sequence: Vec<u8>,
    current: usize,
}

impl EndlessMockReader {
    pub fn from_strs(finite_data: Vec<&str>, sequence: &str) -> EndlessMockReader {
        EndlessMockReader { finite_reader: MockReader::from_strs(finite_data), sequence: sequence.as_bytes().to_vec(), current: 0 }
    }
}

impl Read for EndlessMockReader {
    fn read(&mut self, mut buf: &mut [u8]) -> std::io::Result<usize> {
        let size = self.finite_reader.read(buf)?;
        if size > 0 {
            Ok(size)
        } else {
            let start = self.current;
            let range = min(self.sequence.len() - start, buf.len());
            buf.write_all(&self.sequence[start..(start + range)])?;
            self.current = (start + range) % self.sequence.len();
            Ok(range)
        }
    }
}

/// Writer that records everything written to it. Clones share the same record.
#[derive(Clone)]
pub struct MockWriter {
    pub written: Arc<Mutex<Vec<u8>>>,
    pub flushed: Arc<AtomicBool>,
}

impl MockWriter {
    pub fn new() -> MockWriter {
        MockWriter { written: Arc::new(Mutex::new(vec![])), flushed: Arc::new(AtomicBool::new(false)) }
    }

    /// Everything written so far, as text.
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.written.lock().unwrap()).into_owned()
    }
}

impl Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.written.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flushed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// A stream made of a separate reader and writer. Counts the bytes read from it.
pub struct MockStream<R, W> {
    pub reader: R,
    pub writer: W,
    pub closed: Arc<AtomicBool>,
    pub bytes_read: Arc<AtomicUsize>,
}

impl<R, W> MockStream<R, W> {
    pub fn new(reader: R, writer: W) -> MockStream<R, W> {
        MockStream { reader, writer, closed: Arc::new(AtomicBool::new(false)), bytes_read: Arc::new(AtomicUsize::new(0)) }
    }
}

impl<R: Read, W> Read for MockStream<R, W> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let size = self.reader.read(buf)?;
        self.bytes_read.fetch_add(size, Ordering::SeqCst);
        Ok(size)
    }
}

impl<R, W: Write> Write for MockStream<R, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl<R: Read, W: Write> Stream for MockStream<R, W> {
    fn close(&self) -> std::io::Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use crate::util::mock::{EndlessMockReader, MockReader};

    fn test_read(reader: &mut impl Read, expected: &str, buf_size: usize) {
        let mut buf = vec![0u8; buf_size];
        let len = reader.read(&mut buf).unwrap();
        assert_eq!(expected, String::from_utf8_lossy(&buf[..len]));
    }

    #[test]
    fn mock_reader_returns_chunks_then_eof() {
        let mut reader = MockReader::from_strs(vec!["hello", "world"]);

        test_read(&mut reader, "hel", 3);
        test_read(&mut reader, "lo", 10);
        test_read(&mut reader, "world", 10);
        test_read(&mut reader, "", 10);
    }

    #[test]
    fn endless_mock_reader() {
        let mut reader = EndlessMockReader::from_strs(vec!["hello", "ok bye"], "blah");

        test_read(&mut reader, "hello", 5);
        test_read(&mut reader, "ok b", 4);
        test_read(&mut reader, "ye", 10);
        test_read(&mut reader, "blah", 10);
        test_read(&mut reader, "bla", 3);
        test_read(&mut reader, "h", 3);

        for _ in 0..100 {
            test_read(&mut reader, "blah", 10);
        }
    }
}
