use std::io::{Read, Result, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

/// A connection stream that can be read, written and closed.
pub trait Stream: Read + Write {
    /// Closes the writing side of the stream, so the client sees the end of the response while whatever
    /// it still sends can be read. Streams without a close operation do nothing.
    fn close(&self) -> Result<()> {
        Ok(())
    }

    /// Sets how long a read may block. Streams that never block ignore this.
    fn set_read_timeout(&self, _timeout: Option<Duration>) -> Result<()> {
        Ok(())
    }
}

impl Stream for TcpStream {
    fn close(&self) -> Result<()> {
        self.shutdown(Shutdown::Write)
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }
}
