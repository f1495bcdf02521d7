//! Socket transport underneath the connection layer. Kept as a trait so
//! tests can substitute an in-memory channel instead of a real `TcpStream`.

pub mod connection;

use std::io::{Error, ErrorKind, Read, Result, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

pub trait SocketChannel: Send {
    fn write_all(&mut self, buf: &[u8]) -> Result<()>;
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;
    fn read_exact_with_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<()>;
    fn peer_addr(&self) -> Option<SocketAddr>;
    fn close(&self) -> Result<()>;
}

pub struct TcpChannel {
    stream: TcpStream,
}

impl TcpChannel {
    pub fn connect(address: &str, port: u16, connect_timeout: Duration) -> Result<Self> {
        let addr = (address, port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "could not resolve host:port"))?;
        let stream = TcpStream::connect_timeout(&addr, connect_timeout)?;
        Ok(Self { stream })
    }
}

impl SocketChannel for TcpChannel {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.stream.write_all(buf)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.stream.read_exact(buf)
    }

    /// Reads exactly `buf.len()` bytes, failing with `TimedOut` if the
    /// deadline passes before the buffer is filled. The socket-level read
    /// timeout is kept short so the deadline is enforceable rather than
    /// blocking past it inside a single underlying read.
    fn read_exact_with_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        self.stream.set_read_timeout(Some(Duration::from_millis(200)))?;
        let mut filled = 0;
        while filled < buf.len() {
            match self.stream.read(&mut buf[filled..]) {
                Ok(0) => return Err(Error::new(ErrorKind::UnexpectedEof, "connection closed")),
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut => {
                    if Instant::now() >= deadline {
                        return Err(Error::new(ErrorKind::TimedOut, "read timed out"));
                    }
                }
                Err(err) => return Err(err),
            }
        }
        self.stream.set_read_timeout(None)?;
        Ok(())
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        self.stream.peer_addr().ok()
    }

    fn close(&self) -> Result<()> {
        self.stream.shutdown(Shutdown::Both)
    }
}
