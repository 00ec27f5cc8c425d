//! TCP stand-in for the USB CDC link: the device listens, the host connects.

extern crate std;

use super::Channel;
use crate::error::{Error, ErrorKind};
use std::{
    io::{self, Read, Write},
    net::{TcpListener, TcpStream, ToSocketAddrs},
    thread,
    time::Duration,
};

const POLL_PERIOD: Duration = Duration::from_micros(100);

pub struct TcpChannel {
    stream: TcpStream,
}

impl TcpChannel {
    /// Binds `addr` and waits for the single host connection.
    pub fn listen<A: ToSocketAddrs>(addr: A) -> Result<Self, Error> {
        Self::accept(&TcpListener::bind(addr)?)
    }

    /// Waits for the next host connection on an already-bound listener.
    pub fn accept(listener: &TcpListener) -> Result<Self, Error> {
        let (stream, peer) = listener.accept()?;
        log::info!("host connected from {}", peer);
        stream.set_nodelay(true)?;
        stream.set_nonblocking(true)?;
        Ok(Self { stream })
    }
}

impl Channel for TcpChannel {
    fn poll_read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        match self.stream.read(buf) {
            Ok(0) => Err(ErrorKind::Disconnected.into()),
            Ok(len) => Ok(len),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(POLL_PERIOD);
                Ok(0)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn try_send(&mut self, data: &[u8]) -> Result<(), Error> {
        self.stream.set_nonblocking(false)?;
        let result = self
            .stream
            .write_all(data)
            .and_then(|()| self.stream.flush());
        self.stream.set_nonblocking(true)?;
        result.map_err(Error::from)
    }
}
