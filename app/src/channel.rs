//! Transport to the device: the CDC ACM tty in the real setup, TCP toward
//! an emulated device.

use std::{
    fs::{File, OpenOptions},
    io::{self, Read, Write},
    net::{TcpStream, ToSocketAddrs},
    os::fd::{AsRawFd, RawFd},
    os::unix::fs::OpenOptionsExt,
    path::Path,
    thread,
    time::Duration,
};
use termios::Termios;

pub enum Link {
    Serial(File),
    Tcp(TcpStream),
}

impl Link {
    /// Opens the CDC ACM character device in raw mode.
    pub fn open_serial<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(path)?;
        {
            let fd = file.as_raw_fd();
            let mut tty = Termios::from_fd(fd)?;
            termios::cfmakeraw(&mut tty);
            termios::tcsetattr(fd, termios::TCSAFLUSH, &tty)?;
        }
        Ok(Self::Serial(file))
    }

    /// Connects to an emulated device, retrying while it comes up.
    pub fn connect<A: ToSocketAddrs + Clone>(addr: A) -> io::Result<Self> {
        loop {
            match TcpStream::connect(addr.clone()) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    return Ok(Self::Tcp(stream));
                }
                Err(err) if err.kind() == io::ErrorKind::ConnectionRefused => {
                    thread::sleep(Duration::from_millis(100));
                }
                Err(err) => return Err(err),
            }
        }
    }

    pub fn try_clone(&self) -> io::Result<Self> {
        match self {
            Self::Serial(file) => file.try_clone().map(Self::Serial),
            Self::Tcp(stream) => stream.try_clone().map(Self::Tcp),
        }
    }
}

impl Read for Link {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Serial(file) => file.read(buf),
            Self::Tcp(stream) => stream.read(buf),
        }
    }
}

impl Write for Link {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Serial(file) => file.write(buf),
            Self::Tcp(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Serial(file) => file.flush(),
            Self::Tcp(stream) => stream.flush(),
        }
    }
}

impl AsRawFd for Link {
    fn as_raw_fd(&self) -> RawFd {
        match self {
            Self::Serial(file) => file.as_raw_fd(),
            Self::Tcp(stream) => stream.as_raw_fd(),
        }
    }
}
