#[cfg(feature = "fake")]
extern crate std;

use core::fmt;
use derive_more::From;
#[cfg(feature = "fake")]
use std::io;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Generic failure reported by the platform layer.
    Failure,
    /// User provided invalid input.
    InvalidInput,
    /// The endpoint is busy; the operation may be retried.
    NotReady,
    /// The transport link is gone.
    Disconnected,
    /// A bounded wait ran out of budget.
    TimedOut,
}

#[derive(Debug, From)]
pub enum ErrorSource {
    None,
    #[cfg(feature = "fake")]
    Io(io::Error),
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub source: ErrorSource,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            source: ErrorSource::None,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

#[cfg(feature = "fake")]
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::WouldBlock => ErrorKind::NotReady,
            io::ErrorKind::TimedOut => ErrorKind::TimedOut,
            io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => ErrorKind::Disconnected,
            _ => ErrorKind::Failure,
        };
        Self {
            kind,
            source: ErrorSource::Io(err),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            ErrorSource::None => write!(f, "{:?}", self.kind),
            #[cfg(feature = "fake")]
            ErrorSource::Io(err) => write!(f, "{:?}: {}", self.kind, err),
        }
    }
}
