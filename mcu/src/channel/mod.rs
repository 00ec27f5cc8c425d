#[cfg(feature = "real")]
mod vcp;
#[cfg(feature = "real")]
pub use vcp::*;

#[cfg(feature = "fake")]
mod tcp;
#[cfg(feature = "fake")]
pub use tcp::*;

use crate::error::Error;

/// Byte-stream command transport. USB CDC on hardware, TCP in emulation.
pub trait Channel {
    /// Non-blocking poll for received bytes. `Ok(0)` means nothing is
    /// pending this tick.
    fn poll_read(&mut self, buf: &mut [u8]) -> Result<usize, Error>;

    /// Attempts one transmission. `ErrorKind::NotReady` means the endpoint
    /// is busy and the call may be retried.
    fn try_send(&mut self, data: &[u8]) -> Result<(), Error>;
}
