//! USB CDC virtual com port transport, backed by the vendor device stack.

use super::Channel;
use crate::{
    error::{Error, ErrorKind},
    hal::RetCode,
};

extern "C" {
    /// Copies pending CDC receive data into `buf`; returns the byte count.
    fn sampler_vcp_poll(buf: *mut u8, cap: u32) -> u32;
    /// Queues one CDC transmission; fails while the endpoint is busy.
    fn sampler_vcp_send(data: *const u8, len: u32) -> RetCode;
}

#[derive(Default)]
pub struct VcpChannel {
    _private: [u8; 0],
}

impl VcpChannel {
    pub fn new() -> Self {
        Self { _private: [] }
    }
}

impl Channel for VcpChannel {
    fn poll_read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        Ok(unsafe { sampler_vcp_poll(buf.as_mut_ptr(), buf.len() as u32) } as usize)
    }

    fn try_send(&mut self, data: &[u8]) -> Result<(), Error> {
        match unsafe { sampler_vcp_send(data.as_ptr(), data.len() as u32) } {
            RetCode::Success => Ok(()),
            RetCode::Failure => Err(ErrorKind::NotReady.into()),
        }
    }
}
