#![no_std]

pub mod error;
pub use error::Error;

#[cfg(feature = "real")]
mod hal;

#[cfg(feature = "panic")]
mod panic;

pub mod board;
pub mod channel;
pub mod dispatch;
pub mod spin;

extern crate alloc;

#[cfg(any(test, feature = "fake"))]
extern crate std;
