#[cfg(feature = "real")]
mod real;
#[cfg(feature = "real")]
pub use real::*;

#[cfg(feature = "fake")]
mod emul;
#[cfg(feature = "fake")]
pub use emul::*;

use crate::error::Error;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

pub use common::packing::SampleBatch;

/// GPIO port group selector. Only groups 0 and 1 exist on this board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Port {
    A,
    B,
}

impl TryFrom<u32> for Port {
    type Error = ();

    fn try_from(group: u32) -> Result<Self, ()> {
        match group {
            0 => Ok(Self::A),
            1 => Ok(Self::B),
            _ => Err(()),
        }
    }
}

/// Raw vendor mode word, forwarded to the port driver unvalidated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinMode(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl From<u32> for Level {
    fn from(raw: u32) -> Self {
        if raw == 0 {
            Self::Low
        } else {
            Self::High
        }
    }
}

/// DMA pass-complete flag.
///
/// Set once per circular pass from interrupt context (a single atomic
/// store is the only mutation allowed there) and cleared exactly once by
/// the streaming loop after the batch has been packed.
#[derive(Clone)]
pub struct BatchReady(Arc<AtomicBool>);

impl BatchReady {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    #[cfg(feature = "real")]
    pub(crate) fn as_ptr(&self) -> *const AtomicBool {
        Arc::as_ptr(&self.0)
    }
}

impl Default for BatchReady {
    fn default() -> Self {
        Self::new()
    }
}

/// The peripheral set behind the command protocol: two GPIO ports, the
/// ADC ordinary-conversion sequence and the circular DMA feeding the
/// sample table.
pub trait BoardIface {
    /// Reconfigures the mode of exactly the pins set in `pins`, leaving
    /// the port's other pins untouched.
    fn configure_pins(&mut self, port: Port, pins: u32, mode: PinMode) -> Result<(), Error>;

    /// Drives the pins set in `pins` to `level`.
    fn write_pins(&mut self, port: Port, pins: u32, level: Level) -> Result<(), Error>;

    /// Arms the circular DMA transfer from the ADC data register into the
    /// sample table and registers `ready` with the transfer-complete
    /// interrupt. Re-invocation reconfigures from scratch.
    fn setup_dma(&mut self, ready: BatchReady) -> Result<(), Error>;

    /// Configures the ADC conversion sequence and runs the mandated
    /// calibration. Leaves the ADC armed and idle; re-invocation
    /// reconfigures from scratch.
    fn setup_adc(&mut self) -> Result<(), Error>;

    /// Issues the ordinary-conversion software trigger.
    fn trigger_adc(&mut self) -> Result<(), Error>;

    /// Copies the current contents of the sample table into `out`.
    fn fetch_batch(&mut self, out: &mut SampleBatch) -> Result<(), Error>;
}
