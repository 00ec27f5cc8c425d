use super::raw;
use crate::{
    board::{BatchReady, BoardIface, Level, PinMode, Port, SampleBatch},
    error::Error,
    spin::Spin,
};
use common::config::{ADC_CHANNELS, ADC_SEQUENCE, BATCH_LEN, DMA_TRANSFER_COUNT};
use core::{
    cell::UnsafeCell,
    ptr,
    sync::atomic::{AtomicBool, AtomicPtr, Ordering},
};

struct SampleTable(UnsafeCell<SampleBatch>);
// Written by DMA hardware, read by the streaming loop.
unsafe impl Sync for SampleTable {}

static SAMPLE_TABLE: SampleTable = SampleTable(UnsafeCell::new([[0; ADC_CHANNELS]; BATCH_LEN]));

/// Completion-flag slot consulted by the transfer-complete interrupt.
static READY_SLOT: AtomicPtr<AtomicBool> = AtomicPtr::new(ptr::null_mut());

/// DMA transfer-complete hook, called once per circular pass from the
/// vendor IRQ handler. The single atomic store is its only effect.
#[no_mangle]
pub extern "C" fn sampler_dma_transfer_complete() {
    let slot = READY_SLOT.load(Ordering::Acquire);
    if !slot.is_null() {
        unsafe { &*slot }.store(true, Ordering::Release);
    }
}

static ACQUIRED: AtomicBool = AtomicBool::new(false);

pub struct Board {
    // Keeps the flag behind READY_SLOT alive.
    ready: Option<BatchReady>,
}

/// Hands out the board singleton. `None` after the first call.
pub fn handle() -> Option<Board> {
    if ACQUIRED.swap(true, Ordering::SeqCst) {
        None
    } else {
        Some(Board { ready: None })
    }
}

fn group_of(port: Port) -> u32 {
    match port {
        Port::A => 0,
        Port::B => 1,
    }
}

impl BoardIface for Board {
    fn configure_pins(&mut self, port: Port, pins: u32, mode: PinMode) -> Result<(), Error> {
        unsafe { raw::sampler_gpio_configure(group_of(port), pins, mode.0) }.into_result()
    }

    fn write_pins(&mut self, port: Port, pins: u32, level: Level) -> Result<(), Error> {
        match level {
            Level::High => unsafe { raw::sampler_gpio_bits_set(group_of(port), pins) },
            Level::Low => unsafe { raw::sampler_gpio_bits_reset(group_of(port), pins) },
        }
        Ok(())
    }

    fn setup_dma(&mut self, ready: BatchReady) -> Result<(), Error> {
        READY_SLOT.store(ready.as_ptr() as *mut AtomicBool, Ordering::Release);
        self.ready = Some(ready);
        unsafe { raw::sampler_dma_arm(SAMPLE_TABLE.0.get() as *mut u16, DMA_TRANSFER_COUNT as u32) }
            .into_result()
    }

    fn setup_adc(&mut self) -> Result<(), Error> {
        unsafe { raw::sampler_adc_configure(ADC_SEQUENCE.as_ptr(), ADC_SEQUENCE.len() as u32) }
            .into_result()?;
        // Vendor-mandated calibration sequence; both waits are unbounded.
        unsafe { raw::sampler_adc_calibration_init() };
        Spin::forever().wait(|| unsafe { !raw::sampler_adc_calibration_init_busy() })?;
        unsafe { raw::sampler_adc_calibration_start() };
        Spin::forever().wait(|| unsafe { !raw::sampler_adc_calibration_busy() })?;
        Ok(())
    }

    fn trigger_adc(&mut self) -> Result<(), Error> {
        unsafe { raw::sampler_adc_software_trigger() };
        Ok(())
    }

    fn fetch_batch(&mut self, out: &mut SampleBatch) -> Result<(), Error> {
        // The circular transfer keeps running during this copy; the table
        // holds most-recent data, not a frozen pass.
        *out = unsafe { ptr::read_volatile(SAMPLE_TABLE.0.get()) };
        Ok(())
    }
}
