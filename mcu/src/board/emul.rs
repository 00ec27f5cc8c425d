//! Software stand-in for the analog frontend.
//!
//! GPIO calls are recorded in a registry a test can inspect, and a paced
//! generator thread plays the role of the circular DMA engine: it fills
//! the sample table with a deterministic pattern, performs the interrupt
//! handler's single atomic flag store, and does not begin the next pass
//! until the consumer has cleared the flag.

extern crate std;

use super::{BatchReady, BoardIface, Level, PinMode, Port, SampleBatch};
use crate::error::Error;
use common::config::{ADC_CHANNELS, BATCH_LEN};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread,
    time::Duration,
    vec::Vec,
};

const PASS_POLL_PERIOD: Duration = Duration::from_micros(50);

/// Record of one port-init driver call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GpioConfig {
    pub port: Port,
    pub pins: u32,
    pub mode: u32,
}

/// Record of one immediate set/reset driver call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GpioWrite {
    pub port: Port,
    pub pins: u32,
    pub level: Level,
}

#[derive(Default)]
struct Registry {
    gpio_configs: Vec<GpioConfig>,
    gpio_writes: Vec<GpioWrite>,
    dma_configs: usize,
    adc_configs: usize,
    triggers: usize,
    workers_started: usize,
}

pub struct EmulBoard {
    registry: Arc<Mutex<Registry>>,
    table: Arc<Mutex<SampleBatch>>,
    dma: Option<BatchReady>,
    adc_ready: bool,
    worker: Option<Worker>,
}

struct Worker {
    stop: Arc<AtomicBool>,
    thread: thread::JoinHandle<()>,
}

/// Test-side view of the emulated board.
#[derive(Clone)]
pub struct EmulHandle {
    registry: Arc<Mutex<Registry>>,
}

impl EmulHandle {
    pub fn gpio_configs(&self) -> Vec<GpioConfig> {
        self.registry.lock().unwrap().gpio_configs.clone()
    }

    pub fn gpio_writes(&self) -> Vec<GpioWrite> {
        self.registry.lock().unwrap().gpio_writes.clone()
    }

    pub fn dma_configs(&self) -> usize {
        self.registry.lock().unwrap().dma_configs
    }

    pub fn adc_configs(&self) -> usize {
        self.registry.lock().unwrap().adc_configs
    }

    pub fn triggers(&self) -> usize {
        self.registry.lock().unwrap().triggers
    }

    pub fn workers_started(&self) -> usize {
        self.registry.lock().unwrap().workers_started
    }

    pub fn dma_armed(&self) -> bool {
        self.registry.lock().unwrap().dma_configs > 0
    }
}

impl EmulBoard {
    pub fn new() -> (Self, EmulHandle) {
        let registry = Arc::new(Mutex::new(Registry::default()));
        (
            Self {
                registry: registry.clone(),
                table: Arc::new(Mutex::new([[0; ADC_CHANNELS]; BATCH_LEN])),
                dma: None,
                adc_ready: false,
                worker: None,
            },
            EmulHandle { registry },
        )
    }

    /// Conversion values produced by the emulated frontend for `row` of
    /// circular pass `pass`.
    pub fn sample_pattern(pass: usize, row: usize) -> [u16; ADC_CHANNELS] {
        let ch0 = ((pass * 37 + row) & 0xfff) as u16;
        [ch0, 0xfff - ch0]
    }

    fn start_worker(&mut self) {
        let ready = match &self.dma {
            Some(ready) => ready.clone(),
            None => return,
        };
        let table = self.table.clone();
        let stop = Arc::new(AtomicBool::new(false));
        let thread = thread::spawn({
            let stop = stop.clone();
            move || {
                let mut pass = 0;
                while !stop.load(Ordering::Acquire) {
                    {
                        let mut table = table.lock().unwrap();
                        for (row, slot) in table.iter_mut().enumerate() {
                            *slot = EmulBoard::sample_pattern(pass, row);
                        }
                    }
                    ready.set();
                    while ready.is_set() {
                        if stop.load(Ordering::Acquire) {
                            return;
                        }
                        thread::sleep(PASS_POLL_PERIOD);
                    }
                    pass += 1;
                }
            }
        });
        self.worker = Some(Worker { stop, thread });
        self.registry.lock().unwrap().workers_started += 1;
    }

    fn stop_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.stop.store(true, Ordering::Release);
            let _ = worker.thread.join();
        }
    }
}

impl BoardIface for EmulBoard {
    fn configure_pins(&mut self, port: Port, pins: u32, mode: PinMode) -> Result<(), Error> {
        self.registry.lock().unwrap().gpio_configs.push(GpioConfig {
            port,
            pins,
            mode: mode.0,
        });
        Ok(())
    }

    fn write_pins(&mut self, port: Port, pins: u32, level: Level) -> Result<(), Error> {
        self.registry
            .lock()
            .unwrap()
            .gpio_writes
            .push(GpioWrite { port, pins, level });
        Ok(())
    }

    fn setup_dma(&mut self, ready: BatchReady) -> Result<(), Error> {
        self.stop_worker();
        ready.clear();
        self.dma = Some(ready);
        self.registry.lock().unwrap().dma_configs += 1;
        Ok(())
    }

    fn setup_adc(&mut self) -> Result<(), Error> {
        // Calibration completes instantly here.
        self.adc_ready = true;
        self.registry.lock().unwrap().adc_configs += 1;
        Ok(())
    }

    fn trigger_adc(&mut self) -> Result<(), Error> {
        self.registry.lock().unwrap().triggers += 1;
        if self.adc_ready && self.worker.is_none() {
            self.start_worker();
        }
        Ok(())
    }

    fn fetch_batch(&mut self, out: &mut SampleBatch) -> Result<(), Error> {
        *out = *self.table.lock().unwrap();
        Ok(())
    }
}

impl Drop for EmulBoard {
    fn drop(&mut self) {
        self.stop_worker();
    }
}
