//! Raw bindings to the C support layer linked into the firmware image.

use crate::hal::RetCode;

extern "C" {
    /// Reconfigures the mode of the pins in `pins` on port `group`,
    /// leaving the port's other pins untouched. The mode word is passed
    /// through to the port driver as-is.
    pub fn sampler_gpio_configure(group: u32, pins: u32, mode: u32) -> RetCode;
    pub fn sampler_gpio_bits_set(group: u32, pins: u32);
    pub fn sampler_gpio_bits_reset(group: u32, pins: u32);

    /// Resets the DMA channel and arms it: peripheral-to-memory from the
    /// ADC ordinary-data register into `dst`, halfword width on both
    /// sides, `transfer_count` units, high priority, loop mode, with the
    /// transfer-complete interrupt and the channel enabled.
    pub fn sampler_dma_arm(dst: *mut u16, transfer_count: u32) -> RetCode;

    /// Configures the ADC: independent mode, sequence scan with repeat
    /// conversion, right-aligned data, the given ordinary channel sequence
    /// at the fixed long sample time, software ordinary trigger, DMA
    /// delivery enabled. Leaves the converter enabled but uncalibrated.
    pub fn sampler_adc_configure(channels: *const u32, count: u32) -> RetCode;

    pub fn sampler_adc_calibration_init();
    pub fn sampler_adc_calibration_init_busy() -> bool;
    pub fn sampler_adc_calibration_start();
    pub fn sampler_adc_calibration_busy() -> bool;

    pub fn sampler_adc_software_trigger();
}
