/// Number of ADC channels in the ordinary conversion sequence.
pub const ADC_CHANNELS: usize = 2;

/// Rows per streamed batch, one row per conversion cycle.
pub const BATCH_LEN: usize = 1024;

/// DMA transfer units per circular pass, in halfwords.
pub const DMA_TRANSFER_COUNT: usize = BATCH_LEN * ADC_CHANNELS;

/// Bytes per streamed batch: two 12-bit samples packed into 3 bytes per row.
pub const PACKED_BATCH_LEN: usize = 3 * BATCH_LEN;

/// ADC input channels, in sequence order.
pub const ADC_SEQUENCE: [u32; ADC_CHANNELS] = [6, 7];

/// Size of the command receive buffer.
pub const RX_BUFFER_LEN: usize = 4096;

/// Fixed reply size for configuration commands.
pub const REPLY_LEN: usize = 8;

/// Transmit retry budget. Iteration count, not time.
pub const SEND_RETRY_BUDGET: usize = 50_000;

/// Vendor GPIO mode words. Forwarded to the port driver unvalidated.
pub mod gpio_mode {
    pub const INPUT: u32 = 0x00;
    pub const ANALOG: u32 = 0x03;
    pub const MUX: u32 = 0x08;
    pub const OUTPUT: u32 = 0x10;

    pub const PULL_NONE: u32 = 0x04;
    pub const PULL_UP: u32 = 0x18;
    pub const PULL_DOWN: u32 = 0x28;
}

#[cfg(feature = "fake")]
pub const CHANNEL_ADDR: &str = "localhost:4590";
