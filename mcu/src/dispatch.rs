//! Command dispatch and the terminal streaming loop.

use crate::{
    board::{BatchReady, BoardIface, Level, PinMode, Port, SampleBatch},
    channel::Channel,
    error::{Error, ErrorKind},
    spin::Spin,
};
use common::{
    config::{ADC_CHANNELS, BATCH_LEN, PACKED_BATCH_LEN, REPLY_LEN, RX_BUFFER_LEN, SEND_RETRY_BUDGET},
    packing,
    proto::{self, Command, Opcode, Reply},
};

/// Device context: the command loop and everything it owns.
///
/// Receive and transmit staging are separate buffers, and the sample table
/// and completion flag live here rather than in globals. The flag is the
/// only state shared with interrupt context.
pub struct Dispatcher<B: BoardIface, C: Channel> {
    board: B,
    channel: C,
    rx: [u8; RX_BUFFER_LEN],
    tx: [u8; REPLY_LEN],
    samples: SampleBatch,
    packed: [u8; PACKED_BATCH_LEN],
    batch_ready: BatchReady,
    batch_wait: Spin,
    send_retry: Spin,
}

impl<B: BoardIface, C: Channel> Dispatcher<B, C> {
    pub fn new(board: B, channel: C) -> Self {
        Self::with_batch_wait(board, channel, Spin::forever())
    }

    /// Like [`new`](Self::new) but with a caller-chosen DMA-completion
    /// wait, so a harness can tear down a streaming device instead of
    /// resetting it.
    pub fn with_batch_wait(board: B, channel: C, batch_wait: Spin) -> Self {
        Self {
            board,
            channel,
            rx: [0; RX_BUFFER_LEN],
            tx: [0; REPLY_LEN],
            samples: [[0; ADC_CHANNELS]; BATCH_LEN],
            packed: [0; PACKED_BATCH_LEN],
            batch_ready: BatchReady::new(),
            batch_wait,
            send_retry: Spin::bounded(SEND_RETRY_BUDGET),
        }
    }

    /// Polls and dispatches until the transport dies or a bounded wait
    /// expires. On hardware neither happens and the loop never returns.
    pub fn run(mut self) -> Result<(), Error> {
        log::info!("enter command loop");
        loop {
            self.step()?;
        }
    }

    /// One poll tick: at most one command is decoded and handled to
    /// completion, reply included.
    pub fn step(&mut self) -> Result<(), Error> {
        let data_len = self.channel.poll_read(&mut self.rx)?;
        match Command::decode(&self.rx, data_len) {
            Some(cmd) => self.dispatch(cmd),
            None => Ok(()),
        }
    }

    fn dispatch(&mut self, cmd: Command) -> Result<(), Error> {
        match cmd.opcode() {
            Some(Opcode::CfgGpioPin) => {
                let status = self.configure_gpio(&cmd)?;
                self.reply(cmd.code, status)
            }
            Some(Opcode::CfgDma) => {
                self.board.setup_dma(self.batch_ready.clone())?;
                self.reply(cmd.code, proto::STATUS_OK)
            }
            Some(Opcode::CfgAdc) => {
                self.board.setup_adc()?;
                self.reply(cmd.code, proto::STATUS_OK)
            }
            Some(Opcode::TriggerAdc) => {
                self.board.trigger_adc()?;
                self.reply(cmd.code, proto::STATUS_OK)
            }
            Some(Opcode::ReadAdc) => self.stream(),
            None => {
                log::debug!("unknown command 0x{:04x}, ignored", cmd.code);
                Ok(())
            }
        }
    }

    /// CFG_GPIO_PIN: validate the group, reconfigure the pins, and drive
    /// them when the frame carried the optional level word.
    fn configure_gpio(&mut self, cmd: &Command) -> Result<u32, Error> {
        let port = match Port::try_from(cmd.args[0]) {
            Ok(port) => port,
            Err(()) => return Ok(proto::STATUS_BAD_GROUP),
        };
        self.board
            .configure_pins(port, cmd.args[1], PinMode(cmd.args[2]))?;
        if cmd.has_args(4) {
            self.board
                .write_pins(port, cmd.args[1], Level::from(cmd.args[3]))?;
        }
        Ok(proto::STATUS_OK)
    }

    fn reply(&mut self, code: u32, status: u32) -> Result<(), Error> {
        Reply { code, status }.encode(&mut self.tx);
        send_with_retry(&mut self.channel, self.send_retry, &self.tx)
    }

    /// READ_ADC: terminal streaming. One packed batch per 0→1 transition
    /// of the completion flag; the flag is cleared exactly once per batch,
    /// after packing and before the send.
    fn stream(&mut self) -> Result<(), Error> {
        log::info!("enter streaming mode");
        let ready = self.batch_ready.clone();
        loop {
            self.batch_wait.wait(|| ready.is_set())?;
            self.board.fetch_batch(&mut self.samples)?;
            packing::pack_batch(&self.samples, &mut self.packed);
            self.batch_ready.clear();
            send_with_retry(&mut self.channel, self.send_retry, &self.packed)?;
        }
    }
}

/// Retries a transmission within the iteration budget. Budget exhaustion
/// is swallowed: on the wire a failed send is indistinguishable from a
/// successful one. Transport errors other than busy do propagate.
fn send_with_retry<C: Channel>(channel: &mut C, retry: Spin, data: &[u8]) -> Result<(), Error> {
    let mut fatal = None;
    let _ = retry.wait(|| match channel.try_send(data) {
        Ok(()) => true,
        Err(err) if err.kind == ErrorKind::NotReady => false,
        Err(err) => {
            fatal = Some(err);
            true
        }
    });
    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
