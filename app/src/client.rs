//! Command round-trips and the batch stream.

use crate::channel::Link;
use common::{
    config::{PACKED_BATCH_LEN, REPLY_LEN},
    packing::{self, SampleBatch},
    proto::{self, Reply},
};
use std::{
    io::{Read, Write},
    time::Duration,
};
use thiserror::Error;
use timeout_readwrite::TimeoutReader;

const READ_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("sent command 0x{sent:04x} but the reply echoed 0x{echoed:04x}")]
    EchoMismatch { sent: u32, echoed: u32 },
    #[error("command 0x{code:04x} failed with status {status}")]
    Failed { code: u32, status: u32 },
}

pub struct Client {
    reader: TimeoutReader<Link>,
    writer: Link,
}

impl Client {
    pub fn new(link: Link) -> Result<Self, ClientError> {
        let writer = link.try_clone()?;
        Ok(Self {
            reader: TimeoutReader::new(link, READ_TIMEOUT),
            writer,
        })
    }

    pub fn configure_gpio(
        &mut self,
        group: u32,
        pins: u32,
        mode: u32,
        level: Option<u32>,
    ) -> Result<(), ClientError> {
        let mut args = [group, pins, mode, 0];
        let count = match level {
            Some(level) => {
                args[3] = level;
                4
            }
            None => 3,
        };
        self.command(proto::CFG_GPIO_PIN, &args[..count])
    }

    pub fn configure_dma(&mut self) -> Result<(), ClientError> {
        self.command(proto::CFG_DMA, &[])
    }

    pub fn configure_adc(&mut self) -> Result<(), ClientError> {
        self.command(proto::CFG_ADC, &[])
    }

    pub fn trigger_adc(&mut self) -> Result<(), ClientError> {
        self.command(proto::TRIGGER_ADC, &[])
    }

    /// Puts the device into streaming mode. There is no reply and no way
    /// back short of a device reset.
    pub fn start_stream(&mut self) -> Result<(), ClientError> {
        self.send(proto::READ_ADC, &[])
    }

    /// Reads and unpacks the next 3072-byte batch.
    pub fn read_batch(&mut self, rows: &mut SampleBatch) -> Result<(), ClientError> {
        let mut packed = [0u8; PACKED_BATCH_LEN];
        self.reader.read_exact(&mut packed)?;
        packing::unpack_batch(&packed, rows);
        Ok(())
    }

    fn send(&mut self, code: u32, args: &[u32]) -> Result<(), ClientError> {
        let mut buf = [0u8; 4 + 4 * proto::CMD_MAX_ARGS];
        let len = proto::encode_command(code, args, &mut buf);
        self.writer.write_all(&buf[..len])?;
        self.writer.flush()?;
        Ok(())
    }

    fn command(&mut self, code: u32, args: &[u32]) -> Result<(), ClientError> {
        self.send(code, args)?;
        let mut buf = [0u8; REPLY_LEN];
        self.reader.read_exact(&mut buf)?;
        let reply = Reply::decode(&buf).expect("reply buffer is reply-sized");
        if reply.code != code {
            return Err(ClientError::EchoMismatch {
                sent: code,
                echoed: reply.code,
            });
        }
        if reply.status != proto::STATUS_OK {
            return Err(ClientError::Failed {
                code,
                status: reply.status,
            });
        }
        Ok(())
    }
}
