//! Test harness: an emulated device behind a real TCP byte stream.

use common::{
    config::{PACKED_BATCH_LEN, REPLY_LEN},
    proto::{self, Reply},
};
use mcu::{
    board::{EmulBoard, EmulHandle},
    channel::TcpChannel,
    dispatch::Dispatcher,
    error::{Error, ErrorKind},
    spin::Spin,
};
use std::{
    io::{self, Read, Write},
    net::{SocketAddr, TcpListener, TcpStream},
    thread,
    time::Duration,
};

/// Iteration budget for the device's DMA-completion wait. Generous, but
/// it expires, so an abandoned streaming device can still be joined.
const BATCH_WAIT_BUDGET: usize = 5_000_000;

pub struct FakeDevice {
    pub addr: SocketAddr,
    pub board: EmulHandle,
    thread: thread::JoinHandle<Result<(), Error>>,
}

impl FakeDevice {
    /// Spawns an emulated device listening on an ephemeral local port.
    pub fn spawn() -> Self {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .is_test(true)
            .try_init();

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (board, handle) = EmulBoard::new();
        let thread = thread::spawn(move || {
            let channel = TcpChannel::accept(&listener)?;
            Dispatcher::with_batch_wait(board, channel, Spin::bounded(BATCH_WAIT_BUDGET)).run()
        });
        Self {
            addr,
            board: handle,
            thread,
        }
    }

    /// Connects a raw wire-level host.
    pub fn connect(&self) -> HostLink {
        HostLink::connect(self.addr)
    }

    /// Waits for the device loop to exit and returns its verdict.
    pub fn join(self) -> Result<(), Error> {
        self.thread.join().expect("device thread panicked")
    }

    /// Joins a device whose host has gone away. Depending on where the
    /// loop was, that surfaces as a dead link or an expired wait.
    pub fn join_disconnected(self) {
        let err = self.join().unwrap_err();
        assert!(
            matches!(err.kind, ErrorKind::Disconnected | ErrorKind::TimedOut),
            "unexpected exit: {:?}",
            err.kind,
        );
    }
}

/// Byte-level client speaking the wire format directly.
pub struct HostLink {
    stream: TcpStream,
}

const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

impl HostLink {
    fn connect(addr: SocketAddr) -> Self {
        let stream = loop {
            match TcpStream::connect(addr) {
                Ok(stream) => break stream,
                Err(err) if err.kind() == io::ErrorKind::ConnectionRefused => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(err) => panic!("connect failed: {}", err),
            }
        };
        stream.set_nodelay(true).unwrap();
        stream
            .set_read_timeout(Some(DEFAULT_READ_TIMEOUT))
            .unwrap();
        Self { stream }
    }

    pub fn send_command(&mut self, code: u32, args: &[u32]) {
        let mut buf = [0u8; 4 + 4 * proto::CMD_MAX_ARGS];
        let len = proto::encode_command(code, args, &mut buf);
        self.stream.write_all(&buf[..len]).unwrap();
    }

    pub fn send_bytes(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).unwrap();
    }

    pub fn read_reply(&mut self) -> Reply {
        let mut buf = [0u8; REPLY_LEN];
        self.stream.read_exact(&mut buf).unwrap();
        Reply::decode(&buf).unwrap()
    }

    /// `None` if the device stays silent for `window`.
    pub fn try_read_byte(&mut self, window: Duration) -> Option<u8> {
        self.stream.set_read_timeout(Some(window)).unwrap();
        let mut byte = [0u8; 1];
        let result = match self.stream.read(&mut byte) {
            Ok(0) => panic!("device closed the link"),
            Ok(_) => Some(byte[0]),
            Err(err)
                if err.kind() == io::ErrorKind::WouldBlock
                    || err.kind() == io::ErrorKind::TimedOut =>
            {
                None
            }
            Err(err) => panic!("read failed: {}", err),
        };
        self.stream
            .set_read_timeout(Some(DEFAULT_READ_TIMEOUT))
            .unwrap();
        result
    }

    pub fn read_batch(&mut self) -> [u8; PACKED_BATCH_LEN] {
        let mut buf = [0u8; PACKED_BATCH_LEN];
        self.stream.read_exact(&mut buf).unwrap();
        buf
    }
}
