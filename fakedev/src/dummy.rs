//! Standalone emulated device, for driving the host client by hand:
//! `cargo run -p ripple-fakedev --bin run`, then `ripple --tcp`.

use mcu::{board::EmulBoard, channel::TcpChannel, dispatch::Dispatcher};
use std::net::TcpListener;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let listener = TcpListener::bind(common::config::CHANNEL_ADDR).unwrap();
    log::info!("emulated device listening on {}", common::config::CHANNEL_ADDR);
    loop {
        let (board, _handle) = EmulBoard::new();
        let channel = match TcpChannel::accept(&listener) {
            Ok(channel) => channel,
            Err(err) => {
                log::warn!("accept failed: {}", err);
                continue;
            }
        };
        if let Err(err) = Dispatcher::new(board, channel).run() {
            log::warn!("device stopped: {}", err);
        }
    }
}
