//! Configuration-command behavior over the real wire format.

use common::{
    config::gpio_mode,
    proto::{self, Reply},
};
use fakedev::FakeDevice;
use mcu::board::{Level, Port};
use std::time::Duration;

const SILENCE: Duration = Duration::from_millis(200);

#[test]
fn configure_and_drive_pin() {
    let dev = FakeDevice::spawn();
    let mut host = dev.connect();

    host.send_command(proto::CFG_GPIO_PIN, &[0, 0x0001, gpio_mode::OUTPUT, 1]);
    assert_eq!(
        host.read_reply(),
        Reply {
            code: proto::CFG_GPIO_PIN,
            status: proto::STATUS_OK,
        }
    );

    let configs = dev.board.gpio_configs();
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].port, Port::A);
    assert_eq!(configs[0].pins, 0x0001);
    assert_eq!(configs[0].mode, gpio_mode::OUTPUT);

    let writes = dev.board.gpio_writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].port, Port::A);
    assert_eq!(writes[0].pins, 0x0001);
    assert_eq!(writes[0].level, Level::High);

    drop(host);
    dev.join_disconnected();
}

#[test]
fn bad_group_is_rejected_without_hardware_calls() {
    let dev = FakeDevice::spawn();
    let mut host = dev.connect();

    host.send_command(proto::CFG_GPIO_PIN, &[2, 0x0001, gpio_mode::OUTPUT]);
    assert_eq!(
        host.read_reply(),
        Reply {
            code: proto::CFG_GPIO_PIN,
            status: proto::STATUS_BAD_GROUP,
        }
    );
    assert!(dev.board.gpio_configs().is_empty());
    assert!(dev.board.gpio_writes().is_empty());

    // The device keeps dispatching afterwards.
    host.send_command(proto::CFG_DMA, &[]);
    assert_eq!(
        host.read_reply(),
        Reply {
            code: proto::CFG_DMA,
            status: proto::STATUS_OK,
        }
    );

    drop(host);
    dev.join_disconnected();
}

#[test]
fn short_frame_is_silently_ignored() {
    let dev = FakeDevice::spawn();
    let mut host = dev.connect();

    host.send_bytes(&[0x00, 0x10]);
    assert_eq!(host.try_read_byte(SILENCE), None);
    assert!(dev.board.gpio_configs().is_empty());
    assert_eq!(dev.board.dma_configs(), 0);
    assert_eq!(dev.board.adc_configs(), 0);

    // Still polling: the next well-formed command goes through.
    host.send_command(proto::CFG_ADC, &[]);
    assert_eq!(
        host.read_reply(),
        Reply {
            code: proto::CFG_ADC,
            status: proto::STATUS_OK,
        }
    );

    drop(host);
    dev.join_disconnected();
}

#[test]
fn unknown_opcode_is_silently_ignored() {
    let dev = FakeDevice::spawn();
    let mut host = dev.connect();

    host.send_command(0x1005, &[]);
    assert_eq!(host.try_read_byte(SILENCE), None);

    host.send_command(proto::CFG_DMA, &[]);
    assert_eq!(
        host.read_reply(),
        Reply {
            code: proto::CFG_DMA,
            status: proto::STATUS_OK,
        }
    );

    drop(host);
    dev.join_disconnected();
}

#[test]
fn each_config_command_acts_and_replies_once() {
    let dev = FakeDevice::spawn();
    let mut host = dev.connect();

    for code in [proto::CFG_DMA, proto::CFG_ADC, proto::TRIGGER_ADC] {
        host.send_command(code, &[]);
        assert_eq!(
            host.read_reply(),
            Reply {
                code,
                status: proto::STATUS_OK,
            }
        );
    }
    assert_eq!(dev.board.dma_configs(), 1);
    assert_eq!(dev.board.adc_configs(), 1);
    assert_eq!(dev.board.triggers(), 1);
    assert_eq!(host.try_read_byte(SILENCE), None);

    drop(host);
    dev.join_disconnected();
}

#[test]
fn reconfiguration_is_idempotent() {
    let dev = FakeDevice::spawn();
    let mut host = dev.connect();

    for code in [proto::CFG_DMA, proto::CFG_DMA, proto::CFG_ADC, proto::CFG_ADC] {
        host.send_command(code, &[]);
        assert_eq!(
            host.read_reply(),
            Reply {
                code,
                status: proto::STATUS_OK,
            }
        );
    }
    // One reply each, no duplicates, and the board is simply armed.
    assert_eq!(host.try_read_byte(SILENCE), None);
    assert_eq!(dev.board.dma_configs(), 2);
    assert_eq!(dev.board.adc_configs(), 2);
    assert!(dev.board.dma_armed());
    assert_eq!(dev.board.workers_started(), 0);

    drop(host);
    dev.join_disconnected();
}
