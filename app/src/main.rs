mod channel;
mod client;

use channel::Link;
use clap::Parser;
use client::Client;
use common::{
    config::{gpio_mode, ADC_CHANNELS, BATCH_LEN},
    packing::SampleBatch,
};
use std::{
    io::{self, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

#[derive(Parser, Debug)]
#[command(name = "ripple")]
#[command(about = "Stream packed 12-bit ADC sample pairs from the sampler")]
struct Args {
    /// CDC ACM device of the sampler
    #[arg(short = 'd', long = "device", default_value = "/dev/ttyACM0")]
    device: String,

    /// Connect to an emulated device over TCP instead (defaults to the
    /// address the fakedev runner listens on)
    #[arg(long, num_args = 0..=1, default_missing_value = common::config::CHANNEL_ADDR)]
    tcp: Option<String>,

    /// Skip the analog input pin setup
    #[arg(long)]
    no_pins: bool,

    /// Skip the periodic sample-rate line
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
        eprintln!("\ninterrupted, stopping");
    })?;

    let link = match &args.tcp {
        Some(addr) => {
            log::info!("connecting to emulated device at {}", addr);
            Link::connect(addr.as_str())?
        }
        None => {
            log::info!("opening {}", args.device);
            Link::open_serial(&args.device)?
        }
    };
    let mut client = Client::new(link)?;

    if !args.no_pins {
        // Both ADC input pairs go to the analog mux.
        client.configure_gpio(0, 1 << 6, gpio_mode::ANALOG, None)?;
        client.configure_gpio(0, 1 << 7, gpio_mode::ANALOG, None)?;
        client.configure_gpio(1, 1 << 0, gpio_mode::ANALOG, None)?;
        client.configure_gpio(1, 1 << 1, gpio_mode::ANALOG, None)?;
    }

    client.configure_dma()?;
    client.configure_adc()?;
    client.trigger_adc()?;
    log::info!("sampler armed, entering streaming mode");
    client.start_stream()?;

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    let mut rows: SampleBatch = [[0; ADC_CHANNELS]; BATCH_LEN];
    let mut out = [0u8; BATCH_LEN * ADC_CHANNELS * 2];
    let mut window_start = Instant::now();
    let mut window_rows: u64 = 0;

    while running.load(Ordering::SeqCst) {
        client.read_batch(&mut rows)?;

        for (slot, row) in out.chunks_exact_mut(4).zip(rows.iter()) {
            slot[0..2].copy_from_slice(&row[0].to_le_bytes());
            slot[2..4].copy_from_slice(&row[1].to_le_bytes());
        }
        stdout.write_all(&out)?;
        stdout.flush()?;

        window_rows += BATCH_LEN as u64;
        let elapsed = window_start.elapsed();
        if !args.quiet && elapsed >= Duration::from_secs(1) {
            eprintln!(
                "{} samples per second",
                (window_rows as f64 / elapsed.as_secs_f64()) as u64
            );
            window_start = Instant::now();
            window_rows = 0;
        }
    }

    Ok(())
}
