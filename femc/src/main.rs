//! Front-end monitor and control entry point (SPEC_FULL.md §0, §10).
//!
//! Loads configuration, builds the device-state registry and driver
//! set, starts the background monitor threads, and serves requests
//! over a minimal framed TCP listener until asked to exit.

mod bus;
mod frame;

use std::io::ErrorKind as IoErrorKind;
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use femc_config::Config;
use femc_monitor::Monitors;
use femc_registry::{FrontEnd, PaLimitsTable};
use femc_router::{Drivers, Router};

#[derive(Parser)]
#[command(name = "femc", about = "Front-end monitor and control", version)]
struct Args {
    /// Path to the INI configuration file.
    #[arg(long, default_value = "femc.ini")]
    config: PathBuf,

    /// Overrides the config file's `listenAddress`.
    #[arg(long)]
    listen: Option<String>,

    /// Runs entirely against simulated drivers; never opens `/dev/mem`.
    #[arg(long)]
    simulate: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = Config::load(&args.config)?;
    let listen_address = args.listen.clone().unwrap_or_else(|| config.listen_address.clone());

    let front_end = Arc::new(FrontEnd::new());
    restore_nv_image(&config.nv_image_path, &front_end);

    let drivers = if args.simulate {
        log::info!("starting in simulation mode, no hardware will be touched");
        Drivers::simulated()
    } else {
        bus::hardware_drivers(config.bus_base_address)?
    };

    let monitors = Monitors::spawn(
        front_end.clone(),
        drivers.cryostat.clone(),
        drivers.lo.clone(),
        drivers.power.clone(),
        drivers.fetim.clone(),
    );

    let router = Arc::new(Router::new(front_end.clone(), drivers, config.nv_image_path.clone()));

    let listener = TcpListener::bind(&listen_address)?;
    log::info!("listening on {listen_address}");

    for stream in listener.incoming() {
        if router.shutdown_requested.load(Ordering::SeqCst) {
            break;
        }
        match stream {
            Ok(stream) => {
                let router = router.clone();
                std::thread::spawn(move || serve_connection(stream, router));
            }
            Err(err) => log::warn!("accept failed: {err}"),
        }
    }

    log::info!("shutting down");
    monitors.shutdown();
    Ok(())
}

/// One connection, one thread: frames are read and answered in order,
/// matching the original front end's one-request-at-a-time CAN
/// handling (spec.md §4.1).
fn serve_connection(mut stream: TcpStream, router: Arc<Router>) {
    stream.set_read_timeout(Some(Duration::from_secs(30))).ok();
    loop {
        let request = match frame::read_frame(&mut stream) {
            Ok(frame) => frame,
            Err(err) if err.kind() == IoErrorKind::UnexpectedEof => return,
            Err(err) => {
                log::warn!("bad frame, closing connection: {err}");
                return;
            }
        };

        match router.dispatch(request.address, request.payload) {
            Some(reply) => {
                if let Err(err) = frame::write_reply(&mut stream, &reply) {
                    log::warn!("failed to write reply: {err}");
                    return;
                }
            }
            None => {
                // Oversized monitor request: spec.md §4.1 says drop it
                // silently, no reply at all.
            }
        }

        if router.shutdown_requested.load(Ordering::SeqCst) {
            return;
        }
    }
}

/// Restores the PA-limits tables persisted by `SET_WRITE_NV_MEMORY` on
/// a previous run (spec.md §3, §6). A missing or unreadable image just
/// means the tables start out empty; this is the normal case on first
/// boot, not an error worth failing startup over.
fn restore_nv_image(path: &PathBuf, front_end: &FrontEnd) {
    let image = match femc_config::NvImage::load(path) {
        Ok(image) => image,
        Err(err) => {
            log::info!("no usable non-volatile image at {}: {err}", path.display());
            return;
        }
    };

    let mut tables = front_end.pa_limits.lock().unwrap();
    for (cartridge, [pol0, pol1]) in image.pa_limits.into_iter().enumerate() {
        if let Some(slot) = tables.get_mut(cartridge) {
            slot[0] = PaLimitsTable::from_entries(pol0);
            slot[1] = PaLimitsTable::from_entries(pol1);
        }
    }
}
