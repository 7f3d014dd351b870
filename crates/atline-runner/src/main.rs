//! atline reference runner.
//!
//! Binds a TCP port and serves the demo command table to one client at a
//! time, the way a device would expose its command interface over a UART:
//!
//! ```text
//! $ atline --port 4330 &
//! $ nc localhost 4330
//! AT+PING
//! OK
//! AT+NAME=BOX1
//! OK
//! AT+NAME?
//! +NAME: BOX1
//! OK
//! ```

use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, info, warn};

use atline_engine::{AtEngine, EngineConfig, DEFAULT_LINE_CAPACITY};
use atline_runner::commands::demo_commands;
use atline_runner::transport::TcpTransport;

/// Delay between poll ticks while a client is connected.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Serve a demo AT command table over a TCP-exposed serial stream.
#[derive(Debug, Parser)]
#[command(name = "atline")]
struct Args {
    /// TCP port to listen on.
    #[arg(long, default_value_t = 4330)]
    port: u16,

    /// Line buffer capacity in bytes.
    #[arg(long, default_value_t = DEFAULT_LINE_CAPACITY)]
    capacity: usize,

    /// Command terminator.
    #[arg(long, value_enum, default_value = "crlf")]
    terminator: Terminator,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Terminator {
    /// Carriage return + line feed.
    Crlf,
    /// Carriage return only.
    Cr,
    /// Line feed only.
    Lf,
}

impl Terminator {
    fn bytes(self) -> Vec<u8> {
        match self {
            Terminator::Crlf => b"\r\n".to_vec(),
            Terminator::Cr => vec![b'\r'],
            Terminator::Lf => vec![b'\n'],
        }
    }
}

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let commands = demo_commands();
    let config = EngineConfig {
        capacity: args.capacity,
        terminator: args.terminator.bytes(),
    };
    let mut engine: AtEngine<'_, TcpTransport> = AtEngine::new(&commands, config);

    let listener = TcpListener::bind(("0.0.0.0", args.port))?;
    info!(port = args.port, "listening");

    loop {
        let (stream, peer) = match listener.accept() {
            Ok(accepted) => accepted,
            Err(err) => {
                warn!("accept failed: {err}");
                continue;
            }
        };
        info!(%peer, "client connected");

        match TcpTransport::new(stream) {
            Ok(transport) => engine.attach(transport),
            Err(err) => {
                warn!("failed to set up transport: {err}");
                continue;
            }
        }

        // One client at a time; poll until the peer hangs up.
        loop {
            if let Some(transport) = engine.transport_mut() {
                transport.pump();
            }
            if let Err(err) = engine.service() {
                debug!("command cycle failed: {err}");
            }
            match engine.transport() {
                Some(transport) if transport.is_closed() => break,
                Some(_) => thread::sleep(POLL_INTERVAL),
                None => break,
            }
        }

        engine.detach();
        engine.reset();
        info!(%peer, "client disconnected");
    }
}
