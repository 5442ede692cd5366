use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};

use sinkhole::filter::Blocklist;
use sinkhole::logging::init_logging;
use sinkhole::resolver::{Resolver, ResolverConfig};
use sinkhole::server::{DEFAULT_PORT, Server};

/// Exit status when the listening socket cannot be bound.
const EXIT_BIND_FAILED: u8 = 2;

#[derive(Parser)]
#[command(name = "sinkhole")]
#[command(about = "Iterative DNS resolver with a domain blocklist", long_about = None)]
struct Args {
    /// File with one blocked domain per line
    blocklist: Option<PathBuf>,

    /// Local port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Bind address
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Per-attempt upstream timeout in milliseconds
    #[arg(long, default_value_t = 1500)]
    timeout_ms: u64,

    /// Sends per upstream server before giving up on it
    #[arg(long, default_value_t = 3)]
    attempts: u32,

    /// Maximum number of servers queried per request
    #[arg(long, default_value_t = 16)]
    max_iterations: u32,

    /// Log upstream timeouts and per-request resolution details
    #[arg(short, long)]
    verbose: bool,
}

fn load_blocklist(path: Option<&PathBuf>) -> Blocklist {
    let Some(path) = path else {
        info!("no blocklist given, blocking disabled");
        return Blocklist::new();
    };

    match Blocklist::from_file(path) {
        Ok(blocklist) => blocklist,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read blocklist, blocking disabled");
            Blocklist::new()
        }
    }
}

async fn run(args: Args) -> ExitCode {
    let bind_addr = SocketAddr::new(args.bind, args.port);
    let config = ResolverConfig {
        timeout: Duration::from_millis(args.timeout_ms),
        max_attempts: args.attempts,
        max_iterations: args.max_iterations,
        ..ResolverConfig::default()
    };

    let blocklist = load_blocklist(args.blocklist.as_ref());
    let resolver = Resolver::new(blocklist, config);

    let server = match Server::bind(bind_addr, resolver).await {
        Ok(server) => server,
        Err(e) => {
            error!(addr = %bind_addr, error = %e, "failed to bind listening socket");
            return ExitCode::from(EXIT_BIND_FAILED);
        }
    };

    server.run().await;

    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(if args.verbose { "debug" } else { "info" });

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to start runtime");
            return ExitCode::FAILURE;
        }
    };

    rt.block_on(run(args))
}
