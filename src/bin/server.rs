//! gcdb server binary: open the engine, build the index, serve TCP.

use std::sync::Arc;

use clap::Parser;
use gcdb::constants::MB;
use gcdb::network::Server;
use gcdb::Engine;
use tracing_subscriber::{fmt, EnvFilter};

/// gcdb server
#[derive(Parser, Debug)]
#[command(name = "gcdb-server")]
#[command(about = "Embedded JSON document store with a line-oriented TCP front end")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./gcdb_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:19999")]
    listen: String,

    /// Capacity a fresh data file is grown to, in MiB
    #[arg(short, long, default_value = "64")]
    capacity_mb: usize,

    /// Serve point lookups by collection scan instead of the index
    #[arg(long)]
    no_index: bool,
}

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,gcdb=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();
    tracing::info!(data_dir = %args.data_dir, listen = %args.listen, "starting gcdb");

    let engine = Engine::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .file_capacity(args.capacity_mb * MB)
        .indexed_reads(!args.no_index)
        .open();
    let engine = match engine {
        Ok(engine) => Arc::new(engine),
        Err(err) => {
            tracing::error!(%err, "failed to open engine");
            std::process::exit(1);
        }
    };

    if let Err(err) = Server::new(engine).run() {
        tracing::error!(%err, "server error");
        std::process::exit(1);
    }
}
