mod cmd;
mod config;
mod modules;
mod types;

use crate::{
    cmd::{
        crawl::{self, CrawlArgs},
        fetch::{self, FetchArgs},
        reconcile::{self, ReconcileArgs},
        server::{self, ServerArgs},
    },
    config::Config,
};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::{env, str::FromStr};
use tokio::runtime::Builder;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::{self, time::OffsetTime},
};

#[derive(Debug, Parser)]
#[command(name = "coderadar")]
#[command(about = "CodeRadar: Codeforces and LeetCode contest tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the contest API and keep contests up to date.
    Server(ServerArgs),
    /// Ingest contests from every platform once.
    Crawl(CrawlArgs),
    /// Print the contests one platform currently lists.
    Fetch(FetchArgs),
    /// Advance stored contest statuses once.
    Reconcile(ReconcileArgs),
}

fn main() {
    dotenv().ok();

    let log_level = env::var("RUST_LOG").unwrap_or(String::from("info"));
    let filter = EnvFilter::builder()
        .with_default_directive(
            LevelFilter::from_str(&log_level)
                .unwrap_or(LevelFilter::INFO)
                .into(),
        )
        .from_env_lossy();
    let format = fmt::format()
        .with_level(true)
        .with_target(true)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_timer(OffsetTime::local_rfc_3339().expect("couldn't determine local UTC offset"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(format)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime");

    let cli = Cli::parse();
    let config = Config::from_env().expect("invalid configuration");

    match cli.command {
        Commands::Server(args) => runtime.block_on(server::run(args, config)),
        Commands::Crawl(args) => runtime.block_on(crawl::run(args, config)),
        Commands::Fetch(args) => runtime.block_on(fetch::run(args, config)),
        Commands::Reconcile(args) => runtime.block_on(reconcile::run(args, config)),
    }
    .expect("command failed");
}
