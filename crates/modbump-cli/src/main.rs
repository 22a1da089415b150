use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use modbump_registry::{DEFAULT_PROXY_URL, DEFAULT_TIMEOUT};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod dispatch;
mod render;
mod runner;
mod upgrade;

use crate::render::ColorChoice;

#[derive(Parser, Debug)]
#[command(name = "modbump", version)]
#[command(
    about = "Upgrade go.mod dependencies without letting the go directive move",
    long_about = None
)]
struct Cli {
    /// Manifest to inspect; `go get` runs in its directory.
    #[arg(long, default_value = "go.mod")]
    modfile: PathBuf,
    /// Module proxy queried for `<module>/@latest`.
    #[arg(long, default_value = DEFAULT_PROXY_URL)]
    proxy: String,
    #[arg(long = "go", value_name = "BIN", default_value = "go")]
    go_binary: PathBuf,
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,
    /// Report newer versions without running `go get`.
    #[arg(long)]
    check: bool,
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(env_filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match dispatch::run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
