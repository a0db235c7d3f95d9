#![allow(clippy::print_stderr)]

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;

use jvz_cli::args::CliArgs;
use jvz_cli::config::resolve_settings;
use jvz_cli::driver;

#[cfg(not(target_arch = "wasm32"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> Result<()> {
    // JVZ_LOG / RUST_LOG, with JVZ_LOG_FORMAT=text|tree|json.
    jvz_core::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let settings = resolve_settings(&args, std::io::stdout().is_terminal())?;

    let stdout = std::io::stdout();
    let stdin = std::io::stdin();
    let status = driver::execute(&settings, &mut stdout.lock(), &mut stdin.lock())?;
    std::process::exit(status);
}
