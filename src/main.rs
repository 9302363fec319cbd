use std::io;

use anyhow::Context;
use clap::Parser;
use rusty_ledger::config::{CliArgs, Config};
use rusty_ledger::{run, run_async, telemetry};

fn main() -> anyhow::Result<()> {
    let cli = CliArgs::parse();
    let config = Config::load(&cli)?;
    telemetry::init(&config.logging);

    tracing::info!(input = %cli.input.display(), use_async = cli.use_async, "replaying ledger");
    let stdout = io::stdout().lock();
    if cli.use_async {
        let rt = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
        rt.block_on(run_async(&cli.input, stdout, &config.auth))
            .map_err(|e| anyhow::anyhow!(e))?;
    } else {
        run(&cli.input, stdout, &config.auth).map_err(|e| anyhow::anyhow!("{e}"))?;
    }
    Ok(())
}
