use brrtargs::cli::{run_cli, Cli};
use brrtargs::logging::{init_logging_with_config, LogConfig};
use brrtargs::runtime_config::RuntimeConfig;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging_with_config(&LogConfig::from_env())?;
    RuntimeConfig::from_env().apply();
    run_cli(cli)
}
