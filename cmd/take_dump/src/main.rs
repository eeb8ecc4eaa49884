use std::{fs, path::PathBuf};

use clap::Parser;
use eyre::WrapErr;
use ovmrex_common::{constants::DEFAULT_CHAIN_ID, types::RollupDeployConfig};
use ovmrex_em::genesis::make_state_dump;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DUMP_FILE_NAME: &str = "state-dump.latest.json";

/// Deploys the system contracts into an empty state and writes the result.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Options {
    #[arg(long = "chain-id", env = "CHAIN_ID", default_value_t = DEFAULT_CHAIN_ID)]
    chain_id: u64,
    #[arg(long = "output-dir", value_name = "DIR", default_value = "build/dumps")]
    output_dir: PathBuf,
}

fn main() -> eyre::Result<()> {
    let options = Options::parse();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(tracing::Level::INFO.into())
                .from_env_lossy(),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .wrap_err("setting default subscriber failed")?;

    let config = RollupDeployConfig::with_chain_id(options.chain_id);
    let dump = make_state_dump(&config).wrap_err("Failed to deploy the system contracts")?;
    info!(
        chain_id = options.chain_id,
        accounts = dump.accounts.len(),
        "Built state dump"
    );

    fs::create_dir_all(&options.output_dir)
        .wrap_err_with(|| format!("Failed to create {:?}", options.output_dir))?;
    let path = options.output_dir.join(DUMP_FILE_NAME);
    let json = dump.to_json_pretty().wrap_err("Failed to serialize the state dump")?;
    fs::write(&path, json).wrap_err_with(|| format!("Failed to write {path:?}"))?;
    info!(?path, "State dump written");
    Ok(())
}
