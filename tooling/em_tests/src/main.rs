use std::time::Instant;

use clap::Parser;
use colored::Colorize;
use em_tests::modules::{
    parser::{RunnerOptions, parse_tests},
    placeholders::default_aliases,
    report::{Summary, print_reports, write_report},
    runner::run_tests,
};
use eyre::{WrapErr, bail};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> eyre::Result<()> {
    let options = RunnerOptions::parse();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(tracing::Level::INFO.into())
                .from_env_lossy(),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .wrap_err("setting default subscriber failed")?;

    let config = options.engine_config()?;

    let parsing_time = Instant::now();
    let tests = parse_tests(&options)?;
    info!(
        tests = tests.len(),
        elapsed = ?parsing_time.elapsed(),
        "Parsed test definitions"
    );

    let running_time = Instant::now();
    let reports = run_tests(&tests, &default_aliases(), &config);
    print_reports(&reports);

    let summary = Summary::from_reports(&reports);
    println!("{summary}");
    println!(
        "{} {:?}",
        "Finished in".bold(),
        running_time.elapsed()
    );

    if let Some(path) = &options.report {
        write_report(path, &reports)?;
        info!(?path, "Report written");
    }

    if !summary.is_success() {
        bail!(
            "{} parameter set(s) failed, {} errored, {} fixture error(s)",
            summary.failed,
            summary.errored,
            summary.fixture_errors
        );
    }
    Ok(())
}
