use std::path::{Path, PathBuf};

use clap::Parser;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use ovmrex_em::environment::OvmConfig;

use crate::modules::{
    error::{FixtureError, RunnerError},
    types::RawTest,
};

/// Command line flags for runner execution.
#[derive(Parser, Debug)]
pub struct RunnerOptions {
    /// For running tests in a specific file (could be either a directory or a .json)
    #[arg(short, long, value_name = "PATH", default_value = "./vectors")]
    pub path: PathBuf,
    /// For running tests in specific .json files. If this is not empty, "path" flag will be ignored.
    #[arg(short, long, value_name = "JSON_FILES", value_delimiter = ',')]
    pub json_files: Vec<PathBuf>,
    /// For skipping certain .json files
    #[arg(long, value_name = "SKIP_FILES", value_delimiter = ',')]
    pub skip_files: Vec<PathBuf>,
    /// Chain id served by ovmCHAINID unless a definition overrides it.
    /// Takes precedence over the config file, which defaults to 420.
    #[arg(long, env = "OVM_CHAIN_ID")]
    pub chain_id: Option<u64>,
    /// Engine configuration file (JSON). Flags take precedence over it.
    #[arg(long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,
    /// Write a plain text report of every test to this file
    #[arg(long, value_name = "REPORT_FILE")]
    pub report: Option<PathBuf>,
}

impl RunnerOptions {
    /// Engine configuration from `--config` with the flags that were given applied on top.
    pub fn engine_config(&self) -> Result<OvmConfig, RunnerError> {
        let config = match &self.config {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|err| {
                    RunnerError::FailedToReadConfig {
                        path: path.clone(),
                        reason: err.to_string(),
                    }
                })?;
                serde_json::from_str::<OvmConfig>(&content).map_err(|err| {
                    RunnerError::FailedToParseConfig {
                        path: path.clone(),
                        reason: err.to_string(),
                    }
                })?
            }
            None => OvmConfig::default(),
        };
        Ok(self.apply_flags(config))
    }

    pub fn apply_flags(&self, config: OvmConfig) -> OvmConfig {
        match self.chain_id {
            Some(chain_id) => config.with_chain_id(chain_id),
            None => config,
        }
    }
}

/// A file holds either a single definition or a list of them.
pub fn parse_file(path: &Path) -> Result<Vec<RawTest>, FixtureError> {
    debug!(?path, "Parsing file");
    let content =
        std::fs::read_to_string(path).map_err(|err| FixtureError::FailedToReadFile {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
    parse_content(path, &content)
}

/// Step trees nest three JSON levels per frame, deeper than serde_json's
/// default recursion limit allows. The limit is lifted and the stack grows
/// on demand instead.
fn parse_json(content: &str) -> Result<Value, serde_json::Error> {
    let mut deserializer = serde_json::Deserializer::from_str(content);
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}

/// Splits the contents of a test file into its definitions.
pub fn parse_content(path: &Path, content: &str) -> Result<Vec<RawTest>, FixtureError> {
    let value = parse_json(content).map_err(|err| FixtureError::FailedToParseTestFile {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;

    let definitions = match value {
        Value::Array(definitions) => definitions,
        definition => vec![definition],
    };
    definitions
        .into_iter()
        .map(|definition| {
            let name = definition
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| FixtureError::FailedToParseTestFile {
                    path: path.to_path_buf(),
                    reason: "test definition has no name".to_string(),
                })?
                .to_string();
            Ok(RawTest {
                path: path.to_path_buf(),
                name,
                definition,
            })
        })
        .collect()
}

/// Parse a directory of tests into a Vec<RawTest>.
pub fn parse_dir(
    path: &Path,
    skipped_files: &[PathBuf],
    only_files: &[PathBuf],
) -> Result<Vec<RawTest>, FixtureError> {
    debug!(?path, "Parsing test directory");
    let read_dir_error = |err: std::io::Error| FixtureError::FailedToReadDirectory {
        path: path.to_path_buf(),
        reason: err.to_string(),
    };
    let dir_entries = std::fs::read_dir(path)
        .map_err(read_dir_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_dir_error)?;

    // Process directory entries in parallel
    let directory_tests_results: Vec<_> = dir_entries
        .into_par_iter()
        .map(|entry| -> Result<Vec<RawTest>, FixtureError> {
            let entry_path = entry.path();
            if entry_path.is_dir() {
                return parse_dir(&entry_path, skipped_files, only_files);
            }
            let file_name = PathBuf::from(entry.file_name());
            let is_json_file = entry_path.extension().is_some_and(|ext| ext == "json");
            let is_skipped = skipped_files.contains(&file_name);
            // If only certain files were supposed to be parsed make sure this file is among them.
            let is_selected = only_files.is_empty() || only_files.contains(&file_name);
            if is_json_file && !is_skipped && is_selected {
                return parse_file(&entry_path);
            }
            Ok(Vec::new())
        })
        .collect();

    let mut tests = directory_tests_results
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?
        .concat();
    // Directory order is platform dependent.
    tests.sort_by(|a, b| (&a.path, &a.name).cmp(&(&b.path, &b.name)));
    Ok(tests)
}

/// Initiates the parser with the corresponding option flags.
pub fn parse_tests(options: &RunnerOptions) -> Result<Vec<RawTest>, FixtureError> {
    if options.path.extension().is_some_and(|ext| ext == "json") {
        return parse_file(&options.path);
    }
    parse_dir(&options.path, &options.skip_files, &options.json_files)
}
