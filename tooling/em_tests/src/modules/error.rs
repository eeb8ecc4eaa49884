use std::path::PathBuf;

use ovmrex_common::Address;
use ovmrex_em::call_frame::OperationKind;

/// Problems with a test definition itself, as opposed to the behaviour it checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixtureError {
    #[error("Failed to read {path:?}: {reason}")]
    FailedToReadFile { path: PathBuf, reason: String },
    #[error("Failed to read directory {path:?}: {reason}")]
    FailedToReadDirectory { path: PathBuf, reason: String },
    #[error("Failed to parse test file {path:?}: {reason}")]
    FailedToParseTestFile { path: PathBuf, reason: String },
    #[error("Unresolved placeholder `{token}` at {path}")]
    UnresolvedPlaceholder { token: String, path: String },
    #[error("Malformed test definition: {0}")]
    MalformedDefinition(String),
    #[error("Storage is seeded for {0:#x}, which has no account")]
    StorageWithoutAccount(Address),
    #[error("Unknown function `{name}` at {path}")]
    UnknownFunction { name: String, path: String },
    #[error("Invalid parameters for {function} at {path}: {reason}")]
    InvalidParams {
        function: OperationKind,
        path: String,
        reason: String,
    },
    #[error("{function} at {path} does not take sub-steps")]
    UnexpectedSubSteps { function: OperationKind, path: String },
    #[error("Invalid expected return value at {path}: {reason}")]
    InvalidExpectedValue { path: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),
    #[error("Failed to read config file {path:?}: {reason}")]
    FailedToReadConfig { path: PathBuf, reason: String },
    #[error("Failed to parse config file {path:?}: {reason}")]
    FailedToParseConfig { path: PathBuf, reason: String },
    #[error("Failed to create report file: {0}")]
    FailedToCreateReportFile(String),
    #[error("Failed to write report: {0}")]
    FailedToWriteReport(String),
}
