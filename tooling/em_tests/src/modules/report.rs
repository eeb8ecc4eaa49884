use std::{fmt, fs::OpenOptions, io::Write, path::PathBuf};

use colored::Colorize;

use crate::modules::{error::RunnerError, result_check::Mismatch};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterResult {
    Passed,
    Skipped,
    Failed(Mismatch),
    /// The engine aborted the execution.
    Errored(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterReport {
    pub name: String,
    pub result: ParameterResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestReport {
    pub name: String,
    pub path: PathBuf,
    /// Set when the definition could not be turned into runnable steps.
    pub fixture_error: Option<String>,
    pub parameters: Vec<ParameterReport>,
}

impl TestReport {
    pub fn passed(&self) -> bool {
        self.fixture_error.is_none()
            && self.parameters.iter().all(|parameter| {
                matches!(
                    parameter.result,
                    ParameterResult::Passed | ParameterResult::Skipped
                )
            })
    }

    pub fn count(&self, predicate: impl Fn(&ParameterResult) -> bool) -> usize {
        self.parameters
            .iter()
            .filter(|parameter| predicate(&parameter.result))
            .count()
    }
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Test: {} ({})", self.name, self.path.display())?;
        if let Some(error) = &self.fixture_error {
            writeln!(f, "    fixture error: {error}")?;
        }
        for parameter in &self.parameters {
            match &parameter.result {
                ParameterResult::Passed => writeln!(f, "    [PASS] {}", parameter.name)?,
                ParameterResult::Skipped => writeln!(f, "    [SKIP] {}", parameter.name)?,
                ParameterResult::Failed(mismatch) => {
                    writeln!(f, "    [FAIL] {}: {mismatch}", parameter.name)?
                }
                ParameterResult::Errored(error) => {
                    writeln!(f, "    [ERROR] {}: {error}", parameter.name)?
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errored: usize,
    pub fixture_errors: usize,
}

impl Summary {
    pub fn from_reports(reports: &[TestReport]) -> Self {
        let mut summary = Summary {
            tests: reports.len(),
            ..Default::default()
        };
        for report in reports {
            if report.fixture_error.is_some() {
                summary.fixture_errors += 1;
            }
            summary.passed += report.count(|r| matches!(r, ParameterResult::Passed));
            summary.failed += report.count(|r| matches!(r, ParameterResult::Failed(_)));
            summary.skipped += report.count(|r| matches!(r, ParameterResult::Skipped));
            summary.errored += report.count(|r| matches!(r, ParameterResult::Errored(_)));
        }
        summary
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errored == 0 && self.fixture_errors == 0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} tests: {} {} {} {} {}",
            "Summary:".bold(),
            self.tests,
            format!("{} passed", self.passed).green(),
            format!("{} failed", self.failed).red(),
            format!("{} errored", self.errored).red(),
            format!("{} fixture errors", self.fixture_errors).yellow(),
            format!("{} skipped", self.skipped).cyan(),
        )
    }
}

/// Prints one line per test and the failing parameter sets.
pub fn print_reports(reports: &[TestReport]) {
    for report in reports {
        if report.passed() {
            println!("{} {}", "PASS".green().bold(), report.name);
        } else {
            println!("{} {}", "FAIL".red().bold(), report.name);
            print!("{report}");
        }
    }
}

pub fn write_report(path: &PathBuf, reports: &[TestReport]) -> Result<(), RunnerError> {
    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .create(true)
        .open(path)
        .map_err(|err| RunnerError::FailedToCreateReportFile(err.to_string()))?;
    let mut content = String::new();
    for report in reports {
        content.push_str(&report.to_string());
    }
    content.push_str(&format!("{:?}\n", Summary::from_reports(reports)));
    file.write_all(content.as_bytes())
        .map_err(|err| RunnerError::FailedToWriteReport(err.to_string()))
}
