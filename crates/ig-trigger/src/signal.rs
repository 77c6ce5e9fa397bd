//! Host signals that may trigger a roll

use serde::{Deserialize, Serialize};

/// Summary of one finished test run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TestRunSummary {
    pub passed: u32,
    pub failed: u32,
    pub errored: u32,
}

impl TestRunSummary {
    pub fn new(passed: u32, failed: u32, errored: u32) -> Self {
        Self {
            passed,
            failed,
            errored,
        }
    }

    /// Something passed and nothing failed or errored
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errored == 0 && self.passed > 0
    }
}

/// A signal from the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerSignal {
    /// A task process ended; `None` when the host did not report an exit code
    TaskEnded { exit_code: Option<i32> },
    /// Test results changed; most recent run first
    TestResults { runs: Vec<TestRunSummary> },
    /// The user ran the gamble command
    Manual,
}

impl TriggerSignal {
    /// Whether this signal reports a success
    pub fn is_success(&self) -> bool {
        match self {
            Self::TaskEnded { exit_code } => *exit_code == Some(0),
            Self::TestResults { runs } => runs.first().is_some_and(TestRunSummary::is_success),
            Self::Manual => true,
        }
    }
}
