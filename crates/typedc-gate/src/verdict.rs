use std::fmt;

use serde::{Deserialize, Serialize};
use typedc_diff::CheckSummary;

/// Pass/fail decision for a CI run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "camelCase")]
pub enum Verdict {
    Pass,
    /// At least one unsuppressed breaking issue remains.
    Fail { breaking: usize },
}

impl Verdict {
    pub fn from_summary(summary: &CheckSummary) -> Self {
        match summary.breaking {
            0 => Self::Pass,
            breaking => Self::Fail { breaking },
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("No compatibility issues"),
            Self::Fail { breaking } => write!(f, "There are {breaking} compatibility issues"),
        }
    }
}
