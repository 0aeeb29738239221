use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-symbol lifecycle inside one batch.
///
/// `Pending -> Fetching -> Normalizing -> Computing -> Persisting -> Succeeded`,
/// with `Failed` reachable from any non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolStage {
    Pending,
    Fetching,
    Normalizing,
    Computing,
    Persisting,
    Succeeded,
    Failed,
}

impl SymbolStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SymbolStage::Succeeded | SymbolStage::Failed)
    }

    /// The stage that follows this one on the success path.
    pub fn next(&self) -> Option<SymbolStage> {
        match self {
            SymbolStage::Pending => Some(SymbolStage::Fetching),
            SymbolStage::Fetching => Some(SymbolStage::Normalizing),
            SymbolStage::Normalizing => Some(SymbolStage::Computing),
            SymbolStage::Computing => Some(SymbolStage::Persisting),
            SymbolStage::Persisting => Some(SymbolStage::Succeeded),
            SymbolStage::Succeeded | SymbolStage::Failed => None,
        }
    }
}

impl fmt::Display for SymbolStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SymbolStage::Pending => "pending",
            SymbolStage::Fetching => "fetching",
            SymbolStage::Normalizing => "normalizing",
            SymbolStage::Computing => "computing",
            SymbolStage::Persisting => "persisting",
            SymbolStage::Succeeded => "succeeded",
            SymbolStage::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// A symbol that did not make it through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedSymbol {
    pub symbol: String,
    /// Stage the symbol was in when the error occurred.
    pub stage: SymbolStage,
    pub reason: String,
}

/// Outcome of one batch invocation. Not persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub succeeded: Vec<String>,
    pub failed: Vec<FailedSymbol>,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Human summary, e.g. "Fetched 2 out of 3 stocks".
    pub fn summary(&self) -> String {
        format!("Fetched {} out of {} stocks", self.succeeded.len(), self.total())
    }
}
