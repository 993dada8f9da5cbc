//! Per-run metadata returned alongside the answer.

use levain_core::ToolResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model produced an `Answer:` within the turn budget.
    AnswerFound,
    /// The budget ran out on an inconclusive turn; the answer came from
    /// the extra forced-conclusion call.
    MaxTurnsReached,
    /// The budget ran out right after a tool call.
    MaxTurnsExceeded,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AnswerFound => "answer_found",
            Self::MaxTurnsReached => "max_turns_reached",
            Self::MaxTurnsExceeded => "max_turns_exceeded",
        };
        f.write_str(s)
    }
}

/// One dispatched tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// One-based turn the action was issued on
    pub turn: usize,
    pub tool: String,
    pub args: Map<String, Value>,
    pub result: ToolResult,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Correlates log lines for one run
    pub run_id: Uuid,

    /// Turns consumed, counting the turn that produced the answer
    pub turns: usize,

    /// Provider calls made, including a forced-conclusion call
    pub inference_calls: usize,

    /// Dispatched actions, in order
    pub actions_taken: Vec<ActionRecord>,

    pub stopped_reason: StopReason,
}
