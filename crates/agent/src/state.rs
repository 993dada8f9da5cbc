//! Loop state machine.
//!
//! Each run moves through these states:
//!
//! ```text
//!             ┌────────────── Observed ◄── ActionPending
//!             ▼                                 ▲
//!  start ─► Thinking ── Action ─────────────────┘
//!             │
//!             ├── Answer ─────────────────────────────► Done(answer_found)
//!             ├── no marker ──► Inconclusive ──(turns left)──► Thinking
//!             │                      └──(last turn)──► ForceConclude ─► Done(max_turns_reached)
//!             └── (turn budget spent after an action) ─► Done(max_turns_exceeded)
//! ```
//!
//! [`transition`] is pure: it decides the next step from one classified
//! turn. The controller in [`crate::react`] performs the side effects.

use crate::protocol::{ActionInvocation, TurnOutput};

/// What the controller should do after classifying a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Stop with this answer.
    Finish(String),
    /// Dispatch the tool call, append the observation, then continue.
    Dispatch(ActionInvocation),
    /// Nothing actionable; run another turn.
    Continue,
    /// Last inconclusive turn; ask the model for one final answer.
    ForceConclude,
}

/// Where a run currently is. Used for logging and tests.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopState {
    /// Waiting on the provider for turn `turn` (zero-based).
    Thinking { turn: usize },
    /// A tool call was parsed and is about to be dispatched.
    ActionPending { turn: usize, tool: String },
    /// The observation for `turn` has been appended.
    Observed { turn: usize },
    /// Turn `turn` carried neither marker.
    Inconclusive { turn: usize },
    /// The extra post-budget inference call is in flight.
    ForceConclude { turn: usize },
    /// The run has stopped.
    Done,
}

impl LoopState {
    /// Short label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Thinking { .. } => "thinking",
            Self::ActionPending { .. } => "action_pending",
            Self::Observed { .. } => "observed",
            Self::Inconclusive { .. } => "inconclusive",
            Self::ForceConclude { .. } => "force_conclude",
            Self::Done => "done",
        }
    }
}

/// Decide the next step for a classified turn.
///
/// `turn` is zero-based. Forced conclusion only fires on an inconclusive
/// final turn; an action on the final turn is still dispatched and the
/// run then ends without an answer.
pub fn transition(output: TurnOutput, turn: usize, max_turns: usize) -> Transition {
    match output {
        TurnOutput::Answer(answer) => Transition::Finish(answer),
        TurnOutput::Action(action) => Transition::Dispatch(action),
        TurnOutput::Inconclusive if turn + 1 >= max_turns => Transition::ForceConclude,
        TurnOutput::Inconclusive => Transition::Continue,
    }
}
