//! The ReAct loop: the heart of Levain.
//!
//! The agent follows a **Thought → Action → Observation** cycle:
//!
//! 1. **Send** the transcript to the configured provider
//! 2. **Classify** the raw reply (`Answer:`, `Action:`, or neither)
//! 3. **If action**: dispatch the tool, append its observation, loop back to step 1
//! 4. **If answer**: return it with the transcript and run metadata
//!
//! The loop is bounded by a turn budget. When the budget runs out on an
//! inconclusive turn the model is asked once more for a final answer.

pub mod metadata;
pub mod protocol;
pub mod react;
pub mod state;

#[cfg(test)]
mod test_helpers;

pub use metadata::{ActionRecord, RunMetadata, StopReason};
pub use protocol::{ActionInvocation, TurnOutput, classify, detect_action, extract_answer, has_final_answer};
pub use react::{APOLOGY, FORCE_CONCLUDE_DIRECTIVE, ReactAgent, RunOutcome};
pub use state::{LoopState, Transition, transition};
