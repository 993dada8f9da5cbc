//! ReAct loop controller: Thought → Action → Observation → Answer.
//!
//! One inference call per turn. The raw model output is appended to the
//! transcript as-is, classified by [`crate::protocol`], and acted on
//! through the pure [`transition`] function:
//!
//! - **Answer**: the run stops with the extracted answer.
//! - **Action**: the tool is dispatched through the registry and its
//!   result is appended as an `Observation:` message.
//! - **Neither**: the loop continues. On the last permitted turn the model
//!   is told to conclude and gets one extra call.
//!
//! If the budget runs out right after an action, the run stops with a
//! fixed apology. Every run returns a non-empty answer; only a provider
//! failure aborts it.

use levain_core::message::{Message, Transcript};
use levain_core::provider::{Provider, ProviderRequest};
use levain_core::tool::ToolRegistry;
use levain_core::{Error, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::metadata::{ActionRecord, RunMetadata, StopReason};
use crate::protocol::{ActionInvocation, classify, extract_answer};
use crate::state::{LoopState, Transition, transition};

/// Returned when the turn budget runs out without any usable answer.
pub const APOLOGY: &str = "I apologize, but I need more information to help you properly. Could you please rephrase your question?";

/// Appended as a user message before the forced-conclusion call.
pub const FORCE_CONCLUDE_DIRECTIVE: &str = "Please provide your final Answer to the customer.";

const DEFAULT_MAX_TURNS: usize = 10;

/// The ReAct agent.
///
/// Holds no per-run state, so one agent behind an `Arc` can serve
/// concurrent runs.
pub struct ReactAgent {
    /// LLM provider.
    provider: Arc<dyn Provider>,
    /// Model name.
    model: String,
    /// Temperature.
    temperature: f32,
    /// Nucleus sampling cutoff.
    top_p: Option<f32>,
    /// Max tokens per response.
    max_tokens: Option<u32>,
    /// Tool registry.
    tools: Arc<ToolRegistry>,
    /// Maximum reasoning turns, at least 1.
    max_turns: usize,
}

/// The result of a completed run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The final answer text, never empty.
    pub answer: String,
    /// The full transcript, including every raw model output.
    pub transcript: Transcript,
    pub metadata: RunMetadata,
}

impl RunOutcome {
    pub fn into_parts(self) -> (String, Transcript, RunMetadata) {
        (self.answer, self.transcript, self.metadata)
    }
}

/// Per-run counters, owned by a single call to `run_transcript`.
struct RunState {
    run_id: Uuid,
    inference_calls: usize,
    actions_taken: Vec<ActionRecord>,
}

impl ReactAgent {
    /// Create a new ReAct agent.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            top_p: None,
            max_tokens: None,
            tools,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    /// Set the turn budget. Values below 1 are raised to 1.
    pub fn with_max_turns(mut self, max: usize) -> Self {
        self.max_turns = max.max(1);
        self
    }

    /// Set the max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set the nucleus sampling cutoff.
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Answer one user message under the given system prompt.
    pub async fn run(&self, system_prompt: &str, user_message: &str) -> Result<RunOutcome> {
        self.run_transcript(Transcript::seeded(system_prompt, user_message))
            .await
    }

    /// Run the loop over an existing transcript.
    ///
    /// The transcript must already hold the system prompt and end with the
    /// user message to answer. Earlier exchanges are kept and replayed.
    pub async fn run_transcript(&self, mut transcript: Transcript) -> Result<RunOutcome> {
        if transcript.is_empty() {
            return Err(Error::Internal(
                "cannot run the agent on an empty transcript".into(),
            ));
        }

        let mut run = RunState {
            run_id: Uuid::new_v4(),
            inference_calls: 0,
            actions_taken: Vec::new(),
        };

        info!(
            run_id = %run.run_id,
            model = %self.model,
            max_turns = self.max_turns,
            "ReAct run starting"
        );

        for turn in 0..self.max_turns {
            trace_state(&run, &LoopState::Thinking { turn });

            let text = self.infer(&mut run, &transcript).await?;
            transcript.push(Message::assistant(&text));

            match transition(classify(&text), turn, self.max_turns) {
                Transition::Finish(answer) => {
                    let answer = non_empty_or(answer, APOLOGY);
                    return Ok(self.finish(run, answer, transcript, turn + 1, StopReason::AnswerFound));
                }
                Transition::Dispatch(action) => {
                    trace_state(
                        &run,
                        &LoopState::ActionPending {
                            turn,
                            tool: action.tool_name.clone(),
                        },
                    );
                    self.dispatch(&mut run, &mut transcript, action, turn).await?;
                    trace_state(&run, &LoopState::Observed { turn });
                }
                Transition::Continue => {
                    trace_state(&run, &LoopState::Inconclusive { turn });
                }
                Transition::ForceConclude => {
                    trace_state(&run, &LoopState::ForceConclude { turn });
                    warn!(
                        run_id = %run.run_id,
                        turns = turn + 1,
                        "No answer within the turn budget, forcing a conclusion"
                    );

                    transcript.push(Message::user(FORCE_CONCLUDE_DIRECTIVE));
                    let text = self.infer(&mut run, &transcript).await?;
                    transcript.push(Message::assistant(&text));

                    let answer = forced_answer(&text);
                    return Ok(self.finish(
                        run,
                        answer,
                        transcript,
                        turn + 1,
                        StopReason::MaxTurnsReached,
                    ));
                }
            }
        }

        warn!(
            run_id = %run.run_id,
            max_turns = self.max_turns,
            "Turn budget spent on tool calls, giving up"
        );
        Ok(self.finish(
            run,
            APOLOGY.to_string(),
            transcript,
            self.max_turns,
            StopReason::MaxTurnsExceeded,
        ))
    }

    /// One inference call over the whole transcript.
    async fn infer(&self, run: &mut RunState, transcript: &Transcript) -> Result<String> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: transcript.messages().to_vec(),
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
        };

        let response = self.provider.complete(request).await?;
        run.inference_calls += 1;

        if let Some(usage) = &response.usage {
            debug!(
                run_id = %run.run_id,
                model = %response.model,
                tokens = usage.total_tokens,
                "Inference call completed"
            );
        }
        Ok(response.content)
    }

    /// Execute one action and append its observation.
    async fn dispatch(
        &self,
        run: &mut RunState,
        transcript: &mut Transcript,
        action: ActionInvocation,
        turn: usize,
    ) -> Result<()> {
        if let Some(reason) = &action.parse_error {
            warn!(
                run_id = %run.run_id,
                tool = %action.tool_name,
                %reason,
                raw = %action.raw_text,
                "Malformed action arguments, dispatching with none"
            );
        }

        let result = self.tools.execute(&action.tool_name, &action.arguments).await;
        debug!(
            run_id = %run.run_id,
            tool = %action.tool_name,
            success = result.is_success(),
            "Tool dispatched"
        );

        transcript.push(Message::observation(format!(
            "Observation: {}",
            serde_json::to_string(&result)?
        )));

        run.actions_taken.push(ActionRecord {
            turn: turn + 1,
            tool: action.tool_name,
            args: action.arguments,
            result,
        });
        Ok(())
    }

    fn finish(
        &self,
        run: RunState,
        answer: String,
        transcript: Transcript,
        turns: usize,
        stopped_reason: StopReason,
    ) -> RunOutcome {
        trace_state(&run, &LoopState::Done);
        info!(
            run_id = %run.run_id,
            turns,
            inference_calls = run.inference_calls,
            actions = run.actions_taken.len(),
            reason = %stopped_reason,
            "ReAct run completed"
        );

        RunOutcome {
            answer,
            transcript,
            metadata: RunMetadata {
                run_id: run.run_id,
                turns,
                inference_calls: run.inference_calls,
                actions_taken: run.actions_taken,
                stopped_reason,
            },
        }
    }
}

fn trace_state(run: &RunState, state: &LoopState) {
    debug!(run_id = %run.run_id, state = state.label(), ?state, "ReAct state");
}

fn non_empty_or(answer: String, fallback: &str) -> String {
    if answer.trim().is_empty() {
        fallback.to_string()
    } else {
        answer
    }
}

/// The answer from a forced-conclusion response: the extracted answer,
/// else the raw text, else the apology.
fn forced_answer(text: &str) -> String {
    let extracted = extract_answer(text);
    if !extracted.trim().is_empty() {
        return extracted.trim().to_string();
    }
    non_empty_or(text.trim().to_string(), APOLOGY)
}

// ── Tests ─────────────────────────────────────────────────────────────────
