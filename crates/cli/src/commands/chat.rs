//! `levain chat`: Interactive conversation mode.
//!
//! The transcript is carried across questions, so the model sees every
//! earlier exchange. A failed run leaves the history as it was.

use super::{Options, Session, load_config};
use levain_agent::RunOutcome;
use levain_core::message::{Message, Transcript};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// The conversation so far: the transcript of the last successful run.
#[derive(Debug, Default)]
pub struct History {
    transcript: Option<Transcript>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// The transcript to run for the next question.
    pub fn next_turn(&self, system_prompt: &str, input: &str) -> Transcript {
        match &self.transcript {
            Some(previous) => {
                let mut next = previous.clone();
                next.push(Message::user(input));
                next
            }
            None => Transcript::seeded(system_prompt, input),
        }
    }

    /// Fold a run result into the history and hand back the answer.
    /// An error leaves the history untouched.
    pub fn record<E>(&mut self, result: Result<RunOutcome, E>) -> Result<String, E> {
        let outcome = result?;
        self.transcript = Some(outcome.transcript);
        Ok(outcome.answer)
    }

    /// Number of messages carried into the next question.
    pub fn len(&self) -> usize {
        self.transcript.as_ref().map_or(0, Transcript::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub async fn run(options: &Options) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(options)?;
    let session = Session::from_config(&config, options.persona)?;

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║      Levain — Fleur de Pain assistant        ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:     {}", config.model);
    println!("  Tools:     {}", session.agent.tools().names().join(", "));
    println!("  Max turns: {}", session.agent.max_turns());
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+D to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut history = History::new();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "exit" | "quit") {
            break;
        }

        let transcript = history.next_turn(&session.system_prompt, input);

        eprint!("  ...");
        let result = session.run(transcript).await;
        match history.record(result) {
            Ok(answer) => {
                eprint!("\r     \r");
                println!();
                for line in answer.lines() {
                    println!("  Assistant > {line}");
                }
                println!();
            }
            Err(e) => {
                eprint!("\r     \r");
                eprintln!("  [Error] {e}");
                println!();
            }
        }
    }

    println!("  Goodbye!");
    Ok(())
}
