//! `levain ask`: Answer a single message.

use super::{Options, Session, load_config};
use levain_core::message::Transcript;

pub async fn run(options: &Options, message: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(options)?;
    let session = Session::from_config(&config, options.persona)?;

    if !json {
        eprint!("  Thinking...");
    }
    let result = session
        .run(Transcript::seeded(&session.system_prompt, message))
        .await;
    if !json {
        eprint!("\r              \r");
    }
    let (answer, _, metadata) = result?.into_parts();

    if json {
        let report = serde_json::json!({
            "answer": answer,
            "metadata": metadata,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{answer}");
    }
    Ok(())
}
