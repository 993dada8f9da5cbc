//! `levain tools`: Show the tool catalogue.

use super::{Options, build_registry, load_config};

pub fn run(options: &Options, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(options)?;
    let registry = build_registry(&config);

    if json {
        println!("{}", serde_json::to_string_pretty(&registry.definitions())?);
        return Ok(());
    }

    println!("{}", registry.describe());
    println!("Records are written to {}", config.tools.logs_dir.display());
    Ok(())
}
