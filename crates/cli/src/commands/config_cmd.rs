//! `levain config`: Print the default configuration.

use levain_config::AppConfig;

pub fn run() {
    println!(
        "# Save as {}",
        AppConfig::config_dir().join("config.toml").display()
    );
    println!("{}", AppConfig::default_toml());
}
