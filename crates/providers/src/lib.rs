//! Inference endpoint implementations for Levain.
//!
//! All providers implement the `levain_core::Provider` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use levain_config::AppConfig;
use levain_core::error::ProviderError;

/// Build the configured provider.
///
/// A missing API key is only accepted for local endpoints (e.g. Ollama).
pub fn build_from_config(config: &AppConfig) -> Result<OpenAiCompatProvider, ProviderError> {
    let is_local = config.base_url.contains("localhost") || config.base_url.contains("127.0.0.1");
    let api_key = match (&config.api_key, is_local) {
        (Some(key), _) => key.clone(),
        (None, true) => "local".to_string(),
        (None, false) => {
            return Err(ProviderError::NotConfigured(format!(
                "no API key for {}",
                config.base_url
            )));
        }
    };

    Ok(
        OpenAiCompatProvider::new("openai_compat", &config.base_url, api_key)
            .with_timeout_secs(config.request_timeout_secs),
    )
}
