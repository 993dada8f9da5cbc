//! `levain doctor`: Diagnose configuration and endpoint health.

use super::{Options, load_config};
use levain_config::AppConfig;
use levain_core::Provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug)]
pub struct Check {
    pub status: Status,
    pub detail: String,
}

impl Check {
    fn new(status: Status, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    fn icon(&self) -> &'static str {
        match self.status {
            Status::Pass => "✅",
            Status::Warn => "⚠️ ",
            Status::Fail => "❌",
        }
    }
}

pub async fn run(options: &Options) -> Result<(), Box<dyn std::error::Error>> {
    println!("Levain Doctor: system diagnostics");
    println!("=================================\n");

    let checks = match load_config(options) {
        Ok(config) => {
            let provider = levain_providers::build_from_config(&config).ok();
            let mut checks = vec![Check::new(Status::Pass, "Config loaded and valid")];
            checks.extend(diagnose(&config, provider.as_ref().map(|p| p as &dyn Provider)).await);
            checks
        }
        Err(e) => vec![Check::new(Status::Fail, format!("Config invalid: {e}"))],
    };

    for check in &checks {
        println!("  {} {}", check.icon(), check.detail);
    }

    let issues = checks.iter().filter(|c| c.status != Status::Pass).count();
    println!();
    if issues == 0 {
        println!("  All checks passed!");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }
    Ok(())
}

/// Check a loaded config. `provider` is `None` when one could not be built.
pub async fn diagnose(config: &AppConfig, provider: Option<&dyn Provider>) -> Vec<Check> {
    let mut checks = Vec::new();

    if config.has_api_key() {
        checks.push(Check::new(Status::Pass, "API key configured"));
    } else if provider.is_some() {
        checks.push(Check::new(Status::Pass, "Local endpoint, no API key needed"));
    } else {
        checks.push(Check::new(
            Status::Fail,
            "No API key configured: set LEVAIN_API_KEY or OPENAI_API_KEY",
        ));
    }

    for path in &config.agent.context_files {
        if path.is_file() {
            checks.push(Check::new(Status::Pass, format!("Context file {}", path.display())));
        } else {
            checks.push(Check::new(
                Status::Fail,
                format!("Context file missing: {}", path.display()),
            ));
        }
    }
    if let Some(path) = &config.agent.system_prompt_file
        && !path.is_file()
    {
        checks.push(Check::new(
            Status::Fail,
            format!("Persona file missing: {}", path.display()),
        ));
    }

    if config.tools.logs_dir.is_dir() {
        checks.push(Check::new(
            Status::Pass,
            format!("Logs directory {}", config.tools.logs_dir.display()),
        ));
    } else {
        checks.push(Check::new(
            Status::Warn,
            format!(
                "Logs directory {} does not exist yet; it is created on the first record",
                config.tools.logs_dir.display()
            ),
        ));
    }

    if let Some(provider) = provider {
        match provider.health_check().await {
            Ok(true) => checks.push(Check::new(
                Status::Pass,
                format!("Endpoint {} reachable", config.base_url),
            )),
            Ok(false) => checks.push(Check::new(
                Status::Fail,
                format!("Endpoint {} rejected the health check", config.base_url),
            )),
            Err(e) => checks.push(Check::new(
                Status::Fail,
                format!("Endpoint {} unreachable: {e}", config.base_url),
            )),
        }
    }

    checks
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use levain_core::error::ProviderError;
    use levain_core::provider::{ProviderRequest, ProviderResponse};

    struct Endpoint {
        healthy: Result<bool, ProviderError>,
    }

    #[async_trait]
    impl Provider for Endpoint {
        fn name(&self) -> &str {
            "endpoint"
        }

        async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            unreachable!("doctor never runs completions")
        }

        async fn health_check(&self) -> Result<bool, ProviderError> {
            self.healthy.clone()
        }
    }

    fn configured(dir: &std::path::Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.api_key = Some("sk-test".into());
        config.tools.logs_dir = dir.to_path_buf();
        config
    }

    #[tokio::test]
    async fn healthy_setup_passes_every_check() {
        let dir = tempfile::tempdir().unwrap();
        let config = configured(dir.path());
        let endpoint = Endpoint { healthy: Ok(true) };

        let checks = diagnose(&config, Some(&endpoint)).await;
        assert!(checks.iter().all(|c| c.status == Status::Pass), "{checks:?}");
        assert!(checks.iter().any(|c| c.detail.contains("reachable")));
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = configured(dir.path());
        let endpoint = Endpoint {
            healthy: Err(ProviderError::Network("connection refused".into())),
        };

        let checks = diagnose(&config, Some(&endpoint)).await;
        let last = checks.last().unwrap();
        assert_eq!(last.status, Status::Fail);
        assert!(last.detail.contains("connection refused"));
    }

    #[tokio::test]
    async fn missing_key_and_context_file_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = configured(dir.path());
        config.api_key = None;
        config.agent.context_files = vec![dir.path().join("summary.txt")];

        let checks = diagnose(&config, None).await;
        let failures: Vec<&str> = checks
            .iter()
            .filter(|c| c.status == Status::Fail)
            .map(|c| c.detail.as_str())
            .collect();
        assert_eq!(failures.len(), 2);
        assert!(failures[0].contains("No API key"));
        assert!(failures[1].contains("summary.txt"));
    }

    #[tokio::test]
    async fn missing_logs_dir_is_only_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let config = configured(&dir.path().join("not-yet"));
        let endpoint = Endpoint { healthy: Ok(true) };

        let checks = diagnose(&config, Some(&endpoint)).await;
        let warn = checks.iter().find(|c| c.status == Status::Warn).unwrap();
        assert!(warn.detail.contains("not-yet"));
    }
}
