use std::env;

use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Clone)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
}

#[derive(Clone)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service_context: ServiceContext,
    pub(crate) log_filter: String,
    /// Warnings captured during config parsing so they can be logged after tracing is initialized.
    pub(crate) warnings: Vec<String>,
}

impl ObservabilityConfig {
    pub(crate) fn from_env(component: &str) -> Self {
        Self::from_values(
            component,
            env_string("SERVICE_NAME"),
            env_string("STAGE"),
            env_string("RUST_LOG"),
        )
    }

    fn from_values(
        component: &str,
        service_name: Option<String>,
        stage: Option<String>,
        rust_log: Option<String>,
    ) -> Self {
        let component = component.trim().to_string();
        let mut warnings = Vec::new();

        let service_name = service_name
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| format!("offszn-{}", component));

        let environment = match stage.filter(|v| !v.is_empty()) {
            Some(stage) => stage,
            None => {
                warnings.push("STAGE is not set; reporting environment as unknown".to_string());
                "unknown".to_string()
            }
        };

        let log_filter = match rust_log.filter(|v| !v.trim().is_empty()) {
            Some(raw) if EnvFilter::try_new(&raw).is_ok() => raw,
            Some(raw) => {
                warnings.push(format!(
                    "RUST_LOG is invalid (value: {raw}); defaulting to {DEFAULT_LOG_FILTER}"
                ));
                DEFAULT_LOG_FILTER.to_string()
            }
            None => DEFAULT_LOG_FILTER.to_string(),
        };

        Self {
            service_context: ServiceContext {
                service_name,
                environment,
                component,
            },
            log_filter,
            warnings,
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_filled_in() {
        let config = ObservabilityConfig::from_values(" backend ", None, Some("prod".into()), None);

        assert_eq!(config.service_context.service_name, "offszn-backend");
        assert_eq!(config.service_context.environment, "prod");
        assert_eq!(config.log_filter, "info");
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn bad_values_become_warnings() {
        let config = ObservabilityConfig::from_values(
            "worker",
            Some("offszn".into()),
            None,
            Some("backend=[[nope".into()),
        );

        assert_eq!(config.log_filter, "info");
        assert_eq!(config.warnings.len(), 2);
    }
}
