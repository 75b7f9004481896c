//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, per-hour >= per-minute)
//! - Validate bind addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::GateServerConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `gate.max_requests_per_hour`.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &GateServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);

    if config.session.cookie_name.trim().is_empty() {
        errors.push(ValidationError::new("session.cookie_name", "must not be empty"));
    }
    if config.session.max_sessions == 0 {
        errors.push(ValidationError::new("session.max_sessions", "must be greater than 0"));
    }

    let gate = &config.gate;
    if gate.max_requests_per_minute == 0 {
        errors.push(ValidationError::new("gate.max_requests_per_minute", "must be greater than 0"));
    }
    if gate.max_requests_per_hour < gate.max_requests_per_minute {
        errors.push(ValidationError::new(
            "gate.max_requests_per_hour",
            format!(
                "must be at least max_requests_per_minute ({})",
                gate.max_requests_per_minute
            ),
        ));
    }
    if gate.block_duration_minutes == 0 {
        errors.push(ValidationError::new("gate.block_duration_minutes", "must be greater than 0"));
    }
    if gate.page_switch_window_secs == 0 {
        errors.push(ValidationError::new("gate.page_switch_window_secs", "must be greater than 0"));
    }
    if gate.access_log_capacity == 0 {
        errors.push(ValidationError::new("gate.access_log_capacity", "must be greater than 0"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.observability.metrics_enabled {
        check_addr(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }

    if config.admin.enabled {
        check_addr(&mut errors, "admin.bind_address", &config.admin.bind_address);
        if config.admin.api_key.is_empty() {
            errors.push(ValidationError::new("admin.api_key", "must not be empty when admin is enabled"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(field, format!("invalid socket address '{}'", value)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GateServerConfig::default()).is_ok());
    }

    #[test]
    fn test_all_errors_are_reported() {
        let mut config = GateServerConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.gate.max_requests_per_minute = 50;
        config.gate.max_requests_per_hour = 10;
        config.gate.access_log_capacity = 0;
        config.admin.enabled = true;
        config.admin.api_key = String::new();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "gate.max_requests_per_hour",
                "gate.access_log_capacity",
                "admin.api_key",
            ]
        );
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = GateServerConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
