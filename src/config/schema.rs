//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate
//! server. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gate server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GateServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Session cookie and store bounds.
    pub session: SessionConfig,

    /// Access gate thresholds.
    pub gate: GateConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin diagnostics API.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8501").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8501".to_string(),
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session token.
    pub cookie_name: String,

    /// Upper bound on tracked sessions. Requests beyond it are admitted
    /// without rate limiting.
    pub max_sessions: usize,

    /// Sessions idle longer than this may be evicted to make room.
    pub idle_ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "gate_session".to_string(),
            max_sessions: 10_000,
            idle_ttl_secs: 24 * 60 * 60,
        }
    }
}

/// Access gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GateConfig {
    /// Run the gate in front of page renders.
    pub enabled: bool,

    /// Requests allowed inside any 60-second window.
    pub max_requests_per_minute: usize,

    /// Requests allowed inside any 3600-second window.
    pub max_requests_per_hour: usize,

    /// Block duration after either cap is exceeded.
    pub block_duration_minutes: u64,

    /// Window for the page-switch monitor.
    pub page_switch_window_secs: u64,

    /// Page switches tolerated inside the window.
    pub max_page_switches: usize,

    /// Entries kept in each session's access log.
    pub access_log_capacity: usize,

    /// Deny requests whose User-Agent looks automated.
    pub screen_user_agents: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests_per_minute: 30,
            max_requests_per_hour: 500,
            block_duration_minutes: 60,
            page_switch_window_secs: 300,
            max_page_switches: 20,
            access_log_capacity: 100,
            screen_user_agents: false,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin diagnostics API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8502".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: GateServerConfig = toml::from_str(
            r#"
            [gate]
            max_requests_per_minute = 10

            [admin]
            enabled = true
            api_key = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.gate.max_requests_per_minute, 10);
        assert_eq!(config.gate.max_requests_per_hour, 500);
        assert_eq!(config.gate.block_duration_minutes, 60);
        assert!(config.admin.enabled);
        assert_eq!(config.admin.bind_address, "127.0.0.1:8502");
        assert_eq!(config.session.cookie_name, "gate_session");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: GateServerConfig = toml::from_str("").unwrap();
        assert_eq!(config, GateServerConfig::default());
    }
}
