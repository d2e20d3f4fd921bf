//! Runtime configuration for the ingestion pipeline.

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = "figtrack/0.1";
const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 4;
const DEFAULT_INTER_REQUEST_DELAY_MS: u64 = 250;

/// Settings the embedding scheduler hands to the pipeline.
///
/// `max_concurrent_requests` is a per-site politeness limit: it bounds
/// in-flight product-page fetches against one source domain, not the
/// total across sites.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_concurrent_requests: usize,
    pub inter_request_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            inter_request_delay_ms: DEFAULT_INTER_REQUEST_DELAY_MS,
        }
    }
}

impl AppConfig {
    /// Loads settings from `FIGTRACK_*` environment variables, falling
    /// back to defaults for anything unset or unparseable (a warning is
    /// logged for the latter).
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            request_timeout_secs: read_env(
                "FIGTRACK_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            ),
            user_agent: std::env::var("FIGTRACK_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            max_concurrent_requests: read_env(
                "FIGTRACK_MAX_CONCURRENT_REQUESTS",
                DEFAULT_MAX_CONCURRENT_REQUESTS,
            ),
            inter_request_delay_ms: read_env(
                "FIGTRACK_INTER_REQUEST_DELAY_MS",
                DEFAULT_INTER_REQUEST_DELAY_MS,
            ),
        }
    }
}

fn read_env<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => parse_or(name, &raw, default),
        Err(_) => default,
    }
}

fn parse_or<T: std::str::FromStr + Copy>(name: &str, raw: &str, default: T) -> T {
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(var = name, value = raw, "unparseable setting; using default");
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_concurrent_requests, 4);
        assert!(!config.user_agent.is_empty());
    }

    #[test]
    fn parse_or_accepts_valid_values() {
        assert_eq!(parse_or("TEST", "120", 30u64), 120);
        assert_eq!(parse_or("TEST", "8", 4usize), 8);
    }

    #[test]
    fn parse_or_falls_back_on_garbage() {
        assert_eq!(parse_or("TEST", "not-a-number", 30u64), 30);
        assert_eq!(parse_or("TEST", "", 4usize), 4);
    }
}
