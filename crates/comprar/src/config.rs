//! Suite configuration.
//!
//! Read once from the environment into an explicit value that is passed to
//! pages and flows. There is no process-wide configuration singleton; a test
//! that wants different settings constructs its own value.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for one suite run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Environment name (`dev`, `staging`, ...)
    pub environment: String,
    /// Base URL of the storefront under test
    pub base_url: String,
    /// Account username/email
    pub username: String,
    /// Account password
    pub password: String,
    /// Default action timeout in milliseconds
    pub default_timeout_ms: u64,
    /// Navigation timeout in milliseconds
    pub navigation_timeout_ms: u64,
    /// Run the browser headless
    pub headless: bool,
    /// Parallel worker count for the test runner
    pub workers: usize,
    /// Path of the persisted session-state artifact
    pub session_file: PathBuf,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            environment: "dev".to_string(),
            base_url: "http://localhost:3000".to_string(),
            username: String::new(),
            password: String::new(),
            default_timeout_ms: 30_000,
            navigation_timeout_ms: 30_000,
            headless: true,
            workers: 4,
            session_file: PathBuf::from("auth/auth.json"),
        }
    }
}

impl SuiteConfig {
    /// Build the configuration from process environment variables.
    ///
    /// Unset or unparseable values fall back to defaults; credentials
    /// default to empty strings and are validated by the flows that need
    /// them.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// The seam `from_env` goes through; tests supply a closure over a map
    /// instead of mutating process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            environment: lookup("ENV").unwrap_or(defaults.environment),
            base_url: lookup("BASE_URL").unwrap_or(defaults.base_url),
            username: lookup("TEST_USERNAME").unwrap_or_default(),
            password: lookup("TEST_PASSWORD").unwrap_or_default(),
            default_timeout_ms: parse_or(lookup("DEFAULT_TIMEOUT"), defaults.default_timeout_ms),
            navigation_timeout_ms: parse_or(
                lookup("NAVIGATION_TIMEOUT"),
                defaults.navigation_timeout_ms,
            ),
            headless: lookup("HEADLESS").map_or(defaults.headless, |v| v == "true"),
            workers: parse_or(lookup("WORKERS"), defaults.workers),
            session_file: lookup("SESSION_FILE")
                .map_or(defaults.session_file, PathBuf::from),
        }
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the credentials
    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Set the session artifact path
    #[must_use]
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = path.into();
        self
    }

    /// Set the default action timeout
    #[must_use]
    pub const fn with_default_timeout(mut self, ms: u64) -> Self {
        self.default_timeout_ms = ms;
        self
    }

    /// Join a path onto the base URL
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url.trim_end_matches('/'), path)
        }
    }

    /// Whether credentials were provided
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from<'a>(map: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| map.get(key).map(|v| (*v).to_string())
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = SuiteConfig::from_lookup(|_| None);
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.environment, "dev");
        assert_eq!(config.default_timeout_ms, 30_000);
        assert_eq!(config.workers, 4);
        assert!(config.headless);
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_values_read_from_lookup() {
        let vars = HashMap::from([
            ("BASE_URL", "https://woocommerce.com"),
            ("TEST_USERNAME", "qa@example.com"),
            ("TEST_PASSWORD", "hunter2"),
            ("DEFAULT_TIMEOUT", "15000"),
            ("HEADLESS", "false"),
            ("WORKERS", "2"),
            ("ENV", "staging"),
        ]);
        let config = SuiteConfig::from_lookup(lookup_from(&vars));
        assert_eq!(config.base_url, "https://woocommerce.com");
        assert_eq!(config.environment, "staging");
        assert_eq!(config.default_timeout_ms, 15_000);
        assert_eq!(config.workers, 2);
        assert!(!config.headless);
        assert!(config.has_credentials());
    }

    #[test]
    fn test_unparseable_numbers_fall_back() {
        let vars = HashMap::from([("DEFAULT_TIMEOUT", "soon"), ("WORKERS", "-1")]);
        let config = SuiteConfig::from_lookup(lookup_from(&vars));
        assert_eq!(config.default_timeout_ms, 30_000);
        assert_eq!(config.workers, 4);
    }

    #[test]
    fn test_url_join() {
        let config = SuiteConfig::default().with_base_url("https://shop.test/");
        assert_eq!(config.url("/cart"), "https://shop.test/cart");
        assert_eq!(config.url("https://other.test/x"), "https://other.test/x");
    }
}
