//! Bridge settings.
//!
//! Plain data with defaults, overridable from `BIMBRIDGE_*` environment
//! variables. Invalid values fall back to the default with a warning
//! rather than refusing to start.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::warn;

/// Default listen address, matching the source bridge's loopback-only
/// binding (remote exposure is a deployment decision, not a default).
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:55244";

/// Default bound on how long the gateway waits for a job's result.
pub const DEFAULT_DISPATCH_TIMEOUT_SECS: u64 = 30;

/// Runtime settings for the bridge.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Address the HTTP gateway listens on.
    pub bind_addr: SocketAddr,

    /// Optional static bearer key. When set, every request must carry
    /// `Authorization: Bearer <key>`.
    pub api_key: Option<String>,

    /// Gateway-side wait bound per dispatch. Expiry does not cancel the
    /// job; see the bridge module docs.
    pub dispatch_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.parse().expect("default addr is valid"),
            api_key: None,
            dispatch_timeout: Duration::from_secs(DEFAULT_DISPATCH_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    /// Loads settings from the process environment.
    ///
    /// Recognized variables: `BIMBRIDGE_ADDR`, `BIMBRIDGE_API_KEY`,
    /// `BIMBRIDGE_DISPATCH_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Loads settings from an arbitrary variable source (testable).
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(raw) = get("BIMBRIDGE_ADDR") {
            match raw.parse() {
                Ok(addr) => settings.bind_addr = addr,
                Err(_) => warn!(value = %raw, "Ignoring invalid BIMBRIDGE_ADDR"),
            }
        }

        if let Some(key) = get("BIMBRIDGE_API_KEY") {
            if !key.is_empty() {
                settings.api_key = Some(key);
            }
        }

        if let Some(raw) = get("BIMBRIDGE_DISPATCH_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => settings.dispatch_timeout = Duration::from_secs(secs),
                _ => warn!(value = %raw, "Ignoring invalid BIMBRIDGE_DISPATCH_TIMEOUT_SECS"),
            }
        }

        settings
    }
}
