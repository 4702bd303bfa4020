//! Application options.
//!
//! Options derive serde traits so a host can embed them in its own config
//! file, and can also be read from the process environment.

use std::str::FromStr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Tunables for an [`App`](crate::App).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Options {
    /// Assign or propagate an `X-Request-Id` for every request.
    pub with_request_id: bool,

    /// Log the full route table when the server starts.
    pub debug_mode: bool,

    /// Distinct query keys kept per request; the rest are dropped.
    pub max_query_params: usize,

    /// Idle contexts the pool holds on to between requests.
    pub pool_capacity: usize,

    /// Treat private-range hops in `X-Forwarded-For` as trusted proxies.
    pub trust_private_ip: bool,

    /// Further proxy ranges trusted when resolving the client address.
    pub trusted_proxies: Vec<IpNet>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            with_request_id: true,
            debug_mode: false,
            max_query_params: 32,
            pool_capacity: 1024,
            trust_private_ip: true,
            trusted_proxies: Vec::new(),
        }
    }
}

impl Options {
    /// Reads `WITH_REQUEST_ID`, `DEBUG_MODE`, `MAX_QUERY_PARAMS`,
    /// `CONTEXT_POOL_CAPACITY`, `TRUST_PRIVATE_IP` and `TRUSTED_PROXIES`
    /// (comma-separated CIDRs) from the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds options from an arbitrary key lookup. Missing keys keep their
    /// default; values that fail to parse are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            with_request_id: parse(&lookup, "WITH_REQUEST_ID", defaults.with_request_id),
            debug_mode: parse(&lookup, "DEBUG_MODE", defaults.debug_mode),
            max_query_params: parse(&lookup, "MAX_QUERY_PARAMS", defaults.max_query_params),
            pool_capacity: parse(&lookup, "CONTEXT_POOL_CAPACITY", defaults.pool_capacity),
            trust_private_ip: parse(&lookup, "TRUST_PRIVATE_IP", defaults.trust_private_ip),
            trusted_proxies: parse_list(&lookup, "TRUSTED_PROXIES", defaults.trusted_proxies),
        }
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(key, value = %raw, ?default, "invalid option value, using default");
            default
        }
    }
}

/// Like `parse`, for a comma-separated list. One bad item rejects the list.
fn parse_list<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: Vec<T>) -> Vec<T>
where
    T: FromStr + std::fmt::Debug,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    let parsed: Result<Vec<T>, _> = raw
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::parse)
        .collect();
    match parsed {
        Ok(values) => values,
        Err(_) => {
            warn!(key, value = %raw, ?default, "invalid option value, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(Options::from_lookup(lookup(&[])), Options::default());
        assert!(Options::default().with_request_id);
        assert!(!Options::default().debug_mode);
    }

    #[test]
    fn reads_every_key() {
        let options = Options::from_lookup(lookup(&[
            ("WITH_REQUEST_ID", "false"),
            ("DEBUG_MODE", "true"),
            ("MAX_QUERY_PARAMS", "8"),
            ("CONTEXT_POOL_CAPACITY", " 16 "),
            ("TRUST_PRIVATE_IP", "false"),
            ("TRUSTED_PROXIES", "10.0.0.0/8, 2001:db8::/32"),
        ]));
        assert_eq!(
            options,
            Options {
                with_request_id: false,
                debug_mode: true,
                max_query_params: 8,
                pool_capacity: 16,
                trust_private_ip: false,
                trusted_proxies: vec!["10.0.0.0/8".parse().unwrap(), "2001:db8::/32".parse().unwrap()],
            }
        );
    }

    #[test]
    fn bad_values_fall_back_to_default() {
        let options = Options::from_lookup(lookup(&[
            ("DEBUG_MODE", "yes"),
            ("MAX_QUERY_PARAMS", "-1"),
            ("TRUSTED_PROXIES", "10.0.0.0/8,not-a-cidr"),
        ]));
        assert_eq!(options, Options::default());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let options: Options =
            serde_json::from_str(r#"{"debug_mode": true, "trusted_proxies": ["172.16.0.0/12"]}"#).unwrap();
        assert!(options.debug_mode);
        assert_eq!(options.max_query_params, 32);
        assert!(options.trust_private_ip);
        assert_eq!(options.trusted_proxies, vec!["172.16.0.0/12".parse::<IpNet>().unwrap()]);
    }
}
