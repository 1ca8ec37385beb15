//! Process configuration read from the environment.

use std::time::Duration;

use crate::error::LabelGateError;

pub const OPENFDA_BASE: &str = "https://api.fda.gov";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/0";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(86_400);

const API_KEY_ENV: &str = "FDA_API_KEY";
const API_KEY_ENV_ALIAS: &str = "OPENFDA_API_KEY";
const API_KEY_DOCS: &str = "https://open.fda.gov/apis/authentication/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Redis,
    Memory,
    Disabled,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub backend: CacheBackend,
    pub redis_url: String,
    pub ttl: Duration,
    pub op_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 16,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub openfda_base: String,
    pub cache: CacheSettings,
    pub http: HttpSettings,
    /// Report upstream failures as 502 instead of folding them into 404.
    pub strict_upstream: bool,
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the API key is missing or a value cannot be parsed.
    pub fn from_env() -> Result<Self, LabelGateError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, LabelGateError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |var: &str| {
            lookup(var)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let api_key = value(API_KEY_ENV)
            .or_else(|| value(API_KEY_ENV_ALIAS))
            .ok_or_else(|| LabelGateError::ApiKeyRequired {
                api: "openfda".into(),
                env_var: API_KEY_ENV.into(),
                docs_url: API_KEY_DOCS.into(),
            })?;

        let backend = match value("LABELGATE_CACHE").as_deref().map(str::to_ascii_lowercase) {
            None => CacheBackend::Redis,
            Some(v) => match v.as_str() {
                "redis" => CacheBackend::Redis,
                "memory" => CacheBackend::Memory,
                "off" | "none" | "disabled" => CacheBackend::Disabled,
                other => {
                    return Err(LabelGateError::InvalidConfig {
                        var: "LABELGATE_CACHE".into(),
                        message: format!("expected redis, memory or off, got '{other}'"),
                    });
                }
            },
        };

        let defaults = HttpSettings::default();
        let cache = CacheSettings {
            backend,
            redis_url: value("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            ttl: parse_u64(&value, "LABELGATE_CACHE_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_CACHE_TTL),
            op_timeout: parse_u64(&value, "LABELGATE_CACHE_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(Duration::from_millis(500)),
        };
        if cache.ttl.is_zero() {
            return Err(LabelGateError::InvalidConfig {
                var: "LABELGATE_CACHE_TTL_SECS".into(),
                message: "TTL must be at least one second".into(),
            });
        }
        if cache.op_timeout.is_zero() {
            return Err(LabelGateError::InvalidConfig {
                var: "LABELGATE_CACHE_TIMEOUT_MS".into(),
                message: "timeout must be at least one millisecond".into(),
            });
        }

        let http = HttpSettings {
            timeout: parse_u64(&value, "LABELGATE_HTTP_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            connect_timeout: defaults.connect_timeout,
            pool_max_idle_per_host: parse_u64(&value, "LABELGATE_HTTP_POOL_IDLE")?
                .map(|v| {
                    usize::try_from(v).map_err(|err| LabelGateError::InvalidConfig {
                        var: "LABELGATE_HTTP_POOL_IDLE".into(),
                        message: format!("{v} does not fit this platform ({err})"),
                    })
                })
                .transpose()?
                .unwrap_or(defaults.pool_max_idle_per_host),
        };
        if http.timeout.is_zero() {
            return Err(LabelGateError::InvalidConfig {
                var: "LABELGATE_HTTP_TIMEOUT_SECS".into(),
                message: "timeout must be at least one second".into(),
            });
        }

        let strict_upstream = match value("LABELGATE_STRICT_UPSTREAM") {
            None => false,
            Some(v) => parse_bool(&v).ok_or_else(|| LabelGateError::InvalidConfig {
                var: "LABELGATE_STRICT_UPSTREAM".into(),
                message: format!("expected true or false, got '{v}'"),
            })?,
        };

        Ok(Self {
            api_key,
            openfda_base: value("LABELGATE_OPENFDA_BASE")
                .unwrap_or_else(|| OPENFDA_BASE.to_string()),
            cache,
            http,
            strict_upstream,
        })
    }
}

fn parse_u64<F>(value: &F, var: &str) -> Result<Option<u64>, LabelGateError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = value(var) else {
        return Ok(None);
    };
    raw.parse::<u64>()
        .map(Some)
        .map_err(|err| LabelGateError::InvalidConfig {
            var: var.to_string(),
            message: format!("'{raw}' is not a non-negative integer ({err})"),
        })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, LabelGateError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|var| env.get(var).cloned())
    }

    #[test]
    fn missing_api_key_is_reported() {
        let err = config_from(&[]).unwrap_err();
        assert!(matches!(err, LabelGateError::ApiKeyRequired { .. }));
        assert!(err.to_string().contains("FDA_API_KEY"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let err = config_from(&[("FDA_API_KEY", "   ")]).unwrap_err();
        assert!(matches!(err, LabelGateError::ApiKeyRequired { .. }));
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = config_from(&[("FDA_API_KEY", "k")]).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.openfda_base, OPENFDA_BASE);
        assert_eq!(config.cache.backend, CacheBackend::Redis);
        assert_eq!(config.cache.redis_url, DEFAULT_REDIS_URL);
        assert_eq!(config.cache.ttl, Duration::from_secs(86_400));
        assert_eq!(config.http.timeout, Duration::from_secs(30));
        assert!(!config.strict_upstream);
    }

    #[test]
    fn alias_key_and_overrides_are_read() {
        let config = config_from(&[
            ("OPENFDA_API_KEY", "alias"),
            ("LABELGATE_CACHE", "Memory"),
            ("LABELGATE_CACHE_TTL_SECS", "60"),
            ("LABELGATE_HTTP_TIMEOUT_SECS", "5"),
            ("LABELGATE_STRICT_UPSTREAM", "yes"),
            ("LABELGATE_OPENFDA_BASE", "http://127.0.0.1:9000"),
        ])
        .unwrap();
        assert_eq!(config.api_key, "alias");
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.cache.ttl, Duration::from_secs(60));
        assert_eq!(config.http.timeout, Duration::from_secs(5));
        assert!(config.strict_upstream);
        assert_eq!(config.openfda_base, "http://127.0.0.1:9000");
    }

    #[test]
    fn rejects_unknown_cache_backend() {
        let err = config_from(&[("FDA_API_KEY", "k"), ("LABELGATE_CACHE", "memcached")])
            .unwrap_err();
        assert!(err.to_string().contains("LABELGATE_CACHE"));
    }

    #[test]
    fn rejects_malformed_numbers_and_zero_ttl() {
        let err = config_from(&[("FDA_API_KEY", "k"), ("LABELGATE_CACHE_TTL_SECS", "soon")])
            .unwrap_err();
        assert!(matches!(err, LabelGateError::InvalidConfig { .. }));

        let err = config_from(&[("FDA_API_KEY", "k"), ("LABELGATE_CACHE_TTL_SECS", "0")])
            .unwrap_err();
        assert!(matches!(err, LabelGateError::InvalidConfig { .. }));
    }

    #[test]
    fn rejects_zero_timeouts() {
        for var in ["LABELGATE_HTTP_TIMEOUT_SECS", "LABELGATE_CACHE_TIMEOUT_MS"] {
            let err = config_from(&[("FDA_API_KEY", "k"), (var, "0")]).unwrap_err();
            match err {
                LabelGateError::InvalidConfig { var: reported, .. } => assert_eq!(reported, var),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn pool_size_is_read_and_validated() {
        let config =
            config_from(&[("FDA_API_KEY", "k"), ("LABELGATE_HTTP_POOL_IDLE", "4")]).unwrap();
        assert_eq!(config.http.pool_max_idle_per_host, 4);

        let err = config_from(&[("FDA_API_KEY", "k"), ("LABELGATE_HTTP_POOL_IDLE", "-1")])
            .unwrap_err();
        assert!(err.to_string().contains("LABELGATE_HTTP_POOL_IDLE"));
    }
}
