use std::env;
use std::time::Duration;

pub struct RedisConfig {
    pub url: String,
    pub key_prefix: String,
    pub command_timeout: Duration,
}

impl RedisConfig {
    const DEFAULT_TIMEOUT_MS: u64 = 250;

    pub fn from_env() -> anyhow::Result<Self> {
        let url = env::var("REDIS_URL").map_err(|_| anyhow::anyhow!("REDIS_URL not set"))?;

        let key_prefix = env::var("REDIS_KEY_PREFIX").unwrap_or_default();

        let command_timeout = match env::var("REDIS_TIMEOUT_MS") {
            Ok(raw) => Duration::from_millis(raw.parse().map_err(|_| {
                anyhow::anyhow!("REDIS_TIMEOUT_MS must be a number of milliseconds, got {raw:?}")
            })?),
            Err(_) => Duration::from_millis(Self::DEFAULT_TIMEOUT_MS),
        };

        Ok(Self {
            url,
            key_prefix,
            command_timeout,
        })
    }

    /// The url with any password replaced, safe to log.
    pub fn redacted_url(&self) -> String {
        match (self.url.split_once("://"), self.url.rfind('@')) {
            (Some((scheme, _)), Some(at)) => format!("{scheme}://***{}", &self.url[at..]),
            _ => self.url.clone(),
        }
    }
}
