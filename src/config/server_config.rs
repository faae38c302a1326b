use std::env;
use std::time::Duration;

use anyhow::{Result, bail};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Events buffered per SSE client before pushes to it start failing.
    pub subscriber_buffer: usize,

    /// Interval of SSE comment frames on idle streams. `None` disables them.
    pub keep_alive: Option<Duration>,

    /// Enables the admin routes when set.
    pub admin_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            subscriber_buffer: 64,
            keep_alive: Some(Duration::from_secs(15)),
            admin_token: None,
        }
    }
}

impl ServerConfig {
    pub fn new(subscriber_buffer: usize, keep_alive_secs: u64) -> Result<Self> {
        // handshake and catch-up are queued before the stream is polled
        if subscriber_buffer < 2 {
            bail!("subscriber buffer must hold at least 2 events, got {subscriber_buffer}");
        }

        let keep_alive = match keep_alive_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            subscriber_buffer,
            keep_alive,
            admin_token: None,
        })
    }

    pub fn with_admin_token_from_env(mut self) -> Self {
        self.admin_token = env::var("STOREFRONT_ADMIN_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        self
    }

    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(token.into());
        self
    }
}
