//! Rate Limiting Infrastructure
//!
//! Fixed-window rate limiting: at most `max_requests` per key within each
//! window. The window starts at the first request for a key.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::Mutex;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    /// 5 requests per 10 seconds
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(10),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }
}

/// Rate limit check result
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    /// Time until the current window closes
    pub reset_after: Duration,
}

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Rate limit store unavailable: {0}")]
    Unavailable(String),
}

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Check and increment rate limit counter
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError>;
}

// ============================================================================
// In-memory store
// ============================================================================

/// Expired windows are swept once the map grows past this many keys
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: Instant,
    count: u32,
}

/// Process-local store; counters are lost on restart
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    windows: Mutex<HashMap<String, Window>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        if windows.len() > SWEEP_THRESHOLD {
            windows.retain(|_, w| now.duration_since(w.started_at) < config.window);
        }

        let window = windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });

        if now.duration_since(window.started_at) >= config.window {
            *window = Window {
                started_at: now,
                count: 0,
            };
        }

        let reset_after = config
            .window
            .saturating_sub(now.duration_since(window.started_at));

        if window.count >= config.max_requests {
            return Ok(RateLimitResult {
                allowed: false,
                remaining: 0,
                reset_after,
            });
        }

        window.count += 1;
        Ok(RateLimitResult {
            allowed: true,
            remaining: config.max_requests - window.count,
            reset_after,
        })
    }
}
