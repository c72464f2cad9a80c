//! Failed-login lockout for preventing brute force attacks
//!
//! Only failed attempts count toward the limit; a successful login clears the
//! entry. Once the limit is reached, further attempts for the same identity
//! are refused for the lockout duration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::info;

/// Lockout configuration
#[derive(Debug, Clone)]
pub struct LockoutConfig {
    /// Number of failures that triggers a lockout
    pub max_failures: u32,
    /// Time window in seconds within which failures accumulate
    pub window_seconds: u64,
    /// Lockout duration in seconds
    pub lockout_seconds: u64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failures: 5,
            window_seconds: 300,  // 5 minutes
            lockout_seconds: 900, // 15 minutes
        }
    }
}

#[derive(Debug)]
struct FailureEntry {
    failures: u32,
    last_failure: Instant,
    locked_until: Option<Instant>,
}

/// Tracks failed logins per identity
#[derive(Debug, Clone)]
pub struct LoginLockout {
    config: LockoutConfig,
    entries: Arc<Mutex<HashMap<String, FailureEntry>>>,
}

impl LoginLockout {
    /// Create a new lockout tracker
    pub fn new(config: LockoutConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Check whether logins for this identity are currently refused
    pub async fn is_locked(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        match entries.get_mut(key) {
            Some(entry) => match entry.locked_until {
                Some(until) if now < until => true,
                Some(_) => {
                    // Lockout expired
                    entry.failures = 0;
                    entry.locked_until = None;
                    false
                }
                None => false,
            },
            None => false,
        }
    }

    /// Record a failed login. Engages the lockout when the limit is reached.
    pub async fn record_failure(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let entry = entries.entry(key.to_string()).or_insert(FailureEntry {
            failures: 0,
            last_failure: now,
            locked_until: None,
        });

        // Failures outside the window no longer count.
        if now.duration_since(entry.last_failure)
            >= Duration::from_secs(self.config.window_seconds)
        {
            entry.failures = 0;
        }

        entry.failures += 1;
        entry.last_failure = now;

        if entry.failures >= self.config.max_failures {
            entry.locked_until = Some(now + Duration::from_secs(self.config.lockout_seconds));
            info!(
                "Locked out {} for {} seconds after {} failed logins",
                key, self.config.lockout_seconds, entry.failures
            );
        }
    }

    /// Clear the failure count after a successful login
    pub async fn clear(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lockout(max_failures: u32) -> LoginLockout {
        LoginLockout::new(LockoutConfig {
            max_failures,
            window_seconds: 300,
            lockout_seconds: 900,
        })
    }

    #[tokio::test]
    async fn test_locks_after_max_failures() {
        let lockout = lockout(3);

        for _ in 0..2 {
            lockout.record_failure("student:20230042").await;
        }
        assert!(!lockout.is_locked("student:20230042").await);

        lockout.record_failure("student:20230042").await;
        assert!(lockout.is_locked("student:20230042").await);
    }

    #[tokio::test]
    async fn test_successful_login_clears_failures() {
        let lockout = lockout(3);

        lockout.record_failure("admin:dean@college.test").await;
        lockout.record_failure("admin:dean@college.test").await;
        lockout.clear("admin:dean@college.test").await;

        lockout.record_failure("admin:dean@college.test").await;
        assert!(!lockout.is_locked("admin:dean@college.test").await);
    }

    #[tokio::test]
    async fn test_identities_are_independent() {
        let lockout = lockout(1);

        lockout.record_failure("student:20230042").await;
        assert!(lockout.is_locked("student:20230042").await);
        assert!(!lockout.is_locked("student:20230043").await);
    }
}
