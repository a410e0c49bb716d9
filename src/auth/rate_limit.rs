use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use actix_web::HttpRequest;

const LOGIN_MAX_ATTEMPTS: usize = 5;
const LOGIN_WINDOW_SECS: u64 = 900; // 15 minutes
const INTAKE_MAX_SUBMISSIONS: usize = 10;
const INTAKE_WINDOW_SECS: u64 = 600; // 10 minutes

#[derive(Default)]
struct Attempts {
    by_ip: HashMap<IpAddr, Vec<Instant>>,
    last_sweep: Option<Instant>,
}

/// Sliding-window counter keyed by client IP.
#[derive(Clone)]
pub struct RateLimiter {
    attempts: Arc<Mutex<Attempts>>,
    max: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max: usize, window: Duration) -> Self {
        Self {
            attempts: Arc::new(Mutex::new(Attempts::default())),
            max,
            window,
        }
    }

    fn cutoff(&self, now: Instant) -> Option<Instant> {
        now.checked_sub(self.window)
    }

    /// Check if the given IP is rate-limited. Returns true if blocked.
    /// Also lazily cleans up stale entries for the checked IP.
    pub fn is_blocked(&self, ip: IpAddr) -> bool {
        let mut attempts = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        let Some(cutoff) = self.cutoff(Instant::now()) else {
            return attempts.by_ip.get(&ip).is_some_and(|t| t.len() >= self.max);
        };

        match attempts.by_ip.get_mut(&ip) {
            Some(timestamps) => {
                timestamps.retain(|t| *t > cutoff);
                if timestamps.is_empty() {
                    attempts.by_ip.remove(&ip);
                    false
                } else {
                    timestamps.len() >= self.max
                }
            }
            None => false,
        }
    }

    /// Record an attempt (a failed login or a form submission).
    /// At most once per window, IPs with no recent attempts are dropped.
    pub fn record(&self, ip: IpAddr) {
        let now = Instant::now();
        let mut attempts = self.attempts.lock().unwrap_or_else(|e| e.into_inner());

        let sweep_due = attempts
            .last_sweep
            .is_none_or(|last| now.duration_since(last) >= self.window);
        if sweep_due {
            if let Some(cutoff) = self.cutoff(now) {
                attempts.by_ip.retain(|_, timestamps| {
                    timestamps.retain(|t| *t > cutoff);
                    !timestamps.is_empty()
                });
            }
            attempts.last_sweep = Some(now);
        }

        attempts.by_ip.entry(ip).or_default().push(now);
    }

    /// Clear all recorded attempts for the given IP (call on successful login).
    pub fn clear(&self, ip: IpAddr) {
        let mut attempts = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        attempts.by_ip.remove(&ip);
    }

    /// Number of IPs currently holding attempts.
    pub fn tracked_ips(&self) -> usize {
        let attempts = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        attempts.by_ip.len()
    }
}

/// The two limiters shared by all workers.
#[derive(Clone)]
pub struct Limiters {
    pub login: RateLimiter,
    pub intake: RateLimiter,
}

impl Default for Limiters {
    fn default() -> Self {
        Self {
            login: RateLimiter::new(LOGIN_MAX_ATTEMPTS, Duration::from_secs(LOGIN_WINDOW_SECS)),
            intake: RateLimiter::new(INTAKE_MAX_SUBMISSIONS, Duration::from_secs(INTAKE_WINDOW_SECS)),
        }
    }
}

pub fn client_ip(req: &HttpRequest) -> IpAddr {
    req.peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}
