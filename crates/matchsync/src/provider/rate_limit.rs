use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Default quotas (Riot development key limits).
pub mod rate_limits {
    use std::time::Duration;

    /// Short window: 20 requests per second.
    pub const SHORT_WINDOW: Duration = Duration::from_millis(1_000);
    pub const SHORT_CAPACITY: usize = 20;

    /// Long window: 100 requests per two minutes.
    pub const LONG_WINDOW: Duration = Duration::from_millis(120_000);
    pub const LONG_CAPACITY: usize = 100;

    /// Added to every computed wait so a slightly early wake-up does not
    /// find the window still full.
    pub const WAIT_BUFFER: Duration = Duration::from_millis(100);
}

/// A request quota over a trailing time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowQuota {
    /// Length of the sliding window.
    pub window: Duration,
    /// Maximum number of requests inside the window.
    pub capacity: usize,
}

/// Two independent sliding-window quotas plus the wait buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub short: WindowQuota,
    pub long: WindowQuota,
    pub buffer: Duration,
}

impl RateLimitPolicy {
    /// The Riot development key policy: 20/s and 100/2min.
    #[must_use]
    pub const fn riot_development() -> Self {
        Self {
            short: WindowQuota {
                window: rate_limits::SHORT_WINDOW,
                capacity: rate_limits::SHORT_CAPACITY,
            },
            long: WindowQuota {
                window: rate_limits::LONG_WINDOW,
                capacity: rate_limits::LONG_CAPACITY,
            },
            buffer: rate_limits::WAIT_BUFFER,
        }
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::riot_development()
    }
}

/// Which quota forced a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    Short,
    Long,
}

/// Sliding-window rate limiter for one upstream client.
///
/// Cloning shares the underlying timestamp log, so clones enforce the same
/// quota. Separate `ApiRateLimiter::new` calls never share state.
///
/// # Example
///
/// ```ignore
/// use matchsync::provider::ApiRateLimiter;
///
/// let limiter = ApiRateLimiter::default();
///
/// // Before each API call:
/// limiter.wait_for_slot().await;
/// client.some_api_call().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ApiRateLimiter {
    policy: RateLimitPolicy,
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
}

impl ApiRateLimiter {
    /// Create a limiter enforcing `policy`.
    ///
    /// Capacities of zero are treated as one.
    pub fn new(mut policy: RateLimitPolicy) -> Self {
        policy.short.capacity = policy.short.capacity.max(1);
        policy.long.capacity = policy.long.capacity.max(1);

        Self {
            policy,
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Wait until both quotas allow another request, then record it.
    ///
    /// The lock is held across the wait so concurrent callers queue up
    /// behind each other instead of racing for the same freed slot.
    pub async fn wait_for_slot(&self) {
        let mut timestamps = self.timestamps.lock().await;

        loop {
            let now = Instant::now();
            match next_wait(&self.policy, &mut timestamps, now) {
                None => {
                    timestamps.push_back(now);
                    return;
                }
                Some((wait, kind)) => {
                    let in_window = match kind {
                        WindowKind::Short => timestamps
                            .iter()
                            .filter(|t| now.duration_since(**t) < self.policy.short.window)
                            .count(),
                        WindowKind::Long => timestamps.len(),
                    };
                    tracing::debug!(
                        window = ?kind,
                        in_window,
                        wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                        "Rate limit window full, waiting"
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Forget all recorded requests.
    pub async fn reset(&self) {
        self.timestamps.lock().await.clear();
    }

    /// Number of requests currently remembered (those younger than the long window
    /// as of the last call).
    pub async fn recorded(&self) -> usize {
        self.timestamps.lock().await.len()
    }
}

impl Default for ApiRateLimiter {
    fn default() -> Self {
        Self::new(RateLimitPolicy::default())
    }
}

/// Prune stale timestamps and compute how long to wait before another request
/// may be issued at `now`. `None` means a request is allowed immediately.
///
/// `timestamps` must be in ascending order.
fn next_wait(
    policy: &RateLimitPolicy,
    timestamps: &mut VecDeque<Instant>,
    now: Instant,
) -> Option<(Duration, WindowKind)> {
    while let Some(&front) = timestamps.front() {
        if now.duration_since(front) >= policy.long.window {
            timestamps.pop_front();
        } else {
            break;
        }
    }

    let mut in_short = timestamps
        .iter()
        .copied()
        .filter(|t| now.duration_since(*t) < policy.short.window);
    if let Some(oldest_in_short) = in_short.next()
        && 1 + in_short.count() >= policy.short.capacity
    {
        let elapsed = now.duration_since(oldest_in_short);
        let wait = policy.short.window.saturating_sub(elapsed) + policy.buffer;
        return Some((wait, WindowKind::Short));
    }

    if timestamps.len() >= policy.long.capacity
        && let Some(&oldest) = timestamps.front()
    {
        let elapsed = now.duration_since(oldest);
        let wait = policy.long.window.saturating_sub(elapsed) + policy.buffer;
        return Some((wait, WindowKind::Long));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_policy() -> RateLimitPolicy {
        RateLimitPolicy {
            short: WindowQuota {
                window: Duration::from_millis(1_000),
                capacity: 3,
            },
            long: WindowQuota {
                window: Duration::from_millis(10_000),
                capacity: 5,
            },
            buffer: Duration::from_millis(100),
        }
    }

    #[test]
    fn riot_development_policy_matches_published_limits() {
        let policy = RateLimitPolicy::default();
        assert_eq!(policy.short.window, Duration::from_secs(1));
        assert_eq!(policy.short.capacity, 20);
        assert_eq!(policy.long.window, Duration::from_secs(120));
        assert_eq!(policy.long.capacity, 100);
        assert_eq!(policy.buffer, Duration::from_millis(100));
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut policy = small_policy();
        policy.short.capacity = 0;
        policy.long.capacity = 0;
        let limiter = ApiRateLimiter::new(policy);
        assert_eq!(limiter.policy().short.capacity, 1);
        assert_eq!(limiter.policy().long.capacity, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn next_wait_prunes_and_computes_short_wait_with_buffer() {
        let policy = small_policy();
        let base = Instant::now();
        let mut timestamps: VecDeque<Instant> = VecDeque::from(vec![
            base,
            base + Duration::from_millis(200),
            base + Duration::from_millis(400),
        ]);

        let now = base + Duration::from_millis(600);
        let (wait, kind) = next_wait(&policy, &mut timestamps, now).expect("short window full");
        assert_eq!(kind, WindowKind::Short);
        // 1000 - (600 - 0) + 100
        assert_eq!(wait, Duration::from_millis(500));

        // Far in the future everything is pruned.
        let later = base + Duration::from_secs(60);
        assert!(next_wait(&policy, &mut timestamps, later).is_none());
        assert!(timestamps.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn next_wait_uses_oldest_overall_for_long_window() {
        let policy = small_policy();
        let base = Instant::now();
        let mut timestamps: VecDeque<Instant> = (0..5)
            .map(|i| base + Duration::from_millis(i * 1_500))
            .collect();

        let now = base + Duration::from_millis(7_000);
        let (wait, kind) = next_wait(&policy, &mut timestamps, now).expect("long window full");
        assert_eq!(kind, WindowKind::Long);
        // 10000 - (7000 - 0) + 100
        assert_eq!(wait, Duration::from_millis(3_100));
    }

    #[tokio::test(start_paused = true)]
    async fn first_burst_is_immediate_then_waits_for_short_window() {
        let limiter = ApiRateLimiter::default();
        let start = Instant::now();

        for _ in 0..20 {
            limiter.wait_for_slot().await;
        }
        assert_eq!(Instant::now(), start);

        limiter.wait_for_slot().await;
        let waited = Instant::now() - start;
        assert!(waited >= Duration::from_millis(1_100), "waited {waited:?}");
        assert!(waited < Duration::from_millis(1_200), "waited {waited:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn sliding_windows_are_never_exceeded() {
        let limiter = ApiRateLimiter::default();
        let mut issued = Vec::new();

        for _ in 0..250 {
            limiter.wait_for_slot().await;
            issued.push(Instant::now());
        }

        // Any 21 consecutive requests span at least one second, and any 101
        // consecutive requests span at least two minutes.
        for i in 20..issued.len() {
            assert!(issued[i] - issued[i - 20] >= Duration::from_secs(1));
        }
        for i in 100..issued.len() {
            assert!(issued[i] - issued[i - 100] >= Duration::from_secs(120));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn clones_share_state_but_new_instances_do_not() {
        let a = ApiRateLimiter::new(small_policy());
        let shared = a.clone();
        let independent = ApiRateLimiter::new(small_policy());

        a.wait_for_slot().await;
        shared.wait_for_slot().await;

        assert_eq!(a.recorded().await, 2);
        assert_eq!(independent.recorded().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_clears_recorded_requests() {
        let limiter = ApiRateLimiter::new(small_policy());
        for _ in 0..3 {
            limiter.wait_for_slot().await;
        }
        limiter.reset().await;
        assert_eq!(limiter.recorded().await, 0);

        let start = Instant::now();
        limiter.wait_for_slot().await;
        assert_eq!(Instant::now(), start);
    }
}
