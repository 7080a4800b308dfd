use std::collections::HashMap;
use uuid::Uuid;

/// Per-subscription counter scoped to a single dispatcher run. Not
/// persisted: a fresh `RateLimiter` is created once per `Dispatcher::run`.
#[derive(Debug, Default)]
pub struct RateLimiter {
    limit: u32,
    counts: HashMap<Uuid, u32>,
}

impl RateLimiter {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            counts: HashMap::new(),
        }
    }

    /// Increments the subscription's counter and returns `true` if this candidate is
    /// still within `ALERT_RATE_LIMIT_PER_ENDPOINT`. Once the counter reaches the
    /// limit, every further call for that subscription returns `false`.
    pub fn try_consume(&mut self, subscription_id: Uuid) -> bool {
        let count = self.counts.entry(subscription_id).or_insert(0);
        if *count >= self.limit {
            return false;
        }
        *count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nth_plus_one_match_is_rate_limited() {
        let mut limiter = RateLimiter::new(2);
        let sub = Uuid::new_v4();
        assert!(limiter.try_consume(sub));
        assert!(limiter.try_consume(sub));
        assert!(!limiter.try_consume(sub));
    }

    #[test]
    fn counters_are_independent_per_subscription() {
        let mut limiter = RateLimiter::new(1);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(limiter.try_consume(a));
        assert!(limiter.try_consume(b));
        assert!(!limiter.try_consume(a));
    }
}
