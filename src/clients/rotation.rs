/// 单次调用内的限流计数
///
/// 每次限流都会切换密钥；连续限流次数达到密钥数量时（所有密钥都被试过）
/// 需要等待冷却，然后计数归零。
#[derive(Debug, Default, Clone)]
pub struct RateLimitTracker {
    consecutive: usize,
    total: u32,
}

/// 限流后的下一步动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitStep {
    /// 换下一个密钥立即重试
    Retry,
    /// 所有密钥都被限流，等待冷却后继续
    Cooldown,
}

impl RateLimitTracker {
    /// 记录一次限流信号
    pub fn record(&mut self, pool_size: usize) -> RateLimitStep {
        self.consecutive += 1;
        self.total = self.total.saturating_add(1);
        if self.consecutive >= pool_size.max(1) {
            self.consecutive = 0;
            RateLimitStep::Cooldown
        } else {
            RateLimitStep::Retry
        }
    }

    /// 自上次冷却以来的连续限流次数
    pub fn consecutive(&self) -> usize {
        self.consecutive
    }

    /// 本次调用累计的限流次数
    pub fn total(&self) -> u32 {
        self.total
    }

    /// 是否超过重试上限（未设置上限时永远不会超过）
    pub fn exceeded(&self, ceiling: Option<u32>) -> bool {
        ceiling.is_some_and(|max| self.total > max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_after_every_key_limited() {
        let mut tracker = RateLimitTracker::default();
        assert_eq!(tracker.record(3), RateLimitStep::Retry);
        assert_eq!(tracker.record(3), RateLimitStep::Retry);
        assert_eq!(tracker.record(3), RateLimitStep::Cooldown);
        assert_eq!(tracker.consecutive(), 0);
    }

    #[test]
    fn test_next_signal_after_cooldown_does_not_retrigger() {
        let mut tracker = RateLimitTracker::default();
        tracker.record(2);
        assert_eq!(tracker.record(2), RateLimitStep::Cooldown);
        assert_eq!(tracker.record(2), RateLimitStep::Retry);
        assert_eq!(tracker.consecutive(), 1);
        assert_eq!(tracker.total(), 3);
    }

    #[test]
    fn test_single_key_pool_cools_down_every_time() {
        let mut tracker = RateLimitTracker::default();
        assert_eq!(tracker.record(1), RateLimitStep::Cooldown);
        assert_eq!(tracker.record(1), RateLimitStep::Cooldown);
    }

    #[test]
    fn test_ceiling() {
        let mut tracker = RateLimitTracker::default();
        tracker.record(5);
        tracker.record(5);
        assert!(!tracker.exceeded(None));
        assert!(!tracker.exceeded(Some(2)));
        tracker.record(5);
        assert!(tracker.exceeded(Some(2)));
    }
}
