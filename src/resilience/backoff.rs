//! Exponential backoff with jitter.

use std::time::Duration;
use rand::Rng;

/// Delay before the next attempt after `failures` consecutive failures.
///
/// Doubles from `base` per failure and adds up to 10% jitter; never exceeds `max`.
pub fn calculate_backoff(failures: u32, base: Duration, max: Duration) -> Duration {
    if failures == 0 {
        return base.min(max);
    }

    let base_ms = base.as_millis() as u64;
    let max_ms = max.as_millis() as u64;

    let exponential_base = 2u64.saturating_pow(failures - 1);
    let capped_delay = base_ms.saturating_mul(exponential_base).min(max_ms);

    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis((capped_delay + jitter).min(max_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Duration = Duration::from_millis(100);

    #[test]
    fn grows_exponentially() {
        let b1 = calculate_backoff(1, BASE, Duration::from_secs(2));
        assert!(b1 >= Duration::from_millis(100) && b1 < Duration::from_millis(110));

        let b3 = calculate_backoff(3, BASE, Duration::from_secs(2));
        assert!(b3 >= Duration::from_millis(400) && b3 < Duration::from_millis(440));
    }

    #[test]
    fn never_exceeds_max() {
        for failures in [5, 10, 64, u32::MAX] {
            assert_eq!(calculate_backoff(failures, BASE, Duration::from_secs(1)), Duration::from_secs(1));
        }
    }

    #[test]
    fn no_failures_means_base_delay() {
        assert_eq!(calculate_backoff(0, BASE, Duration::from_secs(1)), BASE);
    }
}
