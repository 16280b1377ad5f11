use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Fixed-period tick source for animations.
///
/// The first tick fires one period after construction. A zero period means
/// "as fast as the executor allows": each tick just yields once.
#[derive(Debug)]
pub struct Ticker {
    interval: Option<Interval>,
    period: Duration,
    ticks: u64,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        let interval = (!period.is_zero()).then(|| {
            let mut i = interval_at(Instant::now() + period, period);
            i.set_missed_tick_behavior(MissedTickBehavior::Delay);
            i
        });
        Self {
            interval,
            period,
            ticks: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of ticks delivered so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Waits for the next tick and returns its 0-based index.
    pub async fn tick(&mut self) -> u64 {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => tokio::task::yield_now().await,
        }
        let index = self.ticks;
        self.ticks += 1;
        index
    }
}

#[cfg(test)]
mod tests {
    use super::Ticker;
    use std::time::Duration;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_period() {
        let start = Instant::now();
        let mut t = Ticker::new(Duration::from_millis(5));
        assert_eq!(t.tick().await, 0);
        assert_eq!(start.elapsed(), Duration::from_millis(5));
        assert_eq!(t.tick().await, 1);
        assert_eq!(start.elapsed(), Duration::from_millis(10));
        assert_eq!(t.ticks(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_period_does_not_advance_time() {
        let start = Instant::now();
        let mut t = Ticker::new(Duration::ZERO);
        for expected in 0..4 {
            assert_eq!(t.tick().await, expected);
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
