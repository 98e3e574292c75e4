use std::time::Duration;

use crate::constants::{MAX_CLOCK_HZ, TIMER_HZ};

/// How much work is due after some amount of wall clock time has passed
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Ticks {
    /// How many times to call `step_instruction`
    pub cycles: u32,
    /// How many times to call `tick_timers`
    pub timer_ticks: u32,
}

/// # Clock
/// Splits elapsed time into CPU cycles and timer ticks.
///
/// The CPU runs at whatever rate the driver picks while the timers always tick at
/// 60Hz, so the two are tracked separately. Time that doesn't add up to a whole
/// cycle or tick is carried over to the next call.
#[derive(Clone, Debug)]
pub struct Clock {
    cycle_time: Duration,
    timer_time: Duration,
    cycle_debt: Duration,
    timer_debt: Duration,
}

impl Clock {
    /// # Arguments
    /// * `clock_hz` instructions per second; clamped to 1..=MAX_CLOCK_HZ
    pub fn new(clock_hz: u32) -> Self {
        Clock {
            cycle_time: Duration::from_secs(1) / clock_hz.clamp(1, MAX_CLOCK_HZ),
            timer_time: Duration::from_secs(1) / TIMER_HZ,
            cycle_debt: Duration::ZERO,
            timer_debt: Duration::ZERO,
        }
    }

    /// Time between two CPU cycles
    pub fn cycle_time(&self) -> Duration {
        self.cycle_time
    }

    /// Accounts for `elapsed` and returns the work that is now due
    pub fn advance(&mut self, elapsed: Duration) -> Ticks {
        let (cycles, cycle_debt) = Self::split(self.cycle_debt + elapsed, self.cycle_time);
        let (timer_ticks, timer_debt) = Self::split(self.timer_debt + elapsed, self.timer_time);
        self.cycle_debt = cycle_debt;
        self.timer_debt = timer_debt;
        Ticks {
            cycles,
            timer_ticks,
        }
    }

    fn split(total: Duration, period: Duration) -> (u32, Duration) {
        let count = u32::try_from(total.as_nanos() / period.as_nanos()).unwrap_or(u32::MAX);
        (count, total.saturating_sub(period * count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_second_at_500hz() {
        let mut clock = Clock::new(500);
        let ticks = clock.advance(Duration::from_secs(1));
        assert_eq!(ticks.cycles, 500);
        assert_eq!(ticks.timer_ticks, 60);
    }

    #[test]
    fn test_timer_rate_ignores_clock_rate() {
        let mut slow = Clock::new(100);
        let mut fast = Clock::new(2000);
        assert_eq!(slow.advance(Duration::from_secs(2)).timer_ticks, 120);
        assert_eq!(fast.advance(Duration::from_secs(2)).timer_ticks, 120);
    }

    #[test]
    fn test_carries_remainders() {
        let mut clock = Clock::new(500);
        // 1.5ms is less than one 2ms cycle
        assert_eq!(clock.advance(Duration::from_micros(1500)).cycles, 0);
        assert_eq!(clock.advance(Duration::from_micros(1500)).cycles, 1);
        let total: u32 = (0..60)
            .map(|_| clock.advance(Duration::from_micros(16_667)).timer_ticks)
            .sum();
        assert_eq!(total, 60);
    }

    #[test]
    fn test_huge_hz_is_clamped() {
        let mut clock = Clock::new(2_000_000_000);
        assert_eq!(clock.cycle_time(), Duration::from_micros(1));
        assert_eq!(clock.advance(Duration::from_millis(1)).cycles, 1000);
        assert_eq!(Clock::new(u32::MAX).cycle_time(), Duration::from_micros(1));
    }

    #[test]
    fn test_long_pause_saturates_cycles() {
        let mut clock = Clock::new(1_000_000);
        let ticks = clock.advance(Duration::from_secs(5000));
        assert_eq!(ticks.cycles, u32::MAX);
        assert_eq!(ticks.timer_ticks, 300_000);
    }

    #[test]
    fn test_zero_hz_is_clamped() {
        let mut clock = Clock::new(0);
        assert_eq!(clock.advance(Duration::from_secs(1)).cycles, 1);
    }
}
