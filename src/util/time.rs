//! Time utilities for game simulation

use std::time::{Duration, Instant};

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Tick rate configuration
pub const SIMULATION_TPS: u32 = 60; // 60 ticks per second
pub const TICK_DURATION_MICROS: u64 = 1_000_000 / SIMULATION_TPS as u64;

/// Wall-clock length of one tick
pub fn tick_duration() -> Duration {
    Duration::from_micros(TICK_DURATION_MICROS)
}

/// Convert a millisecond delay into a whole number of ticks (rounded,
/// saturating at `u32::MAX`)
pub fn millis_to_ticks(millis: u64) -> u32 {
    let ticks = millis
        .saturating_mul(SIMULATION_TPS as u64)
        .saturating_add(500)
        / 1000;
    ticks.min(u32::MAX as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_to_ticks() {
        assert_eq!(millis_to_ticks(2000), 120);
        assert_eq!(millis_to_ticks(0), 0);
        assert_eq!(millis_to_ticks(16), 1);
        assert_eq!(millis_to_ticks(1000), SIMULATION_TPS);
        assert_eq!(millis_to_ticks(u64::MAX), u32::MAX);
    }

    #[test]
    fn test_tick_duration() {
        assert_eq!(tick_duration().as_micros(), 16_666);
    }

    #[test]
    fn test_uptime_after_init() {
        init_server_time();
        assert!(uptime_secs() < 60);
    }
}
