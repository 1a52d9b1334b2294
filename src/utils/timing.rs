//! Timing utilities for measuring and formatting durations
//!
//! Scans routinely take minutes, so durations above one minute are shown
//! with a minute component.

use std::time::{Duration, Instant};

/// A simple timer for measuring elapsed time
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Create a new timer that starts immediately
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_formatted(&self) -> String {
        format_duration(self.elapsed())
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::start()
    }
}

/// Format a duration into a human-readable string
///
/// # Examples
///
/// - Durations >= 1 minute: "2m 05s"
/// - Durations >= 1 second: "1.23s"
/// - Durations >= 1 millisecond: "456ms"
/// - Durations < 1 millisecond: "< 1ms"
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();

    if millis == 0 {
        "< 1ms".to_string()
    } else if duration.as_secs() >= 60 {
        let secs = duration.as_secs();
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else if millis >= 1000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        format!("{}ms", millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_format_duration_less_than_1ms() {
        assert_eq!(format_duration(Duration::from_micros(500)), "< 1ms");
        assert_eq!(format_duration(Duration::ZERO), "< 1ms");
    }

    #[test]
    fn test_format_duration_milliseconds() {
        assert_eq!(format_duration(Duration::from_millis(1)), "1ms");
        assert_eq!(format_duration(Duration::from_millis(456)), "456ms");
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
    }

    #[test]
    fn test_format_duration_seconds() {
        assert_eq!(format_duration(Duration::from_millis(1000)), "1.00s");
        assert_eq!(format_duration(Duration::from_millis(1234)), "1.23s");
        assert_eq!(format_duration(Duration::from_millis(59_990)), "59.99s");
    }

    #[test]
    fn test_format_duration_minutes() {
        assert_eq!(format_duration(Duration::from_secs(60)), "1m 00s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 05s");
        assert_eq!(format_duration(Duration::from_secs(3_725)), "62m 05s");
    }

    #[test]
    fn test_timer_measures_elapsed_time() {
        let timer = Timer::start();
        sleep(Duration::from_millis(10));
        assert!(timer.elapsed() >= Duration::from_millis(10));
        assert!(!timer.elapsed_formatted().is_empty());
    }
}
