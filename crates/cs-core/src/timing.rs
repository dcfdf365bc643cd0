//! Lightweight performance timing utilities.
//!
//! Simple timing infrastructure for measuring where runtime is being spent
//! in a coordinated run. Can be enabled via environment variable or
//! programmatically.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable performance timing globally.
pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

/// Disable performance timing globally.
pub fn disable_timing() {
    ENABLED.store(false, Ordering::Relaxed);
}

/// Check if timing is enabled.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var("CS_TIMING").is_ok()
}

/// A simple timer that measures elapsed time.
pub struct Timer {
    label: &'static str,
    start: Instant,
    enabled: bool,
}

impl Timer {
    /// Create and start a new timer with the given label.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
            enabled: is_enabled(),
        }
    }

    /// Stop the timer and return elapsed time in seconds.
    /// If timing is disabled, returns None.
    pub fn stop(self) -> Option<f64> {
        if self.enabled {
            Some(self.start.elapsed().as_secs_f64())
        } else {
            None
        }
    }

    /// Stop the timer and print the result if enabled.
    pub fn stop_and_print(self) {
        let label = self.label;
        if let Some(elapsed) = self.stop() {
            println!("[TIMING] {}: {:.3}s", label, elapsed);
        }
    }
}
