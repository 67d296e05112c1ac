//! Rate Limiter (Token Bucket Algorithm)
//!
//! Bounds how fast tokens can be issued. Lock-free: the whole bucket lives
//! in one `AtomicU64` updated by a CAS loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Bucket contents are tracked in thousandths of a permit so slow refill
/// rates still accumulate between calls.
const SCALE: u64 = 1000;

/// Token bucket rate limiter
pub struct RateLimiter {
    // Upper 32 bits: available permits * SCALE
    // Lower 32 bits: ms since `origin` at the last refill, wrapping
    // every ~49.7 days
    packed: AtomicU64,
    origin: Instant,
    burst: u32,
    per_second: u32,
}

fn pack(milli_permits: u64, at_ms: u32) -> u64 {
    (milli_permits << 32) | at_ms as u64
}

fn unpack(packed: u64) -> (u64, u32) {
    (packed >> 32, (packed & 0xFFFF_FFFF) as u32)
}

impl RateLimiter {
    /// Create a limiter allowing bursts of `burst` requests, refilled at
    /// `per_second` permits per second. A zero burst is raised to one.
    pub fn new(burst: u32, per_second: u32) -> Self {
        // Scaled contents must fit the upper half of the packed word
        let burst = burst.clamp(1, u32::MAX / SCALE as u32);
        Self {
            packed: AtomicU64::new(pack(burst as u64 * SCALE, 0)),
            origin: Instant::now(),
            burst,
            per_second,
        }
    }

    /// Take one permit; false when the bucket is empty
    pub fn try_acquire(&self) -> bool {
        // Truncation wraps the clock; elapsed time is taken modulo 2^32 ms
        self.try_acquire_at(self.origin.elapsed().as_millis() as u32)
    }

    fn try_acquire_at(&self, now_ms: u32) -> bool {
        let capacity = self.burst as u64 * SCALE;

        loop {
            let current = self.packed.load(Ordering::Acquire);
            let (available, last_ms) = unpack(current);

            // Negative when another caller already stored a later instant
            let elapsed = now_ms.wrapping_sub(last_ms) as i32;
            let (delta_ms, stamp) = if elapsed > 0 {
                (elapsed as u64, now_ms)
            } else {
                (0, last_ms)
            };

            // permits/s * ms == milli-permits
            let refilled = available
                .saturating_add(delta_ms.saturating_mul(self.per_second as u64))
                .min(capacity);

            let (next, granted) = if refilled >= SCALE {
                (refilled - SCALE, true)
            } else {
                (refilled, false)
            };

            if self
                .packed
                .compare_exchange(
                    current,
                    pack(next, stamp),
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_ok()
            {
                return granted;
            }
        }
    }

    /// Whole permits currently available (for logging)
    pub fn available(&self) -> u32 {
        let (available, _) = unpack(self.packed.load(Ordering::Acquire));
        (available / SCALE) as u32
    }
}
