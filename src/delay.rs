use eh1::delay::DelayNs;
use std::time::Duration;

/// Sleep-backed pacer used when no platform-specific delay source is given.
pub struct Delay;
impl DelayNs for Delay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns as u64));
    }
    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(us as u64));
    }
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms as u64));
    }
}

/// Half of the TCK period for `frequency_hz`, in microseconds.
///
/// Zero means no pacing: toggle the lines as fast as they go.
pub const fn half_period_us(frequency_hz: u32) -> u32 {
    if frequency_hz == 0 {
        0
    } else {
        1_000_000 / frequency_hz / 2
    }
}
